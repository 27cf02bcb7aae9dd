// SPDX-License-Identifier: MPL-2.0
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use selfcheck::application::port::Presenter;
use selfcheck::config::{self, Config};
use selfcheck::crash::CrashReport;
use selfcheck::diagnostics::{
    CollectionSettings, CollectionState, CollectorServices, DiagnosticReport, DiagnosticsCollector,
};
use selfcheck::domain::integrity::FingerprintAlgorithm;
use selfcheck::infrastructure::{
    default_build_properties, CommandLogSource, ConsolePresenter, HostPackageMetadata, OutputFormat,
};
use selfcheck::{crash, integrity, logging, paths};

const HELP: &str = "\
selfcheck: build-signature verification and support reports

USAGE:
  selfcheck fingerprint <CERT_FILE> [--algorithm sha1|sha256]
  selfcheck verify [--expected HEX] [--algorithm sha1|sha256]
  selfcheck collect [--json] [--report FILE]
  selfcheck crash [CRASH_FILE] [--json]
  selfcheck init [--force]

OPTIONS:
  --config-dir DIR   Directory holding settings.toml
  --cache-dir DIR    Directory for logcat.txt and crash reports
  -v, --verbose      Debug logging (RUST_LOG overrides)
  -h, --help         Print this help
";

/// Slack on top of the configured deadlines when waiting for a collection.
const COLLECT_WAIT_MARGIN: Duration = Duration::from_secs(5);

fn main() -> ExitCode {
    let mut args = pico_args::Arguments::from_env();

    if args.contains(["-h", "--help"]) {
        print!("{HELP}");
        return ExitCode::SUCCESS;
    }

    match run(&mut args) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err}\n\n{HELP}");
            ExitCode::from(2)
        }
    }
}

fn run(args: &mut pico_args::Arguments) -> Result<ExitCode, pico_args::Error> {
    let command = args.subcommand()?;
    let verbose = args.contains(["-v", "--verbose"]);
    let config_dir: Option<String> = args.opt_value_from_str("--config-dir")?;
    let cache_dir: Option<String> = args.opt_value_from_str("--cache-dir")?;

    logging::init(verbose);
    paths::init_cli_overrides(cache_dir, config_dir);

    let code = match command.as_deref() {
        Some("fingerprint") => {
            let algorithm: Option<String> = args.opt_value_from_str("--algorithm")?;
            let cert: String = args.free_from_str()?;
            warn_unused(args);
            fingerprint(&PathBuf::from(cert), algorithm.as_deref())
        }
        Some("verify") => {
            let expected: Option<String> = args.opt_value_from_str("--expected")?;
            let algorithm: Option<String> = args.opt_value_from_str("--algorithm")?;
            warn_unused(args);
            verify(expected.as_deref(), algorithm.as_deref())
        }
        Some("collect") => {
            let json = args.contains("--json");
            let report: Option<PathBuf> = args.opt_value_from_str("--report")?;
            warn_unused(args);
            collect(json, report.as_deref())
        }
        Some("crash") => {
            let json = args.contains("--json");
            let file: Option<PathBuf> = args.opt_free_from_str()?;
            warn_unused(args);
            crash_report(file, json)
        }
        Some("init") => {
            let force = args.contains("--force");
            warn_unused(args);
            init(force)
        }
        Some(other) => {
            eprintln!("unknown command `{other}`\n\n{HELP}");
            ExitCode::from(2)
        }
        None => {
            print!("{HELP}");
            ExitCode::from(2)
        }
    };
    Ok(code)
}

fn warn_unused(args: &mut pico_args::Arguments) {
    let rest = std::mem::replace(args, pico_args::Arguments::from_vec(Vec::new())).finish();
    if !rest.is_empty() {
        tracing::warn!(?rest, "ignoring unused arguments");
    }
}

fn load_config() -> Config {
    let config = config::load().unwrap_or_else(|err| {
        tracing::debug!(error = %err, "using default settings");
        Config::default()
    });
    if let Some(dir) = config.output_dir() {
        crash::install_panic_hook(config.app_name(), dir);
    }
    config
}

fn fingerprint(cert: &Path, algorithm: Option<&str>) -> ExitCode {
    let algorithm = match algorithm.map(str::parse::<FingerprintAlgorithm>).transpose() {
        Ok(algorithm) => algorithm.unwrap_or_default(),
        Err(err) => {
            eprintln!("unsupported algorithm `{}`", err.0);
            return ExitCode::from(2);
        }
    };
    match fs::read(cert) {
        Ok(bytes) => {
            println!("{}", integrity::compute_fingerprint(algorithm, &bytes));
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("cannot read {}: {err}", cert.display());
            ExitCode::from(2)
        }
    }
}

fn verify(expected: Option<&str>, algorithm: Option<&str>) -> ExitCode {
    let config = load_config();
    let provider = HostPackageMetadata::from_config(&config);

    let verified = match expected {
        Some(expected) => {
            let algorithm = algorithm.unwrap_or_else(|| config.fingerprint_algorithm());
            integrity::verify_with(&provider, algorithm, expected)
        }
        None => integrity::verify_build(&provider),
    };

    if verified {
        println!("verified");
        ExitCode::SUCCESS
    } else {
        println!("not verified");
        ExitCode::from(1)
    }
}

fn output_format(json: bool) -> OutputFormat {
    if json {
        OutputFormat::Json
    } else {
        OutputFormat::Draft
    }
}

fn collect(json: bool, report_file: Option<&Path>) -> ExitCode {
    let config = load_config();
    let settings = CollectionSettings::from_config(&config);
    let services = CollectorServices {
        package: Arc::new(HostPackageMetadata::from_config(&config)),
        platform: default_build_properties(),
        log_source: Arc::new(CommandLogSource::from_config(&config)),
    };

    let lookups = u32::try_from(settings.companion_packages.len() + 1).unwrap_or(u32::MAX);
    let wait = settings.log_read_timeout.as_duration()
        + settings.metadata_timeout.as_duration().saturating_mul(lookups)
        + COLLECT_WAIT_MARGIN;

    let mut collector = DiagnosticsCollector::new(
        services,
        settings,
        Box::new(ConsolePresenter::stdout(output_format(json))),
    );

    collector.request();
    match collector.wait_and_present(wait) {
        Some(completion) if completion.state == CollectionState::Presented => {
            match (report_file, collector.last_report()) {
                (Some(path), Some(report)) => save_report(path, report),
                _ => ExitCode::SUCCESS,
            }
        }
        Some(completion) => {
            eprintln!("collection ended in state {:?}", completion.state);
            ExitCode::from(1)
        }
        None => {
            eprintln!("collection did not finish in {}s", wait.as_secs());
            ExitCode::from(1)
        }
    }
}

fn save_report(path: &Path, report: &DiagnosticReport) -> ExitCode {
    let written = report
        .to_json()
        .map_err(|err| err.to_string())
        .and_then(|json| fs::write(path, json).map_err(|err| err.to_string()));
    match written {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("cannot write report to {}: {err}", path.display());
            ExitCode::from(1)
        }
    }
}

fn crash_report(file: Option<PathBuf>, json: bool) -> ExitCode {
    let config = load_config();
    let path = match file {
        Some(path) => path,
        None => {
            let newest = config
                .output_dir()
                .map(|dir| crash::newest_report_in(&dir))
                .transpose();
            match newest {
                Ok(Some(Some(path))) => path,
                Ok(_) => {
                    eprintln!("no crash report found");
                    return ExitCode::from(1);
                }
                Err(err) => {
                    eprintln!("{err}");
                    return ExitCode::from(1);
                }
            }
        }
    };

    let report = match CrashReport::read_from(&path) {
        Ok(report) => report,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::from(1);
        }
    };
    let share = report.to_share_request(&config.support_recipients, Some(path));
    match ConsolePresenter::stdout(output_format(json)).present(&share) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            logging::log_failure("presenting crash report", &err);
            ExitCode::from(1)
        }
    }
}

fn init(force: bool) -> ExitCode {
    let Some(path) = config::settings_path() else {
        eprintln!("no config directory available");
        return ExitCode::from(1);
    };
    if path.exists() && !force {
        eprintln!("{} already exists (use --force to overwrite)", path.display());
        return ExitCode::from(1);
    }
    match config::save(&Config::default()) {
        Ok(()) => {
            println!("{}", path.display());
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("{err}");
            ExitCode::from(1)
        }
    }
}
