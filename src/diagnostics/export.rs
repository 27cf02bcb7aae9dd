// SPDX-License-Identifier: MPL-2.0
//! Writing the log attachment to the cache directory.
//!
//! The snapshot is written as UTF-8 text with `\r\n` after every line,
//! including the last, so mail clients on any platform show it intact. The
//! content goes to a temporary sibling first and is renamed into place, so a
//! reader never sees a half-written attachment.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Line terminator used in the attachment.
pub const ATTACHMENT_LINE_ENDING: &str = "\r\n";

// =============================================================================
// Attachment
// =============================================================================

/// Writes `lines` to `file_name` inside `dir`, creating `dir` if needed.
///
/// An existing attachment from a previous collection is replaced.
///
/// # Errors
///
/// Returns `Error::FileIo` if the directory cannot be created or the file
/// cannot be written.
pub fn write_log_attachment(dir: &Path, file_name: &str, lines: &[String]) -> Result<PathBuf> {
    fs::create_dir_all(dir).map_err(|err| Error::file_io(dir, err))?;
    let path = dir.join(file_name);
    write_lines_atomic(&path, lines)?;
    tracing::debug!(path = %path.display(), lines = lines.len(), "log attachment written");
    Ok(path)
}

/// Writes CRLF-terminated lines to `path` via a temporary sibling.
///
/// # Errors
///
/// Returns `Error::FileIo` on any write or rename failure. The temporary file
/// is removed on failure.
pub fn write_lines_atomic(path: &Path, lines: &[String]) -> Result<()> {
    let temp_path = path.with_extension("txt.tmp");

    if let Err(err) = write_lines(&temp_path, lines) {
        let _ = fs::remove_file(&temp_path);
        return Err(Error::file_io(path, err));
    }

    if let Err(err) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(Error::file_io(path, err));
    }

    Ok(())
}

/// Writes the lines through a buffered writer. The file handle is closed when
/// the writer drops, on success and on error alike.
fn write_lines(path: &Path, lines: &[String]) -> io::Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    for line in lines {
        writer.write_all(line.as_bytes())?;
        writer.write_all(ATTACHMENT_LINE_ENDING.as_bytes())?;
    }
    writer.flush()
}

// =============================================================================
// Permissions
// =============================================================================

/// Grants read access to every user so another process (a mail client) can
/// open the attachment.
///
/// # Errors
///
/// Returns `Error::FileIo` if the permissions cannot be changed.
#[cfg(unix)]
pub fn make_world_readable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let metadata = fs::metadata(path).map_err(|err| Error::file_io(path, err))?;
    let mut permissions = metadata.permissions();
    permissions.set_mode(permissions.mode() | 0o444);
    fs::set_permissions(path, permissions).map_err(|err| Error::file_io(path, err))
}

/// Files created in the cache directory are readable by other processes of
/// the same user on this platform; only existence is checked.
///
/// # Errors
///
/// Returns `Error::FileIo` if the file does not exist.
#[cfg(not(unix))]
pub fn make_world_readable(path: &Path) -> Result<()> {
    fs::metadata(path)
        .map(|_| ())
        .map_err(|err| Error::file_io(path, err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LOG_FILE_NAME;
    use tempfile::tempdir;

    fn lines(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn every_line_ends_with_crlf() {
        let dir = tempdir().expect("failed to create temp dir");
        let path = write_log_attachment(dir.path(), LOG_FILE_NAME, &lines(&["L1", "L2"])).unwrap();

        assert_eq!(path.file_name().unwrap(), LOG_FILE_NAME);
        assert_eq!(fs::read(&path).unwrap(), b"L1\r\nL2\r\n");
    }

    #[test]
    fn empty_snapshot_writes_empty_file() {
        let dir = tempdir().expect("failed to create temp dir");
        let path = write_log_attachment(dir.path(), LOG_FILE_NAME, &[]).unwrap();

        assert!(path.exists());
        assert_eq!(fs::metadata(&path).unwrap().len(), 0);
    }

    #[test]
    fn creates_missing_directory() {
        let dir = tempdir().expect("failed to create temp dir");
        let nested = dir.path().join("a").join("b");

        let path = write_log_attachment(&nested, LOG_FILE_NAME, &lines(&["x"])).unwrap();
        assert!(path.starts_with(&nested));
    }

    #[test]
    fn replaces_previous_attachment_without_leaving_temp_file() {
        let dir = tempdir().expect("failed to create temp dir");
        write_log_attachment(dir.path(), LOG_FILE_NAME, &lines(&["old", "old", "old"])).unwrap();
        let path = write_log_attachment(dir.path(), LOG_FILE_NAME, &lines(&["new"])).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "new\r\n");
        assert!(!path.with_extension("txt.tmp").exists());
    }

    #[test]
    fn unwritable_directory_is_file_io_error() {
        let dir = tempdir().expect("failed to create temp dir");
        let blocker = dir.path().join("not-a-dir");
        fs::write(&blocker, b"").unwrap();

        let err = write_log_attachment(&blocker, LOG_FILE_NAME, &lines(&["x"])).unwrap_err();
        assert!(matches!(err, Error::FileIo { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn world_readable_sets_read_bits() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().expect("failed to create temp dir");
        let path = write_log_attachment(dir.path(), LOG_FILE_NAME, &lines(&["x"])).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o600)).unwrap();

        make_world_readable(&path).unwrap();
        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o444, 0o444);
    }

    #[test]
    fn world_readable_on_missing_file_fails() {
        let dir = tempdir().expect("failed to create temp dir");
        let err = make_world_readable(&dir.path().join("missing.txt")).unwrap_err();
        assert!(matches!(err, Error::FileIo { .. }));
    }
}
