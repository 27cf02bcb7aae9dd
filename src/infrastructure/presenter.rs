// SPDX-License-Identifier: MPL-2.0
//! Console adapter implementing the [`Presenter`] port.
//!
//! Prints the share request as a mail draft, or as one JSON object per
//! report for scripting.
//!
//! [`Presenter`]: crate::application::port::Presenter

use std::io::{self, Write};

use crate::application::port::Presenter;
use crate::domain::diagnostics::ShareRequest;
use crate::error::{Error, Result};

/// Output format of [`ConsolePresenter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Draft,
    Json,
}

/// Writes share requests to a byte sink (stdout by default).
pub struct ConsolePresenter<W: Write = io::Stdout> {
    out: W,
    format: OutputFormat,
}

impl ConsolePresenter {
    #[must_use]
    pub fn stdout(format: OutputFormat) -> Self {
        Self::new(io::stdout(), format)
    }
}

impl<W: Write> ConsolePresenter<W> {
    pub fn new(out: W, format: OutputFormat) -> Self {
        Self { out, format }
    }

    /// Gives back the sink, e.g. to inspect a buffer.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_draft(&mut self, request: &ShareRequest) -> io::Result<()> {
        let attachment = request
            .attachment
            .as_ref()
            .map_or_else(|| "(none)".to_string(), |p| p.display().to_string());

        writeln!(self.out, "To: {}", request.recipients.join(", "))?;
        writeln!(self.out, "Subject: {}", request.subject)?;
        writeln!(self.out, "Content-Type: {}", request.mime_type)?;
        writeln!(self.out, "Attachment: {attachment}")?;
        writeln!(self.out)?;
        self.out.write_all(request.body.as_bytes())?;
        self.out.flush()
    }

    fn write_json(&mut self, request: &ShareRequest) -> io::Result<()> {
        serde_json::to_writer_pretty(&mut self.out, request)?;
        writeln!(self.out)?;
        self.out.flush()
    }
}

impl<W: Write> Presenter for ConsolePresenter<W> {
    fn present(&mut self, request: &ShareRequest) -> Result<()> {
        let written = match self.format {
            OutputFormat::Draft => self.write_draft(request),
            OutputFormat::Json => self.write_json(request),
        };
        written.map_err(|err| Error::PresentationFailure(err.to_string()))
    }
}
