//! Output formatting abstraction for text, Markdown and JSON rendering
//!
//! All subcommand output flows through [`OutputWriter`] which handles format switching.
//! This keeps format-specific logic out of command handlers entirely.

use std::io::Write;

use serde::Serialize;

use crate::cli::OutputFormat;
use crate::error::CliError;

/// Abstraction for writing CLI output in different formats.
///
/// Subcommand handlers call `writer.render(&payload)` where `payload`
/// implements both `Serialize` (for JSON) and `Render` (for text and Markdown).
pub struct OutputWriter {
    format: OutputFormat,
}

impl OutputWriter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Render a payload to stdout.
    pub fn render<T: Render + Serialize>(&self, payload: &T) -> Result<(), CliError> {
        let stdout = std::io::stdout();
        let mut handle = stdout.lock();
        self.render_to(payload, &mut handle)
    }

    /// Render a payload to any writer.
    pub fn render_to<T: Render + Serialize>(
        &self,
        payload: &T,
        w: &mut dyn Write,
    ) -> Result<(), CliError> {
        match self.format {
            OutputFormat::Text => payload.render_text(w)?,
            OutputFormat::Markdown => payload.render_markdown(w)?,
            OutputFormat::Json => {
                serde_json::to_writer_pretty(&mut *w, payload)?;
                writeln!(w)?;
            }
        }
        Ok(())
    }

    /// Report a failed command: the failure object on stdout in JSON mode
    /// unless a payload was already printed, a one-line message on stderr
    /// otherwise.
    pub fn render_failure(&self, err: &CliError) {
        let stdout = std::io::stdout();
        let stderr = std::io::stderr();
        let _ = self.render_failure_to(err, &mut stdout.lock(), &mut stderr.lock());
    }

    /// Like [`render_failure`](Self::render_failure) with explicit streams.
    ///
    /// When the payload is already on `out` the failure goes to `diag`, so
    /// JSON mode never prints two documents.
    pub fn render_failure_to(
        &self,
        err: &CliError,
        out: &mut dyn Write,
        diag: &mut dyn Write,
    ) -> std::io::Result<()> {
        use colored::Colorize;

        let failure = err.to_failure();
        if self.format == OutputFormat::Json && !err.payload_rendered() {
            serde_json::to_writer_pretty(&mut *out, &failure)?;
            return writeln!(out);
        }
        match failure.cause {
            Some(cause) => {
                writeln!(diag, "{} {}: {}", "error:".red().bold(), failure.message, cause)
            }
            None => writeln!(diag, "{} {}", "error:".red().bold(), failure.message),
        }
    }
}

/// Human-readable rendering.
///
/// Implemented by every CLI output payload alongside `serde::Serialize`.
pub trait Render {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()>;

    /// Markdown rendering; plain text unless the payload has a table form.
    fn render_markdown(&self, w: &mut dyn Write) -> std::io::Result<()> {
        self.render_text(w)
    }
}

/// Payload printed instead of the real result under `--dry-run`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DryRun {
    pub dry_run: bool,
    pub action: String,
}

impl DryRun {
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            dry_run: true,
            action: action.into(),
        }
    }
}

impl Render for DryRun {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        writeln!(w, "[DryRun]: Bailing now")
    }
}
