use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::notify::{Notice, NoticeKind, Notifier};
use crate::report::{self, AnalysisReportCard};

pub const COPY_OK_MESSAGE: &str = "Relatório copiado para área de transferência!";
pub const COPY_FAILED_MESSAGE: &str = "Falha ao copiar relatório.";
pub const COPY_NOTICE_DURATION: Duration = Duration::from_millis(3200);

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("no clipboard backend available: {source}")]
    Unavailable {
        #[source]
        source: arboard::Error,
    },

    #[error("failed to set clipboard text: {source}")]
    Clipboard {
        #[source]
        source: arboard::Error,
    },

    #[error("failed to write report to {path}: {source}")]
    File {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write report to stdout: {source}")]
    Stdout {
        #[source]
        source: std::io::Error,
    },
}

/// Where a finished report goes.
pub trait ReportSink {
    fn write_text(&mut self, text: &str) -> Result<(), SinkError>;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CopyOutcome {
    Nothing,
    Copied { bytes: usize },
    Failed { reason: String },
}

/// Synthesizes the report for `cards` and hands it to `sink`. With no cards
/// the gesture is ignored: nothing is written and nobody is notified.
pub fn copy_report<S, N>(cards: &[AnalysisReportCard], sink: &mut S, notifier: &mut N) -> CopyOutcome
where
    S: ReportSink + ?Sized,
    N: Notifier + ?Sized,
{
    if cards.is_empty() {
        return CopyOutcome::Nothing;
    }
    let text = report::synthesize(cards);
    match sink.write_text(&text) {
        Ok(()) => {
            notifier.notify(Notice {
                message: COPY_OK_MESSAGE.to_string(),
                kind: NoticeKind::Success,
                duration: COPY_NOTICE_DURATION,
            });
            CopyOutcome::Copied { bytes: text.len() }
        }
        Err(e) => {
            tracing::warn!(error = %e, "report copy failed");
            notifier.notify(Notice {
                message: COPY_FAILED_MESSAGE.to_string(),
                kind: NoticeKind::Error,
                duration: COPY_NOTICE_DURATION,
            });
            CopyOutcome::Failed {
                reason: e.to_string(),
            }
        }
    }
}

/// The platform clipboard. A fresh handle is opened for every write.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClipboard;

impl ReportSink for SystemClipboard {
    fn write_text(&mut self, text: &str) -> Result<(), SinkError> {
        let mut clipboard =
            arboard::Clipboard::new().map_err(|source| SinkError::Unavailable { source })?;
        clipboard
            .set_text(text.to_string())
            .map_err(|source| SinkError::Clipboard { source })?;
        tracing::debug!(bytes = text.len(), "report copied");
        Ok(())
    }
}

#[derive(Clone, Debug)]
pub struct FileSink {
    pub path: PathBuf,
}

impl ReportSink for FileSink {
    fn write_text(&mut self, text: &str) -> Result<(), SinkError> {
        std::fs::write(&self.path, text).map_err(|source| SinkError::File {
            path: self.path.display().to_string(),
            source,
        })
    }
}

#[derive(Clone, Debug, Default)]
pub struct StdoutSink;

impl ReportSink for StdoutSink {
    fn write_text(&mut self, text: &str) -> Result<(), SinkError> {
        let mut stdout = std::io::stdout().lock();
        stdout
            .write_all(text.as_bytes())
            .and_then(|_| stdout.flush())
            .map_err(|source| SinkError::Stdout { source })
    }
}
