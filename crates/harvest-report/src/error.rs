use std::path::PathBuf;

/// Errors raised while writing a report.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("Failed to open report output {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Report write failed: {0}")]
    Io(#[from] std::io::Error),
}
