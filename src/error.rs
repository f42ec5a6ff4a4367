use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ScrapeError {
    #[error("selector `{selector}` did not appear within {timeout_ms}ms")]
    NotFound { selector: String, timeout_ms: u64 },

    #[error("{labels} category labels but {counts} row counts")]
    InputMismatch { labels: usize, counts: usize },

    #[error("invalid selector `{0}`")]
    Selector(String),

    #[error("browser error: {0}")]
    Browser(String),

    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl From<chromiumoxide::error::CdpError> for ScrapeError {
    fn from(e: chromiumoxide::error::CdpError) -> Self {
        Self::Browser(e.to_string())
    }
}
