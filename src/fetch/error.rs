use thiserror::Error;

/// Why a chain (or quote) could not be retrieved. Every variant means "data unavailable";
/// an empty listing is not an error.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("exchange returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("exchange rejected request: {0}")]
    Rejected(String),

    /// Refused locally; no request was sent.
    #[error("invalid option symbol '{0}'")]
    InvalidSymbol(String),
}

impl FetchError {
    /// Short label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::Transport(_) => "transport",
            FetchError::Status { .. } => "status",
            FetchError::Malformed(_) => "malformed",
            FetchError::Rejected(_) => "rejected",
            FetchError::InvalidSymbol(_) => "invalid_symbol",
        }
    }
}

/// Trim an error body so it fits on one log line / banner.
pub(crate) fn excerpt(body: &str) -> String {
    const MAX: usize = 200;
    let flat: String = body.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= MAX {
        flat
    } else {
        let cut: String = flat.chars().take(MAX).collect();
        format!("{cut}...")
    }
}
