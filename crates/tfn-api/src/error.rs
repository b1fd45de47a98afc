//! API error taxonomy.
//!
//! Four failure classes, each handled differently by callers:
//! - `Transport`: no usable response; retryable, screens show a retry
//!   affordance.
//! - `Auth`: 401 that survived the single refresh attempt; handled by the
//!   session collaborator, not retryable here.
//! - `Rejected`: the backend answered and said no (`success: false` or a
//!   non-2xx status); carries the backend's display text verbatim.
//! - `Decode`: the body was not the JSON we were promised.
//!
//! Client-side validation failures never reach this layer; they are caught
//! before any request is built.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    Transport(String),
    Auth,
    Rejected { message: String },
    Decode(String),
}

impl ApiError {
    /// Whether a plain retry of the same call can plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ApiError::Transport(_))
    }

    /// Text suitable for direct display to the user.
    pub fn display_message(&self) -> String {
        match self {
            ApiError::Transport(_) => "Network error. Check your connection and retry".to_string(),
            ApiError::Auth => "Session expired. Please login again.".to_string(),
            ApiError::Rejected { message } => message.clone(),
            ApiError::Decode(_) => "Unexpected response from server".to_string(),
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::Transport(detail) => write!(f, "transport failure: {detail}"),
            ApiError::Auth => write!(f, "authentication failed after session refresh"),
            ApiError::Rejected { message } => write!(f, "backend rejected request: {message}"),
            ApiError::Decode(detail) => write!(f, "response decode failure: {detail}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        ApiError::Transport(e.to_string())
    }
}
