use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Invalid host URL: {0}")]
    InvalidUrl(String),

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("API request failed, status: {status}, message: {message}")]
    Status { status: u16, message: String },

    #[error("Failed to parse response: {0}")]
    Parse(String),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Request(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// The API sometimes answers 202 with no body. Such an "error" means the request was taken.
    pub fn is_accepted(&self) -> bool {
        self.status() == Some(202) || self.to_string().contains("status: 202")
    }
}
