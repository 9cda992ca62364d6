use thiserror::Error;

/// A failure of a call to the service.
#[derive(Error, Debug)]
pub enum ApiError {
    /// The service received the request and refused it.
    #[error("{method} failed: {comment}")]
    RequestFailed {
        /// The called method, like `problem.saveTest`.
        method: String,
        /// The reason given by the service.
        comment: String,
    },
    /// The request did not reach the service.
    #[error("Cannot reach the service for {method}")]
    Transport {
        /// The called method.
        method: String,
        /// The error of the HTTP client.
        #[source]
        source: reqwest::Error,
    },
    /// The answer of the service cannot be understood.
    #[error("Invalid response to {method} (HTTP {status}): {reason}")]
    InvalidResponse {
        /// The called method.
        method: String,
        /// The HTTP status of the answer.
        status: u16,
        /// What is wrong with the answer.
        reason: String,
    },
}

impl ApiError {
    /// The human readable reason of the failure. For rejected requests this is the comment
    /// provided by the service, verbatim.
    pub fn reason(&self) -> String {
        match self {
            ApiError::RequestFailed { comment, .. } => comment.clone(),
            other => other.to_string(),
        }
    }

    /// Whether the service received the request and refused it.
    pub fn is_request_failed(&self) -> bool {
        matches!(self, ApiError::RequestFailed { .. })
    }
}
