use thiserror::Error;

pub const GENERIC_SERVER_FAILURE: &str = "analysis failed";
pub const GENERIC_TRANSPORT_FAILURE: &str = "analysis process encountered an error";

/// Everything that can end a submission in `Failed`.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("{}", transport_message(.0))]
    Transport(String),
    #[error("{}", .detail.as_deref().unwrap_or(GENERIC_SERVER_FAILURE))]
    Server { status: u16, detail: Option<String> },
    #[error("malformed analysis response: {0}")]
    Malformed(String),
}

impl AnalysisError {
    /// The single line kept in the `Failed` state.
    pub fn user_message(&self) -> String {
        self.to_string()
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            AnalysisError::Server { status, .. } => Some(*status),
            _ => None,
        }
    }
}

fn transport_message(message: &str) -> &str {
    if message.trim().is_empty() {
        GENERIC_TRANSPORT_FAILURE
    } else {
        message
    }
}

#[derive(Debug, Error)]
pub enum ClipboardError {
    #[error("clipboard unavailable: {0}")]
    Unavailable(String),
    #[error("clipboard write rejected: {0}")]
    Rejected(String),
    #[error("could not serialize result: {0}")]
    Serialize(#[from] serde_json::Error),
}
