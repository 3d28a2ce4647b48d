use thiserror::Error;

/// Failure talking to the sync backend
///
/// Never fatal: callers surface it as a failure notification and keep their
/// previous state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("network error: {0}")]
    Network(String),
    #[error("backend answered with HTTP {code}")]
    Status { code: u16 },
    #[error("malformed response: {0}")]
    Decode(String),
}

impl From<ureq::Error> for TransportError {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::Status(code, _) => TransportError::Status { code },
            ureq::Error::Transport(transport) => TransportError::Network(transport.to_string()),
        }
    }
}

impl From<serde_json::Error> for TransportError {
    fn from(err: serde_json::Error) -> Self {
        TransportError::Decode(err.to_string())
    }
}
