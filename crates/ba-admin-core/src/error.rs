//! Error types for the admin core.

/// Every way a single user action can fail.
///
/// None of these are fatal to the page: each handler turns them into a
/// message in its own result area.
#[derive(Debug, thiserror::Error)]
pub enum AdminError {
    #[error("{0}")]
    Validation(String),

    #[error("HTTP error: {status}")]
    Http { status: u16 },

    #[error("network error: {0}")]
    Network(String),

    #[error("request timeout")]
    Timeout,

    #[error("malformed response: {0}")]
    Decode(String),

    #[error("{0}")]
    Application(String),

    #[error("storage error: {0}")]
    Storage(#[source] anyhow::Error),

    #[error("session is closed")]
    SessionClosed,
}

pub type Result<T> = std::result::Result<T, AdminError>;

impl From<serde_json::Error> for AdminError {
    fn from(err: serde_json::Error) -> Self {
        AdminError::Decode(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        assert_eq!(AdminError::Http { status: 502 }.to_string(), "HTTP error: 502");
        assert_eq!(AdminError::Timeout.to_string(), "request timeout");
        assert_eq!(
            AdminError::Validation("Enter an 11-digit phone number".into()).to_string(),
            "Enter an 11-digit phone number"
        );
        assert_eq!(AdminError::SessionClosed.to_string(), "session is closed");
    }

    #[test]
    fn json_errors_become_decode() {
        let err: AdminError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert!(matches!(err, AdminError::Decode(_)));
    }
}
