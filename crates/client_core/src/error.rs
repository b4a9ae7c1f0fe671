use thiserror::Error;

/// Message surfaced when a repository call exceeds its time bound.
pub const PLEASE_CHECK_INTERNET_CONNECTION: &str = "Please check your internet connection";

/// Failure half of every repository operation. Never raised across the
/// repository boundary; always returned as a value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    #[error("Please check your internet connection")]
    Timeout,
    #[error("{}", .message.as_deref().unwrap_or("remote operation failed"))]
    Remote { message: Option<String> },
}

impl RepositoryError {
    pub fn remote(err: &anyhow::Error) -> Self {
        let message = err.to_string();
        Self::Remote {
            message: (!message.trim().is_empty()).then_some(message),
        }
    }

    /// The underlying human-readable message, if the failure carried one.
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Timeout => Some(PLEASE_CHECK_INTERNET_CONNECTION),
            Self::Remote { message } => message.as_deref(),
        }
    }
}

pub type FetchResult<T> = Result<T, RepositoryError>;

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn timeout_display_matches_connectivity_message() {
        assert_eq!(
            RepositoryError::Timeout.to_string(),
            PLEASE_CHECK_INTERNET_CONNECTION
        );
        assert_eq!(
            RepositoryError::Timeout.message(),
            Some(PLEASE_CHECK_INTERNET_CONNECTION)
        );
    }

    #[test]
    fn remote_error_keeps_source_message() {
        let err = RepositoryError::remote(&anyhow!("network down"));
        assert_eq!(err.message(), Some("network down"));
    }

    #[test]
    fn blank_source_message_is_treated_as_absent() {
        let err = RepositoryError::remote(&anyhow!("   "));
        assert_eq!(err.message(), None);
        assert_eq!(err.to_string(), "remote operation failed");
    }
}
