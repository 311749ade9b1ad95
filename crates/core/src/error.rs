/// Broad category of a [`StoryError`], used by hosts to decide how to surface a failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed input supplied by the author (bad import file, invalid editor target).
    UserInput,
    /// Missing or invalid credentials; the host should clear its session.
    Auth,
    /// The requested story does not exist on the server.
    NotFound,
    /// Transport failure or unexpected response status. Never retried automatically.
    TransientNetwork,
    /// Local I/O or encoding failure.
    Internal,
}

#[derive(Debug, thiserror::Error)]
pub enum StoryError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("failed to parse story JSON: {0}")]
    MalformedImport(serde_json::Error),
    #[error("failed to serialize story: {0}")]
    Serialization(serde_json::Error),
    #[error("failed to read story file: {0}")]
    FileRead(std::io::Error),
    #[error("failed to write story file: {0}")]
    FileWrite(std::io::Error),
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    #[error("story not found: {0}")]
    NotFound(String),
    #[error("network error: {0}")]
    TransientNetwork(String),
}

impl StoryError {
    /// Classifies this error for presentation.
    pub fn kind(&self) -> ErrorKind {
        match self {
            StoryError::InvalidInput(_) | StoryError::MalformedImport(_) => ErrorKind::UserInput,
            StoryError::Unauthorized(_) => ErrorKind::Auth,
            StoryError::NotFound(_) => ErrorKind::NotFound,
            StoryError::TransientNetwork(_) => ErrorKind::TransientNetwork,
            StoryError::Serialization(_) | StoryError::FileRead(_) | StoryError::FileWrite(_) => {
                ErrorKind::Internal
            }
        }
    }

    /// A short message suitable for an alert or status line.
    ///
    /// Import failures deliberately collapse to one generic message; the detailed parser error is
    /// still available through `Display`.
    pub fn user_message(&self) -> String {
        match self {
            StoryError::MalformedImport(_) => {
                "Failed to import story. Please check the file format.".into()
            }
            StoryError::Unauthorized(_) => "Your session has expired. Please sign in again.".into(),
            StoryError::NotFound(_) => "Story not found".into(),
            other => other.to_string(),
        }
    }
}

pub type StoryResult<T> = std::result::Result<T, StoryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_import_is_user_input_with_generic_message() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = StoryError::MalformedImport(parse_err);
        assert_eq!(err.kind(), ErrorKind::UserInput);
        assert_eq!(
            err.user_message(),
            "Failed to import story. Please check the file format."
        );
    }

    #[test]
    fn network_errors_keep_their_detail() {
        let err = StoryError::TransientNetwork("connection refused".into());
        assert_eq!(err.kind(), ErrorKind::TransientNetwork);
        assert!(err.user_message().contains("connection refused"));
    }
}
