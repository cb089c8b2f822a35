use thiserror::Error;

/// Top-level error type for the Showroom console.
///
/// Every variant is terminal at the editor boundary: nothing is retried
/// automatically, the operator re-attempts the action.
#[derive(Debug, Error)]
pub enum ShowroomError {
    /// A required form field is missing or malformed. Raised before any I/O.
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("upload failed for {path}: {message}")]
    UploadFailed { path: String, message: String },

    #[error("write to '{table}' failed: {message}")]
    Persist { table: String, message: String },

    /// Some storage objects could not be removed during a record delete.
    #[error("storage cleanup incomplete, {} path(s) not removed", failed.len())]
    CleanupPartialFailure { failed: Vec<String> },

    /// A persisted media field could not be classified.
    #[error("unrecognised media field: {0}")]
    ParseAmbiguity(String),

    #[error("not authorized: {0}")]
    Unauthorized(String),

    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ShowroomError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn persist(table: impl Into<String>, message: impl ToString) -> Self {
        Self::Persist {
            table: table.into(),
            message: message.to_string(),
        }
    }

    pub fn upload(path: impl Into<String>, message: impl ToString) -> Self {
        Self::UploadFailed {
            path: path.into(),
            message: message.to_string(),
        }
    }
}

pub type Result<T, E = ShowroomError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cleanup_failure_reports_count() {
        let err = ShowroomError::CleanupPartialFailure {
            failed: vec!["gallery/1-a.png".into(), "gallery/2-b.png".into()],
        };
        assert_eq!(err.to_string(), "storage cleanup incomplete, 2 path(s) not removed");
    }

    #[test]
    fn persist_error_names_table() {
        let err = ShowroomError::persist("stories", "409 Conflict");
        assert!(err.to_string().contains("'stories'"));
        assert!(err.to_string().contains("409 Conflict"));
    }
}
