use std::io;

use thiserror::Error;

/// Reasons a form cannot be turned into an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("entry text is empty")]
    EmptyText,

    #[error("no mood selected")]
    MissingMood,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read `{key}` from storage")]
    Read {
        key: String,
        #[source]
        source: io::Error,
    },

    #[error("stored `{key}` is not a valid entry list")]
    Parse {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to write `{key}` to storage")]
    Write {
        key: String,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl StoreError {
    /// Storage read and payload parse failures both degrade to an empty list.
    pub fn is_read_failure(&self) -> bool {
        matches!(self, StoreError::Read { .. } | StoreError::Parse { .. })
    }

    /// Short message shown to the user in a notification.
    pub fn user_message(&self) -> &'static str {
        match self {
            StoreError::Read { .. } | StoreError::Parse { .. } => "Could not load your entries.",
            StoreError::Write { .. } => "Could not save your changes.",
            StoreError::Validation(ValidationError::EmptyText) => "Please write something!",
            StoreError::Validation(ValidationError::MissingMood) => {
                "Please write something and select a mood!"
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_and_parse_are_read_failures() {
        let read = StoreError::Read {
            key: "journalEntries".into(),
            source: io::Error::other("disk gone"),
        };
        let parse = StoreError::Parse {
            key: "journalEntries".into(),
            source: serde_json::from_str::<Vec<u8>>("{").unwrap_err(),
        };
        let write = StoreError::Write {
            key: "journalEntries".into(),
            source: io::Error::other("read only"),
        };

        assert!(read.is_read_failure());
        assert!(parse.is_read_failure());
        assert!(!write.is_read_failure());
        assert!(!StoreError::from(ValidationError::EmptyText).is_read_failure());
    }

    #[test]
    fn validation_error_is_transparent() {
        let err = StoreError::from(ValidationError::MissingMood);
        assert_eq!(err.to_string(), "no mood selected");
    }
}
