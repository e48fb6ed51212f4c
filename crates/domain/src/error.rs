use std::fmt;

#[derive(thiserror::Error, Debug)]
pub enum ReadError {
    #[error("not found")]
    NotFound,
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error>),
}

#[derive(thiserror::Error, Debug)]
pub enum CreateError {
    #[error("conflict")]
    Conflict,
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error>),
}

impl From<UpdateError> for CreateError {
    fn from(value: UpdateError) -> Self {
        match value {
            UpdateError::NotFound => CreateError::Other("not found".into()),
            UpdateError::Invalid(invalid) => CreateError::Invalid(invalid),
            UpdateError::Storage(storage) => CreateError::Storage(storage),
            UpdateError::Other(other) => CreateError::Other(other),
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum UpdateError {
    #[error("not found")]
    NotFound,
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error>),
}

impl From<ReadError> for UpdateError {
    fn from(value: ReadError) -> Self {
        match value {
            ReadError::NotFound => UpdateError::NotFound,
            ReadError::Storage(storage) => UpdateError::Storage(storage),
            ReadError::Other(other) => UpdateError::Other(other),
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum DeleteError {
    #[error("not found")]
    NotFound,
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error>),
}

impl From<ReadError> for DeleteError {
    fn from(value: ReadError) -> Self {
        match value {
            ReadError::NotFound => DeleteError::NotFound,
            ReadError::Storage(storage) => DeleteError::Storage(storage),
            ReadError::Other(other) => DeleteError::Other(other),
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum StorageError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    #[error("no session")]
    NoSession,
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error>),
}

/// User input that violates one or more rules.
///
/// Carries every message produced by the failed validation, in rule order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError(pub Vec<String>);

impl ValidationError {
    #[must_use]
    pub fn messages(&self) -> &[String] {
        &self.0
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0.join("; "))
    }
}

impl std::error::Error for ValidationError {}

impl From<Vec<String>> for ValidationError {
    fn from(value: Vec<String>) -> Self {
        Self(value)
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ImportError {
    #[error("invalid backup file: {0}")]
    Parse(String),
    #[error("invalid backup file: missing collection \"{0}\"")]
    MissingCollection(&'static str),
    #[error("invalid backup file: {collection}[{index}]: {reason}")]
    InvalidRecord {
        collection: &'static str,
        index: usize,
        reason: String,
    },
    #[error("invalid backup file: duplicate id \"{id}\" in {collection}")]
    DuplicateId {
        collection: &'static str,
        id: String,
    },
    #[error(transparent)]
    Storage(#[from] StorageError),
}

#[derive(thiserror::Error, Debug)]
pub enum AuthError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("session expired")]
    SessionExpired,
    #[error("no session")]
    NoSession,
    #[error("user already exists")]
    Conflict,
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error>),
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_create_error_from_update_error() {
        assert!(matches!(
            CreateError::from(UpdateError::Invalid(ValidationError(vec!["foo".into()]))),
            CreateError::Invalid(ValidationError(messages)) if messages == ["foo"]
        ));
        assert!(matches!(
            CreateError::from(UpdateError::Storage(StorageError::NoSession)),
            CreateError::Storage(StorageError::NoSession)
        ));
        assert!(matches!(
            CreateError::from(UpdateError::Other("foo".into())),
            CreateError::Other(error) if error.to_string() == "foo"
        ));
    }

    #[test]
    fn test_update_error_from_read_error() {
        assert!(matches!(
            UpdateError::from(ReadError::NotFound),
            UpdateError::NotFound
        ));
        assert!(matches!(
            UpdateError::from(ReadError::Storage(StorageError::Unavailable("x".into()))),
            UpdateError::Storage(StorageError::Unavailable(reason)) if reason == "x"
        ));
    }

    #[test]
    fn test_delete_error_from_read_error() {
        assert!(matches!(
            DeleteError::from(ReadError::NotFound),
            DeleteError::NotFound
        ));
        assert!(matches!(
            DeleteError::from(ReadError::Other("foo".into())),
            DeleteError::Other(error) if error.to_string() == "foo"
        ));
    }

    #[test]
    fn test_validation_error_display() {
        assert_eq!(
            ValidationError(vec!["a".to_string(), "b".to_string()]).to_string(),
            "a; b"
        );
    }

    #[test]
    fn test_import_error_display() {
        assert_eq!(
            ImportError::MissingCollection("exercises").to_string(),
            "invalid backup file: missing collection \"exercises\""
        );
        assert_eq!(
            ImportError::InvalidRecord {
                collection: "exercises",
                index: 2,
                reason: "missing field `id`".to_string(),
            }
            .to_string(),
            "invalid backup file: exercises[2]: missing field `id`"
        );
    }
}
