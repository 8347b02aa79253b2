use std::error::Error;
use std::fmt::{Display, Formatter};

/// Failure to merge declared fields into an opaque spec document.
#[derive(Debug)]
pub enum MergeError {
    InvalidJson(serde_json::Error),
    /// The document parsed, but its root is not a JSON object. Carries the JSON type found.
    NotAnObject(String),
}

impl Display for MergeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            MergeError::InvalidJson(e) => write!(f, "spec document is not valid JSON: {}", e),
            MergeError::NotAnObject(found) => write!(f, "spec document must be a JSON object, got: {}", found),
        }
    }
}

impl Error for MergeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            MergeError::InvalidJson(e) => Some(e),
            MergeError::NotAnObject(_) => None,
        }
    }
}
