use crate::services::base::identifier::Identifier;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub struct ConflictDetails {
    pub identifier: Option<Identifier>,
    pub presented_version: Option<String>,
    pub current_version: Option<String>,
    pub message: Option<String>,
}

impl ConflictDetails {
    pub fn new(identifier: Identifier, presented_version: Option<String>, current_version: Option<String>) -> Self {
        ConflictDetails {
            identifier: Some(identifier),
            presented_version,
            current_version,
            message: None,
        }
    }

    pub fn from_message(message: String) -> Self {
        ConflictDetails {
            identifier: None,
            presented_version: None,
            current_version: None,
            message: Some(message),
        }
    }
}

impl Display for ConflictDetails {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if let Some(message) = &self.message {
            return write!(f, "{}", message);
        }
        write!(
            f,
            "resource '{}' was modified: presented version {:?}, current version {:?}",
            self.identifier
                .as_ref()
                .map(|id| id.to_string())
                .unwrap_or_else(|| "unknown".to_string()),
            self.presented_version,
            self.current_version
        )
    }
}
