use crate::services::base::identifier::Identifier;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub struct NotFoundDetails {
    pub name: String,
    pub namespace: Option<String>,
    pub message: Option<String>,
}

impl NotFoundDetails {
    pub fn new(name: String, namespace: Option<String>) -> Self {
        NotFoundDetails {
            name,
            namespace,
            message: None,
        }
    }

    /// Used when only the server's message is known.
    pub fn from_message(message: String) -> Self {
        NotFoundDetails {
            name: String::new(),
            namespace: None,
            message: Some(message),
        }
    }
}

impl Display for NotFoundDetails {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if let Some(message) = &self.message {
            return write!(f, "{}", message);
        }
        let namespace = self.namespace.as_deref().unwrap_or("unknown");
        write!(f, "resource name: '{}', namespace '{}'", self.name, namespace)
    }
}

impl From<&Identifier> for NotFoundDetails {
    fn from(id: &Identifier) -> Self {
        NotFoundDetails::new(id.name.clone(), Some(id.namespace.clone()))
    }
}
