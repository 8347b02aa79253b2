use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use std::fmt::{Display, Formatter};

/// Addresses a single resource instance within a kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identifier {
    pub namespace: String,
    pub name: String,
}

impl Identifier {
    pub fn new(namespace: &str, name: &str) -> Self {
        Identifier {
            namespace: namespace.to_string(),
            name: name.to_string(),
        }
    }

    /// Reads the identifier from object metadata, if both parts are set.
    pub fn from_meta(meta: &ObjectMeta) -> Option<Self> {
        match (&meta.namespace, &meta.name) {
            (Some(namespace), Some(name)) if !name.is_empty() => Some(Identifier::new(namespace, name)),
            _ => None,
        }
    }
}

impl Display for Identifier {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}
