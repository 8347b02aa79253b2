use std::fmt::{Display, Formatter};

/// Describes a transport payload that could not be converted into the client's bound type.
#[derive(Debug)]
pub struct TypeMismatchDetails {
    pub expected: String,
    pub actual: String,
    pub reason: Option<String>,
}

impl TypeMismatchDetails {
    pub fn new(expected: String, actual: String) -> Self {
        TypeMismatchDetails {
            expected,
            actual,
            reason: None,
        }
    }

    pub fn with_reason(mut self, reason: String) -> Self {
        self.reason = Some(reason);
        self
    }
}

impl Display for TypeMismatchDetails {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid type, expected: {}, got: {}", self.expected, self.actual)?;
        if let Some(reason) = &self.reason {
            write!(f, " ({})", reason)?;
        }
        Ok(())
    }
}
