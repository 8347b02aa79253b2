pub mod conflict_details;
pub mod merge_error;
pub mod not_found_details;
pub mod type_mismatch_details;

use crate::services::base::status::conflict_details::ConflictDetails;
use crate::services::base::status::merge_error::MergeError;
use crate::services::base::status::not_found_details::NotFoundDetails;
use crate::services::base::status::type_mismatch_details::TypeMismatchDetails;
use kube::core::ErrorResponse;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// The error type for every resource client operation.
/// Variants are kept distinguishable so callers can decide between retrying,
/// reporting to the user and treating the failure as fatal.
#[derive(Debug)]
pub enum Status {
    UnknownKind(String),
    TypeMismatch(TypeMismatchDetails),
    NotFound(NotFoundDetails),
    AlreadyExists(NotFoundDetails),
    Conflict(ConflictDetails),
    Merge(MergeError),
    Invalid(String),
    NamespaceMissing,
    Cancelled(String),
    Timeout(String),
    ConversionError(anyhow::Error),
    Other(kube::Error),
}

impl Status {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Status::NotFound(_))
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, Status::Conflict(_))
    }

    pub fn is_type_mismatch(&self) -> bool {
        matches!(self, Status::TypeMismatch(_))
    }

    /// Whether re-reading the resource and repeating the call may succeed.
    /// Nothing in this crate retries on its own.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Status::Conflict(_) | Status::Timeout(_))
    }
}

impl From<kube::Error> for Status {
    fn from(error: kube::Error) -> Self {
        match error {
            kube::Error::Api(ErrorResponse { code: 404, message, .. }) => {
                Status::NotFound(NotFoundDetails::from_message(message))
            }
            kube::Error::Api(ErrorResponse {
                code: 409, reason, message, ..
            }) if reason == "AlreadyExists" => Status::AlreadyExists(NotFoundDetails::from_message(message)),
            kube::Error::Api(ErrorResponse { code: 409, message, .. }) => {
                Status::Conflict(ConflictDetails::from_message(message))
            }
            kube::Error::Api(ErrorResponse { code: 422, message, .. }) => Status::Invalid(message),
            _ => Status::Other(error),
        }
    }
}

impl From<anyhow::Error> for Status {
    fn from(error: anyhow::Error) -> Self {
        Status::ConversionError(error)
    }
}

impl From<serde_json::Error> for Status {
    fn from(error: serde_json::Error) -> Self {
        Status::ConversionError(error.into())
    }
}

impl From<MergeError> for Status {
    fn from(error: MergeError) -> Self {
        Status::Merge(error)
    }
}

impl Display for Status {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Status::UnknownKind(kind) => write!(f, "No client registered for kind: {}", kind),
            Status::TypeMismatch(details) => write!(f, "Type mismatch: {}", details),
            Status::NotFound(details) => write!(f, "Resource not found: {}", details),
            Status::AlreadyExists(details) => write!(f, "Resource already exists: {}", details),
            Status::Conflict(details) => write!(f, "Conflict error occurred: {}", details),
            Status::Merge(cause) => write!(f, "Failed to merge spec: {}", cause),
            Status::Invalid(message) => write!(f, "Invalid resource: {}", message),
            Status::NamespaceMissing => write!(
                f,
                "Expected either Grafana org ID (for local Grafana) or Grafana stack ID (for Grafana Cloud) to be set"
            ),
            Status::Cancelled(operation) => write!(f, "Operation cancelled: {}", operation),
            Status::Timeout(message) => write!(f, "Operation timed out: {}", message),
            Status::ConversionError(cause) => write!(f, "Conversion error occurred: {}", cause),
            Status::Other(e) => write!(f, "An error occurred: {}", e),
        }
    }
}

impl Error for Status {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Status::Merge(cause) => Some(cause),
            Status::Other(e) => Some(e),
            _ => None,
        }
    }
}
