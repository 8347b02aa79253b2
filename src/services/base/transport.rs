use crate::services::base::call_context::CallContext;
use crate::services::base::identifier::Identifier;
use crate::services::base::resource_kind::ResourceKind;
use crate::services::base::status::Status;
use async_trait::async_trait;
use futures::stream::BoxStream;
use kube::api::{DeleteParams, DynamicObject, ListParams, ObjectList, Patch, PatchParams, PostParams, WatchEvent, WatchParams};
use serde_json::Value;

/// Live stream of untyped watch events, passed through without buffering or reconnects.
pub type DynamicWatchStream = BoxStream<'static, Result<WatchEvent<DynamicObject>, Status>>;

/// Concurrency guard presented with a replace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Precondition {
    /// The stored object must still carry this resource version.
    ResourceVersion(String),
    /// Last writer wins. Must be asked for explicitly.
    Overwrite,
}

/// Options for replacing a resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateOptions {
    pub precondition: Precondition,
    pub dry_run: bool,
}

impl UpdateOptions {
    pub fn with_resource_version(resource_version: impl Into<String>) -> Self {
        UpdateOptions {
            precondition: Precondition::ResourceVersion(resource_version.into()),
            dry_run: false,
        }
    }

    pub fn overwrite() -> Self {
        UpdateOptions {
            precondition: Precondition::Overwrite,
            dry_run: false,
        }
    }

    pub fn dry_run(mut self) -> Self {
        self.dry_run = true;
        self
    }

    /// The version the stored object is checked against, `None` when overwriting.
    pub fn presented_version(&self) -> Option<&str> {
        match &self.precondition {
            Precondition::ResourceVersion(version) => Some(version),
            Precondition::Overwrite => None,
        }
    }

    /// Rejects a version check that has no version to check against.
    pub fn validate(&self) -> Result<(), Status> {
        match &self.precondition {
            Precondition::ResourceVersion(version) if version.is_empty() => Err(Status::Invalid(
                "update requires a resource version unless overwrite is requested".to_string(),
            )),
            _ => Ok(()),
        }
    }
}

/// Untyped object client. One transport may serve several kinds sharing a connection,
/// so every call names the kind it addresses.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn list(
        &self,
        ctx: &CallContext,
        kind: &ResourceKind,
        namespace: &str,
        params: &ListParams,
    ) -> Result<ObjectList<DynamicObject>, Status>;

    async fn watch(
        &self,
        ctx: &CallContext,
        kind: &ResourceKind,
        namespace: &str,
        params: &WatchParams,
        resource_version: &str,
    ) -> Result<DynamicWatchStream, Status>;

    async fn get(&self, ctx: &CallContext, kind: &ResourceKind, id: &Identifier) -> Result<DynamicObject, Status>;

    async fn create(
        &self,
        ctx: &CallContext,
        kind: &ResourceKind,
        id: &Identifier,
        object: DynamicObject,
        params: &PostParams,
    ) -> Result<DynamicObject, Status>;

    async fn update(
        &self,
        ctx: &CallContext,
        kind: &ResourceKind,
        id: &Identifier,
        object: DynamicObject,
        options: &UpdateOptions,
    ) -> Result<DynamicObject, Status>;

    async fn patch(
        &self,
        ctx: &CallContext,
        kind: &ResourceKind,
        id: &Identifier,
        patch: &Patch<Value>,
        params: &PatchParams,
    ) -> Result<DynamicObject, Status>;

    async fn delete(
        &self,
        ctx: &CallContext,
        kind: &ResourceKind,
        id: &Identifier,
        params: &DeleteParams,
    ) -> Result<(), Status>;
}
