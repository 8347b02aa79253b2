#[cfg(test)]
mod tests;

use crate::services::base::call_context::CallContext;
use crate::services::base::identifier::Identifier;
use crate::services::base::resource_kind::ResourceKind;
use crate::services::base::status::Status;
use crate::services::base::status::type_mismatch_details::TypeMismatchDetails;
use crate::services::base::transport::{Transport, UpdateOptions};
use crate::services::clients::watch_event::WatchEvent;
use crate::services::registry::ClientRegistry;
use futures::stream::BoxStream;
use futures::{StreamExt, TryStreamExt};
use kube::api::{DeleteParams, DynamicObject, ListParams, ObjectList, Patch, PatchParams, PostParams, WatchParams};
use kube::core::{TypeMeta, WatchEvent as DynamicWatchEvent};
use log::{debug, warn};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::any::type_name;
use std::fmt::Debug;
use std::marker::PhantomData;
use std::sync::Arc;

pub type WatchStream<T> = BoxStream<'static, Result<WatchEvent<T>, Status>>;

/// Type-safe front door for one resource kind over one transport.
/// Every payload coming back from the transport is checked against the bound kind before it is
/// handed to the caller; a payload of another kind is reported as [`Status::TypeMismatch`].
pub struct ResourceClient<T> {
    transport: Arc<dyn Transport>,
    kind: ResourceKind,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for ResourceClient<T> {
    fn clone(&self) -> Self {
        ResourceClient {
            transport: self.transport.clone(),
            kind: self.kind.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T> ResourceClient<T>
where
    T: Clone + Serialize + DeserializeOwned + Debug + Send + 'static,
{
    pub fn new(transport: Arc<dyn Transport>, kind: ResourceKind) -> Self {
        ResourceClient {
            transport,
            kind,
            _marker: PhantomData,
        }
    }

    /// Resolves the transport for `kind` and binds a client to it.
    pub async fn from_registry<R>(registry: &R, kind: ResourceKind) -> Result<Self, Status>
    where
        R: ClientRegistry + ?Sized,
    {
        let transport = registry.client_for(&kind).await?;
        Ok(ResourceClient::new(transport, kind))
    }

    pub fn kind(&self) -> &ResourceKind {
        &self.kind
    }

    pub async fn get(&self, ctx: &CallContext, id: &Identifier) -> Result<T, Status> {
        debug!("Getting {} {}", self.kind.kind, id);
        let object = ctx.run("get", self.transport.get(ctx, &self.kind, id)).await?;
        to_typed(&self.kind, object)
    }

    pub async fn list(&self, ctx: &CallContext, namespace: &str, params: &ListParams) -> Result<ObjectList<T>, Status> {
        debug!("Listing {} in namespace {:?}", self.kind.kind, namespace);
        let list = ctx
            .run("list", self.transport.list(ctx, &self.kind, namespace, params))
            .await?;
        to_typed_list(&self.kind, list)
    }

    /// Opens a live event stream. Events are passed through as they arrive; the stream ends
    /// when the transport closes it or the call context is cancelled.
    pub async fn watch(
        &self,
        ctx: &CallContext,
        namespace: &str,
        params: &WatchParams,
        resource_version: &str,
    ) -> Result<WatchStream<T>, Status> {
        debug!(
            "Watching {} in namespace {:?} from version {:?}",
            self.kind.kind, namespace, resource_version
        );
        let stream = ctx
            .run(
                "watch",
                self.transport.watch(ctx, &self.kind, namespace, params, resource_version),
            )
            .await?;

        let kind = self.kind.clone();
        let typed = stream
            .and_then(move |event| futures::future::ready(to_typed_event::<T>(&kind, event)))
            .take_until(ctx.cancelled());
        Ok(typed.boxed())
    }

    /// Creates `object` under the identifier taken from its own metadata.
    /// The server assigns the first resource version, so any version on the object is dropped.
    pub async fn create(&self, ctx: &CallContext, object: &T, params: &PostParams) -> Result<T, Status> {
        let mut dynamic = to_dynamic(&self.kind, object)?;
        let id = identifier_of(&self.kind, &dynamic)?;
        dynamic.metadata.resource_version = None;
        debug!("Creating {} {}", self.kind.kind, id);

        let created = ctx
            .run("create", self.transport.create(ctx, &self.kind, &id, dynamic, params))
            .await
            .inspect_err(|e| warn!("Failed to create {} {}: {}", self.kind.kind, id, e))?;
        to_typed(&self.kind, created)
    }

    /// Replaces `object`. The concurrency check is governed by `options` alone: a presented
    /// resource version must match the stored one, and only [`Precondition::Overwrite`](crate::services::base::transport::Precondition::Overwrite) skips the check.
    pub async fn update(&self, ctx: &CallContext, object: &T, options: &UpdateOptions) -> Result<T, Status> {
        options.validate()?;
        let dynamic = to_dynamic(&self.kind, object)?;
        let id = identifier_of(&self.kind, &dynamic)?;
        debug!(
            "Updating {} {} with precondition {:?}",
            self.kind.kind, id, options.precondition
        );

        let updated = ctx
            .run("update", self.transport.update(ctx, &self.kind, &id, dynamic, options))
            .await
            .inspect_err(|e| warn!("Failed to update {} {}: {}", self.kind.kind, id, e))?;
        to_typed(&self.kind, updated)
    }

    pub async fn patch(
        &self,
        ctx: &CallContext,
        id: &Identifier,
        patch: &Patch<Value>,
        params: &PatchParams,
    ) -> Result<T, Status> {
        debug!("Patching {} {}", self.kind.kind, id);
        let patched = ctx
            .run("patch", self.transport.patch(ctx, &self.kind, id, patch, params))
            .await?;
        to_typed(&self.kind, patched)
    }

    pub async fn delete(&self, ctx: &CallContext, id: &Identifier, params: &DeleteParams) -> Result<(), Status> {
        debug!("Deleting {} {}", self.kind.kind, id);
        ctx.run("delete", self.transport.delete(ctx, &self.kind, id, params))
            .await
    }
}

fn expected_type<T>(kind: &ResourceKind) -> String {
    format!("{} ({})", type_name::<T>(), kind)
}

fn actual_type(types: Option<&TypeMeta>) -> String {
    match types {
        Some(types) => format!("{}, Kind={}", types.api_version, types.kind),
        None => "untyped object".to_string(),
    }
}

/// Checked conversion of a transport payload into the bound type.
/// The payload must name the bound kind; an untyped payload is never trusted, since a
/// permissive type may deserialize from anything.
fn to_typed<T>(kind: &ResourceKind, object: DynamicObject) -> Result<T, Status>
where
    T: DeserializeOwned,
{
    match &object.types {
        Some(types) if kind.matches(&types.api_version, &types.kind) => {}
        types => {
            return Err(mismatch(TypeMismatchDetails::new(
                expected_type::<T>(kind),
                actual_type(types.as_ref()),
            )));
        }
    }

    let actual = actual_type(object.types.as_ref());
    serde_json::to_value(object)
        .and_then(serde_json::from_value)
        .map_err(|e| mismatch(TypeMismatchDetails::new(expected_type::<T>(kind), actual).with_reason(e.to_string())))
}

fn mismatch(details: TypeMismatchDetails) -> Status {
    warn!("Transport returned an unexpected payload: {}", details);
    Status::TypeMismatch(details)
}

/// The list is checked as a whole. Items inside a list usually carry no type information,
/// so untyped items take the item type of the checked list; typed items are checked as usual.
fn to_typed_list<T>(kind: &ResourceKind, list: ObjectList<DynamicObject>) -> Result<ObjectList<T>, Status>
where
    T: Clone + DeserializeOwned,
{
    let types = &list.types;
    let list_matches = (types.kind.is_empty() || types.kind == kind.list_kind())
        && (types.api_version.is_empty() || types.api_version == kind.api_version());
    if !list_matches {
        return Err(mismatch(TypeMismatchDetails::new(
            format!("list of {}", expected_type::<T>(kind)),
            actual_type(Some(types)),
        )));
    }

    let items = list
        .items
        .into_iter()
        .map(|mut item| {
            if item.types.is_none() {
                item.types = Some(item_type(kind));
            }
            to_typed(kind, item)
        })
        .collect::<Result<Vec<T>, Status>>()?;
    Ok(ObjectList {
        types: list.types,
        metadata: list.metadata,
        items,
    })
}

fn to_typed_event<T>(kind: &ResourceKind, event: DynamicWatchEvent<DynamicObject>) -> Result<WatchEvent<T>, Status>
where
    T: DeserializeOwned,
{
    match event {
        DynamicWatchEvent::Added(object) => Ok(WatchEvent::Added(to_typed(kind, object)?)),
        DynamicWatchEvent::Modified(object) => Ok(WatchEvent::Modified(to_typed(kind, object)?)),
        DynamicWatchEvent::Deleted(object) => Ok(WatchEvent::Deleted(to_typed(kind, object)?)),
        DynamicWatchEvent::Bookmark(bookmark) => Ok(WatchEvent::Bookmark(bookmark.metadata.resource_version)),
        DynamicWatchEvent::Error(response) => Err(Status::from(kube::Error::Api(response))),
    }
}

/// Converts the caller's object into the transport payload, stamped with the bound kind
/// so the transport can route it.
fn to_dynamic<T>(kind: &ResourceKind, object: &T) -> Result<DynamicObject, Status>
where
    T: Serialize,
{
    let mut dynamic: DynamicObject = serde_json::from_value(serde_json::to_value(object)?)?;
    dynamic.types = Some(item_type(kind));
    Ok(dynamic)
}

fn item_type(kind: &ResourceKind) -> TypeMeta {
    TypeMeta {
        api_version: kind.api_version(),
        kind: kind.kind.clone(),
    }
}

fn identifier_of(kind: &ResourceKind, object: &DynamicObject) -> Result<Identifier, Status> {
    Identifier::from_meta(&object.metadata).ok_or_else(|| {
        Status::Invalid(format!(
            "{} object must carry both a name and a namespace",
            kind.kind
        ))
    })
}
