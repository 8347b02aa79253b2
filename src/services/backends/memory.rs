
use crate::services::base::call_context::CallContext;
use crate::services::base::identifier::Identifier;
use crate::services::base::resource_kind::ResourceKind;
use crate::services::base::status::Status;
use crate::services::base::status::conflict_details::ConflictDetails;
use crate::services::base::status::not_found_details::NotFoundDetails;
use crate::services::base::transport::{DynamicWatchStream, Transport, UpdateOptions};
use async_trait::async_trait;
use futures::StreamExt;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ListMeta;
use kube::api::{DeleteParams, DynamicObject, ListParams, ObjectList, Patch, PatchParams, PostParams, WatchEvent, WatchParams};
use kube::core::TypeMeta;
use log::debug;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{RwLock, broadcast};
use uuid::Uuid;

const EVENT_CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Clone, Copy)]
enum EventType {
    Added,
    Modified,
    Deleted,
}

#[derive(Debug, Clone)]
struct StoredEvent {
    kind: ResourceKind,
    event_type: EventType,
    object: DynamicObject,
}

/// Process-local transport with the server-side semantics the clients rely on:
/// server-assigned UIDs, a resource version bumped on every mutation and
/// optimistic concurrency checks on update.
pub struct InMemoryTransport {
    objects: RwLock<HashMap<(ResourceKind, Identifier), DynamicObject>>,
    revision: AtomicU64,
    events: broadcast::Sender<StoredEvent>,
}

impl InMemoryTransport {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        InMemoryTransport {
            objects: RwLock::new(HashMap::new()),
            revision: AtomicU64::new(0),
            events,
        }
    }

    fn next_revision(&self) -> String {
        (self.revision.fetch_add(1, Ordering::SeqCst) + 1).to_string()
    }

    fn current_revision(&self) -> String {
        self.revision.load(Ordering::SeqCst).to_string()
    }

    fn publish(&self, kind: &ResourceKind, event_type: EventType, object: &DynamicObject) {
        // No receivers is not an error: nobody is watching.
        let _ = self.events.send(StoredEvent {
            kind: kind.clone(),
            event_type,
            object: object.clone(),
        });
    }

    fn stamp(kind: &ResourceKind, id: &Identifier, object: &mut DynamicObject) {
        object.types = Some(TypeMeta {
            api_version: kind.api_version(),
            kind: kind.kind.clone(),
        });
        object.metadata.name = Some(id.name.clone());
        object.metadata.namespace = Some(id.namespace.clone());
    }
}

impl Default for InMemoryTransport {
    fn default() -> Self {
        InMemoryTransport::new()
    }
}

fn matches_labels(object: &DynamicObject, selector: Option<&str>) -> bool {
    let Some(selector) = selector.filter(|s| !s.is_empty()) else {
        return true;
    };
    let labels = object.metadata.labels.clone().unwrap_or_default();
    selector.split(',').all(|requirement| match requirement.split_once('=') {
        Some((key, value)) => labels.get(key.trim()).map(String::as_str) == Some(value.trim()),
        None => labels.contains_key(requirement.trim()),
    })
}

fn merge_patch(target: &mut Value, patch: &Value) {
    let Value::Object(patch) = patch else {
        *target = patch.clone();
        return;
    };
    if !target.is_object() {
        *target = Value::Object(Default::default());
    }
    if let Value::Object(target) = target {
        for (key, value) in patch {
            if value.is_null() {
                target.remove(key);
            } else {
                merge_patch(target.entry(key.clone()).or_insert(Value::Null), value);
            }
        }
    }
}

#[async_trait]
impl Transport for InMemoryTransport {
    async fn list(
        &self,
        _ctx: &CallContext,
        kind: &ResourceKind,
        namespace: &str,
        params: &ListParams,
    ) -> Result<ObjectList<DynamicObject>, Status> {
        let objects = self.objects.read().await;
        let mut items: Vec<DynamicObject> = objects
            .iter()
            .filter(|((k, id), _)| k == kind && (namespace.is_empty() || id.namespace == namespace))
            .filter(|(_, object)| matches_labels(object, params.label_selector.as_deref()))
            .map(|(_, object)| object.clone())
            .collect();
        items.sort_by(|a, b| a.metadata.name.cmp(&b.metadata.name));

        Ok(ObjectList {
            types: TypeMeta {
                api_version: kind.api_version(),
                kind: kind.list_kind(),
            },
            metadata: ListMeta {
                resource_version: Some(self.current_revision()),
                ..Default::default()
            },
            items,
        })
    }

    async fn watch(
        &self,
        _ctx: &CallContext,
        kind: &ResourceKind,
        namespace: &str,
        _params: &WatchParams,
        _resource_version: &str,
    ) -> Result<DynamicWatchStream, Status> {
        let kind = kind.clone();
        let namespace = namespace.to_string();
        let receiver = self.events.subscribe();

        let events = futures::stream::unfold(receiver, |mut receiver| async move {
            loop {
                match receiver.recv().await {
                    Ok(event) => return Some((event, receiver)),
                    Err(RecvError::Lagged(skipped)) => debug!("Watcher lagged behind by {} events", skipped),
                    Err(RecvError::Closed) => return None,
                }
            }
        });

        let stream = events
            .filter(move |event| {
                let in_namespace = namespace.is_empty() || event.object.metadata.namespace.as_deref() == Some(namespace.as_str());
                futures::future::ready(event.kind == kind && in_namespace)
            })
            .map(|event| {
                Ok(match event.event_type {
                    EventType::Added => WatchEvent::Added(event.object),
                    EventType::Modified => WatchEvent::Modified(event.object),
                    EventType::Deleted => WatchEvent::Deleted(event.object),
                })
            });

        Ok(stream.boxed())
    }

    async fn get(&self, _ctx: &CallContext, kind: &ResourceKind, id: &Identifier) -> Result<DynamicObject, Status> {
        let objects = self.objects.read().await;
        match objects.get(&(kind.clone(), id.clone())) {
            Some(object) => Ok(object.clone()),
            None => Err(Status::NotFound(NotFoundDetails::from(id))),
        }
    }

    async fn create(
        &self,
        _ctx: &CallContext,
        kind: &ResourceKind,
        id: &Identifier,
        object: DynamicObject,
        params: &PostParams,
    ) -> Result<DynamicObject, Status> {
        if object.metadata.resource_version.as_ref().is_some_and(|v| !v.is_empty()) {
            return Err(Status::Invalid(
                "resourceVersion should not be set on objects to be created".to_string(),
            ));
        }

        let mut objects = self.objects.write().await;
        let key = (kind.clone(), id.clone());
        if objects.contains_key(&key) {
            return Err(Status::AlreadyExists(NotFoundDetails::from(id)));
        }

        let mut stored = object;
        Self::stamp(kind, id, &mut stored);
        stored.metadata.uid = Some(Uuid::new_v4().to_string());
        stored.metadata.generation = Some(1);

        if params.dry_run {
            return Ok(stored);
        }
        stored.metadata.resource_version = Some(self.next_revision());
        objects.insert(key, stored.clone());
        self.publish(kind, EventType::Added, &stored);
        Ok(stored)
    }

    async fn update(
        &self,
        _ctx: &CallContext,
        kind: &ResourceKind,
        id: &Identifier,
        object: DynamicObject,
        options: &UpdateOptions,
    ) -> Result<DynamicObject, Status> {
        let mut objects = self.objects.write().await;
        let key = (kind.clone(), id.clone());
        let current = objects
            .get(&key)
            .ok_or_else(|| Status::NotFound(NotFoundDetails::from(id)))?;

        options.validate()?;
        if let Some(presented) = options.presented_version() {
            if current.metadata.resource_version.as_deref() != Some(presented) {
                return Err(Status::Conflict(ConflictDetails::new(
                    id.clone(),
                    Some(presented.to_string()),
                    current.metadata.resource_version.clone(),
                )));
            }
        }

        let mut stored = object;
        Self::stamp(kind, id, &mut stored);
        stored.metadata.uid = current.metadata.uid.clone();
        stored.metadata.generation = current.metadata.generation.map(|g| g + 1);
        stored.metadata.resource_version = current.metadata.resource_version.clone();

        if options.dry_run {
            return Ok(stored);
        }
        stored.metadata.resource_version = Some(self.next_revision());
        objects.insert(key, stored.clone());
        self.publish(kind, EventType::Modified, &stored);
        Ok(stored)
    }

    async fn patch(
        &self,
        _ctx: &CallContext,
        kind: &ResourceKind,
        id: &Identifier,
        patch: &Patch<Value>,
        params: &PatchParams,
    ) -> Result<DynamicObject, Status> {
        let Patch::Merge(patch) = patch else {
            return Err(Status::Invalid("only merge patches are supported".to_string()));
        };

        let mut objects = self.objects.write().await;
        let key = (kind.clone(), id.clone());
        let current = objects
            .get(&key)
            .ok_or_else(|| Status::NotFound(NotFoundDetails::from(id)))?;

        let mut document = serde_json::to_value(current)?;
        merge_patch(&mut document, patch);
        let mut stored: DynamicObject = serde_json::from_value(document)?;
        Self::stamp(kind, id, &mut stored);
        stored.metadata.uid = current.metadata.uid.clone();
        stored.metadata.generation = current.metadata.generation.map(|g| g + 1);
        stored.metadata.resource_version = current.metadata.resource_version.clone();

        if params.dry_run {
            return Ok(stored);
        }
        stored.metadata.resource_version = Some(self.next_revision());
        objects.insert(key, stored.clone());
        self.publish(kind, EventType::Modified, &stored);
        Ok(stored)
    }

    async fn delete(
        &self,
        _ctx: &CallContext,
        kind: &ResourceKind,
        id: &Identifier,
        params: &DeleteParams,
    ) -> Result<(), Status> {
        let mut objects = self.objects.write().await;
        let key = (kind.clone(), id.clone());
        if params.dry_run {
            return match objects.contains_key(&key) {
                true => Ok(()),
                false => Err(Status::NotFound(NotFoundDetails::from(id))),
            };
        }
        match objects.remove(&key) {
            Some(removed) => {
                self.publish(kind, EventType::Deleted, &removed);
                Ok(())
            }
            None => Err(Status::NotFound(NotFoundDetails::from(id))),
        }
    }
}
