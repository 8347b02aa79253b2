use super::ResourceClient;
use crate::services::base::call_context::CallContext;
use crate::services::base::identifier::Identifier;
use crate::services::base::resource_kind::ResourceKind;
use crate::services::base::status::Status;
use crate::services::base::transport::{DynamicWatchStream, Transport, UpdateOptions};
use crate::services::clients::watch_event::WatchEvent;
use crate::services::resources::dashboard::{Dashboard, DashboardSpec};
use crate::services::resources::playlist::{Playlist, PlaylistSpec};
use crate::testing::in_memory_registry_context::InMemoryRegistryContext;
use async_trait::async_trait;
use futures::StreamExt;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ListMeta;
use kube::api::{
    DeleteParams, DynamicObject, ListParams, ObjectList, Patch, PatchParams, PostParams, WatchEvent as DynamicWatchEvent,
    WatchParams,
};
use kube::core::TypeMeta;
use serde_json::{Map, Value, json};
use std::sync::Arc;
use std::time::Duration;
use test_context::test_context;

/// Answers every call with a playlist, whatever kind was asked for.
struct WrongKindTransport;

fn playlist_object() -> DynamicObject {
    DynamicObject::new("morning", &ResourceKind::of::<Playlist>().api_resource())
        .within("default")
        .data(json!({ "spec": { "title": "Morning", "interval": "5m", "items": [] } }))
}

#[async_trait]
impl Transport for WrongKindTransport {
    async fn list(
        &self,
        _ctx: &CallContext,
        _kind: &ResourceKind,
        _namespace: &str,
        _params: &ListParams,
    ) -> Result<ObjectList<DynamicObject>, Status> {
        let kind = ResourceKind::of::<Playlist>();
        Ok(ObjectList {
            types: TypeMeta {
                api_version: kind.api_version(),
                kind: kind.list_kind(),
            },
            metadata: ListMeta::default(),
            items: vec![playlist_object()],
        })
    }

    async fn watch(
        &self,
        _ctx: &CallContext,
        _kind: &ResourceKind,
        _namespace: &str,
        _params: &WatchParams,
        _resource_version: &str,
    ) -> Result<DynamicWatchStream, Status> {
        Ok(futures::stream::iter(vec![Ok(DynamicWatchEvent::Added(playlist_object()))]).boxed())
    }

    async fn get(&self, _ctx: &CallContext, _kind: &ResourceKind, _id: &Identifier) -> Result<DynamicObject, Status> {
        Ok(playlist_object())
    }

    async fn create(
        &self,
        _ctx: &CallContext,
        _kind: &ResourceKind,
        _id: &Identifier,
        _object: DynamicObject,
        _params: &PostParams,
    ) -> Result<DynamicObject, Status> {
        Ok(playlist_object())
    }

    async fn update(
        &self,
        _ctx: &CallContext,
        _kind: &ResourceKind,
        _id: &Identifier,
        _object: DynamicObject,
        _options: &UpdateOptions,
    ) -> Result<DynamicObject, Status> {
        Ok(playlist_object())
    }

    async fn patch(
        &self,
        _ctx: &CallContext,
        _kind: &ResourceKind,
        _id: &Identifier,
        _patch: &Patch<Value>,
        _params: &PatchParams,
    ) -> Result<DynamicObject, Status> {
        Ok(playlist_object())
    }

    async fn delete(
        &self,
        _ctx: &CallContext,
        _kind: &ResourceKind,
        _id: &Identifier,
        _params: &DeleteParams,
    ) -> Result<(), Status> {
        Ok(())
    }
}

fn dashboard(name: &str, namespace: &str, spec: Value) -> Dashboard {
    let object: Map<String, Value> = serde_json::from_value(spec).unwrap();
    let mut dashboard = Dashboard::new(name, DashboardSpec { object });
    dashboard.metadata.namespace = Some(namespace.to_string());
    dashboard
}

fn dashboard_client(transport: Arc<dyn Transport>) -> ResourceClient<Dashboard> {
    ResourceClient::new(transport, ResourceKind::of::<Dashboard>())
}

fn assert_type_mismatch<T: std::fmt::Debug>(result: Result<T, Status>) {
    match result {
        Err(Status::TypeMismatch(details)) => {
            assert!(details.expected.contains("Dashboard"), "expected: {}", details.expected);
            assert!(
                details.actual.starts_with("playlist.grafana.app/v0alpha1, Kind=Playlist"),
                "actual: {}",
                details.actual
            );
        }
        other => panic!("expected a type mismatch, got: {:?}", other),
    }
}

#[tokio::test]
async fn test_every_operation_detects_wrong_kind() {
    // Arrange
    let client = dashboard_client(Arc::new(WrongKindTransport));
    let ctx = CallContext::new();
    let id = Identifier::new("default", "morning");
    let object = dashboard("morning", "default", json!({ "title": "A" }));

    // Act & Assert
    assert_type_mismatch(client.get(&ctx, &id).await);
    assert_type_mismatch(client.create(&ctx, &object, &PostParams::default()).await);
    assert_type_mismatch(client.update(&ctx, &object, &UpdateOptions::overwrite()).await);
    assert_type_mismatch(
        client
            .patch(&ctx, &id, &Patch::Merge(json!({})), &PatchParams::default())
            .await,
    );
    assert_type_mismatch(client.list(&ctx, "default", &ListParams::default()).await.map(|l| l.items));

    let mut stream = client
        .watch(&ctx, "default", &WatchParams::default(), "0")
        .await
        .unwrap();
    assert_type_mismatch(stream.next().await.unwrap());
}

#[test]
fn test_untyped_payload_is_rejected() {
    let mut untyped = playlist_object();
    untyped.types = None;

    let result = super::to_typed::<Dashboard>(&ResourceKind::of::<Dashboard>(), untyped);

    match result {
        Err(Status::TypeMismatch(details)) => {
            assert!(details.expected.contains("Dashboard"), "expected: {}", details.expected);
            assert_eq!(details.actual, "untyped object");
        }
        other => panic!("expected a type mismatch, got: {:?}", other),
    }
}

#[test]
fn test_payload_that_does_not_deserialize() {
    let mut malformed = playlist_object();
    malformed.data = json!({ "spec": { "title": 5 } });

    let result = super::to_typed::<Playlist>(&ResourceKind::of::<Playlist>(), malformed);

    match result {
        Err(Status::TypeMismatch(details)) => {
            assert_eq!(details.actual, "playlist.grafana.app/v0alpha1, Kind=Playlist");
            assert!(details.reason.is_some());
        }
        other => panic!("expected a type mismatch, got: {:?}", other),
    }
}

#[test]
fn test_list_items_take_the_list_type() {
    // Arrange
    let kind = ResourceKind::of::<Playlist>();
    let mut untyped = playlist_object();
    untyped.types = None;
    let mut wrong_kind = playlist_object();
    wrong_kind.types = Some(TypeMeta {
        api_version: "dashboard.grafana.app/v1alpha1".to_string(),
        kind: "Dashboard".to_string(),
    });
    let list = |items| ObjectList {
        types: TypeMeta {
            api_version: kind.api_version(),
            kind: kind.list_kind(),
        },
        metadata: ListMeta::default(),
        items,
    };

    // Act
    let accepted = super::to_typed_list::<Playlist>(&kind, list(vec![untyped]));
    let rejected = super::to_typed_list::<Playlist>(&kind, list(vec![wrong_kind]));

    // Assert
    assert_eq!(accepted.unwrap().items[0].spec.title, "Morning");
    assert!(matches!(rejected, Err(Status::TypeMismatch(_))));
}

#[test_context(InMemoryRegistryContext)]
#[tokio::test]
async fn test_create_stamps_kind_and_drops_version(ctx: &mut InMemoryRegistryContext) {
    // Arrange
    let client = ctx.resource_client::<Dashboard>().await;
    let mut object = dashboard("home", "stacks-1", json!({ "title": "Home" }));
    object.metadata.resource_version = Some("999".to_string());

    // Act
    let created = client
        .create(&ctx.call_context, &object, &PostParams::default())
        .await
        .unwrap();

    // Assert
    assert!(created.metadata.uid.is_some());
    assert_ne!(created.metadata.resource_version.as_deref(), Some("999"));
    assert_eq!(created.spec.object.get("title"), Some(&json!("Home")));
    let stored = client
        .get(&ctx.call_context, &Identifier::new("stacks-1", "home"))
        .await
        .unwrap();
    assert_eq!(stored.metadata.uid, created.metadata.uid);
}

#[test_context(InMemoryRegistryContext)]
#[tokio::test]
async fn test_create_requires_identifier(ctx: &mut InMemoryRegistryContext) {
    let client = ctx.resource_client::<Dashboard>().await;
    let object = Dashboard::new("home", DashboardSpec::default());

    let result = client.create(&ctx.call_context, &object, &PostParams::default()).await;

    assert!(matches!(result, Err(Status::Invalid(_))));
}

#[test_context(InMemoryRegistryContext)]
#[tokio::test]
async fn test_list_returns_typed_items(ctx: &mut InMemoryRegistryContext) {
    let client = ctx.resource_client::<Playlist>().await;
    for name in ["evening", "morning"] {
        let mut playlist = Playlist::new(
            name,
            PlaylistSpec {
                title: name.to_string(),
                interval: "5m".to_string(),
                items: vec![],
            },
        );
        playlist.metadata.namespace = Some("default".to_string());
        client
            .create(&ctx.call_context, &playlist, &PostParams::default())
            .await
            .unwrap();
    }

    let list = client
        .list(&ctx.call_context, "default", &ListParams::default())
        .await
        .unwrap();

    let titles: Vec<_> = list.items.iter().map(|p| p.spec.title.clone()).collect();
    assert_eq!(titles, vec!["evening".to_string(), "morning".to_string()]);
}

#[test_context(InMemoryRegistryContext)]
#[tokio::test]
async fn test_watch_ends_when_cancelled(ctx: &mut InMemoryRegistryContext) {
    // Arrange
    let client = ctx.resource_client::<Dashboard>().await;
    let watch_context = ctx.call_context.child();
    let mut stream = client
        .watch(&watch_context, "stacks-1", &WatchParams::default(), "")
        .await
        .unwrap();
    client
        .create(
            &ctx.call_context,
            &dashboard("home", "stacks-1", json!({ "title": "Home" })),
            &PostParams::default(),
        )
        .await
        .unwrap();

    // Act
    let first = tokio::time::timeout(Duration::from_secs(1), stream.next()).await.unwrap();
    watch_context.cancel();
    let after_cancel = tokio::time::timeout(Duration::from_secs(1), stream.next()).await.unwrap();

    // Assert
    assert!(matches!(first, Some(Ok(WatchEvent::Added(d))) if d.metadata.name.as_deref() == Some("home")));
    assert!(after_cancel.is_none());
}

#[tokio::test]
async fn test_cancelled_context() {
    let client = dashboard_client(Arc::new(WrongKindTransport));
    let ctx = CallContext::new();
    ctx.cancel();

    let result = client.get(&ctx, &Identifier::new("default", "morning")).await;

    assert!(matches!(result, Err(Status::Cancelled(_))));
}
