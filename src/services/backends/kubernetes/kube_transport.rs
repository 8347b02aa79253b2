use crate::services::base::call_context::CallContext;
use crate::services::base::identifier::Identifier;
use crate::services::base::resource_kind::ResourceKind;
use crate::services::base::status::Status;
use crate::services::base::transport::{DynamicWatchStream, Transport, UpdateOptions};
use async_trait::async_trait;
use futures::{StreamExt, TryStreamExt};
use kube::api::{
    DeleteParams, DynamicObject, ListParams, ObjectList, Patch, PatchParams, PostParams, WatchParams,
};
use kube::{Api, Client};
use log::debug;
use serde_json::Value;

/// Transport backed by the Kubernetes-style App Platform API.
/// Cloning is cheap: every clone shares the underlying connection.
#[derive(Clone)]
pub struct KubeTransport {
    client: Client,
}

impl KubeTransport {
    pub fn new(client: Client) -> Self {
        KubeTransport { client }
    }

    fn api(&self, kind: &ResourceKind, namespace: &str) -> Api<DynamicObject> {
        let resource = kind.api_resource();
        if namespace.is_empty() {
            Api::all_with(self.client.clone(), &resource)
        } else {
            Api::namespaced_with(self.client.clone(), namespace, &resource)
        }
    }
}

#[async_trait]
impl Transport for KubeTransport {
    async fn list(
        &self,
        _ctx: &CallContext,
        kind: &ResourceKind,
        namespace: &str,
        params: &ListParams,
    ) -> Result<ObjectList<DynamicObject>, Status> {
        debug!("Listing {} in namespace {:?}", kind, namespace);
        Ok(self.api(kind, namespace).list(params).await?)
    }

    async fn watch(
        &self,
        _ctx: &CallContext,
        kind: &ResourceKind,
        namespace: &str,
        params: &WatchParams,
        resource_version: &str,
    ) -> Result<DynamicWatchStream, Status> {
        debug!("Watching {} in namespace {:?} from version {:?}", kind, namespace, resource_version);
        let stream = self.api(kind, namespace).watch(params, resource_version).await?;
        Ok(stream.map_err(Status::from).boxed())
    }

    async fn get(&self, _ctx: &CallContext, kind: &ResourceKind, id: &Identifier) -> Result<DynamicObject, Status> {
        Ok(self.api(kind, &id.namespace).get(&id.name).await?)
    }

    async fn create(
        &self,
        _ctx: &CallContext,
        kind: &ResourceKind,
        id: &Identifier,
        object: DynamicObject,
        params: &PostParams,
    ) -> Result<DynamicObject, Status> {
        debug!("Creating {} resource {}", kind, id);
        Ok(self.api(kind, &id.namespace).create(params, &object).await?)
    }

    async fn update(
        &self,
        _ctx: &CallContext,
        kind: &ResourceKind,
        id: &Identifier,
        object: DynamicObject,
        options: &UpdateOptions,
    ) -> Result<DynamicObject, Status> {
        debug!("Replacing {} resource {}", kind, id);
        options.validate()?;
        let mut object = object;
        // No resource version makes the server skip the concurrency check.
        object.metadata.resource_version = options.presented_version().map(str::to_string);
        let params = PostParams {
            dry_run: options.dry_run,
            ..Default::default()
        };
        Ok(self.api(kind, &id.namespace).replace(&id.name, &params, &object).await?)
    }

    async fn patch(
        &self,
        _ctx: &CallContext,
        kind: &ResourceKind,
        id: &Identifier,
        patch: &Patch<Value>,
        params: &PatchParams,
    ) -> Result<DynamicObject, Status> {
        debug!("Patching {} resource {}", kind, id);
        Ok(self.api(kind, &id.namespace).patch(&id.name, params, patch).await?)
    }

    async fn delete(
        &self,
        _ctx: &CallContext,
        kind: &ResourceKind,
        id: &Identifier,
        params: &DeleteParams,
    ) -> Result<(), Status> {
        debug!("Deleting {} resource {}", kind, id);
        self.api(kind, &id.namespace)
            .delete(&id.name, params)
            .await
            .map(|_| ())
            .map_err(Status::from)
    }
}
