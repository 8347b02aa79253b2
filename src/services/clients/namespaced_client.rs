
use crate::services::base::call_context::CallContext;
use crate::services::base::identifier::Identifier;
use crate::services::base::status::Status;
use crate::services::base::tenant::Tenant;
use crate::services::base::transport::UpdateOptions;
use crate::services::clients::resource_client::{ResourceClient, WatchStream};
use kube::Resource;
use kube::api::{DeleteParams, ListParams, ObjectList, Patch, PatchParams, PostParams, WatchParams};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt::Debug;

/// A [`ResourceClient`] bound to the namespace of one tenant.
/// The namespace is resolved once at construction and every call is confined to it.
pub struct NamespacedClient<T> {
    client: ResourceClient<T>,
    tenant: Tenant,
    namespace: String,
}

impl<T> Clone for NamespacedClient<T> {
    fn clone(&self) -> Self {
        NamespacedClient {
            client: self.client.clone(),
            tenant: self.tenant,
            namespace: self.namespace.clone(),
        }
    }
}

impl<T> NamespacedClient<T>
where
    T: Resource + Clone + Serialize + DeserializeOwned + Debug + Send + 'static,
{
    pub fn new(client: ResourceClient<T>, tenant: Tenant) -> Self {
        NamespacedClient {
            client,
            namespace: tenant.namespace(),
            tenant,
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn tenant(&self) -> Tenant {
        self.tenant
    }

    pub fn inner(&self) -> &ResourceClient<T> {
        &self.client
    }

    pub fn identifier(&self, name: &str) -> Identifier {
        Identifier::new(&self.namespace, name)
    }

    pub async fn get(&self, ctx: &CallContext, name: &str) -> Result<T, Status> {
        self.client.get(ctx, &self.identifier(name)).await
    }

    pub async fn list(&self, ctx: &CallContext, params: &ListParams) -> Result<ObjectList<T>, Status> {
        self.client.list(ctx, &self.namespace, params).await
    }

    pub async fn watch(
        &self,
        ctx: &CallContext,
        params: &WatchParams,
        resource_version: &str,
    ) -> Result<WatchStream<T>, Status> {
        self.client
            .watch(ctx, &self.namespace, params, resource_version)
            .await
    }

    pub async fn create(&self, ctx: &CallContext, object: &T, params: &PostParams) -> Result<T, Status> {
        self.client.create(ctx, &self.confine(object), params).await
    }

    pub async fn update(&self, ctx: &CallContext, object: &T, options: &UpdateOptions) -> Result<T, Status> {
        self.client.update(ctx, &self.confine(object), options).await
    }

    pub async fn patch(
        &self,
        ctx: &CallContext,
        name: &str,
        patch: &Patch<Value>,
        params: &PatchParams,
    ) -> Result<T, Status> {
        self.client
            .patch(ctx, &self.identifier(name), patch, params)
            .await
    }

    pub async fn delete(&self, ctx: &CallContext, name: &str, params: &DeleteParams) -> Result<(), Status> {
        self.client.delete(ctx, &self.identifier(name), params).await
    }

    fn confine(&self, object: &T) -> T {
        let mut object = object.clone();
        object.meta_mut().namespace = Some(self.namespace.clone());
        object
    }
}
