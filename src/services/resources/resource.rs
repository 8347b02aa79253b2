
use crate::services::base::call_context::CallContext;
use crate::services::base::status::Status;
use crate::services::base::transport::UpdateOptions;
use crate::services::clients::namespaced_client::NamespacedClient;
use crate::services::resources::metadata::{ResourceModel, ResourceOptions, set_manager_properties};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::Resource;
use kube::api::{DeleteParams, PostParams};
use log::{debug, info, warn};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt::{Debug, Display, Formatter};

/// Converts between the caller's spec model and the resource object.
pub trait SpecModel<T>: Send + Sync {
    /// Builds the object carrying `meta` from the declared spec.
    fn to_resource(&self, meta: ObjectMeta) -> Result<T, Status>;

    /// Copies the spec of a stored object back into the model.
    fn save(&mut self, resource: &T) -> Result<(), Status>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceAction {
    Create,
    Read,
    Update,
    Delete,
}

impl Display for ResourceAction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ResourceAction::Create => write!(f, "create"),
            ResourceAction::Read => write!(f, "read"),
            ResourceAction::Update => write!(f, "update"),
            ResourceAction::Delete => write!(f, "delete"),
        }
    }
}

/// User-facing summary of a failed action on a named resource.
pub fn describe_failure(action: ResourceAction, name: &str, status: &Status) -> String {
    format!("failed to {} resource {:?}: {}", action, name, status)
}

/// Drives the create/read/update/delete/import lifecycle of one resource kind
/// on behalf of declarative tooling.
pub struct ManagedResource<T> {
    client: NamespacedClient<T>,
    manager_kind: String,
    client_id: String,
}

impl<T> ManagedResource<T>
where
    T: Resource + Clone + Serialize + DeserializeOwned + Debug + Send + 'static,
{
    pub fn new(client: NamespacedClient<T>, manager_kind: &str, client_id: &str) -> Self {
        ManagedResource {
            client,
            manager_kind: manager_kind.to_string(),
            client_id: client_id.to_string(),
        }
    }

    pub fn client(&self) -> &NamespacedClient<T> {
        &self.client
    }

    pub async fn create<M>(&self, ctx: &CallContext, mut model: ResourceModel<M>) -> Result<ResourceModel<M>, Status>
    where
        M: SpecModel<T>,
    {
        let object = self.build(&model)?;
        let created = self
            .client
            .create(ctx, &object, &PostParams::default())
            .await
            .inspect_err(|e| warn!("{}", describe_failure(ResourceAction::Create, model.name(), e)))?;
        info!("Created {} {}", self.kind_name(), model.name());

        self.save_metadata(&mut model, &created);
        Ok(model)
    }

    /// Refreshes the model from the stored object. `Ok(None)` means the object is gone and
    /// the model should be dropped from the caller's state.
    pub async fn read<M>(&self, ctx: &CallContext, mut model: ResourceModel<M>) -> Result<Option<ResourceModel<M>>, Status>
    where
        M: SpecModel<T>,
    {
        let name = model.name().to_string();
        match self.client.get(ctx, &name).await {
            Ok(stored) => {
                self.save_metadata(&mut model, &stored);
                Ok(Some(model))
            }
            Err(e) if e.is_not_found() => {
                debug!("{} {} no longer exists", self.kind_name(), name);
                Ok(None)
            }
            Err(e) => {
                warn!("{}", describe_failure(ResourceAction::Read, &name, &e));
                Err(e)
            }
        }
    }

    /// Replaces the stored object. The version observed at the last read is presented unless
    /// the model opts into overwriting.
    pub async fn update<M>(&self, ctx: &CallContext, mut model: ResourceModel<M>) -> Result<ResourceModel<M>, Status>
    where
        M: SpecModel<T>,
    {
        let object = self.build(&model)?;
        let options = match (model.options.overwrite, object.meta().resource_version.clone()) {
            (true, _) => UpdateOptions::overwrite(),
            (false, Some(version)) => UpdateOptions::with_resource_version(version),
            (false, None) => {
                return Err(Status::Invalid(format!(
                    "{} {} has no observed version to update from; read it first or request an overwrite",
                    self.kind_name(),
                    model.name()
                )));
            }
        };
        let updated = self
            .client
            .update(ctx, &object, &options)
            .await
            .inspect_err(|e| warn!("{}", describe_failure(ResourceAction::Update, model.name(), e)))?;
        info!("Updated {} {}", self.kind_name(), model.name());

        self.save_metadata(&mut model, &updated);
        Ok(model)
    }

    /// Deletes the stored object. An object that is already gone counts as deleted.
    pub async fn delete<M>(&self, ctx: &CallContext, model: &ResourceModel<M>) -> Result<(), Status> {
        match self.client.delete(ctx, model.name(), &DeleteParams::default()).await {
            Ok(()) => {
                info!("Deleted {} {}", self.kind_name(), model.name());
                Ok(())
            }
            Err(e) if e.is_not_found() => Ok(()),
            Err(e) => {
                warn!("{}", describe_failure(ResourceAction::Delete, model.name(), &e));
                Err(e)
            }
        }
    }

    /// Adopts an existing object into a fresh model. Imported models overwrite on update,
    /// since the caller has never observed a version of their own.
    pub async fn import<M>(&self, ctx: &CallContext, name: &str) -> Result<ResourceModel<M>, Status>
    where
        M: SpecModel<T> + Default,
    {
        let stored = self
            .client
            .get(ctx, name)
            .await
            .inspect_err(|e| warn!("{}", describe_failure(ResourceAction::Read, name, e)))?;

        let mut model = ResourceModel::new(name, M::default());
        self.save_metadata(&mut model, &stored);
        model.spec.save(&stored)?;
        model.options = ResourceOptions { overwrite: true };
        Ok(model)
    }

    fn build<M>(&self, model: &ResourceModel<M>) -> Result<T, Status>
    where
        M: SpecModel<T>,
    {
        let mut meta = model.metadata.to_object_meta(self.client.namespace());
        set_manager_properties(&mut meta, &self.manager_kind, &self.client_id);
        model.spec.to_resource(meta)
    }

    fn save_metadata<M>(&self, model: &mut ResourceModel<M>, stored: &T) {
        let meta = stored.meta();
        let namespace = meta.namespace.as_deref().unwrap_or(self.client.namespace());
        let name = meta.name.as_deref().unwrap_or(model.name());
        let self_link = self.client.inner().kind().self_link(namespace, name);
        model.metadata.save(meta, self_link);
        model.id = model.metadata.uuid.clone();
    }

    fn kind_name(&self) -> &str {
        &self.client.inner().kind().kind
    }
}
