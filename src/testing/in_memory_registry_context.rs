use crate::services::backends::memory::InMemoryTransport;
use crate::services::base::call_context::CallContext;
use crate::services::base::resource_kind::ResourceKind;
use crate::services::base::tenant::Tenant;
use crate::services::clients::namespaced_client::NamespacedClient;
use crate::services::clients::resource_client::ResourceClient;
use crate::services::registry::{InMemoryClientRegistry, InMemoryTransportFactory, TransportRegistry};
use crate::services::resources::dashboard::Dashboard;
use crate::services::resources::playlist::Playlist;
use kube::Resource;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt::Debug;
use std::sync::Arc;
use test_context::AsyncTestContext;

/// A registry serving the built-in kinds from one shared in-memory store.
pub struct InMemoryRegistryContext {
    pub transport: Arc<InMemoryTransport>,
    pub registry: InMemoryClientRegistry,
    pub call_context: CallContext,
}

impl InMemoryRegistryContext {
    pub async fn resource_client<T>(&self) -> ResourceClient<T>
    where
        T: Resource<DynamicType = ()> + Clone + Serialize + DeserializeOwned + Debug + Send + 'static,
    {
        ResourceClient::from_registry(&self.registry, ResourceKind::of::<T>())
            .await
            .expect("Failed to resolve a client for a registered kind")
    }

    pub async fn namespaced_client<T>(&self, tenant: Tenant) -> NamespacedClient<T>
    where
        T: Resource<DynamicType = ()> + Clone + Serialize + DeserializeOwned + Debug + Send + 'static,
    {
        NamespacedClient::new(self.resource_client::<T>().await, tenant)
    }
}

impl AsyncTestContext for InMemoryRegistryContext {
    async fn setup() -> Self {
        let transport = Arc::new(InMemoryTransport::new());
        let registry = TransportRegistry::new(InMemoryTransportFactory::new(transport.clone()))
            .with_kind(&ResourceKind::of::<Dashboard>())
            .with_kind(&ResourceKind::of::<Playlist>());
        InMemoryRegistryContext {
            transport,
            registry,
            call_context: CallContext::new(),
        }
    }
}
