
use crate::services::backends::kubernetes::kube_transport::KubeTransport;
use crate::services::backends::memory::InMemoryTransport;
use crate::services::base::resource_kind::ResourceKind;
use crate::services::base::status::Status;
use crate::services::base::transport::Transport;
use async_trait::async_trait;
use kube::Client;
use kube::core::GroupVersion;
use log::info;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;

#[async_trait]
/// Resolves a resource kind to the transport serving it
pub trait ClientRegistry: Send + Sync {
    async fn client_for(&self, kind: &ResourceKind) -> Result<Arc<dyn Transport>, Status>;
}

/// Builds one transport per backend connection
pub trait TransportFactory: Send + Sync {
    fn connect(&self, group_version: &GroupVersion) -> anyhow::Result<Arc<dyn Transport>>;
}

/// Registry of known group/versions with a lazily filled transport cache.
/// Safe to share between concurrent callers.
pub struct TransportRegistry<F>
where
    F: TransportFactory,
{
    factory: F,
    registered: HashSet<String>,
    transports: RwLock<HashMap<String, Arc<dyn Transport>>>,
}

impl<F> TransportRegistry<F>
where
    F: TransportFactory,
{
    pub fn new(factory: F) -> Self {
        TransportRegistry {
            factory,
            registered: HashSet::new(),
            transports: RwLock::new(HashMap::new()),
        }
    }

    pub fn register(mut self, group_version: GroupVersion) -> Self {
        self.registered.insert(group_version.api_version());
        self
    }

    pub fn with_kind(self, kind: &ResourceKind) -> Self {
        self.register(kind.group_version())
    }

    pub fn is_registered(&self, kind: &ResourceKind) -> bool {
        self.registered.contains(&kind.api_version())
    }
}

#[async_trait]
impl<F> ClientRegistry for TransportRegistry<F>
where
    F: TransportFactory,
{
    async fn client_for(&self, kind: &ResourceKind) -> Result<Arc<dyn Transport>, Status> {
        let api_version = kind.api_version();
        if !self.registered.contains(&api_version) {
            return Err(Status::UnknownKind(kind.to_string()));
        }

        {
            let read_guard = self.transports.read().await;
            if let Some(transport) = read_guard.get(&api_version) {
                return Ok(transport.clone());
            }
        }

        let mut write_guard = self.transports.write().await;
        // Another caller may have connected while we waited for the write lock.
        if let Some(transport) = write_guard.get(&api_version) {
            return Ok(transport.clone());
        }
        info!("Creating transport for {}", api_version);
        let transport = self.factory.connect(&kind.group_version())?;
        write_guard.insert(api_version, transport.clone());
        Ok(transport)
    }
}

/// Shares a single API connection between every group/version.
pub struct KubeTransportFactory {
    client: Client,
}

impl KubeTransportFactory {
    pub fn new(client: Client) -> Self {
        KubeTransportFactory { client }
    }
}

impl TransportFactory for KubeTransportFactory {
    fn connect(&self, _group_version: &GroupVersion) -> anyhow::Result<Arc<dyn Transport>> {
        Ok(Arc::new(KubeTransport::new(self.client.clone())))
    }
}

/// Serves every group/version from one process-local store.
pub struct InMemoryTransportFactory {
    transport: Arc<InMemoryTransport>,
}

impl InMemoryTransportFactory {
    pub fn new(transport: Arc<InMemoryTransport>) -> Self {
        InMemoryTransportFactory { transport }
    }
}

impl TransportFactory for InMemoryTransportFactory {
    fn connect(&self, _group_version: &GroupVersion) -> anyhow::Result<Arc<dyn Transport>> {
        Ok(self.transport.clone())
    }
}

pub type KubeClientRegistry = TransportRegistry<KubeTransportFactory>;

pub type InMemoryClientRegistry = TransportRegistry<InMemoryTransportFactory>;
