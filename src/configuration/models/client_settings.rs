
use crate::services::backends::kubernetes::kubeconfig_loader::KubeconfigSource;
use crate::services::base::call_context::CallContext;
use crate::services::base::resource_kind::ResourceKind;
use crate::services::base::status::Status;
use crate::services::base::tenant::Tenant;
use crate::services::registry::{KubeClientRegistry, KubeTransportFactory, TransportRegistry};
use crate::services::resources::dashboard::Dashboard;
use crate::services::resources::playlist::Playlist;
use duration_string::DurationString;
use kube::Client;
use log::info;
use serde::Deserialize;

pub const DEFAULT_MANAGER_KIND: &str = "terraform";

/// Settings for reaching the App Platform API on behalf of one tenant.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientSettings {
    pub kubeconfig: KubeconfigSource,
    /// Org of a local instance. Local instances default to org 1.
    pub org_id: Option<i64>,
    /// Cloud stack. Takes precedence over `org_id` when positive.
    pub stack_id: Option<i64>,
    /// Recorded on managed objects as the manager identity.
    #[serde(default)]
    pub client_id: String,
    pub operation_timeout: Option<DurationString>,
    #[serde(default = "default_manager_kind")]
    pub manager_kind: String,
}

fn default_manager_kind() -> String {
    DEFAULT_MANAGER_KIND.to_string()
}

impl ClientSettings {
    pub fn tenant(&self) -> Result<Tenant, Status> {
        Tenant::from_ids(self.org_id, self.stack_id)
    }

    /// A fresh call context carrying the configured deadline.
    pub fn call_context(&self) -> CallContext {
        match self.operation_timeout {
            Some(timeout) => CallContext::new().with_timeout(timeout.into()),
            None => CallContext::new(),
        }
    }

    /// Connects to the API and registers the built-in resource kinds.
    pub async fn connect(&self) -> anyhow::Result<KubeClientRegistry> {
        let config = self.kubeconfig.load().await?;
        info!("Connecting to {}", config.cluster_url);
        let client = Client::try_from(config)?;
        Ok(TransportRegistry::new(KubeTransportFactory::new(client))
            .with_kind(&ResourceKind::of::<Dashboard>())
            .with_kind(&ResourceKind::of::<Playlist>()))
    }
}
