
use anyhow::bail;
use kube::Config;
use kube::config::Kubeconfig;
use log::{debug, info};
use serde::Deserialize;
use std::process::Command;

/// Where the connection settings for the App Platform API come from.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum KubeconfigSource {
    /// Path to a kubeconfig file.
    File(String),
    /// Shell command printing a kubeconfig to stdout.
    Command(String),
    InCluster,
}

impl KubeconfigSource {
    pub async fn load(&self) -> anyhow::Result<Config> {
        match self {
            KubeconfigSource::File(path) => {
                info!("Loading kubeconfig file: {:?}", path);
                let kubeconfig_string = std::fs::read_to_string(path)?;
                from_kubeconfig_string(&kubeconfig_string).await
            }
            KubeconfigSource::Command(command) => {
                info!("Loading kubeconfig with command: {:?}", command);
                let output = Command::new("sh").arg("-c").arg(command).output()?;
                if !output.status.success() {
                    bail!(
                        "Failed to execute command: {:?}",
                        String::from_utf8_lossy(&output.stderr)
                    );
                }
                from_kubeconfig_string(&String::from_utf8(output.stdout)?).await
            }
            KubeconfigSource::InCluster => {
                info!("Loading in-cluster configuration");
                Ok(Config::incluster()?)
            }
        }
    }
}

async fn from_kubeconfig_string(kubeconfig_string: &str) -> anyhow::Result<Config> {
    let kubeconfig: Kubeconfig = serde_yml::from_str(kubeconfig_string)?;
    debug!(
        "Using kubeconfig with {} cluster(s), current context {:?}",
        kubeconfig.clusters.len(),
        kubeconfig.current_context
    );
    Ok(Config::from_custom_kubeconfig(kubeconfig, &Default::default()).await?)
}
