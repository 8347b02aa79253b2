pub mod kube_transport;
pub mod kubeconfig_loader;
