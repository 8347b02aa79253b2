
use kube::api::ApiResource;
use kube::core::{GroupVersion, GroupVersionKind};
use std::fmt::{Display, Formatter};

/// Immutable descriptor of a resource type served by the App Platform API.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceKind {
    pub group: String,
    pub version: String,
    pub kind: String,
    pub plural: String,
}

impl ResourceKind {
    pub fn new(group: &str, version: &str, kind: &str, plural: &str) -> Self {
        ResourceKind {
            group: group.to_string(),
            version: version.to_string(),
            kind: kind.to_string(),
            plural: plural.to_string(),
        }
    }

    /// Builds the descriptor from a generated resource type.
    pub fn of<K>() -> Self
    where
        K: kube::Resource<DynamicType = ()>,
    {
        ResourceKind {
            group: K::group(&()).to_string(),
            version: K::version(&()).to_string(),
            kind: K::kind(&()).to_string(),
            plural: K::plural(&()).to_string(),
        }
    }

    pub fn api_version(&self) -> String {
        if self.group.is_empty() {
            self.version.clone()
        } else {
            format!("{}/{}", self.group, self.version)
        }
    }

    pub fn group_version(&self) -> GroupVersion {
        GroupVersion::gv(&self.group, &self.version)
    }

    pub fn list_kind(&self) -> String {
        format!("{}List", self.kind)
    }

    pub fn api_resource(&self) -> ApiResource {
        let gvk = GroupVersionKind::gvk(&self.group, &self.version, &self.kind);
        ApiResource::from_gvk_with_plural(&gvk, &self.plural)
    }

    pub fn self_link(&self, namespace: &str, name: &str) -> String {
        format!(
            "/apis/{}/namespaces/{}/{}/{}",
            self.api_version(),
            namespace,
            self.plural,
            name
        )
    }

    /// Name under which the kind is exposed to declarative tooling,
    /// e.g. `grafana_apps_dashboard_dashboard_v1alpha1`.
    pub fn resource_type_name(&self) -> String {
        let group = self.group.split('.').next().unwrap_or_default();
        format!(
            "grafana_apps_{}_{}_{}",
            group,
            self.kind.to_lowercase(),
            self.version
        )
    }

    pub fn matches(&self, api_version: &str, kind: &str) -> bool {
        self.api_version() == api_version && self.kind == kind
    }
}

impl Display for ResourceKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}, Kind={}", self.api_version(), self.kind)
    }
}
