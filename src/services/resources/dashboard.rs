
use crate::services::base::status::Status;
use crate::services::resources::resource::SpecModel;
use crate::services::resources::spec_merge::{DeclaredFields, merge_spec, read_tags, read_title};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::CustomResource;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Dashboards keep their spec as an opaque JSON document owned by the dashboard schema.
#[derive(CustomResource, Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
#[kube(
    group = "dashboard.grafana.app",
    version = "v1alpha1",
    kind = "Dashboard",
    plural = "dashboards",
    namespaced,
    schema = "disabled"
)]
pub struct DashboardSpec {
    #[serde(flatten)]
    pub object: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardSpecModel {
    /// The full dashboard JSON document.
    pub json: String,
    pub title: Option<String>,
    pub tags: Option<Vec<String>>,
}

impl DashboardSpecModel {
    pub fn new(json: &str) -> Self {
        DashboardSpecModel {
            json: json.to_string(),
            ..Default::default()
        }
    }

    pub fn with_title(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }

    pub fn with_tags(mut self, tags: &[&str]) -> Self {
        self.tags = Some(tags.iter().map(|t| t.to_string()).collect());
        self
    }

    fn declared_fields(&self) -> DeclaredFields {
        DeclaredFields {
            title: self.title.clone(),
            tags: self.tags.clone(),
        }
    }
}

impl SpecModel<Dashboard> for DashboardSpecModel {
    fn to_resource(&self, meta: ObjectMeta) -> Result<Dashboard, Status> {
        let object = merge_spec(&self.json, &self.declared_fields())?;
        let mut dashboard = Dashboard::new("", DashboardSpec { object });
        dashboard.metadata = meta;
        Ok(dashboard)
    }

    fn save(&mut self, resource: &Dashboard) -> Result<(), Status> {
        let spec = &resource.spec.object;
        self.json = serde_json::to_string(spec)?;
        if self.title.is_some() {
            let title = read_title(spec).ok_or_else(|| Status::Invalid("dashboard title is not a string".to_string()))?;
            self.title = Some(title);
        }
        if self.tags.is_some() {
            self.tags = Some(read_tags(spec));
        }
        Ok(())
    }
}
