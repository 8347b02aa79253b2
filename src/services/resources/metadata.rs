
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const MANAGED_BY_ANNOTATION: &str = "grafana.app/managedBy";
pub const MANAGER_ID_ANNOTATION: &str = "grafana.app/managerId";
pub const FOLDER_ANNOTATION: &str = "grafana.app/folder";

/// Object metadata as tracked by the calling tooling.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceMetadataModel {
    /// Server-assigned UID.
    pub uuid: String,
    /// Object name.
    pub uid: String,
    pub folder_uid: Option<String>,
    /// Resource version of the last observed state.
    pub version: String,
    pub url: String,
    pub annotations: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceOptions {
    /// Waives the resource version check on update.
    pub overwrite: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceModel<M> {
    pub id: String,
    pub metadata: ResourceMetadataModel,
    pub spec: M,
    #[serde(default)]
    pub options: ResourceOptions,
}

impl<M> ResourceModel<M> {
    pub fn new(name: &str, spec: M) -> Self {
        ResourceModel {
            id: String::new(),
            metadata: ResourceMetadataModel {
                uid: name.to_string(),
                ..Default::default()
            },
            spec,
            options: ResourceOptions::default(),
        }
    }

    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.options.overwrite = overwrite;
        self
    }

    pub fn name(&self) -> &str {
        &self.metadata.uid
    }
}

impl ResourceMetadataModel {
    /// Object metadata the caller controls, placed in `namespace`.
    pub fn to_object_meta(&self, namespace: &str) -> ObjectMeta {
        let mut meta = ObjectMeta {
            name: Some(self.uid.clone()),
            namespace: Some(namespace.to_string()),
            uid: non_empty(&self.uuid),
            resource_version: non_empty(&self.version),
            ..Default::default()
        };
        if let Some(folder_uid) = self.folder_uid.as_deref().filter(|f| !f.is_empty()) {
            meta.annotations
                .get_or_insert_with(BTreeMap::new)
                .insert(FOLDER_ANNOTATION.to_string(), folder_uid.to_string());
        }
        meta
    }

    /// Copies the server state back. The folder is only tracked when the model declares one.
    pub fn save(&mut self, meta: &ObjectMeta, self_link: String) {
        if self.folder_uid.is_some() {
            self.folder_uid = Some(folder_of(meta).unwrap_or_default());
        }
        self.uuid = meta.uid.clone().unwrap_or_default();
        self.uid = meta.name.clone().unwrap_or_default();
        self.version = meta.resource_version.clone().unwrap_or_default();
        self.url = meta
            .self_link
            .clone()
            .filter(|link| !link.is_empty())
            .unwrap_or(self_link);
        self.annotations = meta.annotations.clone().filter(|a| !a.is_empty());
    }
}

pub fn folder_of(meta: &ObjectMeta) -> Option<String> {
    meta.annotations
        .as_ref()
        .and_then(|annotations| annotations.get(FOLDER_ANNOTATION))
        .cloned()
}

/// Marks the object as managed by `manager_kind` on behalf of `client_id`.
/// Returns whether anything changed.
pub fn set_manager_properties(meta: &mut ObjectMeta, manager_kind: &str, client_id: &str) -> bool {
    let annotations = meta.annotations.get_or_insert_with(BTreeMap::new);
    let mut changed = false;
    for (key, value) in [(MANAGED_BY_ANNOTATION, manager_kind), (MANAGER_ID_ANNOTATION, client_id)] {
        if annotations.get(key).map(String::as_str) != Some(value) {
            annotations.insert(key.to_string(), value.to_string());
            changed = true;
        }
    }
    changed
}

fn non_empty(value: &str) -> Option<String> {
    match value.is_empty() {
        true => None,
        false => Some(value.to_string()),
    }
}
