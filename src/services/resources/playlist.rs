#[cfg(test)]
mod tests;

use crate::services::base::status::Status;
use crate::services::resources::resource::SpecModel;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

#[derive(CustomResource, Debug, Serialize, Deserialize, Default, Clone, PartialEq, JsonSchema)]
#[kube(
    group = "playlist.grafana.app",
    version = "v0alpha1",
    kind = "Playlist",
    plural = "playlists",
    namespaced
)]
pub struct PlaylistSpec {
    pub title: String,
    pub interval: String,
    #[serde(default)]
    pub items: Vec<PlaylistItem>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, JsonSchema)]
pub struct PlaylistItem {
    #[serde(rename = "type")]
    pub item_type: PlaylistItemType,
    pub value: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum PlaylistItemType {
    DashboardByTag,
    DashboardByUid,
    /// Deprecated by the API in favour of `dashboard_by_uid`, still accepted.
    DashboardById,
}

impl PlaylistItemType {
    pub const KNOWN_VALUES: [&'static str; 3] = ["dashboard_by_tag", "dashboard_by_uid", "dashboard_by_id"];

    pub fn as_str(&self) -> &'static str {
        match self {
            PlaylistItemType::DashboardByTag => "dashboard_by_tag",
            PlaylistItemType::DashboardByUid => "dashboard_by_uid",
            PlaylistItemType::DashboardById => "dashboard_by_id",
        }
    }
}

impl Display for PlaylistItemType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PlaylistItemType {
    type Err = Status;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dashboard_by_tag" => Ok(PlaylistItemType::DashboardByTag),
            "dashboard_by_uid" => Ok(PlaylistItemType::DashboardByUid),
            "dashboard_by_id" => Ok(PlaylistItemType::DashboardById),
            other => Err(Status::Invalid(format!(
                "invalid playlist item type: {}, must be one of {:?}",
                other,
                PlaylistItemType::KNOWN_VALUES
            ))),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistItemModel {
    #[serde(rename = "type")]
    pub item_type: String,
    pub value: String,
}

impl PlaylistItemModel {
    pub fn new(item_type: &str, value: &str) -> Self {
        PlaylistItemModel {
            item_type: item_type.to_string(),
            value: value.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistSpecModel {
    pub title: String,
    pub interval: String,
    pub items: Vec<PlaylistItemModel>,
}

impl SpecModel<Playlist> for PlaylistSpecModel {
    fn to_resource(&self, meta: ObjectMeta) -> Result<Playlist, Status> {
        let items = self
            .items
            .iter()
            .map(|item| {
                Ok(PlaylistItem {
                    item_type: item.item_type.parse()?,
                    value: item.value.clone(),
                })
            })
            .collect::<Result<Vec<_>, Status>>()?;

        let mut playlist = Playlist::new(
            "",
            PlaylistSpec {
                title: self.title.clone(),
                interval: self.interval.clone(),
                items,
            },
        );
        playlist.metadata = meta;
        Ok(playlist)
    }

    fn save(&mut self, resource: &Playlist) -> Result<(), Status> {
        self.title = resource.spec.title.clone();
        self.interval = resource.spec.interval.clone();
        self.items = resource
            .spec
            .items
            .iter()
            .map(|item| PlaylistItemModel::new(item.item_type.as_str(), &item.value))
            .collect();
        Ok(())
    }
}
