use super::{Playlist, PlaylistItemModel, PlaylistItemType, PlaylistSpecModel};
use crate::services::base::resource_kind::ResourceKind;
use crate::services::base::status::Status;
use crate::services::resources::resource::SpecModel;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use serde_json::json;

fn model(items: Vec<PlaylistItemModel>) -> PlaylistSpecModel {
    PlaylistSpecModel {
        title: "Ops".to_string(),
        interval: "5m".to_string(),
        items,
    }
}

#[test]
fn test_kind() {
    let kind = ResourceKind::of::<Playlist>();

    assert_eq!(kind.api_version(), "playlist.grafana.app/v0alpha1");
    assert_eq!(kind.plural, "playlists");
    assert_eq!(kind.resource_type_name(), "grafana_apps_playlist_playlist_v0alpha1");
}

#[test]
fn test_item_types() {
    for value in PlaylistItemType::KNOWN_VALUES {
        let item_type: PlaylistItemType = value.parse().unwrap();
        assert_eq!(item_type.as_str(), value);
        assert_eq!(serde_json::to_value(item_type).unwrap(), json!(value));
    }
}

#[test]
fn test_unknown_item_type() {
    let result = "dashboard_by_folder".parse::<PlaylistItemType>();

    match result {
        Err(Status::Invalid(message)) => {
            assert!(message.contains("dashboard_by_folder"));
            assert!(message.contains("dashboard_by_uid"));
        }
        other => panic!("expected an invalid item type, got: {:?}", other),
    }
}

#[test]
fn test_to_resource_and_save() {
    let declared = model(vec![
        PlaylistItemModel::new("dashboard_by_uid", "abc"),
        PlaylistItemModel::new("dashboard_by_tag", "ops"),
    ]);
    let meta = ObjectMeta {
        name: Some("ops".to_string()),
        ..Default::default()
    };

    let playlist = declared.to_resource(meta).unwrap();
    let mut saved = PlaylistSpecModel::default();
    saved.save(&playlist).unwrap();

    assert_eq!(playlist.metadata.name.as_deref(), Some("ops"));
    assert_eq!(playlist.spec.items[0].item_type, PlaylistItemType::DashboardByUid);
    assert_eq!(
        serde_json::to_value(&playlist.spec).unwrap(),
        json!({
            "title": "Ops",
            "interval": "5m",
            "items": [
                { "type": "dashboard_by_uid", "value": "abc" },
                { "type": "dashboard_by_tag", "value": "ops" }
            ]
        })
    );
    assert_eq!(saved, declared);
}

#[test]
fn test_to_resource_rejects_unknown_item_type() {
    let declared = model(vec![PlaylistItemModel::new("by_magic", "x")]);

    let result = declared.to_resource(ObjectMeta::default());

    assert!(matches!(result, Err(Status::Invalid(_))));
}
