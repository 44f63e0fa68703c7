//! JSON payloads handed to the page script.

use editor::{EditorConfig, EventOutcome, GatewayError, Popup};
use scene::events::ChangeEvent;
use serde_json::{Value, json};

pub fn popup_json(popup: Option<&Popup>) -> Value {
    match popup {
        Some(p) => json!({
            "feature": p.feature.as_str(),
            "anchor": p.anchor.as_array(),
            "value": p.value,
        }),
        None => Value::Null,
    }
}

/// Store changes the page must redraw.
pub fn changes_json(changes: &[ChangeEvent]) -> Value {
    changes
        .iter()
        .map(|change| match change {
            ChangeEvent::Added(id) => json!({ "kind": "added", "feature": id.as_str() }),
            ChangeEvent::PropertyChanged { id, key } => {
                json!({ "kind": "property-changed", "feature": id.as_str(), "key": key })
            }
            ChangeEvent::GeometryChanged(id) => {
                json!({ "kind": "geometry-changed", "feature": id.as_str() })
            }
        })
        .collect()
}

/// An event outcome plus the store changes it caused.
pub fn outcome_json(outcome: &EventOutcome, changes: &[ChangeEvent]) -> Value {
    let mut value = outcome_kind_json(outcome);
    if let Some(map) = value.as_object_mut() {
        map.insert("changes".to_string(), changes_json(changes));
    }
    value
}

pub fn import_json(added: usize, changes: &[ChangeEvent]) -> Value {
    json!({ "added": added, "changes": changes_json(changes) })
}

/// Text shown to the user when a picked file cannot be imported.
pub fn import_failure_message(err: &GatewayError) -> String {
    match err {
        GatewayError::Read { .. } => format!("import failed, file unreadable: {err}"),
        GatewayError::Parse(_) => format!("import failed, not a GeoJSON collection: {err}"),
        GatewayError::Serialize(_) => format!("import failed: {err}"),
    }
}

fn outcome_kind_json(outcome: &EventOutcome) -> Value {
    match outcome {
        EventOutcome::Ignored => json!({ "kind": "ignored" }),
        EventOutcome::SketchUpdated => json!({ "kind": "sketch-updated" }),
        EventOutcome::FeatureAdded(id) => json!({ "kind": "feature-added", "feature": id.as_str() }),
        EventOutcome::FeatureModified(id) => {
            json!({ "kind": "feature-modified", "feature": id.as_str() })
        }
        EventOutcome::PopupOpened(popup) => {
            json!({ "kind": "popup-opened", "popup": popup_json(Some(popup)) })
        }
        EventOutcome::PopupClosed => json!({ "kind": "popup-closed" }),
    }
}

/// View and style settings the page needs to build its map.
pub fn view_json(config: &EditorConfig) -> Value {
    json!({
        "center": config.view.center,
        "zoom": config.view.zoom,
        "extent": config.view.extent,
        "style": config.style,
        "drawable": scene::GeometryType::DRAWABLE
            .iter()
            .map(|t| t.as_str())
            .collect::<Vec<_>>(),
    })
}

#[cfg(test)]
mod tests {
    use super::{import_failure_message, import_json, outcome_json, popup_json, view_json};
    use editor::{EditorConfig, EventOutcome, GatewayError, Popup};
    use formats::GeoJsonError;
    use foundation::ids::FeatureId;
    use foundation::math::Vec2;
    use pretty_assertions::assert_eq;
    use scene::events::ChangeEvent;
    use serde_json::{Value, json};

    #[test]
    fn popup_payload_carries_anchor_and_value() {
        let popup = Popup {
            feature: FeatureId::from("feature-3"),
            anchor: Vec2::new(1.5, -2.0),
            value: "Well".to_string(),
        };
        assert_eq!(
            outcome_json(&EventOutcome::PopupOpened(popup), &[]),
            json!({
                "kind": "popup-opened",
                "popup": { "feature": "feature-3", "anchor": [1.5, -2.0], "value": "Well" },
                "changes": []
            })
        );
        assert_eq!(popup_json(None), Value::Null);
    }

    #[test]
    fn view_payload_uses_kebab_style_keys() {
        let view = view_json(&EditorConfig::default());
        assert_eq!(view["style"]["stroke-color"], json!("#ffcc33"));
        assert_eq!(view["zoom"], json!(4.0));
        assert_eq!(view["drawable"][0], json!("Point"));
    }

    #[test]
    fn outcomes_carry_drained_changes() {
        let id = FeatureId::from("feature-0");
        let changes = [
            ChangeEvent::GeometryChanged(id.clone()),
            ChangeEvent::PropertyChanged {
                id: id.clone(),
                key: "name".to_string(),
            },
        ];
        assert_eq!(
            outcome_json(&EventOutcome::FeatureModified(id), &changes),
            json!({
                "kind": "feature-modified",
                "feature": "feature-0",
                "changes": [
                    { "kind": "geometry-changed", "feature": "feature-0" },
                    { "kind": "property-changed", "feature": "feature-0", "key": "name" }
                ]
            })
        );
        assert_eq!(
            import_json(1, &[ChangeEvent::Added(FeatureId::from("a"))]),
            json!({ "added": 1, "changes": [{ "kind": "added", "feature": "a" }] })
        );
    }

    #[test]
    fn both_import_failures_are_reported() {
        let read = GatewayError::Read {
            name: "wells.geojson".to_string(),
            reason: "NotReadableError".to_string(),
        };
        let parse = GatewayError::Parse(GeoJsonError::NotAFeatureCollection);
        assert!(import_failure_message(&read).contains("wells.geojson"));
        assert!(import_failure_message(&read).starts_with("import failed"));
        assert!(import_failure_message(&parse).starts_with("import failed"));
    }
}
