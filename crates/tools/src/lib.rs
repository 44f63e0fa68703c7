//! Scripted editing sessions for the `featedit` command.

use std::path::Path;

use anyhow::{Context, Result, anyhow, bail};
use editor::{DocumentSource, EditorConfig, EditorSession, EventOutcome, MapEvent, Mode, Pointer};
use foundation::math::lon_lat_to_mercator;
use formats::ExportDocument;
use tracing::info;

pub fn load_config(path: Option<&Path>) -> Result<EditorConfig> {
    match path {
        Some(p) => EditorConfig::load(p).with_context(|| format!("loading {}", p.display())),
        None => Ok(EditorConfig::default()),
    }
}

/// Parses `LON,LAT` in degrees.
pub fn parse_lon_lat(s: &str) -> Result<(f64, f64)> {
    let (lon, lat) = s
        .split_once(',')
        .ok_or_else(|| anyhow!("expected LON,LAT, got {s:?}"))?;
    let lon: f64 = lon.trim().parse().with_context(|| format!("bad longitude {lon:?}"))?;
    let lat: f64 = lat.trim().parse().with_context(|| format!("bad latitude {lat:?}"))?;
    if !(-180.0..=180.0).contains(&lon) || !(-90.0..=90.0).contains(&lat) {
        bail!("coordinate out of range: {lon},{lat}");
    }
    Ok((lon, lat))
}

fn session_from<S: DocumentSource>(config: &EditorConfig, source: &S) -> Result<EditorSession> {
    let mut session = EditorSession::new(config.clone())?;
    let added = pollster::block_on(session.import_from(source))
        .with_context(|| format!("importing {}", source.name()))?;
    info!(source = source.name(), added = added.len(), "session loaded");
    Ok(session)
}

pub fn export_empty(config: &EditorConfig) -> Result<ExportDocument> {
    Ok(EditorSession::new(config.clone())?.export()?)
}

pub fn roundtrip<S: DocumentSource>(config: &EditorConfig, source: &S) -> Result<ExportDocument> {
    Ok(session_from(config, source)?.export()?)
}

/// Clicks the feature at `lon_lat` in properties mode and renames it.
pub fn rename<S: DocumentSource>(
    config: &EditorConfig,
    source: &S,
    lon_lat: (f64, f64),
    name: &str,
) -> Result<ExportDocument> {
    let mut session = session_from(config, source)?;
    session.set_mode(Mode::Properties);

    let at = lon_lat_to_mercator(lon_lat.0, lon_lat.1);
    let resolution = config.view.resolution();
    match session.handle_event(MapEvent::SingleClick(Pointer::new(at, resolution))) {
        EventOutcome::PopupOpened(popup) => {
            info!(feature = %popup.feature, from = %popup.value, to = name, "renaming");
        }
        _ => bail!("no feature at {},{}", lon_lat.0, lon_lat.1),
    }
    session.input_name(name)?;
    Ok(session.export()?)
}

#[derive(Debug, Clone, PartialEq)]
pub struct FeatureSummary {
    pub id: String,
    pub geometry: Option<String>,
    pub name: String,
}

pub fn inspect<S: DocumentSource>(config: &EditorConfig, source: &S) -> Result<Vec<FeatureSummary>> {
    let session = session_from(config, source)?;
    Ok(session
        .store()
        .features()
        .iter()
        .map(|f| FeatureSummary {
            id: f.id.to_string(),
            geometry: f.geometry.as_ref().map(|g| g.geometry_type().to_string()),
            name: f.name(),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::{FeatureSummary, export_empty, inspect, parse_lon_lat, rename, roundtrip};
    use editor::{EditorConfig, TextSource};
    use pretty_assertions::assert_eq;
    use serde_json::{Value, json};

    const WELLS: &str = r#"{"type":"FeatureCollection","features":[
        {"type":"Feature","id":"w1","geometry":{"type":"Point","coordinates":[-90,40]},
         "properties":{"name":"A"}},
        {"type":"Feature","id":"w2","geometry":null,"properties":{"name":"orphan"}}
    ]}"#;

    fn wells() -> TextSource {
        TextSource::new("wells.geojson", WELLS)
    }

    #[test]
    fn empty_export_matches_stock_output() {
        let doc = export_empty(&EditorConfig::default()).expect("export");
        assert_eq!(doc.content, "{\n  \"type\": \"FeatureCollection\",\n  \"features\": []\n}");
    }

    #[test]
    fn rename_updates_only_the_clicked_feature() {
        let doc = rename(&EditorConfig::default(), &wells(), (-90.0, 40.0), "B").expect("rename");
        let value: Value = serde_json::from_str(&doc.content).expect("json");
        assert_eq!(value["features"][0]["properties"], json!({ "name": "B" }));
        assert_eq!(value["features"][1]["properties"], json!({ "name": "orphan" }));
    }

    #[test]
    fn rename_on_empty_map_fails() {
        let err = rename(&EditorConfig::default(), &wells(), (10.0, 10.0), "B").unwrap_err();
        assert!(err.to_string().contains("no feature"));
    }

    #[test]
    fn roundtrip_keeps_ids_and_null_geometry() {
        let doc = roundtrip(&EditorConfig::default(), &wells()).expect("roundtrip");
        let value: Value = serde_json::from_str(&doc.content).expect("json");
        assert_eq!(value["features"][0]["id"], json!("w1"));
        assert_eq!(value["features"][1]["geometry"], Value::Null);
    }

    #[test]
    fn inspect_lists_features() {
        let rows = inspect(&EditorConfig::default(), &wells()).expect("inspect");
        assert_eq!(
            rows,
            vec![
                FeatureSummary {
                    id: "w1".to_string(),
                    geometry: Some("Point".to_string()),
                    name: "A".to_string(),
                },
                FeatureSummary {
                    id: "w2".to_string(),
                    geometry: None,
                    name: "orphan".to_string(),
                },
            ]
        );
    }

    #[test]
    fn parses_coordinates() {
        assert_eq!(parse_lon_lat("-90, 40").expect("valid"), (-90.0, 40.0));
        assert!(parse_lon_lat("-90").is_err());
        assert!(parse_lon_lat("200,0").is_err());
    }
}
