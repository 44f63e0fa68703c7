//! GeoJSON import and export at the session boundary.
//!
//! Documents are geographic (EPSG:4326); the store is Web Mercator.
//! Reading a document is the only asynchronous step: the text is awaited to
//! completion, then parsed and applied synchronously, so a failed parse
//! never leaves a partial import behind.

use std::future::Future;
use std::path::PathBuf;

use foundation::ids::FeatureId;
use formats::{ExportDocument, GeoJsonError, Projections, read_features};
use scene::FeatureStore;
use tracing::{debug, info};

use crate::config::ExportConfig;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GatewayError {
    #[error("could not read {name}: {reason}")]
    Read { name: String, reason: String },
    #[error("could not parse import: {0}")]
    Parse(#[from] GeoJsonError),
    #[error("could not serialize export: {0}")]
    Serialize(String),
}

/// Something an import can read text from: a picked browser file, a path,
/// or an in-memory string.
pub trait DocumentSource {
    fn name(&self) -> &str;

    fn read_to_string(&self) -> impl Future<Output = Result<String, GatewayError>>;
}

/// A document already held in memory.
#[derive(Debug, Clone)]
pub struct TextSource {
    name: String,
    text: String,
}

impl TextSource {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }
}

impl DocumentSource for TextSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn read_to_string(&self) -> Result<String, GatewayError> {
        Ok(self.text.clone())
    }
}

/// A document on the local filesystem.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
    name: String,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path.display().to_string();
        Self { path, name }
    }
}

impl DocumentSource for FileSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn read_to_string(&self) -> Result<String, GatewayError> {
        std::fs::read_to_string(&self.path).map_err(|e| GatewayError::Read {
            name: self.name.clone(),
            reason: e.to_string(),
        })
    }
}

/// Serializes the whole store. An empty store yields an empty collection.
pub fn export(
    store: &FeatureStore,
    config: &ExportConfig,
) -> Result<ExportDocument, GatewayError> {
    let proj = Projections::default();
    let mut doc = ExportDocument::geojson(store.features(), proj)
        .map_err(|e| GatewayError::Serialize(e.to_string()))?
        .with_file_name(config.file_name.clone());
    doc.mime_type = config.mime_type.clone();
    info!(
        features = store.len(),
        file = %doc.file_name,
        crs = proj.data.code(),
        "exported features"
    );
    debug!(content = %doc.content, "export payload");
    Ok(doc)
}

/// Parses `text` and appends its features. The store is untouched on error.
pub fn import_text(
    store: &mut FeatureStore,
    text: &str,
) -> Result<Vec<FeatureId>, GatewayError> {
    let proj = Projections::default();
    let drafts = read_features(text, proj)?;
    let ids = store.add_features(drafts);
    info!(
        added = ids.len(),
        total = store.len(),
        from = proj.data.code(),
        to = proj.features.code(),
        "imported features"
    );
    Ok(ids)
}

/// Awaits the source to completion.
pub async fn read_document<S: DocumentSource>(source: &S) -> Result<String, GatewayError> {
    let text = source.read_to_string().await?;
    debug!(source = source.name(), bytes = text.len(), "document read");
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::{DocumentSource, FileSource, GatewayError, TextSource, export, import_text};
    use crate::config::ExportConfig;
    use foundation::math::{Vec2, approx_eq_vec2, lon_lat_to_mercator};
    use pretty_assertions::assert_eq;
    use scene::{FeatureDraft, FeatureStore, Geometry, NAME_KEY};
    use serde_json::{Value, json};

    const TWO_POINTS: &str = r#"{"type":"FeatureCollection","features":[
        {"type":"Feature","geometry":{"type":"Point","coordinates":[2.35,48.85]},"properties":{"name":"Paris"}},
        {"type":"Feature","geometry":{"type":"Point","coordinates":[-0.12,51.5]},"properties":{"name":"London"}}
    ]}"#;

    #[test]
    fn empty_export_is_a_valid_collection() {
        let doc = export(&FeatureStore::new(), &ExportConfig::default()).expect("export");
        assert_eq!(doc.file_name, "data.geojson");
        assert_eq!(doc.mime_type, "application/geo+json");
        let value: Value = serde_json::from_str(&doc.content).expect("json");
        assert_eq!(value, json!({ "type": "FeatureCollection", "features": [] }));
    }

    #[test]
    fn imports_accumulate() {
        let mut store = FeatureStore::new();
        import_text(&mut store, TWO_POINTS).expect("import");
        let again = import_text(&mut store, TWO_POINTS).expect("import");
        assert_eq!(store.len(), 4);
        assert_eq!(again.len(), 2);

        let Some(Geometry::Point(p)) = store.features()[0].geometry else {
            panic!("expected point");
        };
        assert!(approx_eq_vec2(p, lon_lat_to_mercator(2.35, 48.85), 1e-6));
    }

    #[test]
    fn failed_import_leaves_store_unchanged() {
        let mut store = FeatureStore::new();
        import_text(&mut store, TWO_POINTS).expect("import");
        let revision = store.revision();

        for bad in ["not json", r#"{"type":"Feature"}"#, r#"{"type":"FeatureCollection"}"#] {
            assert!(matches!(
                import_text(&mut store, bad),
                Err(GatewayError::Parse(_))
            ));
        }
        assert_eq!(store.len(), 2);
        assert_eq!(store.revision(), revision);
    }

    #[test]
    fn export_then_import_round_trips() {
        let mut store = FeatureStore::new();
        store.add_features([
            FeatureDraft::new(Geometry::LineString(vec![
                lon_lat_to_mercator(-10.0, 5.0),
                lon_lat_to_mercator(20.0, -15.0),
            ]))
            .with_property(NAME_KEY, "route")
            .with_property("lanes", 2),
            FeatureDraft::new(Geometry::Polygon(vec![vec![
                Vec2::new(0.0, 0.0),
                Vec2::new(1000.0, 0.0),
                Vec2::new(1000.0, 1000.0),
                Vec2::new(0.0, 0.0),
            ]])),
        ]);

        let doc = export(&store, &ExportConfig::default()).expect("export");
        let mut restored = FeatureStore::new();
        import_text(&mut restored, &doc.content).expect("import");

        assert_eq!(restored.len(), store.len());
        for (a, b) in restored.features().iter().zip(store.features()) {
            assert_eq!(a.id, b.id);
            assert_eq!(a.properties, b.properties);
            let (va, vb) = (
                a.geometry.as_ref().expect("geometry").vertices(),
                b.geometry.as_ref().expect("geometry").vertices(),
            );
            assert_eq!(va.len(), vb.len());
            assert!(va.iter().zip(&vb).all(|(x, y)| approx_eq_vec2(*x, *y, 1e-6)));
        }
    }

    #[test]
    fn sources_read_to_completion() {
        let text = pollster::block_on(TextSource::new("mem", "{}").read_to_string());
        assert_eq!(text, Ok("{}".to_string()));

        let missing = FileSource::new("/definitely/not/here.geojson");
        let err = pollster::block_on(missing.read_to_string()).unwrap_err();
        assert!(matches!(err, GatewayError::Read { .. }));
        assert_eq!(missing.name(), "/definitely/not/here.geojson");
    }
}
