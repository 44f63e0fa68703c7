use scene::Feature;

use crate::geojson::{Projections, write_features_pretty};

pub const EXPORT_FILE_NAME: &str = "data.geojson";
pub const GEOJSON_MIME_TYPE: &str = "application/geo+json";

/// A file ready to be handed to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportDocument {
    pub file_name: String,
    pub mime_type: String,
    pub content: String,
}

impl ExportDocument {
    /// Pretty-printed FeatureCollection under the default file name.
    pub fn geojson(features: &[Feature], proj: Projections) -> Result<Self, serde_json::Error> {
        Ok(Self {
            file_name: EXPORT_FILE_NAME.to_string(),
            mime_type: GEOJSON_MIME_TYPE.to_string(),
            content: write_features_pretty(features, proj)?,
        })
    }

    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = file_name.into();
        self
    }
}
