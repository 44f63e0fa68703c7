//! Editor configuration.
//!
//! Every section has defaults matching the stock editor, so a config file
//! only needs the keys it changes.

use std::path::Path;

use foundation::math::{MERCATOR_HALF_SIZE, resolution_for_zoom};
use formats::{EXPORT_FILE_NAME, GEOJSON_MIME_TYPE};
use scene::GeometryType;
use serde::{Deserialize, Serialize};

use crate::interaction::Mode;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("reading config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("config parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct EditorConfig {
    pub view: ViewConfig,
    pub style: StyleConfig,
    pub interaction: InteractionConfig,
    pub export: ExportConfig,
}

/// Initial map view, in working-projection metres.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    pub center: [f64; 2],
    pub zoom: f64,
    /// `[min_x, min_y, max_x, max_y]` the view may pan within.
    pub extent: [f64; 4],
}

impl Default for ViewConfig {
    fn default() -> Self {
        // The Mercator world, widened by half a world width on either side.
        let h = MERCATOR_HALF_SIZE;
        Self {
            center: [-11_000_000.0, 4_600_000.0],
            zoom: 4.0,
            extent: [-2.0 * h, -h, 2.0 * h, h],
        }
    }
}

impl ViewConfig {
    pub fn resolution(&self) -> f64 {
        resolution_for_zoom(self.zoom)
    }
}

/// Vector layer style, keyed like flat map styles (`fill-color`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct StyleConfig {
    pub fill_color: String,
    pub stroke_color: String,
    pub stroke_width: f64,
    pub circle_radius: f64,
    pub circle_fill_color: String,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            fill_color: "rgba(255, 255, 255, 0.2)".to_string(),
            stroke_color: "#ffcc33".to_string(),
            stroke_width: 2.0,
            circle_radius: 7.0,
            circle_fill_color: "#ffcc33".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    pub initial_mode: Mode,
    pub initial_geometry_type: String,
    pub hit_tolerance_px: f64,
    pub snap_tolerance_px: f64,
    pub modify_tolerance_px: f64,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            initial_mode: Mode::Geometry,
            initial_geometry_type: GeometryType::Point.as_str().to_string(),
            hit_tolerance_px: 7.0,
            snap_tolerance_px: 10.0,
            modify_tolerance_px: 10.0,
        }
    }
}

impl InteractionConfig {
    pub fn geometry_type(&self) -> Result<GeometryType, ConfigError> {
        let ty: GeometryType = self
            .initial_geometry_type
            .parse()
            .map_err(|e: scene::UnknownGeometryType| ConfigError::Invalid(e.to_string()))?;
        if !ty.is_drawable() {
            return Err(ConfigError::Invalid(format!("{ty} cannot be drawn")));
        }
        Ok(ty)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub file_name: String,
    pub mime_type: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            file_name: EXPORT_FILE_NAME.to_string(),
            mime_type: GEOJSON_MIME_TYPE.to_string(),
        }
    }
}

impl EditorConfig {
    pub fn from_json_str(payload: &str) -> Result<Self, ConfigError> {
        let config: EditorConfig = serde_json::from_str(payload)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let payload = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&payload)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.interaction.geometry_type()?;
        let i = &self.interaction;
        for (name, v) in [
            ("hit_tolerance_px", i.hit_tolerance_px),
            ("snap_tolerance_px", i.snap_tolerance_px),
            ("modify_tolerance_px", i.modify_tolerance_px),
        ] {
            if !(v.is_finite() && v >= 0.0) {
                return Err(ConfigError::Invalid(format!("{name} must be >= 0, got {v}")));
            }
        }
        if self.export.file_name.trim().is_empty() {
            return Err(ConfigError::Invalid("export file_name is empty".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, EditorConfig};
    use crate::interaction::Mode;
    use foundation::math::mercator_extent;
    use pretty_assertions::assert_eq;
    use scene::GeometryType;

    #[test]
    fn empty_object_yields_defaults() {
        let config = EditorConfig::from_json_str("{}").expect("config");
        assert_eq!(config, EditorConfig::default());
        assert_eq!(config.export.file_name, "data.geojson");
        assert_eq!(config.interaction.geometry_type().ok(), Some(GeometryType::Point));
        assert_eq!(config.view.extent[0], 2.0 * config.view.extent[1]);
    }

    #[test]
    fn view_extent_adds_half_a_world_each_side() {
        let world = mercator_extent();
        let half_world = world.width() / 2.0;
        let extent = EditorConfig::default().view.extent;
        assert_eq!(extent[0], world.min[0] - half_world);
        assert_eq!(extent[2], world.max[0] + half_world);
        assert_eq!([extent[1], extent[3]], [world.min[1], world.max[1]]);
    }

    #[test]
    fn partial_sections_merge_with_defaults() {
        let config = EditorConfig::from_json_str(
            r##"{
                "interaction": { "initial_mode": "properties", "initial_geometry_type": "Polygon" },
                "style": { "stroke-color": "#ff0000" }
            }"##,
        )
        .expect("config");
        assert_eq!(config.interaction.initial_mode, Mode::Properties);
        assert_eq!(config.interaction.hit_tolerance_px, 7.0);
        assert_eq!(config.style.stroke_color, "#ff0000");
        assert_eq!(config.style.circle_radius, 7.0);
    }

    #[test]
    fn rejects_undrawable_type_and_negative_tolerance() {
        let err = EditorConfig::from_json_str(
            r#"{ "interaction": { "initial_geometry_type": "MultiPolygon" } }"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let err =
            EditorConfig::from_json_str(r#"{ "interaction": { "snap_tolerance_px": -1 } }"#)
                .unwrap_err();
        assert!(err.to_string().contains("snap_tolerance_px"));

        assert!(matches!(
            EditorConfig::from_json_str("{"),
            Err(ConfigError::Parse(_))
        ));
    }
}
