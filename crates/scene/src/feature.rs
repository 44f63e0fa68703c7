use foundation::ids::FeatureId;
use serde_json::{Map, Value};

use crate::geometry::Geometry;

/// Property key edited through the popup.
pub const NAME_KEY: &str = "name";

/// Feature attributes keyed by property name.
pub type Properties = Map<String, Value>;

/// A feature before it enters the store. `id` may be missing or clash with
/// an existing feature; the store resolves both.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FeatureDraft {
    pub id: Option<FeatureId>,
    pub geometry: Option<Geometry>,
    pub properties: Properties,
}

impl FeatureDraft {
    pub fn new(geometry: Geometry) -> Self {
        Self {
            id: None,
            geometry: Some(geometry),
            properties: Properties::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<FeatureId>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }
}

/// A feature owned by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub id: FeatureId,
    pub geometry: Option<Geometry>,
    pub properties: Properties,
}

impl Feature {
    /// Text shown in the name editor: the string value, the JSON text of a
    /// non-string value, or empty when unset.
    pub fn name(&self) -> String {
        match self.properties.get(NAME_KEY) {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        }
    }

    pub fn property(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }
}

#[cfg(test)]
mod tests {
    use super::{Feature, FeatureDraft, NAME_KEY};
    use crate::geometry::Geometry;
    use foundation::ids::FeatureId;
    use foundation::math::Vec2;
    use serde_json::{Value, json};

    fn feature(name: Option<Value>) -> Feature {
        let mut draft = FeatureDraft::new(Geometry::Point(Vec2::new(0.0, 0.0)));
        if let Some(v) = name {
            draft = draft.with_property(NAME_KEY, v);
        }
        Feature {
            id: FeatureId::from("a"),
            geometry: draft.geometry,
            properties: draft.properties,
        }
    }

    #[test]
    fn name_defaults_to_empty() {
        assert_eq!(feature(None).name(), "");
        assert_eq!(feature(Some(Value::Null)).name(), "");
    }

    #[test]
    fn name_renders_non_string_values() {
        assert_eq!(feature(Some(json!("Lake"))).name(), "Lake");
        assert_eq!(feature(Some(json!(42))).name(), "42");
        assert_eq!(feature(Some(json!(true))).name(), "true");
    }
}
