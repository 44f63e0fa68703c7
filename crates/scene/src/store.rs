use std::collections::HashMap;

use foundation::ids::{FeatureId, IdAllocator};
use serde_json::Value;
use tracing::{debug, warn};

use crate::events::{ChangeEvent, ChangeLog};
use crate::feature::{Feature, FeatureDraft};
use crate::geometry::Geometry;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("feature not found: {0}")]
    NotFound(FeatureId),
}

/// Ordered collection of editable features.
///
/// Ordering contract:
/// - `features()` yields features in insertion order, which is also paint
///   order (later features are drawn on top).
///
/// Invariant: ids are unique. Drafts without an id, or whose id is already
/// taken, receive a fresh one on insertion.
#[derive(Debug, Default)]
pub struct FeatureStore {
    features: Vec<Feature>,
    index: HashMap<FeatureId, usize>,
    ids: IdAllocator,
    revision: u64,
    changes: ChangeLog,
}

impl FeatureStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `drafts` in order and returns the ids they were stored under.
    pub fn add_features(
        &mut self,
        drafts: impl IntoIterator<Item = FeatureDraft>,
    ) -> Vec<FeatureId> {
        let mut added = Vec::new();
        for draft in drafts {
            let id = match draft.id {
                Some(id) if !self.index.contains_key(&id) => id,
                Some(taken) => {
                    let fresh = self.fresh_id();
                    warn!(%taken, %fresh, "feature id already in use, reassigned");
                    fresh
                }
                None => self.fresh_id(),
            };

            self.index.insert(id.clone(), self.features.len());
            self.features.push(Feature {
                id: id.clone(),
                geometry: draft.geometry,
                properties: draft.properties,
            });
            self.changes.emit(ChangeEvent::Added(id.clone()));
            added.push(id);
        }

        if !added.is_empty() {
            self.revision += 1;
            debug!(count = added.len(), total = self.features.len(), "features added");
        }
        added
    }

    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn has_feature(&self, id: &FeatureId) -> bool {
        self.index.contains_key(id)
    }

    pub fn get(&self, id: &FeatureId) -> Option<&Feature> {
        self.index.get(id).map(|&i| &self.features[i])
    }

    pub fn set_property(
        &mut self,
        id: &FeatureId,
        key: &str,
        value: impl Into<Value>,
    ) -> Result<(), StoreError> {
        let feature = self.get_mut(id)?;
        feature.properties.insert(key.to_string(), value.into());
        self.touch(ChangeEvent::PropertyChanged {
            id: id.clone(),
            key: key.to_string(),
        });
        Ok(())
    }

    pub fn set_geometry(&mut self, id: &FeatureId, geometry: Geometry) -> Result<(), StoreError> {
        let feature = self.get_mut(id)?;
        feature.geometry = Some(geometry);
        self.touch(ChangeEvent::GeometryChanged(id.clone()));
        Ok(())
    }

    /// Bumped on every mutation; a renderer can compare it to skip redraws.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn drain_changes(&mut self) -> Vec<ChangeEvent> {
        self.changes.drain()
    }

    fn get_mut(&mut self, id: &FeatureId) -> Result<&mut Feature, StoreError> {
        match self.index.get(id) {
            Some(&i) => Ok(&mut self.features[i]),
            None => Err(StoreError::NotFound(id.clone())),
        }
    }

    fn touch(&mut self, event: ChangeEvent) {
        debug!(?event, "feature changed");
        self.revision += 1;
        self.changes.emit(event);
    }

    fn fresh_id(&mut self) -> FeatureId {
        loop {
            let id = self.ids.next_id();
            if !self.index.contains_key(&id) {
                return id;
            }
        }
    }
}
