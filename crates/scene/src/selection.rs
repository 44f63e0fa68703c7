use foundation::ids::FeatureId;

/// At most one selected feature.
///
/// The selection holds an id, not a reference, so it can go stale; readers
/// resolve it against the store every time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    current: Option<FeatureId>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the selection. Returns `true` if it changed.
    pub fn select(&mut self, id: FeatureId) -> bool {
        if self.current.as_ref() == Some(&id) {
            return false;
        }
        self.current = Some(id);
        true
    }

    /// Returns `true` if something was selected.
    pub fn clear(&mut self) -> bool {
        self.current.take().is_some()
    }

    pub fn get(&self) -> Option<&FeatureId> {
        self.current.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_none()
    }
}
