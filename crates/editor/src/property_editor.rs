use foundation::ids::FeatureId;
use foundation::math::Vec2;
use scene::picking::{HitTester, PickOptions, pick_point};
use scene::selection::Selection;
use scene::{FeatureStore, NAME_KEY, StoreError};
use tracing::{debug, warn};

/// The inline name editor.
#[derive(Debug, Clone, PartialEq)]
pub struct Popup {
    pub feature: FeatureId,
    /// Map coordinate the popup points at.
    pub anchor: Vec2,
    /// Current text of the input.
    pub value: String,
}

/// Click-to-select editing of the `name` property.
///
/// Invariant: the popup is open exactly when the selection is non-empty,
/// and both refer to the same feature.
#[derive(Debug, Default)]
pub struct PropertyEditor {
    selection: Selection,
    popup: Option<Popup>,
}

impl PropertyEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn popup(&self) -> Option<&Popup> {
        self.popup.as_ref()
    }

    /// Handles a single click at `at`.
    ///
    /// Opens the popup on the topmost feature that still exists in the store;
    /// otherwise closes it. Returns the opened popup.
    pub fn click(
        &mut self,
        store: &FeatureStore,
        tester: &dyn HitTester,
        at: Vec2,
        opts: PickOptions,
    ) -> Option<&Popup> {
        let candidate = pick_point(tester, store, at, opts);
        let Some(feature) = candidate.and_then(|id| store.get(&id)) else {
            self.close();
            return None;
        };

        debug!(feature = %feature.id, "property editor opened");
        self.selection.select(feature.id.clone());
        self.popup = Some(Popup {
            feature: feature.id.clone(),
            anchor: at,
            value: feature.name(),
        });
        self.popup.as_ref()
    }

    /// Commits the input text as the selected feature's name.
    ///
    /// Without an open popup this does nothing. A selected feature that is no
    /// longer in the store is reported as `NotFound` and the popup closes.
    pub fn input_changed(
        &mut self,
        store: &mut FeatureStore,
        value: &str,
    ) -> Result<(), StoreError> {
        let Some(popup) = &mut self.popup else {
            return Ok(());
        };
        popup.value = value.to_string();
        let id = popup.feature.clone();
        if let Err(err) = store.set_property(&id, NAME_KEY, value) {
            warn!(%err, "name edit dropped");
            self.close();
            return Err(err);
        }
        Ok(())
    }

    /// Hides the popup and clears the selection. Returns `true` if it was open.
    pub fn close(&mut self) -> bool {
        self.selection.clear();
        self.popup.take().is_some()
    }
}
