use foundation::ids::FeatureId;

/// Store mutation notice, consumed by whatever redraws the vector layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeEvent {
    Added(FeatureId),
    PropertyChanged { id: FeatureId, key: String },
    GeometryChanged(FeatureId),
}

/// Append-only journal of store changes since the last drain.
#[derive(Debug, Default)]
pub struct ChangeLog {
    events: Vec<ChangeEvent>,
}

impl ChangeLog {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn emit(&mut self, event: ChangeEvent) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[ChangeEvent] {
        &self.events
    }

    pub fn drain(&mut self) -> Vec<ChangeEvent> {
        std::mem::take(&mut self.events)
    }
}
