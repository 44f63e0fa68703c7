use foundation::ids::FeatureId;
use foundation::math::Vec2;
use formats::ExportDocument;
use scene::events::ChangeEvent;
use scene::picking::{GeometryHitTester, HitTester, PickOptions};
use scene::selection::Selection;
use scene::{FeatureDraft, FeatureStore, GeometryType, StoreError};
use tracing::{debug, warn};

use crate::config::{ConfigError, EditorConfig};
use crate::gateway::{self, DocumentSource, GatewayError};
use crate::interaction::{InteractionController, InteractionError, Mode, ToolSet};
use crate::property_editor::{Popup, PropertyEditor};

/// A pointer position in working-projection units plus the view
/// resolution (units per pixel) at the time of the event.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Pointer {
    pub coordinate: Vec2,
    pub resolution: f64,
}

impl Pointer {
    pub fn new(coordinate: Vec2, resolution: f64) -> Self {
        Self {
            coordinate,
            resolution,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum MapEvent {
    /// A click that was not part of a double click or drag.
    SingleClick(Pointer),
    DoubleClick(Pointer),
    PointerDown(Pointer),
    PointerDrag(Pointer),
    PointerUp(Pointer),
}

/// What an event did, for the shell to react to.
#[derive(Debug, Clone, PartialEq)]
pub enum EventOutcome {
    Ignored,
    SketchUpdated,
    FeatureAdded(FeatureId),
    FeatureModified(FeatureId),
    PopupOpened(Popup),
    PopupClosed,
}

/// One editing session: the store plus everything that acts on it.
///
/// All UI handlers go through this object; nothing is kept in globals.
pub struct EditorSession {
    config: EditorConfig,
    store: FeatureStore,
    controller: InteractionController,
    editor: PropertyEditor,
    hit_tester: Box<dyn HitTester>,
    dragging: bool,
}

impl std::fmt::Debug for EditorSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorSession")
            .field("mode", &self.controller.mode())
            .field("features", &self.store.len())
            .field("popup", &self.editor.popup())
            .finish()
    }
}

impl EditorSession {
    pub fn new(config: EditorConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let i = &config.interaction;
        let controller = InteractionController::new(
            i.initial_mode,
            i.geometry_type()?,
            i.snap_tolerance_px,
            i.modify_tolerance_px,
        )
        .map_err(|e| ConfigError::Invalid(e.to_string()))?;

        Ok(Self {
            config,
            store: FeatureStore::new(),
            controller,
            editor: PropertyEditor::new(),
            hit_tester: Box::new(GeometryHitTester),
            dragging: false,
        })
    }

    /// Swaps the hit-test collaborator, e.g. for one backed by a renderer.
    pub fn with_hit_tester(mut self, tester: impl HitTester + 'static) -> Self {
        self.hit_tester = Box::new(tester);
        self
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn store(&self) -> &FeatureStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut FeatureStore {
        &mut self.store
    }

    /// Store changes since the last call, for the shell to redraw.
    pub fn drain_changes(&mut self) -> Vec<ChangeEvent> {
        self.store.drain_changes()
    }

    pub fn mode(&self) -> Mode {
        self.controller.mode()
    }

    pub fn geometry_type(&self) -> GeometryType {
        self.controller.geometry_type()
    }

    pub fn tools(&self) -> &ToolSet {
        self.controller.tools()
    }

    pub fn popup(&self) -> Option<&Popup> {
        self.editor.popup()
    }

    pub fn selection(&self) -> &Selection {
        self.editor.selection()
    }

    /// Explicit mode switch. Leaving `Properties` drops the selection.
    pub fn set_mode(&mut self, mode: Mode) -> bool {
        if !self.controller.set_mode(mode) {
            return false;
        }
        self.editor.close();
        self.dragging = false;
        true
    }

    pub fn set_geometry_type(&mut self, ty: GeometryType) -> Result<(), InteractionError> {
        self.controller.set_geometry_type(ty)
    }

    pub fn handle_event(&mut self, event: MapEvent) -> EventOutcome {
        match self.controller.mode() {
            Mode::Geometry => self.handle_geometry_event(event),
            Mode::Properties => self.handle_properties_event(event),
        }
    }

    /// Ends the current sketch if it is complete enough (e.g. on Enter).
    pub fn finish_drawing(&mut self) -> EventOutcome {
        let finished = self.controller.tools_mut().draw.as_mut().and_then(|d| d.finish());
        match finished {
            Some(geometry) => self.add_drawn(geometry),
            None => EventOutcome::Ignored,
        }
    }

    /// Drops the current sketch (e.g. on Escape).
    pub fn abort_drawing(&mut self) -> bool {
        self.controller
            .tools_mut()
            .draw
            .as_mut()
            .is_some_and(|d| d.abort())
    }

    /// The popup input changed. Commits immediately.
    pub fn input_name(&mut self, value: &str) -> Result<(), StoreError> {
        self.editor.input_changed(&mut self.store, value)
    }

    pub fn close_popup(&mut self) -> bool {
        self.editor.close()
    }

    pub fn export(&self) -> Result<ExportDocument, GatewayError> {
        gateway::export(&self.store, &self.config.export)
    }

    pub fn import_text(&mut self, text: &str) -> Result<Vec<FeatureId>, GatewayError> {
        gateway::import_text(&mut self.store, text)
    }

    /// Reads `source` to completion, then imports it.
    pub async fn import_from<S: DocumentSource>(
        &mut self,
        source: &S,
    ) -> Result<Vec<FeatureId>, GatewayError> {
        let text = gateway::read_document(source).await?;
        self.import_text(&text)
    }

    fn handle_geometry_event(&mut self, event: MapEvent) -> EventOutcome {
        let snap = |store: &FeatureStore, tools: &ToolSet, p: Pointer| {
            let grabbed = tools.modify.as_ref().and_then(|m| m.grab()).map(|g| &g.feature);
            match &tools.snap {
                Some(s) => s.snap_except(store, p.coordinate, p.resolution, grabbed),
                None => p.coordinate,
            }
        };

        match event {
            MapEvent::PointerDown(p) => {
                let at = snap(&self.store, self.controller.tools(), p);
                self.dragging = self
                    .controller
                    .tools_mut()
                    .modify
                    .as_mut()
                    .is_some_and(|m| m.pointer_down(&self.store, at, p.resolution));
                EventOutcome::Ignored
            }
            MapEvent::PointerDrag(p) => {
                if !self.dragging {
                    return EventOutcome::Ignored;
                }
                let at = snap(&self.store, self.controller.tools(), p);
                let Some(modify) = self.controller.tools_mut().modify.as_mut() else {
                    return EventOutcome::Ignored;
                };
                let feature = modify.grab().map(|g| g.feature.clone());
                match (modify.drag(&mut self.store, at), feature) {
                    (Ok(true), Some(id)) => EventOutcome::FeatureModified(id),
                    (Ok(_), _) => EventOutcome::Ignored,
                    (Err(err), _) => {
                        warn!(%err, "modify dropped");
                        self.dragging = false;
                        EventOutcome::Ignored
                    }
                }
            }
            MapEvent::PointerUp(_) => {
                self.dragging = false;
                if let Some(m) = self.controller.tools_mut().modify.as_mut() {
                    m.pointer_up();
                }
                EventOutcome::Ignored
            }
            MapEvent::SingleClick(p) => {
                let at = snap(&self.store, self.controller.tools(), p);
                let Some(draw) = self.controller.tools_mut().draw.as_mut() else {
                    return EventOutcome::Ignored;
                };
                match draw.click(at, p.resolution) {
                    Some(geometry) => self.add_drawn(geometry),
                    None => EventOutcome::SketchUpdated,
                }
            }
            MapEvent::DoubleClick(_) => self.finish_drawing(),
        }
    }

    fn handle_properties_event(&mut self, event: MapEvent) -> EventOutcome {
        let MapEvent::SingleClick(p) = event else {
            return EventOutcome::Ignored;
        };
        let opts = PickOptions::from_pixels(self.config.interaction.hit_tolerance_px, p.resolution);
        let was_open = self.editor.popup().is_some();
        match self
            .editor
            .click(&self.store, self.hit_tester.as_ref(), p.coordinate, opts)
        {
            Some(popup) => EventOutcome::PopupOpened(popup.clone()),
            None if was_open => EventOutcome::PopupClosed,
            None => EventOutcome::Ignored,
        }
    }

    fn add_drawn(&mut self, geometry: scene::Geometry) -> EventOutcome {
        let kind = geometry.geometry_type();
        let ids = self.store.add_features([FeatureDraft::new(geometry)]);
        match ids.into_iter().next() {
            Some(id) => {
                debug!(feature = %id, %kind, "drawing finished");
                EventOutcome::FeatureAdded(id)
            }
            None => EventOutcome::Ignored,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{EditorSession, EventOutcome, MapEvent, Pointer};
    use crate::config::EditorConfig;
    use crate::gateway::TextSource;
    use crate::interaction::{Mode, ToolKind};
    use foundation::math::{Vec2, approx_eq_vec2, lon_lat_to_mercator};
    use pretty_assertions::assert_eq;
    use scene::events::ChangeEvent;
    use scene::{Geometry, GeometryType, NAME_KEY};
    use serde_json::{Value, json};

    const RES: f64 = 10.0;

    fn session() -> EditorSession {
        EditorSession::new(EditorConfig::default()).expect("session")
    }

    fn click(x: f64, y: f64) -> MapEvent {
        MapEvent::SingleClick(Pointer::new(Vec2::new(x, y), RES))
    }

    #[test]
    fn rename_scenario_round_trips_through_export() {
        let mut s = session();
        let source = TextSource::new(
            "a.geojson",
            r#"{"type":"FeatureCollection","features":[
                {"type":"Feature","geometry":{"type":"Point","coordinates":[-90,40]},
                 "properties":{"name":"A"}}
            ]}"#,
        );
        pollster::block_on(s.import_from(&source)).expect("import");

        assert!(s.set_mode(Mode::Properties));
        let at = lon_lat_to_mercator(-90.0, 40.0);
        let outcome = s.handle_event(MapEvent::SingleClick(Pointer::new(at, RES)));
        let EventOutcome::PopupOpened(popup) = outcome else {
            panic!("expected popup, got {outcome:?}");
        };
        assert_eq!(popup.value, "A");

        s.input_name("B").expect("selected feature exists");
        let doc = s.export().expect("export");
        let value: Value = serde_json::from_str(&doc.content).expect("json");

        let features = value["features"].as_array().expect("features");
        assert_eq!(features.len(), 1);
        assert_eq!(features[0]["properties"][NAME_KEY], json!("B"));
        assert_eq!(features[0]["geometry"]["type"], json!("Point"));
        let c = &features[0]["geometry"]["coordinates"];
        let lon_lat = Vec2::new(
            c[0].as_f64().expect("lon"),
            c[1].as_f64().expect("lat"),
        );
        assert!(approx_eq_vec2(lon_lat, Vec2::new(-90.0, 40.0), 1e-9));
    }

    #[test]
    fn click_on_empty_map_opens_nothing() {
        let mut s = session();
        s.set_mode(Mode::Properties);
        assert_eq!(s.handle_event(click(0.0, 0.0)), EventOutcome::Ignored);
        assert!(s.popup().is_none());
        assert!(s.selection().is_empty());
    }

    #[test]
    fn draws_point_then_line() {
        let mut s = session();
        let EventOutcome::FeatureAdded(point) = s.handle_event(click(0.0, 0.0)) else {
            panic!("point should finish on click");
        };

        s.set_geometry_type(GeometryType::LineString).expect("drawable");
        // Snaps onto the existing point.
        assert_eq!(s.handle_event(click(30.0, 40.0)), EventOutcome::SketchUpdated);
        assert_eq!(s.handle_event(click(5000.0, 0.0)), EventOutcome::SketchUpdated);
        let EventOutcome::FeatureAdded(line) =
            s.handle_event(MapEvent::DoubleClick(Pointer::new(Vec2::new(5000.0, 0.0), RES)))
        else {
            panic!("double click should finish the line");
        };

        assert_ne!(point, line);
        assert_eq!(
            s.store().get(&line).and_then(|f| f.geometry.clone()),
            Some(Geometry::LineString(vec![
                Vec2::new(0.0, 0.0),
                Vec2::new(5000.0, 0.0)
            ]))
        );
    }

    #[test]
    fn drag_modifies_in_geometry_mode_only() {
        let mut s = session();
        s.handle_event(click(0.0, 0.0));
        let id = s.store().features()[0].id.clone();

        let down = MapEvent::PointerDown(Pointer::new(Vec2::new(20.0, 0.0), RES));
        let drag = MapEvent::PointerDrag(Pointer::new(Vec2::new(900.0, 900.0), RES));
        let up = MapEvent::PointerUp(Pointer::new(Vec2::new(900.0, 900.0), RES));

        s.handle_event(down);
        assert_eq!(s.handle_event(drag), EventOutcome::FeatureModified(id.clone()));
        s.handle_event(up);
        assert_eq!(
            s.store().get(&id).and_then(|f| f.geometry.clone()),
            Some(Geometry::Point(Vec2::new(900.0, 900.0)))
        );

        s.set_mode(Mode::Properties);
        s.handle_event(MapEvent::PointerDown(Pointer::new(Vec2::new(900.0, 900.0), RES)));
        assert_eq!(
            s.handle_event(MapEvent::PointerDrag(Pointer::new(Vec2::new(0.0, 0.0), RES))),
            EventOutcome::Ignored
        );
    }

    #[test]
    fn small_drags_move_the_grabbed_point() {
        let mut s = session();
        s.handle_event(click(0.0, 0.0));
        let id = s.store().features()[0].id.clone();
        s.drain_changes();

        s.handle_event(MapEvent::PointerDown(Pointer::new(Vec2::new(0.0, 0.0), RES)));
        let outcomes: Vec<EventOutcome> = [20.0, 40.0, 60.0, 80.0]
            .into_iter()
            .map(|x| s.handle_event(MapEvent::PointerDrag(Pointer::new(Vec2::new(x, 0.0), RES))))
            .collect();
        assert_eq!(outcomes, vec![EventOutcome::FeatureModified(id.clone()); 4]);

        // Holding still changes nothing.
        let still = MapEvent::PointerDrag(Pointer::new(Vec2::new(80.0, 0.0), RES));
        assert_eq!(s.handle_event(still), EventOutcome::Ignored);
        s.handle_event(MapEvent::PointerUp(Pointer::new(Vec2::new(80.0, 0.0), RES)));

        assert_eq!(
            s.store().get(&id).and_then(|f| f.geometry.clone()),
            Some(Geometry::Point(Vec2::new(80.0, 0.0)))
        );
        assert_eq!(s.drain_changes(), vec![ChangeEvent::GeometryChanged(id); 4]);
        assert!(s.drain_changes().is_empty());
    }

    #[test]
    fn mode_switch_clears_selection_and_swaps_tools() {
        let mut s = session();
        s.handle_event(click(0.0, 0.0));
        s.set_mode(Mode::Properties);
        assert!(matches!(
            s.handle_event(click(0.0, 0.0)),
            EventOutcome::PopupOpened(_)
        ));
        assert!(s.tools().is_empty());

        s.set_mode(Mode::Geometry);
        assert!(s.popup().is_none());
        assert!(s.selection().is_empty());
        let kinds: Vec<ToolKind> = s.tools().attached().into_iter().map(|(k, _)| k).collect();
        assert_eq!(kinds, vec![ToolKind::Modify, ToolKind::Draw, ToolKind::Snap]);

        // Clicks draw again instead of selecting.
        assert!(matches!(
            s.handle_event(click(10_000.0, 0.0)),
            EventOutcome::FeatureAdded(_)
        ));
    }

    #[test]
    fn failed_import_is_reported_and_harmless() {
        let mut s = session();
        s.handle_event(click(0.0, 0.0));
        assert!(s.import_text("{\"type\": \"FeatureCollection\"").is_err());
        assert_eq!(s.store().len(), 1);
    }

    #[test]
    fn background_click_closes_open_popup() {
        let mut s = session();
        s.handle_event(click(0.0, 0.0));
        s.set_mode(Mode::Properties);
        s.handle_event(click(0.0, 0.0));
        assert_eq!(s.handle_event(click(1.0e6, 0.0)), EventOutcome::PopupClosed);
        assert!(s.popup().is_none());
        assert!(!s.close_popup());
    }
}
