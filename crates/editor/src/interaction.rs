use std::fmt;
use std::str::FromStr;

use scene::GeometryType;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::tools::{DrawTool, ModifyTool, SnapTool};

/// Editing mode. Exactly one is active at a time.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Draw, modify and snap are attached.
    Geometry,
    /// Single clicks select a feature for property editing.
    Properties,
}

impl Mode {
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Geometry => "geometry",
            Mode::Properties => "properties",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InteractionError {
    #[error("unknown mode: {0}")]
    UnknownMode(String),
    #[error("{0} cannot be drawn")]
    NotDrawable(GeometryType),
}

impl FromStr for Mode {
    type Err = InteractionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "geometry" => Ok(Mode::Geometry),
            "properties" => Ok(Mode::Properties),
            other => Err(InteractionError::UnknownMode(other.to_string())),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ToolKind {
    Draw,
    Modify,
    Snap,
}

/// Tools currently attached to the map. At most one of each kind.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolSet {
    pub draw: Option<DrawTool>,
    pub modify: Option<ModifyTool>,
    pub snap: Option<SnapTool>,
}

impl ToolSet {
    /// Attached tools with their instance numbers, in attach order.
    pub fn attached(&self) -> Vec<(ToolKind, u64)> {
        let mut out = Vec::new();
        if let Some(m) = &self.modify {
            out.push((ToolKind::Modify, m.instance()));
        }
        if let Some(d) = &self.draw {
            out.push((ToolKind::Draw, d.instance()));
        }
        if let Some(s) = &self.snap {
            out.push((ToolKind::Snap, s.instance()));
        }
        out
    }

    pub fn is_empty(&self) -> bool {
        self.draw.is_none() && self.modify.is_none() && self.snap.is_none()
    }
}

/// Binds the active mode to the tools attached to the map.
///
/// Invariants:
/// - In `Geometry`, draw, modify and snap are attached and click selection is off.
/// - In `Properties`, no tool is attached and click selection is on.
#[derive(Debug)]
pub struct InteractionController {
    mode: Mode,
    geometry_type: GeometryType,
    tools: ToolSet,
    click_selection: bool,
    next_instance: u64,
    snap_tolerance_px: f64,
    modify_tolerance_px: f64,
}

impl InteractionController {
    pub fn new(
        mode: Mode,
        geometry_type: GeometryType,
        snap_tolerance_px: f64,
        modify_tolerance_px: f64,
    ) -> Result<Self, InteractionError> {
        if !geometry_type.is_drawable() {
            return Err(InteractionError::NotDrawable(geometry_type));
        }
        let mut controller = Self {
            mode: Mode::Properties,
            geometry_type,
            tools: ToolSet::default(),
            click_selection: true,
            next_instance: 0,
            snap_tolerance_px,
            modify_tolerance_px,
        };
        controller.set_mode(mode);
        Ok(controller)
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn geometry_type(&self) -> GeometryType {
        self.geometry_type
    }

    pub fn tools(&self) -> &ToolSet {
        &self.tools
    }

    pub(crate) fn tools_mut(&mut self) -> &mut ToolSet {
        &mut self.tools
    }

    pub fn click_selection_enabled(&self) -> bool {
        self.click_selection
    }

    /// Switches mode. Returns `true` if the mode changed.
    pub fn set_mode(&mut self, to: Mode) -> bool {
        match (self.mode, to) {
            (Mode::Geometry, Mode::Properties) => {
                self.detach_draw_and_snap();
                self.tools.modify = None;
                self.click_selection = true;
            }
            (Mode::Properties, Mode::Geometry) => {
                self.click_selection = false;
                self.tools.modify = Some(ModifyTool::new(
                    self.bump_instance(),
                    self.modify_tolerance_px,
                ));
                self.attach_draw_and_snap();
            }
            (Mode::Geometry, Mode::Geometry) | (Mode::Properties, Mode::Properties) => {
                return false;
            }
        }
        info!(from = %self.mode, to = %to, "interaction mode changed");
        self.mode = to;
        true
    }

    /// Changes the type new sketches are drawn with.
    ///
    /// In `Geometry` mode draw and snap are replaced together; modify stays.
    /// In `Properties` mode the type is remembered for the next switch.
    pub fn set_geometry_type(&mut self, ty: GeometryType) -> Result<(), InteractionError> {
        if !ty.is_drawable() {
            return Err(InteractionError::NotDrawable(ty));
        }
        self.geometry_type = ty;
        if self.mode == Mode::Geometry {
            self.detach_draw_and_snap();
            self.attach_draw_and_snap();
        }
        Ok(())
    }

    fn attach_draw_and_snap(&mut self) {
        let draw_instance = self.bump_instance();
        // The type is validated on entry, so this is always `Some`.
        self.tools.draw = DrawTool::new(draw_instance, self.geometry_type);
        self.tools.snap = Some(SnapTool::new(self.bump_instance(), self.snap_tolerance_px));
    }

    fn detach_draw_and_snap(&mut self) {
        self.tools.draw = None;
        self.tools.snap = None;
    }

    fn bump_instance(&mut self) -> u64 {
        let n = self.next_instance;
        self.next_instance += 1;
        n
    }
}
