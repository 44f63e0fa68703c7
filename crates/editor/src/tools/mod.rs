pub mod draw;
pub mod modify;
pub mod snap;

pub use draw::DrawTool;
pub use modify::{Grab, GrabTarget, ModifyTool};
pub use snap::SnapTool;
