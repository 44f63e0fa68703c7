//! Editing session over a feature store: modes, tools, property popup,
//! and GeoJSON import/export.

pub mod config;
pub mod gateway;
pub mod interaction;
pub mod property_editor;
pub mod session;
pub mod tools;

pub use config::{ConfigError, EditorConfig};
pub use gateway::{DocumentSource, FileSource, GatewayError, TextSource};
pub use interaction::{InteractionController, InteractionError, Mode, ToolKind, ToolSet};
pub use property_editor::{Popup, PropertyEditor};
pub use session::{EditorSession, EventOutcome, MapEvent, Pointer};
