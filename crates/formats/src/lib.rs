pub mod document;
pub mod geojson;

pub use document::*;
pub use geojson::*;
