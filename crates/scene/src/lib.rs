pub mod events;
pub mod feature;
pub mod geometry;
pub mod picking;
pub mod selection;
pub mod store;

pub use feature::*;
pub use geometry::*;
pub use store::*;
