mod index;
mod overlay;

pub use index::{HasGeometry, SpatialIndex};
pub use overlay::{normalize, overlay, Overlap, Weight};
