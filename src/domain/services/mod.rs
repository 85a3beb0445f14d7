pub mod geometry;
pub mod resolver;
pub mod styling;

pub use geometry::Bounds;
pub use resolver::{CropColorTable, PlotResolver, NO_RECORD_LABEL};
pub use styling::BuildingPalette;
