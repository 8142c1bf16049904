mod fill;
mod geometry;
mod projection;
mod renderer;
mod spatial;

pub use fill::FillGrid;
pub use projection::{Albers, Viewport};
pub use renderer::{ChoroplethRenderer, DisplaySettings, LineString, MapLayers};
