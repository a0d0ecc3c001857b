mod layer;
mod surface;
mod svg;

pub use layer::{projection_from, HeatLayer};
pub use svg::SvgSurface;
