mod error;
mod projector;
mod types;

pub use projector::{project, ViewportSource};
pub use types::{Coordinate, ProjectedPoint, Viewport, DEFAULT_SPAN_DEG, FALLBACK_CENTER};
