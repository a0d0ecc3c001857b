use std::sync::{PoisonError, RwLock};

use crate::geo::{Coordinate, Viewport, ViewportSource, DEFAULT_SPAN_DEG};

/// Headless stand-in for the map widget: tracks what region is visible and
/// how large the overlay surface is.
pub struct MapView {
    viewport: RwLock<Viewport>,
}

impl MapView {
    pub fn new(center: Coordinate, span_deg: f64, width_px: f64, height_px: f64) -> Self {
        Self {
            viewport: RwLock::new(Viewport::around(center, span_deg, width_px, height_px)),
        }
    }

    /// Moves the map to `center` at the standard recentering span.
    pub fn recenter(&self, center: Coordinate) {
        let mut viewport = self.viewport.write().unwrap_or_else(PoisonError::into_inner);
        *viewport = Viewport::around(
            center,
            DEFAULT_SPAN_DEG,
            viewport.surface_width_px,
            viewport.surface_height_px,
        );
        log::debug!("Map recentered on {}", center);
    }

    pub fn resize(&self, width_px: f64, height_px: f64) {
        let mut viewport = self.viewport.write().unwrap_or_else(PoisonError::into_inner);
        *viewport = viewport.with_surface(width_px, height_px);
    }
}

impl ViewportSource for MapView {
    fn viewport(&self) -> Option<Viewport> {
        Some(*self.viewport.read().unwrap_or_else(PoisonError::into_inner))
    }
}
