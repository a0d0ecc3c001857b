use super::error::GeoError;
use super::types::{Coordinate, ProjectedPoint, Viewport};

/// Supplies the viewport currently shown by the map, if it has been laid out.
pub trait ViewportSource: Send + Sync {
    fn viewport(&self) -> Option<Viewport>;
}

/// Flat linear interpolation of `coordinate` into the viewport's pixel surface.
///
/// Only meaningful for small spans. Points outside the visible region are
/// returned with out-of-range pixels, not clamped.
pub fn try_project(
    coordinate: &Coordinate,
    viewport: &Viewport,
) -> Result<ProjectedPoint, GeoError> {
    if !(viewport.latitude_span_deg > 0.0) || !(viewport.longitude_span_deg > 0.0) {
        return Err(GeoError::InvalidViewport("span must be positive"));
    }
    if !(viewport.surface_width_px > 0.0) || !(viewport.surface_height_px > 0.0) {
        return Err(GeoError::InvalidViewport("surface has no area"));
    }

    let (top, left) = viewport.top_left();
    let (bottom, right) = viewport.bottom_right();

    let denom_x = right - left;
    let denom_y = top - bottom;
    if denom_x == 0.0 || denom_y == 0.0 {
        return Err(GeoError::InvalidViewport("corners collapse"));
    }

    let x = (coordinate.longitude() - left) / denom_x;
    let y = (top - coordinate.latitude()) / denom_y;
    if !x.is_finite() || !y.is_finite() {
        return Err(GeoError::NonFinite);
    }

    Ok(ProjectedPoint::new(
        (viewport.surface_width_px * x) as f32,
        (viewport.surface_height_px * y) as f32,
    ))
}

/// Like [`try_project`], but every failure collapses to [`ProjectedPoint::SENTINEL`].
pub fn project(coordinate: &Coordinate, viewport: &Viewport) -> ProjectedPoint {
    match try_project(coordinate, viewport) {
        Ok(point) => point,
        Err(e) => {
            log::trace!("projection of {} skipped: {}", coordinate, e);
            ProjectedPoint::SENTINEL
        }
    }
}
