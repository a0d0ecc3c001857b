use std::sync::Arc;

use super::surface::{DrawingSurface, RadialGradient};
use crate::geo::{project, Coordinate, ProjectedPoint, ViewportSource};

pub const BLOB_RADIUS_PX: f32 = 16.0;

pub type Projection = Arc<dyn Fn(&Coordinate) -> ProjectedPoint + Send + Sync>;
type Invalidate = Arc<dyn Fn() + Send + Sync>;

/// Builds a projection that asks `source` for the viewport on every call.
///
/// A source without a viewport yields the sentinel for every point.
pub fn projection_from(source: Arc<dyn ViewportSource>) -> Projection {
    Arc::new(move |coordinate: &Coordinate| match source.viewport() {
        Some(viewport) => project(coordinate, &viewport),
        None => ProjectedPoint::SENTINEL,
    })
}

/// Working set of recorded coordinates, drawn as soft circular blobs.
#[derive(Default)]
pub struct HeatLayer {
    points: Vec<Coordinate>,
    projection: Option<Projection>,
    invalidate: Option<Invalidate>,
}

impl HeatLayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_projection(&mut self, projection: Projection) {
        self.projection = Some(projection);
    }

    /// Registers the redraw hook fired after every point-set mutation.
    ///
    /// The hook runs while the caller still holds the layer, so it must only
    /// schedule a redraw and never touch the layer itself.
    pub fn set_invalidate<F>(&mut self, invalidate: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.invalidate = Some(Arc::new(invalidate));
    }

    /// Replaces the whole working set and requests a redraw.
    pub fn set_points<I>(&mut self, points: I)
    where
        I: IntoIterator<Item = Coordinate>,
    {
        self.points.clear();
        self.points.extend(points);
        if let Some(invalidate) = &self.invalidate {
            invalidate();
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Draws one blob per representable point and returns how many were drawn.
    pub fn render(&self, surface: &mut dyn DrawingSurface) -> usize {
        let Some(projection) = &self.projection else {
            return 0;
        };
        if self.is_empty() {
            return 0;
        }

        let mut drawn = 0;
        for coordinate in &self.points {
            let center = projection(coordinate);
            if center.is_sentinel() {
                continue;
            }
            surface.fill_radial_gradient_circle(center, BLOB_RADIUS_PX, &RadialGradient::HEAT);
            drawn += 1;
        }
        drawn
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::Viewport;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingSurface {
        blobs: Vec<(ProjectedPoint, f32)>,
    }

    impl DrawingSurface for RecordingSurface {
        fn fill_radial_gradient_circle(
            &mut self,
            center: ProjectedPoint,
            radius: f32,
            gradient: &RadialGradient,
        ) {
            assert_eq!(gradient.stops.len(), 3);
            self.blobs.push((center, radius));
        }
    }

    struct FixedViewport(Mutex<Option<Viewport>>);

    impl ViewportSource for FixedViewport {
        fn viewport(&self) -> Option<Viewport> {
            *self.0.lock().unwrap()
        }
    }

    fn coord(lat: f64, lon: f64) -> Coordinate {
        Coordinate::new(lat, lon).unwrap()
    }

    fn viewport() -> Viewport {
        Viewport::around(coord(37.7749, -122.4194), 0.004, 300.0, 300.0)
    }

    #[test]
    fn draws_one_blob_per_representable_point() {
        let mut layer = HeatLayer::new();
        layer.set_projection(projection_from(Arc::new(FixedViewport(Mutex::new(Some(
            viewport(),
        ))))));
        layer.set_points([
            coord(37.7749, -122.4194),
            coord(37.7740, -122.4190),
            // west of the viewport: negative x
            coord(37.7749, -122.4300),
            // north of the viewport: negative y
            coord(37.7800, -122.4194),
        ]);

        let mut surface = RecordingSurface::default();
        assert_eq!(layer.render(&mut surface), 2);
        assert_eq!(surface.blobs.len(), 2);
        assert!(surface.blobs.iter().all(|(_, r)| *r == BLOB_RADIUS_PX));
        assert!(surface.blobs.iter().all(|(p, _)| !p.is_sentinel()));
    }

    #[test]
    fn render_without_projection_is_noop() {
        let mut layer = HeatLayer::new();
        layer.set_points([coord(1.0, 1.0)]);
        let mut surface = RecordingSurface::default();
        assert_eq!(layer.render(&mut surface), 0);
        assert!(surface.blobs.is_empty());
    }

    #[test]
    fn render_of_empty_set_is_noop() {
        let mut layer = HeatLayer::new();
        layer.set_projection(Arc::new(|_: &Coordinate| ProjectedPoint::new(1.0, 1.0)));
        let mut surface = RecordingSurface::default();
        assert_eq!(layer.render(&mut surface), 0);
    }

    #[test]
    fn missing_viewport_skips_every_point() {
        let source = Arc::new(FixedViewport(Mutex::new(None)));
        let mut layer = HeatLayer::new();
        layer.set_projection(projection_from(source.clone()));
        layer.set_points([coord(37.7749, -122.4194)]);

        let mut surface = RecordingSurface::default();
        assert_eq!(layer.render(&mut surface), 0);

        // viewport appears later; projection picks it up without rewiring
        *source.0.lock().unwrap() = Some(viewport());
        assert_eq!(layer.render(&mut surface), 1);
    }

    #[test]
    fn set_points_replaces_and_invalidates() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut layer = HeatLayer::new();
        let counter = calls.clone();
        layer.set_invalidate(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        layer.set_points([coord(1.0, 1.0), coord(2.0, 2.0), coord(3.0, 3.0)]);
        assert_eq!(layer.len(), 3);
        layer.set_points([coord(4.0, 4.0)]);
        assert_eq!(layer.points, vec![coord(4.0, 4.0)]);
        layer.set_points(Vec::new());
        assert!(layer.is_empty());

        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }
}
