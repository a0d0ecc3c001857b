//! SVG surface: collects heat blobs into a standalone SVG document.

use super::surface::{DrawingSurface, RadialGradient};
use crate::geo::ProjectedPoint;

pub struct SvgSurface {
    width: f64,
    height: f64,
    gradients: Vec<RadialGradient>,
    circles: Vec<(ProjectedPoint, f32, usize)>,
}

impl SvgSurface {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            gradients: Vec::new(),
            circles: Vec::new(),
        }
    }

    fn gradient_index(&mut self, gradient: &RadialGradient) -> usize {
        match self.gradients.iter().position(|g| g == gradient) {
            Some(i) => i,
            None => {
                self.gradients.push(gradient.clone());
                self.gradients.len() - 1
            }
        }
    }

    pub fn finish(&self) -> String {
        let (width, height) = (self.width, self.height);
        let mut svg = String::with_capacity(256 + self.circles.len() * 96);
        svg.push_str(&format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {width} {height}" width="{width}" height="{height}">"#,
        ));

        if !self.gradients.is_empty() {
            svg.push_str("<defs>");
            for (i, gradient) in self.gradients.iter().enumerate() {
                svg.push_str(&format!(r#"<radialGradient id="heat{i}">"#));
                for stop in &gradient.stops {
                    svg.push_str(&format!(
                        r#"<stop offset="{}" stop-color="{}" stop-opacity="{}"/>"#,
                        stop.offset,
                        stop.color.hex(),
                        stop.color.a,
                    ));
                }
                svg.push_str("</radialGradient>");
            }
            svg.push_str("</defs>");
        }

        for (center, radius, gradient) in &self.circles {
            svg.push_str(&format!(
                r#"<circle cx="{}" cy="{}" r="{radius}" fill="url(#heat{gradient})"/>"#,
                center.x, center.y,
            ));
        }

        svg.push_str("</svg>");
        svg
    }
}

impl DrawingSurface for SvgSurface {
    fn fill_radial_gradient_circle(
        &mut self,
        center: ProjectedPoint,
        radius: f32,
        gradient: &RadialGradient,
    ) {
        let index = self.gradient_index(gradient);
        self.circles.push((center, radius, index));
    }
}
