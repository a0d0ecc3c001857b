use crate::geo::ProjectedPoint;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientStop {
    /// Position along the radius, 0.0 at the center and 1.0 at the edge.
    pub offset: f32,
    pub color: Rgba,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RadialGradient {
    pub stops: [GradientStop; 3],
}

impl RadialGradient {
    /// Red core fading through orange to an almost transparent yellow rim.
    pub const HEAT: RadialGradient = RadialGradient {
        stops: [
            GradientStop {
                offset: 0.0,
                color: Rgba::new(0xff, 0x00, 0x00, 0.35),
            },
            GradientStop {
                offset: 0.5,
                color: Rgba::new(0xff, 0xa5, 0x00, 0.20),
            },
            GradientStop {
                offset: 1.0,
                color: Rgba::new(0xff, 0xff, 0x00, 0.05),
            },
        ],
    };
}

/// Host drawing surface the heat layer paints onto.
pub trait DrawingSurface {
    fn fill_radial_gradient_circle(
        &mut self,
        center: ProjectedPoint,
        radius: f32,
        gradient: &RadialGradient,
    );
}
