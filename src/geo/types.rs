use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::error::GeoError;

/// Span used when the map recenters on a point (roughly a city block).
pub const DEFAULT_SPAN_DEG: f64 = 0.004;

/// Where the map opens when no position is known: San Francisco.
pub const FALLBACK_CENTER: Coordinate = Coordinate {
    latitude: 37.7749,
    longitude: -122.4194,
};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCoordinate")]
pub struct Coordinate {
    latitude: f64,
    longitude: f64,
}

#[derive(Deserialize)]
struct RawCoordinate {
    latitude: f64,
    longitude: f64,
}

impl TryFrom<RawCoordinate> for Coordinate {
    type Error = GeoError;

    fn try_from(raw: RawCoordinate) -> Result<Self, Self::Error> {
        Coordinate::new(raw.latitude, raw.longitude)
    }
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, GeoError> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(GeoError::LatitudeOutOfRange(latitude));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(GeoError::LongitudeOutOfRange(longitude));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

impl FromStr for Coordinate {
    type Err = GeoError;

    /// Parses `"lat,lon"`, e.g. `"37.7749, -122.4194"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<_> = s.split(',').map(|p| p.trim()).collect();
        if parts.len() != 2 {
            return Err(GeoError::InvalidFormat(s.to_string()));
        }
        let lat = parts[0]
            .parse()
            .map_err(|_| GeoError::InvalidFormat(s.to_string()))?;
        let lon = parts[1]
            .parse()
            .map_err(|_| GeoError::InvalidFormat(s.to_string()))?;
        Coordinate::new(lat, lon)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6},{:.6}", self.latitude, self.longitude)
    }
}

/// The visible map region plus the pixel size of the overlay drawn on top of it.
///
/// Corners are derived from `center` and the spans; they are plain geometric
/// values and may fall outside the valid coordinate ranges near the poles or
/// the antimeridian.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub center: Coordinate,
    pub latitude_span_deg: f64,
    pub longitude_span_deg: f64,
    pub surface_width_px: f64,
    pub surface_height_px: f64,
}

impl Viewport {
    pub fn new(
        center: Coordinate,
        latitude_span_deg: f64,
        longitude_span_deg: f64,
        surface_width_px: f64,
        surface_height_px: f64,
    ) -> Self {
        Self {
            center,
            latitude_span_deg,
            longitude_span_deg,
            surface_width_px,
            surface_height_px,
        }
    }

    pub fn around(center: Coordinate, span_deg: f64, width_px: f64, height_px: f64) -> Self {
        Self::new(center, span_deg, span_deg, width_px, height_px)
    }

    /// (latitude, longitude) of the north-west corner.
    pub fn top_left(&self) -> (f64, f64) {
        (
            self.center.latitude() + self.latitude_span_deg / 2.0,
            self.center.longitude() - self.longitude_span_deg / 2.0,
        )
    }

    /// (latitude, longitude) of the south-east corner.
    pub fn bottom_right(&self) -> (f64, f64) {
        (
            self.center.latitude() - self.latitude_span_deg / 2.0,
            self.center.longitude() + self.longitude_span_deg / 2.0,
        )
    }

    pub fn with_surface(self, width_px: f64, height_px: f64) -> Self {
        Self {
            surface_width_px: width_px,
            surface_height_px: height_px,
            ..self
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectedPoint {
    pub x: f32,
    pub y: f32,
}

impl ProjectedPoint {
    /// Marks a coordinate that cannot be placed in the current viewport.
    pub const SENTINEL: ProjectedPoint = ProjectedPoint { x: -1.0, y: -1.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn is_sentinel(&self) -> bool {
        self.x < 0.0 || self.y < 0.0
    }
}
