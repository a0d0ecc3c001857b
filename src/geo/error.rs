use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeoError {
    #[error("latitude out of range: {0}")]
    LatitudeOutOfRange(f64),
    #[error("longitude out of range: {0}")]
    LongitudeOutOfRange(f64),
    #[error("invalid coordinate format: {0}")]
    InvalidFormat(String),
    #[error("invalid viewport: {0}")]
    InvalidViewport(&'static str),
    #[error("projected position is not finite")]
    NonFinite,
}
