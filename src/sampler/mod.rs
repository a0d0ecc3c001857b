mod device;
mod error;
mod replay;

pub use device::{DeviceSampler, PermissionStatus, Positioning, SamplerTimeouts};
pub use error::SampleError;
pub use replay::ReplayPositioning;

use std::future::Future;

use crate::geo::Coordinate;

/// One-shot acquisition of the device's current coordinate.
///
/// Implementations apply their own timeouts and never panic; every failure
/// comes back as a [`SampleError`].
pub trait LocationSampler: Send + Sync + 'static {
    fn sample_once(&self) -> impl Future<Output = Result<Coordinate, SampleError>> + Send;
}
