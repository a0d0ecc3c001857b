use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SampleError {
    #[error("location permission denied")]
    PermissionDenied,
    #[error("location acquisition timed out")]
    AcquisitionTimeout,
    #[error("no location fix available")]
    NoFixAvailable,
}
