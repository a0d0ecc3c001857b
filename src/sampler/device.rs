use std::future::Future;
use std::time::Duration;

use super::{LocationSampler, SampleError};
use crate::geo::Coordinate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    Granted,
    Denied,
    Unknown,
}

/// Platform positioning service: permissions plus cached and fresh fixes.
///
/// Fixes are raw `(latitude, longitude)` pairs as reported by the platform;
/// the sampler validates them.
pub trait Positioning: Send + Sync + 'static {
    fn permission_status(&self) -> impl Future<Output = PermissionStatus> + Send;

    fn request_permission(&self) -> impl Future<Output = PermissionStatus> + Send;

    fn last_known(&self) -> impl Future<Output = Option<(f64, f64)>> + Send;

    /// Asks for a fresh best-accuracy fix, giving the platform `timeout` to
    /// reach it.
    fn current_fix(&self, timeout: Duration) -> impl Future<Output = Option<(f64, f64)>> + Send;
}

#[derive(Debug, Clone, Copy)]
pub struct SamplerTimeouts {
    /// Handed to the platform for the best-accuracy attempt.
    pub preferred: Duration,
    /// Hard cutoff after which the attempt counts as timed out.
    pub hard: Duration,
}

impl Default for SamplerTimeouts {
    fn default() -> Self {
        Self {
            preferred: Duration::from_secs(8),
            hard: Duration::from_secs(12),
        }
    }
}

pub struct DeviceSampler<P> {
    backend: P,
    timeouts: SamplerTimeouts,
}

impl<P: Positioning> DeviceSampler<P> {
    pub fn new(backend: P, timeouts: SamplerTimeouts) -> Self {
        Self { backend, timeouts }
    }

    async fn ensure_permission(&self) -> Result<(), SampleError> {
        let mut status = self.backend.permission_status().await;
        if status != PermissionStatus::Granted {
            status = self.backend.request_permission().await;
        }
        match status {
            PermissionStatus::Granted => Ok(()),
            _ => Err(SampleError::PermissionDenied),
        }
    }
}

impl<P: Positioning> LocationSampler for DeviceSampler<P> {
    async fn sample_once(&self) -> Result<Coordinate, SampleError> {
        self.ensure_permission().await?;

        if let Some(fix) = self.backend.last_known().await {
            return validate(fix);
        }

        let attempt = self.backend.current_fix(self.timeouts.preferred);
        match tokio::time::timeout(self.timeouts.hard, attempt).await {
            Ok(Some(fix)) => validate(fix),
            Ok(None) => Err(SampleError::NoFixAvailable),
            Err(_) => Err(SampleError::AcquisitionTimeout),
        }
    }
}

fn validate((latitude, longitude): (f64, f64)) -> Result<Coordinate, SampleError> {
    Coordinate::new(latitude, longitude).map_err(|e| {
        log::debug!("Discarding unusable fix: {}", e);
        SampleError::NoFixAvailable
    })
}
