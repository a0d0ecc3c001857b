mod error;
mod file;
#[cfg(test)]
mod memory;
mod types;

pub use error::StoreError;
pub use file::FileStore;
#[cfg(test)]
pub use memory::MemoryStore;
pub use types::{NewSample, Sample};

use std::future::Future;

/// Durable, append-only collection of recorded samples.
///
/// `list_all` makes no ordering promise; callers derive whatever order they
/// need from the rows themselves.
pub trait PointStore: Send + Sync + 'static {
    /// Creates the underlying storage if absent. Safe to call repeatedly.
    fn initialize(&self) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Appends one row and returns it with its assigned id.
    fn insert(&self, sample: NewSample) -> impl Future<Output = Result<Sample, StoreError>> + Send;

    fn list_all(&self) -> impl Future<Output = Result<Vec<Sample>, StoreError>> + Send;

    fn clear_all(&self) -> impl Future<Output = Result<(), StoreError>> + Send;
}
