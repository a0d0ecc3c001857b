use tokio::sync::Mutex;

use super::{NewSample, PointStore, Sample, StoreError};

/// Non-durable store kept entirely in process memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Rows>,
}

#[derive(Debug, Default)]
struct Rows {
    rows: Vec<Sample>,
    last_id: u64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PointStore for MemoryStore {
    async fn initialize(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn insert(&self, sample: NewSample) -> Result<Sample, StoreError> {
        let mut inner = self.inner.lock().await;
        inner.last_id += 1;
        let row = sample.with_id(inner.last_id);
        inner.rows.push(row.clone());
        Ok(row)
    }

    async fn list_all(&self) -> Result<Vec<Sample>, StoreError> {
        Ok(self.inner.lock().await.rows.clone())
    }

    async fn clear_all(&self) -> Result<(), StoreError> {
        self.inner.lock().await.rows.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::Coordinate;

    #[tokio::test]
    async fn ids_keep_increasing_across_clear() {
        let store = MemoryStore::new();
        let c = Coordinate::new(1.0, 2.0).unwrap();

        let a = store.insert(NewSample::now(c)).await.unwrap();
        let b = store.insert(NewSample::now(c)).await.unwrap();
        assert_eq!((a.id, b.id), (1, 2));
        assert_eq!(store.list_all().await.unwrap().len(), 2);

        store.clear_all().await.unwrap();
        assert!(store.list_all().await.unwrap().is_empty());

        let c3 = store.insert(NewSample::now(c)).await.unwrap();
        assert_eq!(c3.id, 3);
    }
}
