use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::geo::Coordinate;

/// A sample before the store has assigned it an id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSample {
    pub coordinate: Coordinate,
    pub captured_at_utc: DateTime<Utc>,
}

impl NewSample {
    pub fn now(coordinate: Coordinate) -> Self {
        Self {
            coordinate,
            captured_at_utc: Utc::now(),
        }
    }

    pub fn with_id(self, id: u64) -> Sample {
        Sample {
            id,
            coordinate: self.coordinate,
            captured_at_utc: self.captured_at_utc,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub id: u64,
    #[serde(flatten)]
    pub coordinate: Coordinate,
    pub captured_at_utc: DateTime<Utc>,
}
