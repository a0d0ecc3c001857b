use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use super::{PermissionStatus, Positioning};

/// Positioning backend that plays back a fixed track, one fix per request.
///
/// Stands in for a GPS receiver on hosts without one.
pub struct ReplayPositioning {
    fixes: Mutex<VecDeque<(f64, f64)>>,
    cycle: bool,
    deny_permission: bool,
    granted: AtomicBool,
}

impl ReplayPositioning {
    pub fn new(fixes: impl IntoIterator<Item = (f64, f64)>, cycle: bool) -> Self {
        Self {
            fixes: Mutex::new(fixes.into_iter().collect()),
            cycle,
            deny_permission: false,
            granted: AtomicBool::new(false),
        }
    }

    /// Refuse the permission prompt, as a user declining location access would.
    pub fn denying_permission(mut self) -> Self {
        self.deny_permission = true;
        self
    }

    fn next_fix(&self) -> Option<(f64, f64)> {
        let mut fixes = self.fixes.lock().unwrap_or_else(PoisonError::into_inner);
        let fix = fixes.pop_front()?;
        if self.cycle {
            fixes.push_back(fix);
        }
        Some(fix)
    }
}

impl Positioning for ReplayPositioning {
    async fn permission_status(&self) -> PermissionStatus {
        if self.granted.load(Ordering::Acquire) {
            PermissionStatus::Granted
        } else {
            PermissionStatus::Unknown
        }
    }

    async fn request_permission(&self) -> PermissionStatus {
        if self.deny_permission {
            return PermissionStatus::Denied;
        }
        self.granted.store(true, Ordering::Release);
        PermissionStatus::Granted
    }

    async fn last_known(&self) -> Option<(f64, f64)> {
        None
    }

    async fn current_fix(&self, _timeout: Duration) -> Option<(f64, f64)> {
        self.next_fix()
    }
}
