use chrono::{DateTime, Local, Utc};

use crate::geo::Coordinate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AutoState {
    #[default]
    Idle,
    AutoCapturing,
}

/// Snapshot of everything the UI shows about the capture session.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DisplayState {
    pub count: usize,
    pub last_captured_at: Option<DateTime<Utc>>,
    pub auto: AutoState,
}

impl DisplayState {
    pub fn count_label(&self) -> String {
        format!("Points: {}", self.count)
    }

    pub fn timestamp_label(&self) -> String {
        match self.last_captured_at {
            Some(at) => format!(
                "Last: {}",
                at.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S")
            ),
            None => "Last: —".to_string(),
        }
    }

    pub fn auto_toggle_text(&self) -> &'static str {
        match self.auto {
            AutoState::Idle => "Start Auto",
            AutoState::AutoCapturing => "Stop Auto",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ControllerEvent {
    /// A new sample was stored; the map recenters on it.
    PointSaved(Coordinate),
    StateChanged(DisplayState),
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn initial_labels_are_placeholders() {
        let state = DisplayState::default();
        assert_eq!(state.count_label(), "Points: 0");
        assert_eq!(state.timestamp_label(), "Last: —");
        assert_eq!(state.auto_toggle_text(), "Start Auto");
    }

    #[test]
    fn timestamp_label_uses_local_time() {
        let at = Utc.with_ymd_and_hms(2026, 3, 14, 15, 9, 26).unwrap();
        let state = DisplayState {
            count: 4,
            last_captured_at: Some(at),
            auto: AutoState::AutoCapturing,
        };
        let local = at.with_timezone(&Local);
        assert_eq!(
            state.timestamp_label(),
            format!("Last: {}", local.format("%Y-%m-%d %H:%M:%S"))
        );
        assert_eq!(state.count_label(), "Points: 4");
        assert_eq!(state.auto_toggle_text(), "Stop Auto");
    }
}
