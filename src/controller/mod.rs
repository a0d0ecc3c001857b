mod auto_capture;
mod controller;
mod state;

pub use controller::{Controller, ControllerSettings};
pub use state::{AutoState, ControllerEvent};
