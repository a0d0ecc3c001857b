use std::sync::{Arc, Mutex as StdMutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use super::auto_capture::AutoCapture;
use super::state::{AutoState, ControllerEvent, DisplayState};
use crate::geo::Coordinate;
use crate::heat::HeatLayer;
use crate::sampler::LocationSampler;
use crate::store::{NewSample, PointStore, Sample, StoreError};

const EVENT_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy)]
pub struct ControllerSettings {
    pub auto_capture_period: Duration,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            auto_capture_period: Duration::from_secs(15),
        }
    }
}

/// Shared by the controller and its auto-capture task.
pub(super) struct Core<S, L> {
    store: S,
    sampler: L,
    heat: Arc<StdMutex<HeatLayer>>,
    state: StdMutex<DisplayState>,
    events: broadcast::Sender<ControllerEvent>,
}

/// Orchestrates capturing points, persisting them and keeping the heat layer
/// in sync with the store.
pub struct Controller<S, L> {
    core: Arc<Core<S, L>>,
    auto: StdMutex<Option<AutoCapture>>,
    /// Stopped workers whose last capture may still be in flight.
    draining: StdMutex<Vec<JoinHandle<()>>>,
    settings: ControllerSettings,
}

fn lock<T>(mutex: &StdMutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<S: PointStore, L: LocationSampler> Controller<S, L> {
    /// Opens the store and loads whatever it already holds.
    ///
    /// A store that cannot be initialized is fatal: nothing else can proceed.
    pub async fn new(
        store: S,
        sampler: L,
        heat: Arc<StdMutex<HeatLayer>>,
        settings: ControllerSettings,
    ) -> Result<Self, StoreError> {
        store.initialize().await?;

        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let core = Arc::new(Core {
            store,
            sampler,
            heat,
            state: StdMutex::new(DisplayState::default()),
            events,
        });

        let controller = Self {
            core,
            auto: StdMutex::new(None),
            draining: StdMutex::new(Vec::new()),
            settings,
        };
        controller.refresh_heat().await?;
        Ok(controller)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ControllerEvent> {
        self.core.events.subscribe()
    }

    pub fn display_state(&self) -> DisplayState {
        lock(&self.core.state).clone()
    }

    pub fn heat_layer(&self) -> Arc<StdMutex<HeatLayer>> {
        self.core.heat.clone()
    }

    /// Captures and stores one point. Sampler failures are a no-op (`Ok(None)`).
    pub async fn add_now(&self) -> Result<Option<Sample>, StoreError> {
        self.core.add_now().await
    }

    pub async fn refresh_heat(&self) -> Result<(), StoreError> {
        self.core.refresh_heat().await
    }

    /// Flips between idle and periodic capture. Must run inside a tokio runtime.
    pub fn toggle_auto(&self) -> AutoState {
        let next = {
            let mut auto = lock(&self.auto);
            match auto.take() {
                Some(worker) => {
                    if let Some(join) = worker.stop() {
                        let mut draining = lock(&self.draining);
                        draining.retain(|h| !h.is_finished());
                        draining.push(join);
                    }
                    AutoState::Idle
                }
                None => {
                    *auto = Some(AutoCapture::start(
                        self.core.clone(),
                        self.settings.auto_capture_period,
                    ));
                    AutoState::AutoCapturing
                }
            }
        };
        self.core.update_state(|state| state.auto = next);
        next
    }

    /// Stops auto-capture if running and waits for any in-flight capture.
    pub async fn shutdown(&self) {
        let worker = lock(&self.auto).take();
        let was_running = worker.is_some();

        let mut pending: Vec<JoinHandle<()>> = lock(&self.draining).drain(..).collect();
        pending.extend(worker.and_then(AutoCapture::stop));
        for join in pending {
            let _ = join.await;
        }

        if was_running {
            self.core.update_state(|state| state.auto = AutoState::Idle);
        }
    }

    pub async fn clear_all(&self) -> Result<(), StoreError> {
        self.core.store.clear_all().await?;
        self.core.refresh_heat().await
    }

    /// Most recently captured point, by timestamp rather than store order.
    pub async fn last_point(&self) -> Result<Option<Coordinate>, StoreError> {
        let rows = self.core.store.list_all().await?;
        Ok(rows
            .iter()
            .max_by_key(|r| (r.captured_at_utc, r.id))
            .map(|r| r.coordinate))
    }
}

impl<S: PointStore, L: LocationSampler> Core<S, L> {
    pub(super) async fn add_now(&self) -> Result<Option<Sample>, StoreError> {
        let coordinate = match self.sampler.sample_once().await {
            Ok(coordinate) => coordinate,
            Err(e) => {
                log::warn!("No point captured: {}", e);
                return Ok(None);
            }
        };

        let sample = self.store.insert(NewSample::now(coordinate)).await?;
        log::info!("Saved point #{} at {}", sample.id, coordinate);

        self.update_state(|state| {
            state.count += 1;
            state.last_captured_at = Some(sample.captured_at_utc);
        });
        let _ = self.events.send(ControllerEvent::PointSaved(coordinate));

        self.refresh_heat().await?;
        Ok(Some(sample))
    }

    pub(super) async fn refresh_heat(&self) -> Result<(), StoreError> {
        let rows = self.store.list_all().await?;
        let last = rows.iter().map(|r| r.captured_at_utc).max();

        self.update_state(|state| {
            state.count = rows.len();
            state.last_captured_at = last;
        });
        lock(&self.heat).set_points(rows.iter().map(|r| r.coordinate));

        log::debug!("Heat layer refreshed with {} points", rows.len());
        Ok(())
    }

    fn update_state(&self, apply: impl FnOnce(&mut DisplayState)) {
        let snapshot = {
            let mut state = lock(&self.state);
            apply(&mut state);
            state.clone()
        };
        let _ = self.events.send(ControllerEvent::StateChanged(snapshot));
    }
}
