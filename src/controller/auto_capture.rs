use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use super::controller::Core;
use crate::sampler::LocationSampler;
use crate::store::PointStore;

/// Handle to the repeating capture task. Dropping it stops the task.
pub(super) struct AutoCapture {
    stopped: Arc<AtomicBool>,
    stop_tx: Option<oneshot::Sender<()>>,
    join: Option<JoinHandle<()>>,
}

impl AutoCapture {
    pub(super) fn start<S, L>(core: Arc<Core<S, L>>, period: Duration) -> Self
    where
        S: PointStore,
        L: LocationSampler,
    {
        let stopped = Arc::new(AtomicBool::new(false));
        let (stop_tx, stop_rx) = oneshot::channel();
        let join = tokio::spawn(run_capture_loop(core, period, stopped.clone(), stop_rx));
        log::info!("Auto-capture started (every {:?})", period);

        Self {
            stopped,
            stop_tx: Some(stop_tx),
            join: Some(join),
        }
    }

    /// Stops the task; no tick is acted on after this returns.
    ///
    /// A capture already in flight is left to finish. The returned handle
    /// resolves once it has.
    pub(super) fn stop(mut self) -> Option<JoinHandle<()>> {
        self.signal_stop();
        log::info!("Auto-capture stopped");
        self.join.take()
    }

    fn signal_stop(&mut self) {
        self.stopped.store(true, Ordering::Release);
        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for AutoCapture {
    fn drop(&mut self) {
        self.signal_stop();
    }
}

async fn run_capture_loop<S, L>(
    core: Arc<Core<S, L>>,
    period: Duration,
    stopped: Arc<AtomicBool>,
    mut stop_rx: oneshot::Receiver<()>,
) where
    S: PointStore,
    L: LocationSampler,
{
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        let should_stop = tokio::select! {
            _ = ticker.tick() => false,
            _ = &mut stop_rx => true,
        };
        if should_stop || stopped.load(Ordering::Acquire) {
            break;
        }

        if let Err(e) = core.add_now().await {
            log::error!("Auto-capture could not store sample: {}", e);
        }
    }
}
