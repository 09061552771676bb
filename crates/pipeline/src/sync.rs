//! Cross-device synchronizer.
//!
//! Only the initiating (non-mobile) session runs this component. It
//! polls the shared flow record on a fixed interval and surfaces the
//! paired device's progress as events: a single "pending" transition
//! when the flow is opened on mobile, and a single terminal transition
//! when it finishes. A failed tick is logged and ignored -- one network
//! blip must not abort an otherwise healthy pairing.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use saia_api::flow::FlowStore;
use saia_core::flow_state::FlowStatus;
use saia_core::recommendation::Recommendation;

/// Broadcast channel capacity for synchronizer events.
const EVENT_CHANNEL_CAPACITY: usize = 16;

/// Observed transitions of the paired device's session.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncEvent {
    /// The flow was opened on the mobile device; keep waiting.
    Pending,
    /// The paired device finished with a usable recommendation.
    Results { recommendation: Recommendation },
    /// The paired device finished without a usable recommendation.
    NotFound,
}

/// Polls the shared flow record until a terminal status.
///
/// The polling task is uniquely owned: [`start`](Self::start) spawns
/// it, and its timer is cancelled exactly once -- either by reaching a
/// terminal status or by [`stop`](Self::stop)/drop. `stop` is safe to
/// call any number of times.
pub struct DeviceSynchronizer {
    flow: Arc<dyn FlowStore>,
    interval: Duration,
    events: broadcast::Sender<SyncEvent>,
    cancel: CancellationToken,
}

impl DeviceSynchronizer {
    pub fn new(flow: Arc<dyn FlowStore>, interval: Duration) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            flow,
            interval,
            events,
            cancel: CancellationToken::new(),
        }
    }

    /// Subscribe to sync transitions. Subscribe before `start` to be
    /// sure not to miss the first event.
    pub fn subscribe(&self) -> broadcast::Receiver<SyncEvent> {
        self.events.subscribe()
    }

    /// Spawn the polling task.
    pub fn start(&self) -> tokio::task::JoinHandle<()> {
        let flow = Arc::clone(&self.flow);
        let events = self.events.clone();
        let cancel = self.cancel.clone();
        let interval = self.interval;

        tokio::spawn(async move {
            poll_loop(flow, events, cancel, interval).await;
        })
    }

    /// Stop polling. Idempotent; in-flight requests are not aborted,
    /// but their results are discarded.
    pub fn stop(&self) {
        self.cancel.cancel();
    }
}

impl Drop for DeviceSynchronizer {
    fn drop(&mut self) {
        // Tearing down the owner must not leak the polling task.
        self.cancel.cancel();
    }
}

/// Poll until a terminal status or cancellation.
async fn poll_loop(
    flow: Arc<dyn FlowStore>,
    events: broadcast::Sender<SyncEvent>,
    cancel: CancellationToken,
    interval: Duration,
) {
    let mut pending_seen = false;

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Flow polling stopped");
                return;
            }
            _ = tokio::time::sleep(interval) => {}
        }

        let record = match flow.get().await {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(error = %e, "Flow poll tick failed");
                continue;
            }
        };
        if cancel.is_cancelled() {
            // Torn down while the request was in flight.
            return;
        }

        match record.state.status() {
            Some(FlowStatus::OpenedOnMobile) => {
                if !pending_seen {
                    pending_seen = true;
                    tracing::info!("Flow opened on the mobile device");
                    let _ = events.send(SyncEvent::Pending);
                }
            }
            Some(FlowStatus::Finished) => {
                let event = match record.state.recommendations() {
                    Some(recommendation) => SyncEvent::Results { recommendation },
                    None => SyncEvent::NotFound,
                };
                tracing::info!(?event, "Flow finished on the mobile device");
                let _ = events.send(event);
                cancel.cancel();
                return;
            }
            _ => {}
        }
    }
}
