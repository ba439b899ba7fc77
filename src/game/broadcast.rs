//! Periodic full-state broadcast loop
//!
//! Every tick snapshots the session registry and publishes the complete
//! mapping to all connections. This is the eventual-consistency safety net
//! for clients that missed incremental events.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::interval;
use tracing::{debug, info};

use crate::game::registry::SessionRegistry;
use crate::ws::hub::ConnectionHub;
use crate::ws::protocol::ServerMsg;

/// Cancellable repeating `players:state` publisher
pub struct StateBroadcaster {
    registry: Arc<SessionRegistry>,
    hub: Arc<ConnectionHub>,
    period: Duration,
    shutdown: Arc<Notify>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl StateBroadcaster {
    pub fn new(registry: Arc<SessionRegistry>, hub: Arc<ConnectionHub>, period: Duration) -> Self {
        Self {
            registry,
            hub,
            period,
            shutdown: Arc::new(Notify::new()),
            task: Mutex::new(None),
        }
    }

    /// Spawn the loop. Idempotent: at most one task runs at a time.
    pub fn start(&self) {
        let mut task = self.task.lock();
        if task.is_some() {
            return;
        }

        let registry = self.registry.clone();
        let hub = self.hub.clone();
        let shutdown = self.shutdown.clone();
        let period = self.period;

        *task = Some(tokio::spawn(async move {
            info!(period_ms = period.as_millis() as u64, "State broadcast loop started");

            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        // Snapshot-then-send: never iterate live state
                        let players = registry.snapshot();
                        hub.broadcast_all(&ServerMsg::PlayersState { players });
                    }
                    _ = shutdown.notified() => {
                        debug!("State broadcast loop stopping");
                        break;
                    }
                }
            }
        }));
    }

    pub fn is_running(&self) -> bool {
        self.task.lock().is_some()
    }

    /// Signal the loop to exit and wait for it
    pub async fn stop(&self) {
        let handle = self.task.lock().take();
        if let Some(handle) = handle {
            // notify_one stores a permit, so the signal is not lost if the
            // task is mid-tick rather than parked on notified()
            self.shutdown.notify_one();
            let _ = handle.await;
            info!("State broadcast loop stopped");
        }
    }
}
