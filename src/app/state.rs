//! Application state shared across routes

use std::sync::Arc;

use crate::config::Config;
use crate::game::{Arena, SessionRegistry, SpawnSelector, StateBroadcaster};
use crate::util::time::STATE_BROADCAST_INTERVAL;
use crate::world::WorldSnapshot;
use crate::ws::ConnectionHub;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub world: Arc<WorldSnapshot>,
    pub registry: Arc<SessionRegistry>,
    pub hub: Arc<ConnectionHub>,
    pub arena: Arc<Arena>,
    pub broadcaster: Arc<StateBroadcaster>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let config = Arc::new(config);

        // Build the world catalog once; shared read-only afterwards
        let world = Arc::new(WorldSnapshot::generate(config.world_seed));

        let registry = Arc::new(SessionRegistry::new());
        let hub = Arc::new(ConnectionHub::new());

        let arena = Arc::new(Arena::new(
            registry.clone(),
            SpawnSelector::new(),
            hub.clone(),
            world.clone(),
        ));

        let broadcaster = Arc::new(StateBroadcaster::new(
            registry.clone(),
            hub.clone(),
            STATE_BROADCAST_INTERVAL,
        ));

        Self {
            config,
            world,
            registry,
            hub,
            arena,
            broadcaster,
        }
    }
}
