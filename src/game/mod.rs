//! Authoritative game-state core

pub mod arena;
pub mod broadcast;
pub mod combat;
pub mod history;
pub mod registry;
pub mod spawn;

pub use arena::Arena;
pub use broadcast::StateBroadcaster;
pub use registry::{PlayerRecord, PositionUpdate, SessionRegistry};
pub use spawn::SpawnSelector;
