//! Session registry - the single piece of shared mutable game state
//!
//! Maps connection identity to the authoritative player record and owns the
//! per-player position history ring. Handlers and the broadcast loop share
//! it concurrently; reads that iterate copy out first.

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::game::combat::{self, DamageOutcome};
use crate::game::history::{PositionHistory, PositionHistoryEntry};
use crate::util::time::unix_millis;
use crate::ws::protocol::Vec3;

/// Authoritative per-player state, keyed by connection identity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub id: Uuid,
    pub username: String,
    pub position: Vec3,
    pub rotation: Vec3,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub velocity: Option<Vec3>,
    pub health: i32,
    /// Reserved counters carried in outbound state; nothing mutates them yet
    pub score: i32,
    pub awf: i32,
    pub last_update: u64,
}

/// Partial state update from pose telemetry; only present fields apply
#[derive(Debug, Clone, Copy, Default)]
pub struct PositionUpdate {
    pub position: Option<Vec3>,
    pub rotation: Option<Vec3>,
    pub velocity: Option<Vec3>,
    pub timestamp: Option<u64>,
}

/// Concurrent map of connected players and their history rings
pub struct SessionRegistry {
    players: DashMap<Uuid, PlayerRecord>,
    histories: DashMap<Uuid, PositionHistory>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self {
            players: DashMap::new(),
            histories: DashMap::new(),
        }
    }

    /// Create a record for a new connection. A re-join for an id already
    /// present overwrites the previous record.
    pub fn join(&self, id: Uuid, username: String, spawn: Vec3) -> PlayerRecord {
        let now = unix_millis();
        let record = PlayerRecord {
            id,
            username,
            position: spawn,
            rotation: Vec3::ZERO,
            velocity: None,
            health: combat::MAX_HEALTH,
            score: 0,
            awf: 0,
            last_update: now,
        };

        self.players.insert(id, record.clone());

        let mut history = PositionHistory::new();
        history.push(spawn, now);
        self.histories.insert(id, history);

        record
    }

    /// Apply a partial update. Returns false (ignored) for unknown ids -
    /// telemetry is fire-and-forget, not an error.
    pub fn apply_update(&self, id: Uuid, update: &PositionUpdate) -> bool {
        let Some(mut record) = self.players.get_mut(&id) else {
            return false;
        };

        let now = unix_millis();

        if let Some(position) = update.position {
            record.position = position;
            if let Some(mut history) = self.histories.get_mut(&id) {
                history.push(position, update.timestamp.unwrap_or(now));
            }
        }
        if let Some(rotation) = update.rotation {
            record.rotation = rotation;
        }
        if let Some(velocity) = update.velocity {
            record.velocity = Some(velocity);
        }
        record.last_update = now;

        true
    }

    /// Decrement the target's health. The caller decides which events the
    /// outcome produces.
    pub fn apply_damage(&self, target: Uuid, amount: i32) -> DamageOutcome {
        let Some(mut record) = self.players.get_mut(&target) else {
            return DamageOutcome::Unknown;
        };

        if record.health <= 0 {
            return DamageOutcome::AlreadyDead;
        }

        let (health, lethal) = combat::absorb(record.health, amount);
        record.health = health;
        record.last_update = unix_millis();

        if lethal {
            DamageOutcome::Lethal
        } else {
            DamageOutcome::Absorbed { health }
        }
    }

    /// Reset a player at a new spawn: full health, fresh history ring.
    /// Returns false for unknown ids.
    pub fn respawn(&self, id: Uuid, spawn: Vec3) -> bool {
        let Some(mut record) = self.players.get_mut(&id) else {
            return false;
        };

        let now = unix_millis();
        record.position = spawn;
        record.health = combat::MAX_HEALTH;
        record.last_update = now;

        if let Some(mut history) = self.histories.get_mut(&id) {
            history.reset(spawn, now);
        }

        true
    }

    /// Remove a player and its history ring. `None` for unknown ids is a
    /// normal case (e.g. disconnect before join, or a double disconnect).
    pub fn remove(&self, id: Uuid) -> Option<PlayerRecord> {
        self.histories.remove(&id);
        self.players.remove(&id).map(|(_, record)| record)
    }

    pub fn get(&self, id: Uuid) -> Option<PlayerRecord> {
        self.players.get(&id).map(|r| r.value().clone())
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.players.contains_key(&id)
    }

    /// Point-in-time defensive copy of all records, safe to iterate and
    /// serialize while handlers keep mutating the registry
    pub fn snapshot(&self) -> HashMap<Uuid, PlayerRecord> {
        self.players
            .iter()
            .map(|entry| (*entry.key(), entry.value().clone()))
            .collect()
    }

    /// Occupied positions of every player except the given one (the spawn
    /// selector must not treat the respawning player as an obstacle)
    pub fn positions_except(&self, id: Uuid) -> Vec<Vec3> {
        self.players
            .iter()
            .filter(|entry| *entry.key() != id)
            .map(|entry| entry.value().position)
            .collect()
    }

    /// Copy of a player's history ring, for diagnostics
    pub fn history(&self, id: Uuid) -> Option<Vec<PositionHistoryEntry>> {
        self.histories
            .get(&id)
            .map(|h| h.entries().cloned().collect())
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
