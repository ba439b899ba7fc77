//! WebSocket protocol message definitions
//! These are the wire types for client-server communication
//!
//! The envelope is a tagged JSON object: `{"type": "player:join", ...}`.
//! Event names and camelCase field spelling follow the existing client
//! contract, so deployed clients keep working unmodified.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::game::registry::PlayerRecord;
use crate::world::WorldSnapshot;

/// Three-component vector used for positions, rotations, and velocities
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Euclidean distance in the x/z plane (vertical axis ignored)
    pub fn planar_distance(&self, other: &Vec3) -> f32 {
        let dx = self.x - other.x;
        let dz = self.z - other.z;
        (dx * dx + dz * dz).sqrt()
    }
}

/// Messages sent from client to server
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum ClientMsg {
    /// Join the arena with a display name
    #[serde(rename = "player:join")]
    Join { username: String },

    /// Fire-and-forget pose telemetry; any subset of fields may be present
    #[serde(rename = "player:update")]
    Update {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        position: Option<Vec3>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        rotation: Option<Vec3>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        velocity: Option<Vec3>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        timestamp: Option<u64>,
    },

    /// Client-reported hit against another player
    #[serde(rename = "player:shoot")]
    Shoot { target_id: Uuid },

    /// Request a respawn after death
    #[serde(rename = "player:respawn")]
    Respawn,
}

/// Messages sent from server to client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum ServerMsg {
    /// Sent to the joining client only; carries the full terrain catalog
    #[serde(rename = "game:start")]
    GameStart {
        player_id: Uuid,
        position: Vec3,
        health: i32,
        timestamp: u64,
        terrain: WorldSnapshot,
    },

    /// Announces a new player to everyone else
    #[serde(rename = "player:joined")]
    PlayerJoined {
        player_id: Uuid,
        username: String,
        position: Vec3,
        health: i32,
        timestamp: u64,
    },

    /// Current registry snapshot, sent to the joining client
    #[serde(rename = "player:list")]
    PlayerList { players: HashMap<Uuid, PlayerRecord> },

    /// Relayed pose telemetry (sent to everyone except the mover)
    #[serde(rename = "player:update")]
    PlayerUpdate {
        player_id: Uuid,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        position: Option<Vec3>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        rotation: Option<Vec3>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        velocity: Option<Vec3>,
        timestamp: u64,
    },

    /// Non-lethal hit
    #[serde(rename = "player:hit")]
    PlayerHit {
        target_id: Uuid,
        shooter_id: Uuid,
        health: i32,
        damage: i32,
        timestamp: u64,
    },

    /// Lethal hit
    #[serde(rename = "player:died")]
    PlayerDied {
        dead_id: Uuid,
        killer_id: Uuid,
        health: i32,
        timestamp: u64,
    },

    #[serde(rename = "game:over")]
    GameOver {
        dead_id: Uuid,
        killer_id: Uuid,
        timestamp: u64,
    },

    #[serde(rename = "player:respawned")]
    PlayerRespawned {
        player_id: Uuid,
        position: Vec3,
        health: i32,
        timestamp: u64,
    },

    #[serde(rename = "player:left")]
    PlayerLeft { player_id: Uuid, timestamp: u64 },

    /// Periodic full-state snapshot keyed by connection identity
    #[serde(rename = "players:state")]
    PlayersState { players: HashMap<Uuid, PlayerRecord> },
}
