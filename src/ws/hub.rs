//! Connection hub - outbound fan-out to connected clients
//!
//! Each WebSocket connection registers an unbounded channel here; its writer
//! task drains the channel into the socket. Broadcasts never block a game
//! event handler on a slow client.

use dashmap::DashMap;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::ws::protocol::ServerMsg;

/// Registry of live connections keyed by connection identity
pub struct ConnectionHub {
    connections: DashMap<Uuid, mpsc::UnboundedSender<ServerMsg>>,
}

impl ConnectionHub {
    pub fn new() -> Self {
        Self {
            connections: DashMap::new(),
        }
    }

    /// Register a connection and return the receiving end for its writer task
    pub fn register(&self, id: Uuid) -> mpsc::UnboundedReceiver<ServerMsg> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.connections.insert(id, tx);
        rx
    }

    /// Drop a connection's outbound channel
    pub fn unregister(&self, id: &Uuid) {
        self.connections.remove(id);
    }

    /// Send to a single connection; returns false if it is gone
    pub fn send_to(&self, id: &Uuid, msg: ServerMsg) -> bool {
        match self.connections.get(id) {
            Some(tx) => tx.send(msg).is_ok(),
            None => false,
        }
    }

    /// Publish to every connection
    pub fn broadcast_all(&self, msg: &ServerMsg) {
        self.fan_out(msg, None);
    }

    /// Publish to every connection except the originator
    pub fn broadcast_except(&self, except: &Uuid, msg: &ServerMsg) {
        self.fan_out(msg, Some(except));
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    fn fan_out(&self, msg: &ServerMsg, except: Option<&Uuid>) {
        let mut stale: Vec<Uuid> = Vec::new();

        for entry in self.connections.iter() {
            if Some(entry.key()) == except {
                continue;
            }
            if entry.value().send(msg.clone()).is_err() {
                stale.push(*entry.key());
            }
        }

        // Prune closed channels outside the iteration
        for id in stale {
            self.connections.remove(&id);
        }
    }
}

impl Default for ConnectionHub {
    fn default() -> Self {
        Self::new()
    }
}
