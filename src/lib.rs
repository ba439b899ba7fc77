//! FPS Relay Server - authoritative position/combat relay
//!
//! Clients connect over WebSocket, report their pose and shooting actions,
//! and the server fans those events out to every other connected client
//! while tracking authoritative health and respawn state. All state lives
//! in memory on a single node.

pub mod app;
pub mod config;
pub mod game;
pub mod http;
pub mod util;
pub mod world;
pub mod ws;
