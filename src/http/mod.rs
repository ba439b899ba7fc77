//! HTTP surface - router, health, world data, and static assets

pub mod routes;

pub use routes::build_router;
