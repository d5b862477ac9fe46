//! Adapters around the 2048 engine: configuration, the SQLite score store,
//! the serialized game host and the HTTP routes.

pub mod app;
pub mod args;
pub mod config;
pub mod routes;
pub mod store;
