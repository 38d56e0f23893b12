//! vtconsole API server library.
//!
//! Exposes the building blocks (config, state, backend contracts, dialog
//! lifecycle, routes) so integration tests and the binary entrypoint can
//! both access them.

pub mod backend;
pub mod config;
pub mod dialogs;
pub mod engine;
pub mod error;
pub mod handlers;
pub mod keyspace_cache;
pub mod response;
pub mod router;
pub mod routes;
pub mod state;
