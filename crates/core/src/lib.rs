//! Domain logic for the vtconsole cluster administration console.
//!
//! Everything in this crate is pure: no I/O, no logging. The `api` crate
//! hosts the pipeline and talks to the backend.

pub mod actions;
pub mod command;
pub mod content;
pub mod error;
pub mod flag;
pub mod keyspace;
pub mod settings;
pub mod shard;
pub mod template;
pub mod workflow;
