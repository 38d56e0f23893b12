pub mod dispatcher;

pub use dispatcher::{ActionDispatcher, DispatchOutcome};
