//! Open dialogs and their lifecycle.

pub mod registry;
pub mod session;
mod sweep;

pub use registry::DialogRegistry;
pub use session::{Dialog, DialogSession, DialogSnapshot, SharedDialog, SubmitOutcome};
pub use sweep::start_idle_sweep;
