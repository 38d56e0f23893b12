pub mod dialogs;
pub mod keyspaces;
pub mod workflows;
