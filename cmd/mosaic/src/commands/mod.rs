//! CLI commands module.

mod frames;
mod inspect;
mod run;

pub use inspect::InspectCommand;
pub use run::RunCommand;
