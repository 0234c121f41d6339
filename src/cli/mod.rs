//! CLI layer: grammar assembly, dispatch and the bundled commands

pub mod commands;
pub mod dispatcher;
pub mod error;

pub use dispatcher::{Dispatcher, COMPLETION};
pub use error::{CliError, CliResult};
