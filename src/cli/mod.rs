mod args;
mod commands;

pub use args::{CliArgs, Command};
pub use commands::{run, ControlReport};
