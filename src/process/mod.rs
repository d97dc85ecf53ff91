//! External command execution
//!
//! Build backends, validators, test runners and other tools are invoked
//! through [`CommandRunner`] so the pipeline can be exercised without them.

pub mod command;
pub mod runner;

pub use command::{expand, CommandOutput, CommandSpec, OutputMode, Placeholders};
pub use runner::{find_in_path, CommandRunner, MockRunner, SystemRunner};
