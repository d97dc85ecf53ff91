//! Command-line surface: argument definitions and the workflows behind them

pub mod args;
pub mod orchestration;

pub use args::{Cli, Command, VersionQuery};
pub use orchestration::{run, Workspace};
