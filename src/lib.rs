pub mod boundary;
pub mod build;
pub mod changelog;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod git;
pub mod metadata;
pub mod pipeline;
pub mod process;
pub mod resolver;
pub mod tasks;
pub mod ui;

pub use error::{RelcraftError, Result};
