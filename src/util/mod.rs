//! Shared utilities

pub mod config;
pub mod download;
pub mod fs;
pub mod process;

pub use config::Config;
pub use process::{ProcessBuilder, ProcessError};
