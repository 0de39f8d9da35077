//! High-level operations

pub mod file_mover;

pub use file_mover::FileMover;
