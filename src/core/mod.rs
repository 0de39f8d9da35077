//! Core types shared by the builders.

pub mod platform;

pub use platform::Platform;
