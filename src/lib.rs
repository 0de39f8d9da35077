//! Buildtools - platform-aware helpers for building CMake projects and Sphinx docs
//!
//! This crate assembles and runs the external commands needed to configure,
//! build and test a native library, build its documentation, and move the
//! resulting artifacts into place.

pub mod builder;
pub mod core;
pub mod ops;
pub mod util;

/// Test utilities for buildtools unit tests.
///
/// This module is only available when compiling with `--cfg test` or
/// running tests. It provides archive fixtures and fake executables.
#[cfg(test)]
pub mod test_support;

pub use builder::{BuildEnv, CMakeConfig, CppBuilder, DocsBuilder};
pub use self::core::platform::Platform;
pub use ops::file_mover::FileMover;
