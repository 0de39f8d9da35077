//! Build orchestration for native code and documentation.

pub mod cmake;
pub mod docs;
pub mod native;

pub use cmake::{BuildEnv, CMakeConfig, CMakeFlags};
pub use docs::DocsBuilder;
pub use native::CppBuilder;
