//! Command implementations

pub mod completions;
pub mod cpp;
pub mod docs;
pub mod mv;
