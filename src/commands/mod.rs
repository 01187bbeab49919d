//! Command implementations for the injector CLI

pub mod completions;
pub mod inject;
pub mod version;
