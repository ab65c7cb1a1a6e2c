//! High-level operations.
//!
//! This module contains the implementation of Anvil commands. Each operation
//! takes its inputs explicitly and returns the crate-wide [`Error`].
//!
//! [`Error`]: crate::Error

pub mod anvil_build;
pub mod anvil_generate;
pub mod anvil_resolve;
pub mod settings;

pub use anvil_build::{build, BuildOptions, BuildOutcome};
pub use anvil_generate::generate;
pub use anvil_resolve::resolve;
pub use settings::effective_settings;
