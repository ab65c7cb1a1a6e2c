//! Anvil - deterministic dependency resolution and CMake build orchestration
//! for C/C++ projects.
//!
//! This crate provides the core library functionality for Anvil: settings
//! normalization, requirement resolution against a package index, build
//! layout planning, descriptor generation and the build/package pipeline.

pub mod core;
pub mod error;
pub mod generator;
pub mod ops;
pub mod pipeline;
pub mod resolver;
pub mod sources;
pub mod util;

/// Fixtures and mocks for unit tests.
#[cfg(test)]
pub mod test_support;

pub use crate::core::{Layout, Manifest, Requirement, Settings};
pub use error::{Error, ErrorKind};
pub use generator::{Descriptor, Generator, GeneratorOptions};
pub use pipeline::{BuildTool, Pipeline, PipelineState};
pub use resolver::{ResolvedGraph, Resolver};
pub use util::context::GlobalContext;
