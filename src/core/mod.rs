//! Core data structures for Anvil.
//!
//! - Settings and the layouts derived from them
//! - Requirements and the recipe manifest
//! - Components exported at packaging time

pub mod component;
pub mod layout;
pub mod manifest;
pub mod requirement;
pub mod settings;

pub use component::Component;
pub use layout::{package_dir, Layout};
pub use manifest::{find_manifest, Manifest, MANIFEST_NAME};
pub use requirement::Requirement;
pub use settings::{RawSettings, Settings, SettingsError, SettingsPolicy};
