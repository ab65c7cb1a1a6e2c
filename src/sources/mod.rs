//! Package index collaborators.
//!
//! The resolver only ever asks an index one question: given a package name
//! and a constraint, which version should be used and what does it require.
//! Answers must be deterministic for a given `(name, constraint)`.

pub mod directory;
pub mod index;
pub mod memory;

pub use directory::DirectoryIndex;
pub use index::{IndexEntry, IndexError, PackageIndex, PackageInfo};
pub use memory::MemoryIndex;
