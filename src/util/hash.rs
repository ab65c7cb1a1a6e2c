//! Hashing for settings ids and descriptor fingerprints.

use sha2::{Digest, Sha256};

/// Incremental fingerprint over a sequence of labelled components.
///
/// Components are NUL-separated so that `("ab", "c")` and `("a", "bc")`
/// never collide.
#[derive(Default)]
pub struct Fingerprint {
    hasher: Sha256,
}

impl Fingerprint {
    pub fn new() -> Self {
        Fingerprint {
            hasher: Sha256::new(),
        }
    }

    /// Add a string component.
    pub fn update_str(&mut self, s: &str) -> &mut Self {
        self.update_bytes(s.as_bytes())
    }

    /// Add a raw byte component.
    pub fn update_bytes(&mut self, bytes: &[u8]) -> &mut Self {
        self.hasher.update((bytes.len() as u64).to_le_bytes());
        self.hasher.update(bytes);
        self.hasher.update(b"\0");
        self
    }

    /// Add a `key=value` pair.
    pub fn update_kv(&mut self, key: &str, value: &str) -> &mut Self {
        self.update_str(key).update_str(value)
    }

    /// Finalize as a hex string.
    pub fn finish(self) -> String {
        hex::encode(self.hasher.finalize())
    }

    /// Finalize and keep the first 16 hex characters.
    pub fn finish_short(self) -> String {
        self.finish()[..16].to_string()
    }
}
