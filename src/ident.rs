//! Identifier generation.
//!
//! This file produces collision-resistant identifiers for nodes and
//! endpoints. Identifiers combine a creation timestamp with random
//! entropy so that ids minted in the same millisecond stay distinct.

use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Generator for node and endpoint identifiers.
///
/// Identifiers have the shape `<prefix>-<millis>-<entropy>`, e.g.
/// `node-18c2f4a9e10-3f07b2`. The timestamp keeps ids roughly sortable
/// by creation time; the random suffix guards against collisions.
#[derive(Debug)]
pub struct IdGenerator {
    rng: StdRng,
}

impl IdGenerator {
    /// Create a generator seeded from operating-system entropy.
    pub fn new() -> Self {
        IdGenerator {
            rng: StdRng::from_entropy(),
        }
    }

    /// Create a generator with a fixed seed for reproducible output.
    pub fn with_seed(seed: u64) -> Self {
        IdGenerator {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Generate an identifier with the given prefix.
    pub fn generate(&mut self, prefix: &str) -> String {
        let millis = Utc::now().timestamp_millis();
        let entropy: u32 = self.rng.gen();
        format!("{}-{:x}-{:06x}", prefix, millis, entropy & 0xff_ffff)
    }

    /// Generate a node identifier.
    pub fn node_id(&mut self) -> String {
        self.generate("node")
    }

    /// Generate an endpoint identifier.
    pub fn endpoint_id(&mut self) -> String {
        self.generate("endpoint")
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}
