use rand::SeedableRng;
use rand::rngs::StdRng;

/// Explicit, injectable seed for the sampler's diversity mode.
///
/// Derived by hashing an entity identifier, so two entities drawing from the
/// same candidate pools under the same budget get different combination
/// sets, while any given entity is fully replayable. Never unseeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleSeed(u64);

impl SampleSeed {
    pub fn new(seed: u64) -> Self {
        Self(seed)
    }

    /// Seed derived from an entity identifier (e.g. an indicator name).
    /// Hash-based, so it does not depend on processing order.
    pub fn for_entity(entity_id: &str) -> Self {
        let hash = blake3::hash(entity_id.as_bytes());
        let bytes: [u8; 8] = hash.as_bytes()[..8]
            .try_into()
            .expect("blake3 output is 32 bytes");
        Self(u64::from_le_bytes(bytes))
    }

    pub fn value(&self) -> u64 {
        self.0
    }

    pub(crate) fn rng(&self) -> StdRng {
        StdRng::seed_from_u64(self.0)
    }
}
