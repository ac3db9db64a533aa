//! Seedable RNG threaded explicitly through matching and initial guessing.
//!
//! No hidden global RNG: every component that needs randomness takes a
//! `&mut StdRng` so a fixed seed plus identical input and options gives a
//! bitwise-identical partition.

use rand::rngs::StdRng;
use rand::SeedableRng;

/// Build the single RNG instance for a pipeline run.
pub fn seeded(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}
