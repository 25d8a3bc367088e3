use super::{expand_seed, Prng};
use rand_core::{RngCore, SeedableRng};
use rand_isaac::Isaac64Rng;

/// Standard 64-bit ISAAC, seeded from the worker's seed bytes.
pub struct Isaac64Prng {
    rng: Isaac64Rng,
}

impl Isaac64Prng {
    pub fn new(seed: &[u8]) -> Self {
        Self {
            rng: Isaac64Rng::from_seed(expand_seed(seed)),
        }
    }
}

impl Prng for Isaac64Prng {
    fn fill(&mut self, buf: &mut [u8]) {
        self.rng.fill_bytes(buf);
    }
}
