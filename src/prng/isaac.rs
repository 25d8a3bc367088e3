use super::{expand_seed, Prng};
use rand_core::{RngCore, SeedableRng};
use rand_isaac::IsaacRng;

/// Standard 32-bit ISAAC, seeded from the worker's seed bytes.
pub struct IsaacPrng {
    rng: IsaacRng,
}

impl IsaacPrng {
    pub fn new(seed: &[u8]) -> Self {
        Self {
            rng: IsaacRng::from_seed(expand_seed(seed)),
        }
    }
}

impl Prng for IsaacPrng {
    fn fill(&mut self, buf: &mut [u8]) {
        self.rng.fill_bytes(buf);
    }
}
