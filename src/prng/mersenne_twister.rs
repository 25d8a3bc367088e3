use super::{expand_seed, Prng};
use rand_core::{RngCore, SeedableRng};
use sfmt::SFMT;

/// 32-bit SFMT (period 2^19937-1), the variant named `mersenne-twister` in
/// the options table. Seeded analogously to the original `init_by_array`
/// discipline by expanding the worker's seed bytes across the generator's
/// native seed width.
pub struct MersenneTwisterPrng {
    rng: SFMT,
}

impl MersenneTwisterPrng {
    pub fn new(seed: &[u8]) -> Self {
        Self {
            rng: SFMT::from_seed(expand_seed(seed)),
        }
    }
}

impl Prng for MersenneTwisterPrng {
    fn fill(&mut self, buf: &mut [u8]) {
        self.rng.fill_bytes(buf);
    }
}
