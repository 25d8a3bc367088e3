use super::Prng;
use aes::Aes256;
use cipher::{KeyIvInit, StreamCipher};
use ctr::Ctr128LE;
use sha2::{Digest, Sha256};

type Aes256Ctr = Ctr128LE<Aes256>;

/// AES-256 in counter mode, used purely as a keystream generator (no
/// plaintext is ever combined with it). The worker's seed is hashed with
/// SHA-256 to derive the 256-bit key; the counter starts at zero and
/// increments little-endian over the 128-bit block, per the platform's
/// validated AES primitive rather than the source's several hand-rolled
/// drafts (raw AES with a manual counter, EVP-based CTR, AES-NI
/// intrinsics, `RAND_bytes`-only) — one contract, one implementation.
pub struct AesCtrPrng {
    cipher: Aes256Ctr,
}

impl AesCtrPrng {
    pub fn new(seed: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(seed);
        let key = hasher.finalize();
        let iv = [0u8; 16];
        Self {
            cipher: Aes256Ctr::new(&key, &iv.into()),
        }
    }
}

impl Prng for AesCtrPrng {
    fn fill(&mut self, buf: &mut [u8]) {
        buf.iter_mut().for_each(|b| *b = 0);
        self.cipher.apply_keystream(buf);
    }
}
