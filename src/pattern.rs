/// Pattern Source: unifies constant byte patterns and PRNG streams behind
/// one "fill N bytes" interface.
use crate::prng::Prng;

/// A pattern specification as named by a method's pass table: either a
/// constant byte (or short repeating byte group) or a request for the
/// worker's random stream. `1..=16` mirrors the data model's bound on
/// constant pattern length.
#[derive(Debug, Clone, Copy)]
pub enum PatternSpec {
    Fixed(&'static [u8]),
    Random,
}

impl PatternSpec {
    pub fn is_random(&self) -> bool {
        matches!(self, PatternSpec::Random)
    }
}

/// A cheap-to-construct source of bytes for one pass: either a constant
/// pattern or a borrowed PRNG stream. Random pattern sources borrow the
/// worker's PRNG state rather than owning it, since PRNG state lifetime is
/// tied to the worker.
pub enum PatternSource<'a> {
    Constant(&'a [u8]),
    Random(&'a mut dyn Prng),
}

impl<'a> PatternSource<'a> {
    pub fn constant(bytes: &'a [u8]) -> Self {
        assert!(
            (1..=16).contains(&bytes.len()),
            "constant patterns must be 1..=16 bytes, got {}",
            bytes.len()
        );
        PatternSource::Constant(bytes)
    }

    pub fn random(prng: &'a mut dyn Prng) -> Self {
        PatternSource::Random(prng)
    }

    /// Fill `buf` with exactly `buf.len()` bytes from this source.
    pub fn fill(&mut self, buf: &mut [u8]) {
        match self {
            PatternSource::Constant(pattern) => {
                for (i, byte) in buf.iter_mut().enumerate() {
                    *byte = pattern[i % pattern.len()];
                }
            }
            PatternSource::Random(prng) => prng.fill(buf),
        }
    }
}
