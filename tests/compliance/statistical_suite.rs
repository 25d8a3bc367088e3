/// Statistical quality tests for the PRNG suite, applying the same
/// family of sanity checks the Entropy Source's own calibration
/// battery uses: bit frequency, monobit runs, and lag-1
/// autocorrelation, each computed over a generous sample drawn from
/// every variant so that a broken PRNG implementation (e.g. a
/// stuck/degenerate stream) is caught here rather than only in a
/// device-level test.
use wipe_engine::prng::Prng;
use wipe_engine::PrngKind;

const SAMPLE_BYTES: usize = 16 * 1024;
const SEED: &[u8] = b"statistical-suite-fixed-seed-32b";

fn sample(kind: PrngKind) -> Vec<u8> {
    let mut prng = kind.create(SEED);
    let mut buf = vec![0u8; SAMPLE_BYTES];
    prng.fill(&mut buf);
    buf
}

fn bit_frequency(data: &[u8]) -> f64 {
    let ones: u64 = data.iter().map(|b| b.count_ones() as u64).sum();
    ones as f64 / (data.len() as f64 * 8.0)
}

/// Number of maximal runs of identical bits across the whole byte stream.
fn monobit_runs(data: &[u8]) -> u64 {
    let mut runs = 1u64;
    let mut prev = data[0] & 1;
    for &byte in data {
        for i in 0..8 {
            let bit = (byte >> i) & 1;
            if bit != prev {
                runs += 1;
                prev = bit;
            }
        }
    }
    runs
}

/// Fraction of adjacent bit pairs (within a byte, byte-to-byte) that agree.
fn lag1_autocorrelation(data: &[u8]) -> f64 {
    let mut agreements = 0u64;
    let mut total = 0u64;
    let mut prev_bit = data[0] & 1;
    for &byte in data {
        for i in 0..8 {
            let bit = (byte >> i) & 1;
            if bit == prev_bit {
                agreements += 1;
            }
            total += 1;
            prev_bit = bit;
        }
    }
    agreements as f64 / total as f64
}

/// Poker test (4-bit nibbles): chi-square statistic should be small for
/// a uniformly distributed stream; a degenerate/constant stream produces
/// a very large statistic because one nibble dominates.
fn poker_chi_square(data: &[u8]) -> f64 {
    let mut counts = [0u64; 16];
    for &byte in data {
        counts[(byte >> 4) as usize] += 1;
        counts[(byte & 0x0F) as usize] += 1;
    }
    let n = (data.len() * 2) as f64;
    let expected = n / 16.0;
    counts.iter().map(|&c| {
        let diff = c as f64 - expected;
        diff * diff / expected
    }).sum()
}

const VARIANTS: [PrngKind; 6] = [
    PrngKind::Twister,
    PrngKind::Isaac,
    PrngKind::Isaac64,
    PrngKind::LaggedFibonacci,
    PrngKind::Xoroshiro256,
    PrngKind::AesCtr,
];

#[test]
fn every_variant_has_roughly_balanced_bit_frequency() {
    for kind in VARIANTS {
        let data = sample(kind);
        let frequency = bit_frequency(&data);
        assert!(
            (0.47..0.53).contains(&frequency),
            "{:?}: bit frequency {:.4} outside balanced range",
            kind,
            frequency
        );
    }
}

#[test]
fn every_variant_produces_plenty_of_bit_transitions() {
    let total_bits = SAMPLE_BYTES as u64 * 8;
    for kind in VARIANTS {
        let data = sample(kind);
        let runs = monobit_runs(&data);
        // A truly degenerate stream (e.g. a stuck-at pattern) would have
        // a vanishingly small run count; genuine randomness keeps runs
        // within a small constant factor of total_bits / 2.
        assert!(
            runs > total_bits / 8,
            "{:?}: only {} runs over {} bits, suspiciously few transitions",
            kind,
            runs,
            total_bits
        );
    }
}

#[test]
fn every_variant_has_low_lag1_autocorrelation() {
    for kind in VARIANTS {
        let data = sample(kind);
        let correlation = lag1_autocorrelation(&data);
        assert!(
            correlation < 0.55,
            "{:?}: lag-1 autocorrelation {:.4} too high",
            kind,
            correlation
        );
    }
}

#[test]
fn every_variant_passes_a_poker_test_at_a_generous_threshold() {
    // 15 degrees of freedom; a wildly generous threshold since this is a
    // smoke test for broken generators, not a rigorous NIST run.
    const THRESHOLD: f64 = 60.0;
    for kind in VARIANTS {
        let data = sample(kind);
        let chi_square = poker_chi_square(&data);
        assert!(
            chi_square < THRESHOLD,
            "{:?}: poker chi-square {:.2} exceeds threshold {}",
            kind,
            chi_square,
            THRESHOLD
        );
    }
}

#[test]
fn a_degenerate_constant_stream_fails_the_poker_test() {
    // Sanity-check the test itself: an all-zero "stream" must fail.
    let data = vec![0u8; SAMPLE_BYTES];
    assert!(poker_chi_square(&data) > 60.0);
}
