/// Entropy Source: a validated read of the OS CSPRNG.
///
/// Calibration follows the four sanity tests the original C implementation
/// ran against a single 64-bit sample before trusting `/dev/urandom`:
/// Shannon entropy, bit-frequency, monobit runs, and lag-1 autocorrelation.
use crate::error::WipeError;
use std::fs::File;
use std::io::Read;

const CALIBRATION_SAMPLE_BITS: u32 = 64;

pub struct EntropySource {
    file: File,
}

impl EntropySource {
    /// Open `/dev/urandom`, draw a calibration sample, and validate it.
    /// Fails with `EntropyUnavailable` if the device cannot be opened,
    /// `EntropyInsufficient` if the sample fails any of the four tests.
    pub fn open() -> Result<Self, WipeError> {
        let mut file = File::open("/dev/urandom")
            .map_err(|e| WipeError::EntropyUnavailable(e.to_string()))?;

        let mut sample = [0u8; 8];
        read_exact_retrying(&mut file, &mut sample)
            .map_err(|e| WipeError::EntropyUnavailable(e.to_string()))?;
        let sample = u64::from_ne_bytes(sample);

        calibrate(sample)?;

        Ok(Self { file })
    }

    /// Read `n` bytes, retrying on short reads until filled or the
    /// underlying source fails.
    pub fn read(&mut self, n: usize) -> Result<Vec<u8>, WipeError> {
        let mut buf = vec![0u8; n];
        read_exact_retrying(&mut self.file, &mut buf)
            .map_err(|e| WipeError::EntropyUnavailable(e.to_string()))?;
        Ok(buf)
    }
}

fn read_exact_retrying(file: &mut File, buf: &mut [u8]) -> std::io::Result<()> {
    let mut filled = 0;
    while filled < buf.len() {
        match file.read(&mut buf[filled..]) {
            Ok(0) => {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::UnexpectedEof,
                    "entropy source closed before filling request",
                ))
            }
            Ok(n) => filled += n,
            Err(ref e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(())
}

fn calibrate(sample: u64) -> Result<(), WipeError> {
    let entropy = shannon_entropy(sample);
    let frequency = bit_frequency(sample);
    let runs = monobit_runs(sample);
    let correlation = lag1_autocorrelation(sample);

    let ok = entropy > 0.9
        && frequency > 0.3
        && frequency < 0.7
        && runs > 10
        && runs < 54
        && correlation < 0.7;

    if ok {
        Ok(())
    } else {
        Err(WipeError::EntropyInsufficient(format!(
            "entropy={entropy:.3} frequency={frequency:.3} runs={runs} correlation={correlation:.3}"
        )))
    }
}

/// Shannon entropy of the bit population of `sample`, normalised to [0, 1].
fn shannon_entropy(sample: u64) -> f64 {
    let ones = sample.count_ones() as f64;
    let zeros = (CALIBRATION_SAMPLE_BITS as f64) - ones;
    let n = CALIBRATION_SAMPLE_BITS as f64;

    let mut h = 0.0;
    for count in [ones, zeros] {
        if count > 0.0 {
            let p = count / n;
            h -= p * p.log2();
        }
    }
    h // max entropy for a binary alphabet is 1.0
}

/// Fraction of set bits.
fn bit_frequency(sample: u64) -> f64 {
    sample.count_ones() as f64 / CALIBRATION_SAMPLE_BITS as f64
}

/// Number of maximal runs of identical bits.
fn monobit_runs(sample: u64) -> u32 {
    let mut runs = 1u32;
    let mut prev = sample & 1;
    for i in 1..CALIBRATION_SAMPLE_BITS {
        let bit = (sample >> i) & 1;
        if bit != prev {
            runs += 1;
            prev = bit;
        }
    }
    runs
}

/// Lag-1 autocorrelation: fraction of adjacent bit pairs that agree.
fn lag1_autocorrelation(sample: u64) -> f64 {
    let mut agreements = 0u32;
    for i in 0..(CALIBRATION_SAMPLE_BITS - 1) {
        let a = (sample >> i) & 1;
        let b = (sample >> (i + 1)) & 1;
        if a == b {
            agreements += 1;
        }
    }
    agreements as f64 / (CALIBRATION_SAMPLE_BITS - 1) as f64
}
