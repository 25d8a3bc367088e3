/// Common test helper functions: byte-level assertions over a file
/// standing in for a wiped device.
use std::fs;
use std::io::Read;

/// Verify that a file contains only zeros.
pub fn verify_all_zeros(path: &std::path::Path) -> std::io::Result<bool> {
    verify_pattern(path, &[0x00])
}

/// Verify that a file contains a specific repeating pattern.
pub fn verify_pattern(path: &std::path::Path, pattern: &[u8]) -> std::io::Result<bool> {
    let mut file = fs::File::open(path)?;
    let mut buffer = vec![0u8; 64 * 1024];

    let mut absolute = 0usize;
    loop {
        let bytes_read = file.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        for &byte in &buffer[..bytes_read] {
            let expected = pattern[absolute % pattern.len()];
            if byte != expected {
                return Ok(false);
            }
            absolute += 1;
        }
    }
    Ok(true)
}

/// Count bytes in `path` that differ from the expected repeating pattern.
pub fn count_pattern_mismatches(path: &std::path::Path, pattern: &[u8]) -> std::io::Result<u64> {
    let mut file = fs::File::open(path)?;
    let mut buffer = vec![0u8; 64 * 1024];

    let mut absolute = 0usize;
    let mut mismatches = 0u64;
    loop {
        let bytes_read = file.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        for &byte in &buffer[..bytes_read] {
            let expected = pattern[absolute % pattern.len()];
            if byte != expected {
                mismatches += 1;
            }
            absolute += 1;
        }
    }
    Ok(mismatches)
}

/// Shannon entropy (bits per byte, max 8.0) of a file's contents.
pub fn calculate_file_entropy(path: &std::path::Path) -> std::io::Result<f64> {
    let mut file = fs::File::open(path)?;
    let mut buffer = Vec::new();
    file.read_to_end(&mut buffer)?;

    let mut counts = [0u64; 256];
    for &byte in &buffer {
        counts[byte as usize] += 1;
    }

    let length = buffer.len() as f64;
    let mut entropy = 0.0;
    for &count in &counts {
        if count > 0 {
            let probability = count as f64 / length;
            entropy -= probability * probability.log2();
        }
    }
    Ok(entropy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn verify_all_zeros_accepts_a_zeroed_file() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(&vec![0u8; 1024]).unwrap();
        temp.flush().unwrap();
        assert!(verify_all_zeros(temp.path()).unwrap());
    }

    #[test]
    fn verify_pattern_accepts_a_repeating_pattern() {
        let mut temp = NamedTempFile::new().unwrap();
        let pattern = [0xAA, 0xBB];
        let data: Vec<u8> = (0..1024).map(|i| pattern[i % 2]).collect();
        temp.write_all(&data).unwrap();
        temp.flush().unwrap();
        assert!(verify_pattern(temp.path(), &pattern).unwrap());
    }

    #[test]
    fn count_pattern_mismatches_counts_exactly_the_differing_bytes() {
        let mut temp = NamedTempFile::new().unwrap();
        let mut data = vec![0u8; 1024];
        data[10] = 1;
        data[500] = 1;
        temp.write_all(&data).unwrap();
        temp.flush().unwrap();
        assert_eq!(count_pattern_mismatches(temp.path(), &[0x00]).unwrap(), 2);
    }

    #[test]
    fn all_zero_file_has_near_zero_entropy() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(&vec![0u8; 1000]).unwrap();
        temp.flush().unwrap();
        assert!(calculate_file_entropy(temp.path()).unwrap() < 0.1);
    }
}
