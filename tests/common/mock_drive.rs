/// Mock drive infrastructure for testing.
///
/// A temp-file-backed stand-in for a block device, pre-filled with a
/// known byte so tests can assert on what a wipe actually changed.
/// Real hardware characteristics (rotational vs. flash, freeze state,
/// temperature) are an external collaborator's concern, not this
/// engine's, so the mock does not model them.
use std::io::{Seek, SeekFrom, Write};
use tempfile::NamedTempFile;
use wipe_engine::DeviceInput;

pub struct MockDrive {
    temp_file: NamedTempFile,
    size_bytes: u64,
}

impl MockDrive {
    /// Create a mock drive of `size_bytes`, pre-filled entirely with
    /// `fill_byte` (end-to-end scenarios typically start every device at
    /// 0xAA).
    pub fn new(size_bytes: u64, fill_byte: u8) -> std::io::Result<Self> {
        let mut temp_file = NamedTempFile::new()?;
        let chunk = vec![fill_byte; 64 * 1024];
        let mut written = 0u64;
        while written < size_bytes {
            let remaining = (size_bytes - written) as usize;
            let slice = &chunk[..remaining.min(chunk.len())];
            temp_file.write_all(slice)?;
            written += slice.len() as u64;
        }
        temp_file.flush()?;
        temp_file.seek(SeekFrom::Start(0))?;
        Ok(Self { temp_file, size_bytes })
    }

    pub fn path(&self) -> &std::path::Path {
        self.temp_file.path()
    }

    pub fn path_str(&self) -> String {
        self.path().to_str().unwrap().to_string()
    }

    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    /// A `DeviceInput` ready to hand to the engine, with the given
    /// logical sector size (default 512 if unsure).
    pub fn device_input(&self, logical_sector_size: u32) -> DeviceInput {
        DeviceInput::new(self.path_str(), self.size_bytes, logical_sector_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_drive_is_filled_with_the_requested_byte() {
        let mock = MockDrive::new(4096, 0xAA).unwrap();
        let contents = std::fs::read(mock.path()).unwrap();
        assert_eq!(contents.len(), 4096);
        assert!(contents.iter().all(|&b| b == 0xAA));
    }

    #[test]
    fn size_not_a_multiple_of_the_chunk_size_is_still_filled_exactly() {
        let mock = MockDrive::new(70_000, 0x00).unwrap();
        let contents = std::fs::read(mock.path()).unwrap();
        assert_eq!(contents.len(), 70_000);
    }
}
