pub mod buffer_pool;

pub use buffer_pool::AlignedBuffer;

/// Lower and upper bounds on the pass executor's per-chunk transfer
/// size: a power-of-two multiple of the logical sector size, between
/// 64 KiB and 1 MiB.
pub const MIN_CHUNK_BYTES: usize = 64 * 1024;
pub const MAX_CHUNK_BYTES: usize = 1024 * 1024;

/// Pick the pass executor's chunk size for a device with the given
/// logical sector size: the largest power-of-two multiple of
/// `logical_sector_size` that does not exceed `MAX_CHUNK_BYTES`, clamped
/// up to `MIN_CHUNK_BYTES`.
pub fn choose_chunk_size(logical_sector_size: usize) -> usize {
    let sector = logical_sector_size.max(1);
    let mut size = sector.next_power_of_two().max(MIN_CHUNK_BYTES);
    if size > MAX_CHUNK_BYTES {
        size = MAX_CHUNK_BYTES;
    }
    // MAX_CHUNK_BYTES may not be a multiple of an oversized sector; fall
    // back to the sector size itself rather than violate alignment.
    if size % sector != 0 {
        size = sector;
    }
    size
}
