/// Device Context data model: the subset of fields the core receives
/// from the out-of-scope enumeration layer. PRNG state, counters,
/// timestamps, and wipe status are runtime state the worker owns and
/// are modelled by `worker::WorkerReport` and `stats::WorkerProgress`
/// instead of living on this struct, since this one crosses the
/// boundary into the core and the others never leave it.
#[derive(Debug, Clone)]
pub struct DeviceInput {
    pub device_path: String,
    pub size_bytes: u64,
    pub logical_sector_size: u32,
    pub physical_block_size: u32,
    pub serial_no: Option<String>,
    pub is_usb: bool,
}

impl DeviceInput {
    pub fn new(device_path: impl Into<String>, size_bytes: u64, logical_sector_size: u32) -> Self {
        Self {
            device_path: device_path.into(),
            size_bytes,
            physical_block_size: logical_sector_size,
            logical_sector_size,
            serial_no: None,
            is_usb: false,
        }
    }
}
