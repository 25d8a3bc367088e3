/// Error kinds, classification, and retry policy for the wipe engine.
///
/// `WipeError` enumerates exactly the error kinds the component design
/// distinguishes; `ErrorClass` says how each one is handled (abort, retry,
/// or count-and-continue). Everything outside the engine — report
/// rendering, operator-facing messages — builds on top of these.
pub mod classification;
pub mod retry;

pub use classification::ErrorClass;
pub use retry::ExponentialBackoff;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum WipeError {
    #[error("entropy source unavailable: {0}")]
    EntropyUnavailable(String),

    #[error("entropy calibration sample failed sanity tests: {0}")]
    EntropyInsufficient(String),

    #[error("failed to open device {path}: {source}")]
    DeviceOpenFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{path} is not a block device")]
    NotABlockDevice { path: String },

    #[error("could not determine size of {path}")]
    SizeUnknown { path: String },

    #[error("transient I/O error at offset {offset}: {source}")]
    TransientIOError {
        offset: u64,
        #[source]
        source: std::io::Error,
    },

    #[error("fatal I/O error at offset {offset}: {source}")]
    FatalIOError {
        offset: u64,
        #[source]
        source: std::io::Error,
    },

    #[error("verify mismatch: {mismatched_bytes} byte(s) differed starting at offset {offset}")]
    VerifyMismatch { offset: u64, mismatched_bytes: u64 },

    #[error("datasync failed at offset {offset}: {source}")]
    SyncError {
        offset: u64,
        #[source]
        source: std::io::Error,
    },

    #[error("operation cancelled")]
    Cancelled,
}

// std::io::Error is not Clone, so this is written by hand rather than derived.
impl Clone for WipeError {
    fn clone(&self) -> Self {
        match self {
            WipeError::EntropyUnavailable(s) => WipeError::EntropyUnavailable(s.clone()),
            WipeError::EntropyInsufficient(s) => WipeError::EntropyInsufficient(s.clone()),
            WipeError::DeviceOpenFailed { path, source } => WipeError::DeviceOpenFailed {
                path: path.clone(),
                source: std::io::Error::new(source.kind(), source.to_string()),
            },
            WipeError::NotABlockDevice { path } => WipeError::NotABlockDevice { path: path.clone() },
            WipeError::SizeUnknown { path } => WipeError::SizeUnknown { path: path.clone() },
            WipeError::TransientIOError { offset, source } => WipeError::TransientIOError {
                offset: *offset,
                source: std::io::Error::new(source.kind(), source.to_string()),
            },
            WipeError::FatalIOError { offset, source } => WipeError::FatalIOError {
                offset: *offset,
                source: std::io::Error::new(source.kind(), source.to_string()),
            },
            WipeError::VerifyMismatch { offset, mismatched_bytes } => WipeError::VerifyMismatch {
                offset: *offset,
                mismatched_bytes: *mismatched_bytes,
            },
            WipeError::SyncError { offset, source } => WipeError::SyncError {
                offset: *offset,
                source: std::io::Error::new(source.kind(), source.to_string()),
            },
            WipeError::Cancelled => WipeError::Cancelled,
        }
    }
}

impl WipeError {
    pub fn class(&self) -> ErrorClass {
        match self {
            WipeError::EntropyUnavailable(_)
            | WipeError::EntropyInsufficient(_)
            | WipeError::NotABlockDevice { .. }
            | WipeError::SizeUnknown { .. }
            | WipeError::FatalIOError { .. } => ErrorClass::Fatal,

            WipeError::DeviceOpenFailed { .. } | WipeError::TransientIOError { .. } => {
                ErrorClass::Retriable
            }

            WipeError::VerifyMismatch { .. } | WipeError::SyncError { .. } => ErrorClass::Counted,

            // Cancellation is a clean termination path, not a failure, but it
            // still needs a class to fit the same dispatch; treat it as
            // terminal like Fatal so callers never retry past it.
            WipeError::Cancelled => ErrorClass::Fatal,
        }
    }
}

pub type WipeResult<T> = Result<T, WipeError>;
