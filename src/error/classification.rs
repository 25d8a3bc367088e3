/// Recovery-strategy classification for the engine's error kinds.
use std::fmt;

/// How a `WipeError` should be handled once it has occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorClass {
    /// Abort the process (entropy failures) or the worker (device/size
    /// failures, fatal I/O) immediately. No retry.
    Fatal,
    /// Bounded retry with backoff before falling back to `Counted` handling.
    Retriable,
    /// Recorded in a counter; the pass or worker continues regardless.
    Counted,
}

impl ErrorClass {
    pub fn allows_retry(&self) -> bool {
        matches!(self, ErrorClass::Retriable)
    }
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorClass::Fatal => write!(f, "fatal"),
            ErrorClass::Retriable => write!(f, "retriable"),
            ErrorClass::Counted => write!(f, "counted"),
        }
    }
}
