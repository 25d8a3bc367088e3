//! A secure block-device wipe engine: methods, passes, PRNGs, and worker
//! supervision (see `DESIGN.md` for how each module maps onto the
//! component table this crate implements).
#![allow(clippy::upper_case_acronyms)]
#![allow(clippy::type_complexity)]

pub mod cancel;
pub mod config;
pub mod device;
pub mod entropy;
pub mod error;
pub mod io;
pub mod method;
pub mod pass;
pub mod pattern;
pub mod prng;
pub mod stats;
pub mod supervisor;
pub mod worker;

pub use cancel::CancellationToken;
pub use config::{ConfigError, WipeConfig};
pub use device::DeviceInput;
pub use error::{WipeError, WipeResult};
pub use method::{Method, VerifyPolicy};
pub use prng::PrngKind;
pub use supervisor::{ExitCode, RunOutcome, Supervisor};
pub use worker::{WorkerConfig, WorkerReport, WorkerResult};
