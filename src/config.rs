/// The core's own configuration: a plain struct assembled once by the
/// caller and validated once at startup, never read from the
/// environment or a file directly by the engine itself.
use thiserror::Error;

use crate::method::{Method, VerifyPolicy};
use crate::prng::PrngKind;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("rounds must be >= 1, got {0}")]
    RoundsZero(u32),

    #[error("join_timeout_secs must be >= 1, got {0}")]
    JoinTimeoutZero(u64),

    #[error("no devices selected")]
    NoDevices,
}

/// Immutable, validated configuration for one wipe run, shared by
/// reference across all workers.
#[derive(Debug, Clone)]
pub struct WipeConfig {
    pub method: Method,
    pub prng_kind: PrngKind,
    pub rounds: u32,
    pub verify_policy: VerifyPolicy,
    pub sync_rate: u32,
    pub final_blank: bool,
    pub autonuke: bool,
    pub join_timeout_secs: u64,
}

impl WipeConfig {
    /// Construct and validate a configuration. `method`/`prng_kind`/
    /// `verify_policy` are already constrained to their legal values by
    /// their own types (clap's `ValueEnum` rejects anything else at the
    /// CLI boundary), so only the numeric ranges need checking here.
    pub fn new(
        method: Method,
        prng_kind: PrngKind,
        rounds: u32,
        verify_policy: VerifyPolicy,
        sync_rate: u32,
        final_blank: bool,
        autonuke: bool,
    ) -> Result<Self, ConfigError> {
        Self::with_join_timeout(method, prng_kind, rounds, verify_policy, sync_rate, final_blank, autonuke, 60)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn with_join_timeout(
        method: Method,
        prng_kind: PrngKind,
        rounds: u32,
        verify_policy: VerifyPolicy,
        sync_rate: u32,
        final_blank: bool,
        autonuke: bool,
        join_timeout_secs: u64,
    ) -> Result<Self, ConfigError> {
        if rounds < 1 {
            return Err(ConfigError::RoundsZero(rounds));
        }
        if join_timeout_secs < 1 {
            return Err(ConfigError::JoinTimeoutZero(join_timeout_secs));
        }

        Ok(Self {
            method,
            prng_kind,
            rounds,
            verify_policy,
            sync_rate,
            final_blank,
            autonuke,
            join_timeout_secs,
        })
    }
}
