/// Compliance test suite entry point (see `compliance/mod.rs`).
#[path = "common/mod.rs"]
mod common;

#[path = "compliance/mod.rs"]
mod compliance;
