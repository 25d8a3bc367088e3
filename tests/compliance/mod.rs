/// Compliance-style test suite: validates the engine's built-in method
/// expansions against their published pass sequences, and the
/// statistical quality of the PRNG suite's output.
///
/// Certificate rendering and sanitisation-confidence scoring are report
/// rendering, an external collaborator's concern, and are not tested
/// here.
pub mod method_sequences;
pub mod statistical_suite;
