//! Handicap computation over glider cards, their types and the configuration.

/// Weight differences and the coefficient.
pub mod handicap;
/// Verdicts and their display wording.
pub mod status;
