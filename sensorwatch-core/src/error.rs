//! Error types for payload normalization.

use thiserror::Error;

/// Why a payload could not be turned into a reading.
///
/// Neither variant is fatal: the message is dropped and logged, no state is
/// mutated, and the next periodic reading supersedes it.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ParseError {
    /// No decoding strategy produced a number from the payload.
    #[error("payload not decodable as a numeric reading")]
    Unrecognized,

    /// A number was decoded but it is NaN or non-finite.
    #[error("decoded value {0} is not finite")]
    Invalid(f64),
}
