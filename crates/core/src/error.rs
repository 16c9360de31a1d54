//! Error taxonomy shared by the search and signature modules.
//!
//! An invalid signature is not an error: [`crate::verify`] reports it as
//! `Ok(false)`. The variants here cover inputs the computation cannot even
//! start on.

use thiserror::Error;

/// Errors raised by the proof-of-work search.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PowError {
    /// The seed was empty; no search is attempted.
    #[error("seed must not be empty")]
    EmptySeed,

    /// The difficulty asks for more leading zeros than a digest has characters.
    #[error("difficulty {difficulty} exceeds the digest length of {max} hex characters")]
    DifficultyOutOfRange { difficulty: u32, max: u32 },

    /// The attempt cap (or the nonce space) ran out before a match was found.
    #[error("no solution found after {attempts} attempts")]
    Exhausted { attempts: u64 },
}

/// Errors raised while generating, encoding or loading key material.
#[derive(Error, Debug)]
pub enum KeyError {
    #[error("Failed to generate RSA key pair: {0}")]
    Generation(String),

    #[error("Failed to encode key: {0}")]
    Encode(String),

    #[error("Malformed key material: {0}")]
    Decode(String),
}

/// Errors raised by the cryptographic layer before a validity verdict exists.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SignatureError {
    #[error("Signing failed: {0}")]
    Signing(String),

    #[error("Malformed signature: expected {expected} bytes, got {actual}")]
    MalformedSignature { expected: usize, actual: usize },
}
