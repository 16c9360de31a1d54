//! # powsig core
//!
//! Two independent primitives that chain naturally:
//!
//! - **Proof-of-work search**: find the first `seed + nonce` whose SHA-256
//!   hex digest starts with `difficulty` zero characters.
//! - **RSA-PSS signatures**: 2048-bit keys, SHA-256, maximal salt. Sign a
//!   message (typically the proof-of-work digest) and verify it later.
//!
//! All operations are stateless functions of their inputs. Key material is
//! passed in explicitly; nothing is cached between calls.
//!
//! ## Example
//!
//! ```rust
//! use powsig_core::{digest, search};
//!
//! let proof = search("user123", 2).unwrap();
//! assert!(proof.digest.starts_with("00"));
//! assert_eq!(proof.candidate, format!("user123{}", proof.nonce));
//! assert_eq!(digest(&proof.candidate), proof.digest);
//! ```
//!
//! Signing the digest:
//!
//! ```rust,no_run
//! use powsig_core::{KeyPair, search, sign, verify};
//!
//! let proof = search("user123", 4).unwrap();
//! let keys = KeyPair::generate().unwrap();
//!
//! let signature = sign(keys.private_key(), &proof.digest).unwrap();
//! assert!(verify(keys.public_key(), &proof.digest, &signature).unwrap());
//! ```

mod error;
mod params;
mod pow;
mod signature;

pub use error::{KeyError, PowError, SignatureError};
pub use params::*;
pub use pow::{
    DEFAULT_PROGRESS_INTERVAL, Miner, PowResult, Progress, candidate, digest,
    digest_meets_difficulty, hash_candidate, leading_zero_nibbles, meets_difficulty, search,
    verify_nonce,
};
pub use signature::{
    KeyPair, max_salt_len, private_key_from_pem, public_key_from_pem, public_key_to_pem, sign,
    sign_with_rng, verify,
};

// Key types appear in the public signatures above
pub use rsa::{RsaPrivateKey, RsaPublicKey};

#[cfg(test)]
mod tests;
