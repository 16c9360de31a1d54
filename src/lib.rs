//! powsig
//!
//! Proof-of-work digests signed with RSA-PSS.
//!
//! # Overview
//!
//! A nickname is turned into a costly-to-forge digest by searching for the
//! first `nickname + nonce` whose SHA-256 hex starts with a run of zeros.
//! That digest can then be signed with an RSA key and verified by anyone
//! holding the public key.
//!
//! The algorithms live in [`powsig_core`] (re-exported as [`primitives`]); this
//! crate adds key files on disk and a JSON configuration.
//!
//! # Example
//!
//! ```rust,no_run
//! use powsig::keys::KeyStore;
//! use powsig::{search, sign, verify, KeyPair};
//!
//! let store = KeyStore::new("./keys");
//! store.save(&KeyPair::generate()?, false)?;
//!
//! let proof = search("user123", 4)?;
//! let signature = sign(&store.load_private_key()?, &proof.digest)?;
//! assert!(verify(&store.load_public_key()?, &proof.digest, &signature)?);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

// Re-export the core algorithms
pub use powsig_core as primitives;

pub mod config;
pub mod keys;

// Convenience re-exports
pub use primitives::{search, sign, verify, KeyPair, Miner, PowResult};
