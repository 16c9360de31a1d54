//! Policy constants for the proof-of-work search and RSA signatures.
//!
//! These are fixed by design and not exposed as runtime configuration,
//! except for the difficulty which callers choose per search.

/// SHA-256 output size in bytes
pub const DIGEST_SIZE: usize = 32;

/// Length of a digest rendered as lowercase hex
pub const DIGEST_HEX_LEN: usize = DIGEST_SIZE * 2;

/// Largest meaningful difficulty (every hex character of the digest is '0')
pub const MAX_DIFFICULTY: u32 = DIGEST_HEX_LEN as u32;

/// Difficulty used when the caller does not pick one
pub const DEFAULT_DIFFICULTY: u32 = 4;

/// RSA modulus size in bits
pub const RSA_KEY_BITS: usize = 2048;

/// RSA public exponent (F4)
pub const RSA_PUBLIC_EXPONENT: u64 = 65_537;

/// Signature size in bytes for an [`RSA_KEY_BITS`] modulus
pub const SIGNATURE_SIZE: usize = RSA_KEY_BITS / 8;

/// Conventional file name of the PKCS#8 private key artifact
pub const PRIVATE_KEY_FILE: &str = "private.pem";

/// Conventional file name of the SubjectPublicKeyInfo public key artifact
pub const PUBLIC_KEY_FILE: &str = "public.pem";
