//! RSA-PSS signatures over text messages
//!
//! Keys are RSA with a fixed public exponent and modulus size (see
//! [`crate::params`]). Signatures use PSS with SHA-256 as both the message
//! hash and the MGF1 hash, and the largest salt the modulus allows.
//!
//! The salt is random, so signing the same message twice yields different
//! bytes. Every one of them verifies.
//!
//! Key artifacts are PEM: unencrypted PKCS#8 (`PRIVATE KEY`) for the private
//! half and SubjectPublicKeyInfo (`PUBLIC KEY`) for the public half.

use core::fmt;

use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey, LineEnding};
use rsa::pss::{BlindedSigningKey, Signature, VerifyingKey};
use rsa::signature::{RandomizedSigner, SignatureEncoding, Verifier};
use rsa::traits::PublicKeyParts;
use rsa::{BigUint, RsaPrivateKey, RsaPublicKey};
use sha2::Sha256;
use tracing::{debug, info};

use crate::error::{KeyError, SignatureError};
use crate::params::{DIGEST_SIZE, RSA_KEY_BITS, RSA_PUBLIC_EXPONENT};

/// Maximum PSS salt length for a modulus of `modulus_bits` with SHA-256.
///
/// emLen - hLen - 2, where emLen = ceil((modBits - 1) / 8). For a 2048-bit
/// modulus this is 222 bytes.
pub fn max_salt_len(modulus_bits: usize) -> usize {
    let em_len = modulus_bits.saturating_sub(1).div_ceil(8);
    em_len.saturating_sub(DIGEST_SIZE + 2)
}

/// An RSA key pair: the private signing key and its public half
#[derive(Clone)]
pub struct KeyPair {
    private_key: RsaPrivateKey,
    public_key: RsaPublicKey,
}

impl KeyPair {
    /// Generate a fresh key pair from the operating system RNG.
    pub fn generate() -> Result<Self, KeyError> {
        Self::generate_with_rng(&mut OsRng)
    }

    /// Generate a fresh key pair from the given RNG.
    pub fn generate_with_rng<R: CryptoRng + RngCore>(rng: &mut R) -> Result<Self, KeyError> {
        let exponent = BigUint::from(RSA_PUBLIC_EXPONENT);
        let private_key = RsaPrivateKey::new_with_exp(rng, RSA_KEY_BITS, &exponent)
            .map_err(|e| KeyError::Generation(e.to_string()))?;

        info!(bits = RSA_KEY_BITS, "generated RSA key pair");
        Ok(Self::from_private_key(private_key))
    }

    /// Wrap an existing private key, deriving its public half.
    pub fn from_private_key(private_key: RsaPrivateKey) -> Self {
        let public_key = RsaPublicKey::from(&private_key);
        Self {
            private_key,
            public_key,
        }
    }

    /// Load a key pair from an unencrypted PKCS#8 PEM private key.
    pub fn from_private_pem(pem: &str) -> Result<Self, KeyError> {
        private_key_from_pem(pem).map(Self::from_private_key)
    }

    pub fn private_key(&self) -> &RsaPrivateKey {
        &self.private_key
    }

    pub fn public_key(&self) -> &RsaPublicKey {
        &self.public_key
    }

    /// Modulus size in bits
    pub fn modulus_bits(&self) -> usize {
        self.public_key.n().bits()
    }

    /// Private key as unencrypted PKCS#8 PEM
    pub fn private_key_pem(&self) -> Result<String, KeyError> {
        let pem = self
            .private_key
            .to_pkcs8_pem(LineEnding::LF)
            .map_err(|e| KeyError::Encode(e.to_string()))?;
        Ok(pem.to_string())
    }

    /// Public key as SubjectPublicKeyInfo PEM
    pub fn public_key_pem(&self) -> Result<String, KeyError> {
        public_key_to_pem(&self.public_key)
    }

    /// Sign `message` with this pair's private key.
    pub fn sign(&self, message: &str) -> Result<Vec<u8>, SignatureError> {
        sign(&self.private_key, message)
    }

    /// Verify `signature` over `message` with this pair's public key.
    pub fn verify(&self, message: &str, signature: &[u8]) -> Result<bool, SignatureError> {
        verify(&self.public_key, message, signature)
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("modulus_bits", &self.modulus_bits())
            .finish_non_exhaustive()
    }
}

/// Parse an unencrypted PKCS#8 PEM private key.
pub fn private_key_from_pem(pem: &str) -> Result<RsaPrivateKey, KeyError> {
    RsaPrivateKey::from_pkcs8_pem(pem).map_err(|e| KeyError::Decode(e.to_string()))
}

/// Parse a SubjectPublicKeyInfo PEM public key.
pub fn public_key_from_pem(pem: &str) -> Result<RsaPublicKey, KeyError> {
    RsaPublicKey::from_public_key_pem(pem).map_err(|e| KeyError::Decode(e.to_string()))
}

/// Encode a public key as SubjectPublicKeyInfo PEM.
pub fn public_key_to_pem(public_key: &RsaPublicKey) -> Result<String, KeyError> {
    public_key
        .to_public_key_pem(LineEnding::LF)
        .map_err(|e| KeyError::Encode(e.to_string()))
}

/// Sign the UTF-8 bytes of `message` using the operating system RNG for the salt.
///
/// The message is signed as given; in the proof-of-work pipeline that is
/// the hex digest text, which PSS hashes once more internally.
pub fn sign(private_key: &RsaPrivateKey, message: &str) -> Result<Vec<u8>, SignatureError> {
    sign_with_rng(&mut OsRng, private_key, message)
}

/// Sign the UTF-8 bytes of `message`, drawing the salt from `rng`.
pub fn sign_with_rng<R: CryptoRng + RngCore>(
    rng: &mut R,
    private_key: &RsaPrivateKey,
    message: &str,
) -> Result<Vec<u8>, SignatureError> {
    let salt_len = max_salt_len(private_key.n().bits());
    let signing_key = BlindedSigningKey::<Sha256>::new_with_salt_len(private_key.clone(), salt_len);

    let signature = signing_key
        .try_sign_with_rng(rng, message.as_bytes())
        .map_err(|e| SignatureError::Signing(e.to_string()))?;

    debug!(
        message_len = message.len(),
        salt_len, "signed message with RSA-PSS"
    );
    Ok(signature.to_vec())
}

/// Verify `signature` over the UTF-8 bytes of `message`.
///
/// Returns `Ok(false)` for a well-formed signature that does not match;
/// returns an error only when the signature cannot be checked at all
/// (its length differs from the modulus size).
pub fn verify(
    public_key: &RsaPublicKey,
    message: &str,
    signature: &[u8],
) -> Result<bool, SignatureError> {
    let expected = public_key.size();
    if signature.len() != expected {
        return Err(SignatureError::MalformedSignature {
            expected,
            actual: signature.len(),
        });
    }

    let signature =
        Signature::try_from(signature).map_err(|_| SignatureError::MalformedSignature {
            expected,
            actual: signature.len(),
        })?;

    let salt_len = max_salt_len(public_key.n().bits());
    let verifying_key = VerifyingKey::<Sha256>::new_with_salt_len(public_key.clone(), salt_len);

    let valid = verifying_key.verify(message.as_bytes(), &signature).is_ok();
    debug!(valid, "verified RSA-PSS signature");
    Ok(valid)
}
