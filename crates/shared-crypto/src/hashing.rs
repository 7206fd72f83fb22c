//! # One-shot Primitives
//!
//! Thin wrappers over the standard implementations. Every function here
//! reproduces the reference output bit-for-bit; nothing is reimplemented.

use hkdf::Hkdf;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use sha3::{Digest as _, Sha3_256};

use crate::errors::CryptoError;

/// 256-bit output.
pub type Hash = [u8; 32];

/// HMAC-SHA-256 type alias.
pub type HmacSha256 = Hmac<Sha256>;

/// HMAC-SHA3-256 type alias.
pub type HmacSha3 = Hmac<Sha3_256>;

/// HKDF output length per input, in bytes.
pub const HKDF_OUTPUT_LEN: usize = 32;

/// Hash data with BLAKE3 (one-shot).
pub fn blake3_hash(data: &[u8]) -> Hash {
    *blake3::hash(data).as_bytes()
}

/// Keyed hash (MAC).
pub fn blake3_keyed_hash(key: &[u8; 32], data: &[u8]) -> Hash {
    *blake3::keyed_hash(key, data).as_bytes()
}

/// BLAKE3 in derive-key mode: `context` selects the output space, `data` is
/// the key material.
pub fn blake3_derive_keyed_hash(context: &str, data: &[u8]) -> Hash {
    let mut hasher = blake3::Hasher::new_derive_key(context);
    hasher.update(data);
    *hasher.finalize().as_bytes()
}

/// Copy a 32-byte digest output into a fixed array.
pub(crate) fn to_hash(bytes: &[u8]) -> Hash {
    let mut output = [0u8; 32];
    output.copy_from_slice(bytes);
    output
}

/// SHA-256 (one-shot).
pub fn sha256(data: &[u8]) -> Hash {
    to_hash(&Sha256::digest(data))
}

/// SHA3-256 (one-shot).
pub fn sha3_256(data: &[u8]) -> Hash {
    to_hash(&Sha3_256::digest(data))
}

/// HMAC-SHA-256.
pub fn hmac_sha256(key: &[u8], data: &[u8]) -> Result<Hash, CryptoError> {
    let mut mac = <HmacSha256 as Mac>::new_from_slice(key)
        .map_err(|e| CryptoError::KeyRejected(e.to_string()))?;
    mac.update(data);
    Ok(to_hash(&mac.finalize().into_bytes()))
}

/// HMAC-SHA3-256.
pub fn hmac_sha3(key: &[u8], data: &[u8]) -> Result<Hash, CryptoError> {
    let mut mac = <HmacSha3 as Mac>::new_from_slice(key)
        .map_err(|e| CryptoError::KeyRejected(e.to_string()))?;
    mac.update(data);
    Ok(to_hash(&mac.finalize().into_bytes()))
}

/// HKDF-SHA3-256 extract-then-expand of `ikm` into 32 bytes.
pub fn hkdf_sha3(ikm: &[u8], salt: Option<&[u8]>, info: &[u8]) -> Result<Hash, CryptoError> {
    let hk = Hkdf::<Sha3_256>::new(salt, ikm);
    let mut okm = [0u8; HKDF_OUTPUT_LEN];
    hk.expand(info, &mut okm)
        .map_err(|e| CryptoError::OutputLength(e.to_string()))?;
    Ok(okm)
}
