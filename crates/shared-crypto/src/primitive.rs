//! # Primitive Adapter
//!
//! One interface over every algorithm in [`Algorithm`]. A [`Primitive`] is
//! validated once at construction and then only read, so a single instance
//! can be shared by any number of worker threads.
//!
//! Two ways to drive it:
//!
//! - [`Primitive::compute`]: one-shot digest of a byte slice.
//! - [`Primitive::hasher`]: a fresh incremental [`PrimitiveHasher`] of the same
//!   algorithm, key and context, used to fold chunk digests.

use hmac::Mac;
use shared_types::{Algorithm, Digest, KeyParams, KeyingMode, KEY_LEN};
use zeroize::Zeroizing;

use crate::errors::CryptoError;
use crate::hashing::{self, HmacSha256, HmacSha3};

/// How per-chunk outputs are recombined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FoldStrategy {
    /// Feed chunk digests through one more instance of the primitive.
    Rehash,
    /// Concatenate per-chunk derived keys (HKDF).
    Concatenate,
}

#[derive(Clone)]
enum Keying {
    Unkeyed,
    Key(Zeroizing<[u8; KEY_LEN]>),
    Context(String),
    Hkdf {
        context: String,
        salt: Option<Zeroizing<Vec<u8>>>,
    },
}

/// A validated algorithm instance.
#[derive(Clone)]
pub struct Primitive {
    algorithm: Algorithm,
    keying: Keying,
}

impl Primitive {
    /// Validate `params` against the algorithm's keying mode.
    ///
    /// # Errors
    ///
    /// - `InvalidKeyLength` for a keyed algorithm whose key is absent or not
    ///   exactly 32 bytes.
    /// - `MissingContext` for a derive-keyed algorithm without a context.
    pub fn new(algorithm: Algorithm, params: &KeyParams) -> Result<Self, CryptoError> {
        let keying = match algorithm.mode() {
            KeyingMode::Regular => Keying::Unkeyed,
            KeyingMode::Keyed => {
                let key = params.key.as_deref().unwrap_or_default();
                if key.len() != KEY_LEN {
                    return Err(CryptoError::InvalidKeyLength {
                        algorithm,
                        expected: KEY_LEN,
                        actual: key.len(),
                    });
                }
                let mut fixed = Zeroizing::new([0u8; KEY_LEN]);
                fixed.copy_from_slice(key);
                Keying::Key(fixed)
            }
            KeyingMode::DeriveKeyed => {
                let context = params
                    .context
                    .clone()
                    .ok_or(CryptoError::MissingContext(algorithm))?;
                if algorithm == Algorithm::HkdfSha3 {
                    Keying::Hkdf {
                        context,
                        salt: params.salt.clone().map(Zeroizing::new),
                    }
                } else {
                    Keying::Context(context)
                }
            }
        };

        Ok(Self { algorithm, keying })
    }

    /// Algorithm this instance runs.
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Output length of one [`compute`](Self::compute) call, in bytes.
    pub fn output_len(&self) -> usize {
        32
    }

    /// How chunk outputs of this algorithm are recombined.
    pub fn fold_strategy(&self) -> FoldStrategy {
        match self.algorithm {
            Algorithm::HkdfSha3 => FoldStrategy::Concatenate,
            _ => FoldStrategy::Rehash,
        }
    }

    /// One-shot digest of `data`.
    pub fn compute(&self, data: &[u8]) -> Result<Digest, CryptoError> {
        let hash = match (&self.algorithm, &self.keying) {
            (Algorithm::Regular, _) => hashing::blake3_hash(data),
            (Algorithm::Keyed, Keying::Key(key)) => hashing::blake3_keyed_hash(key, data),
            (Algorithm::DeriveKeyed, Keying::Context(context)) => {
                hashing::blake3_derive_keyed_hash(context, data)
            }
            (Algorithm::RegularSha256, _) => hashing::sha256(data),
            (Algorithm::HmacSha256, Keying::Key(key)) => hashing::hmac_sha256(&key[..], data)?,
            (Algorithm::RegularSha3, _) => hashing::sha3_256(data),
            (Algorithm::HmacSha3, Keying::Key(key)) => hashing::hmac_sha3(&key[..], data)?,
            (Algorithm::HkdfSha3, Keying::Hkdf { context, salt }) => {
                hashing::hkdf_sha3(data, salt.as_ref().map(|s| s.as_slice()), context.as_bytes())?
            }
            _ => return Err(self.keying_mismatch()),
        };
        Ok(Digest::from(hash))
    }

    /// Fresh incremental hasher with this instance's algorithm, key and
    /// context. For HKDF the hasher concatenates its inputs.
    pub fn hasher(&self) -> Result<PrimitiveHasher, CryptoError> {
        let hasher = match (&self.algorithm, &self.keying) {
            (Algorithm::Regular, _) => PrimitiveHasher::Blake3(Box::new(blake3::Hasher::new())),
            (Algorithm::Keyed, Keying::Key(key)) => {
                PrimitiveHasher::Blake3(Box::new(blake3::Hasher::new_keyed(key)))
            }
            (Algorithm::DeriveKeyed, Keying::Context(context)) => {
                PrimitiveHasher::Blake3(Box::new(blake3::Hasher::new_derive_key(context)))
            }
            (Algorithm::RegularSha256, _) => PrimitiveHasher::Sha256(sha2::Sha256::default()),
            (Algorithm::HmacSha256, Keying::Key(key)) => PrimitiveHasher::HmacSha256(
                <HmacSha256 as Mac>::new_from_slice(&key[..])
                    .map_err(|e| CryptoError::KeyRejected(e.to_string()))?,
            ),
            (Algorithm::RegularSha3, _) => PrimitiveHasher::Sha3(sha3::Sha3_256::default()),
            (Algorithm::HmacSha3, Keying::Key(key)) => PrimitiveHasher::HmacSha3(
                <HmacSha3 as Mac>::new_from_slice(&key[..])
                    .map_err(|e| CryptoError::KeyRejected(e.to_string()))?,
            ),
            (Algorithm::HkdfSha3, Keying::Hkdf { .. }) => PrimitiveHasher::Concat(Vec::new()),
            _ => return Err(self.keying_mismatch()),
        };
        Ok(hasher)
    }

    // Unreachable through `new`, which pairs every algorithm with its keying.
    fn keying_mismatch(&self) -> CryptoError {
        match self.algorithm.mode() {
            KeyingMode::DeriveKeyed => CryptoError::MissingContext(self.algorithm),
            _ => CryptoError::InvalidKeyLength {
                algorithm: self.algorithm,
                expected: KEY_LEN,
                actual: 0,
            },
        }
    }
}

impl std::fmt::Debug for Primitive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Primitive")
            .field("algorithm", &self.algorithm)
            .finish_non_exhaustive()
    }
}

/// Anything that maps bytes to a fixed-length digest.
///
/// The analysis loops are written against this rather than [`Primitive`] so
/// tests can drive them with deliberately weak digests.
pub trait Digester: Send + Sync {
    /// Digest of `data`.
    fn digest(&self, data: &[u8]) -> Result<Digest, CryptoError>;

    /// Output length in bytes.
    fn output_len(&self) -> usize;
}

impl Digester for Primitive {
    fn digest(&self, data: &[u8]) -> Result<Digest, CryptoError> {
        self.compute(data)
    }

    fn output_len(&self) -> usize {
        Primitive::output_len(self)
    }
}

/// Incremental state for one algorithm instance.
pub enum PrimitiveHasher {
    /// BLAKE3 in any of its three modes.
    Blake3(Box<blake3::Hasher>),
    /// SHA-256.
    Sha256(sha2::Sha256),
    /// SHA3-256.
    Sha3(sha3::Sha3_256),
    /// HMAC-SHA-256.
    HmacSha256(HmacSha256),
    /// HMAC-SHA3-256.
    HmacSha3(HmacSha3),
    /// Concatenation of inputs (HKDF segments).
    Concat(Vec<u8>),
}

impl PrimitiveHasher {
    /// Absorb `data`.
    pub fn update(&mut self, data: &[u8]) -> &mut Self {
        match self {
            PrimitiveHasher::Blake3(h) => {
                h.update(data);
            }
            PrimitiveHasher::Sha256(h) => sha2::Digest::update(h, data),
            PrimitiveHasher::Sha3(h) => sha3::Digest::update(h, data),
            PrimitiveHasher::HmacSha256(h) => h.update(data),
            PrimitiveHasher::HmacSha3(h) => h.update(data),
            PrimitiveHasher::Concat(buf) => buf.extend_from_slice(data),
        }
        self
    }

    /// Consume and return the digest.
    pub fn finalize(self) -> Digest {
        match self {
            PrimitiveHasher::Blake3(h) => Digest::from(*h.finalize().as_bytes()),
            PrimitiveHasher::Sha256(h) => Digest::new(sha2::Digest::finalize(h).to_vec()),
            PrimitiveHasher::Sha3(h) => Digest::new(sha3::Digest::finalize(h).to_vec()),
            PrimitiveHasher::HmacSha256(h) => Digest::new(h.finalize().into_bytes().to_vec()),
            PrimitiveHasher::HmacSha3(h) => Digest::new(h.finalize().into_bytes().to_vec()),
            PrimitiveHasher::Concat(buf) => Digest::new(buf),
        }
    }
}
