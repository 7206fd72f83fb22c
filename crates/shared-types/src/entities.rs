//! # Core Domain Entities
//!
//! ## Clusters
//!
//! - **Algorithms**: [`Algorithm`], [`KeyingMode`], [`PrimitiveFamily`]
//! - **Requests**: [`KeyParams`], [`HashRequest`]
//! - **Results**: [`Digest`], [`CombinedResult`]
//! - **Storage**: [`FileRecord`]

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::errors::{DigestParseError, UnknownAlgorithm};

/// Required key length for keyed algorithms, in bytes.
pub const KEY_LEN: usize = 32;

// =============================================================================
// CLUSTER A: ALGORITHMS
// =============================================================================

/// Underlying hash primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveFamily {
    /// BLAKE3 (tree hash, native keyed and derive-key modes).
    Blake3,
    /// SHA-256 (FIPS 180-4).
    Sha256,
    /// SHA3-256 (FIPS 202).
    Sha3_256,
}

/// How an algorithm is parameterised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyingMode {
    /// No key, no context.
    Regular,
    /// Requires a 32-byte key.
    Keyed,
    /// Requires a context string.
    DeriveKeyed,
}

/// Every algorithm the harness can run.
///
/// The serialized form is the persisted tag. Tags are stable identifiers:
/// records already in a metadata index reference them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Algorithm {
    /// BLAKE3 hash.
    #[serde(rename = "regular")]
    Regular,
    /// BLAKE3 keyed hash.
    #[serde(rename = "keyed")]
    Keyed,
    /// BLAKE3 derive-key mode.
    #[serde(rename = "derive_keyed")]
    DeriveKeyed,
    /// SHA-256.
    #[serde(rename = "regular_sha256")]
    RegularSha256,
    /// HMAC-SHA-256.
    #[serde(rename = "hmac_sha256")]
    HmacSha256,
    /// SHA3-256.
    #[serde(rename = "regular_sha3")]
    RegularSha3,
    /// HMAC-SHA3-256.
    #[serde(rename = "hmac_sha3")]
    HmacSha3,
    /// HKDF over SHA3-256.
    #[serde(rename = "hkdf_sha3")]
    HkdfSha3,
}

impl Algorithm {
    /// All algorithms, in tag order.
    pub const ALL: [Algorithm; 8] = [
        Algorithm::Regular,
        Algorithm::Keyed,
        Algorithm::DeriveKeyed,
        Algorithm::RegularSha256,
        Algorithm::HmacSha256,
        Algorithm::RegularSha3,
        Algorithm::HmacSha3,
        Algorithm::HkdfSha3,
    ];

    /// Persisted tag.
    pub fn tag(&self) -> &'static str {
        match self {
            Algorithm::Regular => "regular",
            Algorithm::Keyed => "keyed",
            Algorithm::DeriveKeyed => "derive_keyed",
            Algorithm::RegularSha256 => "regular_sha256",
            Algorithm::HmacSha256 => "hmac_sha256",
            Algorithm::RegularSha3 => "regular_sha3",
            Algorithm::HmacSha3 => "hmac_sha3",
            Algorithm::HkdfSha3 => "hkdf_sha3",
        }
    }

    /// Keying mode, which decides what [`KeyParams`] must carry.
    pub fn mode(&self) -> KeyingMode {
        match self {
            Algorithm::Regular | Algorithm::RegularSha256 | Algorithm::RegularSha3 => {
                KeyingMode::Regular
            }
            Algorithm::Keyed | Algorithm::HmacSha256 | Algorithm::HmacSha3 => KeyingMode::Keyed,
            Algorithm::DeriveKeyed | Algorithm::HkdfSha3 => KeyingMode::DeriveKeyed,
        }
    }

    /// Underlying primitive.
    pub fn family(&self) -> PrimitiveFamily {
        match self {
            Algorithm::Regular | Algorithm::Keyed | Algorithm::DeriveKeyed => {
                PrimitiveFamily::Blake3
            }
            Algorithm::RegularSha256 | Algorithm::HmacSha256 => PrimitiveFamily::Sha256,
            Algorithm::RegularSha3 | Algorithm::HmacSha3 | Algorithm::HkdfSha3 => {
                PrimitiveFamily::Sha3_256
            }
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Algorithm {
    type Err = UnknownAlgorithm;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Algorithm::ALL
            .iter()
            .copied()
            .find(|a| a.tag() == s)
            .ok_or_else(|| UnknownAlgorithm(s.to_string()))
    }
}

// =============================================================================
// CLUSTER B: REQUESTS
// =============================================================================

/// Key material accompanying a request.
///
/// Which fields are required depends on [`Algorithm::mode`]; fields the mode
/// does not use are ignored. Validation happens in the primitive adapter.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct KeyParams {
    /// Secret key for keyed and HMAC algorithms.
    pub key: Option<Vec<u8>>,
    /// Context string for derive-key and HKDF algorithms.
    pub context: Option<String>,
    /// Optional HKDF salt.
    pub salt: Option<Vec<u8>>,
}

impl KeyParams {
    /// No key, no context.
    pub fn none() -> Self {
        Self::default()
    }

    /// Key only.
    pub fn with_key(key: impl Into<Vec<u8>>) -> Self {
        Self {
            key: Some(key.into()),
            ..Self::default()
        }
    }

    /// Context only.
    pub fn with_context(context: impl Into<String>) -> Self {
        Self {
            context: Some(context.into()),
            ..Self::default()
        }
    }

    /// Builder-style method to set the HKDF salt.
    pub fn salt(mut self, salt: impl Into<Vec<u8>>) -> Self {
        self.salt = Some(salt.into());
        self
    }
}

impl fmt::Debug for KeyParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyParams")
            .field("key", &self.key.as_ref().map(|k| format!("<{} bytes>", k.len())))
            .field("context", &self.context)
            .field("salt", &self.salt.as_ref().map(hex::encode))
            .finish()
    }
}

/// A payload to hash together with its algorithm and key material.
#[derive(Debug, Clone)]
pub struct HashRequest {
    /// Bytes to hash.
    pub payload: Vec<u8>,
    /// Selected algorithm.
    pub algorithm: Algorithm,
    /// Key, context and salt.
    pub params: KeyParams,
}

impl HashRequest {
    /// Create a request.
    pub fn new(payload: impl Into<Vec<u8>>, algorithm: Algorithm, params: KeyParams) -> Self {
        Self {
            payload: payload.into(),
            algorithm,
            params,
        }
    }
}

// =============================================================================
// CLUSTER C: RESULTS
// =============================================================================

/// Digest (or derived key) bytes. Serialized as lowercase hex.
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct Digest(Vec<u8>);

impl Digest {
    /// Wrap raw bytes.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Parse a hex string.
    pub fn from_hex(s: &str) -> Result<Self, DigestParseError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(DigestParseError::Empty);
        }
        hex::decode(s)
            .map(Self)
            .map_err(|e| DigestParseError::InvalidHex(e.to_string()))
    }

    /// Lowercase hex.
    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }

    /// Raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Consume into raw bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when no bytes.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Length in bits.
    pub fn bit_len(&self) -> usize {
        self.0.len() * 8
    }
}

impl AsRef<[u8]> for Digest {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; 32]> for Digest {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes.to_vec())
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({})", self.to_hex())
    }
}

impl Serialize for Digest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Digest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Digest::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// Outcome of one instrumented combine.
///
/// Created once per request and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinedResult {
    /// Algorithm used.
    pub algorithm: Algorithm,
    /// Combined digest (or concatenated derived key for HKDF).
    pub digest: Digest,
    /// Payload length in bytes.
    pub payload_len: usize,
    /// Number of chunks the payload was split into.
    pub chunk_count: usize,
    /// Wall-clock time of the combine.
    #[serde(rename = "elapsed_secs", with = "duration_secs")]
    pub elapsed: Duration,
    /// Resident-memory change across the combine, in bytes (may be negative).
    pub memory_delta_bytes: i64,
    /// Approximate cycles per byte.
    pub throughput_cpb: f64,
}

/// Serialize a [`Duration`] as fractional seconds.
pub mod duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    /// Serialize as `f64` seconds.
    pub fn serialize<S: Serializer>(d: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(d.as_secs_f64())
    }

    /// Deserialize from `f64` seconds.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// CLUSTER D: STORAGE
// =============================================================================

/// Metadata index entry linking a digest to a stored blob.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    /// Blob name in the byte store.
    pub file_name: String,
    /// Digest computed at upload time.
    #[serde(rename = "hash_value")]
    pub digest: Digest,
    /// Algorithm tag.
    #[serde(rename = "hash_type")]
    pub algorithm: Algorithm,
    /// Chunks per payload the digest was computed with. Checks recompute
    /// with this value, not the current configuration.
    pub fan_out: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tags_are_stable() {
        let tags: Vec<&str> = Algorithm::ALL.iter().map(|a| a.tag()).collect();
        assert_eq!(
            tags,
            vec![
                "regular",
                "keyed",
                "derive_keyed",
                "regular_sha256",
                "hmac_sha256",
                "regular_sha3",
                "hmac_sha3",
                "hkdf_sha3",
            ]
        );
    }

    #[test]
    fn test_serde_tag_matches_tag() {
        for algorithm in Algorithm::ALL {
            let json = serde_json::to_string(&algorithm).unwrap();
            assert_eq!(json, format!("\"{}\"", algorithm.tag()));
            assert_eq!(algorithm.tag().parse::<Algorithm>().unwrap(), algorithm);
        }
    }

    #[test]
    fn test_unknown_tag() {
        assert_eq!(
            "blake2".parse::<Algorithm>(),
            Err(UnknownAlgorithm("blake2".to_string()))
        );
    }

    #[test]
    fn test_modes() {
        assert_eq!(Algorithm::HmacSha3.mode(), KeyingMode::Keyed);
        assert_eq!(Algorithm::HkdfSha3.mode(), KeyingMode::DeriveKeyed);
        assert_eq!(Algorithm::RegularSha256.mode(), KeyingMode::Regular);
        assert_eq!(Algorithm::DeriveKeyed.family(), PrimitiveFamily::Blake3);
    }

    #[test]
    fn test_digest_hex() {
        let digest = Digest::new(vec![0xde, 0xad, 0xbe, 0xef]);
        assert_eq!(digest.to_hex(), "deadbeef");
        assert_eq!(Digest::from_hex("DEADBEEF").unwrap(), digest);
        assert_eq!(digest.bit_len(), 32);
        assert!(Digest::from_hex("abc").is_err());
        assert_eq!(Digest::from_hex(""), Err(DigestParseError::Empty));
    }

    #[test]
    fn test_key_params_debug_redacts_key() {
        let params = KeyParams::with_key(b"whats the Elvish word for friend".to_vec());
        let debug = format!("{:?}", params);
        assert!(debug.contains("<32 bytes>"));
        assert!(!debug.contains("Elvish"));
    }

    #[test]
    fn test_file_record_json_field_names() {
        let record = FileRecord {
            file_name: "a.bin".to_string(),
            digest: Digest::new(vec![1, 2]),
            algorithm: Algorithm::HmacSha256,
            fan_out: 4,
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["hash_value"], "0102");
        assert_eq!(json["hash_type"], "hmac_sha256");
        assert_eq!(json["fan_out"], 4);
    }
}
