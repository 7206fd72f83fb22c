//! Incremental candidate generation.

use serde::{Deserialize, Serialize, Serializer};

/// One candidate input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    /// Bit length this candidate was generated at.
    pub bit_len: u64,
    /// Minimal big-endian encoding of the value, `ceil(bit_len / 8)` bytes.
    #[serde(serialize_with = "as_hex", deserialize_with = "from_hex")]
    pub bytes: Vec<u8>,
}

impl Candidate {
    pub fn to_hex(&self) -> String {
        hex::encode(&self.bytes)
    }
}

fn as_hex<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&hex::encode(bytes))
}

fn from_hex<'de, D: serde::Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
    let s = String::deserialize(deserializer)?;
    hex::decode(s).map_err(serde::de::Error::custom)
}

/// Infinite candidate iterator.
///
/// The state is a big-endian counter of `ceil(bit_len / 8)` bytes. Cloning
/// the stream snapshots its position, so a search can be stopped and
/// resumed, or capped externally with `take`.
///
/// No `(bit_len, value)` pair is emitted twice. Byte encodings do repeat
/// across bit lengths that share a byte width (value 3 at `L = 2` and at
/// `L = 3` are both `[0x03]`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateStream {
    bit_len: u64,
    counter: Vec<u8>,
}

impl CandidateStream {
    /// Start at bit length 1, value 0.
    pub fn new() -> Self {
        Self::starting_at(1)
    }

    /// Start at value 0 of `bit_len` (at least 1).
    pub fn starting_at(bit_len: u64) -> Self {
        let bit_len = bit_len.max(1);
        Self {
            bit_len,
            counter: vec![0u8; byte_width(bit_len)],
        }
    }

    /// Bit length of the next candidate.
    pub fn bit_len(&self) -> u64 {
        self.bit_len
    }

    /// Bytes of the next candidate.
    pub fn peek(&self) -> &[u8] {
        &self.counter
    }

    /// Advance the counter; on overflow past `bit_len` bits move to the next
    /// bit length.
    fn advance(&mut self) {
        let mut carry = true;
        for byte in self.counter.iter_mut().rev() {
            let (next, overflow) = byte.overflowing_add(1);
            *byte = next;
            if !overflow {
                carry = false;
                break;
            }
        }

        let top_bits = (self.bit_len % 8) as u32;
        let overflowed = carry || (top_bits != 0 && self.counter[0] >> top_bits != 0);

        if overflowed {
            self.bit_len += 1;
            self.counter = vec![0u8; byte_width(self.bit_len)];
        }
    }
}

impl Default for CandidateStream {
    fn default() -> Self {
        Self::new()
    }
}

impl Iterator for CandidateStream {
    type Item = Candidate;

    fn next(&mut self) -> Option<Candidate> {
        let candidate = Candidate {
            bit_len: self.bit_len,
            bytes: self.counter.clone(),
        };
        self.advance();
        Some(candidate)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (usize::MAX, None)
    }
}

fn byte_width(bit_len: u64) -> usize {
    bit_len.div_ceil(8) as usize
}
