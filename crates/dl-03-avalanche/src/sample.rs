//! Samples, reports and bit helpers.

use serde::{Deserialize, Serialize};
use shared_types::Algorithm;

/// Effect of flipping one input bit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AvalancheSample {
    /// Flipped bit, most significant bit of byte 0 first.
    pub bit_index: usize,
    /// Output bits that differ from the original digest.
    pub hamming_distance: u32,
    /// `100 * hamming_distance / digest_bits`, in `[0, 100]`.
    pub effect_percent: f64,
}

impl AvalancheSample {
    pub fn new(bit_index: usize, hamming_distance: u32, digest_bits: usize) -> Self {
        let effect_percent = if digest_bits == 0 {
            0.0
        } else {
            100.0 * f64::from(hamming_distance) / digest_bits as f64
        };
        Self {
            bit_index,
            hamming_distance,
            effect_percent,
        }
    }
}

/// All samples of one run plus their aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvalancheReport {
    pub algorithm: Algorithm,
    pub input_bits: usize,
    pub digest_bits: usize,
    /// Arithmetic mean of `effect_percent`; `None` for an empty input.
    pub mean_effect_percent: Option<f64>,
    pub samples: Vec<AvalancheSample>,
}

impl AvalancheReport {
    pub fn new(algorithm: Algorithm, digest_bits: usize, samples: Vec<AvalancheSample>) -> Self {
        let mean_effect_percent = if samples.is_empty() {
            None
        } else {
            Some(samples.iter().map(|s| s.effect_percent).sum::<f64>() / samples.len() as f64)
        };

        Self {
            algorithm,
            input_bits: samples.len(),
            digest_bits,
            mean_effect_percent,
            samples,
        }
    }

    /// Samples with the lowest and highest effect.
    pub fn extremes(&self) -> Option<(&AvalancheSample, &AvalancheSample)> {
        let min = self
            .samples
            .iter()
            .min_by(|a, b| a.effect_percent.total_cmp(&b.effect_percent))?;
        let max = self
            .samples
            .iter()
            .max_by(|a, b| a.effect_percent.total_cmp(&b.effect_percent))?;
        Some((min, max))
    }
}

/// Copy of `input` with bit `bit_index` inverted (MSB-first numbering).
///
/// `bit_index` must be below `8 * input.len()`.
pub fn flip_bit(input: &[u8], bit_index: usize) -> Vec<u8> {
    let mut flipped = input.to_vec();
    flipped[bit_index / 8] ^= 0x80 >> (bit_index % 8);
    flipped
}

/// Number of differing bits. Bytes past the shorter input count as fully
/// different.
pub fn hamming_distance(a: &[u8], b: &[u8]) -> u32 {
    let common: u32 = a.iter().zip(b).map(|(x, y)| (x ^ y).count_ones()).sum();
    let tail = a.len().abs_diff(b.len()) as u32 * 8;
    common + tail
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flip_bit_is_msb_first() {
        assert_eq!(flip_bit(&[0x00, 0x00], 0), vec![0x80, 0x00]);
        assert_eq!(flip_bit(&[0x00, 0x00], 7), vec![0x01, 0x00]);
        assert_eq!(flip_bit(&[0x00, 0x01], 15), vec![0x00, 0x00]);
    }

    #[test]
    fn test_hamming_distance() {
        assert_eq!(hamming_distance(&[0xFF], &[0x00]), 8);
        assert_eq!(hamming_distance(&[0b1010], &[0b0110]), 2);
        assert_eq!(hamming_distance(&[1, 2], &[1, 2]), 0);
        assert_eq!(hamming_distance(&[1], &[1, 0]), 8);
    }

    #[test]
    fn test_effect_percent() {
        assert_eq!(AvalancheSample::new(3, 128, 256).effect_percent, 50.0);
        assert_eq!(AvalancheSample::new(0, 0, 0).effect_percent, 0.0);
    }

    #[test]
    fn test_report_mean_and_extremes() {
        let report = AvalancheReport::new(
            Algorithm::Regular,
            256,
            vec![
                AvalancheSample::new(0, 64, 256),
                AvalancheSample::new(1, 192, 256),
            ],
        );
        assert_eq!(report.mean_effect_percent, Some(50.0));
        assert_eq!(report.input_bits, 2);

        let (min, max) = report.extremes().unwrap();
        assert_eq!(min.bit_index, 0);
        assert_eq!(max.bit_index, 1);
    }

    #[test]
    fn test_empty_report_has_no_mean() {
        let report = AvalancheReport::new(Algorithm::Regular, 256, Vec::new());
        assert_eq!(report.mean_effect_percent, None);
        assert!(report.extremes().is_none());

        let json = serde_json::to_value(&report).unwrap();
        assert!(json["mean_effect_percent"].is_null());
        assert_eq!(json["samples"], serde_json::json!([]));
    }

    #[test]
    fn test_report_json_shape() {
        let report = AvalancheReport::new(
            Algorithm::HmacSha3,
            256,
            vec![AvalancheSample::new(0, 128, 256), AvalancheSample::new(1, 64, 256)],
        );
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["algorithm"], "hmac_sha3");
        assert_eq!(json["input_bits"], 2);
        assert_eq!(json["digest_bits"], 256);
        assert_eq!(json["mean_effect_percent"], 37.5);
        assert_eq!(
            json["samples"][1],
            serde_json::json!({"bit_index": 1, "hamming_distance": 64, "effect_percent": 25.0})
        );

        let parsed: AvalancheReport = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, report);
    }
}
