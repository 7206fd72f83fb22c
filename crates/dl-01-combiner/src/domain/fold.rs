//! Ordered recombination of chunk digests.

use shared_crypto::{CryptoError, FoldStrategy, Primitive};
use shared_types::Digest;

/// Feed `chunk_digests`, in the order given, into a fresh instance of
/// `primitive` and finalize.
///
/// For hashes and MACs this is a hash of the concatenated chunk digests
/// under the same key or context. For HKDF the derived segments are
/// concatenated as is.
pub fn fold(primitive: &Primitive, chunk_digests: &[Digest]) -> Result<Digest, CryptoError> {
    let mut hasher = primitive.hasher()?;
    for digest in chunk_digests {
        hasher.update(digest.as_bytes());
    }
    let combined = hasher.finalize();

    tracing::trace!(
        algorithm = %primitive.algorithm(),
        chunks = chunk_digests.len(),
        concatenated = primitive.fold_strategy() == FoldStrategy::Concatenate,
        "Folded chunk digests"
    );
    Ok(combined)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::{Algorithm, KeyParams};

    #[test]
    fn test_fold_is_hash_of_concatenation() {
        let primitive = Primitive::new(Algorithm::RegularSha256, &KeyParams::none()).unwrap();
        let a = primitive.compute(b"left").unwrap();
        let b = primitive.compute(b"right").unwrap();

        let expected = shared_crypto::sha256(&[a.as_bytes(), b.as_bytes()].concat());
        assert_eq!(fold(&primitive, &[a, b]).unwrap().as_bytes(), &expected);
    }

    #[test]
    fn test_fold_order_matters() {
        let primitive = Primitive::new(Algorithm::Regular, &KeyParams::none()).unwrap();
        let a = primitive.compute(b"a").unwrap();
        let b = primitive.compute(b"b").unwrap();

        assert_ne!(
            fold(&primitive, &[a.clone(), b.clone()]).unwrap(),
            fold(&primitive, &[b, a]).unwrap()
        );
    }

    #[test]
    fn test_hkdf_segments_concatenate() {
        let primitive =
            Primitive::new(Algorithm::HkdfSha3, &KeyParams::with_context("files")).unwrap();
        let a = primitive.compute(b"one").unwrap();
        let b = primitive.compute(b"two").unwrap();

        let folded = fold(&primitive, &[a.clone(), b.clone()]).unwrap();
        assert_eq!(folded.as_bytes(), [a.as_bytes(), b.as_bytes()].concat().as_slice());
    }
}
