/// A pluggable content-hash function producing lowercase hex digests.
pub trait ChecksumAlgorithm: Send + Sync {
    /// Short identifier of the algorithm (e.g. `"blake3-128"`).
    fn name(&self) -> &str;

    /// Hash raw bytes to a lowercase hex string.
    fn hash_hex(&self, data: &[u8]) -> String;
}

/// Default algorithm: BLAKE3 truncated to 128 bits (32 hex characters).
#[derive(Clone, Copy, Debug, Default)]
pub struct Blake3_128;

impl ChecksumAlgorithm for Blake3_128 {
    fn name(&self) -> &str {
        "blake3-128"
    }

    fn hash_hex(&self, data: &[u8]) -> String {
        let digest = blake3::hash(data);
        hex::encode(&digest.as_bytes()[..16])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_is_deterministic() {
        let a = Blake3_128.hash_hex(b"content");
        let b = Blake3_128.hash_hex(b"content");
        assert_eq!(a, b);
    }

    #[test]
    fn digest_is_128_bits_of_hex() {
        let digest = Blake3_128.hash_hex(b"x");
        assert_eq!(digest.len(), 32);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(digest, digest.to_lowercase());
    }

    #[test]
    fn different_content_differs() {
        assert_ne!(Blake3_128.hash_hex(b"a"), Blake3_128.hash_hex(b"b"));
    }
}
