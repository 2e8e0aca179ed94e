//! # Hashing Utilities
//!
//! BLAKE3 is the only hash used by the ledger. Record digests, world-state
//! leaves and Merkle roots all go through this module so that every replica
//! computes byte-identical fingerprints for the same state.

/// Compute the BLAKE3 hash of the input data.
///
/// # Example
///
/// ```
/// use credledger_protocol::crypto::blake3_hash;
///
/// let hash = blake3_hash(b"credential");
/// assert_eq!(hash.len(), 32);
/// ```
pub fn blake3_hash(data: &[u8]) -> [u8; 32] {
    *blake3::hash(data).as_bytes()
}

/// Hash multiple byte slices together without concatenating them first.
pub fn blake3_hash_multi(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = blake3::Hasher::new();
    for part in parts {
        hasher.update(part);
    }
    *hasher.finalize().as_bytes()
}

/// Compute a binary Merkle root over the given leaves.
///
/// An odd leaf at the end of a level is paired with itself. A single leaf
/// is hashed with itself too, so the root is always the output of a hash
/// operation. An empty input returns all zeros.
pub fn merkle_root(leaves: &[[u8; 32]]) -> [u8; 32] {
    if leaves.is_empty() {
        return [0u8; 32];
    }

    if leaves.len() == 1 {
        return blake3_hash_multi(&[leaves[0].as_slice(), leaves[0].as_slice()]);
    }

    let mut current_level: Vec<[u8; 32]> = leaves.to_vec();
    while current_level.len() > 1 {
        let mut next_level = Vec::with_capacity((current_level.len() + 1) / 2);

        for chunk in current_level.chunks(2) {
            let left = &chunk[0];
            let right = if chunk.len() == 2 { &chunk[1] } else { &chunk[0] };
            next_level.push(blake3_hash_multi(&[left.as_slice(), right.as_slice()]));
        }

        current_level = next_level;
    }

    current_level[0]
}

/// Lowercase hex rendering of a 32-byte digest, for logs and API payloads.
pub fn digest_hex(digest: &[u8; 32]) -> String {
    hex::encode(digest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blake3_deterministic() {
        let a = blake3_hash(b"cred001");
        let b = blake3_hash(b"cred001");
        assert_eq!(a, b);
    }

    #[test]
    fn test_blake3_different_inputs() {
        assert_ne!(blake3_hash(b"cred001"), blake3_hash(b"Cred001"));
    }

    #[test]
    fn test_blake3_hash_multi_matches_concatenation() {
        let multi = blake3_hash_multi(&[b"stu", b"1001"]);
        assert_eq!(multi, blake3_hash(b"stu1001"));
    }

    #[test]
    fn test_merkle_root_empty() {
        assert_eq!(merkle_root(&[]), [0u8; 32]);
    }

    #[test]
    fn test_merkle_root_single_leaf() {
        let leaf = blake3_hash(b"only child");
        let expected = blake3_hash_multi(&[leaf.as_slice(), leaf.as_slice()]);
        assert_eq!(merkle_root(&[leaf]), expected);
    }

    #[test]
    fn test_merkle_root_three_leaves_duplicates_last() {
        let a = blake3_hash(b"a");
        let b = blake3_hash(b"b");
        let c = blake3_hash(b"c");
        let left = blake3_hash_multi(&[a.as_slice(), b.as_slice()]);
        let right = blake3_hash_multi(&[c.as_slice(), c.as_slice()]);
        let expected = blake3_hash_multi(&[left.as_slice(), right.as_slice()]);
        assert_eq!(merkle_root(&[a, b, c]), expected);
    }

    #[test]
    fn test_merkle_root_order_matters() {
        let first = blake3_hash(b"first");
        let second = blake3_hash(b"second");
        assert_ne!(merkle_root(&[first, second]), merkle_root(&[second, first]));
    }

    #[test]
    fn test_digest_hex_is_64_lowercase_chars() {
        let hex = digest_hex(&blake3_hash(b"x"));
        assert_eq!(hex.len(), 64);
        assert!(hex.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }
}
