//! Hashing utilities

use sha2::{Digest, Sha256};

/// SHA-256 hex digest of a reference flag.
///
/// The platform stores only the hash; reviewer screens get a computed
/// "flag matches" hint, never the reference flag itself.
pub fn hash_flag(flag: &str) -> String {
    let digest = Sha256::digest(flag.trim().as_bytes());
    hex::encode(digest)
}

/// Compare a submitted flag against a stored hash
pub fn flag_matches(submitted: &str, stored_hash: &str) -> bool {
    hash_flag(submitted) == stored_hash
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_stable_and_trimmed() {
        let h1 = hash_flag("flag{something}");
        let h2 = hash_flag("  flag{something}  ");
        assert_eq!(h1, h2);
        assert_eq!(h1.len(), 64);
    }

    #[test]
    fn test_flag_matches() {
        let hash = hash_flag("flag{correct}");
        assert!(flag_matches("flag{correct}", &hash));
        assert!(!flag_matches("flag{wrong}", &hash));
    }
}
