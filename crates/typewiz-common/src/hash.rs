//! Content hashing.
//!
//! Every probe carries the hash of the file text it was instrumented from, and
//! the applier refuses to touch a file whose current text hashes differently.

use sha2::{Digest, Sha256};

/// Lowercase hex SHA-256 of the UTF-8 text.
#[must_use]
pub fn content_hash(text: &str) -> String {
    hex::encode(Sha256::digest(text.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_stable_hex() {
        let hash = content_hash("function f(a) {}");
        assert_eq!(hash.len(), 64);
        assert!(hash.bytes().all(|b| b.is_ascii_hexdigit()));
        assert_eq!(hash, content_hash("function f(a) {}"));
    }

    #[test]
    fn hash_changes_with_content() {
        assert_ne!(content_hash("let a = 1;"), content_hash("let a = 2;"));
        assert_eq!(
            content_hash(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}
