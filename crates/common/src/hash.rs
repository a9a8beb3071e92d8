//! SHA-256 helpers

use sha2::{Digest, Sha256};

/// Compute the lowercase hex SHA-256 digest of a string
pub fn calc_sha256(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}
