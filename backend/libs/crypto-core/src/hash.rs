use rand::{rngs::OsRng, RngCore};
use sha2::{Digest, Sha256};

/// Compute SHA256 hash of input bytes
pub fn sha256(input: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(input);
    hasher.finalize().into()
}

/// Lowercase hex SHA256 digest, used to store one-time codes at rest.
pub fn sha256_hex(input: &str) -> String {
    hex::encode(sha256(input.as_bytes()))
}

/// Random 32-byte code, hex encoded (64 chars).
pub fn generate_code() -> String {
    let mut bytes = [0u8; 32];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}
