use serde::{Deserialize, Serialize};
use sha2::Digest;
use std::fmt::{Display, Formatter};

const SHA256_BYTE_COUNT: usize = 32;

/// Sha-256 is a 256-bit array or 32 bytes.
/// It provides an API to display as hex-encoded string and parse it from a hex-encoded string.
#[derive(Copy, Clone, Debug, Hash, Ord, PartialOrd, Eq, PartialEq, Serialize, Deserialize)]
pub struct Sha256([u8; SHA256_BYTE_COUNT]);

impl Sha256 {
    pub const fn from_raw(raw_bytes: [u8; SHA256_BYTE_COUNT]) -> Self {
        Self(raw_bytes)
    }

    pub fn digest(data: &[u8]) -> Self {
        let mut hasher = sha2::Sha256::new();
        hasher.update(data);
        let result = hasher.finalize();
        assert_eq!(result.len(), SHA256_BYTE_COUNT);
        let mut output = [0; SHA256_BYTE_COUNT];
        output.copy_from_slice(result.as_slice());
        Sha256::from_raw(output)
    }

    /// A double SHA-256 hash, i.e. the digest of the digest.
    pub fn double_digest(data: &[u8]) -> Self {
        let first = Self::digest(data);
        Self::digest(first.as_slice())
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.0[..]
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.as_slice())
    }

    pub fn from_hex(s: &str) -> Result<Self, String> {
        let bytes = hex::decode(s).map_err(|e| e.to_string())?;
        if bytes.len() != SHA256_BYTE_COUNT {
            return Err(format!(
                "Invalid SHA-256 length. Expected: {} but got: {} in: {}",
                SHA256_BYTE_COUNT,
                bytes.len(),
                s
            ));
        }
        let mut sha = [0; SHA256_BYTE_COUNT];
        sha.copy_from_slice(&bytes);
        Ok(Sha256::from_raw(sha))
    }
}

impl Display for Sha256 {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}
