use ed25519_dalek::{ExpandedSecretKey, SecretKey, Verifier};
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// An ed25519 verification key identifying the owner of a transaction output.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct PublicKey([u8; 32]);

impl PublicKey {
    pub fn from_raw(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.0[..]
    }

    /// Checks whether `signature` is a valid signature over `message` by the holder
    /// of this key. Malformed key or signature bytes verify as false rather than
    /// being reported as a separate error.
    pub fn verify(&self, message: &[u8], signature: &Signature) -> bool {
        let public_key = match ed25519_dalek::PublicKey::from_bytes(&self.0) {
            Ok(public_key) => public_key,
            Err(_) => return false,
        };
        match ed25519_dalek::Signature::from_bytes(signature.as_slice()) {
            Ok(signature) => public_key.verify(message, &signature).is_ok(),
            Err(_) => false,
        }
    }
}

impl Display for PublicKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", hex::encode(&self.0))
    }
}

/// An opaque signature produced over a transaction's signing payload.
///
/// Stored as a plain byte sequence: a signature of the wrong length is not a
/// malformed object, it is simply a signature that fails verification.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Signature(Vec<u8>);

impl Signature {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.0[..]
    }
}

/// An ed25519 keypair used to authorize spending of outputs locked to its
/// public key.
pub struct Keypair {
    secret: SecretKey,
    public: ed25519_dalek::PublicKey,
}

impl Keypair {
    /// Generates a new random keypair from the operating system's entropy source.
    pub fn generate() -> Self {
        let mut seed = [0u8; 32];
        OsRng.fill_bytes(&mut seed);
        // A 32-byte seed is always a valid ed25519 secret key.
        let secret = SecretKey::from_bytes(&seed).unwrap();
        let public = ed25519_dalek::PublicKey::from(&secret);
        Self { secret, public }
    }

    pub fn public_key(&self) -> PublicKey {
        PublicKey::from_raw(self.public.to_bytes())
    }

    pub fn sign(&self, message: &[u8]) -> Signature {
        let expanded = ExpandedSecretKey::from(&self.secret);
        let signature = expanded.sign(message, &self.public);
        Signature::new(signature.to_bytes().to_vec())
    }
}
