// This crate is grounded in the aptos-crypto crate the workspace was
// forked from: fixed-length key/signature wrappers over ed25519-dalek,
// plus a content-addressing hash type.

pub mod ed25519;
pub mod error;
pub mod hash;

pub use ed25519::{Ed25519PrivateKey, Ed25519PublicKey, Ed25519Signature};
pub use error::CryptoMaterialError;
pub use hash::{sha3_256, HashValue};

/// Base58 encode/decode, the public-key and fulfillment text encoding used
/// throughout the ledger's wire format.
pub mod b58 {
    use crate::CryptoMaterialError;

    pub fn encode(bytes: &[u8]) -> String {
        bs58::encode(bytes).into_string()
    }

    pub fn decode(s: &str) -> Result<Vec<u8>, CryptoMaterialError> {
        bs58::decode(s)
            .into_vec()
            .map_err(|_| CryptoMaterialError::DeserializationError)
    }
}
