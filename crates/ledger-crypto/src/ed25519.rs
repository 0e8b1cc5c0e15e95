//! Thin, fixed-length wrappers around `ed25519_dalek`, following the
//! teacher's `ED25519_{PRIVATE_KEY,PUBLIC_KEY,SIGNATURE}_LENGTH` constants
//! and base58 text form.

use std::convert::TryFrom;
use std::fmt;
use std::str::FromStr;

use ed25519_dalek::{Keypair, PublicKey, SecretKey, Signature, Signer, Verifier};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{b58, CryptoMaterialError};

pub const ED25519_PRIVATE_KEY_LENGTH: usize = ed25519_dalek::SECRET_KEY_LENGTH;
pub const ED25519_PUBLIC_KEY_LENGTH: usize = ed25519_dalek::PUBLIC_KEY_LENGTH;
pub const ED25519_SIGNATURE_LENGTH: usize = ed25519_dalek::SIGNATURE_LENGTH;

#[derive(Clone)]
pub struct Ed25519PrivateKey(SecretKey);

#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ed25519PublicKey([u8; ED25519_PUBLIC_KEY_LENGTH]);

#[derive(Clone, PartialEq, Eq)]
pub struct Ed25519Signature([u8; ED25519_SIGNATURE_LENGTH]);

impl Ed25519PrivateKey {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoMaterialError> {
        SecretKey::from_bytes(bytes)
            .map(Ed25519PrivateKey)
            .map_err(|_| CryptoMaterialError::DeserializationError)
    }

    pub fn to_bytes(&self) -> [u8; ED25519_PRIVATE_KEY_LENGTH] {
        self.0.to_bytes()
    }

    pub fn public_key(&self) -> Ed25519PublicKey {
        let public = PublicKey::from(&self.0);
        Ed25519PublicKey(public.to_bytes())
    }

    fn keypair(&self) -> Keypair {
        let public = PublicKey::from(&self.0);
        // SecretKey has no Clone-through-dalek path other than re-parsing bytes.
        let secret = SecretKey::from_bytes(&self.0.to_bytes()).expect("round-trips");
        Keypair { secret, public }
    }

    pub fn sign(&self, message: &[u8]) -> Ed25519Signature {
        let signature = self.keypair().sign(message);
        Ed25519Signature(signature.to_bytes())
    }
}

impl Ed25519PublicKey {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoMaterialError> {
        let arr: [u8; ED25519_PUBLIC_KEY_LENGTH] = bytes
            .try_into()
            .map_err(|_| CryptoMaterialError::WrongLengthError)?;
        PublicKey::from_bytes(&arr).map_err(|_| CryptoMaterialError::ValidationError)?;
        Ok(Ed25519PublicKey(arr))
    }

    pub fn as_bytes(&self) -> &[u8; ED25519_PUBLIC_KEY_LENGTH] {
        &self.0
    }

    pub fn verify(&self, message: &[u8], signature: &Ed25519Signature) -> bool {
        let public = match PublicKey::from_bytes(&self.0) {
            Ok(p) => p,
            Err(_) => return false,
        };
        let sig = match Signature::try_from(signature.0.as_slice()) {
            Ok(s) => s,
            Err(_) => return false,
        };
        public.verify(message, &sig).is_ok()
    }
}

impl Ed25519Signature {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoMaterialError> {
        let arr: [u8; ED25519_SIGNATURE_LENGTH] = bytes
            .try_into()
            .map_err(|_| CryptoMaterialError::WrongLengthError)?;
        Ok(Ed25519Signature(arr))
    }

    pub fn to_bytes(&self) -> [u8; ED25519_SIGNATURE_LENGTH] {
        self.0
    }
}

/// Sign `message` with `sk`. The only signing capability the transaction
/// core requires (spec §6).
pub fn sign(message: &[u8], sk: &Ed25519PrivateKey) -> Ed25519Signature {
    sk.sign(message)
}

/// Verify `sig` over `message` under `pk`.
pub fn verify(message: &[u8], sig: &Ed25519Signature, pk: &Ed25519PublicKey) -> bool {
    pk.verify(message, sig)
}

impl fmt::Debug for Ed25519PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ed25519PublicKey({})", b58::encode(&self.0))
    }
}

impl fmt::Display for Ed25519PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", b58::encode(&self.0))
    }
}

impl FromStr for Ed25519PublicKey {
    type Err = CryptoMaterialError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = b58::decode(s)?;
        Ed25519PublicKey::from_bytes(&bytes)
    }
}

impl fmt::Debug for Ed25519Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ed25519Signature({})", hex::encode(self.0))
    }
}

impl Serialize for Ed25519PublicKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Ed25519PublicKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ed25519PublicKey::from_str(&s).map_err(serde::de::Error::custom)
    }
}
