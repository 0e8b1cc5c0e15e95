use std::fmt;
use std::str::FromStr;

use tiny_keccak::{Hasher, Sha3};

use crate::CryptoMaterialError;

/// A SHA3-256 digest. Lower-hex `Display`/`FromStr`, matching the `id` field
/// of the canonical transaction envelope (spec §6).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HashValue([u8; HashValue::LENGTH]);

impl HashValue {
    pub const LENGTH: usize = 32;

    pub const fn new(bytes: [u8; Self::LENGTH]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; Self::LENGTH] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn from_hex(s: &str) -> Result<Self, CryptoMaterialError> {
        let bytes = hex::decode(s).map_err(|_| CryptoMaterialError::DeserializationError)?;
        let arr: [u8; Self::LENGTH] = bytes
            .try_into()
            .map_err(|_| CryptoMaterialError::WrongLengthError)?;
        Ok(Self(arr))
    }
}

impl fmt::Debug for HashValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HashValue({})", self.to_hex())
    }
}

impl fmt::Display for HashValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl FromStr for HashValue {
    type Err = CryptoMaterialError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

/// SHA3-256 over an arbitrary byte string. The only hash primitive the
/// transaction core requires (spec §6).
pub fn sha3_256(bytes: &[u8]) -> HashValue {
    let mut hasher = Sha3::v256();
    let mut output = [0u8; HashValue::LENGTH];
    hasher.update(bytes);
    hasher.finalize(&mut output);
    HashValue(output)
}
