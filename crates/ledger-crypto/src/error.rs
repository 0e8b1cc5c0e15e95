use thiserror::Error;

/// Mirrors the teacher's `aptos_crypto::traits::CryptoMaterialError`: the
/// small set of ways a byte blob can fail to become a key or signature.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum CryptoMaterialError {
    #[error("wrong number of bytes")]
    WrongLengthError,
    #[error("could not deserialize crypto material")]
    DeserializationError,
    #[error("crypto material did not pass validation")]
    ValidationError,
    #[error("signature did not verify")]
    SignatureError,
}
