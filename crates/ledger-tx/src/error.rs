use ledger_conditions::ConditionError;
use thiserror::Error;

/// The error vocabulary spec.md §7 names, plus `VersionMismatch` — the
/// concrete resolution of Open Question (a) in spec.md §9 (version
/// equality is required exactly, not negotiated).
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum TxError {
    #[error("`operation` must be one of CREATE, TRANSFER, GENESIS")]
    InvalidOperation,
    #[error("invalid asset payload: {0}")]
    InvalidAsset(String),
    #[error("invalid owner spec: {0}")]
    InvalidOwnerSpec(String),
    #[error("invalid amount: {0}")]
    AmountError(String),
    #[error("could not parse transaction: {0}")]
    ParseError(String),
    #[error("signature did not verify")]
    InvalidSignature,
    #[error("public key {0} is not paired with any supplied private key")]
    KeypairMismatch(String),
    #[error("all inputs must reference the same asset id")]
    AssetIdMismatch,
    #[error("transaction id does not match the hash of its canonical body")]
    InvalidHash,
    #[error("unsupported transaction version: {0}")]
    VersionMismatch(String),
}

impl From<ConditionError> for TxError {
    fn from(e: ConditionError) -> Self {
        TxError::ParseError(e.to_string())
    }
}
