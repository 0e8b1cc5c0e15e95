use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ConditionError {
    #[error("threshold must satisfy 1 <= k <= number of subconditions")]
    InvalidThreshold,
    #[error("could not parse condition/fulfillment: {0}")]
    ParseError(String),
    #[error("unknown condition/fulfillment type")]
    UnknownConditionType,
    #[error("operation only valid on an Ed25519 leaf")]
    NotALeaf,
    #[error("leaf has no signature to serialize into a fulfillment")]
    MissingSignature,
}
