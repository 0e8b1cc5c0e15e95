//! `Input` (spec §3, §4.4): spends an `Output` by presenting a fulfillment,
//! optionally naming the output it fulfills.

use ledger_conditions::ConditionNode;
use ledger_crypto::Ed25519PublicKey;
use serde_json::{Map, Value};

use crate::error::TxError;
use crate::link::TransactionLink;
use crate::output::{Output, OwnerSpec};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Input {
    owners_before: Vec<Ed25519PublicKey>,
    fulfillment: ConditionNode,
    fulfills: TransactionLink,
}

impl Input {
    pub fn new(
        fulfillment: ConditionNode,
        owners_before: Vec<Ed25519PublicKey>,
        fulfills: TransactionLink,
    ) -> Result<Self, TxError> {
        if owners_before.is_empty() {
            return Err(TxError::InvalidOwnerSpec(
                "`owners_before` must be non-empty".into(),
            ));
        }
        Ok(Self {
            owners_before,
            fulfillment,
            fulfills,
        })
    }

    pub fn owners_before(&self) -> &[Ed25519PublicKey] {
        &self.owners_before
    }

    pub fn fulfillment(&self) -> &ConditionNode {
        &self.fulfillment
    }

    pub fn fulfillment_mut(&mut self) -> &mut ConditionNode {
        &mut self.fulfillment
    }

    pub fn fulfills(&self) -> &TransactionLink {
        &self.fulfills
    }

    /// Produces an unsigned Input whose fulfillment is the condition node
    /// that `Output::generate(public_keys, _)` would build — the amount is
    /// irrelevant, only the condition shape is kept (spec §4.4).
    pub fn generate(public_keys: Vec<Ed25519PublicKey>) -> Result<Self, TxError> {
        let owners_before = public_keys.clone();
        let owner_spec: Vec<OwnerSpec> = public_keys.into_iter().map(OwnerSpec::from).collect();
        let output = Output::generate(owner_spec, 1)?;
        Self::new(output.condition().clone(), owners_before, TransactionLink::empty())
    }

    /// The unsigned form stores the fulfillment as its detail map; the
    /// signed form stores it as its URI (spec §3).
    pub fn to_value(&self) -> Result<Value, TxError> {
        let fulfillment = if is_fully_signed(&self.fulfillment) {
            Value::String(self.fulfillment.fulfillment_uri()?)
        } else {
            Value::Object(ledger_conditions::to_detail_map(&self.fulfillment))
        };
        let mut map = Map::new();
        map.insert(
            "owners_before".into(),
            Value::Array(
                self.owners_before
                    .iter()
                    .map(|pk| Value::String(pk.to_string()))
                    .collect(),
            ),
        );
        map.insert("fulfillment".into(), fulfillment);
        map.insert(
            "fulfills".into(),
            self.fulfills
                .to_map()
                .map(Value::Object)
                .unwrap_or(Value::Null),
        );
        Ok(Value::Object(map))
    }

    pub fn from_value(value: &Value) -> Result<Self, TxError> {
        let map = value
            .as_object()
            .ok_or_else(|| TxError::ParseError("input must be an object".into()))?;
        let owners_before = map
            .get("owners_before")
            .and_then(Value::as_array)
            .ok_or_else(|| TxError::ParseError("input missing `owners_before`".into()))?
            .iter()
            .map(|v| {
                v.as_str()
                    .ok_or_else(|| TxError::ParseError("owner not a string".into()))
                    .and_then(|s| {
                        s.parse::<Ed25519PublicKey>()
                            .map_err(|_| TxError::ParseError(format!("invalid public key: {s}")))
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let fulfillment_value = map
            .get("fulfillment")
            .ok_or_else(|| TxError::ParseError("input missing `fulfillment`".into()))?;
        let fulfillment = match fulfillment_value {
            Value::String(uri) => ledger_conditions::parse_fulfillment_uri(uri)?,
            Value::Object(details) => ledger_conditions::from_detail_map(details)?,
            Value::Null => {
                return Err(TxError::ParseError(
                    "`fulfillment` cannot be null".into(),
                ))
            }
            _ => {
                return Err(TxError::ParseError(
                    "`fulfillment` must be a uri string or detail map".into(),
                ))
            }
        };

        let fulfills = TransactionLink::from_value(map.get("fulfills").unwrap_or(&Value::Null))?;

        Self::new(fulfillment, owners_before, fulfills)
    }
}

fn is_fully_signed(node: &ConditionNode) -> bool {
    match node {
        ConditionNode::Ed25519 { signature, .. } => signature.is_some(),
        ConditionNode::Threshold { .. } => node.fulfillment_uri().is_ok(),
        ConditionNode::HashLock { .. } => false,
    }
}
