//! `Output` (spec §3, §4.3): locks an amount under a condition, carrying the
//! declared owner public keys.

use ledger_conditions::ConditionNode;
use ledger_crypto::Ed25519PublicKey;
use serde_json::{Map, Value};

use crate::error::TxError;

pub const MAX_AMOUNT: u64 = 9_000_000_000_000_000_000;

/// A leaf of the nested owner specification `Output::generate` takes:
/// either a bare public key, a pre-built condition (for callers who already
/// have one), or a sublist that becomes its own N-of-N threshold subtree
/// (spec §4.3).
#[derive(Clone, Debug)]
pub enum OwnerSpec {
    Key(Ed25519PublicKey),
    Condition(ConditionNode),
    List(Vec<OwnerSpec>),
}

impl From<Ed25519PublicKey> for OwnerSpec {
    fn from(pk: Ed25519PublicKey) -> Self {
        OwnerSpec::Key(pk)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Output {
    amount: u64,
    public_keys: Option<Vec<Ed25519PublicKey>>,
    condition: ConditionNode,
}

impl Output {
    pub fn new(
        condition: ConditionNode,
        public_keys: Option<Vec<Ed25519PublicKey>>,
        amount: u64,
    ) -> Result<Self, TxError> {
        validate_amount(amount)?;
        match (&public_keys, &condition) {
            (None, ConditionNode::HashLock { .. }) => {}
            (None, _) => {
                return Err(TxError::InvalidOwnerSpec(
                    "`public_keys` is null only for the hashlock condition".into(),
                ))
            }
            (Some(keys), _) if keys.is_empty() => {
                return Err(TxError::InvalidOwnerSpec(
                    "`public_keys` must be non-empty when present".into(),
                ))
            }
            _ => {}
        }
        Ok(Self {
            amount,
            public_keys,
            condition,
        })
    }

    pub fn amount(&self) -> u64 {
        self.amount
    }

    pub fn public_keys(&self) -> Option<&[Ed25519PublicKey]> {
        self.public_keys.as_deref()
    }

    pub fn condition(&self) -> &ConditionNode {
        &self.condition
    }

    pub fn condition_uri(&self) -> String {
        self.condition.condition_uri()
    }

    /// Build the condition node implied by a (possibly nested) owner spec,
    /// matching the original `Output.generate`/`_gen_condition` rule: a flat
    /// list of N items is an N-of-N threshold (a bare leaf when N = 1 and
    /// the sole item is not itself a sublist); sublists of length <= 1 are
    /// rejected. The top-level list is never itself subject to that length
    /// restriction — a lone item that is a sublist still yields a 1-of-1
    /// threshold wrapping it, matching the original's `threshold =
    /// len(public_keys)` at the outermost call.
    pub fn generate(owners: Vec<OwnerSpec>, amount: u64) -> Result<Self, TxError> {
        if owners.is_empty() {
            return Err(TxError::InvalidOwnerSpec(
                "owner spec needs to contain at least one owner".into(),
            ));
        }
        let public_keys = flatten_public_keys(&owners);
        let condition = if owners.len() == 1 && !matches!(owners[0], OwnerSpec::List(_)) {
            to_condition_node(owners.into_iter().next().unwrap())?
        } else {
            let threshold = owners.len() as u32;
            let subconditions = owners
                .into_iter()
                .map(to_condition_node)
                .collect::<Result<Vec<_>, _>>()?;
            ConditionNode::threshold(threshold, subconditions)?
        };
        Self::new(condition, Some(public_keys), amount)
    }

    pub fn to_detail_map(&self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert(
            "public_keys".into(),
            match &self.public_keys {
                Some(keys) => Value::Array(
                    keys.iter()
                        .map(|k| Value::String(k.to_string()))
                        .collect(),
                ),
                None => Value::Null,
            },
        );
        map.insert("amount".into(), Value::String(self.amount.to_string()));
        let mut condition = Map::new();
        condition.insert(
            "uri".into(),
            Value::String(self.condition.condition_uri()),
        );
        // Hashlock conditions are identified solely by their URI; every
        // other condition also carries its detail map (spec §4.3).
        if !matches!(self.condition, ConditionNode::HashLock { .. }) {
            condition.insert(
                "details".into(),
                Value::Object(ledger_conditions::to_detail_map(&self.condition)),
            );
        }
        map.insert("condition".into(), Value::Object(condition));
        map
    }

    pub fn from_detail_map(map: &Map<String, Value>) -> Result<Self, TxError> {
        let amount_str = map
            .get("amount")
            .and_then(Value::as_str)
            .ok_or_else(|| TxError::AmountError("`amount` must be a decimal string".into()))?;
        let amount: u64 = amount_str
            .parse()
            .map_err(|_| TxError::AmountError(format!("invalid amount: {amount_str}")))?;

        let condition_obj = map
            .get("condition")
            .and_then(Value::as_object)
            .ok_or_else(|| TxError::ParseError("output missing `condition`".into()))?;
        let uri = condition_obj
            .get("uri")
            .and_then(Value::as_str)
            .ok_or_else(|| TxError::ParseError("condition missing `uri`".into()))?
            .to_string();

        let condition = match condition_obj.get("details").and_then(Value::as_object) {
            Some(details) => {
                let node = ledger_conditions::from_detail_map(details)?;
                if node.condition_uri() != uri {
                    return Err(TxError::ParseError(
                        "condition uri does not match its detail map".into(),
                    ));
                }
                node
            }
            None => ConditionNode::HashLock { condition_uri: uri },
        };

        let public_keys = match map.get("public_keys") {
            Some(Value::Null) | None => None,
            Some(Value::Array(items)) => Some(
                items
                    .iter()
                    .map(|v| {
                        v.as_str()
                            .ok_or_else(|| {
                                TxError::ParseError("`public_keys` item not a string".into())
                            })
                            .and_then(|s| {
                                s.parse::<Ed25519PublicKey>().map_err(|_| {
                                    TxError::ParseError(format!("invalid public key: {s}"))
                                })
                            })
                    })
                    .collect::<Result<Vec<_>, _>>()?,
            ),
            Some(_) => {
                return Err(TxError::ParseError(
                    "`public_keys` must be a list or null".into(),
                ))
            }
        };

        Self::new(condition, public_keys, amount)
    }
}

fn validate_amount(amount: u64) -> Result<(), TxError> {
    if amount < 1 {
        return Err(TxError::AmountError("`amount` must be greater than 0".into()));
    }
    if amount > MAX_AMOUNT {
        return Err(TxError::AmountError(format!(
            "`amount` must be <= {MAX_AMOUNT}"
        )));
    }
    Ok(())
}

fn flatten_public_keys(owners: &[OwnerSpec]) -> Vec<Ed25519PublicKey> {
    let mut out = Vec::new();
    for owner in owners {
        match owner {
            OwnerSpec::Key(pk) => out.push(pk.clone()),
            OwnerSpec::Condition(node) => out.extend(node.leaf_public_keys()),
            OwnerSpec::List(sub) => out.extend(flatten_public_keys(sub)),
        }
    }
    out
}

fn to_condition_node(owner: OwnerSpec) -> Result<ConditionNode, TxError> {
    match owner {
        OwnerSpec::Key(pk) => Ok(ConditionNode::leaf_from_public_key(pk)),
        OwnerSpec::Condition(node) => Ok(node),
        OwnerSpec::List(sub) => build_sublist_threshold(sub),
    }
}

/// A *nested* sublist's own N-of-N threshold subtree (spec §4.3). Unlike the
/// top-level list `generate` is called with, a sublist of length <= 1 is
/// rejected outright.
fn build_sublist_threshold(owners: Vec<OwnerSpec>) -> Result<ConditionNode, TxError> {
    if owners.len() <= 1 {
        return Err(TxError::InvalidOwnerSpec(
            "sublist cannot contain a single owner".into(),
        ));
    }
    let threshold = owners.len() as u32;
    let subconditions = owners
        .into_iter()
        .map(to_condition_node)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(ConditionNode::threshold(threshold, subconditions)?)
}
