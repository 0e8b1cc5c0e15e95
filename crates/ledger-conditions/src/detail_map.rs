//! `to_detail_map` / `from_detail_map` (spec §4.1): the recursive map
//! representation of a condition node that appears inside transaction JSON.
//! `serde_json::Map` here is the default `BTreeMap`-backed variant (the
//! `preserve_order` feature is deliberately left off across this workspace —
//! see DESIGN.md), so key order is always lexicographic regardless of
//! insertion order.

use serde_json::{Map, Value};

use crate::error::ConditionError;
use crate::tree::ConditionNode;
use ledger_crypto::{Ed25519PublicKey, Ed25519Signature};

pub type DetailMap = Map<String, Value>;

pub fn to_detail_map(node: &ConditionNode) -> DetailMap {
    let mut map = Map::new();
    match node {
        ConditionNode::Ed25519 {
            public_key,
            signature,
        } => {
            map.insert("type".into(), Value::String("ed25519-sha-256".into()));
            map.insert(
                "public_key".into(),
                Value::String(public_key.to_string()),
            );
            if let Some(sig) = signature {
                map.insert(
                    "signature".into(),
                    Value::String(hex::encode(sig.to_bytes())),
                );
            }
        }
        ConditionNode::Threshold {
            threshold,
            subconditions,
        } => {
            map.insert("type".into(), Value::String("threshold-sha-256".into()));
            map.insert("threshold".into(), Value::from(*threshold));
            map.insert(
                "subconditions".into(),
                Value::Array(
                    subconditions
                        .iter()
                        .map(|s| Value::Object(to_detail_map(s)))
                        .collect(),
                ),
            );
        }
        ConditionNode::HashLock { condition_uri } => {
            map.insert("type".into(), Value::String("preimage-sha-256".into()));
            map.insert(
                "condition_uri".into(),
                Value::String(condition_uri.clone()),
            );
        }
    }
    map
}

pub fn from_detail_map(map: &DetailMap) -> Result<ConditionNode, ConditionError> {
    let ty = map
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| ConditionError::ParseError("detail map missing `type`".into()))?;
    match ty {
        "ed25519-sha-256" => {
            let pk_str = map
                .get("public_key")
                .and_then(Value::as_str)
                .ok_or_else(|| ConditionError::ParseError("leaf missing `public_key`".into()))?;
            let public_key: Ed25519PublicKey = pk_str
                .parse()
                .map_err(|_| ConditionError::ParseError("invalid public key".into()))?;
            let signature = match map.get("signature").and_then(Value::as_str) {
                Some(sig_hex) => {
                    let bytes = hex::decode(sig_hex)
                        .map_err(|e| ConditionError::ParseError(e.to_string()))?;
                    Some(
                        Ed25519Signature::from_bytes(&bytes)
                            .map_err(|e| ConditionError::ParseError(e.to_string()))?,
                    )
                }
                None => None,
            };
            Ok(ConditionNode::Ed25519 {
                public_key,
                signature,
            })
        }
        "threshold-sha-256" => {
            let threshold = map
                .get("threshold")
                .and_then(Value::as_u64)
                .ok_or_else(|| ConditionError::ParseError("threshold missing `threshold`".into()))?
                as u32;
            let subs = map
                .get("subconditions")
                .and_then(Value::as_array)
                .ok_or_else(|| {
                    ConditionError::ParseError("threshold missing `subconditions`".into())
                })?;
            let subconditions = subs
                .iter()
                .map(|v| {
                    v.as_object()
                        .ok_or_else(|| {
                            ConditionError::ParseError("subcondition not an object".into())
                        })
                        .and_then(from_detail_map)
                })
                .collect::<Result<Vec<_>, _>>()?;
            if threshold < 1 || (threshold as usize) > subconditions.len() {
                return Err(ConditionError::InvalidThreshold);
            }
            Ok(ConditionNode::Threshold {
                threshold,
                subconditions,
            })
        }
        "preimage-sha-256" => {
            let condition_uri = map
                .get("condition_uri")
                .and_then(Value::as_str)
                .ok_or_else(|| {
                    ConditionError::ParseError("hashlock missing `condition_uri`".into())
                })?
                .to_string();
            Ok(ConditionNode::HashLock { condition_uri })
        }
        _ => Err(ConditionError::UnknownConditionType),
    }
}
