//! Canonical codec (spec §4.5, §6): deterministic serialization of the
//! transaction body, signature stripping, and hash derivation.
//!
//! Canonical form is UTF-8 JSON with no insignificant whitespace, maps
//! sorted recursively by key at every level, and arrays preserving
//! insertion order. We get the recursive key sort "for free" from
//! `serde_json::Map`'s default `BTreeMap` backend — this workspace
//! deliberately does not enable the `preserve_order` feature the teacher
//! crate turns on for its own (insertion-order-sensitive) BCS/u256 parsing;
//! see DESIGN.md.

use ledger_crypto::{sha3_256, HashValue};
use serde_json::Value;

use crate::error::TxError;

/// Deep-clones `tx` with every input's `fulfillment` field replaced by
/// `null` (spec §4.5).
pub fn signature_stripped_body(tx: &Value) -> Value {
    let mut stripped = tx.clone();
    if let Some(inputs) = stripped.get_mut("inputs").and_then(Value::as_array_mut) {
        for input in inputs.iter_mut() {
            if let Some(obj) = input.as_object_mut() {
                obj.insert("fulfillment".into(), Value::Null);
            }
        }
    }
    stripped
}

/// Serializes `value` as compact, key-sorted UTF-8 JSON.
pub fn canonical_bytes(value: &Value) -> Vec<u8> {
    // serde_json::to_vec never fails for a Value built from this crate's
    // own constructors (no non-finite floats, no non-string keys).
    serde_json::to_vec(value).expect("canonical value is always serializable")
}

/// `hex(SHA3-256(canonical_bytes(signature_stripped_body(tx))))`, with `id`
/// removed first if present (spec §4.5).
pub fn compute_id(tx: &Value) -> String {
    let mut body = tx.clone();
    if let Some(obj) = body.as_object_mut() {
        obj.remove("id");
    }
    let stripped = signature_stripped_body(&body);
    sha3_256(&canonical_bytes(&stripped)).to_hex()
}

/// Removes the declared `id`, recomputes it, and fails with
/// `TxError::InvalidHash` on mismatch or absence (spec §4.8 `validate_id`).
pub fn validate_id(tx: &Value) -> Result<(), TxError> {
    let declared = tx
        .get("id")
        .and_then(Value::as_str)
        .ok_or(TxError::InvalidHash)?;
    let recomputed = compute_id(tx);
    if declared != recomputed {
        return Err(TxError::InvalidHash);
    }
    Ok(())
}

pub fn hash_bytes(bytes: &[u8]) -> HashValue {
    sha3_256(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn stripping_signatures_nulls_every_input_fulfillment() {
        let tx = json!({
            "inputs": [
                {"fulfillment": "cf:1:abc", "owners_before": ["x"], "fulfills": null},
                {"fulfillment": {"type": "ed25519-sha-256"}, "owners_before": ["y"], "fulfills": null},
            ],
            "outputs": [],
        });
        let stripped = signature_stripped_body(&tx);
        for input in stripped["inputs"].as_array().unwrap() {
            assert_eq!(input["fulfillment"], Value::Null);
        }
    }

    #[test]
    fn canonical_bytes_sort_keys_recursively() {
        let tx = json!({"b": 1, "a": {"z": 1, "y": 2}});
        let bytes = canonical_bytes(&tx);
        let s = String::from_utf8(bytes).unwrap();
        assert_eq!(s, r#"{"a":{"y":2,"z":1},"b":1}"#);
    }

    #[test]
    fn compute_id_ignores_declared_id_and_signatures() {
        let without_id = json!({
            "inputs": [{"fulfillment": null, "owners_before": ["x"], "fulfills": null}],
            "outputs": [],
            "metadata": null,
        });
        let id = compute_id(&without_id);

        let mut with_signed_fulfillment = without_id.clone();
        with_signed_fulfillment["inputs"][0]["fulfillment"] = json!("cf:1:signed-bytes");
        with_signed_fulfillment["id"] = json!("whatever-was-declared");
        assert_eq!(compute_id(&with_signed_fulfillment), id);
    }

    #[test]
    fn validate_id_detects_tamper() {
        let mut tx = json!({
            "inputs": [{"fulfillment": null, "owners_before": ["x"], "fulfills": null}],
            "outputs": [],
            "metadata": {"m": "hi"},
        });
        let id = compute_id(&tx);
        tx["id"] = Value::String(id);
        assert!(validate_id(&tx).is_ok());

        tx["metadata"]["m"] = json!("tampered");
        assert_eq!(validate_id(&tx).unwrap_err(), TxError::InvalidHash);
    }

    proptest::proptest! {
        #[test]
        fn canonical_bytes_is_insensitive_to_key_insertion_order(
            a in 0i64..1000, b in 0i64..1000, c in 0i64..1000,
        ) {
            let forward = json!({"a": a, "b": b, "c": c});
            let mut backward = serde_json::Map::new();
            backward.insert("c".into(), json!(c));
            backward.insert("b".into(), json!(b));
            backward.insert("a".into(), json!(a));
            proptest::prop_assert_eq!(
                canonical_bytes(&forward),
                canonical_bytes(&Value::Object(backward))
            );
        }

        #[test]
        fn compute_id_is_stable_under_declared_id_and_fulfillment_changes(
            amount in 1u64..1_000_000,
            fulfillment in proptest::option::of("[a-z]{1,8}"),
        ) {
            let without_id = json!({
                "inputs": [{
                    "fulfillment": null,
                    "owners_before": ["x"],
                    "fulfills": null,
                }],
                "outputs": [{"amount": amount.to_string()}],
                "metadata": null,
            });
            let id = compute_id(&without_id);

            let mut mutated = without_id.clone();
            mutated["id"] = json!("anything");
            mutated["inputs"][0]["fulfillment"] = match &fulfillment {
                Some(s) => json!(s),
                None => Value::Null,
            };
            proptest::prop_assert_eq!(compute_id(&mutated), id);
        }
    }
}
