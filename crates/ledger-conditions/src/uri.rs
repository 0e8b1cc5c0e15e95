//! Condition/fulfillment URI encoding (spec §3, §4.1). Not an attempt to
//! reproduce the Crypto-Conditions (RFC draft) byte-for-byte encoding the
//! `cryptoconditions` library the original implementation depends on uses;
//! only the property the spec actually tests is load-bearing — two
//! instances of this crate encoding the same tree agree bit-for-bit, and the
//! condition URI never changes when a signature is added.

use base64::{decode_config, encode_config, URL_SAFE_NO_PAD};
use ledger_crypto::{sha3_256, Ed25519PublicKey, Ed25519Signature};

use crate::error::ConditionError;
use crate::tree::ConditionNode;

/// A compact, signature-independent fingerprint of a node's structure.
fn fingerprint(node: &ConditionNode) -> String {
    let structural = match node {
        ConditionNode::Ed25519 { public_key, .. } => {
            format!("ed25519:{}", hex::encode(public_key.as_bytes()))
        }
        ConditionNode::Threshold {
            threshold,
            subconditions,
        } => {
            let subs: Vec<String> = subconditions.iter().map(condition_uri).collect();
            format!("threshold:{}:[{}]", threshold, subs.join(","))
        }
        ConditionNode::HashLock { condition_uri } => format!("hashlock:{condition_uri}"),
    };
    let digest = sha3_256(structural.as_bytes());
    encode_config(digest.as_bytes(), URL_SAFE_NO_PAD)
}

fn fingerprint_type(node: &ConditionNode) -> &'static str {
    match node {
        ConditionNode::Ed25519 { .. } => "ed25519-sha3-256",
        ConditionNode::Threshold { .. } => "threshold-sha3-256",
        ConditionNode::HashLock { .. } => "preimage-sha256",
    }
}

fn cost(node: &ConditionNode) -> u64 {
    match node {
        ConditionNode::Ed25519 { .. } => 1,
        ConditionNode::Threshold { subconditions, .. } => {
            1 + subconditions.iter().map(cost).sum::<u64>()
        }
        ConditionNode::HashLock { .. } => 1,
    }
}

/// `ni:///sha3-256;<fingerprint>?fpt=<type>&cost=<n>`. Independent of any
/// signature in the tree.
pub fn condition_uri(node: &ConditionNode) -> String {
    if let ConditionNode::HashLock { condition_uri } = node {
        return condition_uri.clone();
    }
    format!(
        "ni:///sha3-256;{}?fpt={}&cost={}",
        fingerprint(node),
        fingerprint_type(node),
        cost(node)
    )
}

/// `cf:1:<base64url(signed-payload)>`. Requires every reachable leaf to
/// already be signed.
pub fn fulfillment_uri(node: &ConditionNode) -> Result<String, ConditionError> {
    let payload = signed_payload(node)?;
    Ok(format!(
        "cf:1:{}",
        encode_config(&payload, URL_SAFE_NO_PAD)
    ))
}

fn signed_payload(node: &ConditionNode) -> Result<String, ConditionError> {
    match node {
        ConditionNode::Ed25519 {
            public_key,
            signature,
        } => {
            let sig = signature
                .as_ref()
                .ok_or(ConditionError::MissingSignature)?;
            Ok(format!(
                "E:{}:{}",
                hex::encode(public_key.as_bytes()),
                hex::encode(sig.to_bytes())
            ))
        }
        ConditionNode::Threshold {
            threshold,
            subconditions,
        } => {
            let subs = subconditions
                .iter()
                .map(signed_payload)
                .collect::<Result<Vec<_>, _>>()?;
            Ok(format!("T:{}:[{}]", threshold, subs.join(",")))
        }
        ConditionNode::HashLock { .. } => Err(ConditionError::MissingSignature),
    }
}

/// Parse a fulfillment URI back into a fully signed `ConditionNode`.
pub fn parse_fulfillment_uri(uri: &str) -> Result<ConditionNode, ConditionError> {
    let b64 = uri
        .strip_prefix("cf:1:")
        .ok_or_else(|| ConditionError::ParseError("missing cf:1: prefix".into()))?;
    let bytes = decode_config(b64, URL_SAFE_NO_PAD)
        .map_err(|e| ConditionError::ParseError(e.to_string()))?;
    let payload = String::from_utf8(bytes)
        .map_err(|e| ConditionError::ParseError(e.to_string()))?;
    parse_payload(&payload)
}

fn parse_payload(payload: &str) -> Result<ConditionNode, ConditionError> {
    if let Some(rest) = payload.strip_prefix("E:") {
        let mut parts = rest.splitn(2, ':');
        let pk_hex = parts
            .next()
            .ok_or_else(|| ConditionError::ParseError("missing public key".into()))?;
        let sig_hex = parts
            .next()
            .ok_or_else(|| ConditionError::ParseError("missing signature".into()))?;
        let pk_bytes =
            hex::decode(pk_hex).map_err(|e| ConditionError::ParseError(e.to_string()))?;
        let sig_bytes =
            hex::decode(sig_hex).map_err(|e| ConditionError::ParseError(e.to_string()))?;
        let public_key = Ed25519PublicKey::from_bytes(&pk_bytes)
            .map_err(|e| ConditionError::ParseError(e.to_string()))?;
        let signature = Ed25519Signature::from_bytes(&sig_bytes)
            .map_err(|e| ConditionError::ParseError(e.to_string()))?;
        Ok(ConditionNode::Ed25519 {
            public_key,
            signature: Some(signature),
        })
    } else if let Some(rest) = payload.strip_prefix("T:") {
        let mut parts = rest.splitn(2, ':');
        let threshold: u32 = parts
            .next()
            .ok_or_else(|| ConditionError::ParseError("missing threshold".into()))?
            .parse()
            .map_err(|_| ConditionError::ParseError("threshold not an integer".into()))?;
        let list = parts
            .next()
            .ok_or_else(|| ConditionError::ParseError("missing subconditions".into()))?;
        let list = list
            .strip_prefix('[')
            .and_then(|s| s.strip_suffix(']'))
            .ok_or_else(|| ConditionError::ParseError("malformed subcondition list".into()))?;
        let subconditions = split_top_level(list)
            .into_iter()
            .map(|s| parse_payload(&s))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ConditionNode::Threshold {
            threshold,
            subconditions,
        })
    } else {
        Err(ConditionError::UnknownConditionType)
    }
}

/// Split a comma-separated list of `E:...`/`T:...:[...]` items on commas
/// that are not nested inside a `T:`'s own bracketed sublist.
fn split_top_level(s: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut depth = 0i32;
    let mut start = 0usize;
    for (i, c) in s.char_indices() {
        match c {
            '[' => depth += 1,
            ']' => depth -= 1,
            ',' if depth == 0 => {
                out.push(s[start..i].to_string());
                start = i + 1;
            }
            _ => {}
        }
    }
    if start < s.len() {
        out.push(s[start..].to_string());
    }
    out
}
