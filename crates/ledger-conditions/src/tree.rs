//! The recursive condition/fulfillment tree (spec §3, §4.1): an Ed25519 leaf
//! or an M-of-N threshold over subnodes. A single tagged enum replaces the
//! `Fulfillment`/`Condition` class hierarchy the original implementation
//! dispatches over at runtime.

use std::collections::HashMap;

use ledger_crypto::{Ed25519PrivateKey, Ed25519PublicKey, Ed25519Signature};

use crate::error::ConditionError;
use crate::uri;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConditionNode {
    /// A single Ed25519 signer. `signature` is `None` until `sign_leaf`
    /// fills it in.
    Ed25519 {
        public_key: Ed25519PublicKey,
        signature: Option<Ed25519Signature>,
    },
    /// An M-of-N threshold over an ordered list of subnodes.
    Threshold {
        threshold: u32,
        subconditions: Vec<ConditionNode>,
    },
    /// A preimage-sha256 (hashlock) condition: identified solely by its
    /// condition URI, carrying no public keys and never fulfilled by this
    /// crate (spec §3: "public_keys is null only for the hashlock
    /// variant").
    HashLock { condition_uri: String },
}

impl ConditionNode {
    pub fn leaf_from_public_key(public_key: Ed25519PublicKey) -> Self {
        ConditionNode::Ed25519 {
            public_key,
            signature: None,
        }
    }

    pub fn threshold(k: u32, subs: Vec<ConditionNode>) -> Result<Self, ConditionError> {
        if k < 1 || (k as usize) > subs.len() {
            return Err(ConditionError::InvalidThreshold);
        }
        Ok(ConditionNode::Threshold {
            threshold: k,
            subconditions: subs,
        })
    }

    /// The condition URI: a function of structure and keys only, never of
    /// signatures (spec §3).
    pub fn condition_uri(&self) -> String {
        uri::condition_uri(self)
    }

    /// The fulfillment URI: requires every reachable leaf in the fulfilled
    /// region to already carry a signature.
    pub fn fulfillment_uri(&self) -> Result<String, ConditionError> {
        uri::fulfillment_uri(self)
    }

    /// Sign this node assuming it is a bare Ed25519 leaf.
    pub fn sign_leaf(
        &mut self,
        sk: &Ed25519PrivateKey,
        message: &[u8],
    ) -> Result<(), ConditionError> {
        match self {
            ConditionNode::Ed25519 { signature, .. } => {
                *signature = Some(ledger_crypto::ed25519::sign(message, sk));
                Ok(())
            }
            _ => Err(ConditionError::NotALeaf),
        }
    }

    /// Sign every distinct Ed25519 leaf under this node whose public key is
    /// present in `keys`, with the same `message`. Used by the signing
    /// engine (spec §4.7) for both bare leaves and threshold roots.
    pub fn sign_with_keys(
        &mut self,
        keys: &HashMap<Ed25519PublicKey, Ed25519PrivateKey>,
        message: &[u8],
    ) {
        match self {
            ConditionNode::Ed25519 {
                public_key,
                signature,
            } => {
                if let Some(sk) = keys.get(public_key) {
                    *signature = Some(ledger_crypto::ed25519::sign(message, sk));
                }
            }
            ConditionNode::Threshold { subconditions, .. } => {
                for sub in subconditions.iter_mut() {
                    sub.sign_with_keys(keys, message);
                }
            }
            ConditionNode::HashLock { .. } => {}
        }
    }

    /// Collect every Ed25519 leaf (by reference) whose public key equals
    /// `pk`, anywhere under this node.
    pub fn find_leaves_by_public_key<'a>(&'a self, pk: &Ed25519PublicKey) -> Vec<&'a ConditionNode> {
        let mut out = Vec::new();
        self.collect_leaves_by_public_key(pk, &mut out);
        out
    }

    fn collect_leaves_by_public_key<'a>(
        &'a self,
        pk: &Ed25519PublicKey,
        out: &mut Vec<&'a ConditionNode>,
    ) {
        match self {
            ConditionNode::Ed25519 { public_key, .. } => {
                if public_key == pk {
                    out.push(self);
                }
            }
            ConditionNode::Threshold { subconditions, .. } => {
                for sub in subconditions {
                    sub.collect_leaves_by_public_key(pk, out);
                }
            }
            ConditionNode::HashLock { .. } => {}
        }
    }

    /// Every Ed25519 public key reachable under this node, in tree order
    /// (duplicates kept — a pk may appear under more than one leaf).
    pub fn leaf_public_keys(&self) -> Vec<Ed25519PublicKey> {
        let mut out = Vec::new();
        self.collect_public_keys(&mut out);
        out
    }

    fn collect_public_keys(&self, out: &mut Vec<Ed25519PublicKey>) {
        match self {
            ConditionNode::Ed25519 { public_key, .. } => out.push(public_key.clone()),
            ConditionNode::Threshold { subconditions, .. } => {
                for sub in subconditions {
                    sub.collect_public_keys(out);
                }
            }
            ConditionNode::HashLock { .. } => {}
        }
    }

    /// True when a combination of validly signed leaves meets every
    /// threshold on the path to the root (spec §4.1).
    pub fn verify(&self, message: &[u8]) -> bool {
        match self {
            ConditionNode::Ed25519 {
                public_key,
                signature,
            } => match signature {
                Some(sig) => ledger_crypto::ed25519::verify(message, sig, public_key),
                None => false,
            },
            ConditionNode::Threshold {
                threshold,
                subconditions,
            } => {
                let satisfied = subconditions
                    .iter()
                    .filter(|sub| sub.verify(message))
                    .count();
                satisfied as u32 >= *threshold
            }
            ConditionNode::HashLock { .. } => false,
        }
    }
}
