//! Signing engine (spec §4.7): per-input partial-transaction signing for
//! Ed25519 and threshold fulfillments.

use std::collections::HashMap;

use ledger_conditions::ConditionNode;
use ledger_crypto::{Ed25519PrivateKey, Ed25519PublicKey};

use crate::codec;
use crate::error::TxError;

use super::Transaction;

impl Transaction {
    /// Fulfills every input by signing it against a partial transaction that
    /// carries only that input (spec §4.7): signing each input against a
    /// body containing *only* that input prevents one signature from
    /// attesting to unrelated inputs, while the shared outputs and metadata
    /// still bind the signature to the full intent.
    ///
    /// All keys required to fully sign every input must be supplied —
    /// a partial key set fails with `KeypairMismatch` rather than producing
    /// a partially signed threshold fulfillment (Open Question (b) in
    /// spec.md §9, resolved in DESIGN.md).
    pub fn sign(&mut self, private_keys: &[Ed25519PrivateKey]) -> Result<(), TxError> {
        let key_pairs: HashMap<Ed25519PublicKey, Ed25519PrivateKey> = private_keys
            .iter()
            .map(|sk| (sk.public_key(), sk.clone()))
            .collect();

        for index in 0..self.inputs.len() {
            let partial = self.with_single_input(&self.inputs[index]);
            let message = codec::canonical_bytes(&codec::signature_stripped_body(
                &partial.to_value_without_id(),
            ));

            let mut input = self.inputs[index].clone();
            sign_input(&mut input, &key_pairs, &message)?;
            tracing::debug!(input_index = index, "signed transaction input");
            self.inputs[index] = input;
        }
        Ok(())
    }
}

fn sign_input(
    input: &mut crate::input::Input,
    key_pairs: &HashMap<Ed25519PublicKey, Ed25519PrivateKey>,
    message: &[u8],
) -> Result<(), TxError> {
    match input.fulfillment() {
        ConditionNode::Ed25519 { .. } => {
            let public_key = input.owners_before()[0].clone();
            let sk = key_pairs.get(&public_key).ok_or_else(|| {
                tracing::warn!(%public_key, "no private key supplied for Ed25519 input");
                TxError::KeypairMismatch(public_key.to_string())
            })?;
            input
                .fulfillment_mut()
                .sign_leaf(sk, message)
                .map_err(TxError::from)?;
            Ok(())
        }
        ConditionNode::Threshold { .. } => {
            let owners: std::collections::HashSet<Ed25519PublicKey> =
                input.owners_before().iter().cloned().collect();
            for owner in owners {
                let leaves = input.fulfillment().find_leaves_by_public_key(&owner);
                if leaves.is_empty() {
                    tracing::warn!(%owner, "public key has no leaf in the threshold fulfillment");
                    return Err(TxError::KeypairMismatch(owner.to_string()));
                }
                if !key_pairs.contains_key(&owner) {
                    tracing::warn!(%owner, "no private key supplied for threshold leaf");
                    return Err(TxError::KeypairMismatch(owner.to_string()));
                }
            }
            input.fulfillment_mut().sign_with_keys(key_pairs, message);
            Ok(())
        }
        ConditionNode::HashLock { .. } => Err(TxError::InvalidSignature),
    }
}
