//! Validator (spec §4.8): per-input validation against caller-supplied
//! output condition URIs.

use crate::codec;
use crate::error::TxError;
use crate::output::Output;

use super::{Operation, Transaction};

impl Transaction {
    /// `CREATE`/`GENESIS`: `referenced_outputs` is ignored, each input is
    /// validated against a wildcard condition that matches by construction.
    /// `TRANSFER`: `referenced_outputs.len()` must equal `inputs.len()`;
    /// input `i` is validated against `referenced_outputs[i]`.
    pub fn inputs_valid(&self, referenced_outputs: Option<&[Output]>) -> Result<bool, TxError> {
        inputs_valid(self, referenced_outputs)
    }
}

pub fn inputs_valid(tx: &Transaction, referenced_outputs: Option<&[Output]>) -> Result<bool, TxError> {
    match tx.operation() {
        Operation::Create | Operation::Genesis => {
            Ok(tx.inputs().iter().all(|input| input_valid(tx, input, None)))
        }
        Operation::Transfer => {
            let outputs = referenced_outputs.ok_or(TxError::InvalidOperation)?;
            if outputs.len() != tx.inputs().len() {
                return Err(TxError::InvalidOperation);
            }
            Ok(tx
                .inputs()
                .iter()
                .zip(outputs.iter())
                .all(|(input, output)| input_valid(tx, input, Some(output.condition_uri()))))
        }
    }
}

fn input_valid(tx: &Transaction, input: &crate::input::Input, output_condition_uri: Option<String>) -> bool {
    let partial = tx.with_single_input(input);
    let message = codec::canonical_bytes(&codec::signature_stripped_body(
        &partial.to_value_without_id(),
    ));

    let fulfillment_uri = match input.fulfillment().fulfillment_uri() {
        Ok(uri) => uri,
        Err(_) => {
            tracing::warn!("input fulfillment could not be serialized to a uri");
            return false;
        }
    };
    let parsed = match ledger_conditions::parse_fulfillment_uri(&fulfillment_uri) {
        Ok(node) => node,
        Err(_) => {
            tracing::warn!("input fulfillment uri could not be parsed");
            return false;
        }
    };

    if let Some(expected) = output_condition_uri {
        if expected != parsed.condition_uri() {
            tracing::warn!("input condition uri does not match the referenced output");
            return false;
        }
    }

    if !parsed.verify(&message) {
        tracing::warn!("input signature did not verify");
        return false;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::{Output, OwnerSpec};
    use crate::transaction::Transaction;
    use ledger_crypto::Ed25519PrivateKey;
    use rand::rngs::OsRng;
    use serde_json::json;

    fn gen_keypair() -> (Ed25519PrivateKey, ledger_crypto::Ed25519PublicKey) {
        let kp = ed25519_dalek::Keypair::generate(&mut OsRng {});
        let sk = Ed25519PrivateKey::from_bytes(&kp.secret.to_bytes()).unwrap();
        let pk = sk.public_key();
        (sk, pk)
    }

    #[test]
    fn single_owner_create_validates_after_signing() {
        let (sk_a, pk_a) = gen_keypair();
        let mut tx = Transaction::create(
            vec![pk_a.clone()],
            vec![(vec![OwnerSpec::Key(pk_a)], 1)],
            Some(json!({"m": "hi"})),
            Some(json!({"n": 1})),
        )
        .unwrap();
        tx.sign(&[sk_a]).unwrap();
        assert!(tx.inputs_valid(None).unwrap());
        assert_eq!(tx.id().len(), 64);
    }

    #[test]
    fn threshold_create_validates_with_subset_signer() {
        let (sk_a, pk_a) = gen_keypair();
        let (_sk_b, pk_b) = gen_keypair();
        let mut tx = Transaction::create(
            vec![pk_a.clone()],
            vec![(vec![OwnerSpec::Key(pk_a.clone()), OwnerSpec::Key(pk_b)], 1)],
            Some(json!({"x": 1})),
            None,
        )
        .unwrap();
        tx.sign(&[sk_a]).unwrap();
        assert!(tx.inputs_valid(None).unwrap());
    }

    #[test]
    fn transfer_checks_referenced_output_condition() {
        let (sk_a, pk_a) = gen_keypair();
        let (_sk_c, pk_c) = gen_keypair();

        let mut t1 = Transaction::create(
            vec![pk_a.clone()],
            vec![(vec![OwnerSpec::Key(pk_a.clone())], 1)],
            None,
            None,
        )
        .unwrap();
        t1.sign(&[sk_a.clone()]).unwrap();

        let inputs = t1.to_inputs(Some(&[0])).unwrap();
        let mut transfer = Transaction::transfer(
            inputs,
            vec![(vec![OwnerSpec::Key(pk_c)], 1)],
            t1.id(),
            None,
        )
        .unwrap();
        transfer.sign(&[sk_a]).unwrap();

        assert!(transfer.inputs_valid(Some(t1.outputs())).unwrap());

        let (_sk_other, pk_other) = gen_keypair();
        let mismatched = Output::generate(vec![OwnerSpec::Key(pk_other)], 1).unwrap();
        assert!(!transfer.inputs_valid(Some(&[mismatched])).unwrap());
    }

    #[test]
    fn duplicate_public_key_in_threshold_signs_both_leaves() {
        let (sk_a, pk_a) = gen_keypair();
        let mut tx = Transaction::create(
            vec![pk_a.clone()],
            vec![(
                vec![OwnerSpec::Key(pk_a.clone()), OwnerSpec::Key(pk_a.clone())],
                1,
            )],
            None,
            None,
        )
        .unwrap();
        // owners_before has one distinct key even though the threshold
        // has two leaves for it; Input::generate dedupes nothing, so both
        // subleaves share the same owner and get signed together.
        tx.sign(&[sk_a]).unwrap();
        assert!(tx.inputs_valid(None).unwrap());
    }

    #[test]
    fn hash_tamper_is_caught_by_validate_id() {
        let (sk_a, pk_a) = gen_keypair();
        let mut tx = Transaction::create(
            vec![pk_a.clone()],
            vec![(vec![OwnerSpec::Key(pk_a)], 1)],
            Some(json!({"m": "hi"})),
            None,
        )
        .unwrap();
        tx.sign(&[sk_a]).unwrap();

        let mut value = tx.to_value();
        value["metadata"]["m"] = json!("tampered");
        let err = Transaction::from_value(&value).unwrap_err();
        assert_eq!(err, TxError::InvalidHash);
    }
}
