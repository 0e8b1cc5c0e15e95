//! End-to-end lifecycle scenarios: build, sign, serialize, reparse, validate.

use ledger_crypto::Ed25519PrivateKey;
use ledger_tx::{Output, OwnerSpec, Transaction, TxError};
use rand::rngs::OsRng;
use serde_json::json;

fn gen_keypair() -> (Ed25519PrivateKey, ledger_crypto::Ed25519PublicKey) {
    let kp = ed25519_dalek::Keypair::generate(&mut OsRng {});
    let sk = Ed25519PrivateKey::from_bytes(&kp.secret.to_bytes()).unwrap();
    let pk = sk.public_key();
    (sk, pk)
}

fn round_trip(tx: &Transaction) -> Transaction {
    let value = tx.to_value();
    Transaction::from_value(&value).expect("round trip through canonical json")
}

#[test]
fn single_owner_create_round_trips_and_validates() {
    let (sk, pk) = gen_keypair();
    let mut tx = Transaction::create(
        vec![pk.clone()],
        vec![(vec![OwnerSpec::Key(pk)], 100)],
        Some(json!({"kind": "fixture"})),
        Some(json!({"note": "single owner"})),
    )
    .unwrap();
    tx.sign(&[sk]).unwrap();

    let id_before = tx.id();
    let reparsed = round_trip(&tx);
    assert_eq!(reparsed.id(), id_before);
    assert!(reparsed.inputs_valid(None).unwrap());
}

#[test]
fn threshold_create_round_trips_and_validates() {
    let (sk_a, pk_a) = gen_keypair();
    let (sk_b, pk_b) = gen_keypair();
    let mut tx = Transaction::create(
        vec![pk_a.clone(), pk_b.clone()],
        vec![(
            vec![OwnerSpec::Key(pk_a.clone()), OwnerSpec::Key(pk_b.clone())],
            5,
        )],
        None,
        None,
    )
    .unwrap();
    tx.sign(&[sk_a, sk_b]).unwrap();

    let reparsed = round_trip(&tx);
    assert!(reparsed.inputs_valid(None).unwrap());
}

#[test]
fn multi_io_create_with_independent_outputs() {
    let (sk_a, pk_a) = gen_keypair();
    let (_sk_b, pk_b) = gen_keypair();
    let (_sk_c, pk_c) = gen_keypair();

    let mut tx = Transaction::create(
        vec![pk_a.clone()],
        vec![
            (vec![OwnerSpec::Key(pk_b)], 30),
            (vec![OwnerSpec::Key(pk_c)], 70),
        ],
        None,
        Some(json!({"batch": true})),
    )
    .unwrap();
    tx.sign(&[sk_a]).unwrap();

    assert_eq!(tx.outputs().len(), 2);
    let reparsed = round_trip(&tx);
    assert!(reparsed.inputs_valid(None).unwrap());
}

#[test]
fn single_input_transfer_spends_a_create_output() {
    let (sk_a, pk_a) = gen_keypair();
    let (sk_b, pk_b) = gen_keypair();

    let mut create = Transaction::create(
        vec![pk_a.clone()],
        vec![(vec![OwnerSpec::Key(pk_a.clone())], 50)],
        None,
        None,
    )
    .unwrap();
    create.sign(&[sk_a.clone()]).unwrap();
    let create_id = create.id();

    let spendable = create.to_inputs(None).unwrap();
    let mut transfer = Transaction::transfer(
        spendable,
        vec![(vec![OwnerSpec::Key(pk_b.clone())], 50)],
        create_id.clone(),
        None,
    )
    .unwrap();
    transfer.sign(&[sk_a]).unwrap();

    assert_eq!(transfer.asset().asset_id(), Some(create_id.as_str()));
    assert!(transfer.inputs_valid(Some(create.outputs())).unwrap());

    let reparsed = round_trip(&transfer);
    assert!(reparsed.inputs_valid(Some(create.outputs())).unwrap());
}

#[test]
fn duplicate_public_key_in_threshold_owner_spec() {
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
    tx.sign(&[sk_a]).unwrap();
    assert!(tx.inputs_valid(None).unwrap());

    match tx.outputs()[0].condition() {
        ledger_conditions::ConditionNode::Threshold { subconditions, .. } => {
            assert_eq!(subconditions.len(), 2);
        }
        _ => panic!("expected threshold with two identical leaves"),
    }
}

#[test]
fn tampering_with_the_serialized_body_is_caught_by_id_validation() {
    let (sk, pk) = gen_keypair();
    let mut tx = Transaction::create(
        vec![pk.clone()],
        vec![(vec![OwnerSpec::Key(pk)], 1)],
        None,
        Some(json!({"payload": "original"})),
    )
    .unwrap();
    tx.sign(&[sk]).unwrap();

    let mut tampered = tx.to_value();
    tampered["asset"]["data"]["payload"] = json!("tampered");

    let err = Transaction::from_value(&tampered).unwrap_err();
    assert_eq!(err, TxError::InvalidHash);
}

#[test]
fn transfer_without_referenced_outputs_is_rejected() {
    let (sk_a, pk_a) = gen_keypair();
    let (_sk_b, pk_b) = gen_keypair();

    let mut create = Transaction::create(
        vec![pk_a.clone()],
        vec![(vec![OwnerSpec::Key(pk_a.clone())], 1)],
        None,
        None,
    )
    .unwrap();
    create.sign(&[sk_a.clone()]).unwrap();

    let spendable = create.to_inputs(None).unwrap();
    let mut transfer =
        Transaction::transfer(spendable, vec![(vec![OwnerSpec::Key(pk_b)], 1)], create.id(), None)
            .unwrap();
    transfer.sign(&[sk_a]).unwrap();

    assert_eq!(
        transfer.inputs_valid(None).unwrap_err(),
        TxError::InvalidOperation
    );
}

#[test]
fn signing_without_the_right_key_fails_with_keypair_mismatch() {
    let (_sk_a, pk_a) = gen_keypair();
    let (sk_wrong, _pk_wrong) = gen_keypair();

    let mut tx = Transaction::create(
        vec![pk_a.clone()],
        vec![(vec![OwnerSpec::Key(pk_a)], 1)],
        None,
        None,
    )
    .unwrap();

    assert!(matches!(
        tx.sign(&[sk_wrong]),
        Err(TxError::KeypairMismatch(_))
    ));
}

#[test]
fn version_mismatch_is_rejected_on_ingest() {
    let (sk, pk) = gen_keypair();
    let mut tx = Transaction::create(
        vec![pk.clone()],
        vec![(vec![OwnerSpec::Key(pk)], 1)],
        None,
        None,
    )
    .unwrap();
    tx.sign(&[sk]).unwrap();

    let mut value = tx.to_value();
    value["version"] = json!("1.0");
    // Mutating the version changes the canonical body, so the declared id
    // is stale before we even reach the version check; recompute it so the
    // version check is what actually fails.
    let recomputed_id = ledger_tx::codec::compute_id(&{
        let mut without_id = value.clone();
        without_id.as_object_mut().unwrap().remove("id");
        without_id
    });
    value["id"] = json!(recomputed_id);

    assert!(matches!(
        Transaction::from_value(&value),
        Err(TxError::VersionMismatch(_))
    ));
}

#[test]
fn output_generate_rejects_empty_owner_list() {
    let err = Output::generate(vec![], 1).unwrap_err();
    assert!(matches!(err, TxError::InvalidOwnerSpec(_)));
}
