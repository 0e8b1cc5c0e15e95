//! `Transaction` (spec §3, §4.6): CREATE / TRANSFER / GENESIS construction,
//! asset payload rules, and the in-memory builder invariants.

mod signer;
mod validator;

use std::collections::HashSet;

use ledger_crypto::Ed25519PublicKey;
use serde_json::{Map, Value};

use crate::codec;
use crate::error::TxError;
use crate::input::Input;
use crate::output::{Output, OwnerSpec};

pub use validator::inputs_valid;

/// `"<major>.<minor>"`; exact match required on ingest (Open Question (a)
/// in spec.md §9, resolved in DESIGN.md).
pub const TX_VERSION: &str = "2.0";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation {
    Create,
    Transfer,
    Genesis,
}

impl Operation {
    fn as_str(self) -> &'static str {
        match self {
            Operation::Create => "CREATE",
            Operation::Transfer => "TRANSFER",
            Operation::Genesis => "GENESIS",
        }
    }

    fn from_str(s: &str) -> Result<Self, TxError> {
        match s {
            "CREATE" => Ok(Operation::Create),
            "TRANSFER" => Ok(Operation::Transfer),
            "GENESIS" => Ok(Operation::Genesis),
            _ => Err(TxError::InvalidOperation),
        }
    }
}

/// The transaction's `asset` field (spec §3): `null` or `{"data": ...}` for
/// CREATE/GENESIS, `{"id": "<txid>"}` for TRANSFER.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AssetPayload {
    Null,
    Data(Value),
    Id(String),
}

impl AssetPayload {
    fn to_value(&self) -> Value {
        match self {
            AssetPayload::Null => Value::Null,
            AssetPayload::Data(v) => {
                let mut map = Map::new();
                map.insert("data".into(), v.clone());
                Value::Object(map)
            }
            AssetPayload::Id(id) => {
                let mut map = Map::new();
                map.insert("id".into(), Value::String(id.clone()));
                Value::Object(map)
            }
        }
    }

    fn from_value(operation: Operation, value: &Value) -> Result<Self, TxError> {
        match operation {
            Operation::Create | Operation::Genesis => match value {
                Value::Null => Ok(AssetPayload::Null),
                Value::Object(map) if map.contains_key("data") => {
                    Ok(AssetPayload::Data(map["data"].clone()))
                }
                _ => Err(TxError::InvalidAsset(
                    "CREATE/GENESIS asset must be null or hold a `data` field".into(),
                )),
            },
            Operation::Transfer => match value {
                Value::Object(map) => {
                    let id = map
                        .get("id")
                        .and_then(Value::as_str)
                        .ok_or_else(|| {
                            TxError::InvalidAsset(
                                "TRANSFER asset must hold an `id` field".into(),
                            )
                        })?
                        .to_string();
                    Ok(AssetPayload::Id(id))
                }
                _ => Err(TxError::InvalidAsset(
                    "TRANSFER asset must hold an `id` field".into(),
                )),
            },
        }
    }

    pub fn asset_id(&self) -> Option<&str> {
        match self {
            AssetPayload::Id(id) => Some(id),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transaction {
    version: String,
    operation: Operation,
    asset: AssetPayload,
    inputs: Vec<Input>,
    outputs: Vec<Output>,
    metadata: Option<Value>,
}

impl Transaction {
    pub fn new(
        operation: Operation,
        asset: AssetPayload,
        inputs: Vec<Input>,
        outputs: Vec<Output>,
        metadata: Option<Value>,
    ) -> Result<Self, TxError> {
        validate_asset_matches_operation(operation, &asset)?;
        if inputs.is_empty() {
            return Err(TxError::InvalidOwnerSpec("`inputs` must be non-empty".into()));
        }
        if outputs.is_empty() {
            return Err(TxError::InvalidOwnerSpec("`outputs` must be non-empty".into()));
        }
        for input in &inputs {
            let fulfills_present = input.fulfills().is_present();
            match operation {
                Operation::Create | Operation::Genesis if fulfills_present => {
                    return Err(TxError::InvalidOperation);
                }
                Operation::Transfer if !fulfills_present => {
                    return Err(TxError::InvalidOperation);
                }
                _ => {}
            }
        }
        Ok(Self {
            version: TX_VERSION.to_string(),
            operation,
            asset,
            inputs,
            outputs,
            metadata,
        })
    }

    /// A simple way to generate a `CREATE` transaction (spec §4.6).
    pub fn create(
        signer_pks: Vec<Ed25519PublicKey>,
        recipients: Vec<(Vec<OwnerSpec>, u64)>,
        metadata: Option<Value>,
        asset: Option<Value>,
    ) -> Result<Self, TxError> {
        Self::create_like(Operation::Create, signer_pks, recipients, metadata, asset)
    }

    /// Identical shape to `create`, but with `operation = GENESIS`.
    pub fn genesis(
        signer_pks: Vec<Ed25519PublicKey>,
        recipients: Vec<(Vec<OwnerSpec>, u64)>,
        metadata: Option<Value>,
        asset: Option<Value>,
    ) -> Result<Self, TxError> {
        Self::create_like(Operation::Genesis, signer_pks, recipients, metadata, asset)
    }

    fn create_like(
        operation: Operation,
        signer_pks: Vec<Ed25519PublicKey>,
        recipients: Vec<(Vec<OwnerSpec>, u64)>,
        metadata: Option<Value>,
        asset: Option<Value>,
    ) -> Result<Self, TxError> {
        if signer_pks.is_empty() {
            return Err(TxError::InvalidOwnerSpec(
                "`signer_pks` list cannot be empty".into(),
            ));
        }
        if recipients.is_empty() {
            return Err(TxError::InvalidOwnerSpec(
                "`recipients` list cannot be empty".into(),
            ));
        }
        let outputs = recipients
            .into_iter()
            .map(|(owners, amount)| Output::generate(owners, amount))
            .collect::<Result<Vec<_>, _>>()?;
        let input = Input::generate(signer_pks)?;
        let asset_payload = match asset {
            Some(v) => AssetPayload::Data(v),
            None => AssetPayload::Data(Value::Null),
        };
        Self::new(operation, asset_payload, vec![input], outputs, metadata)
    }

    /// A simple way to generate a `TRANSFER` transaction (spec §4.6).
    /// `inputs` are copied defensively.
    pub fn transfer(
        inputs: Vec<Input>,
        recipients: Vec<(Vec<OwnerSpec>, u64)>,
        asset_id: String,
        metadata: Option<Value>,
    ) -> Result<Self, TxError> {
        if inputs.is_empty() {
            return Err(TxError::InvalidOwnerSpec(
                "`inputs` must contain at least one item".into(),
            ));
        }
        if recipients.is_empty() {
            return Err(TxError::InvalidOwnerSpec(
                "`recipients` list cannot be empty".into(),
            ));
        }
        let outputs = recipients
            .into_iter()
            .map(|(owners, amount)| Output::generate(owners, amount))
            .collect::<Result<Vec<_>, _>>()?;
        let inputs = inputs.clone();
        Self::new(
            Operation::Transfer,
            AssetPayload::Id(asset_id),
            inputs,
            outputs,
            metadata,
        )
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }

    pub fn asset(&self) -> &AssetPayload {
        &self.asset
    }

    pub fn inputs(&self) -> &[Input] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[Output] {
        &self.outputs
    }

    pub fn metadata(&self) -> Option<&Value> {
        self.metadata.as_ref()
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Mutation on the in-memory, yet-unsigned builder (spec §3): adding an
    /// input/output invalidates any previously computed id, since `id` is
    /// always recomputed from the current state rather than cached.
    pub fn add_input(&mut self, input: Input) {
        self.inputs.push(input);
    }

    pub fn add_output(&mut self, output: Output) {
        self.outputs.push(output);
    }

    /// Converts this transaction's outputs into spendable inputs for a
    /// subsequent `transfer`. Absent `indices` returns all outputs (spec
    /// §4.6).
    pub fn to_inputs(&self, indices: Option<&[usize]>) -> Result<Vec<Input>, TxError> {
        let id = self.id();
        let selected: Vec<usize> = match indices {
            Some(idx) => idx.to_vec(),
            None => (0..self.outputs.len()).collect(),
        };
        selected
            .into_iter()
            .map(|idx| {
                let output = self
                    .outputs
                    .get(idx)
                    .ok_or_else(|| TxError::ParseError(format!("no output at index {idx}")))?;
                Input::new(
                    output.condition().clone(),
                    output
                        .public_keys()
                        .map(|ks| ks.to_vec())
                        .unwrap_or_default(),
                    crate::link::TransactionLink::new(id.clone(), idx as u64),
                )
            })
            .collect()
    }

    /// The id of each transaction is `tx.id()` when CREATE/GENESIS, else
    /// `tx.asset()["id"]`. Fails with `AssetIdMismatch` if more than one
    /// distinct value is observed (spec §4.6).
    pub fn get_asset_id(transactions: &[&Transaction]) -> Result<String, TxError> {
        let ids: HashSet<String> = transactions
            .iter()
            .map(|tx| match tx.operation {
                Operation::Create | Operation::Genesis => tx.id(),
                Operation::Transfer => tx
                    .asset
                    .asset_id()
                    .map(|s| s.to_string())
                    .unwrap_or_default(),
            })
            .collect();
        if ids.len() > 1 {
            return Err(TxError::AssetIdMismatch);
        }
        ids.into_iter()
            .next()
            .ok_or(TxError::AssetIdMismatch)
    }

    /// `SHA3-256(canonical_serialize(signature_stripped_body))`, hex-encoded
    /// (spec §3 identity invariant). Recomputed on every call rather than
    /// cached, so it always reflects the transaction's current state.
    pub fn id(&self) -> String {
        codec::compute_id(&self.to_value_without_id())
    }

    fn to_value_without_id(&self) -> Value {
        let mut map = Map::new();
        map.insert("version".into(), Value::String(self.version.clone()));
        map.insert(
            "operation".into(),
            Value::String(self.operation.as_str().to_string()),
        );
        map.insert("asset".into(), self.asset.to_value());
        map.insert(
            "metadata".into(),
            self.metadata.clone().unwrap_or(Value::Null),
        );
        map.insert(
            "inputs".into(),
            Value::Array(
                self.inputs
                    .iter()
                    .map(Input::to_value)
                    .collect::<Result<Vec<_>, _>>()
                    .expect("inputs constructed by this crate always serialize"),
            ),
        );
        map.insert(
            "outputs".into(),
            Value::Array(self.outputs.iter().map(Output::to_detail_map).map(Value::Object).collect()),
        );
        Value::Object(map)
    }

    /// The full canonical envelope, including `id` (spec §6).
    pub fn to_value(&self) -> Value {
        let mut value = self.to_value_without_id();
        value["id"] = Value::String(self.id());
        value
    }

    /// Removes the declared `id`, recomputes it per spec §4.5, and fails
    /// with `TxError::InvalidHash` on mismatch or absence, then parses the
    /// rest of the envelope (spec §4.8 `from_dict`/`validate_id`).
    pub fn from_value(value: &Value) -> Result<Self, TxError> {
        codec::validate_id(value)?;

        let version = value
            .get("version")
            .and_then(Value::as_str)
            .ok_or_else(|| TxError::ParseError("transaction missing `version`".into()))?
            .to_string();
        if version != TX_VERSION {
            return Err(TxError::VersionMismatch(version));
        }

        let operation = Operation::from_str(
            value
                .get("operation")
                .and_then(Value::as_str)
                .ok_or_else(|| TxError::ParseError("transaction missing `operation`".into()))?,
        )?;

        let asset = AssetPayload::from_value(
            operation,
            value.get("asset").ok_or_else(|| {
                TxError::ParseError("transaction missing `asset`".into())
            })?,
        )?;

        let inputs = value
            .get("inputs")
            .and_then(Value::as_array)
            .ok_or_else(|| TxError::ParseError("transaction missing `inputs`".into()))?
            .iter()
            .map(Input::from_value)
            .collect::<Result<Vec<_>, _>>()?;

        let outputs = value
            .get("outputs")
            .and_then(Value::as_array)
            .ok_or_else(|| TxError::ParseError("transaction missing `outputs`".into()))?
            .iter()
            .map(|v| {
                v.as_object()
                    .ok_or_else(|| TxError::ParseError("output must be an object".into()))
                    .and_then(Output::from_detail_map)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let metadata = match value.get("metadata") {
            Some(Value::Null) | None => None,
            Some(v) => Some(v.clone()),
        };

        Self::new(operation, asset, inputs, outputs, metadata)
    }

    pub(crate) fn with_single_input(&self, input: &Input) -> Transaction {
        Transaction {
            version: self.version.clone(),
            operation: self.operation,
            asset: self.asset.clone(),
            inputs: vec![input.clone()],
            outputs: self.outputs.clone(),
            metadata: self.metadata.clone(),
        }
    }
}

fn validate_asset_matches_operation(
    operation: Operation,
    asset: &AssetPayload,
) -> Result<(), TxError> {
    match (operation, asset) {
        (Operation::Create | Operation::Genesis, AssetPayload::Null | AssetPayload::Data(_)) => {
            Ok(())
        }
        (Operation::Transfer, AssetPayload::Id(_)) => Ok(()),
        _ => Err(TxError::InvalidAsset(
            "asset payload shape does not match operation".into(),
        )),
    }
}
