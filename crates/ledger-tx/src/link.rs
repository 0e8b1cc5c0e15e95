//! `TransactionLink` (spec §3, §4.2): a unidirectional `(txid, output_index)`
//! reference, or the empty link (serialized as JSON `null`).

use serde_json::{Map, Value};

use crate::error::TxError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransactionLink {
    txid: Option<String>,
    output_index: Option<u64>,
}

impl TransactionLink {
    pub fn new(txid: String, output_index: u64) -> Self {
        Self {
            txid: Some(txid),
            output_index: Some(output_index),
        }
    }

    pub const fn empty() -> Self {
        Self {
            txid: None,
            output_index: None,
        }
    }

    /// Truthy iff both fields are present (spec §3).
    pub fn is_present(&self) -> bool {
        self.txid.is_some() && self.output_index.is_some()
    }

    pub fn txid(&self) -> Option<&str> {
        self.txid.as_deref()
    }

    pub fn output_index(&self) -> Option<u64> {
        self.output_index
    }

    pub fn to_map(&self) -> Option<Map<String, Value>> {
        if !self.is_present() {
            return None;
        }
        let mut map = Map::new();
        map.insert(
            "txid".into(),
            Value::String(self.txid.clone().expect("checked present")),
        );
        map.insert(
            "output".into(),
            Value::from(self.output_index.expect("checked present")),
        );
        Some(map)
    }

    pub fn from_value(value: &Value) -> Result<Self, TxError> {
        match value {
            Value::Null => Ok(Self::empty()),
            Value::Object(map) => {
                let txid = map
                    .get("txid")
                    .and_then(Value::as_str)
                    .ok_or_else(|| TxError::ParseError("fulfills missing `txid`".into()))?
                    .to_string();
                let output_index = map
                    .get("output")
                    .and_then(Value::as_u64)
                    .ok_or_else(|| TxError::ParseError("fulfills missing `output`".into()))?;
                Ok(Self::new(txid, output_index))
            }
            _ => Err(TxError::ParseError(
                "`fulfills` must be an object or null".into(),
            )),
        }
    }

    /// Renders as `"{prefix}/transactions/{txid}/outputs/{index}"`, or
    /// `None` for the empty link (spec §4.2).
    pub fn to_uri(&self, prefix: &str) -> Option<String> {
        if !self.is_present() {
            return None;
        }
        Some(format!(
            "{}/transactions/{}/outputs/{}",
            prefix,
            self.txid.as_ref().unwrap(),
            self.output_index.unwrap()
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_link_round_trips_through_null() {
        let link = TransactionLink::empty();
        assert!(link.to_map().is_none());
        assert_eq!(TransactionLink::from_value(&Value::Null).unwrap(), link);
        assert!(link.to_uri("").is_none());
    }

    #[test]
    fn present_link_round_trips() {
        let link = TransactionLink::new("abc123".into(), 2);
        let map = link.to_map().unwrap();
        let value = Value::Object(map);
        let parsed = TransactionLink::from_value(&value).unwrap();
        assert_eq!(parsed, link);
        assert_eq!(
            link.to_uri("bdb://node"),
            Some("bdb://node/transactions/abc123/outputs/2".to_string())
        );
    }
}
