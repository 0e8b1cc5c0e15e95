//! Transaction model for a content-addressed, signature-based asset ledger:
//! `Output`/`Input`/`TransactionLink` primitives, the canonical codec,
//! transaction construction, multi-input signing, and validation.

pub mod codec;
pub mod error;
pub mod input;
pub mod link;
pub mod output;
pub mod transaction;

pub use error::TxError;
pub use input::Input;
pub use link::TransactionLink;
pub use output::{Output, OwnerSpec, MAX_AMOUNT};
pub use transaction::{inputs_valid, AssetPayload, Operation, Transaction, TX_VERSION};
