pub mod detail_map;
pub mod error;
pub mod tree;
pub mod uri;

pub use detail_map::{from_detail_map, to_detail_map, DetailMap};
pub use error::ConditionError;
pub use tree::ConditionNode;
pub use uri::{condition_uri, fulfillment_uri, parse_fulfillment_uri};
