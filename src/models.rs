mod ids;
mod scope;
mod tag;

pub use ids::TagId;
pub use scope::{PartitionKey, Scope, partition_key};
pub use tag::Tag;
