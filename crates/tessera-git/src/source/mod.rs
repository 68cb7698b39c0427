//! Configuration queries.

mod query;

pub use query::ConfigQuery;
