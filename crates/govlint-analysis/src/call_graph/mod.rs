//! Call graph resolver: transitive same-file callee resolution.

pub mod index;
pub mod traversal;

pub use index::MethodIndex;
pub use traversal::{reachable_data_operations, reachable_queries, Reached};
