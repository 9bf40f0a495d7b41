//! Re-exports of performance-oriented collection types.

pub use rustc_hash::{FxHashMap, FxHashSet};
pub use smallvec::SmallVec;

/// SmallVec for name lookups that almost always resolve to one or two
/// entries (overloads).
pub type SmallVec2<T> = SmallVec<[T; 2]>;
