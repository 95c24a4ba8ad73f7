//! A dynamic, k-dimensional point index with bucketed leaves.
//!
//! Supports insertion, removal, and membership tests in logarithmic time
//! alongside nearest-neighbor, radius, bounding-box, and single-dimension
//! range searches, plus majority-vote classification and mean regression
//! derived from either neighborhood kind.

#![warn(missing_docs)]

mod index;
mod node;
mod search;
mod r#trait;

pub use index::{Iter, KDTree, DEFAULT_LEAF_CAPACITY};
pub use r#trait::PointSet;
