use thiserror::Error;

/// Enum with all errors in this crate.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum KdIndexError {
    /// A tree was constructed with fewer than one dimension.
    #[error("dimension count must be at least 1")]
    ZeroDimensions,

    /// A tree was constructed with a leaf capacity below one.
    #[error("leaf capacity must be at least 1")]
    ZeroLeafCapacity,

    /// An input point declares fewer dimensions than the tree requires.
    #[error("point has {actual} dimensions but the tree requires {required}")]
    PointDimensions {
        /// The tree's dimension count.
        required: usize,
        /// The offending point's dimension count.
        actual: usize,
    },

    /// A nearest-neighbor query asked for more points than the tree holds.
    #[error("k ({k}) is greater than the number of points in the tree ({len})")]
    KExceedsSize {
        /// The requested neighbor count.
        k: usize,
        /// The number of points currently in the tree.
        len: usize,
    },

    /// A radius search was given a negative radius.
    #[error("radius must be non-negative, got {0}")]
    NegativeRadius(f64),

    /// A box search was given the wrong number of bounds.
    #[error("bounding box has {actual} bounds but the tree requires {required}")]
    BoxBounds {
        /// The expected bound count (twice the tree's dimension count).
        required: usize,
        /// The number of bounds supplied.
        actual: usize,
    },

    /// A range search named a dimension the tree does not have.
    #[error("dimension {dim} is out of bounds for a tree with {dims} dimensions")]
    DimensionOutOfBounds {
        /// The requested dimension.
        dim: usize,
        /// The tree's dimension count.
        dims: usize,
    },
}

pub type Result<T> = std::result::Result<T, KdIndexError>;
