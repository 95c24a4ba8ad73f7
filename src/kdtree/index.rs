use crate::error::{KdIndexError, Result};
use crate::kdtree::node::{build, find_leaf, find_leaf_mut, split_node, Node};
use crate::kdtree::r#trait::PointSet;
use crate::point::KdCoord;

/// The default maximum number of points per leaf.
pub const DEFAULT_LEAF_CAPACITY: usize = 5;

/// A dynamic k-dimensional tree over points of type `P`, measuring distance
/// with a metric of type `M`.
///
/// All points live in leaf buckets of at most [`leaf_capacity`] members; an
/// over-full bucket is split on the dimension that most closely halves it.
/// The tree is relatively balanced after construction but insertions and
/// removals do not rebalance it, so heavy churn gradually degrades query
/// performance; rebuild from the current point set when that matters.
/// Duplicate points are stored and counted, and a bucket of pure duplicates
/// may exceed the leaf capacity since no dimension can separate it.
///
/// Mutation goes through the [`PointSet`] trait; the search entry points
/// ([`knn`], [`radius_search`], [`points_in_box`], [`points_in_range`] and
/// the classification/regression wrappers) are inherent methods and never
/// mutate the tree.
///
/// [`leaf_capacity`]: KDTree::leaf_capacity
/// [`knn`]: KDTree::knn
/// [`radius_search`]: KDTree::radius_search
/// [`points_in_box`]: KDTree::points_in_box
/// [`points_in_range`]: KDTree::points_in_range
#[derive(Debug, Clone)]
pub struct KDTree<P, M> {
    pub(crate) root: Node<P>,
    pub(crate) dims: usize,
    pub(crate) leaf_capacity: usize,
    pub(crate) metric: M,
    pub(crate) len: usize,
    pub(crate) snapshot: Option<Vec<P>>,
}

impl<P: KdCoord, M> KDTree<P, M> {
    /// Build a tree over the given points with the default leaf capacity.
    ///
    /// Errors if `dims` is zero or any point declares fewer than `dims`
    /// dimensions.
    pub fn new<I>(points: I, dims: usize, metric: M) -> Result<Self>
    where
        I: IntoIterator<Item = P>,
    {
        Self::with_leaf_capacity(points, dims, DEFAULT_LEAF_CAPACITY, metric)
    }

    /// Build a tree over the given points with the given leaf capacity.
    ///
    /// Errors if `dims` or `leaf_capacity` is zero, or any point declares
    /// fewer than `dims` dimensions.
    pub fn with_leaf_capacity<I>(
        points: I,
        dims: usize,
        leaf_capacity: usize,
        metric: M,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = P>,
    {
        if dims < 1 {
            return Err(KdIndexError::ZeroDimensions);
        }
        if leaf_capacity < 1 {
            return Err(KdIndexError::ZeroLeafCapacity);
        }
        let bucket: Vec<P> = points.into_iter().collect();
        for point in &bucket {
            if point.dims() < dims {
                return Err(KdIndexError::PointDimensions {
                    required: dims,
                    actual: point.dims(),
                });
            }
        }
        let len = bucket.len();
        let mut root = Node::leaf(0, bucket);
        build(&mut root, dims, leaf_capacity);
        Ok(Self {
            root,
            dims,
            leaf_capacity,
            metric,
            len,
            snapshot: None,
        })
    }

    /// The number of dimensions of this tree.
    pub fn dims(&self) -> usize {
        self.dims
    }

    /// The maximum number of points per leaf.
    pub fn leaf_capacity(&self) -> usize {
        self.leaf_capacity
    }

    /// The distance metric this tree was built with.
    pub fn metric(&self) -> &M {
        &self.metric
    }

    /// Iterate over the points of this tree, leaves left to right.
    ///
    /// The order reflects tree structure, not insertion order, and is not
    /// sorted on any single dimension (except in the degenerate `dims == 1`
    /// case, where the tree is essentially a binary search tree).
    pub fn iter(&self) -> Iter<'_, P> {
        Iter {
            stack: vec![&self.root],
            bucket: &[],
        }
    }

    /// A flat list of every point in this tree, in iteration order.
    ///
    /// The list is served from a lazily rebuilt snapshot that every mutation
    /// invalidates; callers receive their own copy and changes to it never
    /// affect the tree.
    pub fn to_vec(&mut self) -> Vec<P>
    where
        P: Clone,
    {
        if self.snapshot.is_none() {
            let points: Vec<P> = self.iter().cloned().collect();
            self.snapshot = Some(points);
        }
        self.snapshot.clone().unwrap_or_default()
    }
}

impl<P, M> PointSet<P> for KDTree<P, M>
where
    P: KdCoord + PartialEq,
{
    /// Add a point to this tree. Duplicate points are stored.
    ///
    /// The point must declare at least as many dimensions as the tree; this
    /// is the same construction-time precondition [`KDTree::new`] checks and
    /// is only debug-asserted here.
    fn add(&mut self, point: P) {
        debug_assert!(
            point.dims() >= self.dims,
            "point has {} dimensions but the tree requires {}",
            point.dims(),
            self.dims
        );
        let leaf = find_leaf_mut(&mut self.root, &point);
        let overflow = match leaf {
            Node::Leaf { bucket, .. } => {
                bucket.push(point);
                bucket.len() > self.leaf_capacity
            }
            Node::Internal { .. } => unreachable!("descent always ends at a leaf"),
        };
        if overflow {
            split_node(leaf, self.dims);
        }
        self.len += 1;
        self.snapshot = None;
    }

    fn remove(&mut self, point: &P) -> bool {
        let leaf = find_leaf_mut(&mut self.root, point);
        if let Node::Leaf { bucket, .. } = leaf {
            if let Some(at) = bucket.iter().position(|member| member == point) {
                bucket.remove(at);
                self.len -= 1;
                self.snapshot = None;
                return true;
            }
        }
        false
    }

    fn contains(&self, point: &P) -> bool {
        match find_leaf(&self.root, point) {
            Node::Leaf { bucket, .. } => bucket.iter().any(|member| member == point),
            Node::Internal { .. } => false,
        }
    }

    fn len(&self) -> usize {
        self.len
    }

    fn clear(&mut self) {
        self.root = Node::leaf(0, Vec::new());
        self.len = 0;
        self.snapshot = None;
    }

    fn retain_all(&mut self, keep: &[P]) -> bool
    where
        P: Clone,
    {
        let to_remove: Vec<P> = self
            .iter()
            .filter(|point| !keep.contains(*point))
            .cloned()
            .collect();
        self.remove_all(&to_remove)
    }
}

impl<P, M> Extend<P> for KDTree<P, M>
where
    P: KdCoord + PartialEq,
{
    fn extend<I: IntoIterator<Item = P>>(&mut self, points: I) {
        for point in points {
            self.add(point);
        }
    }
}

/// Iterator over the points of a [`KDTree`], leaves left to right.
#[derive(Debug)]
pub struct Iter<'a, P> {
    stack: Vec<&'a Node<P>>,
    bucket: &'a [P],
}

impl<'a, P> Iterator for Iter<'a, P> {
    type Item = &'a P;

    fn next(&mut self) -> Option<&'a P> {
        loop {
            if let Some((point, rest)) = self.bucket.split_first() {
                self.bucket = rest;
                return Some(point);
            }
            match self.stack.pop()? {
                Node::Leaf { bucket, .. } => self.bucket = bucket,
                Node::Internal { left, right, .. } => {
                    self.stack.push(right.as_ref());
                    self.stack.push(left.as_ref());
                }
            }
        }
    }
}

impl<'a, P, M> IntoIterator for &'a KDTree<P, M>
where
    P: KdCoord,
{
    type Item = &'a P;
    type IntoIter = Iter<'a, P>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
