use std::collections::{BinaryHeap, HashMap};
use std::hash::Hash;

use tinyvec::TinyVec;

use crate::distance::DistanceMetric;
use crate::error::{KdIndexError, Result};
use crate::kdtree::node::{collect_points, Node};
use crate::kdtree::KDTree;
use crate::point::KdCoord;

/// How a query region relates to the set of points reachable from a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Overlap {
    /// Disjoint: the subtree can be skipped.
    None,
    /// Every reachable point satisfies the query: harvest without checks.
    Complete,
    /// Mixed: descend further, or hand-check leaf members.
    Partial,
}

// Per-descent restriction buffers; stack-allocated for the common low
// dimension counts.
type Bounds = TinyVec<[f64; 8]>;

/// Classify a query box against a node's bounding restrictions, both given
/// as `min, max` pairs per dimension.
pub(crate) fn overlap_type(query: &[f64], restrictions: &[f64]) -> Overlap {
    let k = query.len() / 2;
    let mut subset = true;
    for i in 0..k {
        let qmin = query[i * 2];
        let qmax = query[i * 2 + 1];
        let rmin = restrictions[i * 2];
        let rmax = restrictions[i * 2 + 1];
        if qmin <= rmax && rmin <= qmax {
            if subset {
                subset = qmin < rmin && qmax > rmax;
            }
        } else {
            return Overlap::None;
        }
    }
    if subset {
        Overlap::Complete
    } else {
        Overlap::Partial
    }
}

/// A point paired with its distance from a query center.
#[derive(Debug)]
struct Neighbor<'a, P> {
    dist: f64,
    point: &'a P,
}

impl<P> PartialEq for Neighbor<'_, P> {
    fn eq(&self, other: &Self) -> bool {
        self.dist.total_cmp(&other.dist).is_eq()
    }
}

impl<P> Eq for Neighbor<'_, P> {}

impl<P> PartialOrd for Neighbor<'_, P> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<P> Ord for Neighbor<'_, P> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.dist.total_cmp(&other.dist)
    }
}

impl<P, M> KDTree<P, M>
where
    P: KdCoord,
    M: DistanceMetric,
{
    /// Calculate the distance between two points using this tree's metric.
    pub fn distance<A, B>(&self, a: &A, b: &B) -> f64
    where
        A: KdCoord + ?Sized,
        B: KdCoord + ?Sized,
    {
        self.metric.distance(a, b)
    }

    /// Find the `k` points nearest to `center`, closest first.
    ///
    /// `k == 0` returns an empty list; `k` greater than the number of points
    /// in the tree is an error.
    pub fn knn<C>(&self, center: &C, k: usize) -> Result<Vec<&P>>
    where
        C: KdCoord + ?Sized,
    {
        if k == 0 {
            return Ok(Vec::new());
        }
        if k > self.len {
            return Err(KdIndexError::KExceedsSize { k, len: self.len });
        }
        let restrictions: Bounds = (0..center.dims()).map(|d| center.coord(d)).collect();
        let mut neighbors = BinaryHeap::with_capacity(k);
        self.knn_aux(center, k, &self.root, &restrictions, &mut neighbors);
        Ok(neighbors
            .into_sorted_vec()
            .into_iter()
            .map(|neighbor| neighbor.point)
            .collect())
    }

    /// Find every point within `radius` of `center` (inclusive), closest
    /// first.
    ///
    /// A negative radius is an error.
    pub fn radius_search<C>(&self, center: &C, radius: f64) -> Result<Vec<&P>>
    where
        C: KdCoord + ?Sized,
    {
        if radius < 0.0 {
            return Err(KdIndexError::NegativeRadius(radius));
        }
        let restrictions: Bounds = (0..center.dims()).map(|d| center.coord(d)).collect();
        let mut within = Vec::new();
        self.radius_aux(center, radius, &self.root, &restrictions, &mut within);
        within.sort();
        Ok(within.into_iter().map(|neighbor| neighbor.point).collect())
    }

    /// Find every point inside the given axis-aligned box.
    ///
    /// The box is `min, max` pairs per dimension
    /// (`min0, max0, min1, max1, …`), all bounds inclusive, so its length
    /// must be twice the tree's dimension count. Unbounded dimensions can
    /// pass `f64::NEG_INFINITY`/`f64::INFINITY`. The result is in no
    /// particular order.
    pub fn points_in_box(&self, bounds: &[f64]) -> Result<Vec<&P>> {
        if bounds.len() != self.dims * 2 {
            return Err(KdIndexError::BoxBounds {
                required: self.dims * 2,
                actual: bounds.len(),
            });
        }
        let mut restrictions: Bounds = Bounds::new();
        for _ in 0..self.dims {
            restrictions.push(f64::NEG_INFINITY);
            restrictions.push(f64::INFINITY);
        }
        let mut collector = Vec::new();
        self.box_aux(&self.root, bounds, &restrictions, &mut collector);
        Ok(collector)
    }

    /// Find every point whose coordinate on `dim` lies in `[min, max]`
    /// (inclusive).
    ///
    /// `dim` must be below the tree's dimension count. The result is in no
    /// particular order.
    pub fn points_in_range(&self, dim: usize, min: f64, max: f64) -> Result<Vec<&P>> {
        if dim >= self.dims {
            return Err(KdIndexError::DimensionOutOfBounds {
                dim,
                dims: self.dims,
            });
        }
        let bounds = [min, max];
        let restrictions = [f64::NEG_INFINITY, f64::INFINITY];
        let mut collector = Vec::new();
        self.range_aux(&self.root, dim, &bounds, &restrictions, &mut collector);
        Ok(collector)
    }

    /// Majority-vote classification of `center` by its `k` nearest
    /// neighbors.
    ///
    /// Each neighbor is mapped to a label; the label(s) with the highest
    /// count are returned, all of them when tied, in no particular order.
    pub fn knn_classify<C, T, F>(&self, center: &C, k: usize, mapper: F) -> Result<Vec<T>>
    where
        C: KdCoord + ?Sized,
        T: Eq + Hash,
        F: FnMut(&P) -> T,
    {
        Ok(majority_vote(self.knn(center, k)?.into_iter().map(mapper)))
    }

    /// Mean regression of `center` over its `k` nearest neighbors.
    ///
    /// Each neighbor is mapped to a number and the mean is returned, or NaN
    /// when there were no neighbors to average.
    pub fn knn_regression<C, F>(&self, center: &C, k: usize, mapper: F) -> Result<f64>
    where
        C: KdCoord + ?Sized,
        F: FnMut(&P) -> f64,
    {
        Ok(mean(self.knn(center, k)?.into_iter().map(mapper)))
    }

    /// Majority-vote classification of `center` by every point within
    /// `radius` of it.
    ///
    /// Each neighbor is mapped to a label; the label(s) with the highest
    /// count are returned, all of them when tied, in no particular order.
    pub fn radius_classify<C, T, F>(&self, center: &C, radius: f64, mapper: F) -> Result<Vec<T>>
    where
        C: KdCoord + ?Sized,
        T: Eq + Hash,
        F: FnMut(&P) -> T,
    {
        Ok(majority_vote(
            self.radius_search(center, radius)?.into_iter().map(mapper),
        ))
    }

    /// Mean regression of `center` over every point within `radius` of it.
    ///
    /// Each neighbor is mapped to a number and the mean is returned, or NaN
    /// when there were no neighbors to average.
    pub fn radius_regression<C, F>(&self, center: &C, radius: f64, mapper: F) -> Result<f64>
    where
        C: KdCoord + ?Sized,
        F: FnMut(&P) -> f64,
    {
        Ok(mean(
            self.radius_search(center, radius)?.into_iter().map(mapper),
        ))
    }

    fn knn_aux<'t, C>(
        &'t self,
        center: &C,
        k: usize,
        node: &'t Node<P>,
        restrictions: &Bounds,
        neighbors: &mut BinaryHeap<Neighbor<'t, P>>,
    ) where
        C: KdCoord + ?Sized,
    {
        match node {
            Node::Leaf { bucket, .. } => {
                for point in bucket {
                    let dist = self.metric.distance(center, point);
                    if neighbors.len() < k {
                        neighbors.push(Neighbor { dist, point });
                    } else if neighbors.peek().is_some_and(|worst| dist < worst.dist) {
                        neighbors.pop();
                        neighbors.push(Neighbor { dist, point });
                    }
                }
            }
            Node::Internal {
                dim, split, left, right,
            } => {
                let went_right = center.coord(*dim) > *split;
                let (near, far) = if went_right {
                    (right, left)
                } else {
                    (left, right)
                };
                self.knn_aux(center, k, near, restrictions, neighbors);
                // Distance from the center to the k-th best so far; the
                // sibling half-space only matters if the splitting plane is
                // closer than that (or the heap is not yet full).
                let bound = neighbors
                    .peek()
                    .map_or(f64::INFINITY, |worst| worst.dist);
                let mut tightened = restrictions.clone();
                tightened[*dim] = *split;
                let plane: &[f64] = &tightened;
                if self.metric.distance(center, plane) < bound || neighbors.len() < k {
                    self.knn_aux(center, k, far, &tightened, neighbors);
                }
            }
        }
    }

    fn radius_aux<'t, C>(
        &'t self,
        center: &C,
        radius: f64,
        node: &'t Node<P>,
        restrictions: &Bounds,
        within: &mut Vec<Neighbor<'t, P>>,
    ) where
        C: KdCoord + ?Sized,
    {
        match node {
            Node::Leaf { bucket, .. } => {
                for point in bucket {
                    let dist = self.metric.distance(center, point);
                    if dist <= radius {
                        within.push(Neighbor { dist, point });
                    }
                }
            }
            Node::Internal {
                dim, split, left, right,
            } => {
                let went_right = center.coord(*dim) > *split;
                let (near, far) = if went_right {
                    (right, left)
                } else {
                    (left, right)
                };
                self.radius_aux(center, radius, near, restrictions, within);
                let mut tightened = restrictions.clone();
                tightened[*dim] = *split;
                let plane: &[f64] = &tightened;
                if self.metric.distance(center, plane) <= radius {
                    self.radius_aux(center, radius, far, &tightened, within);
                }
            }
        }
    }

    fn box_aux<'t>(
        &'t self,
        node: &'t Node<P>,
        bounds: &[f64],
        restrictions: &Bounds,
        collector: &mut Vec<&'t P>,
    ) {
        match overlap_type(bounds, restrictions) {
            Overlap::None => {}
            Overlap::Complete => collect_points(node, collector),
            Overlap::Partial => match node {
                Node::Leaf { bucket, .. } => hand_pick(bucket, bounds, collector),
                Node::Internal {
                    dim, split, left, right,
                } => {
                    let mut tighter = restrictions.clone();
                    tighter[dim * 2 + 1] = *split;
                    self.box_aux(left, bounds, &tighter, collector);
                    let mut tighter = restrictions.clone();
                    tighter[dim * 2] = *split;
                    self.box_aux(right, bounds, &tighter, collector);
                }
            },
        }
    }

    fn range_aux<'t>(
        &'t self,
        node: &'t Node<P>,
        dim: usize,
        bounds: &[f64; 2],
        restrictions: &[f64; 2],
        collector: &mut Vec<&'t P>,
    ) {
        match overlap_type(bounds, restrictions) {
            Overlap::None => {}
            Overlap::Complete => collect_points(node, collector),
            Overlap::Partial => match node {
                Node::Leaf { bucket, .. } => collector.extend(bucket.iter().filter(|point| {
                    let coord = point.coord(dim);
                    coord >= bounds[0] && coord <= bounds[1]
                })),
                Node::Internal {
                    dim: node_dim,
                    split,
                    left,
                    right,
                } => {
                    // Only a node splitting on the queried dimension tightens
                    // the restriction; any other split says nothing about it.
                    if *node_dim == dim {
                        self.range_aux(left, dim, bounds, &[restrictions[0], *split], collector);
                        self.range_aux(right, dim, bounds, &[*split, restrictions[1]], collector);
                    } else {
                        self.range_aux(left, dim, bounds, restrictions, collector);
                        self.range_aux(right, dim, bounds, restrictions, collector);
                    }
                }
            },
        }
    }
}

/// Check each bucket member against all dimensions of the box.
fn hand_pick<'a, P: KdCoord>(bucket: &'a [P], bounds: &[f64], collector: &mut Vec<&'a P>) {
    let k = bounds.len() / 2;
    'members: for point in bucket {
        for i in 0..k {
            let coord = point.coord(i);
            if coord < bounds[i * 2] || coord > bounds[i * 2 + 1] {
                continue 'members;
            }
        }
        collector.push(point);
    }
}

/// The label(s) with the highest count, all of them when tied.
fn majority_vote<T, I>(labels: I) -> Vec<T>
where
    T: Eq + Hash,
    I: IntoIterator<Item = T>,
{
    let mut tally: HashMap<T, usize> = HashMap::new();
    for label in labels {
        *tally.entry(label).or_insert(0) += 1;
    }
    let max = tally.values().copied().max().unwrap_or(0);
    tally
        .into_iter()
        .filter(|&(_, count)| count == max)
        .map(|(label, _)| label)
        .collect()
}

/// The mean of the values, or NaN when there are none.
fn mean<I: IntoIterator<Item = f64>>(values: I) -> f64 {
    let mut total = 0.0;
    let mut count = 0usize;
    for value in values {
        total += value;
        count += 1;
    }
    if count == 0 {
        f64::NAN
    } else {
        total / count as f64
    }
}
