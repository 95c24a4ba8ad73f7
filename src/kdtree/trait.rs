/// The capability set of a mutable point collection.
///
/// [`KDTree`][crate::kdtree::KDTree] implements this as its mutation and
/// membership surface. The bulk operations have default implementations in
/// terms of the single-point ones; `retain_all` is required because it needs
/// to enumerate the collection.
pub trait PointSet<P: PartialEq> {
    /// Add a point to this collection. Duplicates are kept.
    fn add(&mut self, point: P);

    /// Remove one occurrence of the given point, if present.
    ///
    /// Returns whether the collection changed.
    fn remove(&mut self, point: &P) -> bool;

    /// Whether this collection contains the given point.
    fn contains(&self, point: &P) -> bool;

    /// The number of points in this collection, duplicates included.
    fn len(&self) -> usize;

    /// Remove every point from this collection.
    fn clear(&mut self);

    /// Keep only the points contained in `keep`, removing everything else.
    ///
    /// Returns whether the collection changed.
    fn retain_all(&mut self, keep: &[P]) -> bool
    where
        P: Clone;

    /// Whether this collection holds no points.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Add every point in the iterator to this collection.
    ///
    /// Returns whether the collection changed.
    fn add_all<I>(&mut self, points: I) -> bool
    where
        I: IntoIterator<Item = P>,
        Self: Sized,
    {
        let mut changed = false;
        for point in points {
            self.add(point);
            changed = true;
        }
        changed
    }

    /// Whether this collection contains every point in the iterator.
    fn contains_all<'a, I>(&self, points: I) -> bool
    where
        I: IntoIterator<Item = &'a P>,
        P: 'a,
        Self: Sized,
    {
        points.into_iter().all(|point| self.contains(point))
    }

    /// Remove every occurrence (duplicates included) of every point in the
    /// iterator.
    ///
    /// Returns whether the collection changed.
    fn remove_all<'a, I>(&mut self, points: I) -> bool
    where
        I: IntoIterator<Item = &'a P>,
        P: 'a,
        Self: Sized,
    {
        let mut changed = false;
        for point in points {
            while self.remove(point) {
                changed = true;
            }
        }
        changed
    }
}
