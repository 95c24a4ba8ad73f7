use std::fmt;
use std::hash::{Hash, Hasher};

/// The minimal contract a stored point (or query center) must satisfy.
///
/// A point is a read-only vector of `f64` coordinates. Coordinates are
/// addressed by dimension index; a tree built over `k` dimensions only ever
/// reads indices `0..k`, so a point may declare more dimensions than the tree
/// uses, never fewer.
///
/// Richer payload types can be stored in a tree by implementing this trait
/// next to their own data; see [`KdPoint`] for the plain-coordinates case.
pub trait KdCoord {
    /// The coordinate for the given dimension.
    fn coord(&self, dim: usize) -> f64;

    /// The number of dimensions this point carries.
    fn dims(&self) -> usize;
}

/// An immutable point in k-dimensional space.
///
/// Coordinates are fixed at construction. Equality and hashing are structural
/// and bitwise per coordinate, so `NaN == NaN` and `0.0 != -0.0`; two points
/// compare equal exactly when they carry identical coordinate bit patterns.
#[derive(Debug, Clone)]
pub struct KdPoint {
    coords: Vec<f64>,
}

impl KdPoint {
    /// Create a new point from its coordinates.
    ///
    /// # Panics
    ///
    /// Panics if `coords` is empty.
    pub fn new(coords: impl Into<Vec<f64>>) -> Self {
        let coords = coords.into();
        assert!(!coords.is_empty(), "a point needs at least one coordinate");
        Self { coords }
    }

    /// All coordinates of this point.
    pub fn coords(&self) -> &[f64] {
        &self.coords
    }
}

impl KdCoord for KdPoint {
    #[inline]
    fn coord(&self, dim: usize) -> f64 {
        self.coords[dim]
    }

    #[inline]
    fn dims(&self) -> usize {
        self.coords.len()
    }
}

impl PartialEq for KdPoint {
    fn eq(&self, other: &Self) -> bool {
        self.coords.len() == other.coords.len()
            && self
                .coords
                .iter()
                .zip(&other.coords)
                .all(|(a, b)| a.to_bits() == b.to_bits())
    }
}

impl Eq for KdPoint {}

impl Hash for KdPoint {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for coord in &self.coords {
            state.write_u64(coord.to_bits());
        }
    }
}

impl fmt::Display for KdPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, coord) in self.coords.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{coord}")?;
        }
        write!(f, ")")
    }
}

impl KdCoord for [f64] {
    #[inline]
    fn coord(&self, dim: usize) -> f64 {
        self[dim]
    }

    #[inline]
    fn dims(&self) -> usize {
        self.len()
    }
}

impl<const N: usize> KdCoord for [f64; N] {
    #[inline]
    fn coord(&self, dim: usize) -> f64 {
        self[dim]
    }

    #[inline]
    fn dims(&self) -> usize {
        N
    }
}

impl KdCoord for Vec<f64> {
    #[inline]
    fn coord(&self, dim: usize) -> f64 {
        self[dim]
    }

    #[inline]
    fn dims(&self) -> usize {
        self.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;

    fn hash_of(point: &KdPoint) -> u64 {
        let mut hasher = DefaultHasher::new();
        point.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn equality_is_structural() {
        let a = KdPoint::new([1.0, 2.0, 3.0]);
        let b = KdPoint::new(vec![1.0, 2.0, 3.0]);
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));

        let c = KdPoint::new([1.0, 2.0]);
        assert_ne!(a, c);
    }

    #[test]
    fn equality_is_bitwise() {
        let nan = KdPoint::new([f64::NAN]);
        assert_eq!(nan, nan.clone());
        assert_ne!(KdPoint::new([0.0]), KdPoint::new([-0.0]));
    }

    #[test]
    fn displays_as_tuple() {
        let point = KdPoint::new([1.5, -2.0]);
        assert_eq!(point.to_string(), "(1.5,-2)");
    }

    #[test]
    #[should_panic]
    fn rejects_empty_coordinates() {
        KdPoint::new(Vec::<f64>::new());
    }
}
