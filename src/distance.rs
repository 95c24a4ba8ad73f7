//! Distance metrics for spatial queries.
//!
//! A metric is a strategy object handed to the tree at construction and used
//! uniformly for building and for every search. Cartesian metrics are
//! k-dimensional; the great-circle metrics interpret dimension 0 as latitude
//! and dimension 1 as longitude, both in degrees, and return the central
//! angle in radians (scale with [`LatLonMetric::distance_km`] or
//! [`LatLonMetric::distance_mi`]).

use crate::point::KdCoord;

/// The Earth's volumetric mean radius in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// The Earth's volumetric mean radius in miles.
pub const EARTH_RADIUS_MI: f64 = 3959.0;

const LAT: usize = 0;
const LON: usize = 1;

/// A strategy for calculating the distance between two points.
///
/// Implementations must be non-negative and commutative. Branch-and-bound
/// pruning additionally assumes the metric is monotonic on axis-aligned
/// slabs: moving a coordinate of one argument toward the other argument's
/// coordinate never increases the distance. Every metric in this module
/// satisfies that; a metric that does not can return incomplete search
/// results.
pub trait DistanceMetric {
    /// Calculate the distance between two points.
    fn distance<A, B>(&self, a: &A, b: &B) -> f64
    where
        A: KdCoord + ?Sized,
        B: KdCoord + ?Sized;
}

/// k-dimensional Euclidean distance.
#[derive(Debug, Clone, Copy)]
pub struct Euclidean {
    k: usize,
}

impl Euclidean {
    /// Create a new Euclidean metric over the given number of dimensions.
    ///
    /// # Panics
    ///
    /// Panics if `k` is zero.
    pub fn new(k: usize) -> Self {
        assert!(k >= 1, "k must be greater than or equal to 1");
        Self { k }
    }
}

impl DistanceMetric for Euclidean {
    #[inline]
    fn distance<A, B>(&self, a: &A, b: &B) -> f64
    where
        A: KdCoord + ?Sized,
        B: KdCoord + ?Sized,
    {
        SquaredEuclidean { k: self.k }.distance(a, b).sqrt()
    }
}

/// k-dimensional squared Euclidean distance.
///
/// Orders points identically to [`Euclidean`] while skipping the square
/// root, which makes it the cheapest choice when only relative distances
/// matter (nearest-neighbor and classification queries).
#[derive(Debug, Clone, Copy)]
pub struct SquaredEuclidean {
    k: usize,
}

impl SquaredEuclidean {
    /// Create a new squared Euclidean metric over the given number of
    /// dimensions.
    ///
    /// # Panics
    ///
    /// Panics if `k` is zero.
    pub fn new(k: usize) -> Self {
        assert!(k >= 1, "k must be greater than or equal to 1");
        Self { k }
    }
}

impl DistanceMetric for SquaredEuclidean {
    #[inline]
    fn distance<A, B>(&self, a: &A, b: &B) -> f64
    where
        A: KdCoord + ?Sized,
        B: KdCoord + ?Sized,
    {
        let mut dist = 0.0;
        for i in 0..self.k {
            let d = a.coord(i) - b.coord(i);
            dist += d * d;
        }
        dist
    }
}

/// k-dimensional Manhattan distance.
#[derive(Debug, Clone, Copy)]
pub struct Manhattan {
    k: usize,
}

impl Manhattan {
    /// Create a new Manhattan metric over the given number of dimensions.
    ///
    /// # Panics
    ///
    /// Panics if `k` is zero.
    pub fn new(k: usize) -> Self {
        assert!(k >= 1, "k must be greater than or equal to 1");
        Self { k }
    }
}

impl DistanceMetric for Manhattan {
    #[inline]
    fn distance<A, B>(&self, a: &A, b: &B) -> f64
    where
        A: KdCoord + ?Sized,
        B: KdCoord + ?Sized,
    {
        (0..self.k).map(|i| (a.coord(i) - b.coord(i)).abs()).sum()
    }
}

/// k-dimensional Chebyshev distance.
#[derive(Debug, Clone, Copy)]
pub struct Chebyshev {
    k: usize,
}

impl Chebyshev {
    /// Create a new Chebyshev metric over the given number of dimensions.
    ///
    /// # Panics
    ///
    /// Panics if `k` is zero.
    pub fn new(k: usize) -> Self {
        assert!(k >= 1, "k must be greater than or equal to 1");
        Self { k }
    }
}

impl DistanceMetric for Chebyshev {
    #[inline]
    fn distance<A, B>(&self, a: &A, b: &B) -> f64
    where
        A: KdCoord + ?Sized,
        B: KdCoord + ?Sized,
    {
        (0..self.k)
            .map(|i| (a.coord(i) - b.coord(i)).abs())
            .fold(0.0, f64::max)
    }
}

/// Extension methods for metrics over latitude/longitude coordinates.
///
/// The base [`DistanceMetric::distance`] of these metrics is the central
/// angle in radians; these helpers scale it to a length on the Earth's
/// surface.
pub trait LatLonMetric: DistanceMetric {
    /// The distance between two latitude/longitude points, in kilometers.
    fn distance_km<A, B>(&self, a: &A, b: &B) -> f64
    where
        A: KdCoord + ?Sized,
        B: KdCoord + ?Sized,
    {
        self.distance(a, b) * EARTH_RADIUS_KM
    }

    /// The distance between two latitude/longitude points, in miles.
    fn distance_mi<A, B>(&self, a: &A, b: &B) -> f64
    where
        A: KdCoord + ?Sized,
        B: KdCoord + ?Sized,
    {
        self.distance(a, b) * EARTH_RADIUS_MI
    }
}

/// Haversine (great-circle) distance for latitude/longitude coordinates.
#[derive(Debug, Clone, Copy, Default)]
pub struct Haversine;

impl DistanceMetric for Haversine {
    fn distance<A, B>(&self, a: &A, b: &B) -> f64
    where
        A: KdCoord + ?Sized,
        B: KdCoord + ?Sized,
    {
        let lat1 = a.coord(LAT).to_radians();
        let lat2 = b.coord(LAT).to_radians();
        let dlat = lat2 - lat1;
        let dlon = (b.coord(LON) - a.coord(LON)).to_radians();
        let sin_lat = (dlat / 2.0).sin();
        let sin_lon = (dlon / 2.0).sin();
        let h = sin_lat * sin_lat + lat1.cos() * lat2.cos() * sin_lon * sin_lon;
        2.0 * h.sqrt().atan2((1.0 - h).sqrt())
    }
}

impl LatLonMetric for Haversine {}

/// Equirectangular-projection distance for latitude/longitude coordinates.
///
/// A flat-Earth approximation of [`Haversine`]: accurate for short
/// distances, cheaper to evaluate, and unaware of meridian wraparound.
#[derive(Debug, Clone, Copy, Default)]
pub struct Equirectangular;

impl DistanceMetric for Equirectangular {
    #[inline]
    fn distance<A, B>(&self, a: &A, b: &B) -> f64
    where
        A: KdCoord + ?Sized,
        B: KdCoord + ?Sized,
    {
        SquaredEquirectangular.distance(a, b).sqrt()
    }
}

impl LatLonMetric for Equirectangular {}

/// Squared equirectangular-projection distance for latitude/longitude
/// coordinates.
///
/// Orders points identically to [`Equirectangular`] without the square root.
#[derive(Debug, Clone, Copy, Default)]
pub struct SquaredEquirectangular;

impl DistanceMetric for SquaredEquirectangular {
    fn distance<A, B>(&self, a: &A, b: &B) -> f64
    where
        A: KdCoord + ?Sized,
        B: KdCoord + ?Sized,
    {
        let lat1 = a.coord(LAT).to_radians();
        let lat2 = b.coord(LAT).to_radians();
        let x = (b.coord(LON) - a.coord(LON)).to_radians() * ((lat1 + lat2) / 2.0).cos();
        let y = lat2 - lat1;
        x * x + y * y
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    const NEW_YORK: [f64; 2] = [40.7, -74.0];
    const LONDON: [f64; 2] = [51.5, -0.1];

    #[test]
    fn euclidean_distance() {
        let metric = Euclidean::new(2);
        assert_relative_eq!(metric.distance(&[0.0, 0.0], &[3.0, 4.0]), 5.0);
    }

    #[test]
    fn squared_euclidean_is_square_of_euclidean() {
        let squared = SquaredEuclidean::new(3);
        let plain = Euclidean::new(3);
        let a = [1.0, -2.0, 0.5];
        let b = [4.0, 1.0, -1.5];
        assert_relative_eq!(
            squared.distance(&a, &b),
            plain.distance(&a, &b).powi(2),
            max_relative = 1e-12
        );
    }

    #[test]
    fn manhattan_distance() {
        let metric = Manhattan::new(2);
        assert_relative_eq!(metric.distance(&[1.0, 1.0], &[4.0, -3.0]), 7.0);
    }

    #[test]
    fn chebyshev_distance() {
        let metric = Chebyshev::new(3);
        assert_relative_eq!(metric.distance(&[1.0, 1.0, 1.0], &[4.0, -3.0, 2.0]), 4.0);
    }

    #[test]
    fn metrics_are_commutative() {
        let a = [12.5, -3.0];
        let b = [-7.25, 9.0];
        assert_eq!(
            Manhattan::new(2).distance(&a, &b),
            Manhattan::new(2).distance(&b, &a)
        );
        assert_eq!(Haversine.distance(&a, &b), Haversine.distance(&b, &a));
    }

    #[test]
    fn haversine_new_york_to_london() {
        // Roughly 5570 km.
        let km = Haversine.distance_km(&NEW_YORK, &LONDON);
        assert_abs_diff_eq!(km, 5570.0, epsilon = 60.0);
        let mi = Haversine.distance_mi(&NEW_YORK, &LONDON);
        assert_abs_diff_eq!(mi, 3460.0, epsilon = 60.0);
    }

    #[test]
    fn equirectangular_close_to_haversine_at_short_range() {
        let a = [39.95, -75.16];
        let b = [40.44, -79.99];
        let haversine = Haversine.distance_km(&a, &b);
        let equirect = Equirectangular.distance_km(&a, &b);
        assert_abs_diff_eq!(haversine, equirect, epsilon = haversine * 0.01);
    }

    #[test]
    #[should_panic]
    fn rejects_zero_dimensions() {
        Euclidean::new(0);
    }
}
