use criterion::{criterion_group, criterion_main, Criterion};
use kd_index::distance::SquaredEuclidean;
use kd_index::kdtree::KDTree;
use kd_index::KdPoint;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn generate_points(n: usize, dims: usize) -> Vec<KdPoint> {
    let mut rng = StdRng::seed_from_u64(42);
    (0..n)
        .map(|_| {
            KdPoint::new(
                (0..dims)
                    .map(|_| rng.gen_range(-100.0..100.0))
                    .collect::<Vec<f64>>(),
            )
        })
        .collect()
}

fn benchmark_kdtree(c: &mut Criterion) {
    let points = generate_points(10_000, 2);

    c.bench_function("construction (10k points)", |b| {
        b.iter(|| KDTree::new(points.clone(), 2, SquaredEuclidean::new(2)).unwrap())
    });

    let tree = KDTree::new(points, 2, SquaredEuclidean::new(2)).unwrap();

    c.bench_function("knn (10 of 10k)", |b| {
        b.iter(|| tree.knn(&[3.0, -7.0], 10).unwrap())
    });

    c.bench_function("radius search (10k points)", |b| {
        b.iter(|| tree.radius_search(&[3.0, -7.0], 500.0).unwrap())
    });

    c.bench_function("box search (10k points)", |b| {
        b.iter(|| tree.points_in_box(&[-50.0, 50.0, -50.0, 50.0]).unwrap())
    });
}

criterion_group!(benches, benchmark_kdtree);
criterion_main!(benches);
