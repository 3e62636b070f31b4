use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tdlab_coding::CodingSpec;
use tdlab_core::Scheme;

fn bench_codings(c: &mut Criterion) {
    let ranges = vec![(-1.2, 0.6), (-0.07, 0.07), (-1.0, 1.0), (-3.0, 3.0)];
    let state = [-0.5, 0.01, 0.2, -1.4];

    for (scheme, granularity) in [
        (Scheme::Tile, vec![4, 4, 4, 4]),
        (Scheme::Rbf, vec![5, 5, 5, 5]),
        (Scheme::Fourier, vec![4, 4, 4, 4]),
    ] {
        let discretizer = CodingSpec::new(scheme, ranges.clone(), granularity)
            .build()
            .unwrap();
        c.bench_function(&format!("{scheme}_features_4d"), |b| {
            b.iter(|| discretizer.features(black_box(&state)).unwrap());
        });
    }

    let tiles = CodingSpec::new(Scheme::Tile, ranges, vec![8, 8, 8, 8]).build().unwrap();
    c.bench_function("tile_indices_4d", |b| {
        b.iter(|| tiles.indices(black_box(&state)).unwrap());
    });
}

criterion_group!(benches, bench_codings);
criterion_main!(benches);
