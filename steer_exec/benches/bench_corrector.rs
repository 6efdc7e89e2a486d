//! # Corrector Benchmark

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use comms_if::eqpt::per::Object;
use steer_lib::corr::{group_objects, CorrParams, Corrector, Grid, GridCorrector};

fn corrector_benchmark(c: &mut Criterion) {
    // ---- Build corrector and dummy detections ----

    let params = CorrParams::default();
    let corrector = GridCorrector::with_grids(
        Grid::default_steering(),
        Grid::default_obj_move_factors(),
        &params,
    );

    // A few duplicated near field detections, plus some far and oversized ones to filter out
    let mut objects = Vec::new();
    for i in 0..8 {
        let offset = i as f32 * 0.005;
        objects.push(Object::new(0.40 + offset, 0.92, 0.60 + offset, 0.98, 0.9));
        objects.push(Object::new(0.10 + offset, 0.93, 0.30 + offset, 0.99, 0.8));
        objects.push(Object::new(0.40, 0.10 + offset, 0.60, 0.20 + offset, 0.7));
    }
    objects.push(Object::new(0.0, 0.0, 1.0, 1.0, 0.5));

    c.bench_function("GridCorrector::adjust::straight", |b| {
        b.iter(|| corrector.adjust(black_box(0.0), black_box(&objects)))
    });

    c.bench_function("GridCorrector::adjust::turning", |b| {
        b.iter(|| corrector.adjust(black_box(0.6), black_box(&objects)))
    });

    c.bench_function("group_objects", |b| {
        b.iter(|| group_objects(black_box(&objects), params.img_width, params.img_height))
    });
}

criterion_group!(benches, corrector_benchmark);
criterion_main!(benches);
