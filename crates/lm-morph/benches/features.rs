use criterion::{Criterion, black_box, criterion_group, criterion_main};
use lm_core::Polygon;
use lm_morph::{MorphConfig, ObjectPolygons, compute_batch, compute_features};

fn synthetic_outline(n: usize, rx: f64, ry: f64) -> Polygon {
    Polygon::from_pairs((0..n).map(|i| {
        let t = i as f64 / n as f64 * core::f64::consts::TAU;
        // Slight wobble so the outline is not a perfect ellipse.
        let r = 1.0 + 0.03 * (7.0 * t).sin();
        [400.0 + rx * r * t.cos(), 300.0 + ry * r * t.sin()]
    }))
}

fn bench_compute_features(c: &mut Criterion) {
    let outline = synthetic_outline(300, 220.0, 70.0);

    c.bench_function("lm_morph_compute_features_300", |b| {
        b.iter(|| {
            let f = compute_features(black_box(&outline), black_box(0.023)).expect("valid");
            black_box(f.volume_mm3);
        });
    });
}

fn bench_compute_batch(c: &mut Criterion) {
    let cfg = MorphConfig::default();
    let objects: Vec<_> = (0..1_000)
        .map(|i| ObjectPolygons {
            prosome: synthetic_outline(120, 200.0 + (i % 17) as f64, 65.0),
            lipid: synthetic_outline(60, 90.0, 25.0 + (i % 5) as f64),
        })
        .collect();

    c.bench_function("lm_morph_compute_batch_1k", |b| {
        b.iter(|| {
            let out = compute_batch(black_box(&objects), black_box(&cfg));
            black_box(out.len());
        });
    });
}

criterion_group!(benches, bench_compute_features, bench_compute_batch);
criterion_main!(benches);
