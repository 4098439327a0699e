use aspect_engine::aspects::{AspectCatalog, InstantAspectFinder};
use aspect_engine::ephemeris::{Body, ChartPoint};
use aspect_engine::synastry::SynastryScorer;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn chart(offset: f64) -> Vec<ChartPoint> {
    Body::PLANETS
        .iter()
        .enumerate()
        .map(|(i, &body)| ChartPoint::with_speed(body, offset + (i as f64) * 31.7, 1.0 - i as f64 * 0.1))
        .collect()
}

fn bench_match_separation(c: &mut Criterion) {
    let catalog = AspectCatalog::natal();

    c.bench_function("match_separation", |b| {
        b.iter(|| catalog.match_separation(black_box(118.25)))
    });
}

fn bench_natal_aspects(c: &mut Criterion) {
    let finder = InstantAspectFinder::new(AspectCatalog::natal());
    let points = chart(3.0);

    c.bench_function("natal_aspects", |b| {
        b.iter(|| finder.natal(black_box(&points)))
    });
}

fn bench_synastry_report(c: &mut Criterion) {
    let scorer = SynastryScorer::default();
    let first = chart(3.0);
    let second = chart(47.5);

    c.bench_function("synastry_report", |b| {
        b.iter(|| scorer.compare(black_box(&first), black_box(&second)))
    });
}

criterion_group!(
    benches,
    bench_match_separation,
    bench_natal_aspects,
    bench_synastry_report
);
criterion_main!(benches);
