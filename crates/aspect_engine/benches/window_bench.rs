use aspect_engine::aspects::AspectCatalog;
use aspect_engine::ephemeris::{chart_positions, Body, FrameConfig, MeanOrbitProvider};
use aspect_engine::transit::{find_aspect_periods, Horizon, PeriodTarget, ScanRequest};
use chrono::{TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn bench_transit_month(c: &mut Criterion) {
    let provider = MeanOrbitProvider::new();
    let natal_at = Utc.with_ymd_and_hms(1990, 5, 17, 12, 0, 0).unwrap();
    let natal = chart_positions(&provider, &Body::PLANETS, natal_at, &FrameConfig::Tropical).unwrap();
    let targets = PeriodTarget::natal_chart(&natal, &AspectCatalog::transit());
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let request = ScanRequest::for_horizon(Horizon::Month, Body::PLANETS.to_vec(), targets, start);

    c.bench_function("transit_month", |b| {
        b.iter(|| find_aspect_periods(&provider, black_box(&request)))
    });
}

fn bench_transit_year(c: &mut Criterion) {
    let provider = MeanOrbitProvider::new();
    let natal_at = Utc.with_ymd_and_hms(1990, 5, 17, 12, 0, 0).unwrap();
    let natal = chart_positions(&provider, &Body::PLANETS, natal_at, &FrameConfig::Tropical).unwrap();
    let targets = PeriodTarget::natal_chart(&natal, &AspectCatalog::transit());
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let request = ScanRequest::for_horizon(Horizon::Year, Body::PLANETS.to_vec(), targets, start);

    c.bench_function("transit_year", |b| {
        b.iter(|| find_aspect_periods(&provider, black_box(&request)))
    });
}

criterion_group!(benches, bench_transit_month, bench_transit_year);
criterion_main!(benches);
