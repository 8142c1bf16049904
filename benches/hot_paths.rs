use criterion::{black_box, criterion_group, criterion_main, Criterion};

use county_choropleth::classify::{ColorClassifier, Domain, Palette};
use county_choropleth::join::{merge, RawRecord};
use county_choropleth::map::ChoroplethRenderer;
use county_choropleth::region::{Region, RegionKey};

const GRID: usize = 60;
const CELL_DEGREES: f64 = 0.4;

/// A GRID x GRID block of square counties over the lower 48
fn counties() -> Vec<Region> {
    (0..GRID * GRID)
        .map(|i| {
            let lon = -120.0 + (i % GRID) as f64 * CELL_DEGREES;
            let lat = 28.0 + (i / GRID) as f64 * CELL_DEGREES;
            let ring = vec![
                (lon, lat),
                (lon + CELL_DEGREES, lat),
                (lon + CELL_DEGREES, lat + CELL_DEGREES),
                (lon, lat + CELL_DEGREES),
                (lon, lat),
            ];
            Region::new(RegionKey::new(format!("{:02}", i / GRID), format!("County {i}")), vec![ring])
        })
        .collect()
}

fn rows() -> Vec<RawRecord> {
    (0..GRID * GRID)
        .map(|i| RawRecord {
            group_code: format!("{:02}", i / GRID),
            name: format!("County {i}"),
            cells: (0..4)
                .map(|j| (format!("JD{j}"), Some(((i * 37 + j * 11) % 5000).to_string())))
                .collect(),
        })
        .collect()
}

fn bench_merge(c: &mut Criterion) {
    let regions = counties();
    let records = rows();
    c.bench_function("merge", |b| {
        b.iter(|| {
            let mut regions = regions.clone();
            black_box(merge(&mut regions, records.clone()))
        })
    });
}

fn bench_classify(c: &mut Criterion) {
    let classifier = ColorClassifier::new(Domain::new(0.0, 20_000.0), Palette::default());
    let values: Vec<f64> = (0..10_000).map(|i| (i * 7 % 20_000) as f64).collect();
    c.bench_function("classify", |b| {
        b.iter(|| values.iter().map(|&v| classifier.classify(black_box(v))).sum::<usize>())
    });
}

fn bench_draw(c: &mut Criterion) {
    let mut regions = counties();
    let index = merge(&mut regions, rows());
    let renderer = ChoroplethRenderer::new(regions, index, Palette::default());
    let viewport = renderer.fit_viewport(320, 200);
    c.bench_function("draw", |b| b.iter(|| black_box(renderer.draw(&viewport, Some(42)))));
}

criterion_group!(benches, bench_merge, bench_classify, bench_draw);
criterion_main!(benches);
