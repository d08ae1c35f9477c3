//! Benchmarks for serialization and splitting

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use sitemapper_core::xml::build_document;
use sitemapper_core::{
    ChangeFrequency, Image, Route, SplitOptions, estimate_total_size, split_routes,
};

// Mix of plain and image-bearing routes, similar to a content site
fn create_test_routes(count: usize) -> Vec<Route> {
    (0..count)
        .map(|i| {
            let route = Route::new(format!("https://example.com/articles/{i}?ref=feed&page={}", i % 7))
                .with_lastmod("2024-05-17T08:30:00+00:00")
                .with_changefreq(ChangeFrequency::Weekly)
                .with_priority(0.5);
            if i % 4 == 0 {
                route.with_image(
                    Image::new(format!("https://cdn.example.com/img/{i}.jpg"))
                        .with_caption("Cover image & thumbnail"),
                )
            } else {
                route
            }
        })
        .collect()
}

fn bench_build_document(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_document");

    for &count in &[100, 1_000, 10_000] {
        let routes = create_test_routes(count);
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &routes, |b, routes| {
            b.iter(|| build_document(black_box(routes)));
        });
    }

    group.finish();
}

fn bench_split_routes(c: &mut Criterion) {
    let mut group = c.benchmark_group("split_routes");
    group.sample_size(10);

    for &count in &[10_000, 60_000] {
        let routes = create_test_routes(count);
        let options = SplitOptions {
            max_urls: 25_000,
            hostname: Some("https://example.com".to_string()),
            index_lastmod: Some("2024-05-17".to_string()),
            ..SplitOptions::default()
        };
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &routes, |b, routes| {
            b.iter(|| split_routes(black_box(routes.clone()), &options));
        });
    }

    group.finish();
}

fn bench_estimate(c: &mut Criterion) {
    let routes = create_test_routes(100_000);
    let options = SplitOptions::default();

    c.bench_function("estimate_total_size_100k", |b| {
        b.iter(|| estimate_total_size(black_box(&routes), &options));
    });
}

criterion_group!(benches, bench_build_document, bench_split_routes, bench_estimate);
criterion_main!(benches);
