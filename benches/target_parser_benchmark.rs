//! Throughput of reference parsing and page extraction on export-sized inputs

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use vk_purge_lib::application::{parse_comment_targets, parse_reaction_targets};
use vk_purge_lib::domain::{ProgressCounters, RawReference};
use vk_purge_lib::infrastructure::{ExportEncoding, HtmlListingExtractor};

fn comment_references(n: usize) -> Vec<RawReference> {
    (0..n)
        .map(|i| RawReference::new(format!("https://vk.com/wall-{}_{}?reply={}", i % 97, i, i + 1)))
        .collect()
}

fn reaction_references(n: usize) -> Vec<RawReference> {
    const KINDS: [&str; 4] = ["wall", "photo", "video", "im"];
    (0..n)
        .map(|i| RawReference::new(format!("https://vk.com/{}{}_{}", KINDS[i % KINDS.len()], i % 97, i)))
        .collect()
}

fn listing_page(rows: usize) -> String {
    let body: String = (0..rows)
        .map(|i| {
            format!(
                r#"<div class="item"><div class="item__main"><a href="https://vk.com/wall{i}_{i}">post</a></div><div class="item__tertiary">1 Jan 2020</div></div>"#
            )
        })
        .collect();
    format!(r#"<html><body><div class="wrap_page_content">{body}</div></body></html>"#)
}

fn parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_targets");
    for size in [100, 10_000] {
        group.throughput(Throughput::Elements(size as u64));

        let comments = comment_references(size);
        group.bench_with_input(BenchmarkId::new("comments", size), &comments, |b, refs| {
            b.iter(|| {
                let counters = ProgressCounters::new();
                black_box(parse_comment_targets(refs.clone(), &counters))
            });
        });

        let reactions = reaction_references(size);
        group.bench_with_input(BenchmarkId::new("likes", size), &reactions, |b, refs| {
            b.iter(|| {
                let counters = ProgressCounters::new();
                black_box(parse_reaction_targets(refs.clone(), &counters))
            });
        });
    }
    group.finish();
}

fn extraction(c: &mut Criterion) {
    let extractor = HtmlListingExtractor::new(ExportEncoding::Latin1).unwrap();
    let page = listing_page(50);

    c.bench_function("extract_listing_page", |b| {
        b.iter(|| black_box(extractor.extract_from_html(black_box(&page))));
    });
}

criterion_group!(benches, parsing, extraction);
criterion_main!(benches);
