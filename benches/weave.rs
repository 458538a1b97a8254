//! Benchmarks for listing weaving.
//!
//! - Parsing a listing into its model
//! - Weaving a single listing end to end
//! - Weaving a batch of listings in parallel

extern crate ilweave;

use criterion::{criterion_group, criterion_main, Criterion};
use ilweave::{SequenceFormat, Weaver};
use std::hint::black_box;

const SAMPLE: &str = include_str!("../tests/samples/Calculator.il");

/// Builds a listing with `copies` renamed copies of the sample's calculator class.
fn large_listing(copies: usize) -> String {
    let start = SAMPLE.find(".class public auto ansi beforefieldinit Demo.Calculator").unwrap();
    let end = SAMPLE.find("} // end of class Demo.Calculator").unwrap();
    let class = &SAMPLE[start..end + "} // end of class Demo.Calculator".len()];

    let mut listing = SAMPLE.to_string();
    for index in 0..copies {
        listing.push('\n');
        listing.push_str(&class.replace("Calculator", &format!("Calculator{index}")));
        listing.push('\n');
    }
    listing
}

fn bench_parse(c: &mut Criterion) {
    let weaver = Weaver::default();
    let listing = large_listing(200);

    c.bench_function("parse_200_classes", |b| {
        b.iter(|| {
            let assembly = weaver.parse(black_box(&listing)).unwrap();
            black_box(assembly)
        });
    });
}

fn bench_weave(c: &mut Criterion) {
    let weaver = Weaver::default();
    let listing = large_listing(200);

    c.bench_function("weave_sample", |b| {
        b.iter(|| {
            let woven = weaver.weave(black_box(SAMPLE)).unwrap();
            black_box(woven)
        });
    });

    c.bench_function("weave_200_classes", |b| {
        b.iter(|| {
            let woven = weaver.weave(black_box(&listing)).unwrap();
            black_box(woven)
        });
    });
}

fn bench_weave_many(c: &mut Criterion) {
    let weaver = Weaver::default();
    let listings = vec![large_listing(20); 32];

    c.bench_function("weave_many_32", |b| {
        b.iter(|| {
            let results = weaver.weave_many(black_box(&listings));
            black_box(results)
        });
    });
}

fn bench_render(c: &mut Criterion) {
    let format = SequenceFormat {
        max_items: 10,
        max_item_length: 100,
    };
    let items = (0..1000).map(|index| format!("item-{index}")).collect::<Vec<_>>();

    c.bench_function("sequence_render", |b| {
        b.iter(|| black_box(format.render(Some(black_box(&items)), false)));
    });
}

criterion_group!(benches, bench_parse, bench_weave, bench_weave_many, bench_render);
criterion_main!(benches);
