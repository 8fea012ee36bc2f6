//! Benchmarks for the per-entry hot path: classifying an entry, picking its
//! default action and parsing colors.
//!
//! Menu rebuilds run these for every clipboard change, so they must stay
//! well below a frame budget for catalogs of realistic size.

use std::time::Duration;

use clipact_action::matching::{applicable_actions, find_default_action};
use clipact_action::{ActionConfig, ActionsDocument, DocumentFormat};
use clipact_core::{Color, ContentEntry};
use criterion::{criterion_group, criterion_main, Criterion};

/// A catalog of `n` command actions plus the built-in color and QR actions.
fn catalog(n: usize) -> ActionConfig {
    let mut text = String::new();
    for i in 0..n {
        text.push_str(&format!(
            "[[actions]]\ntype = \"command\"\nname = \"Command {i}\"\npattern = \"^(https?://[^/]+/{i}/.*)$\"\ncommand = \"echo $1\"\ndefault_for = [\"url\"]\n\n"
        ));
    }
    let mut document = ActionsDocument::parse(&text, DocumentFormat::Toml)
        .expect("generated catalog parses");
    document.actions.extend(ActionsDocument::builtin().actions);
    document.normalize();
    document.compile()
}

fn entries() -> Vec<ContentEntry> {
    (0..1000)
        .map(|i| match i % 4 {
            0 => ContentEntry::new(format!("https://example.com/{}/page", i % 50)),
            1 => ContentEntry::new(format!("#{:06x}", i * 7919)),
            2 => ContentEntry::new(format!("hsl({}, 50%, 40%)", i % 360)),
            _ => ContentEntry::new(format!("Plain clipboard text number {}", i)),
        })
        .collect()
}

fn bench_default_lookup(c: &mut Criterion) {
    let config = catalog(50);
    let entries = entries();

    let mut group = c.benchmark_group("default_lookup");
    group.measurement_time(Duration::from_secs(5));

    group.bench_function("find_default_50_actions", |b| {
        let mut idx = 0usize;
        b.iter(|| {
            let entry = &entries[idx % entries.len()];
            idx += 1;
            find_default_action(&config, entry).map(|a| a.id().len())
        });
    });

    group.bench_function("applicable_50_actions", |b| {
        let mut idx = 0usize;
        b.iter(|| {
            let entry = &entries[idx % entries.len()];
            idx += 1;
            applicable_actions(&config, entry).len()
        });
    });

    group.finish();
}

fn bench_color_parsing(c: &mut Criterion) {
    let inputs = [
        "#ff8800",
        "#f80c",
        "rgb(255, 136, 0)",
        "rgba(255 136 0 / 50%)",
        "hsl(32deg 100% 50%)",
        "hwb(32 0% 0%)",
        "rebeccapurple",
        "not a color at all",
    ];

    let mut group = c.benchmark_group("color");

    group.bench_function("parse_mixed", |b| {
        let mut idx = 0usize;
        b.iter(|| {
            let input = inputs[idx % inputs.len()];
            idx += 1;
            Color::parse(input)
        });
    });

    group.bench_function("classify_entry", |b| {
        let mut idx = 0usize;
        b.iter(|| {
            let entry = ContentEntry::new(inputs[idx % inputs.len()]);
            idx += 1;
            entry.kind()
        });
    });

    group.finish();
}

criterion_group!(benches, bench_default_lookup, bench_color_parsing);
criterion_main!(benches);
