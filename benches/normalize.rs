// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: MIT

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use sketchmaid::format::mermaid::normalize_mermaid;

// Benchmark identity (keep stable):
// - Group name in this file: `format.normalize`
// - Case IDs (`clean`, `glued`, `large_multiline`) must remain stable across
//   refactors so results stay comparable over time.

fn clean_case(nodes: usize) -> String {
    let mut out = String::from("flowchart TD\n");
    for i in 0..nodes {
        out.push_str(&format!("N{i}[Step {i}]\n"));
        if i > 0 {
            out.push_str(&format!("N{} --> N{i}\n", i - 1));
        }
    }
    out
}

fn glued_case(nodes: usize) -> String {
    let mut out = String::from("flowchartTD ");
    for i in 0..nodes {
        out.push_str(&format!("N{i}[Step {i}]"));
    }
    out
}

fn multiline_case(nodes: usize) -> String {
    let mut out = String::from("flowchart TD\n");
    for i in 0..nodes {
        out.push_str(&format!("N{i}[first line {i}\nsecond line {i}<br/>third] --> N{}\n", i + 1));
    }
    out
}

fn benches_normalize(c: &mut Criterion) {
    let mut group = c.benchmark_group("format.normalize");

    for (case_id, input, elements) in [
        ("clean", clean_case(50), 50u64),
        ("glued", glued_case(50), 50u64),
        ("large_multiline", multiline_case(400), 400u64),
    ] {
        group.throughput(Throughput::Elements(elements));
        group.bench_function(case_id, move |b| {
            b.iter(|| black_box(normalize_mermaid(black_box(&input))))
        });
    }

    group.finish();
}

criterion_group!(benches, benches_normalize);
criterion_main!(benches);
