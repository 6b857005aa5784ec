//! End-to-End Parser Benchmarks
//!
//! Measures lexing and parsing of pipe queries. Benchmarks are organized into
//! the following categories:
//!
//! - **Lexing**: Mode-aware tokenization alone
//! - **Simple Queries**: Short pipelines with one or two commands
//! - **Complex Queries**: Typical analytic pipelines
//! - **Stress Tests**: Long pipelines, wide lists, and deep nesting
//! - **Recovery**: Inputs full of syntax errors
//!
//! ## Running Benchmarks
//!
//! ```bash
//! # Run all benchmarks
//! cargo bench
//!
//! # Run specific benchmark group
//! cargo bench lexing
//! cargo bench stress_tests
//! ```

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use esql_parser::{ParseOptions, parse, parse_with_options, tokenize};

const SIMPLE: &[(&str, &str)] = &[
    ("from", "FROM logs"),
    ("row", "ROW a = 1, b = \"two\""),
    ("from_limit", "FROM logs | LIMIT 10"),
    ("where", "FROM logs | WHERE status >= 500"),
    ("keep", "FROM logs | KEEP host.*, status"),
];

const COMPLEX: &[(&str, &str)] = &[
    (
        "filter_aggregate_sort",
        "FROM employees | WHERE salary > 1000 AND dept IN (\"eng\", \"ops\") \
         | STATS avg_salary = avg(salary), c = count(*) BY dept \
         | SORT avg_salary DESC NULLS LAST | LIMIT 5",
    ),
    (
        "eval_casts",
        "FROM metrics | EVAL ratio = bytes_out::double / bytes_in, day = date_trunc(1 day, @timestamp) \
         | WHERE ratio IS NOT NULL AND NOT host LIKE \"test-*\"",
    ),
    (
        "grok_dissect",
        "FROM web | GROK message \"%{IP:client} %{WORD:verb} %{NOTSPACE:path}\" \
         | DISSECT path \"/%{section}/%{rest}\" append_separator = \"-\" | KEEP client, section",
    ),
    (
        "enrich_rename",
        "FROM orders | ENRICH [ccq.mode:any] _any:customers ON customer_id WITH name = full_name, tier \
         | RENAME tier AS customer_tier | DROP *_tmp",
    ),
    (
        "explain",
        "EXPLAIN [FROM a | WHERE b > 1 | STATS count(*) BY c] | LIMIT 1",
    ),
];

fn bench_lexing(c: &mut Criterion) {
    let mut group = c.benchmark_group("lexing");
    let options = ParseOptions::default();

    for (name, query) in SIMPLE.iter().chain(COMPLEX) {
        group.throughput(Throughput::Bytes(query.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(name), query, |b, q| {
            b.iter(|| tokenize(black_box(q), &options));
        });
    }

    group.finish();
}

fn bench_simple_queries(c: &mut Criterion) {
    let mut group = c.benchmark_group("simple_queries");

    for (name, query) in SIMPLE {
        group.throughput(Throughput::Elements(1));
        group.bench_with_input(BenchmarkId::from_parameter(name), query, |b, q| {
            b.iter(|| parse(black_box(q)));
        });
    }

    group.finish();
}

fn bench_complex_queries(c: &mut Criterion) {
    let mut group = c.benchmark_group("complex_queries");

    for (name, query) in COMPLEX {
        group.throughput(Throughput::Elements(1));
        group.bench_with_input(BenchmarkId::from_parameter(name), query, |b, q| {
            b.iter(|| parse(black_box(q)));
        });
    }

    let preview = ParseOptions::default().with_preview(true);
    let metrics = "METRICS k8s, remote:pods max(cpu), min(mem) BY cluster \
                   | INLINESTATS c = count(*) BY pod | WHERE message : \"oom\"";
    group.bench_function("preview_metrics", |b| {
        b.iter(|| parse_with_options(black_box(metrics), &preview));
    });

    group.finish();
}

fn bench_large_queries(c: &mut Criterion) {
    let mut group = c.benchmark_group("stress_tests");
    group.sample_size(50);

    // Long pipeline
    let mut long_pipeline = String::from("FROM logs");
    for i in 0..100 {
        long_pipeline.push_str(&format!(" | EVAL c{i} = c{} + {i}", i.max(1) - 1));
    }
    group.throughput(Throughput::Bytes(long_pipeline.len() as u64));
    group.bench_function("100_eval_commands", |b| {
        b.iter(|| parse(black_box(&long_pipeline)));
    });

    // Large IN list
    let mut large_in = String::from("FROM logs | WHERE id IN (");
    for i in 0..500 {
        if i > 0 {
            large_in.push_str(", ");
        }
        large_in.push_str(&i.to_string());
    }
    large_in.push(')');
    group.throughput(Throughput::Bytes(large_in.len() as u64));
    group.bench_function("500_element_in_list", |b| {
        b.iter(|| parse(black_box(&large_in)));
    });

    // Wide KEEP
    let columns: Vec<String> = (0..200).map(|i| format!("field_{i}")).collect();
    let wide_keep = format!("FROM logs | KEEP {}", columns.join(", "));
    group.throughput(Throughput::Bytes(wide_keep.len() as u64));
    group.bench_function("200_keep_columns", |b| {
        b.iter(|| parse(black_box(&wide_keep)));
    });

    group.finish();
}

fn bench_deep_nesting(c: &mut Criterion) {
    let mut group = c.benchmark_group("deep_nesting");
    group.sample_size(50);

    for depth in [5, 10, 20, 30] {
        let mut expr = String::from("value");
        for i in 0..depth {
            expr = format!("({expr} + {i})");
        }
        let query = format!("FROM t | EVAL x = {expr}");

        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{depth}_levels")),
            &query,
            |b, q| {
                b.iter(|| parse(black_box(q)));
            },
        );
    }

    group.finish();
}

fn bench_recovery(c: &mut Criterion) {
    let mut group = c.benchmark_group("recovery");

    let broken: Vec<String> = (0..50)
        .map(|i| format!("EVAL x{i} = | WHERE > | FOO{i} bar"))
        .collect();
    let broken = format!("FROM logs | {}", broken.join(" | "));
    group.bench_function("150_broken_commands", |b| {
        b.iter(|| parse(black_box(&broken)));
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_lexing,
    bench_simple_queries,
    bench_complex_queries,
    bench_large_queries,
    bench_deep_nesting,
    bench_recovery,
);

criterion_main!(benches);
