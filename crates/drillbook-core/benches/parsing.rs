use criterion::{black_box, criterion_group, criterion_main, Criterion};

use drillbook_core::catalog::parse_catalog_str;
use drillbook_core::range_spec::{OperandSpec, RangeSpec};

fn bench_range_specs(c: &mut Criterion) {
    let mut group = c.benchmark_group("range_spec");

    let single = "7";
    let mixed = "(2~9, 12, 15~19, 25)";
    let wide = {
        let terms: Vec<String> = (0..100).map(|i| format!("{}~{}", i * 10, i * 10 + 5)).collect();
        terms.join(", ")
    };

    group.bench_function("single", |b| b.iter(|| RangeSpec::parse(black_box(single))));

    group.bench_function("mixed", |b| b.iter(|| RangeSpec::parse(black_box(mixed))));

    group.bench_function("100_ranges", |b| {
        b.iter(|| RangeSpec::parse(black_box(&wide)))
    });

    group.bench_function("accept_mixed", |b| {
        b.iter(|| OperandSpec::parse(black_box(mixed)))
    });

    group.finish();
}

fn bench_catalog_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("catalog_parsing");

    let small_toml = generate_catalog_toml(2, 8);
    let large_toml = generate_catalog_toml(20, 50);

    group.bench_function("2_tables", |b| {
        b.iter(|| parse_catalog_str(black_box(&small_toml), black_box("bench.toml".as_ref())))
    });

    group.bench_function("20_tables", |b| {
        b.iter(|| parse_catalog_str(black_box(&large_toml), black_box("bench.toml".as_ref())))
    });

    group.finish();
}

fn generate_catalog_toml(tables: usize, pairs: usize) -> String {
    let mut s = String::new();
    for t in 0..tables {
        s.push_str(&format!("[[tables]]\nname = \"T{t}\"\npairs = [\n"));
        for p in 0..pairs {
            s.push_str(&format!("  [{p}, {}.{:02}],\n", p * (t + 1), p % 100));
        }
        s.push_str("]\n\n");
    }
    s
}

criterion_group!(benches, bench_range_specs, bench_catalog_parsing);
criterion_main!(benches);
