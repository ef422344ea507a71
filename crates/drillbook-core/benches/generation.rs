use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;

use drillbook_core::catalog::TableCatalog;
use drillbook_core::generator::{ArithmeticQuiz, QuestionGenerator, TableQuiz, UsedPrompts};
use drillbook_core::model::Answer;
use drillbook_core::range_spec::OperandSpec;
use drillbook_core::store::RecordStore;

fn full_store() -> RecordStore {
    let mut store = RecordStore::new();
    for i in 0..20 {
        let question = format!("{} × 7 = ?", 10 + i);
        store.record_result(&question, &Answer::Integer((10 + i) * 7), "0", 25.0, false);
    }
    store
}

fn bench_batches(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate_batch");

    let tables = QuestionGenerator::new(Box::new(
        TableQuiz::new(&TableCatalog::builtin()).expect("built-in tables"),
    ));
    let arith = QuestionGenerator::new(Box::new(
        ArithmeticQuiz::digits(2, 2).expect("2x2 digits"),
    ));
    let narrow = QuestionGenerator::new(Box::new(ArithmeticQuiz::new(
        OperandSpec::parse("2~5").expect("spec"),
        OperandSpec::parse("3~6").expect("spec"),
    )));
    let empty = RecordStore::new();
    let full = full_store();

    group.bench_function("tables_empty_store", |b| {
        let mut rng = StdRng::seed_from_u64(1);
        b.iter(|| {
            let mut used = UsedPrompts::new();
            for _ in 0..10 {
                black_box(tables.next_question(&empty, &mut used, &mut rng));
            }
        })
    });

    group.bench_function("arith_full_store", |b| {
        let mut rng = StdRng::seed_from_u64(2);
        b.iter(|| {
            let mut used = UsedPrompts::new();
            for _ in 0..10 {
                black_box(arith.next_question(&full, &mut used, &mut rng));
            }
        })
    });

    // 16 distinct prompts, so late draws mostly collide.
    group.bench_function("arith_narrow_space", |b| {
        let mut rng = StdRng::seed_from_u64(3);
        b.iter(|| {
            let mut used = UsedPrompts::new();
            for _ in 0..10 {
                black_box(narrow.next_question(&empty, &mut used, &mut rng));
            }
        })
    });

    group.finish();
}

criterion_group!(benches, bench_batches);
criterion_main!(benches);
