use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use sqlcraft::{AnsiQuoter, Condition, QueryBuilder};
use std::sync::Arc;

/// Build a query with `n` AND-merged predicates:
/// SELECT id, name FROM users WHERE (col0 = 0) AND (col1 = 1) ...
fn build_query(n: usize) -> QueryBuilder {
    let mut qb = QueryBuilder::new(Arc::new(AnsiQuoter))
        .select("id, name")
        .from("users");
    for i in 0..n {
        qb = qb.and_where(Condition::raw(format!("col{i} = {i}")));
    }
    qb.order("id desc").limit(50)
}

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("sql_builder/render");

    for n in [1, 5, 10, 50] {
        let qb = build_query(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &qb, |b, qb| {
            b.iter(|| black_box(qb.build()));
        });
    }

    group.finish();
}

fn bench_build_and_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("sql_builder/build_and_render");

    for n in [1, 5, 10, 50] {
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            b.iter(|| {
                let qb = build_query(n);
                black_box(qb.build());
            });
        });
    }

    group.finish();
}

fn bench_compile_in_list(c: &mut Criterion) {
    let mut group = c.benchmark_group("sql_builder/compile_in_list");

    for n in [5i64, 20, 100, 500] {
        let values: Vec<i64> = (0..n).collect();
        group.bench_with_input(BenchmarkId::from_parameter(n), &values, |b, values| {
            b.iter(|| {
                let cond = Condition::in_list("id", values.iter().copied());
                black_box(cond.compile(&AnsiQuoter));
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_render,
    bench_build_and_render,
    bench_compile_in_list
);
criterion_main!(benches);
