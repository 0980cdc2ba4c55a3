use as_syntax::parser::parse_plans;
use as_syntax::ConflictResolver;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn plan_library(n: usize) -> String {
    let mut source = String::new();
    for i in 0..n {
        let conflict = match i % 4 {
            0 => format!(r#"conflict("@p{}")"#, (i + 1) % n),
            1 => r#"conflict("+!move(X)")"#.to_string(),
            2 => "conflict(arm)".to_string(),
            _ => "atomic".to_string(),
        };
        source.push_str(&format!(
            "@p{}[{}] +!move({}) : at(X) & not busy <- .print(\"step\"); !next({}); +done({}).\n",
            i, conflict, i, i, i
        ));
    }
    source
}

fn bench_parse(c: &mut Criterion) {
    let source = plan_library(200);

    c.bench_function("as-syntax/parse_plans(n=200)", |b| {
        b.iter(|| {
            let plans = parse_plans(black_box(&source)).expect("parse");
            black_box(plans.len());
        })
    });
}

fn bench_resolve(c: &mut Criterion) {
    let plans = parse_plans(&plan_library(200)).expect("parse");

    c.bench_function("as-syntax/resolve(n=200)", |b| {
        b.iter(|| {
            let mut plans: Vec<_> = plans.iter().map(|p| p.deep_copy()).collect();
            let report = ConflictResolver::new().resolve(&mut plans);
            black_box(report.conflicts.len());
        })
    });
}

criterion_group!(benches, bench_parse, bench_resolve);
criterion_main!(benches);
