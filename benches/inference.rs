use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use fuzzy_rules::{DefuzzificationMethod, InferenceEngine, LinguisticBase, RuleBase, WorkingMemory};

fn tipping() -> (LinguisticBase, RuleBase) {
    let mut base = LinguisticBase::new();

    base.variable("food")
        .unwrap()
        .triangular("bad", 0., 0., 5.)
        .unwrap()
        .triangular("great", 5., 10., 10.)
        .unwrap();
    base.variable("service")
        .unwrap()
        .gaussian("poor", 0., 2.)
        .unwrap()
        .gaussian("acceptable", 5., 2.)
        .unwrap()
        .gaussian("amazing", 10., 2.)
        .unwrap();
    base.variable("tip")
        .unwrap()
        .with_universe(0., 35.)
        .unwrap()
        .gaussian("low", 0., 5.)
        .unwrap()
        .gaussian("medium", 13., 5.)
        .unwrap()
        .right_open_trapezoid("high", 13., 25.)
        .unwrap();

    let p = |v: &str, t: &str| base.proposition(v, t).unwrap();
    let rules = [
        p("food", "bad").or(p("service", "poor")).then(p("tip", "low")),
        p("service", "acceptable").then(p("tip", "medium")),
        p("food", "great").or(p("service", "amazing")).then(p("tip", "high")),
    ]
    .into_iter()
    .collect();

    (base, rules)
}

fn defuzzify_benchmark(c: &mut Criterion) {
    let (_, rules) = tipping();
    let facts: WorkingMemory = [("food", 6.), ("service", 7.5)].into_iter().collect();
    let mut group = c.benchmark_group("defuzzify");

    for &method in DefuzzificationMethod::ALL {
        group.bench_with_input(BenchmarkId::from_parameter(method.token()), &method, |b, &method| {
            let engine = InferenceEngine::new(&rules, &facts).with_defuzzification(method);

            b.iter(|| black_box(engine.defuzzify(black_box("tip"))))
        });
    }

    group.finish();
}

fn defuzzify_each_benchmark(c: &mut Criterion) {
    let (_, rules) = tipping();
    let facts: WorkingMemory = [("food", 6.), ("service", 7.5)].into_iter().collect();
    let engine = InferenceEngine::new(&rules, &facts);

    c.bench_function("defuzzify_each", |b| b.iter(|| black_box(engine.defuzzify_each("tip"))));
}

criterion_group!(benches, defuzzify_benchmark, defuzzify_each_benchmark);
criterion_main!(benches);
