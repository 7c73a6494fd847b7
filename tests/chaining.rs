use fuzzy_rules::{InferenceEngine, InferenceError, LinguisticBase, RuleBase, WorkingMemory};

fn cooling() -> (LinguisticBase, RuleBase) {
    let mut base = LinguisticBase::new();

    base.variable("load")
        .unwrap()
        .triangular("low", 0., 0., 50.)
        .unwrap()
        .triangular("high", 50., 100., 100.)
        .unwrap();
    base.variable("heat")
        .unwrap()
        .with_universe(0., 100.)
        .unwrap()
        .triangular("cool", 0., 0., 60.)
        .unwrap()
        .triangular("warm", 40., 100., 100.)
        .unwrap();
    base.variable("fan")
        .unwrap()
        .triangular("slow", 0., 0., 10.)
        .unwrap()
        .triangular("fast", 0., 10., 10.)
        .unwrap();

    let p = |v: &str, t: &str| base.proposition(v, t).unwrap();
    let rules = [
        p("load", "high").then(p("heat", "warm")),
        p("load", "low").then(p("heat", "cool")),
        p("heat", "warm").then(p("fan", "fast")),
        p("heat", "cool").then(p("fan", "slow")),
    ]
    .into_iter()
    .collect();

    (base, rules)
}

#[test]
fn derives_intermediate_variables() {
    let (_, rules) = cooling();
    let facts: WorkingMemory = [("load", 100.)].into_iter().collect();
    let engine = InferenceEngine::new(&rules, &facts);

    // heat is derived as 80, where warm holds to 2/3
    let fan = engine.infer("fan").unwrap().unwrap();

    assert!((fan - 115. / 18.).abs() < 1e-6, "{fan}");
    assert_eq!(
        engine.defuzzify("fan"),
        Err(InferenceError::InapplicableRules { variable: "fan".into() })
    );
    assert!(!facts.contains("heat"));
}

#[test]
fn known_facts_are_not_derived() {
    let (_, rules) = cooling();
    let facts: WorkingMemory = [("load", 100.), ("heat", 0.)].into_iter().collect();
    let engine = InferenceEngine::new(&rules, &facts);

    assert_eq!(engine.infer("fan"), engine.defuzzify("fan"));
}

#[test]
fn circular_dependency() {
    let mut base = LinguisticBase::new();

    for name in ["x", "y", "z"] {
        base.variable(name).unwrap().triangular("on", 0., 1., 2.).unwrap();
    }

    let p = |v: &str| base.proposition(v, "on").unwrap();
    let rules: RuleBase = [p("x").then(p("y")), p("y").then(p("x")), p("z").then(p("y"))]
        .into_iter()
        .collect();
    let facts: WorkingMemory = [("z", 1.)].into_iter().collect();
    let engine = InferenceEngine::new(&rules, &facts);
    let err = engine.infer("y").unwrap_err();

    assert_eq!(
        err,
        InferenceError::CircularDependency {
            cycle: vec!["y".into(), "x".into(), "y".into()]
        }
    );
    assert_eq!(err.to_string(), "circular rule dependency: y -> x -> y");

    // Plain defuzzification only reads the facts at hand
    let y = engine.defuzzify("y").unwrap().unwrap();

    assert!((y - 1.).abs() < 1e-9);
    assert_eq!(rules.find_cycles().len(), 1);
}
