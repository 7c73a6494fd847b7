use fuzzy_rules::{
    DefuzzificationMethod, EngineConfig, ImplicationMethod, InferenceEngine, InferenceError, LinguisticBase,
    ResolutionPolicy, RuleBase, RuleDraft, TConorm, TNorm, WorkingMemory,
};

fn linguistic_base() -> LinguisticBase {
    let mut base = LinguisticBase::new();

    base.variable("food")
        .unwrap()
        .triangular("bad", 0., 0., 5.)
        .unwrap()
        .triangular("decent", 0., 5., 10.)
        .unwrap()
        .triangular("great", 5., 10., 10.)
        .unwrap();
    base.variable("service")
        .unwrap()
        .triangular("poor", 0., 0., 5.)
        .unwrap()
        .triangular("acceptable", 0., 5., 10.)
        .unwrap()
        .triangular("amazing", 5., 10., 10.)
        .unwrap();
    base.variable("tip")
        .unwrap()
        .triangular("low", 0., 0., 13.)
        .unwrap()
        .triangular("medium", 0., 13., 25.)
        .unwrap()
        .triangular("high", 13., 25., 35.)
        .unwrap();
    base
}

fn tipping_rules(base: &LinguisticBase) -> RuleBase {
    let p = |v: &str, t: &str| base.proposition(v, t).unwrap();

    [
        p("food", "bad").or(p("service", "poor")).then(p("tip", "low")),
        p("service", "acceptable").then(p("tip", "medium")),
        p("food", "great").or(p("service", "amazing")).then(p("tip", "high")),
    ]
    .into_iter()
    .collect()
}

fn dinner() -> WorkingMemory {
    [("food", 6.), ("service", 9.8)].into_iter().collect()
}

fn close(actual: Option<f64>, expected: f64) -> bool {
    actual.is_some_and(|actual| (actual - expected).abs() < 1e-6)
}

#[test]
fn tip_centre_of_gravity() {
    let base = linguistic_base();
    let rules = tipping_rules(&base);
    let facts = dinner();
    let tip = InferenceEngine::new(&rules, &facts).defuzzify("tip").unwrap();

    // high fires at 0.96 and has the largest clipped area
    assert!(close(tip, 24.332308), "{tip:?}");
    assert!(tip.is_some_and(|tip| (0. ..=35.).contains(&tip)));
    assert!(rules.find_cycles().is_empty());
}

#[test]
fn tip_every_method() {
    let base = linguistic_base();
    let rules = tipping_rules(&base);
    let facts = dinner();
    let report = InferenceEngine::new(&rules, &facts).defuzzify_each("TIP").unwrap();

    assert_eq!(report.variable(), "TIP");
    assert_eq!(report.len(), DefuzzificationMethod::ALL.len());
    assert!(close(report.get(DefuzzificationMethod::FirstOfMaxima), 24.52));
    assert!(close(report.get(DefuzzificationMethod::LastOfMaxima), 25.4));
    assert!(close(report.get(DefuzzificationMethod::MeanOfMaxima), 24.96));
    assert!(close(report.get(DefuzzificationMethod::Height), 24.52));
    assert!(close(report.get(DefuzzificationMethod::CentreOfSums), 23.363779));
    assert_eq!(
        report.get(DefuzzificationMethod::CentreOfArea),
        report.get(DefuzzificationMethod::CentreOfGravity)
    );

    for (method, value) in report.iter() {
        let single = InferenceEngine::new(&rules, &facts)
            .with_defuzzification(method)
            .defuzzify("tip")
            .unwrap();

        assert_eq!(single, Some(value), "{method}");
    }
}

#[test]
fn tip_larsen_product() {
    let base = linguistic_base();
    let rules = tipping_rules(&base);
    let facts = dinner();
    let engine = InferenceEngine::new(&rules, &facts).with_implication(ImplicationMethod::LarsenProduct);

    // Scaling keeps the triangle's centroid
    assert!(close(engine.defuzzify("tip").unwrap(), 73. / 3.));
    assert_eq!(
        engine
            .with_defuzzification(DefuzzificationMethod::MeanOfMaxima)
            .defuzzify("tip"),
        Ok(Some(25.))
    );
}

#[test]
fn zero_weight_is_inconclusive() {
    let base = linguistic_base();
    let rules: RuleBase = [base
        .proposition("service", "poor")
        .unwrap()
        .then(base.proposition("tip", "low").unwrap())]
    .into_iter()
    .collect();
    let facts = dinner();

    for &method in DefuzzificationMethod::ALL {
        let engine = InferenceEngine::new(&rules, &facts).with_defuzzification(method);

        assert_eq!(engine.defuzzify("tip"), Ok(None), "{method}");
    }
    assert!(InferenceEngine::new(&rules, &facts)
        .defuzzify_each("tip")
        .unwrap()
        .is_empty());
}

#[test]
fn no_matching_rules() {
    let base = linguistic_base();
    let rules = tipping_rules(&base);
    let facts = dinner();
    let engine = InferenceEngine::new(&rules, &facts);

    assert_eq!(
        engine.defuzzify("food"),
        Err(InferenceError::InapplicableRules {
            variable: "food".into()
        })
    );

    let only_food: WorkingMemory = [("food", 6.)].into_iter().collect();

    // Every rule concluding tip reads service
    assert_eq!(
        InferenceEngine::new(&rules, &only_food).defuzzify("tip"),
        Err(InferenceError::InapplicableRules { variable: "tip".into() })
    );
    assert_eq!(
        InferenceEngine::new(&rules, &WorkingMemory::new()).defuzzify("tip"),
        Err(InferenceError::NoFacts)
    );
}

#[test]
fn mismatched_consequent_spelling() {
    let base = linguistic_base();
    let mut shouting = LinguisticBase::new();

    shouting.variable("TIP").unwrap().triangular("low", 0., 0., 13.).unwrap();

    let mut rules = tipping_rules(&base);
    let mut draft = RuleDraft::new();

    draft
        .when(base.proposition("food", "bad").unwrap())
        .unwrap()
        .then(shouting.proposition("tip", "low").unwrap())
        .unwrap();
    rules.add_draft(draft).unwrap();

    let facts = dinner();

    assert_eq!(
        InferenceEngine::new(&rules, &facts).defuzzify("tip"),
        Err(InferenceError::MismatchedConsequent {
            expected: "tip".into(),
            found: "TIP".into()
        })
    );
}

#[test]
fn config_from_json() {
    let json = r#"{
        "tnorm": "product",
        "tconorm": "probabilistic_sum",
        "defuzzification": "centre_of_sums",
        "integration": { "error_margin": 1e-6 }
    }"#;
    let config: EngineConfig = serde_json::from_str(json).unwrap();

    assert_eq!(config.algebra.tnorm, TNorm::Product);
    assert_eq!(config.algebra.tconorm, TConorm::ProbabilisticSum);
    assert_eq!(config.defuzzification, DefuzzificationMethod::CentreOfSums);
    assert_eq!(config.implication, ImplicationMethod::MamdaniMinimum);
    assert_eq!(config.integration.error_margin, 1e-6);
    assert_eq!(config.integration.max_refinements, 20);

    let round_trip: EngineConfig = serde_json::from_str(&serde_json::to_string(&config).unwrap()).unwrap();

    assert_eq!(round_trip, config);
    assert_eq!(serde_json::from_str::<EngineConfig>("{}").unwrap(), EngineConfig::default());

    let base = linguistic_base();
    let rules = tipping_rules(&base);
    let facts = dinner();
    let tip = InferenceEngine::new(&rules, &facts).with_config(config).defuzzify("tip").unwrap();

    assert!(tip.is_some_and(|tip| (0. ..=35.).contains(&tip)));
}

#[test]
fn preserved_facts_keep_the_first_value() {
    let base = linguistic_base();
    let rules = tipping_rules(&base);
    let mut facts = WorkingMemory::with_policy(ResolutionPolicy::Preserve);

    assert!(facts.set("food", 6.));
    assert!(facts.set("service", 9.8));
    assert!(!facts.set("Service", 0.));

    let tip = InferenceEngine::new(&rules, &facts).defuzzify("tip").unwrap();

    assert!(close(tip, 24.332308));
}
