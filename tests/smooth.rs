use fuzzy_rules::{
    DefuzzificationMethod, ImplicationMethod, InferenceEngine, Integration, LinguisticBase, RuleBase, WorkingMemory,
};

fn market() -> (LinguisticBase, RuleBase) {
    let mut base = LinguisticBase::new();

    base.variable("demand")
        .unwrap()
        .triangular("low", 0., 0., 10.)
        .unwrap()
        .triangular("high", 0., 10., 10.)
        .unwrap();
    base.variable("price")
        .unwrap()
        .with_universe(0., 1000.)
        .unwrap()
        .gaussian("floor", 50., 1.)
        .unwrap();
    base.variable("level").unwrap().gaussian("centre", 20., 3.).unwrap();
    base.variable("markup")
        .unwrap()
        .generalized_bell("usual", 10., 2., 500.)
        .unwrap();
    base.variable("surge")
        .unwrap()
        .with_universe(0., 100.)
        .unwrap()
        .sigmoid("spike", 0.5, 50.)
        .unwrap();
    base.variable("trend").unwrap().sigmoid("rising", 0.5, 50.).unwrap();

    let p = |v: &str, t: &str| base.proposition(v, t).unwrap();
    let rules = [
        p("demand", "low").then(p("price", "floor")),
        p("demand", "low").then(p("level", "centre")),
        p("demand", "high").then(p("markup", "usual")),
        p("demand", "high").then(p("surge", "spike")),
        p("demand", "high").then(p("trend", "rising")),
    ]
    .into_iter()
    .collect();

    (base, rules)
}

fn demand(value: f64) -> WorkingMemory {
    [("demand", value)].into_iter().collect()
}

fn fine() -> Integration {
    Integration {
        error_margin: 1e-5,
        ..Integration::default()
    }
}

fn close(actual: Option<f64>, expected: f64, tolerance: f64) -> bool {
    actual.is_some_and(|actual| (actual - expected).abs() < tolerance)
}

#[test]
fn narrow_gaussian_in_wide_universe() {
    let (_, rules) = market();
    let facts = demand(0.);
    let engine = InferenceEngine::new(&rules, &facts).with_integration(fine());
    let price = engine.defuzzify("price").unwrap();

    assert!(close(price, 50., 1e-6), "{price:?}");
    assert_eq!(
        engine
            .with_defuzzification(DefuzzificationMethod::MeanOfMaxima)
            .defuzzify("price"),
        Ok(Some(50.))
    );

    // The window hugs the peak instead of spanning the whole universe
    let regions = engine.clip("price").unwrap();
    let window = regions[0].window();

    assert!(window.contains(50.) && window.width() < 20., "{window}");
    assert!((regions[0].geometry().area - (2. * std::f64::consts::PI).sqrt()).abs() < 1e-4);
}

#[test]
fn narrow_gaussian_scaled_and_cut() {
    let (_, rules) = market();
    let facts = demand(5.);
    let larsen = InferenceEngine::new(&rules, &facts)
        .with_integration(fine())
        .with_implication(ImplicationMethod::LarsenProduct);
    let area = larsen.clip("price").unwrap()[0].geometry().area;

    assert!(close(larsen.defuzzify("price").unwrap(), 50., 1e-6));
    assert!((area - 0.5 * (2. * std::f64::consts::PI).sqrt()).abs() < 1e-4, "{area}");

    let mamdani = larsen.with_implication(ImplicationMethod::MamdaniMinimum);
    let spread = (2. * 2f64.ln()).sqrt();

    assert!(close(mamdani.defuzzify("price").unwrap(), 50., 1e-6));
    assert!(close(
        mamdani
            .with_defuzzification(DefuzzificationMethod::FirstOfMaxima)
            .defuzzify("price")
            .unwrap(),
        50. - spread,
        1e-9
    ));
}

#[test]
fn gaussian_without_universe() {
    let (_, rules) = market();
    let facts = demand(0.);
    let engine = InferenceEngine::new(&rules, &facts).with_integration(fine());

    assert!(close(engine.defuzzify("level").unwrap(), 20., 1e-5));
    assert!(close(
        engine
            .with_implication(ImplicationMethod::LarsenProduct)
            .defuzzify("level")
            .unwrap(),
        20.,
        1e-5
    ));
    assert_eq!(
        engine
            .with_defuzzification(DefuzzificationMethod::MeanOfMaxima)
            .defuzzify("level"),
        Ok(Some(20.))
    );
}

#[test]
fn bell_without_universe() {
    let (_, rules) = market();
    let facts = demand(5.);
    let engine = InferenceEngine::new(&rules, &facts).with_integration(fine());
    let report = engine.defuzzify_each("markup").unwrap();

    // Half height of a bell sits `a` away from its centre
    assert!(close(report.get(DefuzzificationMethod::FirstOfMaxima), 490., 1e-9));
    assert!(close(report.get(DefuzzificationMethod::LastOfMaxima), 510., 1e-9));
    assert!(close(report.get(DefuzzificationMethod::CentreOfGravity), 500., 1e-4));
    assert!(engine.clip("markup").unwrap()[0].window().is_bounded());

    let larsen = engine.with_implication(ImplicationMethod::LarsenProduct);

    assert!(close(larsen.defuzzify("markup").unwrap(), 500., 1e-4));
    assert_eq!(
        larsen
            .with_defuzzification(DefuzzificationMethod::MeanOfMaxima)
            .defuzzify("markup"),
        Ok(Some(500.))
    );
}

#[test]
fn sigmoid_within_universe() {
    let (_, rules) = market();
    let full = demand(10.);
    let engine = InferenceEngine::new(&rules, &full).with_integration(fine());

    // Reference centroid of the sigmoid over the whole universe
    assert!(close(engine.defuzzify("surge").unwrap(), 74.868405, 1e-3));
    assert!(close(
        engine
            .with_implication(ImplicationMethod::LarsenProduct)
            .defuzzify("surge")
            .unwrap(),
        74.868405,
        1e-3
    ));

    let window = engine.clip("surge").unwrap()[0].window();

    assert!(window.low > 26. && window.low < 28., "{window}");
    assert_eq!(window.high, 100.);

    let half = demand(5.);
    let report = InferenceEngine::new(&rules, &half)
        .with_integration(fine())
        .defuzzify_each("surge")
        .unwrap();

    assert!(close(report.get(DefuzzificationMethod::CentreOfGravity), 73.561858, 1e-3));
    assert_eq!(report.get(DefuzzificationMethod::FirstOfMaxima), Some(50.));
    assert_eq!(report.get(DefuzzificationMethod::LastOfMaxima), Some(100.));
    assert_eq!(report.get(DefuzzificationMethod::MeanOfMaxima), Some(75.));
}

#[test]
fn sigmoid_without_universe() {
    let (_, rules) = market();
    let facts = demand(10.);
    let engine = InferenceEngine::new(&rules, &facts).with_integration(fine());
    let window = engine.clip("trend").unwrap()[0].window();

    // Only the transition band is integrated
    assert!((window.midpoint() - 50.).abs() < 1e-9, "{window}");
    assert!((window.width() - 4. * (1e5f64 - 1.).ln()).abs() < 1e-9, "{window}");
    assert!(close(engine.defuzzify("trend").unwrap(), 61.227204, 1e-3));
    assert!(close(
        engine
            .with_implication(ImplicationMethod::LarsenProduct)
            .defuzzify("trend")
            .unwrap(),
        61.227204,
        1e-3
    ));
}
