use std::collections::HashMap;
use std::fmt;

use slotmap::{new_key_type, SlotMap};

use crate::dsl::Proposition;
use crate::error::ConstructionError;
use crate::membership::{Interval, MembershipFunction};

new_key_type! {
    /// A variable key
    pub struct VariableKey;
}

/// Names are compared case-insensitively everywhere in the crate.
pub(crate) fn fold_name(name: &str) -> String {
    name.to_lowercase()
}

pub(crate) fn same_name(lhs: &str, rhs: &str) -> bool {
    lhs == rhs || fold_name(lhs) == fold_name(rhs)
}

fn check_name(name: &str) -> Result<(), ConstructionError> {
    if name.trim().is_empty() {
        Err(ConstructionError::EmptyName)
    } else {
        Ok(())
    }
}

/// A named linguistic term backed by a membership function.
#[derive(Clone, Debug, PartialEq)]
pub struct Term {
    name: String,
    function: MembershipFunction,
}

impl Term {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn function(&self) -> &MembershipFunction {
        &self.function
    }
}

/// A named concept such as "temperature" with a set of uniquely named terms.
#[derive(Clone, Debug, PartialEq)]
pub struct LinguisticVariable {
    name: String,
    universe: Option<Interval>,
    terms: Vec<Term>,
}

impl LinguisticVariable {
    pub fn new(name: impl Into<String>) -> Result<Self, ConstructionError> {
        let name = name.into();

        check_name(&name)?;

        Ok(LinguisticVariable {
            name,
            universe: None,
            terms: Vec::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Optional bounds of the domain, used to truncate open shapes during defuzzification.
    pub fn universe(&self) -> Option<&Interval> {
        self.universe.as_ref()
    }

    pub fn with_universe(&mut self, low: f64, high: f64) -> Result<&mut Self, ConstructionError> {
        if !(low.is_finite() && high.is_finite() && low < high) {
            return Err(ConstructionError::InvalidUniverse { low, high });
        }

        self.universe = Some(Interval::new(low, high));

        Ok(self)
    }

    pub fn term(
        &mut self,
        name: impl Into<String>,
        function: MembershipFunction,
    ) -> Result<&mut Self, ConstructionError> {
        let name = name.into();

        check_name(&name)?;

        if self.get(&name).is_some() {
            return Err(ConstructionError::DuplicateTerm {
                variable: self.name.clone(),
                term: name,
            });
        }

        self.terms.push(Term { name, function });

        Ok(self)
    }

    pub fn triangular(
        &mut self,
        term: impl Into<String>,
        a: f64,
        b: f64,
        c: f64,
    ) -> Result<&mut Self, ConstructionError> {
        self.term(term, MembershipFunction::triangular(a, b, c)?)
    }

    pub fn trapezoidal(
        &mut self,
        term: impl Into<String>,
        a: f64,
        b: f64,
        c: f64,
        d: f64,
    ) -> Result<&mut Self, ConstructionError> {
        self.term(term, MembershipFunction::trapezoidal(a, b, c, d)?)
    }

    pub fn left_open_trapezoid(
        &mut self,
        term: impl Into<String>,
        a: f64,
        b: f64,
    ) -> Result<&mut Self, ConstructionError> {
        self.term(term, MembershipFunction::left_open_trapezoid(a, b)?)
    }

    pub fn right_open_trapezoid(
        &mut self,
        term: impl Into<String>,
        a: f64,
        b: f64,
    ) -> Result<&mut Self, ConstructionError> {
        self.term(term, MembershipFunction::right_open_trapezoid(a, b)?)
    }

    pub fn gaussian(&mut self, term: impl Into<String>, mean: f64, sigma: f64) -> Result<&mut Self, ConstructionError> {
        self.term(term, MembershipFunction::gaussian(mean, sigma)?)
    }

    pub fn generalized_bell(
        &mut self,
        term: impl Into<String>,
        a: f64,
        b: f64,
        c: f64,
    ) -> Result<&mut Self, ConstructionError> {
        self.term(term, MembershipFunction::generalized_bell(a, b, c)?)
    }

    pub fn sigmoid(&mut self, term: impl Into<String>, a: f64, c: f64) -> Result<&mut Self, ConstructionError> {
        self.term(term, MembershipFunction::sigmoid(a, c)?)
    }

    pub fn get(&self, term: &str) -> Option<&Term> {
        self.terms.iter().find(|t| same_name(&t.name, term))
    }

    pub fn terms(&self) -> impl Iterator<Item = &Term> {
        self.terms.iter()
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Degree of membership of `value` in every term, in definition order.
    pub fn fuzzify(&self, value: f64) -> Vec<(&str, f64)> {
        self.terms
            .iter()
            .map(|t| (t.name.as_str(), t.function.evaluate(value).value()))
            .collect()
    }

    /// `variable IS term`
    pub fn is(&self, term: &str) -> Result<Proposition, ConstructionError> {
        let found = self.get(term).ok_or_else(|| ConstructionError::UnknownTerm {
            variable: self.name.clone(),
            term: term.to_owned(),
        })?;

        Ok(Proposition::new(self, found))
    }

    /// `variable IS NOT term`
    pub fn is_not(&self, term: &str) -> Result<Proposition, ConstructionError> {
        self.is(term).map(Proposition::negated)
    }
}

impl fmt::Display for LinguisticVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {{", self.name)?;

        for (i, term) in self.terms.iter().enumerate() {
            let sep = if i == 0 { " " } else { ", " };
            write!(f, "{sep}{}: {}", term.name, term.function)?;
        }

        f.write_str(" }")
    }
}

/// Every linguistic variable known to a rule set, keyed by unique name.
///
/// Built once up front and read-only while inferring.
#[derive(Clone, Debug, Default)]
pub struct LinguisticBase {
    variables: SlotMap<VariableKey, LinguisticVariable>,
    by_name: HashMap<String, VariableKey>,
}

impl LinguisticBase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new variable and hands it back for adding terms.
    pub fn variable(&mut self, name: impl Into<String>) -> Result<&mut LinguisticVariable, ConstructionError> {
        let key = self.add(LinguisticVariable::new(name)?)?;

        Ok(&mut self.variables[key])
    }

    pub fn add(&mut self, variable: LinguisticVariable) -> Result<VariableKey, ConstructionError> {
        let folded = fold_name(&variable.name);

        if self.by_name.contains_key(&folded) {
            return Err(ConstructionError::DuplicateVariable(variable.name));
        }

        let key = self.variables.insert(variable);

        self.by_name.insert(folded, key);

        Ok(key)
    }

    pub fn get(&self, name: &str) -> Option<&LinguisticVariable> {
        self.key(name).map(|key| &self.variables[key])
    }

    pub fn key(&self, name: &str) -> Option<VariableKey> {
        self.by_name.get(&fold_name(name)).copied()
    }

    pub fn by_key(&self, key: VariableKey) -> Option<&LinguisticVariable> {
        self.variables.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (VariableKey, &LinguisticVariable)> {
        self.variables.iter()
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    /// `variable IS term`, looking both names up.
    pub fn proposition(&self, variable: &str, term: &str) -> Result<Proposition, ConstructionError> {
        self.get(variable)
            .ok_or_else(|| ConstructionError::UnknownVariable(variable.to_owned()))?
            .is(term)
    }
}

#[test]
fn test_term_names_are_unique_ignoring_case() {
    let mut var = LinguisticVariable::new("service").unwrap();

    var.triangular("Poor", 0., 0., 5.).unwrap();

    assert_eq!(
        var.triangular("poor", 0., 2., 5.),
        Err(ConstructionError::DuplicateTerm {
            variable: "service".into(),
            term: "poor".into()
        })
    );
    assert!(var.get("POOR").is_some());
    assert_eq!(var.len(), 1);
}

#[test]
fn test_variable_names_are_unique_ignoring_case() {
    let mut base = LinguisticBase::new();

    base.variable("Food").unwrap().triangular("bad", 0., 0., 5.).unwrap();

    assert_eq!(
        base.variable("food").unwrap_err(),
        ConstructionError::DuplicateVariable("food".into())
    );
    assert_eq!(base.get("FOOD").map(|v| v.name()), Some("Food"));
    assert_eq!(base.len(), 1);

    let key = base.key("food").unwrap();

    assert_eq!(base.by_key(key).map(|v| v.name()), Some("Food"));
    assert_eq!(base.iter().next().map(|(k, _)| k), Some(key));
}

#[test]
fn test_empty_names_are_rejected() {
    assert_eq!(LinguisticVariable::new("  "), Err(ConstructionError::EmptyName));

    let mut var = LinguisticVariable::new("x").unwrap();

    assert_eq!(var.gaussian("", 0., 1.).unwrap_err(), ConstructionError::EmptyName);
}

#[test]
fn test_fluent_configuration() {
    let mut base = LinguisticBase::new();

    base.variable("temperature")
        .unwrap()
        .with_universe(-10., 40.)
        .unwrap()
        .left_open_trapezoid("cold", 0., 10.)
        .unwrap()
        .gaussian("mild", 18., 4.)
        .unwrap()
        .right_open_trapezoid("hot", 25., 32.)
        .unwrap();

    let temperature = base.get("temperature").unwrap();

    assert_eq!(temperature.len(), 3);
    assert_eq!(temperature.universe(), Some(&Interval::new(-10., 40.)));
    assert_eq!(temperature.fuzzify(-5.)[0], ("cold", 1.));
    assert!(base.proposition("temperature", "warm").is_err());
    assert!(base.proposition("pressure", "hot").is_err());
    assert!(base.proposition("Temperature", "HOT").is_ok());
}

#[test]
fn test_invalid_universe() {
    let mut var = LinguisticVariable::new("x").unwrap();

    assert!(var.with_universe(5., 5.).is_err());
    assert!(var.with_universe(0., f64::INFINITY).is_err());
}
