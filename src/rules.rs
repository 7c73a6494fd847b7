use std::fmt;

use crate::dsl::Proposition;
use crate::error::{RuleBaseError, RuleBuildError};
use crate::memory::WorkingMemory;
use crate::ops::{Algebra, Connective};
use crate::scalar::FuzzyScalar;
use crate::variable::same_name;

/// A finalized production rule: `IF antecedent (AND|OR premise)* THEN consequent`.
///
/// Built through [`EmptyRule`](crate::EmptyRule) or [`RuleDraft`], immutable afterwards.
#[derive(Clone, Debug, PartialEq)]
pub struct Rule {
    antecedent: Proposition,
    connectives: Vec<(Connective, Proposition)>,
    consequent: Proposition,
}

impl Rule {
    pub(crate) fn new(
        antecedent: Proposition,
        connectives: Vec<(Connective, Proposition)>,
        consequent: Proposition,
    ) -> Self {
        Rule {
            antecedent,
            connectives,
            consequent,
        }
    }

    pub fn antecedent(&self) -> &Proposition {
        &self.antecedent
    }

    pub fn connectives(&self) -> &[(Connective, Proposition)] {
        &self.connectives
    }

    pub fn consequent(&self) -> &Proposition {
        &self.consequent
    }

    /// The antecedent followed by every connected premise, in order.
    pub fn premises(&self) -> impl Iterator<Item = &Proposition> {
        std::iter::once(&self.antecedent).chain(self.connectives.iter().map(|(_, p)| p))
    }

    pub fn consequent_variable(&self) -> &str {
        self.consequent.variable()
    }

    pub fn has_premise(&self, variable: &str) -> bool {
        self.premises().any(|p| same_name(p.variable(), variable))
    }

    pub fn has_conclusion(&self, variable: &str) -> bool {
        same_name(self.consequent.variable(), variable)
    }

    /// Whether every premise variable has a fact.
    pub fn is_applicable(&self, facts: &WorkingMemory) -> bool {
        self.premises().all(|p| facts.contains(p.variable()))
    }

    /// Folds the premises left to right: AND through the t-norm, OR through the t-conorm.
    ///
    /// `None` unless every premise variable has a fact.
    pub fn firing_strength(&self, facts: &WorkingMemory, algebra: &Algebra) -> Option<FuzzyScalar> {
        let seed = self.antecedent.degree_in(facts, algebra.negation)?;

        self.connectives.iter().try_fold(seed, |acc, (connective, premise)| {
            let degree = premise.degree_in(facts, algebra.negation)?;

            Some(connective.call(algebra, acc, degree))
        })
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IF {}", self.antecedent)?;

        for (connective, premise) in &self.connectives {
            write!(f, " {} {}", connective.display_name(), premise)?;
        }

        write!(f, " THEN {}", self.consequent)
    }
}

/// A rule assembled at runtime, one clause at a time.
///
/// Follows the same `empty -> with antecedent -> finalized` order as [`EmptyRule`](crate::EmptyRule),
/// but reports out of order clauses as [`RuleBuildError`]s instead of refusing to compile.
#[derive(Clone, Debug, Default)]
pub struct RuleDraft {
    antecedent: Option<Proposition>,
    connectives: Vec<(Connective, Proposition)>,
    consequent: Option<Proposition>,
}

impl RuleDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn when(&mut self, antecedent: Proposition) -> Result<&mut Self, RuleBuildError> {
        if self.is_finalized() {
            return Err(RuleBuildError::FinalizedRule);
        }
        if self.antecedent.is_some() {
            return Err(RuleBuildError::DuplicatedAntecedent);
        }

        self.antecedent = Some(antecedent);

        Ok(self)
    }

    pub fn and(&mut self, premise: Proposition) -> Result<&mut Self, RuleBuildError> {
        self.connect(Connective::And, premise)
    }

    pub fn or(&mut self, premise: Proposition) -> Result<&mut Self, RuleBuildError> {
        self.connect(Connective::Or, premise)
    }

    pub fn connect(&mut self, connective: Connective, premise: Proposition) -> Result<&mut Self, RuleBuildError> {
        self.expect_open()?;
        self.connectives.push((connective, premise));

        Ok(self)
    }

    pub fn then(&mut self, consequent: Proposition) -> Result<&mut Self, RuleBuildError> {
        self.expect_open()?;
        self.consequent = Some(consequent);

        Ok(self)
    }

    fn expect_open(&self) -> Result<(), RuleBuildError> {
        if self.is_finalized() {
            Err(RuleBuildError::FinalizedRule)
        } else if self.antecedent.is_none() {
            Err(RuleBuildError::MissingAntecedent)
        } else {
            Ok(())
        }
    }

    pub fn is_finalized(&self) -> bool {
        self.consequent.is_some()
    }

    /// Both antecedent and consequent are present.
    pub fn is_valid(&self) -> bool {
        self.antecedent.is_some() && self.consequent.is_some()
    }
}

impl TryFrom<RuleDraft> for Rule {
    type Error = RuleBaseError;

    fn try_from(draft: RuleDraft) -> Result<Self, Self::Error> {
        let antecedent = draft
            .antecedent
            .ok_or(RuleBaseError::InvalidRule { missing: "antecedent" })?;
        let consequent = draft
            .consequent
            .ok_or(RuleBaseError::InvalidRule { missing: "consequent" })?;

        Ok(Rule::new(antecedent, draft.connectives, consequent))
    }
}

#[cfg(test)]
fn tipping() -> crate::variable::LinguisticBase {
    let mut base = crate::variable::LinguisticBase::new();

    base.variable("food")
        .unwrap()
        .triangular("bad", 0., 0., 5.)
        .unwrap()
        .triangular("great", 5., 10., 10.)
        .unwrap();
    base.variable("service")
        .unwrap()
        .triangular("poor", 0., 0., 5.)
        .unwrap()
        .triangular("amazing", 5., 10., 10.)
        .unwrap();
    base.variable("tip")
        .unwrap()
        .triangular("low", 0., 0., 13.)
        .unwrap()
        .triangular("high", 13., 25., 35.)
        .unwrap();
    base
}

#[test]
fn test_firing_strength_folds_in_order() {
    use crate::ops::{TConorm, TNorm};

    let base = tipping();
    let p = |v: &str, t: &str| base.proposition(v, t).unwrap();
    // (great AND amazing) OR bad, never re-associated
    let rule = p("food", "great")
        .and(p("service", "amazing"))
        .or(p("food", "bad"))
        .then(p("tip", "high"));
    let facts: WorkingMemory = [("food", 6.), ("service", 9.)].into_iter().collect();
    let algebra = Algebra::default();

    // min(0.2, 0.8) = 0.2, max(0.2, 0) = 0.2
    assert_eq!(rule.firing_strength(&facts, &algebra), FuzzyScalar::of(0.2).ok());

    let product = Algebra {
        tnorm: TNorm::Product,
        tconorm: TConorm::ProbabilisticSum,
        ..Algebra::default()
    };

    assert_eq!(rule.firing_strength(&facts, &product), FuzzyScalar::of(0.16).ok());
}

#[test]
fn test_firing_strength_fails_closed() {
    let base = tipping();
    let rule = base
        .proposition("food", "bad")
        .unwrap()
        .or(base.proposition("service", "poor").unwrap())
        .then(base.proposition("tip", "low").unwrap());
    let facts: WorkingMemory = [("food", 1.)].into_iter().collect();

    assert!(!rule.is_applicable(&facts));
    assert_eq!(rule.firing_strength(&facts, &Algebra::default()), None);
}

#[test]
fn test_draft_state_machine() {
    let base = tipping();
    let p = |v: &str, t: &str| base.proposition(v, t).unwrap();
    let mut draft = RuleDraft::new();

    assert_eq!(draft.and(p("food", "bad")).unwrap_err(), RuleBuildError::MissingAntecedent);
    assert_eq!(draft.then(p("tip", "low")).unwrap_err(), RuleBuildError::MissingAntecedent);

    draft.when(p("food", "bad")).unwrap();

    assert_eq!(draft.when(p("food", "great")).unwrap_err(), RuleBuildError::DuplicatedAntecedent);
    assert!(!draft.is_valid());

    draft.or(p("service", "poor")).unwrap().then(p("tip", "low")).unwrap();

    assert!(draft.is_valid());
    assert_eq!(draft.and(p("food", "bad")).unwrap_err(), RuleBuildError::FinalizedRule);
    assert_eq!(draft.when(p("food", "bad")).unwrap_err(), RuleBuildError::FinalizedRule);
    assert_eq!(draft.then(p("tip", "high")).unwrap_err(), RuleBuildError::FinalizedRule);

    let rule = Rule::try_from(draft).unwrap();

    assert_eq!(rule.to_string(), "IF food IS bad OR service IS poor THEN tip IS low");
    assert!(rule.has_premise("SERVICE"));
    assert!(rule.has_conclusion("Tip"));
}

#[test]
fn test_incomplete_draft_is_invalid() {
    let base = tipping();
    let mut draft = RuleDraft::new();

    draft.when(base.proposition("food", "bad").unwrap()).unwrap();

    assert_eq!(
        Rule::try_from(draft),
        Err(RuleBaseError::InvalidRule { missing: "consequent" })
    );
    assert_eq!(
        Rule::try_from(RuleDraft::new()),
        Err(RuleBaseError::InvalidRule { missing: "antecedent" })
    );
}
