use std::fmt;

use crate::membership::{Interval, MembershipFunction};
use crate::memory::WorkingMemory;
use crate::ops::{Connective, Hedge, Negation};
use crate::rules::Rule;
use crate::scalar::FuzzyScalar;
use crate::variable::{LinguisticVariable, Term};

#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum Literal {
    #[default]
    Is,
    IsNot,
}

/// One linguistic atom: `variable IS [NOT] [hedge] term`.
///
/// Carries a copy of the term's membership function and the variable's universe, so a rule
/// never has to reach back into the [`LinguisticBase`](crate::LinguisticBase).
#[derive(Clone, Debug, PartialEq)]
pub struct Proposition {
    variable: String,
    term: String,
    function: MembershipFunction,
    universe: Option<Interval>,
    literal: Literal,
    hedge: Option<Hedge>,
}

impl Proposition {
    pub(crate) fn new(variable: &LinguisticVariable, term: &Term) -> Self {
        Proposition {
            variable: variable.name().to_owned(),
            term: term.name().to_owned(),
            function: *term.function(),
            universe: variable.universe().copied(),
            literal: Literal::Is,
            hedge: None,
        }
    }

    /// Flips `IS` and `IS NOT`.
    pub fn negated(self) -> Self {
        let literal = match self.literal {
            Literal::Is => Literal::IsNot,
            Literal::IsNot => Literal::Is,
        };

        Proposition { literal, ..self }
    }

    pub fn with_hedge(self, hedge: Hedge) -> Self {
        Proposition {
            hedge: Some(hedge),
            ..self
        }
    }

    pub fn variable(&self) -> &str {
        &self.variable
    }

    pub fn term(&self) -> &str {
        &self.term
    }

    pub fn function(&self) -> &MembershipFunction {
        &self.function
    }

    pub fn universe(&self) -> Option<&Interval> {
        self.universe.as_ref()
    }

    pub fn literal(&self) -> Literal {
        self.literal
    }

    pub fn hedge(&self) -> Option<Hedge> {
        self.hedge
    }

    /// Degree to which a crisp `value` satisfies this proposition. The hedge is applied to the
    /// membership degree first, then the literal.
    pub fn degree(&self, value: f64, negation: Negation) -> FuzzyScalar {
        let mut mu = self.function.evaluate(value);

        if let Some(hedge) = self.hedge {
            mu = hedge.call(mu);
        }

        match self.literal {
            Literal::Is => mu,
            Literal::IsNot => negation.call(mu),
        }
    }

    /// `None` when the variable has no fact.
    pub fn degree_in(&self, facts: &WorkingMemory, negation: Negation) -> Option<FuzzyScalar> {
        facts.get(&self.variable).map(|value| self.degree(value, negation))
    }

    pub fn and(self, rhs: Proposition) -> WithAntecedent {
        EmptyRule.when(self).and(rhs)
    }

    pub fn or(self, rhs: Proposition) -> WithAntecedent {
        EmptyRule.when(self).or(rhs)
    }

    pub fn then(self, consequent: Proposition) -> Rule {
        EmptyRule.when(self).then(consequent)
    }
}

impl fmt::Display for Proposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} IS ", self.variable)?;

        if self.literal == Literal::IsNot {
            f.write_str("NOT ")?;
        }
        if let Some(hedge) = self.hedge {
            write!(f, "{} ", hedge.token())?;
        }

        f.write_str(&self.term)
    }
}

/// A rule with no clauses yet. Only [`EmptyRule::when`] is available.
#[derive(Clone, Copy, Debug, Default)]
pub struct EmptyRule;

impl EmptyRule {
    pub fn when(self, antecedent: Proposition) -> WithAntecedent {
        WithAntecedent {
            antecedent,
            connectives: Vec::new(),
        }
    }
}

/// A rule with its antecedent set. More premises may follow before [`WithAntecedent::then`]
/// finalizes it.
#[derive(Clone, Debug)]
pub struct WithAntecedent {
    antecedent: Proposition,
    connectives: Vec<(Connective, Proposition)>,
}

impl WithAntecedent {
    pub fn and(mut self, rhs: Proposition) -> Self {
        self.connectives.push((Connective::And, rhs));
        self
    }

    pub fn or(mut self, rhs: Proposition) -> Self {
        self.connectives.push((Connective::Or, rhs));
        self
    }

    pub fn connect(mut self, connective: Connective, rhs: Proposition) -> Self {
        self.connectives.push((connective, rhs));
        self
    }

    pub fn then(self, consequent: Proposition) -> Rule {
        Rule::new(self.antecedent, self.connectives, consequent)
    }
}

#[cfg(test)]
fn food() -> LinguisticVariable {
    let mut food = LinguisticVariable::new("food").unwrap();

    food.triangular("bad", 0., 0., 5.)
        .unwrap()
        .triangular("decent", 0., 5., 10.)
        .unwrap();
    food
}

#[test]
fn test_degree_applies_hedge_then_literal() {
    let food = food();
    let decent = food.is("decent").unwrap();

    assert_eq!(decent.degree(2.5, Negation::Standard).value(), 0.5);

    let very = decent.clone().with_hedge(Hedge::Very);

    assert_eq!(very.degree(2.5, Negation::Standard).value(), 0.25);
    assert_eq!(very.negated().degree(2.5, Negation::Standard).value(), 0.75);
}

#[test]
fn test_degree_in_needs_a_fact() {
    let food = food();
    let bad = food.is_not("bad").unwrap();
    let mut facts = WorkingMemory::new();

    assert_eq!(bad.degree_in(&facts, Negation::Standard), None);

    facts.set("FOOD", 0.);

    assert_eq!(bad.degree_in(&facts, Negation::Standard), Some(FuzzyScalar::ZERO));
}

#[test]
fn test_display() {
    let food = food();
    let prop = food.is_not("bad").unwrap().with_hedge(Hedge::Very);

    assert_eq!(prop.to_string(), "food IS NOT very bad");
}
