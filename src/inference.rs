use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::defuzz::ClippedRegion;
use crate::error::InferenceError;
use crate::membership::Integration;
use crate::memory::WorkingMemory;
use crate::ops::*;
use crate::outputs::Defuzzifications;
use crate::rulebase::{RuleBase, RuleKey};
use crate::rules::Rule;
use crate::scalar::FuzzyScalar;
use crate::variable::same_name;

/// Operators and methods an [`InferenceEngine`] evaluates with. Every field is optional when
/// deserializing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct EngineConfig {
    #[serde(flatten)]
    pub algebra: Algebra,
    pub implication: ImplicationMethod,
    pub defuzzification: DefuzzificationMethod,
    pub integration: Integration,
}

impl EngineConfig {
    pub fn from_family(family: Family) -> Self {
        EngineConfig {
            algebra: family.algebra(),
            ..Self::default()
        }
    }
}

/// Evaluates a [`RuleBase`] against the facts of a [`WorkingMemory`].
///
/// The engine only borrows both; callers must not mutate them while it is alive.
#[derive(Clone, Copy, Debug)]
pub struct InferenceEngine<'a> {
    rules: &'a RuleBase,
    memory: &'a WorkingMemory,
    config: EngineConfig,
}

impl<'a> InferenceEngine<'a> {
    pub fn new(rules: &'a RuleBase, memory: &'a WorkingMemory) -> Self {
        InferenceEngine {
            rules,
            memory,
            config: EngineConfig::default(),
        }
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_family(mut self, family: Family) -> Self {
        self.config.algebra = family.algebra();
        self
    }

    pub fn with_negation(mut self, negation: Negation) -> Self {
        self.config.algebra.negation = negation;
        self
    }

    pub fn with_tnorm(mut self, tnorm: TNorm) -> Self {
        self.config.algebra.tnorm = tnorm;
        self
    }

    pub fn with_tconorm(mut self, tconorm: TConorm) -> Self {
        self.config.algebra.tconorm = tconorm;
        self
    }

    pub fn with_residuum(mut self, residuum: Residuum) -> Self {
        self.config.algebra.residuum = residuum;
        self
    }

    pub fn with_implication(mut self, implication: ImplicationMethod) -> Self {
        self.config.implication = implication;
        self
    }

    pub fn with_defuzzification(mut self, defuzzification: DefuzzificationMethod) -> Self {
        self.config.defuzzification = defuzzification;
        self
    }

    pub fn with_integration(mut self, integration: Integration) -> Self {
        self.config.integration = integration;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Crisp value of `target` from the facts in working memory.
    ///
    /// Errors when no rule can be evaluated. `Ok(None)` means the rules fired but their clipped
    /// consequents carry no weight.
    pub fn defuzzify(&self, target: &str) -> Result<Option<f64>, InferenceError> {
        let regions = self.clip(target)?;
        let value = self.config.defuzzification.call(&regions);

        debug!(
            variable = target,
            method = %self.config.defuzzification,
            ?value,
            "defuzzified"
        );

        Ok(value)
    }

    /// Every defuzzification method over the same clipped consequents.
    pub fn defuzzify_each(&self, target: &str) -> Result<Defuzzifications, InferenceError> {
        let regions = self.clip(target)?;

        Ok(Defuzzifications::new(target, &regions))
    }

    /// The consequents of the rules concluding `target`, clipped by their firing strengths.
    pub fn clip(&self, target: &str) -> Result<Vec<ClippedRegion<'a>>, InferenceError> {
        self.clip_with(target, self.memory)
    }

    fn clip_with(&self, target: &str, facts: &WorkingMemory) -> Result<Vec<ClippedRegion<'a>>, InferenceError> {
        let rules: &'a RuleBase = self.rules;
        let selected: Vec<(RuleKey, &'a Rule)> = rules.iter().filter(|(_, rule)| rule.has_conclusion(target)).collect();
        let inapplicable = || InferenceError::InapplicableRules {
            variable: target.to_owned(),
        };

        let expected = match selected.first() {
            Some((_, rule)) => rule.consequent_variable(),
            None => return Err(inapplicable()),
        };

        if facts.is_empty() {
            return Err(InferenceError::NoFacts);
        }
        if let Some((_, rule)) = selected.iter().find(|(_, rule)| rule.consequent_variable() != expected) {
            return Err(InferenceError::MismatchedConsequent {
                expected: expected.to_owned(),
                found: rule.consequent_variable().to_owned(),
            });
        }
        if rules.dependency_graph().is_cyclic_through(target) {
            warn!(variable = target, "variable depends on itself through a rule cycle");
        }

        let Algebra { negation, .. } = self.config.algebra;
        let regions: Vec<_> = selected
            .iter()
            .filter_map(|&(key, rule)| {
                let strength = rule.firing_strength(facts, &self.config.algebra)?;

                trace!(%rule, strength = strength.value(), "rule fired");

                Some(ClippedRegion::new(
                    key,
                    rule.consequent(),
                    strength,
                    self.config.implication,
                    negation,
                    &self.config.integration,
                ))
            })
            .collect();

        if regions.is_empty() {
            return Err(inapplicable());
        }

        debug!(
            variable = target,
            selected = selected.len(),
            applicable = regions.len(),
            "clipped consequents"
        );

        Ok(regions)
    }

    /// Truth of a rule read as an implication: the residuum of its firing strength and the degree
    /// its consequent holds for the consequent variable's own fact.
    ///
    /// `None` for unknown rules or when either side lacks a fact.
    pub fn rule_truth(&self, key: RuleKey) -> Option<FuzzyScalar> {
        let rule = self.rules.get(key)?;
        let Algebra { negation, residuum, .. } = self.config.algebra;
        let premise = rule.firing_strength(self.memory, &self.config.algebra)?;
        let conclusion = rule.consequent().degree_in(self.memory, negation)?;

        Some(residuum.call(premise, conclusion))
    }

    /// Like [`InferenceEngine::defuzzify`], but premise variables missing from working memory are
    /// derived first from the rules concluding them. Derived values live in a private copy of the
    /// memory.
    pub fn infer(&self, target: &str) -> Result<Option<f64>, InferenceError> {
        let mut facts = self.memory.clone();
        let mut path = Vec::new();

        self.derive(target, &mut facts, &mut path)
    }

    fn derive(
        &self,
        target: &str,
        facts: &mut WorkingMemory,
        path: &mut Vec<String>,
    ) -> Result<Option<f64>, InferenceError> {
        let rules: &'a RuleBase = self.rules;
        let premises = rules.dependency_graph().dependencies(target).unwrap_or_default();

        path.push(target.to_owned());

        for premise in premises {
            if facts.contains(premise) || rules.find_rules_with_conclusion(premise).next().is_none() {
                continue;
            }
            if let Some(start) = path.iter().position(|name| same_name(name, premise)) {
                let mut cycle = path[start..].to_vec();

                cycle.push(premise.to_owned());

                return Err(InferenceError::CircularDependency { cycle });
            }

            match self.derive(premise, facts, path) {
                Ok(Some(value)) => {
                    debug!(variable = premise, value, "derived intermediate fact");
                    facts.set(premise, value);
                },
                Ok(None) => debug!(variable = premise, "intermediate variable is inconclusive"),
                Err(err @ InferenceError::CircularDependency { .. }) => return Err(err),
                Err(err) => debug!(variable = premise, %err, "could not derive intermediate variable"),
            }
        }

        path.pop();

        let regions = self.clip_with(target, facts)?;

        Ok(self.config.defuzzification.call(&regions))
    }
}

#[cfg(test)]
fn thermostat() -> (crate::variable::LinguisticBase, RuleBase) {
    let mut base = crate::variable::LinguisticBase::new();

    base.variable("temperature")
        .unwrap()
        .left_open_trapezoid("cold", 10., 18.)
        .unwrap()
        .right_open_trapezoid("hot", 18., 26.)
        .unwrap();
    base.variable("heating")
        .unwrap()
        .with_universe(0., 100.)
        .unwrap()
        .triangular("off", 0., 0., 50.)
        .unwrap()
        .triangular("full", 50., 100., 100.)
        .unwrap();

    let p = |v: &str, t: &str| base.proposition(v, t).unwrap();
    let rules = [
        p("temperature", "cold").then(p("heating", "full")),
        p("temperature", "hot").then(p("heating", "off")),
    ]
    .into_iter()
    .collect();

    (base, rules)
}

#[test]
fn test_engine_config_defaults() {
    let config = EngineConfig::default();

    assert_eq!(config.algebra, Family::Godel.algebra());
    assert_eq!(config.implication, ImplicationMethod::MamdaniMinimum);
    assert_eq!(config.defuzzification, DefuzzificationMethod::CentreOfGravity);
    assert_eq!(config.integration, Integration::default());
    assert_eq!(EngineConfig::from_family(Family::Product).algebra.tnorm, TNorm::Product);
}

#[test]
fn test_fluent_setters() {
    let (_, rules) = thermostat();
    let facts = WorkingMemory::new();
    let engine = InferenceEngine::new(&rules, &facts)
        .with_family(Family::Lukasiewicz)
        .with_negation(Negation::Yager)
        .with_implication(ImplicationMethod::LarsenProduct)
        .with_defuzzification(DefuzzificationMethod::MeanOfMaxima);
    let config = engine.config();

    assert_eq!(config.algebra.tnorm, TNorm::Lukasiewicz);
    assert_eq!(config.algebra.negation, Negation::Yager);
    assert_eq!(config.implication, ImplicationMethod::LarsenProduct);
    assert_eq!(config.defuzzification, DefuzzificationMethod::MeanOfMaxima);
}

#[test]
fn test_structural_errors() {
    let (_, rules) = thermostat();
    let empty = WorkingMemory::new();
    let facts: WorkingMemory = [("pressure", 1.)].into_iter().collect();

    assert_eq!(
        InferenceEngine::new(&rules, &facts).defuzzify("humidity"),
        Err(InferenceError::InapplicableRules {
            variable: "humidity".into()
        })
    );
    assert_eq!(
        InferenceEngine::new(&rules, &empty).defuzzify("heating"),
        Err(InferenceError::NoFacts)
    );
    assert_eq!(
        InferenceEngine::new(&rules, &facts).defuzzify("heating"),
        Err(InferenceError::InapplicableRules {
            variable: "heating".into()
        })
    );
}

#[test]
fn test_maxima_of_open_premises() {
    let (_, rules) = thermostat();
    let facts: WorkingMemory = [("temperature", 14.)].into_iter().collect();
    let engine = InferenceEngine::new(&rules, &facts).with_defuzzification(DefuzzificationMethod::FirstOfMaxima);

    // cold holds to 0.5 at 14 and hot does not fire
    assert_eq!(engine.defuzzify("heating"), Ok(Some(75.)));
    assert_eq!(engine.with_defuzzification(DefuzzificationMethod::LastOfMaxima).defuzzify("heating"), Ok(Some(100.)));
}

#[test]
fn test_rule_truth() {
    let (_, rules) = thermostat();
    let (full, off) = {
        let keys: Vec<_> = rules.iter().map(|(key, _)| key).collect();
        (keys[0], keys[1])
    };
    // cold = 0.5, full = 0.4
    let facts: WorkingMemory = [("temperature", 14.), ("heating", 70.)].into_iter().collect();
    let engine = InferenceEngine::new(&rules, &facts);

    assert_eq!(engine.rule_truth(full), FuzzyScalar::of(0.4).ok());
    assert_eq!(engine.with_residuum(Residuum::Lukasiewicz).rule_truth(full), FuzzyScalar::of(0.9).ok());
    // hot = 0, so the implication holds trivially
    assert_eq!(engine.rule_truth(off), Some(FuzzyScalar::ONE));

    let premises_only: WorkingMemory = [("temperature", 14.)].into_iter().collect();

    assert_eq!(InferenceEngine::new(&rules, &premises_only).rule_truth(full), None);
}
