//! Fuzzy production rules evaluated against crisp facts.
//!
//! Linguistic variables map term names to membership functions. Rules over those terms are
//! collected in a [`RuleBase`], facts live in a [`WorkingMemory`], and an [`InferenceEngine`]
//! fires the rules concluding a variable and defuzzifies their clipped consequents.
//!
//! ```
//! use fuzzy_rules::{DefuzzificationMethod, InferenceEngine, LinguisticBase, RuleBase, WorkingMemory};
//!
//! # fn main() -> fuzzy_rules::Result<()> {
//! let mut base = LinguisticBase::new();
//!
//! base.variable("service")?
//!     .triangular("poor", 0., 0., 5.)?
//!     .triangular("amazing", 5., 10., 10.)?;
//! base.variable("tip")?
//!     .triangular("low", 0., 0., 13.)?
//!     .triangular("high", 13., 25., 35.)?;
//!
//! let mut rules = RuleBase::new();
//!
//! rules.add(base.proposition("service", "poor")?.then(base.proposition("tip", "low")?));
//! rules.add(base.proposition("service", "amazing")?.then(base.proposition("tip", "high")?));
//!
//! let facts: WorkingMemory = [("service", 10.)].into_iter().collect();
//! let engine = InferenceEngine::new(&rules, &facts).with_defuzzification(DefuzzificationMethod::MeanOfMaxima);
//!
//! assert_eq!(engine.defuzzify("tip")?, Some(25.));
//! # Ok(())
//! # }
//! ```

mod defuzz;
mod dsl;
mod error;
mod graph;
mod inference;
mod linspace;
mod math;
mod membership;
mod memory;
mod ops;
mod outputs;
mod rulebase;
mod rules;
mod scalar;
mod variable;

pub use defuzz::ClippedRegion;
pub use dsl::{EmptyRule, Literal, Proposition, WithAntecedent};
pub use error::{
    ConstructionError, Error, InferenceError, Result, RuleBaseError, RuleBuildError, UnknownName,
};
pub use graph::{BackEdge, Cycle, DependencyGraph};
pub use inference::{EngineConfig, InferenceEngine};
pub use membership::{Geometry, Integration, Interval, MembershipFunction, Shape};
pub use memory::{ResolutionPolicy, WorkingMemory};
pub use ops::{
    Algebra, Connective, DefuzzificationMethod, Family, Hedge, ImplicationMethod, Negation, Residuum, TConorm, TNorm,
};
pub use outputs::Defuzzifications;
pub use rulebase::{RuleBase, RuleKey};
pub use rules::{Rule, RuleDraft};
pub use scalar::FuzzyScalar;
pub use variable::{LinguisticBase, LinguisticVariable, Term, VariableKey};
