use thiserror::Error;

/// Raised while building scalars, membership functions and linguistic variables.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ConstructionError {
    #[error("value {0} is outside of [0, 1]")]
    OutOfRange(f64),
    #[error("parameters must be finite numbers")]
    NonFinite,
    #[error("invalid {shape} parameters: {reason}")]
    InvalidParameters { shape: &'static str, reason: &'static str },
    #[error("degenerate {shape} shape")]
    Degenerate { shape: &'static str },
    #[error("height {0} is outside of (0, 1]")]
    HeightOutOfRange(f64),
    #[error("names must not be empty")]
    EmptyName,
    #[error("variable `{variable}` already has a term named `{term}`")]
    DuplicateTerm { variable: String, term: String },
    #[error("variable `{0}` is already defined")]
    DuplicateVariable(String),
    #[error("unknown variable `{0}`")]
    UnknownVariable(String),
    #[error("variable `{variable}` has no term named `{term}`")]
    UnknownTerm { variable: String, term: String },
    #[error("universe [{low}, {high}] is empty or unbounded")]
    InvalidUniverse { low: f64, high: f64 },
}

/// Raised by [`RuleDraft`](crate::RuleDraft) when clauses arrive out of order.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum RuleBuildError {
    #[error("rule already has an antecedent")]
    DuplicatedAntecedent,
    #[error("rule has no antecedent yet")]
    MissingAntecedent,
    #[error("rule is finalized")]
    FinalizedRule,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum RuleBaseError {
    #[error("rule is missing its {missing}")]
    InvalidRule { missing: &'static str },
    #[error("no such rule")]
    UnknownRule,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum InferenceError {
    #[error("no rule concluding `{variable}` applies to the current facts")]
    InapplicableRules { variable: String },
    #[error("working memory holds no facts")]
    NoFacts,
    #[error("rules disagree on the consequent variable: expected `{expected}`, found `{found}`")]
    MismatchedConsequent { expected: String, found: String },
    #[error("circular rule dependency: {}", cycle.join(" -> "))]
    CircularDependency { cycle: Vec<String> },
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("unknown {catalog} `{name}`")]
pub struct UnknownName {
    pub catalog: &'static str,
    pub name: String,
}

#[derive(Clone, Debug, Error, PartialEq)]
pub enum Error {
    #[error(transparent)]
    Construction(#[from] ConstructionError),
    #[error(transparent)]
    RuleBuild(#[from] RuleBuildError),
    #[error(transparent)]
    RuleBase(#[from] RuleBaseError),
    #[error(transparent)]
    Inference(#[from] InferenceError),
    #[error(transparent)]
    UnknownName(#[from] UnknownName),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
