use slotmap::{new_key_type, SlotMap};
use tracing::trace;

use crate::error::RuleBaseError;
use crate::graph::{BackEdge, Cycle, DependencyGraph};
use crate::memory::WorkingMemory;
use crate::rules::{Rule, RuleDraft};

new_key_type! {
    /// A rule key
    pub struct RuleKey;
}

/// Rules in insertion order, plus the dependency graph they imply.
#[derive(Clone, Debug, Default)]
pub struct RuleBase {
    rules: SlotMap<RuleKey, Rule>,
    order: Vec<RuleKey>,
    graph: DependencyGraph,
}

impl RuleBase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        RuleBase {
            rules: SlotMap::with_capacity_and_key(capacity),
            order: Vec::with_capacity(capacity),
            graph: DependencyGraph::new(),
        }
    }

    pub fn add(&mut self, rule: Rule) -> RuleKey {
        trace!(%rule, "adding rule");

        self.graph.insert_rule(&rule);

        let key = self.rules.insert(rule);

        self.order.push(key);
        key
    }

    /// Adds a runtime assembled rule. Fails unless it has both an antecedent and a consequent.
    pub fn add_draft(&mut self, draft: RuleDraft) -> Result<RuleKey, RuleBaseError> {
        Ok(self.add(Rule::try_from(draft)?))
    }

    pub fn remove(&mut self, key: RuleKey) -> Result<Rule, RuleBaseError> {
        let rule = self.rules.remove(key).ok_or(RuleBaseError::UnknownRule)?;

        trace!(%rule, "removing rule");

        self.order.retain(|k| *k != key);
        self.graph.remove_rule(&rule);

        Ok(rule)
    }

    pub fn get(&self, key: RuleKey) -> Option<&Rule> {
        self.rules.get(key)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Rules in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (RuleKey, &Rule)> {
        self.order.iter().map(move |key| (*key, &self.rules[*key]))
    }

    pub fn find_rules_with_premise<'r>(&'r self, variable: &'r str) -> impl Iterator<Item = (RuleKey, &'r Rule)> {
        self.iter().filter(move |(_, rule)| rule.has_premise(variable))
    }

    pub fn find_rules_with_conclusion<'r>(&'r self, variable: &'r str) -> impl Iterator<Item = (RuleKey, &'r Rule)> {
        self.iter().filter(move |(_, rule)| rule.has_conclusion(variable))
    }

    /// Rules whose premise variables all have facts.
    pub fn find_applicable_rules<'r>(
        &'r self,
        facts: &'r WorkingMemory,
    ) -> impl Iterator<Item = (RuleKey, &'r Rule)> {
        self.iter().filter(move |(_, rule)| rule.is_applicable(facts))
    }

    pub fn dependency_graph(&self) -> &DependencyGraph {
        &self.graph
    }

    pub fn find_cycles(&self) -> Vec<Cycle> {
        self.graph.cycles()
    }

    pub fn find_back_edges(&self) -> Vec<BackEdge> {
        self.graph.back_edges()
    }
}

impl Extend<Rule> for RuleBase {
    fn extend<T: IntoIterator<Item = Rule>>(&mut self, iter: T) {
        for rule in iter {
            self.add(rule);
        }
    }
}

impl FromIterator<Rule> for RuleBase {
    fn from_iter<T: IntoIterator<Item = Rule>>(iter: T) -> Self {
        let iter = iter.into_iter();
        let mut rules = RuleBase::with_capacity(iter.size_hint().0);

        rules.extend(iter);
        rules
    }
}

#[cfg(test)]
fn abc() -> crate::variable::LinguisticBase {
    let mut base = crate::variable::LinguisticBase::new();

    for name in ["A", "B", "C", "D"] {
        base.variable(name).unwrap().triangular("on", 0., 1., 2.).unwrap();
    }

    base
}

#[test]
fn test_dependency_graph() {
    use std::collections::BTreeSet;

    let base = abc();
    let on = |v: &str| base.proposition(v, "on").unwrap();
    let mut rules = RuleBase::new();

    rules.add(on("A").then(on("C")));
    rules.add(on("B").then(on("C")));

    let graph = rules.dependency_graph();

    assert_eq!(graph.dependencies("C"), Some(BTreeSet::from(["A", "B"])));
    assert_eq!(graph.dependencies("A"), Some(BTreeSet::new()));
    assert_eq!(graph.dependencies("B"), Some(BTreeSet::new()));
    assert_eq!(graph.len(), 3);
    assert!(rules.find_cycles().is_empty());
}

#[test]
fn test_remove_updates_graph() {
    use std::collections::BTreeSet;

    let base = abc();
    let on = |v: &str| base.proposition(v, "on").unwrap();
    let mut rules = RuleBase::new();
    let first = rules.add(on("A").and(on("D")).then(on("C")));
    let second = rules.add(on("B").then(on("C")));
    let cyclic = rules.add(on("C").then(on("A")));

    assert!(!rules.find_cycles().is_empty());
    assert!(!rules.find_back_edges().is_empty());

    rules.remove(cyclic).unwrap();

    assert!(rules.find_cycles().is_empty());

    rules.remove(first).unwrap();

    assert_eq!(rules.dependency_graph().dependencies("C"), Some(BTreeSet::from(["B"])));
    assert!(!rules.dependency_graph().contains("D"));
    assert!(!rules.dependency_graph().contains("A"));
    assert_eq!(rules.remove(first), Err(RuleBaseError::UnknownRule));

    rules.remove(second).unwrap();

    assert!(rules.dependency_graph().is_empty());
    assert!(rules.is_empty());
}

#[test]
fn test_queries_preserve_order() {
    let base = abc();
    let on = |v: &str| base.proposition(v, "on").unwrap();
    let rules: RuleBase = [
        on("A").then(on("C")),
        on("B").or(on("A")).then(on("D")),
        on("A").then(on("D")),
    ]
    .into_iter()
    .collect();

    let with_a: Vec<_> = rules.find_rules_with_premise("a").map(|(_, r)| r.consequent_variable()).collect();

    assert_eq!(with_a, ["C", "D", "D"]);
    assert_eq!(rules.find_rules_with_conclusion("d").count(), 2);

    let facts: WorkingMemory = [("A", 1.)].into_iter().collect();
    let applicable: Vec<_> = rules.find_applicable_rules(&facts).map(|(_, r)| r.to_string()).collect();

    assert_eq!(applicable, ["IF A IS on THEN C IS on", "IF A IS on THEN D IS on"]);
}

#[test]
fn test_add_draft_rejects_incomplete_rules() {
    let base = abc();
    let mut draft = RuleDraft::new();

    draft.when(base.proposition("A", "on").unwrap()).unwrap();

    let mut rules = RuleBase::new();

    assert_eq!(
        rules.add_draft(draft),
        Err(RuleBaseError::InvalidRule { missing: "consequent" })
    );
    assert!(rules.is_empty());
}
