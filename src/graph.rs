//! Variable dependencies implied by a rule set.
//!
//! A rule `IF a AND b THEN c` makes `c` depend on `a` and `b`. Edges are reference counted
//! per rule, so adding or removing a rule updates the graph in place instead of rebuilding it.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

use crate::rules::Rule;
use crate::variable::fold_name;

#[derive(Clone, Debug, Default, PartialEq)]
struct Node {
    /// Spelling of the first mention
    name: String,
    /// References held by rules (or explicit edges) keeping this node alive
    mentions: usize,
    /// Premise variable -> number of rules contributing the edge
    premises: BTreeMap<String, usize>,
}

/// A dependency cycle as a path that returns to its first variable, e.g. `[a, b, a]`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Cycle(Vec<String>);

impl Cycle {
    pub fn path(&self) -> &[String] {
        &self.0
    }

    /// Distinct variables on the cycle.
    pub fn variables(&self) -> BTreeSet<&str> {
        self.0.iter().map(String::as_str).collect()
    }

    fn key(&self) -> BTreeSet<String> {
        self.0.iter().map(|n| fold_name(n)).collect()
    }
}

impl fmt::Display for Cycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(" -> "))
    }
}

/// The edge that closes a cycle during depth first search.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct BackEdge {
    pub descendant: String,
    pub ancestor: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Color {
    White,
    Gray,
    Black,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct DependencyGraph {
    nodes: BTreeMap<String, Node>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a graph straight from `variable -> [dependencies]` pairs.
    pub fn from_adjacency<K, V, I>(adjacency: I) -> Self
    where
        K: AsRef<str>,
        V: IntoIterator<Item = K>,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut graph = DependencyGraph::new();

        for (variable, dependencies) in adjacency {
            let variable = variable.as_ref();

            graph.mention(variable);

            for dependency in dependencies {
                graph.mention(dependency.as_ref());
                graph.link(variable, dependency.as_ref());
            }
        }

        graph
    }

    fn mention(&mut self, name: &str) {
        let node = self.nodes.entry(fold_name(name)).or_insert_with(|| Node {
            name: name.to_owned(),
            ..Node::default()
        });

        node.mentions += 1;
    }

    fn forget(&mut self, key: &str) {
        if let Some(node) = self.nodes.get_mut(key) {
            node.mentions = node.mentions.saturating_sub(1);

            if node.mentions == 0 {
                self.nodes.remove(key);
            }
        }
    }

    fn link(&mut self, from: &str, to: &str) {
        if let Some(node) = self.nodes.get_mut(&fold_name(from)) {
            *node.premises.entry(fold_name(to)).or_insert(0) += 1;
        }
    }

    fn unlink(&mut self, from: &str, to: &str) {
        if let Some(node) = self.nodes.get_mut(from) {
            if let Some(count) = node.premises.get_mut(to) {
                *count -= 1;

                if *count == 0 {
                    node.premises.remove(to);
                }
            }
        }
    }

    /// Distinct premise variables of a rule, folded.
    fn rule_premises(rule: &Rule) -> BTreeMap<String, &str> {
        rule.premises().map(|p| (fold_name(p.variable()), p.variable())).collect()
    }

    pub(crate) fn insert_rule(&mut self, rule: &Rule) {
        let consequent = rule.consequent_variable();

        self.mention(consequent);

        for name in Self::rule_premises(rule).into_values() {
            self.mention(name);
            self.link(consequent, name);
        }
    }

    pub(crate) fn remove_rule(&mut self, rule: &Rule) {
        let consequent = fold_name(rule.consequent_variable());

        for key in Self::rule_premises(rule).into_keys() {
            self.unlink(&consequent, &key);
            self.forget(&key);
        }

        self.forget(&consequent);
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, variable: &str) -> bool {
        self.nodes.contains_key(&fold_name(variable))
    }

    /// Every variable mentioned by any rule.
    pub fn variables(&self) -> impl Iterator<Item = &str> {
        self.nodes.values().map(|node| node.name.as_str())
    }

    /// Premise variables of all rules concluding `variable`. Empty for pure facts, `None` for
    /// variables no rule mentions.
    pub fn dependencies(&self, variable: &str) -> Option<BTreeSet<&str>> {
        let node = self.nodes.get(&fold_name(variable))?;

        Some(node.premises.keys().filter_map(|key| self.display(key)).collect())
    }

    fn display(&self, key: &str) -> Option<&str> {
        self.nodes.get(key).map(|node| node.name.as_str())
    }

    /// Whether `variable` can reach itself through one or more dependencies.
    pub fn is_cyclic_through(&self, variable: &str) -> bool {
        let start = fold_name(variable);
        let mut seen = BTreeSet::new();
        let mut stack: Vec<&str> = match self.nodes.get(&start) {
            Some(node) => node.premises.keys().map(String::as_str).collect(),
            None => return false,
        };

        while let Some(key) = stack.pop() {
            if key == start {
                return true;
            }
            if !seen.insert(key) {
                continue;
            }
            if let Some(node) = self.nodes.get(key) {
                stack.extend(node.premises.keys().map(String::as_str));
            }
        }

        false
    }

    pub fn is_acyclic(&self) -> bool {
        self.back_edges().is_empty()
    }

    /// Cycles found by a colored depth first search from every variable. Cycles over the same
    /// set of variables are reported once.
    pub fn cycles(&self) -> Vec<Cycle> {
        let mut seen = BTreeSet::new();

        self.search()
            .into_iter()
            .map(|(cycle, _)| cycle)
            .filter(|cycle| seen.insert(cycle.key()))
            .collect()
    }

    /// The `(descendant, ancestor)` edge closing each cycle found by [`DependencyGraph::cycles`].
    pub fn back_edges(&self) -> Vec<BackEdge> {
        let mut edges: Vec<BackEdge> = Vec::new();

        for (_, edge) in self.search() {
            if !edges.contains(&edge) {
                edges.push(edge);
            }
        }

        edges
    }

    fn search(&self) -> Vec<(Cycle, BackEdge)> {
        let mut colors: HashMap<&str, Color> = self.nodes.keys().map(|key| (key.as_str(), Color::White)).collect();
        let mut path = Vec::new();
        let mut found = Vec::new();

        for key in self.nodes.keys() {
            if colors.get(key.as_str()) == Some(&Color::White) {
                self.visit(key, &mut colors, &mut path, &mut found);
            }
        }

        found
    }

    fn visit<'g>(
        &'g self,
        key: &'g str,
        colors: &mut HashMap<&'g str, Color>,
        path: &mut Vec<&'g str>,
        found: &mut Vec<(Cycle, BackEdge)>,
    ) {
        colors.insert(key, Color::Gray);
        path.push(key);

        if let Some(node) = self.nodes.get(key) {
            for next in node.premises.keys() {
                match colors.get(next.as_str()).copied().unwrap_or(Color::Black) {
                    Color::White => self.visit(next, colors, path, found),
                    Color::Gray => {
                        let start = path.iter().rposition(|k| *k == next.as_str()).unwrap_or(0);
                        let names = path[start..]
                            .iter()
                            .chain(std::iter::once(&next.as_str()))
                            .filter_map(|k| self.display(k))
                            .map(str::to_owned)
                            .collect();
                        let edge = BackEdge {
                            descendant: node.name.clone(),
                            ancestor: self.display(next).unwrap_or(next.as_str()).to_owned(),
                        };

                        found.push((Cycle(names), edge));
                    },
                    Color::Black => {},
                }
            }
        }

        path.pop();
        colors.insert(key, Color::Black);
    }
}

#[test]
fn test_cycles_and_back_edges() {
    let graph = DependencyGraph::from_adjacency([
        ("A", vec!["B", "E"]),
        ("B", vec!["A", "C"]),
        ("C", vec!["D", "A"]),
        ("D", vec!["E"]),
        ("E", vec!["C"]),
    ]);
    let cycles = graph.cycles();

    assert!(!cycles.is_empty());
    assert!(cycles.iter().all(|c| c.path().len() >= 2 && c.path().first() == c.path().last()));
    assert!(cycles.iter().any(|c| c.variables() == BTreeSet::from(["A", "B"])));
    assert!(cycles.iter().any(|c| c.variables() == BTreeSet::from(["C", "D", "E"])));
    assert!(!graph.back_edges().is_empty());
    assert!(graph.back_edges().contains(&BackEdge {
        descendant: "B".into(),
        ancestor: "A".into()
    }));
    assert!(!graph.is_acyclic());
    assert!(graph.is_cyclic_through("d"));
}

#[test]
fn test_acyclic_graph() {
    let graph = DependencyGraph::from_adjacency([("tip", vec!["food", "service"]), ("bill", vec!["tip"])]);

    assert!(graph.cycles().is_empty());
    assert!(graph.back_edges().is_empty());
    assert!(graph.is_acyclic());
    assert!(!graph.is_cyclic_through("tip"));
    assert_eq!(graph.dependencies("food"), Some(BTreeSet::new()));
    assert_eq!(graph.dependencies("BILL"), Some(BTreeSet::from(["tip"])));
    assert_eq!(graph.dependencies("weather"), None);
}

#[test]
fn test_self_loop() {
    let graph = DependencyGraph::from_adjacency([("x", vec!["x"])]);
    let cycles = graph.cycles();

    assert_eq!(cycles.len(), 1);
    assert_eq!(cycles[0].to_string(), "x -> x");
    assert!(graph.is_cyclic_through("x"));
}
