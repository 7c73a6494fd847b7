use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::variable::fold_name;

/// What [`WorkingMemory::set`] does when the key already holds a fact.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionPolicy {
    /// Keep the first value
    Preserve,
    /// Overwrite with the latest value
    #[default]
    Replace,
}

/// Crisp facts keyed by variable name. Keys are case-insensitive.
///
/// Callers own the memory and update it between inference calls; an engine only borrows it.
#[derive(Clone, Debug, Default)]
pub struct WorkingMemory {
    facts: HashMap<String, (String, f64)>,
    policy: ResolutionPolicy,
}

impl WorkingMemory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: ResolutionPolicy) -> Self {
        WorkingMemory {
            facts: HashMap::new(),
            policy,
        }
    }

    pub fn policy(&self) -> ResolutionPolicy {
        self.policy
    }

    pub fn contains(&self, key: &str) -> bool {
        self.facts.contains_key(&fold_name(key))
    }

    pub fn get(&self, key: &str) -> Option<f64> {
        self.facts.get(&fold_name(key)).map(|(_, value)| *value)
    }

    /// Stores `value` under `key`, subject to the resolution policy. Returns whether it was written.
    pub fn set(&mut self, key: impl Into<String>, value: f64) -> bool {
        let key = key.into();
        let folded = fold_name(&key);

        if self.policy == ResolutionPolicy::Preserve && self.facts.contains_key(&folded) {
            return false;
        }

        self.facts.insert(folded, (key, value));

        true
    }

    pub fn remove(&mut self, key: &str) -> bool {
        self.facts.remove(&fold_name(key)).is_some()
    }

    pub fn clear(&mut self) {
        self.facts.clear();
    }

    pub fn len(&self) -> usize {
        self.facts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }

    /// Facts with their keys as last written.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.facts.values().map(|(key, value)| (key.as_str(), *value))
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for WorkingMemory {
    fn from_iter<T: IntoIterator<Item = (K, f64)>>(iter: T) -> Self {
        let mut memory = WorkingMemory::new();

        memory.extend(iter);
        memory
    }
}

impl<K: Into<String>> Extend<(K, f64)> for WorkingMemory {
    fn extend<T: IntoIterator<Item = (K, f64)>>(&mut self, iter: T) {
        for (key, value) in iter {
            self.set(key, value);
        }
    }
}

#[test]
fn test_keys_ignore_case() {
    let mut memory = WorkingMemory::new();

    memory.set("Food", 6.);

    assert!(memory.contains("food"));
    assert_eq!(memory.get("FOOD"), Some(6.));
    assert!(memory.remove("fOOd"));
    assert!(!memory.remove("food"));
    assert!(memory.is_empty());
}

#[test]
fn test_resolution_policies() {
    let mut replace = WorkingMemory::new();

    assert!(replace.set("service", 3.));
    assert!(replace.set("service", 9.8));
    assert_eq!(replace.get("service"), Some(9.8));

    let mut preserve = WorkingMemory::with_policy(ResolutionPolicy::Preserve);

    assert!(preserve.set("service", 3.));
    assert!(!preserve.set("Service", 9.8));
    assert_eq!(preserve.get("service"), Some(3.));
    assert_eq!(preserve.len(), 1);
}

#[test]
fn test_collect() {
    let memory: WorkingMemory = [("food", 6.), ("service", 9.8)].into_iter().collect();

    assert_eq!(memory.len(), 2);

    let mut keys: Vec<_> = memory.iter().map(|(k, _)| k).collect();

    keys.sort_unstable();

    assert_eq!(keys, ["food", "service"]);
}
