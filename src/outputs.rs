use fixed_map::Map;

use crate::defuzz::ClippedRegion;
use crate::ops::DefuzzificationMethod;

/// Crisp values of one variable under every defuzzification method. Inconclusive methods are
/// absent.
#[derive(Clone, Debug)]
pub struct Defuzzifications {
    variable: String,
    values: Map<DefuzzificationMethod, f64>,
}

impl Defuzzifications {
    pub(crate) fn new(variable: &str, regions: &[ClippedRegion<'_>]) -> Self {
        let mut values = Map::new();

        for &method in DefuzzificationMethod::ALL {
            if let Some(value) = method.call(regions) {
                values.insert(method, value);
            }
        }

        Self {
            variable: variable.to_owned(),
            values,
        }
    }

    pub fn variable(&self) -> &str {
        &self.variable
    }

    pub fn get(&self, method: DefuzzificationMethod) -> Option<f64> {
        self.values.get(method).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (DefuzzificationMethod, f64)> + '_ {
        self.values.iter().map(|(method, value)| (method, *value))
    }
}
