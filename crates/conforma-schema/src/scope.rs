//! Placeholder binding scope.

use conforma_yaml::Value;
use std::collections::HashMap;

/// Bindings visible to `Placeholder` lookups at one point of the
/// recursive descent.
///
/// A scope is never mutated in place: `extend` returns a new scope, so
/// sibling branches of the recursion cannot observe each other's
/// bindings. Matrix expansion extends the scope once per combination;
/// an inner binding shadows an outer one with the same key for the
/// duration of that expansion only.
#[derive(Debug, Clone, Default)]
pub struct Scope {
    bindings: HashMap<String, Value>,
}

impl Scope {
    /// The empty root scope.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a binding.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.bindings.get(key)
    }

    /// Return a new scope with the given bindings added on top of the
    /// current ones.
    pub fn extend(&self, bindings: impl IntoIterator<Item = (String, Value)>) -> Scope {
        let mut next = self.clone();
        for (key, value) in bindings {
            next.bindings.insert(key, value);
        }
        next
    }

    /// Render the bindings as a mapping value with sorted keys, for
    /// deterministic error messages.
    pub fn to_value(&self) -> Value {
        let mut keys: Vec<&String> = self.bindings.keys().collect();
        keys.sort();
        Value::Map(
            keys.into_iter()
                .map(|k| (Value::Str(k.clone()), self.bindings[k].clone()))
                .collect(),
        )
    }
}
