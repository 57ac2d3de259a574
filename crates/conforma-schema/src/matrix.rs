//! Cartesian-product expansion for the Matrix builtin.

use conforma_yaml::Value;

/// One combination: the bindings a single expansion adds to the scope.
pub(crate) type Combination = Vec<(String, Value)>;

/// Compute the Cartesian product over a decoded Matrix mapping.
///
/// Entries are `(key, list)` pairs in document order; the product
/// enumerates combinations with the last key varying fastest, which is
/// the standard lexicographic product order. An entry with an empty
/// list makes the whole product empty. No entries at all yield a
/// single empty combination, so the template is still expanded once.
pub(crate) fn product(entries: &[(Value, Value)]) -> Vec<Combination> {
    let mut combinations: Vec<Combination> = vec![Vec::new()];
    for (key, list) in entries {
        let key = key.as_str().unwrap_or("");
        let values = list.as_seq().unwrap_or(&[]);
        let mut next = Vec::with_capacity(combinations.len() * values.len());
        for combination in &combinations {
            for value in values {
                let mut extended = combination.clone();
                extended.push((key.to_string(), value.clone()));
                next.push(extended);
            }
        }
        combinations = next;
    }
    combinations
}
