//! Roll data and formula substitution.
//!
//! Before a formula is parsed, every `@path` whose path exists in the roll
//! data is replaced by the literal value found there. References that do
//! not resolve are left untouched so the evaluator can report them.

use smallvec::SmallVec;

use super::lexer::is_reference_char;
use crate::core::Value;

/// Read-only view of the data a formula may reference.
///
/// Layers are searched in order; the first layer containing a path wins.
/// Actors contribute their prepared system data, the world may add
/// environment-level values (such as the `doom` counter) behind it.
#[derive(Clone, Debug, Default)]
pub struct RollData<'a> {
    layers: SmallVec<[&'a Value; 2]>,
}

impl<'a> RollData<'a> {
    /// Roll data backed by a single tree.
    #[must_use]
    pub fn new(data: &'a Value) -> Self {
        let mut layers = SmallVec::new();
        layers.push(data);
        Self { layers }
    }

    /// Roll data with nothing in it.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Add a fallback layer searched after the existing ones.
    #[must_use]
    pub fn with_layer(mut self, data: &'a Value) -> Self {
        self.layers.push(data);
        self
    }

    /// Look up a dotted path across all layers.
    #[must_use]
    pub fn get(&self, path: &str) -> Option<&'a Value> {
        self.layers.iter().find_map(|layer| layer.get_path(path))
    }
}

/// Replace `@path` references with their roll-data values.
///
/// ```
/// use tabletop_effects::core::Value;
/// use tabletop_effects::expr::{replace_formula_data, RollData};
///
/// let data = Value::from(serde_json::json!({ "bonus": 2, "name": "Vex" }));
/// let roll_data = RollData::new(&data);
///
/// assert_eq!(replace_formula_data("@bonus * 3", &roll_data), "2 * 3");
/// assert_eq!(replace_formula_data("@missing + 1", &roll_data), "@missing + 1");
/// ```
#[must_use]
pub fn replace_formula_data(formula: &str, data: &RollData<'_>) -> String {
    let mut output = String::with_capacity(formula.len());
    let mut rest = formula;

    while let Some(at) = rest.find('@') {
        output.push_str(&rest[..at]);
        let after = &rest[at + 1..];
        let path_len = after
            .char_indices()
            .find(|&(_, c)| !is_reference_char(c))
            .map_or(after.len(), |(i, _)| i);
        let path = &after[..path_len];

        match data.get(path).and_then(Value::to_formula_text) {
            Some(text) if !path.is_empty() => output.push_str(text.trim()),
            _ => {
                output.push('@');
                output.push_str(path);
            }
        }
        rest = &after[path_len..];
    }

    output.push_str(rest);
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_layer_precedence() {
        let actor = Value::from(json!({ "might": 3 }));
        let world = Value::from(json!({ "might": 9, "doom": 4 }));
        let data = RollData::new(&actor).with_layer(&world);

        assert_eq!(data.get("might"), Some(&Value::Number(3.0)));
        assert_eq!(data.get("doom"), Some(&Value::Number(4.0)));
        assert_eq!(data.get("nothing"), None);
        assert_eq!(RollData::empty().get("might"), None);
    }

    #[test]
    fn test_replace_nested_paths() {
        let actor = Value::from(json!({
            "attributes": { "body": { "value": 4 } },
            "combat": { "melee": { "total": 2.5 } }
        }));
        let data = RollData::new(&actor);

        assert_eq!(
            replace_formula_data("@attributes.body.value + @combat.melee.total", &data),
            "4 + 2.5"
        );
    }

    #[test]
    fn test_replace_leaves_cross_actor_marker() {
        let actor = Value::from(json!({ "x": 1 }));
        let data = RollData::new(&actor);

        assert_eq!(
            replace_formula_data("@UUID[Actor.abc].system.x", &data),
            "@UUID[Actor.abc].system.x"
        );
    }

    #[test]
    fn test_replace_skips_maps_and_bare_at() {
        let actor = Value::from(json!({ "attributes": { "body": 1 } }));
        let data = RollData::new(&actor);

        assert_eq!(replace_formula_data("@attributes", &data), "@attributes");
        assert_eq!(replace_formula_data("a @ b", &data), "a @ b");
    }
}
