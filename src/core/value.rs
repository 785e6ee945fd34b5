//! Recursive document data and dotted-path access.
//!
//! Actor system data, test results and effect flags are all free-form
//! trees. `Value` models them as a closed union so lookups like
//! `"result.damage.total"` are explicit and return `None` instead of
//! silently producing an undefined value.
//!
//! ## Value Types
//!
//! - `Null`: explicit absence (JSON `null`)
//! - `Bool`: flags (equipped, requiresEquip)
//! - `Number`: all numeric data, stored as `f64`
//! - `Text`: strings, including unresolved formulas
//! - `List`: ordered sequences, indexed by numeric path segments
//! - `Map`: keyed records

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// A node in a document data tree.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    List(Vec<Value>),
    Map(FxHashMap<String, Value>),
}

impl Value {
    /// Create an empty map node.
    #[must_use]
    pub fn map() -> Self {
        Value::Map(FxHashMap::default())
    }

    /// Look up a dotted path (`"attributes.body.value"`).
    ///
    /// Numeric segments index into lists. An empty path returns `self`.
    ///
    /// ```
    /// use tabletop_effects::core::Value;
    ///
    /// let data = Value::from(serde_json::json!({ "damage": { "total": 7 } }));
    /// assert_eq!(data.get_path("damage.total"), Some(&Value::Number(7.0)));
    /// assert_eq!(data.get_path("damage.missing"), None);
    /// ```
    #[must_use]
    pub fn get_path(&self, path: &str) -> Option<&Value> {
        if path.is_empty() {
            return Some(self);
        }
        path.split('.').try_fold(self, |node, segment| node.child(segment))
    }

    /// Write `value` at a dotted path, creating intermediate maps.
    ///
    /// Returns `false` if an intermediate node is a scalar or the path
    /// indexes past the end of a list.
    pub fn set_path(&mut self, path: &str, value: Value) -> bool {
        let mut segments = path.split('.').peekable();
        let mut node = self;
        while let Some(segment) = segments.next() {
            if matches!(node, Value::Null) {
                *node = Value::map();
            }
            let last = segments.peek().is_none();
            let slot = match node {
                Value::Map(map) => map.entry(segment.to_string()).or_default(),
                Value::List(items) => match segment.parse::<usize>().ok().and_then(|i| items.get_mut(i)) {
                    Some(slot) => slot,
                    None => return false,
                },
                _ => return false,
            };
            if last {
                *slot = value;
                return true;
            }
            node = slot;
        }
        false
    }

    fn child(&self, segment: &str) -> Option<&Value> {
        match self {
            Value::Map(map) => map.get(segment),
            Value::List(items) => items.get(segment.parse::<usize>().ok()?),
            _ => None,
        }
    }

    /// Get as number if this is a Number value.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Get as string reference if this is a Text value.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Get the map if this is a Map value.
    #[must_use]
    pub fn as_map(&self) -> Option<&FxHashMap<String, Value>> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Truthiness for flags: `Null`, `false`, `0` and `""` are false.
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::Text(s) => !s.is_empty(),
            Value::List(_) | Value::Map(_) => true,
        }
    }

    /// Whether this value reads as a finite number (`7`, `"7"`, `" 2.5 "`).
    #[must_use]
    pub fn is_numeric(&self) -> bool {
        match self {
            Value::Number(n) => n.is_finite(),
            Value::Text(s) => is_numeric_text(s),
            _ => false,
        }
    }

    /// Leading-integer interpretation (`"12px"` is 12, `2.9` is 2).
    #[must_use]
    pub fn parse_int(&self) -> Option<i64> {
        match self {
            Value::Number(n) if n.is_finite() => Some(n.trunc() as i64),
            Value::Text(s) => parse_int(s),
            _ => None,
        }
    }

    /// Render a scalar for substitution into a formula.
    ///
    /// Returns `None` for `Null`, lists and maps.
    #[must_use]
    pub fn to_formula_text(&self) -> Option<String> {
        match self {
            Value::Number(n) => Some(format_number(*n)),
            Value::Text(s) => Some(s.clone()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }
}

/// Whether a string reads as a finite number once trimmed.
#[must_use]
pub fn is_numeric_text(text: &str) -> bool {
    let trimmed = text.trim();
    !trimmed.is_empty() && trimmed.parse::<f64>().is_ok_and(f64::is_finite)
}

/// Parse the leading integer of a string, ignoring leading whitespace.
///
/// ```
/// use tabletop_effects::core::value::parse_int;
///
/// assert_eq!(parse_int("42"), Some(42));
/// assert_eq!(parse_int(" -3 rounds"), Some(-3));
/// assert_eq!(parse_int("2.75"), Some(2));
/// assert_eq!(parse_int("abc"), None);
/// ```
#[must_use]
pub fn parse_int(text: &str) -> Option<i64> {
    let trimmed = text.trim_start();
    let digits_start = usize::from(trimmed.starts_with(['-', '+']));
    let digits_len = trimmed[digits_start..]
        .bytes()
        .take_while(u8::is_ascii_digit)
        .count();
    if digits_len == 0 {
        return None;
    }
    trimmed[..digits_start + digits_len].parse().ok()
}

/// Format a number the way change values store it: integral values
/// without a fractional part.
///
/// ```
/// use tabletop_effects::core::value::format_number;
///
/// assert_eq!(format_number(3.0), "3");
/// assert_eq!(format_number(-0.0), "0");
/// assert_eq!(format_number(2.5), "2.5");
/// ```
#[must_use]
pub fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        (n as i64).to_string()
    } else {
        n.to_string()
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Number(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Number(v as f64)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Number(f64::from(v))
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => n.as_f64().map_or(Value::Null, Value::Number),
            serde_json::Value::String(s) => Value::Text(s),
            serde_json::Value::Array(items) => Value::List(items.into_iter().map(Value::from).collect()),
            serde_json::Value::Object(map) => Value::Map(
                map.into_iter().map(|(k, v)| (k, Value::from(v))).collect(),
            ),
        }
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Value {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Value::Map(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Value {
        Value::from(json!({
            "attributes": { "body": { "value": 3 } },
            "tags": ["warded", "blessed"],
            "name": "Ardent"
        }))
    }

    #[test]
    fn test_get_path_nested() {
        let data = sample();
        assert_eq!(data.get_path("attributes.body.value"), Some(&Value::Number(3.0)));
        assert_eq!(data.get_path("tags.1"), Some(&Value::from("blessed")));
        assert_eq!(data.get_path("name"), Some(&Value::from("Ardent")));
    }

    #[test]
    fn test_get_path_not_found() {
        let data = sample();
        assert_eq!(data.get_path("attributes.mind"), None);
        assert_eq!(data.get_path("tags.5"), None);
        assert_eq!(data.get_path("name.first"), None);
    }

    #[test]
    fn test_set_path_creates_maps() {
        let mut data = Value::Null;
        assert!(data.set_path("bonus.attack", Value::from(2)));
        assert_eq!(data.get_path("bonus.attack"), Some(&Value::Number(2.0)));
    }

    #[test]
    fn test_set_path_through_scalar_fails() {
        let mut data = sample();
        assert!(!data.set_path("name.first", Value::from("x")));
        assert!(!data.set_path("tags.9", Value::from("x")));
    }

    #[test]
    fn test_numeric_detection() {
        assert!(Value::from("5").is_numeric());
        assert!(Value::from(" 2.5 ").is_numeric());
        assert!(Value::from(4).is_numeric());
        assert!(!Value::from("abc").is_numeric());
        assert!(!Value::from("").is_numeric());
        assert!(!Value::Null.is_numeric());
    }

    #[test]
    fn test_parse_int() {
        assert_eq!(Value::from("5").parse_int(), Some(5));
        assert_eq!(Value::from(7.9).parse_int(), Some(7));
        assert_eq!(Value::from("+8").parse_int(), Some(8));
        assert_eq!(Value::from("-").parse_int(), None);
    }

    #[test]
    fn test_truthiness() {
        assert!(!Value::Null.is_truthy());
        assert!(!Value::from(0).is_truthy());
        assert!(Value::from("x").is_truthy());
        assert!(Value::map().is_truthy());
    }

    #[test]
    fn test_deserialize_untagged() {
        let value: Value = serde_json::from_str(r#"{"a": [1, "two", true, null]}"#).unwrap();
        assert_eq!(value.get_path("a.0"), Some(&Value::Number(1.0)));
        assert_eq!(value.get_path("a.1"), Some(&Value::from("two")));
        assert_eq!(value.get_path("a.2"), Some(&Value::Bool(true)));
        assert_eq!(value.get_path("a.3"), Some(&Value::Null));
    }
}
