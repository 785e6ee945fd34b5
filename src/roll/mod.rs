//! Inbound test results.
//!
//! The dice/test subsystem lives outside this crate. When a test completes
//! it hands over a `TestOutcome`: who rolled, with which item, and a
//! free-form result tree (`result.damage.total`, `result.duration`, ...).
//! The engine only reads it through dotted-path lookups.

use serde::{Deserialize, Serialize};

use crate::core::Value;
use crate::documents::{Actor, Item};

/// Duration units content can be authored in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DurationUnit {
    Round,
    Minute,
    Hour,
    Day,
}

impl DurationUnit {
    /// Parse a unit name. Unknown units (`instant`, `permanent`) give `None`.
    #[must_use]
    pub fn parse(unit: &str) -> Option<Self> {
        match unit {
            "round" => Some(DurationUnit::Round),
            "minute" => Some(DurationUnit::Minute),
            "hour" => Some(DurationUnit::Hour),
            "day" => Some(DurationUnit::Day),
            _ => None,
        }
    }

    /// Seconds per unit; `None` for rounds, which are counted separately.
    #[must_use]
    pub const fn seconds(self) -> Option<i64> {
        match self {
            DurationUnit::Round => None,
            DurationUnit::Minute => Some(60),
            DurationUnit::Hour => Some(60 * 60),
            DurationUnit::Day => Some(60 * 60 * 24),
        }
    }
}

/// An authored or rolled duration: `{ unit: "hour", value: "2" }`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DurationSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default)]
    pub value: Value,
}

impl DurationSpec {
    /// Create a duration.
    pub fn new(unit: &str, value: impl Into<Value>) -> Self {
        Self {
            unit: Some(unit.to_string()),
            value: value.into(),
        }
    }

    /// Read a duration out of a result tree. Any map counts as present.
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Self> {
        if !matches!(value, Value::Map(_)) {
            return None;
        }
        Some(Self {
            unit: value
                .get_path("unit")
                .and_then(Value::as_text)
                .map(str::to_string),
            value: value.get_path("value").cloned().unwrap_or_default(),
        })
    }

    /// Parsed unit, if known.
    #[must_use]
    pub fn unit(&self) -> Option<DurationUnit> {
        self.unit.as_deref().and_then(DurationUnit::parse)
    }

    /// Amount as a leading integer.
    #[must_use]
    pub fn amount(&self) -> Option<i64> {
        self.value.parse_int()
    }
}

/// A completed test, as seen by the effect engine.
#[derive(Clone, Debug)]
pub struct TestOutcome<'a> {
    /// Actor that rolled the test.
    pub actor: &'a Actor,
    /// Item the test was rolled with (spell, weapon), if any.
    pub item: Option<&'a Item>,
    /// Free-form result tree. Overcasts are already folded in.
    pub result: Value,
}

impl<'a> TestOutcome<'a> {
    /// Create a test outcome without an item.
    pub fn new(actor: &'a Actor, result: Value) -> Self {
        Self {
            actor,
            item: None,
            result,
        }
    }

    /// Attach the item the test was rolled with.
    #[must_use]
    pub fn with_item(mut self, item: &'a Item) -> Self {
        self.item = Some(item);
        self
    }

    /// Duration rolled by the test (`result.duration`), if any.
    #[must_use]
    pub fn duration(&self) -> Option<DurationSpec> {
        self.result
            .get_path("duration")
            .filter(|d| d.is_truthy())
            .and_then(DurationSpec::from_value)
    }

    /// Look up a dotted path on the test object.
    ///
    /// `result.<path>` reads the result tree; `actor.<field>` and
    /// `item.<field>` read `id`, `name`, `uuid` or `system.<path>`.
    ///
    /// ```
    /// use tabletop_effects::core::Value;
    /// use tabletop_effects::documents::Actor;
    /// use tabletop_effects::roll::TestOutcome;
    ///
    /// let actor = Actor::new("a1", "Vex", Value::map());
    /// let result = Value::from(serde_json::json!({ "damage": { "total": 5 } }));
    /// let test = TestOutcome::new(&actor, result);
    ///
    /// assert_eq!(test.property("result.damage.total"), Some(Value::Number(5.0)));
    /// assert_eq!(test.property("actor.name"), Some(Value::from("Vex")));
    /// assert_eq!(test.property("item.name"), None);
    /// ```
    #[must_use]
    pub fn property(&self, path: &str) -> Option<Value> {
        let (head, rest) = path.split_once('.').unwrap_or((path, ""));
        match head {
            "result" => self.result.get_path(rest).cloned(),
            "actor" => document_property(
                self.actor.id.as_str(),
                &self.actor.name,
                &self.actor.uuid(),
                &self.actor.system,
                rest,
            ),
            "item" => {
                let item = self.item?;
                document_property(item.id.as_str(), &item.name, &item.uuid(), &item.system, rest)
            }
            _ => None,
        }
    }
}

fn document_property(id: &str, name: &str, uuid: &str, system: &Value, path: &str) -> Option<Value> {
    match path.split_once('.') {
        Some(("system", rest)) => system.get_path(rest).cloned(),
        None => match path {
            "id" => Some(Value::from(id)),
            "name" => Some(Value::from(name)),
            "uuid" => Some(Value::from(uuid)),
            "system" => Some(system.clone()),
            _ => None,
        },
        Some(_) => None,
    }
}
