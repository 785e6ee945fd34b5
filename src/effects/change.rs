//! Change definitions.
//!
//! A change is one atomic modification inside an effect: a target key on the
//! actor (`system.attack`), a value expression, and an application mode.
//! Values are always stored as text; numbers are written in their decimal
//! form so a value can hold either a literal or an unresolved formula.

use serde::{Deserialize, Deserializer, Serialize};

use crate::core::Value;
use crate::expr::{evaluate, ExpressionError, RollData};

/// How a change combines with the attribute it targets.
///
/// Mode numbers follow the host's convention (0-7) and are what gets
/// persisted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum ChangeMode {
    /// Handled by system scripts; never mutates attributes directly.
    Custom = 0,
    /// Multiply the current number.
    Multiply = 1,
    /// Add to numbers, append to text and lists.
    Add = 2,
    /// Take the lower of current and change value.
    Downgrade = 3,
    /// Take the higher of current and change value.
    Upgrade = 4,
    /// Replace the current value.
    Override = 5,
    /// Offered in the dialog of the actor performing an action.
    DialogSelf = 6,
    /// Offered in the dialog of the target of an action.
    DialogTarget = 7,
}

impl ChangeMode {
    /// Does this mode only take part in dialogs?
    #[must_use]
    pub const fn is_dialog(self) -> bool {
        matches!(self, ChangeMode::DialogSelf | ChangeMode::DialogTarget)
    }

    /// Default application priority (`mode * 10`).
    #[must_use]
    pub const fn default_priority(self) -> i32 {
        self as i32 * 10
    }
}

impl TryFrom<u8> for ChangeMode {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Ok(match value {
            0 => ChangeMode::Custom,
            1 => ChangeMode::Multiply,
            2 => ChangeMode::Add,
            3 => ChangeMode::Downgrade,
            4 => ChangeMode::Upgrade,
            5 => ChangeMode::Override,
            6 => ChangeMode::DialogSelf,
            7 => ChangeMode::DialogTarget,
            other => return Err(format!("invalid change mode {other}")),
        })
    }
}

impl From<ChangeMode> for u8 {
    fn from(mode: ChangeMode) -> Self {
        mode as u8
    }
}

/// One atomic attribute modification.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Change {
    /// Target attribute path on the actor (`system.combat.melee`).
    pub key: String,

    /// Literal or formula. Anything containing `@` must be resolved
    /// before it is applied.
    #[serde(deserialize_with = "text_or_number")]
    pub value: String,

    /// How the value combines with the current attribute.
    pub mode: ChangeMode,

    /// Application order override; defaults to `mode * 10`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i32>,
}

impl Change {
    /// Create a change.
    pub fn new(key: impl Into<String>, mode: ChangeMode, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            mode,
            priority: None,
        }
    }

    /// Create an Add change.
    pub fn add(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(key, ChangeMode::Add, value)
    }

    /// Create an Override change.
    pub fn set(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(key, ChangeMode::Override, value)
    }

    /// Set an explicit priority.
    #[must_use]
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Does the value reference data that must be resolved first?
    #[must_use]
    pub fn is_deferred(&self) -> bool {
        self.value.contains('@')
    }

    /// Effective application priority.
    #[must_use]
    pub fn effective_priority(&self) -> i32 {
        self.priority.unwrap_or(self.mode.default_priority())
    }
}

/// Accept numbers where content authors wrote `"value": 2`.
fn text_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(value.to_formula_text().unwrap_or_default())
}

/// Human-facing metadata for a change, keyed by its index in the effect.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conditional {
    /// Text shown in dialogs ("vs. Daemons").
    #[serde(default)]
    pub description: String,

    /// Formula gating whether the change currently applies.
    #[serde(default, alias = "script", skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
}

impl Conditional {
    /// Create a conditional with a description only.
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            condition: None,
        }
    }

    /// Add a gating condition formula.
    #[must_use]
    pub fn with_condition(mut self, condition: impl Into<String>) -> Self {
        self.condition = Some(condition.into());
        self
    }

    /// Read a conditional out of effect flag data.
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        let text = |key: &str| {
            value
                .get_path(key)
                .and_then(Value::as_text)
                .map(str::to_string)
        };
        Self {
            description: text("description").unwrap_or_default(),
            condition: text("condition").or_else(|| text("script")),
        }
    }

    /// Is the change active for this roll data?
    ///
    /// No condition (or a blank one) means always active.
    pub fn is_active(&self, data: &RollData<'_>) -> Result<bool, ExpressionError> {
        match self.condition.as_deref().map(str::trim) {
            None | Some("") => Ok(true),
            Some(formula) => Ok(evaluate(formula, data)?.is_truthy()),
        }
    }
}
