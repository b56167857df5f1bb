//! Desired/recorded task state as supplied by the host.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::task::{DEFAULT_COMPLETE, DEFAULT_PRIORITY, Task};
use crate::error::{Result, Violation};
use crate::reconciler::Transition;

/// An attribute value in a host snapshot.
///
/// JSON form: `null` or a missing field is [`Value::Null`], `{"unknown": true}`
/// is [`Value::Unknown`], anything else is [`Value::Known`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Value<T> {
    /// Explicitly absent; the attribute default applies.
    #[default]
    Null,
    /// Not resolvable yet (e.g. derived from a resource not applied yet).
    Unknown,
    Known(T),
}

impl<T> Value<T> {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Value::Unknown)
    }

    pub fn known(&self) -> Option<&T> {
        match self {
            Value::Known(v) => Some(v),
            _ => None,
        }
    }

    /// Resolves the value, substituting `default` for `Null`.
    fn resolve(self, attribute: &'static str, default: T) -> Result<T> {
        match self {
            Value::Known(v) => Ok(v),
            Value::Null => Ok(default),
            Value::Unknown => Err(Violation::UnknownValue(attribute).into()),
        }
    }

    /// Resolves a required value.
    fn require(self, attribute: &'static str) -> Result<T> {
        match self {
            Value::Known(v) => Ok(v),
            Value::Null => Err(Violation::MissingValue(attribute).into()),
            Value::Unknown => Err(Violation::UnknownValue(attribute).into()),
        }
    }
}

impl<T> From<T> for Value<T> {
    fn from(v: T) -> Self {
        Value::Known(v)
    }
}

#[derive(Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct UnknownMarker {
    unknown: bool,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Repr<T> {
    Marker(UnknownMarker),
    Known(T),
}

impl<T: Serialize> Serialize for Value<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_none(),
            Value::Unknown => UnknownMarker { unknown: true }.serialize(serializer),
            Value::Known(v) => v.serialize(serializer),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Value<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        Ok(match Option::<Repr<T>>::deserialize(deserializer)? {
            None => Value::Null,
            Some(Repr::Marker(UnknownMarker { unknown: true })) => Value::Unknown,
            Some(Repr::Marker(UnknownMarker { unknown: false })) => Value::Null,
            Some(Repr::Known(v)) => Value::Known(v),
        })
    }
}

/// Configuration snapshot of one task.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDescriptor {
    #[serde(default)]
    pub id: Value<i32>,
    #[serde(default)]
    pub title: Value<String>,
    #[serde(default)]
    pub priority: Value<i32>,
    #[serde(default)]
    pub complete: Value<bool>,
}

impl TaskDescriptor {
    /// A descriptor carrying only a title, as a minimal configuration would.
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Value::Known(title.into()),
            ..Default::default()
        }
    }

    /// Resolves the desired entity: defaults for unset optionals, no unknowns.
    ///
    /// The returned task is always unassigned; identity never comes from
    /// configuration.
    pub fn desired_task(&self) -> Result<Task> {
        Ok(Task {
            id: 0,
            title: self.title.clone().require("title")?,
            priority: self.priority.clone().resolve("priority", DEFAULT_PRIORITY)?,
            complete: self.complete.clone().resolve("complete", DEFAULT_COMPLETE)?,
        })
    }

    /// The remote id recorded in this snapshot.
    pub fn recorded_id(&self, transition: Transition) -> Result<i32> {
        match self.id {
            Value::Known(id) if id != 0 => Ok(id),
            _ => Err(Violation::MissingId(transition).into()),
        }
    }
}

impl From<&Task> for TaskDescriptor {
    fn from(task: &Task) -> Self {
        Self {
            id: Value::Known(task.id),
            title: Value::Known(task.title.clone()),
            priority: Value::Known(task.priority),
            complete: Value::Known(task.complete),
        }
    }
}
