// Data models for the todo list

use chrono::{DateTime, DurationRound, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A single task record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(with = "iso_millis")]
    pub time_created: DateTime<Utc>,
    #[serde(with = "iso_millis")]
    pub time_modified: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "iso_millis_opt")]
    pub target_date: Option<DateTime<Utc>>,
    #[serde(rename = "type", default)]
    pub todo_type: TodoType,
}

/// Category of a todo
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TodoType {
    #[default]
    Work,
    Personal,
    Weekend,
}

impl TodoType {
    pub fn as_str(self) -> &'static str {
        match self {
            TodoType::Work => "Work",
            TodoType::Personal => "Personal",
            TodoType::Weekend => "Weekend",
        }
    }
}

impl fmt::Display for TodoType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TodoType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "work" => Ok(TodoType::Work),
            "personal" => Ok(TodoType::Personal),
            "weekend" => Ok(TodoType::Weekend),
            other => Err(format!(
                "unknown todo type: {} (expected work, personal or weekend)",
                other
            )),
        }
    }
}

/// Partial update applied by `TodoRepository::update`
///
/// `None` leaves a field untouched. `target_date` is doubly optional so a patch
/// can clear an existing date with `Some(None)`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TodoPatch {
    pub text: Option<String>,
    pub completed: Option<bool>,
    pub todo_type: Option<TodoType>,
    pub target_date: Option<Option<DateTime<Utc>>>,
}

impl TodoPatch {
    pub fn completed(completed: bool) -> Self {
        Self {
            completed: Some(completed),
            ..Self::default()
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Source of "now" for timestamping records
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock, truncated to milliseconds so persisted values round-trip exactly
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        truncate_millis(Utc::now())
    }
}

pub fn truncate_millis(ts: DateTime<Utc>) -> DateTime<Utc> {
    ts.duration_trunc(TimeDelta::milliseconds(1)).unwrap_or(ts)
}

/// ISO-8601 with millisecond precision and a `Z` suffix, e.g. `2026-10-18T09:30:00.000Z`
mod iso_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|ts| ts.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

mod iso_millis_opt {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        ts: &Option<DateTime<Utc>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match ts {
            Some(ts) => super::iso_millis::serialize(ts, serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw {
            Some(raw) => DateTime::parse_from_rfc3339(&raw)
                .map(|ts| Some(ts.with_timezone(&Utc)))
                .map_err(serde::de::Error::custom),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample() -> Todo {
        let created = Utc.with_ymd_and_hms(2026, 10, 18, 9, 30, 0).unwrap();
        Todo {
            id: "todo-1".to_string(),
            text: "Buy milk".to_string(),
            completed: false,
            time_created: created,
            time_modified: created + TimeDelta::milliseconds(250),
            target_date: None,
            todo_type: TodoType::Work,
        }
    }

    #[test]
    fn test_todo_wire_format() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["timeCreated"], "2026-10-18T09:30:00.000Z");
        assert_eq!(json["timeModified"], "2026-10-18T09:30:00.250Z");
        assert_eq!(json["type"], "Work");
        assert!(json.get("targetDate").is_none());
    }

    #[test]
    fn test_todo_reads_browser_iso_strings() {
        let raw = r#"{"id":"a","text":"Call Sam","completed":true,
            "timeCreated":"2024-02-01T08:00:00.123Z","timeModified":"2024-02-01T09:00:00.456Z",
            "targetDate":"2024-02-03T00:00:00.000Z","type":"Weekend"}"#;
        let todo: Todo = serde_json::from_str(raw).unwrap();
        assert!(todo.completed);
        assert_eq!(todo.todo_type, TodoType::Weekend);
        assert_eq!(todo.time_created.timestamp_millis() % 1000, 123);
        assert!(todo.target_date.is_some());
    }

    #[test]
    fn test_todo_type_defaults_to_work() {
        let raw = serde_json::json!({
            "id": "a",
            "text": "x",
            "timeCreated": "2024-02-01T08:00:00.000Z",
            "timeModified": "2024-02-01T08:00:00.000Z"
        });
        let todo: Todo = serde_json::from_value(raw).unwrap();
        assert_eq!(todo.todo_type, TodoType::Work);
        assert!(!todo.completed);
    }

    #[test]
    fn test_todo_type_from_str() {
        assert_eq!("personal".parse::<TodoType>().unwrap(), TodoType::Personal);
        assert_eq!(" Weekend ".parse::<TodoType>().unwrap(), TodoType::Weekend);
        assert!("chores".parse::<TodoType>().is_err());
    }

    #[test]
    fn test_system_clock_has_millisecond_precision() {
        let now = SystemClock.now();
        assert_eq!(now.timestamp_subsec_nanos() % 1_000_000, 0);
    }

    #[test]
    fn test_patch_helpers() {
        assert!(TodoPatch::default().is_empty());
        assert_eq!(TodoPatch::completed(true).completed, Some(true));
        assert_eq!(TodoPatch::text("x").text.as_deref(), Some("x"));
    }
}
