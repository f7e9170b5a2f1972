use crate::core::Record;
use crate::query::Queryable;
use crate::storage::filter::contains_ignore_case;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use thiserror::Error;
use uuid::Uuid;

pub const TITLE_MIN_LEN: usize = 3;
pub const TITLE_MAX_LEN: usize = 200;
pub const DESCRIPTION_MAX_LEN: usize = 1000;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TaskError {
    #[error("Task title is required")]
    TitleRequired,

    #[error("Task title must have at least 3 characters")]
    TitleTooShort,

    #[error("Task title must have at most 200 characters")]
    TitleTooLong,

    #[error("Task description is required")]
    DescriptionRequired,

    #[error("Task description must have at most 1000 characters")]
    DescriptionTooLong,

    #[error("Stored task is malformed: {0}")]
    Malformed(String),
}

/// Fields a caller may change through `Task::update`. `None` leaves the
/// current value alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateTaskData {
    pub title: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    pub description: String,
    pub completed: bool,
    #[serde(with = "iso_millis")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "iso_millis")]
    pub updated_at: DateTime<Utc>,
}

impl Task {
    pub fn create(title: &str, description: &str) -> Result<Self, TaskError> {
        let title = validate_title(title)?;
        let description = validate_description(description)?;
        let now = Utc::now();

        Ok(Self {
            id: Uuid::new_v4().to_string(),
            title,
            description,
            completed: false,
            created_at: now,
            updated_at: now,
        })
    }

    /// Applies the supplied fields. Everything is validated before anything
    /// is assigned, so a rejected update leaves the task untouched.
    ///
    /// Returns whether any field actually changed; `updated_at` moves only then.
    pub fn update(&mut self, data: UpdateTaskData) -> Result<bool, TaskError> {
        let title = data.title.as_deref().map(validate_title).transpose()?;
        let description = data
            .description
            .as_deref()
            .map(validate_description)
            .transpose()?;

        let mut changed = false;
        if let Some(title) = title
            && title != self.title
        {
            self.title = title;
            changed = true;
        }
        if let Some(description) = description
            && description != self.description
        {
            self.description = description;
            changed = true;
        }

        if changed {
            self.touch();
        }
        Ok(changed)
    }

    pub fn toggle_complete(&mut self) {
        self.completed = !self.completed;
        self.touch();
    }

    /// Case-insensitive substring search over title and description.
    pub fn matches(&self, term: &str) -> bool {
        contains_ignore_case(&self.title, term) || contains_ignore_case(&self.description, term)
    }

    /// The subset of fields `update` may change, as a partial record.
    pub fn mutable_fields(&self) -> Record {
        let mut fields = Record::new();
        fields.insert("title".into(), Value::String(self.title.clone()));
        fields.insert("description".into(), Value::String(self.description.clone()));
        fields.insert("completed".into(), Value::Bool(self.completed));
        fields.insert("updatedAt".into(), Value::String(iso_millis::format(&self.updated_at)));
        fields
    }

    /// Only the mutable fields that differ from `before`, as a partial record.
    pub fn changes_since(&self, before: &Task) -> Record {
        let previous = before.mutable_fields();
        self.mutable_fields()
            .into_iter()
            .filter(|(key, value)| previous.get(key) != Some(value))
            .collect()
    }

    fn touch(&mut self) {
        // Never move backwards, even if the clock does.
        self.updated_at = Utc::now().max(self.created_at);
    }
}

impl From<&Task> for Record {
    fn from(task: &Task) -> Self {
        let value = json!({
            "id": task.id,
            "title": task.title,
            "description": task.description,
            "completed": task.completed,
            "createdAt": iso_millis::format(&task.created_at),
            "updatedAt": iso_millis::format(&task.updated_at),
        });
        match value {
            Value::Object(map) => map,
            _ => Record::new(),
        }
    }
}

impl TryFrom<Record> for Task {
    type Error = TaskError;

    fn try_from(record: Record) -> Result<Self, Self::Error> {
        serde_json::from_value(Value::Object(record)).map_err(|e| TaskError::Malformed(e.to_string()))
    }
}

impl Queryable for Task {
    fn title(&self) -> &str {
        &self.title
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn completed(&self) -> Option<bool> {
        Some(self.completed)
    }

    fn created_at(&self) -> Option<DateTime<Utc>> {
        Some(self.created_at)
    }

    fn updated_at(&self) -> Option<DateTime<Utc>> {
        Some(self.updated_at)
    }
}

pub fn validate_title(raw: &str) -> Result<String, TaskError> {
    let title = raw.trim();
    let len = title.chars().count();

    if len == 0 {
        return Err(TaskError::TitleRequired);
    }
    if len < TITLE_MIN_LEN {
        return Err(TaskError::TitleTooShort);
    }
    if len > TITLE_MAX_LEN {
        return Err(TaskError::TitleTooLong);
    }
    Ok(title.to_string())
}

pub fn validate_description(raw: &str) -> Result<String, TaskError> {
    let description = raw.trim();

    if description.is_empty() {
        return Err(TaskError::DescriptionRequired);
    }
    if description.chars().count() > DESCRIPTION_MAX_LEN {
        return Err(TaskError::DescriptionTooLong);
    }
    Ok(description.to_string())
}

/// `2024-03-01T10:00:00.000Z`: UTC, millisecond precision.
pub mod iso_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn format(instant: &DateTime<Utc>) -> String {
        instant.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    pub fn serialize<S: Serializer>(instant: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format(instant))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|parsed| parsed.with_timezone(&Utc))
            .map_err(D::Error::custom)
    }
}
