//! Todo entity and the values the store accepts for it.
//!
//! # Design
//! `Todo` is the persisted document. `NewTodo` and `TodoPatch` describe the
//! writes a caller may request; the store applies them through
//! [`NewTodo::into_fields`] and [`TodoPatch::apply`], which is where field
//! defaults, trimming and length limits are enforced. Handlers may validate
//! earlier for better messages, but the store never holds a document that
//! breaks these limits.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::StoreError;

pub const DEFAULT_TITLE: &str = "New Addition";
pub const DEFAULT_DESCRIPTION: &str =
    "<p>To stay representative of framework & new example apps.</p>";

pub const TITLE_MIN_CHARS: usize = 5;
pub const TITLE_MAX_CHARS: usize = 50;
pub const DESCRIPTION_MAX_CHARS: usize = 1000;

/// Store-generated identifier of a todo.
///
/// Backed by a UUIDv7, so ids sort in creation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TodoId(Uuid);

impl TodoId {
    pub(crate) fn generate() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl From<Uuid> for TodoId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl FromStr for TodoId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

impl fmt::Display for TodoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// A single persisted todo.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: TodoId,
    pub title: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The `id` + `title` projection returned by full-text search.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TodoSummary {
    pub id: TodoId,
    pub title: String,
}

impl From<&Todo> for TodoSummary {
    fn from(todo: &Todo) -> Self {
        Self {
            id: todo.id,
            title: todo.title.clone(),
        }
    }
}

/// Fields for a new todo. Omitted fields take the entity defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewTodo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl NewTodo {
    /// Resolve defaults and check limits, producing `(title, description)`.
    pub(crate) fn into_fields(self) -> Result<(String, String), StoreError> {
        let title = match self.title {
            Some(title) => normalize_title(&title)?,
            None => DEFAULT_TITLE.to_string(),
        };
        let description = match self.description {
            Some(description) => normalize_description(&description)?,
            None => DEFAULT_DESCRIPTION.to_string(),
        };
        Ok((title, description))
    }
}

/// Partial update of a todo. Only the fields present are written.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TodoPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl TodoPatch {
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            description: None,
        }
    }

    pub fn description(description: impl Into<String>) -> Self {
        Self {
            title: None,
            description: Some(description.into()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none()
    }

    /// Validate every present field first, then write them into `todo`.
    ///
    /// A rejected patch leaves `todo` untouched. `updated_at` is only bumped
    /// when the patch carries at least one field.
    pub(crate) fn apply(&self, todo: &mut Todo, now: DateTime<Utc>) -> Result<(), StoreError> {
        let title = self.title.as_deref().map(normalize_title).transpose()?;
        let description = self
            .description
            .as_deref()
            .map(normalize_description)
            .transpose()?;

        if let Some(title) = title {
            todo.title = title;
        }
        if let Some(description) = description {
            todo.description = description;
        }
        if !self.is_empty() {
            todo.updated_at = now;
        }
        Ok(())
    }
}

fn normalize_title(raw: &str) -> Result<String, StoreError> {
    let title = raw.trim();
    let len = title.chars().count();
    if len < TITLE_MIN_CHARS {
        return Err(StoreError::validation(
            "title",
            format!("title must be at least {TITLE_MIN_CHARS} characters"),
        ));
    }
    if len > TITLE_MAX_CHARS {
        return Err(StoreError::validation(
            "title",
            format!("title must be at most {TITLE_MAX_CHARS} characters"),
        ));
    }
    Ok(title.to_string())
}

fn normalize_description(raw: &str) -> Result<String, StoreError> {
    let description = raw.trim();
    if description.chars().count() > DESCRIPTION_MAX_CHARS {
        return Err(StoreError::validation(
            "description",
            format!("description must be at most {DESCRIPTION_MAX_CHARS} characters"),
        ));
    }
    Ok(description.to_string())
}
