//! The persistence-service contract.
//!
//! Handlers only ever talk to `dyn TodoStore`; which backend sits behind it
//! is decided by the process entrypoint.

use async_trait::async_trait;

use crate::error::StoreResult;
use crate::types::{NewTodo, Todo, TodoId, TodoPatch};

/// Which todos a query selects.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TodoFilter {
    #[default]
    All,
    /// Case-insensitive substring match on the title.
    TitleContains(String),
}

impl TodoFilter {
    pub fn matches(&self, todo: &Todo) -> bool {
        match self {
            Self::All => true,
            Self::TitleContains(needle) => todo
                .title
                .to_lowercase()
                .contains(&needle.to_lowercase()),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    /// Creation order, oldest first.
    #[default]
    Natural,
    /// `created_at` descending.
    NewestFirst,
}

/// Skip/limit/sort applied after filtering. `limit: None` means unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FindOptions {
    pub skip: u64,
    pub limit: Option<u64>,
    pub sort: SortOrder,
}

impl FindOptions {
    pub fn page(skip: u64, limit: u64) -> Self {
        Self {
            skip,
            limit: Some(limit),
            sort: SortOrder::Natural,
        }
    }

    pub fn newest_first(limit: u64) -> Self {
        Self {
            skip: 0,
            limit: Some(limit),
            sort: SortOrder::NewestFirst,
        }
    }
}

/// A full-text hit with its relevance score.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredTodo {
    pub todo: Todo,
    pub score: f64,
}

/// Document store holding todos.
///
/// The `find_and_*` operations return `Ok(None)` when no todo has the id;
/// errors are reserved for constraint violations and backend failures.
#[async_trait]
pub trait TodoStore: Send + Sync {
    async fn create(&self, input: NewTodo) -> StoreResult<Todo>;

    async fn find_by_id(&self, id: TodoId) -> StoreResult<Option<Todo>>;

    /// Apply `patch` and return the todo as it is after the update.
    async fn find_and_update(&self, id: TodoId, patch: TodoPatch) -> StoreResult<Option<Todo>>;

    /// Remove the todo and return what was removed.
    async fn find_and_delete(&self, id: TodoId) -> StoreResult<Option<Todo>>;

    async fn find(&self, filter: &TodoFilter, options: &FindOptions) -> StoreResult<Vec<Todo>>;

    async fn count(&self, filter: &TodoFilter) -> StoreResult<u64>;

    /// Todos whose title shares a word with `term`, newest first, with
    /// their relevance score.
    async fn text_search(&self, term: &str, limit: usize) -> StoreResult<Vec<ScoredTodo>>;

    /// Create the title text index if it does not exist yet. Idempotent.
    async fn ensure_text_index(&self) -> StoreResult<()>;

    /// Flush pending state and refuse further use.
    async fn close(&self) -> StoreResult<()>;
}
