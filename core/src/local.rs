//! In-process document store with optional JSON snapshot persistence.
//!
//! # Design
//! Documents live in a `BTreeMap` keyed by their time-ordered id, so map
//! order is creation order. All state sits behind one `tokio::sync::RwLock`:
//! reads share it, writes hold it exclusively until the snapshot (if any) is
//! on disk. A write whose snapshot fails is undone before the error is
//! returned, so memory never holds a change the caller was told failed. Snapshots are written to a sibling temp file and renamed into
//! place so a crash never leaves a half-written file behind.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::error::{StoreError, StoreResult};
use crate::store::{FindOptions, ScoredTodo, SortOrder, TodoFilter, TodoStore};
use crate::text_index::TextIndex;
use crate::types::{NewTodo, Todo, TodoId, TodoPatch};

#[derive(Debug, Default)]
struct State {
    docs: BTreeMap<TodoId, Todo>,
    index: Option<TextIndex>,
    closed: bool,
}

impl State {
    fn ensure_open(&self) -> StoreResult<()> {
        if self.closed {
            return Err(StoreError::Closed);
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct LocalStore {
    state: RwLock<State>,
    snapshot: Option<PathBuf>,
}

impl LocalStore {
    /// A store that forgets everything when dropped.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Open a store backed by `path`, loading it if the file exists.
    pub async fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();
        let docs: BTreeMap<TodoId, Todo> = match tokio::fs::read(&path).await {
            Ok(bytes) => {
                let todos: Vec<Todo> = serde_json::from_slice(&bytes)?;
                tracing::info!(path = %path.display(), count = todos.len(), "loaded todo snapshot");
                todos.into_iter().map(|todo| (todo.id, todo)).collect()
            }
            Err(err) if err.kind() == ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "no snapshot yet, starting empty");
                BTreeMap::new()
            }
            Err(source) => return Err(StoreError::Io { path, source }),
        };

        Ok(Self {
            state: RwLock::new(State {
                docs,
                ..State::default()
            }),
            snapshot: Some(path),
        })
    }

    pub fn snapshot_path(&self) -> Option<&Path> {
        self.snapshot.as_deref()
    }

    async fn persist(&self, state: &State) -> StoreResult<()> {
        let Some(path) = &self.snapshot else {
            return Ok(());
        };
        let todos: Vec<&Todo> = state.docs.values().collect();
        let bytes = serde_json::to_vec_pretty(&todos)?;

        let tmp = path.with_extension("tmp");
        let io_err = |source| StoreError::Io {
            path: path.clone(),
            source,
        };
        tokio::fs::write(&tmp, &bytes).await.map_err(io_err)?;
        tokio::fs::rename(&tmp, path).await.map_err(io_err)?;
        tracing::debug!(path = %path.display(), count = todos.len(), "wrote todo snapshot");
        Ok(())
    }
}

fn newest_first(a: &Todo, b: &Todo) -> Ordering {
    b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id))
}

fn to_usize(n: u64) -> usize {
    usize::try_from(n).unwrap_or(usize::MAX)
}

#[async_trait]
impl TodoStore for LocalStore {
    async fn create(&self, input: NewTodo) -> StoreResult<Todo> {
        let (title, description) = input.into_fields()?;
        let mut state = self.state.write().await;
        state.ensure_open()?;

        let now = Utc::now();
        let todo = Todo {
            id: TodoId::generate(),
            title,
            description,
            created_at: now,
            updated_at: now,
        };
        state.docs.insert(todo.id, todo.clone());
        if let Err(err) = self.persist(&state).await {
            state.docs.remove(&todo.id);
            return Err(err);
        }
        if let Some(index) = state.index.as_mut() {
            index.insert(todo.id, &todo.title);
        }
        Ok(todo)
    }

    async fn find_by_id(&self, id: TodoId) -> StoreResult<Option<Todo>> {
        let state = self.state.read().await;
        state.ensure_open()?;
        Ok(state.docs.get(&id).cloned())
    }

    async fn find_and_update(&self, id: TodoId, patch: TodoPatch) -> StoreResult<Option<Todo>> {
        let mut state = self.state.write().await;
        state.ensure_open()?;

        let Some(todo) = state.docs.get_mut(&id) else {
            return Ok(None);
        };
        let previous = todo.clone();
        patch.apply(todo, Utc::now())?;
        let updated = todo.clone();
        if let Err(err) = self.persist(&state).await {
            state.docs.insert(id, previous);
            return Err(err);
        }
        if updated.title != previous.title {
            if let Some(index) = state.index.as_mut() {
                index.remove(id, &previous.title);
                index.insert(id, &updated.title);
            }
        }
        Ok(Some(updated))
    }

    async fn find_and_delete(&self, id: TodoId) -> StoreResult<Option<Todo>> {
        let mut state = self.state.write().await;
        state.ensure_open()?;

        let Some(removed) = state.docs.remove(&id) else {
            return Ok(None);
        };
        if let Err(err) = self.persist(&state).await {
            state.docs.insert(id, removed);
            return Err(err);
        }
        if let Some(index) = state.index.as_mut() {
            index.remove(id, &removed.title);
        }
        Ok(Some(removed))
    }

    async fn find(&self, filter: &TodoFilter, options: &FindOptions) -> StoreResult<Vec<Todo>> {
        let state = self.state.read().await;
        state.ensure_open()?;

        let mut matched: Vec<&Todo> = state.docs.values().filter(|todo| filter.matches(todo)).collect();
        if options.sort == SortOrder::NewestFirst {
            matched.sort_by(|a, b| newest_first(a, b));
        }
        let limit = options.limit.map_or(usize::MAX, to_usize);
        Ok(matched
            .into_iter()
            .skip(to_usize(options.skip))
            .take(limit)
            .cloned()
            .collect())
    }

    async fn count(&self, filter: &TodoFilter) -> StoreResult<u64> {
        let state = self.state.read().await;
        state.ensure_open()?;
        let count = state.docs.values().filter(|todo| filter.matches(todo)).count();
        Ok(count as u64)
    }

    async fn text_search(&self, term: &str, limit: usize) -> StoreResult<Vec<ScoredTodo>> {
        let state = self.state.read().await;
        state.ensure_open()?;
        let index = state.index.as_ref().ok_or(StoreError::IndexMissing)?;

        let mut hits: Vec<ScoredTodo> = index
            .search(term)
            .into_iter()
            .filter_map(|(id, score)| {
                state.docs.get(&id).map(|todo| ScoredTodo {
                    todo: todo.clone(),
                    score,
                })
            })
            .collect();
        hits.sort_by(|a, b| newest_first(&a.todo, &b.todo));
        hits.truncate(limit);
        Ok(hits)
    }

    async fn ensure_text_index(&self) -> StoreResult<()> {
        let mut state = self.state.write().await;
        state.ensure_open()?;
        if state.index.is_some() {
            return Ok(());
        }

        let mut index = TextIndex::new();
        for todo in state.docs.values() {
            index.insert(todo.id, &todo.title);
        }
        tracing::info!(documents = index.len(), "built title text index");
        state.index = Some(index);
        Ok(())
    }

    async fn close(&self) -> StoreResult<()> {
        let mut state = self.state.write().await;
        if state.closed {
            return Ok(());
        }
        self.persist(&state).await?;
        state.closed = true;
        tracing::info!("todo store closed");
        Ok(())
    }
}
