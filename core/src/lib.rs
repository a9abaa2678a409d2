//! Domain model and persistence for the todo service.
//!
//! # Overview
//! Defines the `Todo` document, the `TodoStore` trait the HTTP layer talks
//! to, and `LocalStore`, an in-process implementation with a title text
//! index and optional JSON snapshot file.
//!
//! # Design
//! - Field rules (defaults, trimming, length limits) live with the types and
//!   are enforced by the store on every write.
//! - The store trait is async and object safe so the server can hold it as
//!   `Arc<dyn TodoStore>`.
//! - Nothing here knows about HTTP; status codes are decided by the server.

pub mod error;
pub mod local;
pub mod store;
pub mod text_index;
pub mod types;

pub use error::{StoreError, StoreResult};
pub use local::LocalStore;
pub use store::{FindOptions, ScoredTodo, SortOrder, TodoFilter, TodoStore};
pub use types::{NewTodo, Todo, TodoId, TodoPatch, TodoSummary};
