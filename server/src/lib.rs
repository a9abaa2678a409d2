//! HTTP front end of the todo service.
//!
//! # Overview
//! An axum router over a [`TodoStore`](todo_core::TodoStore) handed in as
//! state. Handlers validate input, call the store and answer JSON; every
//! failure flows through [`ApplicationError`] and leaves as a
//! `{"message": ...}` body.
//!
//! # Design
//! - The store is injected, never global: `app(store)` for tests,
//!   `app_with_cors` plus [`run`] for the binary.
//! - [`run`] only serves; opening and closing the store is the caller's job,
//!   so the binary can close it after the last request has drained.

pub mod config;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod routes;

use std::future::Future;

use axum::Router;
use tokio::net::TcpListener;

pub use config::Config;
pub use error::{ApplicationError, ErrorKind};
pub use handlers::SharedStore;
pub use routes::{app, app_with_cors, router, API_BASE};

/// Serve `app` on `listener` until `shutdown` resolves and in-flight
/// requests finish.
pub async fn run<F>(listener: TcpListener, app: Router, shutdown: F) -> Result<(), std::io::Error>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
}
