//! Route table of the todo API.
//!
//! | Method | Path | Handler |
//! |--------|------|---------|
//! | GET | /api/v1/todos | `list_todos` |
//! | POST | /api/v1/todos | `create_todo` |
//! | GET | /api/v1/todos/search | `search_todos` |
//! | GET | /api/v1/todos/search/name | `search_todos_by_name` |
//! | GET | /api/v1/todos/{id} | `get_todo` |
//! | DELETE | /api/v1/todos/{id} | `delete_todo` |
//! | PUT | /api/v1/todos/{id}/title | `update_todo_title` |
//! | PUT | /api/v1/todos/{id}/description | `update_todo_description` |
//!
//! The collection path also answers with a trailing slash. Anything else,
//! including a known path with the wrong method, answers
//! 404 "Route not found".

use axum::routing::{get, put};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{self, SharedStore};

pub const API_BASE: &str = "/api/v1/todos";

fn todo_routes() -> Router<SharedStore> {
    Router::new()
        .route("/", get(handlers::list_todos).post(handlers::create_todo))
        .route("/search", get(handlers::search_todos))
        .route("/search/name", get(handlers::search_todos_by_name))
        .route("/{id}", get(handlers::get_todo).delete(handlers::delete_todo))
        .route("/{id}/title", put(handlers::update_todo_title))
        .route("/{id}/description", put(handlers::update_todo_description))
        .method_not_allowed_fallback(handlers::route_not_found)
}

/// Routes and fallbacks only, without middleware.
pub fn router(store: SharedStore) -> Router {
    Router::new()
        .nest(API_BASE, todo_routes())
        .route(
            &format!("{API_BASE}/"),
            get(handlers::list_todos).post(handlers::create_todo),
        )
        .method_not_allowed_fallback(handlers::route_not_found)
        .fallback(handlers::route_not_found)
        .with_state(store)
}

/// The full application: routes plus CORS and request tracing.
pub fn app_with_cors(store: SharedStore, cors: CorsLayer) -> Router {
    router(store)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// [`app_with_cors`] with a CORS policy that allows any origin.
pub fn app(store: SharedStore) -> Router {
    app_with_cors(store, CorsLayer::permissive())
}
