//! One handler per todo operation.
//!
//! Every handler checks its inputs before touching the store, so a rejected
//! request never causes a write. Store failures are converted with `?` and
//! rendered by [`ApplicationError`]'s `IntoResponse` impl.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use todo_core::types::{TITLE_MAX_CHARS, TITLE_MIN_CHARS};
use todo_core::{
    FindOptions, NewTodo, Todo, TodoFilter, TodoId, TodoPatch, TodoStore, TodoSummary,
};

use crate::dto::{
    ApiPath, ApiQuery, CreatedResponse, JsonBody, ListParams, MessageResponse, NameSearchResponse,
    Pagination, SearchParams, TextSearchResponse, TodoPage, UpdateDescription, UpdateTitle,
};
use crate::error::ApplicationError;

/// Store handle shared by every request.
pub type SharedStore = Arc<dyn TodoStore>;

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_LIMIT: i64 = 6;
pub const MAX_LIMIT: i64 = 10;
pub const MAX_SEARCH_RESULTS: usize = 10;

type HandlerResult<T> = Result<T, ApplicationError>;

/// Reads the leading integer of `raw`, so `"2abc"` and `"2.5"` are both 2.
/// Missing or non-numeric values fall back to `default`.
fn int_param(raw: Option<&str>, default: i64) -> i64 {
    raw.and_then(leading_int).unwrap_or(default)
}

fn leading_int(raw: &str) -> Option<i64> {
    let raw = raw.trim_start();
    let unsigned = raw.strip_prefix(['-', '+']).unwrap_or(raw);
    let digits = unsigned
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(unsigned.len());
    let end = raw.len() - unsigned.len() + digits;
    if digits == 0 {
        return None;
    }
    raw[..end].parse().ok()
}

fn parse_id(raw: &str) -> HandlerResult<TodoId> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ApplicationError::validation("Todo ID is required"));
    }
    raw.parse()
        .map_err(|_| ApplicationError::validation("Invalid Todo ID"))
}

fn search_term(params: SearchParams) -> HandlerResult<String> {
    match params.query {
        Some(query) if !query.trim().is_empty() => Ok(query.trim().to_string()),
        _ => Err(ApplicationError::validation("Search term is required")),
    }
}

fn valid_title(title: Option<String>) -> HandlerResult<String> {
    let title = title.unwrap_or_default();
    let len = title.trim().chars().count();
    if !(TITLE_MIN_CHARS..=TITLE_MAX_CHARS).contains(&len) {
        return Err(ApplicationError::validation("Title is required"));
    }
    Ok(title)
}

/// `GET /`: one page of todos in creation order.
pub async fn list_todos(
    State(store): State<SharedStore>,
    ApiQuery(params): ApiQuery<ListParams>,
) -> HandlerResult<Json<TodoPage>> {
    let page = int_param(params.page.as_deref(), DEFAULT_PAGE);
    let limit = int_param(params.limit.as_deref(), DEFAULT_LIMIT);

    if page < 1 {
        return Err(ApplicationError::validation(
            "Page number must be greater than 0",
        ));
    }
    if !(1..=MAX_LIMIT).contains(&limit) {
        return Err(ApplicationError::validation("Limit must be between 1 and 10"));
    }

    let page = page.unsigned_abs();
    let limit = limit.unsigned_abs();
    let skip = (page - 1).saturating_mul(limit);

    // Count and slice are independent reads; they may observe different
    // points in time under concurrent writes.
    let filter = TodoFilter::All;
    let options = FindOptions::page(skip, limit);
    let (todos, total) = tokio::try_join!(store.find(&filter, &options), store.count(&filter))?;

    Ok(Json(TodoPage {
        todos,
        pagination: Pagination::new(total, page, limit),
    }))
}

/// `POST /`: create a todo with default fields.
pub async fn create_todo(State(store): State<SharedStore>) -> HandlerResult<Json<CreatedResponse>> {
    let todo = store.create(NewTodo::default()).await?;
    tracing::info!(id = %todo.id, "todo created");

    Ok(Json(CreatedResponse {
        message: "Todo created successfully".to_string(),
        id: todo.id.to_string(),
    }))
}

/// `GET /{id}`
pub async fn get_todo(
    State(store): State<SharedStore>,
    ApiPath(id): ApiPath<String>,
) -> HandlerResult<Json<Todo>> {
    let id = parse_id(&id)?;
    let todo = store
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApplicationError::not_found("Todo not found"))?;
    Ok(Json(todo))
}

/// `PUT /{id}/title`
pub async fn update_todo_title(
    State(store): State<SharedStore>,
    ApiPath(id): ApiPath<String>,
    JsonBody(body): JsonBody<UpdateTitle>,
) -> HandlerResult<(StatusCode, Json<MessageResponse>)> {
    let id = parse_id(&id)?;
    let title = valid_title(body.title)?;

    store
        .find_and_update(id, TodoPatch::title(title))
        .await?
        .ok_or_else(|| ApplicationError::not_found("Todo not found"))?;
    tracing::info!(%id, "todo title updated");

    Ok((
        StatusCode::NON_AUTHORITATIVE_INFORMATION,
        Json(MessageResponse::new("Title updated successfully")),
    ))
}

/// `PUT /{id}/description`
///
/// The description is handed to the store unchecked, and an unknown id is
/// not reported: the response is the same whether or not a todo matched.
pub async fn update_todo_description(
    State(store): State<SharedStore>,
    ApiPath(id): ApiPath<String>,
    JsonBody(body): JsonBody<UpdateDescription>,
) -> HandlerResult<(StatusCode, Json<MessageResponse>)> {
    let id = parse_id(&id)?;
    let patch = TodoPatch {
        title: None,
        description: body.description,
    };

    match store.find_and_update(id, patch).await? {
        Some(_) => tracing::info!(%id, "todo description updated"),
        None => tracing::debug!(%id, "description update matched no todo"),
    }

    Ok((StatusCode::NO_CONTENT, Json(MessageResponse::new("Changes saved"))))
}

/// `DELETE /{id}`
pub async fn delete_todo(
    State(store): State<SharedStore>,
    ApiPath(id): ApiPath<String>,
) -> HandlerResult<Json<MessageResponse>> {
    let id = parse_id(&id)?;
    store
        .find_and_delete(id)
        .await?
        .ok_or_else(|| ApplicationError::not_found("Todo not found"))?;
    tracing::info!(%id, "todo deleted");

    Ok(Json(MessageResponse::new("Todo deleted successfully")))
}

/// `GET /search?query=`: full-text search over titles.
pub async fn search_todos(
    State(store): State<SharedStore>,
    ApiQuery(params): ApiQuery<SearchParams>,
) -> HandlerResult<Json<TextSearchResponse>> {
    let term = search_term(params)?;
    let hits = store.text_search(&term, MAX_SEARCH_RESULTS).await?;
    let data: Vec<TodoSummary> = hits.iter().map(|hit| TodoSummary::from(&hit.todo)).collect();

    Ok(Json(TextSearchResponse {
        count: data.len(),
        data,
    }))
}

/// `GET /search/name?query=`: case-insensitive substring match on titles.
pub async fn search_todos_by_name(
    State(store): State<SharedStore>,
    ApiQuery(params): ApiQuery<SearchParams>,
) -> HandlerResult<Json<NameSearchResponse>> {
    let term = search_term(params)?;
    let todos = store
        .find(
            &TodoFilter::TitleContains(term),
            &FindOptions::newest_first(MAX_SEARCH_RESULTS as u64),
        )
        .await?;

    Ok(Json(NameSearchResponse {
        message: "Search results".to_string(),
        data: todos,
    }))
}

/// Catch-all for unmatched paths and methods.
pub async fn route_not_found() -> ApplicationError {
    ApplicationError::not_found("Route not found")
}
