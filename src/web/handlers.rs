//! Route handlers.

use axum::extract::{Form, Path, Query, State};
use axum::http::{StatusCode, header};
use axum::response::{Html, IntoResponse, Json, Redirect, Response};
use serde::Deserialize;

use super::AppState;
use super::pages;
use crate::service::{Banner, Download, RECENT_SEARCHES, ServiceError};
use crate::storage::StorageError;

/// `POST /` form body.
#[derive(Debug, Deserialize)]
pub(super) struct SearchForm {
    #[serde(default)]
    query: String,
}

/// `GET /history` query string.
#[derive(Debug, Default, Deserialize)]
pub(super) struct HistoryParams {
    notice: Option<String>,
    file: Option<String>,
}

/// `GET /ajax-search` query string.
#[derive(Debug, Deserialize)]
pub(super) struct SuggestParams {
    #[serde(default)]
    q: String,
}

/// `GET /`: search form plus recent searches.
pub(super) async fn index(State(state): State<AppState>) -> Html<String> {
    let mut banners = Vec::new();
    let recent = recent_or_banner(&state, &mut banners);
    Html(pages::index_page(&recent, &banners))
}

/// `POST /`: run a search and render its results.
pub(super) async fn search(
    State(state): State<AppState>,
    Form(form): Form<SearchForm>,
) -> Response {
    match state.service.run_search(&form.query).await {
        Ok(outcome) => Html(pages::results_page(&outcome)).into_response(),
        Err(err) => {
            let mut banners = vec![Banner::error(err.to_string())];
            let recent = recent_or_banner(&state, &mut banners);
            (
                StatusCode::BAD_REQUEST,
                Html(pages::index_page(&recent, &banners)),
            )
                .into_response()
        }
    }
}

/// `GET /history`: recorded searches and stored files.
pub(super) async fn history(
    State(state): State<AppState>,
    Query(params): Query<HistoryParams>,
) -> Response {
    let mut banners = Vec::new();
    let file = params.file.unwrap_or_default();
    match params.notice.as_deref() {
        Some("deleted") => banners.push(Banner::success(format!(
            "File {file} deleted successfully."
        ))),
        Some("delete_failed") => {
            banners.push(Banner::error(format!("Failed to delete file {file}.")))
        }
        _ => {}
    }

    match state.service.history().await {
        Ok(view) => Html(pages::history_page(&view, &banners)).into_response(),
        Err(err) => error_response(err),
    }
}

/// `GET /ajax-search?q=`: suggestion JSON.
pub(super) async fn ajax_search(
    State(state): State<AppState>,
    Query(params): Query<SuggestParams>,
) -> Json<serde_json::Value> {
    match state.service.suggest(&params.q).await {
        Ok(results) => Json(serde_json::json!({
            "success": true,
            "count": results.len(),
            "results": results,
        })),
        Err(err) => Json(serde_json::json!({
            "success": false,
            "error": err.to_string(),
        })),
    }
}

/// `GET /download/{filename}`: presigned redirect or attachment.
pub(super) async fn download(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Response {
    match state.service.download(&filename).await {
        Ok(Download::Redirect(url)) => Redirect::to(&url).into_response(),
        Ok(Download::Content { filename, bytes }) => (
            [
                (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{filename}\""),
                ),
            ],
            bytes,
        )
            .into_response(),
        Err(err) => error_response(err),
    }
}

/// `POST /delete/{filename}`: delete, then back to the history page.
pub(super) async fn delete(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Redirect {
    let notice = match state.service.delete(&filename).await {
        Ok(_) => "deleted",
        Err(err) => {
            tracing::warn!(filename = %filename, error = %err, "delete failed");
            "delete_failed"
        }
    };
    Redirect::to(&format!(
        "/history?notice={notice}&file={}",
        urlencoding::encode(&filename)
    ))
}

/// `GET /health`.
pub(super) async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

fn recent_or_banner(state: &AppState, banners: &mut Vec<Banner>) -> Vec<crate::records::SearchRecord> {
    match state.service.recent(RECENT_SEARCHES) {
        Ok(recent) => recent,
        Err(err) => {
            tracing::error!(error = %err, "recent searches unavailable");
            banners.push(Banner::error(pages::short_error(&err.to_string())));
            Vec::new()
        }
    }
}

fn error_response(err: ServiceError) -> Response {
    let status = match &err {
        ServiceError::Storage(StorageError::NotFound(_)) => StatusCode::NOT_FOUND,
        ServiceError::Storage(StorageError::InvalidName(_))
        | ServiceError::InvalidQuery(_)
        | ServiceError::QueryTooShort => StatusCode::BAD_REQUEST,
        _ => {
            tracing::error!(error = %err, "request failed");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (status, Html(pages::error_page(status, &err.to_string()))).into_response()
}
