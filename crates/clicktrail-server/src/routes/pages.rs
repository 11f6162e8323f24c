//! Demo page endpoint.

use crate::state::AppState;
use axum::{extract::Path, routing::get, Json, Router};
use serde::Serialize;

pub fn router() -> Router<AppState> {
    Router::new().route("/page/:page_name", get(page))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PageResponse {
    message: String,
    page_name: String,
}

async fn page(Path(page_name): Path<String>) -> Json<PageResponse> {
    Json(PageResponse {
        message: format!("Hello {page_name}"),
        page_name,
    })
}
