use axum::{
    extract::{Query, State},
    http::header,
    response::{Html, IntoResponse, Json},
};
use sitesearch_core::page::{SearchPage, SearchParams};
use sitesearch_core::tags::{render_results_page, FormOptions};

use super::{search_error_response, ApiError};
use crate::state::AppState;

fn render(
    state: &AppState,
    params: &SearchParams,
    target: &'static str,
) -> Result<SearchPage, ApiError> {
    let mut page = SearchPage::new();
    page.render(params, state.storage.as_ref(), &state.config)
        .map_err(|e| search_error_response(e, target))?;
    Ok(page)
}

pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let page = render(&state, &params, "sitesearch.api.search")?;
    Ok(Json(serde_json::json!({
        "query": page.query(),
        "results": page.results(),
    })))
}

pub async fn search_page(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<impl IntoResponse, ApiError> {
    let page = render(&state, &params, "sitesearch.api.search_page")?;
    let form = FormOptions {
        url: Some("/search/page".to_string()),
        exclude_pages: params.exclude_pages.clone(),
        ..FormOptions::default()
    };
    let body = format!(
        concat!(
            "<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\">",
            "<title>Search</title></head><body>\n{}</body></html>\n"
        ),
        render_results_page(&page, &form)
    );
    let cache = if page.is_cacheable() { "public" } else { "no-store" };
    Ok(([(header::CACHE_CONTROL, cache)], Html(body)))
}
