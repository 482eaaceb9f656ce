//! Label routes
//!
//! - GET  /{locale}/therapy/labels/search?query=  - prefix search, stubs loaded
//! - GET/POST /{locale}/therapy/label/new         - add one label
//! - POST /{locale}/therapy/label/delete/{id}     - remove one label

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Form, Router};
use serde::{Deserialize, Serialize};

use crate::db::LabelQuery;
use crate::forms::{LabelForm, LabelFormInput};
use crate::http::error::ApiError;
use crate::http::extractors::{LabelId, ValidLocale};
use crate::http::server::AppState;
use crate::http::view::{self, View};
use crate::models::{validate_search_term, LabelWithStubs, Locale};

#[derive(Debug, Default, Deserialize)]
pub struct LabelSearchParams {
    pub query: Option<String>,
}

#[derive(Serialize)]
pub struct LabelSearchContext {
    pub locale: Locale,
    pub title: String,
    pub query: String,
    pub labels: Vec<LabelWithStubs>,
}

#[derive(Serialize)]
pub struct LabelFormContext {
    pub locale: Locale,
    pub title: String,
    pub form: LabelForm,
}

fn search_path(locale: &Locale, query: &str) -> String {
    if query.is_empty() {
        format!("/{locale}/therapy/labels/search")
    } else {
        format!("/{locale}/therapy/labels/search?query={}", urlencoding::encode(query))
    }
}

/// GET /{locale}/therapy/labels/search
async fn search(
    State(state): State<Arc<AppState>>,
    ValidLocale(locale): ValidLocale,
    Query(params): Query<LabelSearchParams>,
) -> Result<View<LabelSearchContext>, ApiError> {
    let query = params.query.unwrap_or_default();
    validate_search_term("query", &query)?;
    let labels = state
        .labels
        .find_labels_by_request(&LabelQuery::by_name_prefix(&query))
        .await?;

    Ok(View::new(
        view::LABEL_SEARCH_RESULT,
        LabelSearchContext {
            title: state.t(locale.as_str(), "app-therapy-label-search-title", &[("query", query.as_str())]),
            locale,
            query,
            labels,
        },
    ))
}

fn form_view(state: &AppState, locale: Locale, form: LabelForm) -> View<LabelFormContext> {
    View::new(
        view::LABEL_FORM,
        LabelFormContext {
            title: state.t(locale.as_str(), "app-new-therapy-label-form-title", &[]),
            locale,
            form,
        },
    )
}

/// GET /{locale}/therapy/label/new
async fn new_form(State(state): State<Arc<AppState>>, ValidLocale(locale): ValidLocale) -> View<LabelFormContext> {
    form_view(&state, locale, LabelForm::default())
}

/// POST /{locale}/therapy/label/new
async fn create(
    State(state): State<Arc<AppState>>,
    ValidLocale(locale): ValidLocale,
    Form(input): Form<LabelFormInput>,
) -> Result<Response, ApiError> {
    let new_label = match input.bind() {
        Ok(label) => label,
        Err(form) => return Ok(form_view(&state, locale, form).into_response()),
    };

    let label = state.labels.add(new_label).await?;
    Ok(Redirect::to(&search_path(&locale, &label.short_name)).into_response())
}

/// POST /{locale}/therapy/label/delete/{id}
async fn delete(
    State(state): State<Arc<AppState>>,
    ValidLocale(locale): ValidLocale,
    LabelId(id): LabelId,
) -> Result<Redirect, ApiError> {
    state.labels.remove(id).await?;
    tracing::info!(id, "label removed");
    Ok(Redirect::to(&search_path(&locale, "")))
}

/// Label routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/{locale}/therapy/labels/search", get(search))
        .route("/{locale}/therapy/label/new", get(new_form).post(create))
        .route("/{locale}/therapy/label/delete/{id}", post(delete))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_path_encodes_query() {
        let locale = Locale::new("en").unwrap();
        assert_eq!(search_path(&locale, ""), "/en/therapy/labels/search");
        assert_eq!(
            search_path(&locale, "A&B"),
            "/en/therapy/labels/search?query=A%26B"
        );
    }
}
