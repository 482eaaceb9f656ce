//! Stub routes
//!
//! - GET  /{locale}/therapy/stubs                   - paginated list
//! - GET  /{locale}/therapy/stubs/searchRedirector  - search box target
//! - GET  /{locale}/therapy/stubs/search            - filtered list
//! - GET/POST /{locale}/therapy/stub/new            - creation form
//! - GET/POST /{locale}/therapy/stub/edit/{id}      - edit form

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::header::{HOST, REFERER};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::get;
use axum::{Form, Router};
use serde::{Deserialize, Serialize};

use crate::db::{LabelQuery, StubFilter};
use crate::forms::{StubForm, StubFormInput, SubmitAction};
use crate::http::error::ApiError;
use crate::http::extractors::{StubId, ValidLocale};
use crate::http::server::AppState;
use crate::http::view::{self, PageView, View};
use crate::models::{validate_search_term, Locale, PaginationParams, Stub};

#[derive(Serialize)]
pub struct StubListContext {
    pub locale: Locale,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub pagination: PageView<Stub>,
}

#[derive(Serialize)]
pub struct StubFormContext {
    pub locale: Locale,
    pub title: String,
    pub form: StubForm,
    /// Set when editing
    pub stub: Option<Stub>,
    pub saved: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flash: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RedirectParams {
    #[serde(rename = "searchName_stub")]
    pub search_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    #[serde(rename = "searchValue")]
    pub search_value: Option<String>,
    pub page: Option<String>,
    /// Restrict to stubs carrying a label with this name prefix
    pub label: Option<String>,
}

fn list_path(locale: &Locale) -> String {
    format!("/{locale}/therapy/stubs")
}

/// GET /{locale}/therapy/stubs
async fn index(
    State(state): State<Arc<AppState>>,
    ValidLocale(locale): ValidLocale,
    Query(params): Query<PaginationParams>,
) -> Result<View<StubListContext>, ApiError> {
    let page = state.stubs.list(&StubFilter::all(), params.stubs()).await?;

    Ok(View::new(
        view::STUB_LIST,
        StubListContext {
            title: state.t(locale.as_str(), "app-therapy-stub-list-title", &[]),
            locale,
            search_value: None,
            label: None,
            pagination: page.into(),
        },
    ))
}

/// GET /{locale}/therapy/stubs/searchRedirector
///
/// A blank term sends the client back where it came from.
async fn search_redirector(
    ValidLocale(locale): ValidLocale,
    Query(params): Query<RedirectParams>,
    headers: HeaderMap,
) -> Redirect {
    let term = params.search_name.as_deref().map(str::trim).unwrap_or_default();
    if !term.is_empty() {
        return Redirect::to(&format!(
            "/{locale}/therapy/stubs/search?searchValue={}",
            urlencoding::encode(term)
        ));
    }

    let host = headers.get(HOST).and_then(|value| value.to_str().ok());
    let back = headers
        .get(REFERER)
        .and_then(|value| value.to_str().ok())
        .and_then(|referer| local_referer(referer, host))
        .unwrap_or_else(|| list_path(&locale));
    Redirect::to(&back)
}

fn is_local_path(path: &str) -> bool {
    path.starts_with('/') && !path.starts_with("//") && !path.starts_with("/\\")
}

/// Path to go back to, if the referer points at this site: either a local
/// path or an absolute URL whose authority is `host`.
fn local_referer(referer: &str, host: Option<&str>) -> Option<String> {
    let referer = referer.trim();
    if referer.starts_with('/') {
        return is_local_path(referer).then(|| referer.to_owned());
    }

    let rest = referer
        .strip_prefix("http://")
        .or_else(|| referer.strip_prefix("https://"))?;
    let end = rest.find(['/', '?', '#']).unwrap_or(rest.len());
    let (authority, path) = rest.split_at(end);
    if !host.is_some_and(|host| host.eq_ignore_ascii_case(authority)) {
        return None;
    }

    let path = if path.starts_with('/') {
        path.to_owned()
    } else {
        format!("/{path}")
    };
    is_local_path(&path).then_some(path)
}

/// GET /{locale}/therapy/stubs/search
async fn search(
    State(state): State<Arc<AppState>>,
    ValidLocale(locale): ValidLocale,
    Query(params): Query<SearchParams>,
) -> Result<View<StubListContext>, ApiError> {
    let search_value = params.search_value.unwrap_or_default();
    validate_search_term("searchValue", &search_value)?;
    let label = params.label.filter(|prefix| !prefix.trim().is_empty());
    if let Some(prefix) = &label {
        validate_search_term("label", prefix)?;
    }

    let mut filter = StubFilter::search(&search_value);
    if let Some(prefix) = &label {
        filter = filter.with_label(LabelQuery::by_name_prefix(prefix));
    }

    let pagination = PaginationParams { page: params.page }.stubs();
    tracing::debug!(search = %search_value, page = pagination.page, "searching stubs");
    let page = state.stubs.list(&filter, pagination).await?;

    Ok(View::new(
        view::STUB_SEARCH_RESULT,
        StubListContext {
            title: state.t(
                locale.as_str(),
                "app-therapy-stub-search-title",
                &[("search_value", search_value.as_str())],
            ),
            locale,
            search_value: Some(search_value),
            label,
            pagination: page.into(),
        },
    ))
}

fn new_form_view(state: &AppState, locale: Locale, form: StubForm) -> View<StubFormContext> {
    View::new(
        view::STUB_FORM,
        StubFormContext {
            title: state.t(locale.as_str(), "app-new-therapy-stub-form-title", &[]),
            locale,
            form,
            stub: None,
            saved: false,
            flash: None,
        },
    )
}

/// GET /{locale}/therapy/stub/new
async fn new_form(State(state): State<Arc<AppState>>, ValidLocale(locale): ValidLocale) -> View<StubFormContext> {
    new_form_view(&state, locale, StubForm::empty())
}

/// POST /{locale}/therapy/stub/new
async fn create(
    State(state): State<Arc<AppState>>,
    ValidLocale(locale): ValidLocale,
    Form(input): Form<StubFormInput>,
) -> Result<Response, ApiError> {
    let data = match input.bind_new() {
        Ok(data) => data,
        Err(form) => return Ok(new_form_view(&state, locale, form).into_response()),
    };

    let stub = state.stubs.create(data).await?;
    tracing::debug!(id = stub.id, "stub form saved");

    let target = match input.action() {
        SubmitAction::SaveAndNew => format!("/{locale}/therapy/stub/new"),
        SubmitAction::Save => format!("/{locale}"),
    };
    Ok(Redirect::to(&target).into_response())
}

fn edit_form_view(state: &AppState, locale: Locale, stub: Stub, form: StubForm, saved: bool) -> View<StubFormContext> {
    let lang = locale.as_str();
    let flash = saved.then(|| state.t(lang, "app-therapy-stub-saved", &[]));
    View::new(
        view::STUB_FORM,
        StubFormContext {
            title: state.t(lang, "app-edit-therapy-stub-form-title", &[("stub_name", stub.name.as_str())]),
            flash,
            locale,
            form,
            stub: Some(stub),
            saved,
        },
    )
}

/// GET /{locale}/therapy/stub/edit/{id}
async fn edit_form(
    State(state): State<Arc<AppState>>,
    ValidLocale(locale): ValidLocale,
    StubId(id): StubId,
) -> Result<View<StubFormContext>, ApiError> {
    let stub = state.stubs.get(id).await?;
    let form = StubForm::from_entity(&stub);
    Ok(edit_form_view(&state, locale, stub, form, false))
}

/// POST /{locale}/therapy/stub/edit/{id}
async fn update(
    State(state): State<Arc<AppState>>,
    ValidLocale(locale): ValidLocale,
    StubId(id): StubId,
    Form(input): Form<StubFormInput>,
) -> Result<View<StubFormContext>, ApiError> {
    let current = state.stubs.get(id).await?;

    match input.bind_changes(&current) {
        Ok(changes) => {
            let updated = state.stubs.update(id, changes).await?;
            let form = StubForm::from_entity(&updated);
            Ok(edit_form_view(&state, locale, updated, form, true))
        }
        Err(form) => Ok(edit_form_view(&state, locale, current, form, false)),
    }
}

/// Stub routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/{locale}/therapy/stubs", get(index))
        .route("/{locale}/therapy/stubs/searchRedirector", get(search_redirector))
        .route("/{locale}/therapy/stubs/search", get(search))
        .route("/{locale}/therapy/stub/new", get(new_form).post(create))
        .route("/{locale}/therapy/stub/edit/{id}", get(edit_form).post(update))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_paths_are_followed() {
        assert_eq!(local_referer("/en/therapy/stubs?page=2", None).as_deref(), Some("/en/therapy/stubs?page=2"));
        assert_eq!(local_referer("//evil.example/x", None), None);
        assert_eq!(local_referer("/\\evil.example", None), None);
    }

    #[test]
    fn absolute_referer_must_match_host() {
        let host = Some("localhost:3030");
        assert_eq!(
            local_referer("http://localhost:3030/pl/therapy/stubs?page=3", host).as_deref(),
            Some("/pl/therapy/stubs?page=3")
        );
        assert_eq!(local_referer("https://LOCALHOST:3030", host).as_deref(), Some("/"));
        assert_eq!(local_referer("https://evil.example/pl/therapy/stubs", host), None);
        assert_eq!(local_referer("http://localhost:3030//evil.example", host), None);
        assert_eq!(local_referer("http://localhost:3030/en", None), None);
        assert_eq!(local_referer("javascript:alert(1)", host), None);
    }
}
