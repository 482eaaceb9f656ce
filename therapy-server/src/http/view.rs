//! Rendered views
//!
//! A view is a template name plus its context, written out as one JSON
//! document: `{"template": "therapy/stub/list", ...context}`.

use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::models::Paginated;

pub const STUB_LIST: &str = "therapy/stub/list";
pub const STUB_SEARCH_RESULT: &str = "therapy/stub/search_result";
pub const STUB_FORM: &str = "therapy/stub/form";
pub const LABEL_SEARCH_RESULT: &str = "therapy/label/search_result";
pub const LABEL_FORM: &str = "therapy/label/form";
pub const MAIN: &str = "main";

#[derive(Debug, Clone)]
pub struct View<T> {
    pub template: &'static str,
    pub context: T,
}

impl<T> View<T> {
    pub fn new(template: &'static str, context: T) -> Self {
        Self { template, context }
    }
}

#[derive(Serialize)]
struct Envelope<'a, T> {
    template: &'static str,
    #[serde(flatten)]
    context: &'a T,
}

impl<T: Serialize> IntoResponse for View<T> {
    fn into_response(self) -> Response {
        Json(Envelope {
            template: self.template,
            context: &self.context,
        })
        .into_response()
    }
}

/// A page with its navigation counters precomputed for the template.
#[derive(Debug, Clone, Serialize)]
pub struct PageView<T> {
    #[serde(flatten)]
    pub page: Paginated<T>,
    pub total_pages: u32,
    pub has_next: bool,
    pub has_prev: bool,
}

impl<T> From<Paginated<T>> for PageView<T> {
    fn from(page: Paginated<T>) -> Self {
        Self {
            total_pages: page.total_pages(),
            has_next: page.has_next(),
            has_prev: page.has_prev(),
            page,
        }
    }
}
