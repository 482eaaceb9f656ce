//! Landing routes: `/` and `/{locale}`

use std::sync::Arc;

use axum::extract::State;
use axum::response::Redirect;
use axum::routing::get;
use axum::Router;
use serde::Serialize;

use crate::http::extractors::ValidLocale;
use crate::http::server::AppState;
use crate::http::view::{self, View};
use crate::models::Locale;

#[derive(Serialize)]
pub struct MainContext {
    pub locale: Locale,
    pub title: String,
}

/// GET / - send the client to the default locale
async fn root(State(state): State<Arc<AppState>>) -> Redirect {
    Redirect::to(&format!("/{}", state.locales.default_locale()))
}

/// GET /{locale}
async fn main_page(State(state): State<Arc<AppState>>, ValidLocale(locale): ValidLocale) -> View<MainContext> {
    let title = state.t(locale.as_str(), "app-main-title", &[]);
    View::new(view::MAIN, MainContext { locale, title })
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(root))
        .route("/{locale}", get(main_page))
}
