//! Custom Axum extractors

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{FromRequestParts, Path};
use axum::http::request::Parts;

use super::error::ApiError;
use super::server::AppState;
use crate::models::Locale;

/// Read one named segment from the matched route.
async fn path_segment<S>(parts: &mut Parts, state: &S, name: &'static str) -> Option<String>
where
    S: Send + Sync,
{
    let Path(mut params): Path<HashMap<String, String>> =
        Path::from_request_parts(parts, state).await.ok()?;
    params.remove(name)
}

/// `{locale}` prefix, checked against the configured locales
pub struct ValidLocale(pub Locale);

impl FromRequestParts<Arc<AppState>> for ValidLocale {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &Arc<AppState>) -> Result<Self, Self::Rejection> {
        let segment = path_segment(parts, state, "locale")
            .await
            .ok_or_else(|| ApiError::not_found("locale", ""))?;

        state
            .locales
            .resolve(&segment)
            .map(Self)
            .ok_or_else(|| ApiError::not_found("locale", segment))
    }
}

/// Digits only; anything else is treated as a record that does not exist.
fn parse_id(resource: &'static str, raw: &str) -> Result<i64, ApiError> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ApiError::not_found(resource, raw));
    }
    raw.parse().map_err(|_| ApiError::not_found(resource, raw))
}

/// `{id}` of a stub route
pub struct StubId(pub i64);

impl<S> FromRequestParts<S> for StubId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let raw = path_segment(parts, state, "id").await.unwrap_or_default();
        parse_id("stub", &raw).map(Self)
    }
}

/// `{id}` of a label route
pub struct LabelId(pub i64);

impl<S> FromRequestParts<S> for LabelId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let raw = path_segment(parts, state, "id").await.unwrap_or_default();
        parse_id("label", &raw).map(Self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_must_be_digits() {
        assert_eq!(parse_id("stub", "17").unwrap(), 17);
        assert_eq!(parse_id("stub", "007").unwrap(), 7);
        for raw in ["", "-1", "1a", "+3", " 4", "99999999999999999999"] {
            assert!(
                matches!(parse_id("stub", raw), Err(ApiError::NotFound { resource: "stub", .. })),
                "{raw:?} should not resolve"
            );
        }
    }
}
