use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use constant_time_eq::constant_time_eq;
use tracing::warn;

use crate::{error::AppError, query::RequestParams, AppState};

/// Token used when the request names none.
pub const MISSING_TOKEN: &str = "null";

/// Pick the credential a request presents.
///
/// A path of exactly `/{secret}` is itself the credential; otherwise the
/// `token` query parameter is used, or [`MISSING_TOKEN`].
pub fn provided_token<'a>(path: &str, query_token: Option<&'a str>, secret: &'a str) -> &'a str {
    if path.strip_prefix('/') == Some(secret) {
        return secret;
    }
    query_token
        .filter(|t| !t.is_empty())
        .unwrap_or(MISSING_TOKEN)
}

pub fn authenticate(provided: &str, secret: &str) -> bool {
    constant_time_eq(provided.as_bytes(), secret.as_bytes())
}

/// Axum middleware gating every route: backend binding first, then token.
pub async fn require_token(State(state): State<AppState>, request: Request, next: Next) -> Response {
    if state.store.is_none() {
        return AppError::Configuration.into_response();
    }

    let params = RequestParams::from_query(request.uri().query());
    let provided = provided_token(request.uri().path(), params.token.as_deref(), &state.secret);

    if !authenticate(provided, &state.secret) {
        warn!(path = %request.uri().path(), "rejected request with bad token");
        return AppError::Auth.into_response();
    }

    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_form_uses_secret() {
        assert_eq!(provided_token("/s3cret", None, "s3cret"), "s3cret");
        assert_eq!(provided_token("/s3cret", Some("other"), "s3cret"), "s3cret");
    }

    #[test]
    fn path_form_is_case_sensitive() {
        assert_eq!(provided_token("/S3CRET", None, "s3cret"), MISSING_TOKEN);
    }

    #[test]
    fn query_token_or_null() {
        assert_eq!(provided_token("/a.txt", Some("abc"), "s3cret"), "abc");
        assert_eq!(provided_token("/a.txt", Some(""), "s3cret"), MISSING_TOKEN);
        assert_eq!(provided_token("/a.txt", None, "s3cret"), MISSING_TOKEN);
    }

    #[test]
    fn exact_match_only() {
        assert!(authenticate("passwd", "passwd"));
        assert!(!authenticate("passwd ", "passwd"));
        assert!(!authenticate("Passwd", "passwd"));
        assert!(!authenticate("", "passwd"));
    }

    #[test]
    fn literal_null_authenticates_only_against_null_secret() {
        assert!(authenticate(provided_token("/x", None, "null"), "null"));
        assert!(!authenticate(provided_token("/x", None, "passwd"), "passwd"));
    }
}
