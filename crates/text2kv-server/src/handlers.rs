use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode, Uri},
    response::Response,
};
use tracing::debug;

use crate::{
    error::{AppError, AppResult},
    pages,
    query::RequestParams,
    response::text_response,
    routes::Route,
    AppState,
};

/// Single entry point for every path and method. Runs behind
/// [`crate::auth::require_token`].
pub async fn dispatch(
    State(state): State<AppState>,
    headers: HeaderMap,
    uri: Uri,
) -> AppResult<Response> {
    let store = state.store.as_ref().ok_or(AppError::Configuration)?;
    let host = request_host(&headers, &uri);
    let route = Route::resolve(uri.path(), &state.secret);
    debug!(?route, %host, "dispatch");

    match route {
        Route::ConfigPage => {
            let ip_list = store.read_list().await?;
            Ok(text_response(
                StatusCode::OK,
                pages::config_html(&host, &state.secret, &ip_list),
                &[(header::CONTENT_TYPE, "text/html; charset=UTF-8")],
            ))
        }
        Route::BatScript => Ok(text_response(
            StatusCode::OK,
            pages::bat_script(&host, &state.secret),
            &[(header::CONTENT_DISPOSITION, "attachment; filename=update.bat")],
        )),
        Route::ShScript => Ok(text_response(
            StatusCode::OK,
            pages::sh_script(&host, &state.secret),
            &[(header::CONTENT_DISPOSITION, "attachment; filename=update.sh")],
        )),
        Route::File(key) => {
            let payload = RequestParams::from_query(uri.query());
            let body = store
                .file_operation(&key, payload.text.as_deref(), payload.b64.as_deref())
                .await?;
            Ok(text_response(StatusCode::OK, body, &[]))
        }
    }
}

/// Hostname the client addressed, without port.
fn request_host(headers: &HeaderMap, uri: &Uri) -> String {
    let authority = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .or_else(|| uri.host())
        .unwrap_or("localhost");

    if let Some(rest) = authority.strip_prefix('[') {
        // Bracketed IPv6 literal.
        if let Some(end) = rest.find(']') {
            return format!("[{}]", &rest[..end]);
        }
    }
    authority
        .split(':')
        .next()
        .unwrap_or(authority)
        .to_owned()
}
