use axum::{
    http::{
        header::{self, HeaderName},
        HeaderMap, HeaderValue, StatusCode,
    },
    response::{IntoResponse, Response},
};
use rand::Rng;

const ETAG_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const ETAG_LEN: usize = 13;

/// Build a response carrying the fixed cache-defeating header set.
///
/// `extra` entries replace the defaults of the same name, so a route can
/// override `Content-Type` or add `Content-Disposition`.
pub fn text_response(
    status: StatusCode,
    body: impl Into<String>,
    extra: &[(HeaderName, &'static str)],
) -> Response {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static("no-store, no-cache, must-revalidate, proxy-revalidate"),
    );
    headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
    headers.insert(header::EXPIRES, HeaderValue::from_static("0"));
    if let Ok(etag) = HeaderValue::from_str(&random_etag()) {
        headers.insert(header::ETAG, etag);
    }
    if let Ok(modified) = HeaderValue::from_str(&http_date_now()) {
        headers.insert(header::LAST_MODIFIED, modified);
    }

    for (name, value) in extra {
        headers.insert(name.clone(), HeaderValue::from_static(value));
    }

    (status, headers, body.into()).into_response()
}

fn random_etag() -> String {
    let mut rng = rand::thread_rng();
    (0..ETAG_LEN)
        .map(|_| ETAG_ALPHABET[rng.gen_range(0..ETAG_ALPHABET.len())] as char)
        .collect()
}

/// IMF-fixdate, e.g. `Sun, 06 Nov 1994 08:49:37 GMT`.
fn http_date_now() -> String {
    chrono::Utc::now()
        .format("%a, %d %b %Y %H:%M:%S GMT")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_headers_present() {
        let resp = text_response(StatusCode::OK, "hi", &[]);
        let h = resp.headers();
        assert_eq!(h[header::CONTENT_TYPE], "text/plain; charset=utf-8");
        assert_eq!(
            h[header::CACHE_CONTROL],
            "no-store, no-cache, must-revalidate, proxy-revalidate"
        );
        assert_eq!(h[header::PRAGMA], "no-cache");
        assert_eq!(h[header::EXPIRES], "0");
        assert!(h.contains_key(header::ETAG));
        assert!(h[header::LAST_MODIFIED].to_str().unwrap().ends_with(" GMT"));
    }

    #[test]
    fn extra_headers_override_defaults() {
        let resp = text_response(
            StatusCode::OK,
            "<p>",
            &[(header::CONTENT_TYPE, "text/html; charset=UTF-8")],
        );
        assert_eq!(
            resp.headers()[header::CONTENT_TYPE],
            "text/html; charset=UTF-8"
        );
    }

    #[test]
    fn etag_differs_between_responses() {
        let a = random_etag();
        let b = random_etag();
        assert_eq!(a.len(), ETAG_LEN);
        assert!(a.bytes().all(|c| ETAG_ALPHABET.contains(&c)));
        assert_ne!(a, b);
    }
}
