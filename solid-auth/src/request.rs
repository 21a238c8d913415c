//! The inbound HTTP request as seen by strategies.

use http::header::COOKIE;
use http::{HeaderMap, HeaderValue, Method};
use url::Url;

/// Method, absolute URL and headers of an inbound request.
///
/// This is all a strategy needs to tell the start leg of a flow from the callback
/// leg, and to find the session cookie.
#[derive(Debug, Clone)]
pub struct AuthRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
}

impl AuthRequest {
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: HeaderMap::new(),
        }
    }

    pub fn get(url: Url) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn post(url: Url) -> Self {
        Self::new(Method::POST, url)
    }

    /// Attach a `Cookie` header. Values that are not valid header text are ignored.
    pub fn with_cookie(mut self, cookie: &str) -> Self {
        if let Ok(value) = HeaderValue::from_str(cookie) {
            self.headers.insert(COOKIE, value);
        }
        self
    }

    /// The raw `Cookie` header, if any.
    pub fn cookie(&self) -> Option<&str> {
        self.headers
            .get(COOKIE)
            .and_then(|value| value.to_str().ok())
    }

    /// First value of a query parameter.
    pub fn query_param(&self, name: &str) -> Option<String> {
        self.url
            .query_pairs()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.into_owned())
    }
}
