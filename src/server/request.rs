use serde_json::Value;
use smallvec::SmallVec;

use crate::error::RequestError;

/// Maximum inline headers before heap allocation.
/// Most requests have ≤16 headers.
pub const MAX_INLINE_HEADERS: usize = 16;

/// Maximum inline path/query parameters before heap allocation.
pub const MAX_INLINE_PARAMS: usize = 8;

/// Header storage shared by requests and responses (names kept as received).
pub type HeaderVec = SmallVec<[(String, String); MAX_INLINE_HEADERS]>;

/// Path or query parameter storage.
pub type ParamVec = SmallVec<[(String, String); MAX_INLINE_PARAMS]>;

/// Request as seen by middleware, validators and handlers.
///
/// The host server builds one per incoming request, either field by field or
/// through [`ApiRequest::from_http`]. The method is kept verbatim; the
/// dispatcher normalizes it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApiRequest {
    /// HTTP method as received (GET, post, ...)
    pub method: String,
    /// Request path without the query string
    pub path: String,
    /// HTTP headers
    pub headers: HeaderVec,
    /// Decoded query string parameters
    pub query_params: ParamVec,
    /// Values captured from dynamic route segments (filled by the dispatcher)
    pub path_params: ParamVec,
    /// Parsed body: JSON when the content type is JSON, a string otherwise
    pub body: Option<Value>,
}

impl ApiRequest {
    /// Create a request from a method and a URI path that may carry a query string.
    pub fn new(method: impl Into<String>, uri: &str) -> Self {
        let (path, query_params) = split_path_and_query(uri);
        Self {
            method: method.into(),
            path,
            query_params,
            ..Default::default()
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Attach a JSON body and the matching `content-type` header.
    pub fn with_json(self, body: Value) -> Self {
        let mut req = self.with_header("content-type", "application/json");
        req.body = Some(body);
        req
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Get a header by name (case-insensitive per RFC 7230)
    #[inline]
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Get a query parameter by name
    ///
    /// Uses "last write wins" semantics: for `?limit=10&limit=20` this returns `20`.
    #[inline]
    #[must_use]
    pub fn get_query_param(&self, name: &str) -> Option<&str> {
        self.query_params
            .iter()
            .rfind(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    #[inline]
    #[must_use]
    pub fn get_path_param(&self, name: &str) -> Option<&str> {
        self.path_params
            .iter()
            .rfind(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.get_header("content-type")
    }

    /// Convert a host `http::Request` into an `ApiRequest`.
    ///
    /// Bodies with a JSON content type are parsed; other non-empty bodies are
    /// kept as a JSON string.
    pub fn from_http<B: AsRef<[u8]>>(req: http::Request<B>) -> Result<Self, RequestError> {
        let (parts, body) = req.into_parts();
        let (path, query_params) = split_path_and_query(
            parts
                .uri
                .path_and_query()
                .map(|pq| pq.as_str())
                .unwrap_or_else(|| parts.uri.path()),
        );

        let mut headers = HeaderVec::new();
        for (name, value) in parts.headers.iter() {
            if let Ok(v) = value.to_str() {
                headers.push((name.as_str().to_string(), v.to_string()));
            }
        }

        let mut req = Self {
            method: parts.method.as_str().to_string(),
            path,
            headers,
            query_params,
            path_params: ParamVec::new(),
            body: None,
        };

        let bytes = body.as_ref();
        if !bytes.is_empty() {
            let is_json = req
                .content_type()
                .map(|ct| media_type(ct).ends_with("json"))
                .unwrap_or(false);
            req.body = Some(if is_json {
                serde_json::from_slice(bytes)?
            } else {
                let text = std::str::from_utf8(bytes).map_err(|_| RequestError::NonUtf8Body)?;
                Value::String(text.to_string())
            });
        }
        Ok(req)
    }
}

/// Strip parameters (`; charset=utf-8`) from a content type.
#[must_use]
pub fn media_type(content_type: &str) -> &str {
    content_type.split(';').next().unwrap_or("").trim()
}

/// Split `/users?limit=10` into the path and its URL-decoded query parameters.
pub fn split_path_and_query(uri: &str) -> (String, ParamVec) {
    match uri.split_once('?') {
        Some((path, query)) => (path.to_string(), parse_query_params(query)),
        None => (uri.to_string(), ParamVec::new()),
    }
}

/// Parse a raw query string (without the leading `?`).
pub fn parse_query_params(query: &str) -> ParamVec {
    url::form_urlencoded::parse(query.as_bytes())
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect()
}
