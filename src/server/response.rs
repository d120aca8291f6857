use serde_json::{json, Value};

use super::request::{media_type, HeaderVec};

/// Body written by a handler or by the dispatcher.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ResponseBody {
    #[default]
    Empty,
    Json(Value),
    Text(String),
}

/// Response object handed to handlers and error handlers.
///
/// Handlers write status, headers and body themselves; the dispatcher never
/// wraps what they wrote.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub headers: HeaderVec,
    pub body: ResponseBody,
    sent: bool,
}

impl Default for ApiResponse {
    fn default() -> Self {
        Self::new()
    }
}

impl ApiResponse {
    #[must_use]
    pub fn new() -> Self {
        Self {
            status: 200,
            headers: HeaderVec::new(),
            body: ResponseBody::Empty,
            sent: false,
        }
    }

    pub fn set_status(&mut self, status: u16) -> &mut Self {
        self.status = status;
        self
    }

    /// Add or replace a header (case-insensitive name match)
    pub fn set_header(&mut self, name: &str, value: impl Into<String>) -> &mut Self {
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        self.headers.push((name.to_string(), value.into()));
        self
    }

    #[inline]
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.get_header("content-type")
    }

    /// Write a JSON body with `content-type: application/json`.
    pub fn json(&mut self, status: u16, body: Value) {
        self.status = status;
        if self.content_type().is_none() {
            self.set_header("content-type", "application/json");
        }
        self.body = ResponseBody::Json(body);
        self.sent = true;
    }

    /// Write a text body with the given content type.
    pub fn text(&mut self, status: u16, content_type: &str, body: impl Into<String>) {
        self.status = status;
        self.set_header("content-type", content_type);
        self.body = ResponseBody::Text(body.into());
        self.sent = true;
    }

    /// Finish the response without a body.
    pub fn send(&mut self, status: u16) {
        self.status = status;
        self.body = ResponseBody::Empty;
        self.sent = true;
    }

    /// Whether a handler (or the dispatcher) has written the response.
    #[must_use]
    pub fn is_sent(&self) -> bool {
        self.sent
    }

    /// Body as a JSON value, for schema checks. Text bodies become JSON strings.
    #[must_use]
    pub fn body_value(&self) -> Option<Value> {
        match &self.body {
            ResponseBody::Empty => None,
            ResponseBody::Json(v) => Some(v.clone()),
            ResponseBody::Text(s) => Some(Value::String(s.clone())),
        }
    }

    /// Media type of the written response, without parameters.
    #[must_use]
    pub fn media_type(&self) -> Option<&str> {
        self.content_type().map(media_type)
    }

    /// Convert into an `http::Response` for the host server.
    pub fn into_http(self) -> Result<http::Response<Vec<u8>>, http::Error> {
        let mut builder = http::Response::builder().status(self.status);
        for (name, value) in &self.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        let bytes = match self.body {
            ResponseBody::Empty => Vec::new(),
            ResponseBody::Json(v) => v.to_string().into_bytes(),
            ResponseBody::Text(s) => s.into_bytes(),
        };
        builder.body(bytes)
    }
}

/// Write a framework error body: `{"message": <message>}`.
///
/// `message` is a string for routing/protocol/handler errors and an array of
/// strings for validation failures.
pub fn write_json_error(res: &mut ApiResponse, status: u16, message: impl Into<Value>) {
    res.set_header("content-type", "application/json");
    res.json(status, json!({ "message": message.into() }));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_sets_content_type_once() {
        let mut res = ApiResponse::new();
        res.set_header("Content-Type", "application/problem+json");
        res.json(400, json!({"a": 1}));
        assert_eq!(res.content_type(), Some("application/problem+json"));
        assert!(res.is_sent());
        assert_eq!(res.headers.len(), 1);
    }

    #[test]
    fn test_write_json_error_shape() {
        let mut res = ApiResponse::new();
        write_json_error(&mut res, 404, "Not found.");
        assert_eq!(res.status, 404);
        assert_eq!(res.body, ResponseBody::Json(json!({"message": "Not found."})));
    }

    #[test]
    fn test_into_http() {
        let mut res = ApiResponse::new();
        res.text(200, "text/yaml", "openapi: 3.0.1\n");
        let http_res = res.into_http().unwrap();
        assert_eq!(http_res.status(), 200);
        assert_eq!(http_res.headers()["content-type"], "text/yaml");
        assert_eq!(http_res.body(), b"openapi: 3.0.1\n");
    }
}
