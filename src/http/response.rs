use std::collections::HashMap;

/// Value of the `Server` header on every response.
pub const SERVER_NAME: &str = concat!("vigil/", env!("CARGO_PKG_VERSION"));

/// HTTP status codes the server can answer with.
///
/// - `Ok` (200): Route found
/// - `BadRequest` (400): Malformed request or unsupported method
/// - `NotFound` (404): Unknown path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    /// 200 OK
    Ok,
    /// 400 Bad Request
    BadRequest,
    /// 404 Not Found
    NotFound,
}

impl StatusCode {
    /// Returns the numeric HTTP status code.
    ///
    /// # Example
    ///
    /// ```
    /// # use vigil::http::response::StatusCode;
    /// assert_eq!(StatusCode::Ok.as_u16(), 200);
    /// assert_eq!(StatusCode::NotFound.as_u16(), 404);
    /// ```
    pub fn as_u16(&self) -> u16 {
        match self {
            StatusCode::Ok => 200,
            StatusCode::BadRequest => 400,
            StatusCode::NotFound => 404,
        }
    }

    /// Returns the standard reason phrase for this status code.
    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::BadRequest => "Bad Request",
            StatusCode::NotFound => "Not Found",
        }
    }
}

/// A complete HTTP response ready to be written to a client.
#[derive(Debug, Clone)]
pub struct Response {
    /// The HTTP status code
    pub status: StatusCode,
    /// Version echoed on the status line
    pub version: String,
    /// HTTP headers as key-value pairs
    pub headers: HashMap<String, String>,
    /// Response body as bytes
    pub body: Vec<u8>,
}

/// Builder for constructing HTTP responses in a fluent style.
///
/// # Example
///
/// ```
/// # use vigil::http::response::{ResponseBuilder, StatusCode};
/// let response = ResponseBuilder::new(StatusCode::Ok)
///     .header("Content-Type", "text/html")
///     .body(b"<p>hi</p>".to_vec())
///     .build();
/// assert_eq!(response.headers["Content-Length"], "9");
/// ```
pub struct ResponseBuilder {
    status: StatusCode,
    version: String,
    headers: HashMap<String, String>,
    body: Vec<u8>,
}

impl ResponseBuilder {
    /// Creates a new response builder with the specified status code.
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            version: "HTTP/1.1".to_string(),
            headers: HashMap::new(),
            body: Vec::new(),
        }
    }

    /// Adds or replaces a header.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Content-Type shorthand.
    pub fn content_type(self, mime: &str) -> Self {
        self.header("Content-Type", mime)
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Sets the response body.
    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Builds the final Response.
    ///
    /// `Server` and `Connection: close` are filled in when missing.
    /// `Content-Length` is always computed from the body.
    pub fn build(mut self) -> Response {
        self.headers
            .entry("Server".to_string())
            .or_insert_with(|| SERVER_NAME.to_string());
        self.headers
            .insert("Connection".to_string(), "close".to_string());
        self.headers
            .insert("Content-Length".to_string(), self.body.len().to_string());

        Response {
            status: self.status,
            version: self.version,
            headers: self.headers,
            body: self.body,
        }
    }
}

impl Response {
    /// Plain-text 400 carrying a diagnostic for the client.
    pub fn bad_request(reason: impl Into<String>) -> Self {
        let reason: String = reason.into();
        ResponseBuilder::new(StatusCode::BadRequest)
            .content_type("text/plain")
            .body(reason)
            .build()
    }

    /// 404 with the fixed plain-text body.
    pub fn not_found() -> Self {
        ResponseBuilder::new(StatusCode::NotFound)
            .content_type("text/plain")
            .body(&b"File not found\r\n"[..])
            .build()
    }

    /// Rewrites the status line version, e.g. to mirror the request.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers.get(key).map(|v| v.as_str())
    }
}
