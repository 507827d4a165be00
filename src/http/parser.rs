use crate::http::request::{Method, Request};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    InvalidRequest,
    InvalidMethod,
    InvalidVersion,
    InvalidHeader,
    InvalidContentLength,
    TooLarge,
    Incomplete,
}

impl ParseError {
    /// Plain-text body sent back with the 400.
    pub fn diagnostic(&self) -> &'static str {
        match self {
            ParseError::InvalidRequest => "Malformed request line\r\n",
            ParseError::InvalidMethod => "Malformed request method\r\n",
            ParseError::InvalidVersion => "Unsupported protocol version\r\n",
            ParseError::InvalidHeader => "Malformed header\r\n",
            ParseError::InvalidContentLength => "Invalid Content-Length\r\n",
            ParseError::TooLarge => "Request too large\r\n",
            ParseError::Incomplete => "Incomplete request\r\n",
        }
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.diagnostic().trim_end())
    }
}

impl std::error::Error for ParseError {}

/// Parses one request from the front of `buf`.
///
/// Returns the request and the number of bytes it occupied, or
/// `ParseError::Incomplete` when more bytes are needed.
pub fn parse_http_request(buf: &[u8]) -> Result<(Request, usize), ParseError> {
    // Look for header/body separator
    let headers_end = find_headers_end(buf).ok_or(ParseError::Incomplete)?;
    let header_bytes = &buf[..headers_end];
    let body_bytes = &buf[headers_end + 4..];

    let headers_str = std::str::from_utf8(header_bytes)
        .map_err(|_| ParseError::InvalidRequest)?;

    let mut lines = headers_str.split("\r\n");

    // Request line: exactly three space-separated parts
    let request_line = lines.next().ok_or(ParseError::InvalidRequest)?;
    let mut parts = request_line.split(' ');

    let method_str = parts.next().ok_or(ParseError::InvalidRequest)?;
    let path = parts.next().filter(|p| !p.is_empty()).ok_or(ParseError::InvalidRequest)?;
    let version = parts.next().ok_or(ParseError::InvalidRequest)?;
    if parts.next().is_some() {
        return Err(ParseError::InvalidRequest);
    }

    let method = Method::from_str(method_str).ok_or(ParseError::InvalidMethod)?;

    if !is_valid_version(version) {
        return Err(ParseError::InvalidVersion);
    }

    // Headers
    let mut headers = HashMap::new();
    let mut content_length: Option<usize> = None;

    for line in lines {
        if line.is_empty() {
            continue;
        }

        let (key, value) = line
            .split_once(':')
            .ok_or(ParseError::InvalidHeader)?;

        let key = key.trim();
        let value = value.trim();
        if key.is_empty() {
            return Err(ParseError::InvalidHeader);
        }

        // Every Content-Length, whatever its case, has to agree.
        if key.eq_ignore_ascii_case("Content-Length") {
            let len = value
                .parse::<usize>()
                .map_err(|_| ParseError::InvalidContentLength)?;
            if content_length.is_some_and(|seen| seen != len) {
                return Err(ParseError::InvalidContentLength);
            }
            content_length = Some(len);
        }

        headers.insert(key.to_string(), value.to_string());
    }

    // The body is framed and skipped; no route reads it.
    let content_length = content_length.unwrap_or(0);
    if body_bytes.len() < content_length {
        return Err(ParseError::Incomplete);
    }

    let request = Request {
        method,
        path: path.to_string(),
        version: version.to_string(),
        headers,
    };

    let total_consumed = headers_end + 4 + content_length;
    Ok((request, total_consumed))
}

/// `HTTP/<digit>.<digit>`
fn is_valid_version(version: &str) -> bool {
    match version.strip_prefix("HTTP/").map(str::as_bytes) {
        Some([major, b'.', minor]) => major.is_ascii_digit() && minor.is_ascii_digit(),
        _ => false,
    }
}

fn find_headers_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4)
        .position(|w| w == b"\r\n\r\n")
}
