use vigil::http::response::{Response, ResponseBuilder, SERVER_NAME, StatusCode};
use vigil::http::writer::serialize_response;

#[test]
fn test_status_code_as_u16() {
    assert_eq!(StatusCode::Ok.as_u16(), 200);
    assert_eq!(StatusCode::BadRequest.as_u16(), 400);
    assert_eq!(StatusCode::NotFound.as_u16(), 404);
}

#[test]
fn test_status_code_reason_phrase() {
    assert_eq!(StatusCode::Ok.reason_phrase(), "OK");
    assert_eq!(StatusCode::BadRequest.reason_phrase(), "Bad Request");
    assert_eq!(StatusCode::NotFound.reason_phrase(), "Not Found");
}

#[test]
fn test_response_builder_basic() {
    let response = ResponseBuilder::new(StatusCode::Ok)
        .body(b"Hello, World!".to_vec())
        .build();

    assert_eq!(response.status, StatusCode::Ok);
    assert_eq!(response.version, "HTTP/1.1");
    assert_eq!(response.body, b"Hello, World!".to_vec());
}

#[test]
fn test_response_builder_default_headers() {
    let response = ResponseBuilder::new(StatusCode::Ok).build();

    assert_eq!(response.header("Server"), Some(SERVER_NAME));
    assert_eq!(response.header("Connection"), Some("close"));
    assert_eq!(response.header("Content-Length"), Some("0"));
    assert_eq!(response.headers.len(), 3);
}

#[test]
fn test_response_builder_content_length_tracks_body() {
    let body = "héllo".to_string();
    let response = ResponseBuilder::new(StatusCode::Ok).body(body.clone()).build();

    // byte length, not char count
    assert_eq!(response.header("Content-Length"), Some("6"));
    assert_eq!(body.len(), 6);
}

#[test]
fn test_response_builder_overrides_stale_content_length() {
    let response = ResponseBuilder::new(StatusCode::Ok)
        .header("Content-Length", "999")
        .body(b"test".to_vec())
        .build();

    assert_eq!(response.header("Content-Length"), Some("4"));
}

#[test]
fn test_response_builder_never_keeps_alive() {
    let response = ResponseBuilder::new(StatusCode::Ok)
        .header("Connection", "keep-alive")
        .build();

    assert_eq!(response.header("Connection"), Some("close"));
}

#[test]
fn test_response_builder_custom_server_header() {
    let response = ResponseBuilder::new(StatusCode::Ok)
        .header("Server", "Beast")
        .build();

    assert_eq!(response.header("Server"), Some("Beast"));
}

#[test]
fn test_response_bad_request_helper() {
    let response = Response::bad_request("Invalid request-method 'PUT'");

    assert_eq!(response.status, StatusCode::BadRequest);
    assert_eq!(response.header("Content-Type"), Some("text/plain"));
    assert_eq!(response.body, b"Invalid request-method 'PUT'".to_vec());
    assert_eq!(response.header("Content-Length"), Some("28"));
}

#[test]
fn test_response_not_found_helper() {
    let response = Response::not_found();

    assert_eq!(response.status, StatusCode::NotFound);
    assert_eq!(response.header("Content-Type"), Some("text/plain"));
    assert_eq!(response.body, b"File not found\r\n".to_vec());
    assert_eq!(response.header("Content-Length"), Some("16"));
}

#[test]
fn test_response_with_version() {
    let response = Response::not_found().with_version("HTTP/1.0");
    let bytes = serialize_response(&response);

    assert!(bytes.starts_with(b"HTTP/1.0 404 Not Found\r\n"));
}

#[test]
fn test_serialized_response_layout() {
    let response = ResponseBuilder::new(StatusCode::Ok)
        .content_type("text/html")
        .body("<p>x</p>")
        .build();
    let text = String::from_utf8(serialize_response(&response).to_vec()).unwrap();

    let (head, body) = text.split_once("\r\n\r\n").unwrap();
    let mut lines = head.split("\r\n");

    assert_eq!(lines.next(), Some("HTTP/1.1 200 OK"));
    assert_eq!(lines.next(), Some(format!("Server: {}", SERVER_NAME).as_str()));
    assert_eq!(lines.next(), Some("Content-Type: text/html"));
    assert_eq!(lines.next(), Some("Content-Length: 8"));
    assert_eq!(lines.next(), Some("Connection: close"));
    assert_eq!(lines.next(), None);
    assert_eq!(body, "<p>x</p>");
}
