//! Fixed route table for the informational endpoints.
//!
//! Routing is an exact match on the request target. The table is a
//! process-wide constant, so every connection reads it without locking.

use crate::http::response::{Response, ResponseBuilder, StatusCode};

/// A single fixed endpoint.
pub struct Route {
    pub path: &'static str,
    pub content_type: &'static str,
    pub body: &'static str,
}

const COUNT_PAGE: &str = "<html>\n\
<head><title>Request count</title></head>\n\
<body>\n\
<h1>Request count</h1>\n\
<p>There have been  requests so far.</p>\n\
</body>\n\
</html>\n";

const TIME_PAGE: &str = "<html>\n\
<head><title>Current time</title></head>\n\
<body>\n\
<h1>Current time</h1>\n\
<p>The current time is  seconds since the epoch.</p>\n\
</body>\n\
</html>\n";

pub static ROUTES: &[Route] = &[
    Route {
        path: "/count",
        content_type: "text/html",
        body: COUNT_PAGE,
    },
    Route {
        path: "/time",
        content_type: "text/html",
        body: TIME_PAGE,
    },
];

pub fn lookup(path: &str) -> Option<&'static Route> {
    ROUTES.iter().find(|route| route.path == path)
}

/// Maps a GET target to its response: 200 for a known route, 404 otherwise.
pub fn route(path: &str) -> Response {
    match lookup(path) {
        Some(route) => ResponseBuilder::new(StatusCode::Ok)
            .content_type(route.content_type)
            .body(route.body)
            .build(),
        None => Response::not_found(),
    }
}
