// SPDX-License-Identifier: MIT

//! Response security headers.
//!
//! No CSP: the API serves raw JPEG bytes from the gradient store and a CSP
//! would be meaningless for a non-HTML origin.

use axum::{extract::Request, http::HeaderValue, middleware::Next, response::Response};

pub async fn add_security_headers(req: Request, next: Next) -> Response {
    let mut response = next.run(req).await;
    let headers = response.headers_mut();

    headers.insert(
        "X-Content-Type-Options",
        HeaderValue::from_static("nosniff"),
    );
    headers.insert("X-Frame-Options", HeaderValue::from_static("DENY"));
    headers.insert(
        "Strict-Transport-Security",
        HeaderValue::from_static("max-age=31536000; includeSubDomains"),
    );
    headers.insert("Referrer-Policy", HeaderValue::from_static("no-referrer"));
    // Responses are per-user; intermediaries must not cache them
    headers.insert("Cache-Control", HeaderValue::from_static("no-store"));

    response
}
