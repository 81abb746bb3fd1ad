// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Infrastructure types and functions that every web call goes through: the transport, status
//! classification, and the streaming body wrapper used for catalog downloads.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures::Stream;
use hyper::body::Bytes;
use hyper::client::{HttpConnector, ResponseFuture};
use hyper::header::CONTENT_ENCODING;
use hyper::{Body, Request, StatusCode};
use serde::de::DeserializeOwned;

use crate::error::{self, RemoteError};

use super::Headers;

#[cfg(feature = "native_tls")]
type HttpsConnector = hyper_tls::HttpsConnector<HttpConnector>;
#[cfg(all(not(feature = "native_tls"), any(feature = "rustls", feature = "rustls_webpki")))]
type HttpsConnector = hyper_rustls::HttpsConnector<HttpConnector>;

#[cfg(feature = "native_tls")]
fn new_https_connector() -> HttpsConnector {
    hyper_tls::HttpsConnector::new()
}

#[cfg(all(not(feature = "native_tls"), feature = "rustls"))]
fn new_https_connector() -> HttpsConnector {
    hyper_rustls::HttpsConnector::with_native_roots()
}

#[cfg(all(not(feature = "native_tls"), not(feature = "rustls"), feature = "rustls_webpki"))]
fn new_https_connector() -> HttpsConnector {
    hyper_rustls::HttpsConnector::with_webpki_roots()
}

/// The HTTP connection pool a client sends its requests through.
///
/// Cloning a `Transport` is cheap and shares the underlying pool, so a `Netflix` client and all
/// the `User` sessions made from it reuse the same connections.
#[derive(Clone, Debug)]
pub struct Transport {
    client: hyper::Client<HttpsConnector, Body>,
}

impl Transport {
    /// Creates a new connection pool using the TLS backend selected by cargo features.
    pub fn new() -> Transport {
        Transport {
            client: hyper::Client::builder().build(new_https_connector()),
        }
    }

    /// Starts the given request, handing back the `ResponseFuture` from hyper.
    pub fn get_response(&self, request: Request<Body>) -> ResponseFuture {
        self.client.request(request)
    }
}

impl Default for Transport {
    fn default() -> Transport {
        Transport::new()
    }
}

/// Sends the given request and returns the headers and body of a 2xx response.
///
/// Any other status is turned into a `RemoteError` carrying the URL, the status, and the raw
/// body; if the body is JSON it is decoded into the error's `payload`. Failing to decode it is
/// logged and otherwise ignored, so the status is never masked by a parse error.
pub async fn raw_request(
    transport: &Transport,
    request: Request<Body>,
) -> error::Result<(Headers, Vec<u8>)> {
    let method = request.method().clone();
    let url = request.uri().to_string();

    let resp = transport.get_response(request).await?;
    let (parts, body) = resp.into_parts();
    tracing::debug!(%method, %url, status = parts.status.as_u16(), "netflix request");

    let body = hyper::body::to_bytes(body).await?.to_vec();

    if !parts.status.is_success() {
        return Err(remote_error(url, parts.status, &body).into());
    }

    Ok((parts.headers, body))
}

/// Sends the given request and deserializes a 2xx JSON response into the target type.
///
/// An empty successful body (as some `DELETE` calls return) is treated as JSON `null`.
pub async fn request_with_json_response<T: DeserializeOwned>(
    transport: &Transport,
    request: Request<Body>,
) -> error::Result<T> {
    let (_headers, body) = raw_request(transport, request).await?;
    if body.iter().all(u8::is_ascii_whitespace) {
        Ok(serde_json::from_value(serde_json::Value::Null)?)
    } else {
        Ok(serde_json::from_slice(&body)?)
    }
}

/// Sends the given request and, on a 2xx response, wraps its body in a `BodyStream` without
/// reading it.
pub async fn request_as_stream(
    transport: &Transport,
    request: Request<Body>,
) -> error::Result<BodyStream> {
    let method = request.method().clone();
    let url = request.uri().to_string();

    let resp = transport.get_response(request).await?;
    let (parts, body) = resp.into_parts();
    tracing::debug!(%method, %url, status = parts.status.as_u16(), "netflix streaming request");

    if !parts.status.is_success() {
        let body = hyper::body::to_bytes(body).await?;
        return Err(remote_error(url, parts.status, &body).into());
    }

    let content_encoding = parts
        .headers
        .get(CONTENT_ENCODING)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string());

    Ok(BodyStream {
        body,
        content_encoding,
    })
}

fn remote_error(url: String, status: StatusCode, body: &[u8]) -> RemoteError {
    let payload = match serde_json::from_slice::<serde_json::Value>(body) {
        Ok(payload) => Some(payload),
        Err(err) => {
            tracing::warn!(%url, status = status.as_u16(), error = %err,
                           "couldn't decode error response as JSON");
            None
        }
    };

    RemoteError {
        url,
        status,
        body: String::from_utf8_lossy(body).into_owned(),
        payload,
    }
}

/// A lazy, single-pass stream of the chunks of a response body.
///
/// The body is pulled off the connection only as the stream is polled, so a multi-hundred
/// megabyte download never sits in memory all at once. Once the stream returns `None` it is
/// exhausted; there is no way to rewind it, and the request has to be issued again to read the
/// body a second time.
///
/// The chunks are handed over exactly as they came off the wire. If the server compressed the
/// body, `content_encoding` says how, and decoding is up to the caller.
#[must_use = "streams are lazy and do nothing unless polled"]
pub struct BodyStream {
    body: Body,
    content_encoding: Option<String>,
}

impl BodyStream {
    /// The `Content-Encoding` the server applied to the body, if any (e.g. `"gzip"`).
    pub fn content_encoding(&self) -> Option<&str> {
        self.content_encoding.as_deref()
    }
}

impl Stream for BodyStream {
    type Item = error::Result<Bytes>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.body)
            .poll_next(cx)
            .map(|chunk| chunk.map(|res| res.map_err(error::Error::from)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_error_keeps_json_payload() {
        let err = remote_error(
            "http://api-public.netflix.com/catalog/titles/movies/0".to_string(),
            StatusCode::NOT_FOUND,
            br#"{"error":"not found"}"#,
        );

        assert_eq!(err.status, StatusCode::NOT_FOUND);
        assert_eq!(err.body, r#"{"error":"not found"}"#);
        assert_eq!(err.payload, Some(serde_json::json!({"error": "not found"})));
    }

    #[test]
    fn remote_error_without_json_payload() {
        let err = remote_error(
            "http://api-public.netflix.com/users/42".to_string(),
            StatusCode::BAD_GATEWAY,
            b"<html>Bad Gateway</html>",
        );

        assert_eq!(err.status, StatusCode::BAD_GATEWAY);
        assert_eq!(err.body, "<html>Bad Gateway</html>");
        assert!(err.payload.is_none());
    }
}
