// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Raw access to the request- and response-building primitives used internally by this crate.
//!
//! The functions and types exposed in this module allow you to reach Netflix API resources that
//! aren't wrapped by the `catalog` and `user` modules, or to send parameters those modules don't
//! use. In return, you need to know the Netflix API reference for the resource you're calling.
//!
//! The functions here are split between assembling a request and sending it.
//!
//! * `request` runs the same preparation `Netflix::execute` does (URL resolution, parameter
//!   normalization, OAuth signing) and hands back the finished `Request` without sending it.
//! * `response_future` just starts the request and hands off the `ResponseFuture` from `hyper`,
//!   leaving every part of the response to you.
//! * `response_raw_bytes` waits for the response and returns the headers and body of a 2xx
//!   response, or a `Remote` error for any other status.
//! * `response_json` picks up from `response_raw_bytes` to deserialize the body into the target
//!   type.
//! * `response_stream` checks the status and hands back the body as a lazy `BodyStream`.
//!
//! ```rust,no_run
//! # #[tokio::main]
//! # async fn main() -> netflix_api::error::Result<()> {
//! # let client = netflix_api::Netflix::new("app", "key", "secret")?;
//! use netflix_api::raw::{self, Headers, ParamList};
//!
//! let params = ParamList::new().add_param("term", "keanu");
//! let req = raw::request(
//!     &client,
//!     hyper::Method::GET,
//!     "/catalog/people",
//!     params,
//!     Headers::new(),
//!     None,
//! )?;
//! let people: serde_json::Value = raw::response_json(&client, req).await?;
//! # Ok(())
//! # }
//! ```

use hyper::client::ResponseFuture;
use hyper::{Body, Method, Request};
use serde::de::DeserializeOwned;

use crate::auth::AccessToken;
use crate::error;
use crate::Netflix;

pub use crate::common::{percent_encode, BodyStream, Headers, ParamList};

/// Assembles the signed request for the given call without sending it.
///
/// This is `Netflix::prepare` under another name.
pub fn request(
    client: &Netflix,
    method: Method,
    path_or_url: &str,
    params: ParamList,
    headers: Headers,
    token: Option<&AccessToken>,
) -> error::Result<Request<Body>> {
    client.prepare(method, path_or_url, params, headers, token)
}

/// Starts the given request through the client's connection pool.
pub fn response_future(client: &Netflix, request: Request<Body>) -> ResponseFuture {
    client.transport.get_response(request)
}

/// Sends the given request and returns the headers and body of a 2xx response.
pub async fn response_raw_bytes(
    client: &Netflix,
    request: Request<Body>,
) -> error::Result<(Headers, Vec<u8>)> {
    crate::common::raw_request(&client.transport, request).await
}

/// Sends the given request and deserializes the body of a 2xx response.
pub async fn response_json<T: DeserializeOwned>(
    client: &Netflix,
    request: Request<Body>,
) -> error::Result<T> {
    crate::common::request_with_json_response(&client.transport, request).await
}

/// Sends the given request and hands back the body of a 2xx response without reading it.
pub async fn response_stream(
    client: &Netflix,
    request: Request<Body>,
) -> error::Result<BodyStream> {
    crate::common::request_as_stream(&client.transport, request).await
}
