// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! A composite error type for errors that can occur while interacting with Netflix.
//!
//! Any action that crosses the network to call Netflix has many places where it can go wrong.
//! Whether it's a bad network connection, a revoked authorization token, or a request the service
//! refuses to process, the error is captured by the `Error` type in this module; which variant you
//! get tells you who to blame.
//!
//! * `Config` is raised before anything leaves the machine, when the client or a session was
//!   built with an empty credential.
//! * `Auth` means the authorization handshake got a response without the fields it needed. The
//!   handshake needs to be restarted from `begin_authorization`.
//! * `Remote` means Netflix answered with a non-2xx status. The [`RemoteError`] inside carries
//!   the URL, the status, the raw body, and the decoded JSON error payload when there was one.
//! * `Transport` means the request never got an answer: DNS failure, a refused connection, a
//!   dropped socket. Nothing in this library retries these.
//!
//! [`RemoteError`]: struct.RemoteError.html

use std::fmt;

use hyper::StatusCode;
use thiserror::Error;

/// Convenient alias to a Result containing a local Error type
pub type Result<T> = std::result::Result<T, Error>;

/// The error payload returned with a non-success status.
#[derive(Debug)]
pub struct RemoteError {
    /// The full URL of the request that failed, including its query string for GET requests.
    pub url: String,
    /// The status code Netflix answered with.
    pub status: StatusCode,
    /// The response body, as received.
    pub body: String,
    /// The response body decoded as JSON. `None` if the body was not valid JSON.
    pub payload: Option<serde_json::Value>,
}

impl fmt::Display for RemoteError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Error fetching url: {}. Code: {}. Error: {}",
            self.url,
            self.status.as_u16(),
            self.body
        )
    }
}

impl std::error::Error for RemoteError {}

/// Represents an error that can occur while calling Netflix.
#[derive(Debug, Error)]
pub enum Error {
    /// A required credential field was empty when building a client or session. The enclosed
    /// value names the field.
    #[error("Invalid configuration: {} cannot be empty", _0)]
    Config(&'static str),
    /// The authorization handshake received a response without a required field. This usually
    /// means the consumer key was rejected, or the request token expired or was refused. The
    /// enclosed value names the missing field.
    #[error("Value missing from authorization response: {}", _0)]
    Auth(&'static str),
    /// Netflix returned a status code outside the 2xx range.
    #[error("{}", _0)]
    Remote(RemoteError),
    /// The request could not be completed at the network level.
    #[error("Network error: {}", _0)]
    Transport(#[from] hyper::Error),
    /// A parameter value was outside the set accepted by the API, or isn't accepted by the API
    /// version the client is bound to. The enclosed values are the parameter name and the rejected
    /// value.
    #[error("Invalid value for {}: {}", _0, _1)]
    InvalidParameter(&'static str, String),
    /// The URL given did not match what the API method expects.
    #[error("URL given did not match API method: {}", _0)]
    BadUrl(String),
    /// The HTTP request could not be assembled from the given parts.
    #[error("Could not assemble request: {}", _0)]
    Request(#[from] hyper::http::Error),
    /// The signing key could not be used to initialize the signature digest.
    #[error("Invalid signing key")]
    InvalidKey,
    /// An error occurred while deserializing a successful response.
    #[error("JSON deserialize error: {}", _0)]
    DeserializeError(#[from] serde_json::Error),
}

impl Error {
    /// Returns the HTTP status code attached to this error, if Netflix answered at all.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::Remote(err) => Some(err.status),
            _ => None,
        }
    }
}

impl From<RemoteError> for Error {
    fn from(err: RemoteError) -> Error {
        Error::Remote(err)
    }
}
