// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Types and functions relating to authorizing a Netflix account.
//!
//! Netflix uses OAuth 1.0a to let an application act on behalf of its subscribers. Before you can
//! call anything under `/users`, you need three things: the *consumer* key pair that identifies
//! your application (handed out by the developer portal and given to [`Netflix::new`]), a
//! *request token* that represents one pending authorization, and finally the *access token* the
//! request token is exchanged for once the subscriber has approved it.
//!
//! [`Netflix::new`]: ../struct.Netflix.html#method.new
//!
//! # PIN-Based Authorization
//!
//! The flow for a desktop or command-line application looks like this:
//!
//! ```rust,no_run
//! # #[tokio::main]
//! # async fn main() -> netflix_api::error::Result<()> {
//! use netflix_api::Netflix;
//! use netflix_api::auth::{begin_authorization, complete_authorization};
//!
//! let client = Netflix::new("My App", "consumer key", "consumer secret")?;
//!
//! // step 1: ask Netflix for a request token and the page to send the subscriber to
//! let (request_token, login_url) = begin_authorization(&client, true).await?;
//! println!("Go to {} and authorize the app", login_url);
//!
//! // step 2: the subscriber visits the login URL and comes back with a PIN
//! let pin = "1234567";
//!
//! // step 3: trade the request token and PIN for an access token
//! let access_token = complete_authorization(&client, request_token, Some(pin)).await?;
//! println!("Authorized user {}", access_token.user_id);
//! # Ok(())
//! # }
//! ```
//!
//! The request token is consumed by `complete_authorization`. If that call fails, the whole
//! handshake has to start over from `begin_authorization`. The access token doesn't expire on its
//! own, so it can be serialized and stored; persisting it is up to the application.

use std::borrow::Cow;

use hyper::Method;
use serde::{Deserialize, Serialize};

use crate::common::*;
use crate::error::{self, Error};
use crate::Netflix;

pub(crate) mod raw;

pub use self::raw::SignatureType;

/// A key/secret pair representing an OAuth token.
///
/// This is used both for the consumer identity of an application and for the request and access
/// tokens handed out during authorization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyPair {
    /// A key used to identify an application or user.
    pub key: CowStr,
    /// A private key used to sign messages from an application or user.
    pub secret: CowStr,
}

impl KeyPair {
    /// Creates a KeyPair with the given key and secret.
    ///
    /// This can be called with either `&'static str` or `String`.
    pub fn new<K, S>(key: K, secret: S) -> KeyPair
    where
        K: Into<Cow<'static, str>>,
        S: Into<Cow<'static, str>>,
    {
        KeyPair {
            key: key.into(),
            secret: secret.into(),
        }
    }

    /// Internal function to create an empty KeyPair. Not meant to be used from user code.
    pub(crate) fn empty() -> KeyPair {
        KeyPair {
            key: "".into(),
            secret: "".into(),
        }
    }

    /// Trims both halves and fails with `Config` if either is empty.
    pub(crate) fn validated(
        self,
        key_name: &'static str,
        secret_name: &'static str,
    ) -> error::Result<KeyPair> {
        let key = non_empty(self.key, key_name)?;
        let secret = non_empty(self.secret, secret_name)?;
        Ok(KeyPair { key, secret })
    }
}

pub(crate) fn non_empty(value: CowStr, name: &'static str) -> error::Result<CowStr> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(Error::Config(name))
    } else if trimmed.len() == value.len() {
        Ok(value)
    } else {
        Ok(trimmed.to_string().into())
    }
}

/// A pending authorization, handed out by `begin_authorization`.
///
/// The only thing you can do with one is give it back to `complete_authorization`, which consumes
/// it. For web applications that need to hold on to it between the redirect and the callback,
/// `key` and `secret` can be stored and the token rebuilt with `RequestToken::new`.
#[derive(Debug)]
pub struct RequestToken {
    token: KeyPair,
}

impl RequestToken {
    /// Rebuilds a request token from its stored key and secret.
    pub fn new<K, S>(key: K, secret: S) -> RequestToken
    where
        K: Into<Cow<'static, str>>,
        S: Into<Cow<'static, str>>,
    {
        RequestToken {
            token: KeyPair::new(key, secret),
        }
    }

    /// The public half of the request token.
    pub fn key(&self) -> &str {
        &self.token.key
    }

    /// The private half of the request token.
    pub fn secret(&self) -> &str {
        &self.token.secret
    }
}

/// The long-lived credential that lets an application act on behalf of one subscriber.
///
/// This is what `complete_authorization` returns, and what a [`User`] session signs every request
/// with. It can be serialized with serde to save it between runs.
///
/// [`User`]: ../user/struct.User.html
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessToken {
    /// The subscriber's identifier, as used in `/users/<id>` paths.
    pub user_id: String,
    /// The token key pair used to sign requests for this subscriber.
    pub token: KeyPair,
}

impl AccessToken {
    /// Creates an access token from stored parts, trimming surrounding whitespace.
    ///
    /// Returns `Config` if any of the three parts is empty.
    pub fn new<U, K, S>(user_id: U, key: K, secret: S) -> error::Result<AccessToken>
    where
        U: Into<Cow<'static, str>>,
        K: Into<Cow<'static, str>>,
        S: Into<Cow<'static, str>>,
    {
        let user_id = non_empty(user_id.into(), "user id")?.into_owned();
        let token = KeyPair::new(key, secret).validated("access token", "access token secret")?;
        Ok(AccessToken { user_id, token })
    }

    /// Checks a token that may have been built directly or deserialized.
    pub(crate) fn validated(self) -> error::Result<AccessToken> {
        AccessToken::new(self.user_id, self.token.key, self.token.secret)
    }
}

/// Step 1 of the handshake: asks Netflix for a request token.
///
/// Sends a POST to the request-token endpoint, signed with the consumer identity alone. With
/// `use_out_of_band` set, the request asks for PIN-based authorization (`oauth_callback=oob`), so
/// the subscriber is shown a code instead of being redirected.
///
/// Returns the request token together with the URL the subscriber has to visit to approve it.
/// That URL is the `login_url` from the response, with `application_name` and
/// `oauth_consumer_key` added to its query string.
///
/// Fails with `Auth` if the response is missing `oauth_token`, `oauth_token_secret`, or
/// `login_url`.
pub async fn begin_authorization(
    client: &Netflix,
    use_out_of_band: bool,
) -> error::Result<(RequestToken, String)> {
    let uri = &client.endpoints.request_token;
    let builder = raw::RequestBuilder::new(Method::POST, uri);
    let builder = if use_out_of_band {
        builder.oauth_callback("oob")
    } else {
        builder
    };
    let request = builder.request_keys(&client.consumer, None)?;

    tracing::debug!(url = %uri, use_out_of_band, "requesting request token");
    let body = handshake_body(&client.transport, request).await?;

    let mut token = None;
    let mut secret = None;
    let mut login_url = None;
    for (k, v) in reply_fields(&body) {
        match k.as_ref() {
            "oauth_token" => token = Some(v.into_owned()),
            "oauth_token_secret" => secret = Some(v.into_owned()),
            "login_url" => login_url = Some(v.into_owned()),
            _ => (),
        }
    }

    let token = token.ok_or(Error::Auth("oauth_token"))?;
    let secret = secret.ok_or(Error::Auth("oauth_token_secret"))?;
    let login_url = login_url.ok_or(Error::Auth("login_url"))?;

    let url = authorization_url(&login_url, &client.app_name, &client.consumer.key)?;
    Ok((RequestToken::new(token, secret), url))
}

/// Step 3 of the handshake: exchanges an approved request token for an access token.
///
/// Sends a POST to the access-token endpoint, signed with the consumer identity and the request
/// token. `verifier` is the PIN the subscriber was shown when PIN-based authorization is in use;
/// pass `None` otherwise.
///
/// Fails with `Auth` if the response is missing `user_id`, `oauth_token`, or
/// `oauth_token_secret`. The request token is consumed either way.
pub async fn complete_authorization(
    client: &Netflix,
    request_token: RequestToken,
    verifier: Option<&str>,
) -> error::Result<AccessToken> {
    let uri = &client.endpoints.access_token;
    let builder = raw::RequestBuilder::new(Method::POST, uri);
    let builder = match verifier {
        Some(verifier) => builder.oauth_verifier(verifier),
        None => builder,
    };
    let request = builder.request_keys(&client.consumer, Some(&request_token.token))?;

    tracing::debug!(url = %uri, "exchanging request token");
    let body = handshake_body(&client.transport, request).await?;

    let mut user_id = None;
    let mut token = None;
    let mut secret = None;
    for (k, v) in reply_fields(&body) {
        match k.as_ref() {
            "user_id" => user_id = Some(v.into_owned()),
            "oauth_token" => token = Some(v.into_owned()),
            "oauth_token_secret" => secret = Some(v.into_owned()),
            _ => (),
        }
    }

    let user_id = user_id.ok_or(Error::Auth("user_id"))?;
    let token = token.ok_or(Error::Auth("oauth_token"))?;
    let secret = secret.ok_or(Error::Auth("oauth_token_secret"))?;

    Ok(AccessToken {
        user_id,
        token: KeyPair::new(token, secret),
    })
}

/// The fields of a form-encoded handshake reply. Blank values count as missing.
fn reply_fields(body: &str) -> impl Iterator<Item = (Cow<'_, str>, Cow<'_, str>)> {
    url::form_urlencoded::parse(body.as_bytes()).filter(|(_, v)| !v.trim().is_empty())
}

/// Sends a handshake request and reads its body, regardless of the status.
///
/// Netflix answers a rejected handshake with an error body that lacks the token fields, so the
/// caller's field check is what turns it into an `Auth` error.
async fn handshake_body(
    transport: &Transport,
    request: hyper::Request<hyper::Body>,
) -> error::Result<String> {
    let resp = transport.get_response(request).await?;
    let (parts, body) = resp.into_parts();
    let body = hyper::body::to_bytes(body).await?;
    if !parts.status.is_success() {
        tracing::warn!(status = parts.status.as_u16(), "authorization handshake was not accepted");
    }
    Ok(String::from_utf8_lossy(&body).into_owned())
}

/// Adds `application_name` and `oauth_consumer_key` to the query of the given login URL.
///
/// Query parameters already on the URL are kept, except for same-named ones, which are replaced.
pub(crate) fn authorization_url(
    login_url: &str,
    app_name: &str,
    consumer_key: &str,
) -> error::Result<String> {
    let mut url = url::Url::parse(login_url).map_err(|_| Error::BadUrl(login_url.to_string()))?;
    let kept = url
        .query_pairs()
        .filter(|(k, _)| k != "application_name" && k != "oauth_consumer_key")
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect::<Vec<_>>();

    url.query_pairs_mut()
        .clear()
        .extend_pairs(kept)
        .append_pair("application_name", app_name)
        .append_pair("oauth_consumer_key", consumer_key);

    Ok(url.into())
}
