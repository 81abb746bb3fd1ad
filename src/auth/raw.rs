// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Internal mechanisms for the `auth` module: OAuth 1.0a HMAC-SHA1 signing and request assembly.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use hmac::{Hmac, Mac, NewMac};
use hyper::header::{AUTHORIZATION, CONTENT_TYPE};
use hyper::{Body, Method, Request};
use rand::{self, Rng};
use sha1::Sha1;

use crate::common::*;
use crate::error;

use super::KeyPair;

/// Where the OAuth parameters of a signed request are placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureType {
    /// In an `Authorization: OAuth ...` header. This is the default.
    Header,
    /// Appended to the query string of the request URL, alongside the regular parameters.
    Query,
}

impl Default for SignatureType {
    fn default() -> SignatureType {
        SignatureType::Header
    }
}

pub struct RequestBuilder<'a> {
    base_uri: &'a str,
    method: Method,
    params: Option<ParamList>,
    query: Option<String>,
    body: Option<(Body, &'static str)>,
    headers: Headers,
    addon: OAuthAddOn,
    signature_type: SignatureType,
}

impl<'a> RequestBuilder<'a> {
    pub fn new(method: Method, base_uri: &'a str) -> Self {
        RequestBuilder {
            base_uri,
            method,
            params: None,
            query: None,
            body: None,
            headers: Headers::new(),
            addon: OAuthAddOn::None,
            signature_type: SignatureType::Header,
        }
    }

    pub fn with_query_params(self, params: &ParamList) -> Self {
        let total_params = if let Some(mut my_params) = self.params {
            my_params.combine(params.clone());
            my_params
        } else {
            params.clone()
        };
        RequestBuilder {
            query: Some(params.to_urlencoded()),
            params: Some(total_params),
            ..self
        }
    }

    pub fn with_body_params(self, params: &ParamList) -> Self {
        let total_params = if let Some(mut my_params) = self.params {
            my_params.combine(params.clone());
            my_params
        } else {
            params.clone()
        };
        RequestBuilder {
            body: Some((
                Body::from(params.to_urlencoded()),
                "application/x-www-form-urlencoded",
            )),
            params: Some(total_params),
            ..self
        }
    }

    pub fn with_headers(self, headers: Headers) -> Self {
        RequestBuilder { headers, ..self }
    }

    pub fn signature_type(self, signature_type: SignatureType) -> Self {
        RequestBuilder {
            signature_type,
            ..self
        }
    }

    pub fn oauth_callback(self, callback: impl Into<String>) -> Self {
        RequestBuilder {
            addon: OAuthAddOn::Callback(callback.into()),
            ..self
        }
    }

    pub fn oauth_verifier(self, verifier: impl Into<String>) -> Self {
        RequestBuilder {
            addon: OAuthAddOn::Verifier(verifier.into()),
            ..self
        }
    }

    /// Signs the request with the given consumer key and, if present, the given token, then
    /// assembles it.
    pub fn request_keys(
        self,
        consumer_key: &KeyPair,
        token: Option<&KeyPair>,
    ) -> error::Result<Request<Body>> {
        let oauth = OAuthParams::from_keys(consumer_key.clone(), token.cloned())
            .with_addon(self.addon.clone());
        self.request_signed(oauth)
    }

    fn request_signed(self, oauth: OAuthParams) -> error::Result<Request<Body>> {
        let signed = oauth.sign_request(self.method.clone(), self.base_uri, self.params.as_ref())?;
        match self.signature_type {
            SignatureType::Header => {
                let authorization = signed.to_string();
                self.assemble(Some(authorization), None)
            }
            SignatureType::Query => {
                let oauth_query = signed.to_urlencoded();
                self.assemble(None, Some(oauth_query))
            }
        }
    }

    fn assemble(
        self,
        authorization: Option<String>,
        oauth_query: Option<String>,
    ) -> error::Result<Request<Body>> {
        let query = match (self.query, oauth_query) {
            (Some(q), Some(o)) if !q.is_empty() => Some(format!("{}&{}", q, o)),
            (_, Some(o)) => Some(o),
            (Some(q), None) if !q.is_empty() => Some(q),
            (_, None) => None,
        };
        let full_url = if let Some(query) = query {
            format!("{}?{}", self.base_uri, query)
        } else {
            self.base_uri.to_string()
        };

        let mut request = Request::builder().method(self.method).uri(full_url);
        if let Some(headers) = request.headers_mut() {
            headers.extend(self.headers);
        }
        if let Some(authorization) = authorization {
            request = request.header(AUTHORIZATION, authorization);
        }

        if let Some((body, content)) = self.body {
            Ok(request.header(CONTENT_TYPE, content).body(body)?)
        } else {
            Ok(request.body(Body::empty())?)
        }
    }
}

/// OAuth header set used to create an OAuth signature.
#[derive(Clone, Debug)]
struct OAuthParams {
    /// The consumer key that represents the app making the API request.
    consumer_key: KeyPair,
    /// The token that represents the user authorizing the request (or the request token being
    /// exchanged for an access token).
    token: Option<KeyPair>,
    /// A random token representing the request itself. Used to de-duplicate requests on Netflix's
    /// end.
    nonce: String,
    /// A Unix timestamp for when the request was created.
    timestamp: u64,
    /// A callback or verifier parameter, if necessary.
    addon: OAuthAddOn,
}

impl OAuthParams {
    /// Creates an empty `OAuthParams` header with a new `timestamp` and `nonce`.
    ///
    /// **Note**: This should only be used as part of another constructor that populates the tokens!
    fn empty() -> OAuthParams {
        let timestamp = match SystemTime::now().duration_since(UNIX_EPOCH) {
            Ok(dur) => dur,
            Err(err) => err.duration(),
        }
        .as_secs();
        let nonce = rand::thread_rng()
            .sample_iter(&rand::distributions::Alphanumeric)
            .take(32)
            .map(char::from)
            .collect::<String>();
        OAuthParams {
            consumer_key: KeyPair::empty(),
            token: None,
            nonce,
            timestamp,
            addon: OAuthAddOn::None,
        }
    }

    /// Creates a new `OAuthParams` header with the given keys. The `token` is `None` only for
    /// consumer-signed calls: requesting a request token, or anonymous catalog calls.
    fn from_keys(consumer_key: KeyPair, token: Option<KeyPair>) -> OAuthParams {
        OAuthParams {
            consumer_key,
            token,
            ..OAuthParams::empty()
        }
    }

    /// Adds the given callback or verifier to this `OAuthParams` header.
    fn with_addon(self, addon: OAuthAddOn) -> OAuthParams {
        OAuthParams { addon, ..self }
    }

    /// Builds the OAuth signature base string for the given request.
    ///
    /// `uri` must already be normalized: scheme and host in lowercase, no query string, no
    /// fragment. Query parameters belong in `params`.
    fn base_string(&self, method: &Method, uri: &str, params: Option<&ParamList>) -> String {
        let mut sig_params = params.cloned().unwrap_or_default();
        sig_params.drop_absent();
        let mut sig_params = sig_params
            .add_param("oauth_consumer_key", self.consumer_key.key.clone())
            .add_param("oauth_nonce", self.nonce.clone())
            .add_param("oauth_signature_method", "HMAC-SHA1")
            .add_param("oauth_timestamp", self.timestamp.to_string())
            .add_param("oauth_version", "1.0");
        if let Some(ref token) = self.token {
            sig_params.add_param_ref("oauth_token", token.key.clone());
        }
        if let Some(callback) = self.addon.as_callback() {
            sig_params.add_param_ref("oauth_callback", callback.to_string());
        }
        if let Some(verifier) = self.addon.as_verifier() {
            sig_params.add_param_ref("oauth_verifier", verifier.to_string());
        }

        format!(
            "{}&{}&{}",
            percent_encode(method.as_str()),
            percent_encode(uri),
            percent_encode(&sig_params.to_urlencoded())
        )
    }

    /// Uses the parameters in this `OAuthParams` instance to generate a signature for the given
    /// request, returning it as a `SignedHeader`.
    fn sign_request(
        self,
        method: Method,
        uri: &str,
        params: Option<&ParamList>,
    ) -> error::Result<SignedHeader> {
        let base_str = self.base_string(&method, uri, params);
        let key = format!(
            "{}&{}",
            percent_encode(&self.consumer_key.secret),
            percent_encode(self.token.as_ref().map_or("", |t| &*t.secret))
        );

        let mut digest =
            Hmac::<Sha1>::new_from_slice(key.as_bytes()).map_err(|_| error::Error::InvalidKey)?;
        digest.update(base_str.as_bytes());

        let mut params: BTreeMap<&'static str, Cow<'static, str>> = BTreeMap::new();
        params.insert("oauth_signature_method", "HMAC-SHA1".into());
        params.insert("oauth_version", "1.0".into());

        params.insert("oauth_consumer_key", self.consumer_key.key);
        if let Some(token) = self.token {
            params.insert("oauth_token", token.key);
        }

        params.insert("oauth_nonce", self.nonce.into());
        params.insert("oauth_timestamp", self.timestamp.to_string().into());

        match self.addon {
            OAuthAddOn::Callback(c) => {
                params.insert("oauth_callback", c.into());
            }
            OAuthAddOn::Verifier(v) => {
                params.insert("oauth_verifier", v.into());
            }
            OAuthAddOn::None => (),
        }

        params.insert(
            "oauth_signature",
            base64::encode(&digest.finalize().into_bytes()).into(),
        );

        Ok(SignedHeader { params })
    }
}

/// Represents an "addon" to an OAuth header.
#[derive(Clone, Debug)]
enum OAuthAddOn {
    /// An `oauth_callback` parameter, used when generating a request token.
    Callback(String),
    /// An `oauth_verifier` parameter, used when generating an access token.
    Verifier(String),
    /// Neither an `oauth_callback` nor an `oauth_verifier` parameter are present in this header.
    /// This is the default used when signing a regular API request.
    None,
}

impl OAuthAddOn {
    /// Returns the `oauth_callback` parameter, if present.
    fn as_callback(&self) -> Option<&str> {
        match self {
            OAuthAddOn::Callback(c) => Some(c),
            _ => None,
        }
    }

    /// Returns the `oauth_verifier` parameter, if present.
    fn as_verifier(&self) -> Option<&str> {
        match self {
            OAuthAddOn::Verifier(v) => Some(v),
            _ => None,
        }
    }
}

/// A set of `OAuthParams` parameters combined with a request signature, ready to be attached to a
/// request.
struct SignedHeader {
    /// The OAuth parameters used to create the signature.
    params: BTreeMap<&'static str, Cow<'static, str>>,
}

impl SignedHeader {
    /// Formats the OAuth parameters as a query string, for `SignatureType::Query`.
    fn to_urlencoded(&self) -> String {
        self.params
            .iter()
            .map(|(k, v)| format!("{}={}", k, percent_encode(v)))
            .collect::<Vec<_>>()
            .join("&")
    }
}

/// The `Display` impl for `SignedHeader` formats it as an `Authorization` header for an HTTP
/// request.
impl fmt::Display for SignedHeader {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        // authorization scheme
        write!(f, "OAuth ")?;

        // authorization data

        let mut first = true;
        for (k, v) in &self.params {
            if first {
                first = false;
            } else {
                write!(f, ", ")?;
            }

            write!(f, "{}=\"{}\"", k, percent_encode(v))?;
        }

        Ok(())
    }
}
