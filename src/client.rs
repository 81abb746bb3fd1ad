// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The client value every call goes through, and the dispatcher that signs and sends requests.

use std::fmt;

use hyper::{Body, Method, Request};
use serde::de::DeserializeOwned;

use crate::auth::{self, AccessToken, KeyPair, SignatureType};
use crate::common::*;
use crate::error::{self, Error};
use crate::links;

/// Which revision of the Netflix API a client talks to.
///
/// The two revisions share their endpoints, but differ in a few parameters and in the shape of
/// their responses. Bound to `V2`, every request carries `v=2.0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiVersion {
    /// The original 1.x API.
    V1,
    /// The 2.0 API.
    V2,
}

impl Default for ApiVersion {
    fn default() -> ApiVersion {
        ApiVersion::V2
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ApiVersion::V1 => write!(f, "1.0"),
            ApiVersion::V2 => write!(f, "2.0"),
        }
    }
}

/// The URLs a client sends its requests to.
///
/// The default points at the public Netflix API. Paths given to `execute` are appended to
/// `base_url`; the two token URLs are used as-is by the authorization handshake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    /// Prefix for every relative path.
    pub base_url: String,
    /// Where `begin_authorization` asks for a request token.
    pub request_token: String,
    /// Where `complete_authorization` exchanges a request token.
    pub access_token: String,
}

impl Endpoints {
    /// Builds the endpoint set for a service rooted at the given URL, using the standard
    /// `/oauth/request_token` and `/oauth/access_token` paths under it.
    pub fn rooted_at(base_url: impl Into<String>) -> Endpoints {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Endpoints {
            request_token: format!("{}/oauth/request_token", base_url),
            access_token: format!("{}/oauth/access_token", base_url),
            base_url,
        }
    }
}

impl Default for Endpoints {
    fn default() -> Endpoints {
        Endpoints {
            base_url: links::BASE_URL.to_string(),
            request_token: links::auth::REQUEST_TOKEN.to_string(),
            access_token: links::auth::ACCESS_TOKEN.to_string(),
        }
    }
}

/// A configured connection to the Netflix API.
///
/// A `Netflix` value carries the application's consumer identity, the API version it is bound to,
/// and the connection pool its requests go through. It never changes after it's built, so it can
/// be cloned freely and shared between tasks; clones share the connection pool.
///
/// Calls that don't involve a subscriber (the catalog, the authorization handshake) take a
/// `&Netflix` directly. Calls about a subscriber go through a [`User`] session built from a
/// client and an access token.
///
/// [`User`]: user/struct.User.html
///
/// ```rust,no_run
/// use netflix_api::{ApiVersion, Netflix};
///
/// # fn main() -> netflix_api::error::Result<()> {
/// let client = Netflix::new("My App", "consumer key", "consumer secret")?
///     .with_version(ApiVersion::V1);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Netflix {
    pub(crate) app_name: CowStr,
    pub(crate) consumer: KeyPair,
    pub(crate) version: ApiVersion,
    pub(crate) endpoints: Endpoints,
    pub(crate) signature_type: SignatureType,
    pub(crate) transport: Transport,
}

impl Netflix {
    /// Creates a client for the given application, bound to the 2.0 API.
    ///
    /// Surrounding whitespace is trimmed from all three values. Returns `Config` if any of them
    /// is empty.
    pub fn new<A, K, S>(app_name: A, consumer_key: K, consumer_secret: S) -> error::Result<Netflix>
    where
        A: Into<CowStr>,
        K: Into<CowStr>,
        S: Into<CowStr>,
    {
        let app_name = auth::non_empty(app_name.into(), "application name")?;
        let consumer = KeyPair::new(consumer_key, consumer_secret)
            .validated("consumer key", "consumer secret")?;

        Ok(Netflix {
            app_name,
            consumer,
            version: ApiVersion::default(),
            endpoints: Endpoints::default(),
            signature_type: SignatureType::default(),
            transport: Transport::new(),
        })
    }

    /// Binds this client to the given API version.
    pub fn with_version(self, version: ApiVersion) -> Self {
        Netflix { version, ..self }
    }

    /// Sends requests to the given endpoints instead of the public Netflix API.
    pub fn with_endpoints(self, endpoints: Endpoints) -> Self {
        Netflix { endpoints, ..self }
    }

    /// Sets where the OAuth parameters go in signed API requests. The authorization handshake
    /// always uses the `Authorization` header.
    pub fn with_signature_type(self, signature_type: SignatureType) -> Self {
        Netflix {
            signature_type,
            ..self
        }
    }

    /// The API version this client is bound to.
    pub fn version(&self) -> ApiVersion {
        self.version
    }

    /// The application name given when the client was built.
    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    /// The public half of the consumer identity.
    pub fn consumer_key(&self) -> &str {
        &self.consumer.key
    }

    /// The endpoints this client sends its requests to.
    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// Builds the signed request for the given call without sending it.
    ///
    /// * `path_or_url` is either an absolute URL, used as-is, or a path appended to the base URL.
    ///   A query string on an absolute URL is kept and signed along with `params`.
    /// * `params` is normalized: `v=2.0` is added on the 2.0 API, `output=json` is added unless
    ///   `params` already names `output` (even as absent), and absent parameters are removed.
    /// * `GET` puts the parameters in the query string; other methods send them as a form body.
    /// * The request is signed with the consumer identity alone, or with the consumer identity and
    ///   `token` when one is given.
    pub fn prepare(
        &self,
        method: Method,
        path_or_url: &str,
        params: ParamList,
        headers: Headers,
        token: Option<&AccessToken>,
    ) -> error::Result<Request<Body>> {
        let (base, embedded) = self.resolve(path_or_url)?;
        let params = self.normalize(params);

        let builder = auth::raw::RequestBuilder::new(method.clone(), &base)
            .with_headers(headers)
            .signature_type(self.signature_type);
        let builder = if method == Method::GET {
            let mut query = embedded;
            query.combine(params);
            builder.with_query_params(&query)
        } else if embedded.is_empty() {
            builder.with_body_params(&params)
        } else {
            builder
                .with_query_params(&embedded)
                .with_body_params(&params)
        };

        builder.request_keys(&self.consumer, token.map(|t| &t.token))
    }

    /// Signs and sends the given call, returning the decoded JSON body of a 2xx response.
    ///
    /// See `prepare` for how the request is built. Exactly one request is sent; a non-2xx
    /// response becomes a `Remote` error carrying the status, and a network failure becomes
    /// `Transport`. Neither is retried.
    pub async fn execute(
        &self,
        method: Method,
        path_or_url: &str,
        params: ParamList,
        headers: Headers,
        token: Option<&AccessToken>,
    ) -> error::Result<serde_json::Value> {
        self.execute_json(method, path_or_url, params, headers, token).await
    }

    /// Like `execute`, but deserializes the response into the given type.
    pub async fn execute_json<T: DeserializeOwned>(
        &self,
        method: Method,
        path_or_url: &str,
        params: ParamList,
        headers: Headers,
        token: Option<&AccessToken>,
    ) -> error::Result<T> {
        let request = self.prepare(method, path_or_url, params, headers, token)?;
        request_with_json_response(&self.transport, request).await
    }

    /// Like `execute`, but hands back the body of a 2xx response as a stream of chunks instead
    /// of reading it.
    pub async fn execute_stream(
        &self,
        method: Method,
        path_or_url: &str,
        params: ParamList,
        headers: Headers,
        token: Option<&AccessToken>,
    ) -> error::Result<BodyStream> {
        let request = self.prepare(method, path_or_url, params, headers, token)?;
        request_as_stream(&self.transport, request).await
    }

    /// Turns a path or absolute URL into the URL to sign (no query, no fragment) and the query
    /// parameters it carried.
    fn resolve(&self, path_or_url: &str) -> error::Result<(String, ParamList)> {
        let mut url = match url::Url::parse(path_or_url) {
            Ok(url) => url,
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                let base = self.endpoints.base_url.trim_end_matches('/');
                let full = if path_or_url.starts_with('/') {
                    format!("{}{}", base, path_or_url)
                } else {
                    format!("{}/{}", base, path_or_url)
                };
                url::Url::parse(&full).map_err(|_| Error::BadUrl(full))?
            }
            Err(_) => return Err(Error::BadUrl(path_or_url.to_string())),
        };

        let mut embedded = ParamList::new();
        for (k, v) in url.query_pairs() {
            embedded.add_param_ref(k.into_owned(), v.into_owned());
        }
        url.set_query(None);
        url.set_fragment(None);

        Ok((url.into(), embedded))
    }

    fn normalize(&self, mut params: ParamList) -> ParamList {
        if self.version == ApiVersion::V2 {
            params.add_param_ref("v", "2.0");
        }
        if !params.contains_key("output") {
            params.add_param_ref("output", "json");
        }
        params.drop_absent();
        params
    }
}
