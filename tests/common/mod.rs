// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

#![allow(dead_code)]

use netflix_api::{ApiVersion, Endpoints, Netflix};
use wiremock::{Match, MockServer, Request};

pub const APP_NAME: &str = "Queue Manager";
pub const CONSUMER_KEY: &str = "consumer-key";
pub const CONSUMER_SECRET: &str = "consumer-secret";

pub fn client_for(server: &MockServer, version: ApiVersion) -> Netflix {
    Netflix::new(APP_NAME, CONSUMER_KEY, CONSUMER_SECRET)
        .unwrap()
        .with_version(version)
        .with_endpoints(Endpoints::rooted_at(server.uri()))
}

/// Matches requests whose query string doesn't carry the given key at all.
pub struct NoQueryParam(pub &'static str);

impl Match for NoQueryParam {
    fn matches(&self, request: &Request) -> bool {
        !request.url.query_pairs().any(|(k, _)| k == self.0)
    }
}

/// Matches requests whose `Authorization` header contains the given text.
pub struct AuthorizationContains(pub &'static str);

impl Match for AuthorizationContains {
    fn matches(&self, request: &Request) -> bool {
        request
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map_or(false, |v| v.contains(self.0))
    }
}

/// Matches requests whose `Authorization` header doesn't contain the given text.
pub struct AuthorizationLacks(pub &'static str);

impl Match for AuthorizationLacks {
    fn matches(&self, request: &Request) -> bool {
        request
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map_or(false, |v| !v.contains(self.0))
    }
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
