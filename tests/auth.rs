// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

mod common;

use netflix_api::auth::{begin_authorization, complete_authorization, RequestToken};
use netflix_api::error::Error;
use netflix_api::user::User;
use netflix_api::ApiVersion;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common::*;

const LOGIN_URL: &str = "https://api-user.netflix.com/oauth/login?oauth_token=rt-key";

fn request_token_body() -> String {
    url::form_urlencoded::Serializer::new(String::new())
        .append_pair("oauth_token", "rt-key")
        .append_pair("oauth_token_secret", "rt-secret")
        .append_pair("application_name", APP_NAME)
        .append_pair("login_url", LOGIN_URL)
        .finish()
}

#[tokio::test]
async fn out_of_band_handshake() {
    init_tracing();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/oauth/request_token"))
        .and(AuthorizationContains("oauth_callback=\"oob\""))
        .and(AuthorizationLacks("oauth_token="))
        .respond_with(ResponseTemplate::new(200).set_body_string(request_token_body()))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/oauth/access_token"))
        .and(AuthorizationContains("oauth_token=\"rt-key\""))
        .and(AuthorizationContains("oauth_verifier=\"1234567\""))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "user_id=T1abc&oauth_token=access-key&oauth_token_secret=access-secret",
        ))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/users/T1abc"))
        .and(NoQueryParam("oauth_callback"))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            serde_json::json!({"user": {"user_id": "T1abc", "first_name": "Ada"}}),
        ))
        .expect(2)
        .mount(&server)
        .await;

    let client = client_for(&server, ApiVersion::V2);

    let (request_token, login_url) = begin_authorization(&client, true).await.unwrap();
    assert_eq!(request_token.key(), "rt-key");
    assert_eq!(request_token.secret(), "rt-secret");
    assert_eq!(
        login_url,
        "https://api-user.netflix.com/oauth/login?oauth_token=rt-key\
         &application_name=Queue+Manager&oauth_consumer_key=consumer-key"
    );

    let access = complete_authorization(&client, request_token, Some("1234567"))
        .await
        .unwrap();
    assert_eq!(access.user_id, "T1abc");
    assert_eq!(access.token.key, "access-key");
    assert_eq!(access.token.secret, "access-secret");

    let user = User::new(&client, access).unwrap();
    let first = user.details().await.unwrap();
    let second = user.details().await.unwrap();
    assert_eq!(first["user"]["user_id"], "T1abc");
    assert_eq!(first["user"]["user_id"], second["user"]["user_id"]);
    assert_eq!(user.id(), "T1abc");
}

#[tokio::test]
async fn callback_handshake_sends_no_verifier() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/oauth/request_token"))
        .and(AuthorizationLacks("oauth_callback"))
        .respond_with(ResponseTemplate::new(200).set_body_string(request_token_body()))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/oauth/access_token"))
        .and(AuthorizationLacks("oauth_verifier"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "user_id=T1abc&oauth_token=access-key&oauth_token_secret=access-secret",
        ))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, ApiVersion::V1);
    let (request_token, _) = begin_authorization(&client, false).await.unwrap();
    let access = complete_authorization(&client, request_token, None).await.unwrap();
    assert_eq!(access.user_id, "T1abc");
}

#[tokio::test]
async fn missing_field_is_an_auth_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/oauth/request_token"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("oauth_token=rt-key&oauth_token_secret=rt-secret"),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/oauth/access_token"))
        .respond_with(ResponseTemplate::new(401).set_body_string("oauth_problem=token_rejected"))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, ApiVersion::V2);

    match begin_authorization(&client, true).await {
        Err(Error::Auth(field)) => assert_eq!(field, "login_url"),
        other => panic!("unexpected result: {:?}", other),
    }

    let stale = RequestToken::new("rt-key", "rt-secret");
    match complete_authorization(&client, stale, Some("0000000")).await {
        Err(Error::Auth(field)) => assert_eq!(field, "user_id"),
        other => panic!("unexpected result: {:?}", other),
    }
}

#[tokio::test]
async fn blank_field_is_an_auth_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/oauth/request_token"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "oauth_token=&oauth_token_secret=&login_url=http%3A%2F%2Fauth%2Fx",
        ))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/oauth/access_token"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("user_id=&oauth_token=T2&oauth_token_secret=S2"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, ApiVersion::V2);

    match begin_authorization(&client, true).await {
        Err(Error::Auth(field)) => assert_eq!(field, "oauth_token"),
        other => panic!("unexpected result: {:?}", other),
    }

    let request_token = RequestToken::new("rt-key", "rt-secret");
    match complete_authorization(&client, request_token, Some("1234567")).await {
        Err(Error::Auth(field)) => assert_eq!(field, "user_id"),
        other => panic!("unexpected result: {:?}", other),
    }
}
