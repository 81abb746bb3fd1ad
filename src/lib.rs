// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! A library for interacting with the Netflix public API.
//!
//! This crate signs requests with OAuth 1.0a (HMAC-SHA1), walks subscribers through the
//! authorization handshake, and maps the catalog and subscriber resources of the API onto typed
//! builders and functions. Responses come back as `serde_json::Value`, or any type you ask
//! `Netflix::execute_json` to deserialize into.
//!
//! # Getting started
//!
//! Everything starts with a [`Netflix`] client, built from the application name and consumer key
//! pair you registered with Netflix. Catalog calls only need the client:
//!
//! ```rust,no_run
//! # #[tokio::main]
//! # async fn main() -> netflix_api::error::Result<()> {
//! use netflix_api::{catalog, Netflix};
//!
//! let client = Netflix::new("My App", "consumer key", "consumer secret")?;
//! let results = catalog::search("the matrix").call(&client).await?;
//! # Ok(())
//! # }
//! ```
//!
//! Calls about a subscriber need their permission first. The [`auth`] module documentation walks
//! through getting an [`AccessToken`]; once you have one, a [`user::User`] session makes the calls:
//!
//! ```rust,no_run
//! # #[tokio::main]
//! # async fn main() -> netflix_api::error::Result<()> {
//! # let client = netflix_api::Netflix::new("app", "key", "secret")?;
//! use netflix_api::{AccessToken, user::User};
//!
//! let token = AccessToken::new("T1abc", "access key", "access secret")?;
//! let user = User::new(&client, token)?;
//! let details = user.details().await?;
//! # Ok(())
//! # }
//! ```
//!
//! # API versions
//!
//! Netflix runs two incompatible revisions of the API. A client is bound to the 2.0 API unless you
//! call `with_version(ApiVersion::V1)` when building it. The version decides the `v` parameter
//! sent with every request, which bulk catalog listings exist, and whether searches accept
//! filters and expansions.
//!
//! # Everything else
//!
//! Resources this crate doesn't wrap can be reached with `Netflix::execute`, or piece by piece with
//! the functions in the [`raw`] module.
//!
//! [`Netflix`]: struct.Netflix.html
//! [`auth`]: auth/index.html
//! [`AccessToken`]: auth/struct.AccessToken.html
//! [`user::User`]: user/struct.User.html
//! [`raw`]: raw/index.html

pub mod auth;
pub mod catalog;
mod client;
mod common;
pub mod error;
mod links;
pub mod raw;
pub mod user;

pub use crate::auth::{AccessToken, KeyPair, SignatureType};
pub use crate::client::{ApiVersion, Endpoints, Netflix};
