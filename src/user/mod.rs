// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Calls about one subscriber: their details, queues, rental history, and ratings.
//!
//! Everything here goes through a `User` session, which pairs a [`Netflix`] client with the
//! [`AccessToken`] a subscriber granted it. Every request a session sends is signed with both.
//!
//! [`Netflix`]: ../struct.Netflix.html
//! [`AccessToken`]: ../auth/struct.AccessToken.html
//!
//! ```rust,no_run
//! # #[tokio::main]
//! # async fn main() -> netflix_api::error::Result<()> {
//! # let client = netflix_api::Netflix::new("app", "key", "secret")?;
//! use netflix_api::auth::AccessToken;
//! use netflix_api::user::{QueueKind, SortOrder, User};
//!
//! let token = AccessToken::new("T1abc", "access key", "access secret")?;
//! let user = User::new(&client, token)?;
//!
//! let queue = user
//!     .queue(QueueKind::Instant)
//!     .sort(SortOrder::DateAdded)
//!     .max_results(10)
//!     .call()
//!     .await?;
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use hyper::Method;
use serde_json::Value;

use crate::auth::{AccessToken, SignatureType};
use crate::catalog::{join_expands, Expand};
use crate::common::*;
use crate::error::{self, Error};
use crate::links;
use crate::Netflix;

/// How the entries of a queue are ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// The order the subscriber arranged the queue in. This is the default.
    QueueSequence,
    /// Most recently added first.
    DateAdded,
    /// By title.
    Alphabetical,
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SortOrder::QueueSequence => write!(f, "queue_sequence"),
            SortOrder::DateAdded => write!(f, "date_added"),
            SortOrder::Alphabetical => write!(f, "alphabetical"),
        }
    }
}

impl FromStr for SortOrder {
    type Err = Error;

    fn from_str(s: &str) -> error::Result<SortOrder> {
        match s {
            "queue_sequence" => Ok(SortOrder::QueueSequence),
            "date_added" => Ok(SortOrder::DateAdded),
            "alphabetical" => Ok(SortOrder::Alphabetical),
            _ => Err(Error::InvalidParameter("sort", s.to_string())),
        }
    }
}

/// Narrows the rental history to one kind of event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RentalHistoryType {
    /// Discs sent out to the subscriber.
    Shipped,
    /// Discs the subscriber sent back.
    Returned,
    /// Titles the subscriber streamed.
    Watched,
}

impl fmt::Display for RentalHistoryType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RentalHistoryType::Shipped => write!(f, "shipped"),
            RentalHistoryType::Returned => write!(f, "returned"),
            RentalHistoryType::Watched => write!(f, "watched"),
        }
    }
}

impl FromStr for RentalHistoryType {
    type Err = Error;

    fn from_str(s: &str) -> error::Result<RentalHistoryType> {
        match s {
            "shipped" => Ok(RentalHistoryType::Shipped),
            "returned" => Ok(RentalHistoryType::Returned),
            "watched" => Ok(RentalHistoryType::Watched),
            _ => Err(Error::InvalidParameter("rental history type", s.to_string())),
        }
    }
}

/// One of a subscriber's queues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueKind {
    /// Every queue the subscriber has.
    All,
    /// The instant-watch queue.
    Instant,
    /// The disc queue.
    Disc,
    /// Entries of the instant-watch queue that can be watched now.
    InstantAvailable,
    /// Entries of the instant-watch queue saved for when they become available.
    InstantSaved,
}

impl QueueKind {
    fn path(self) -> &'static str {
        match self {
            QueueKind::All => "queues",
            QueueKind::Instant => "queues/instant",
            QueueKind::Disc => "queues/disc",
            QueueKind::InstantAvailable => "queues/instant/available",
            QueueKind::InstantSaved => "queues/instant/saved",
        }
    }

    /// Whether single entries of this queue can be addressed by id.
    fn has_entries(self) -> bool {
        match self {
            QueueKind::InstantAvailable | QueueKind::InstantSaved => true,
            _ => false,
        }
    }
}

impl fmt::Display for QueueKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.path())
    }
}

/// Which ratings `User::ratings` looks up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RatingKind {
    /// The subscriber's own rating where there is one, and the predicted rating otherwise.
    Any,
    /// Only ratings the subscriber gave.
    Actual,
    /// Only the ratings Netflix predicts the subscriber would give.
    Predicted,
}

impl RatingKind {
    fn path(self) -> &'static str {
        match self {
            RatingKind::Any => "ratings/title",
            RatingKind::Actual => "ratings/title/actual",
            RatingKind::Predicted => "ratings/title/predicted",
        }
    }
}

/// A rating a subscriber gives a title.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rating {
    /// One to five stars.
    Stars(u8),
    /// The subscriber doesn't want this title recommended.
    NotInterested,
    /// Clears a previous rating.
    NoOpinion,
}

impl Rating {
    fn validated(self) -> error::Result<Rating> {
        match self {
            Rating::Stars(n) if n < 1 || n > 5 => {
                Err(Error::InvalidParameter("rating", n.to_string()))
            }
            rating => Ok(rating),
        }
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Rating::Stars(n) => write!(f, "{}", n),
            Rating::NotInterested => write!(f, "not_interested"),
            Rating::NoOpinion => write!(f, "no_opinion"),
        }
    }
}

impl FromStr for Rating {
    type Err = Error;

    fn from_str(s: &str) -> error::Result<Rating> {
        match s {
            "not_interested" => Ok(Rating::NotInterested),
            "no_opinion" => Ok(Rating::NoOpinion),
            _ => s
                .parse::<u8>()
                .map_err(|_| Error::InvalidParameter("rating", s.to_string()))
                .and_then(|n| Rating::Stars(n).validated()),
        }
    }
}

/// A session acting on behalf of one subscriber.
///
/// A session owns a clone of the client it was made from, so several sessions for different
/// subscribers can run side by side, sharing one connection pool. Sessions sign their requests in
/// the query string unless told otherwise with `with_signature_type`.
#[derive(Debug, Clone)]
pub struct User {
    client: Netflix,
    token: AccessToken,
}

impl User {
    /// Starts a session for the subscriber the given access token belongs to.
    ///
    /// Returns `Config` if the token's user id, key, or secret is empty.
    pub fn new(client: &Netflix, token: AccessToken) -> error::Result<User> {
        let token = token.validated()?;
        Ok(User {
            client: client.clone().with_signature_type(SignatureType::Query),
            token,
        })
    }

    /// Sets where this session puts the OAuth parameters of its requests.
    pub fn with_signature_type(self, signature_type: SignatureType) -> Self {
        User {
            client: self.client.with_signature_type(signature_type),
            ..self
        }
    }

    /// The subscriber's id.
    pub fn id(&self) -> &str {
        &self.token.user_id
    }

    /// The access token this session signs with.
    pub fn token(&self) -> &AccessToken {
        &self.token
    }

    fn path(&self, rest: &str) -> String {
        if rest.is_empty() {
            format!("{}{}", links::users::STEM, self.token.user_id)
        } else {
            format!("{}{}/{}", links::users::STEM, self.token.user_id, rest)
        }
    }

    /// The path of one item of a collection, with `id` escaped as a single path segment.
    fn item_path(&self, collection: &str, id: &str) -> String {
        self.path(&format!("{}/{}", collection, percent_encode(id)))
    }

    async fn send(
        &self,
        method: Method,
        path_or_url: &str,
        params: ParamList,
    ) -> error::Result<Value> {
        self.client
            .execute(method, path_or_url, params, Headers::new(), Some(&self.token))
            .await
    }

    /// Loads the subscriber's account details.
    pub async fn details(&self) -> error::Result<Value> {
        self.send(Method::GET, &self.path(""), ParamList::new()).await
    }

    /// Lists the feeds available for the subscriber.
    pub async fn feeds(&self) -> error::Result<Value> {
        self.send(Method::GET, &self.path("feeds"), ParamList::new()).await
    }

    /// Loads how the subscriber relates to each of the given titles: whether they're queued,
    /// rented, or can be added.
    ///
    /// `title_refs` are catalog title URLs.
    pub async fn title_states(&self, title_refs: &[&str]) -> error::Result<Value> {
        let params = ParamList::new().add_opt_param("title_refs", join_refs(title_refs));
        self.send(Method::GET, &self.path("title_states"), params).await
    }

    /// Begin setting up a request for the contents of one of the subscriber's queues.
    pub fn queue(&self, kind: QueueKind) -> QueueBuilder<'_> {
        QueueBuilder {
            user: self,
            kind,
            entry_id: None,
            expand: Vec::new(),
            sort: None,
            start_index: None,
            max_results: None,
            updated_min: None,
        }
    }

    /// Adds a title to the instant-watch queue, or moves it if it's already there.
    ///
    /// Netflix files the title under the available or the saved queue. `position` starts at 1.
    /// `etag` is the queue's ETag from the last time it was read; the call is refused if the queue
    /// changed since.
    pub async fn add_to_queue(
        &self,
        title_ref: &str,
        position: Option<u32>,
        etag: &str,
    ) -> error::Result<Value> {
        let params = ParamList::new()
            .add_param("title_ref", title_ref.to_string())
            .add_opt_param("position", position.map_string())
            .add_param("etag", etag.to_string());
        self.send(Method::POST, &self.path(QueueKind::Instant.path()), params)
            .await
    }

    /// Deletes one entry from the instant-watch queue.
    ///
    /// `kind` has to be `InstantAvailable` or `InstantSaved`; anything else fails before the
    /// request is sent.
    pub async fn remove_from_queue(&self, kind: QueueKind, entry_id: &str) -> error::Result<Value> {
        if !kind.has_entries() {
            return Err(Error::InvalidParameter("queue", kind.to_string()));
        }
        let path = self.item_path(kind.path(), entry_id);
        self.send(Method::DELETE, &path, ParamList::new()).await
    }

    /// Begin setting up a request for the subscriber's rental history.
    pub fn rental_history(&self) -> RentalHistoryBuilder<'_> {
        RentalHistoryBuilder {
            user: self,
            kind: None,
            start_index: None,
            max_results: None,
            updated_min: None,
        }
    }

    /// Looks up the subscriber's ratings for the given titles.
    pub async fn ratings(&self, title_refs: &[&str], kind: RatingKind) -> error::Result<Value> {
        let params = ParamList::new().add_opt_param("title_refs", join_refs(title_refs));
        self.send(Method::GET, &self.path(kind.path()), params).await
    }

    /// Rates a title the subscriber hasn't rated yet.
    pub async fn add_rating(&self, title_ref: &str, rating: Rating) -> error::Result<Value> {
        let rating = rating.validated()?;
        let params = ParamList::new()
            .add_param("title_ref", title_ref.to_string())
            .add_param("rating", rating.to_string());
        self.send(Method::POST, &self.path(RatingKind::Actual.path()), params)
            .await
    }

    /// Loads one rating the subscriber gave, by its id.
    pub async fn rating(&self, rating_id: &str) -> error::Result<Value> {
        let path = self.item_path(RatingKind::Actual.path(), rating_id);
        self.send(Method::GET, &path, ParamList::new()).await
    }

    /// Changes one rating the subscriber gave, by its id.
    pub async fn update_rating(&self, rating_id: &str, rating: Rating) -> error::Result<Value> {
        let rating = rating.validated()?;
        let path = self.item_path(RatingKind::Actual.path(), rating_id);
        let params = ParamList::new().add_param("rating", rating.to_string());
        self.send(Method::PUT, &path, params).await
    }

    /// Loads the titles Netflix recommends to the subscriber.
    pub async fn recommendations(
        &self,
        start_index: Option<u32>,
        max_results: Option<u32>,
    ) -> error::Result<Value> {
        let params = ParamList::new().add_paging(start_index, max_results);
        self.send(Method::GET, &self.path("recommendations"), params).await
    }

    /// Loads any resource linked from an earlier response, signed as this subscriber.
    ///
    /// `url` is used as given; query parameters on it are kept.
    pub async fn resource(&self, url: &str, params: ParamList) -> error::Result<Value> {
        self.send(Method::GET, url, params).await
    }
}

fn join_refs(title_refs: &[&str]) -> Option<String> {
    if title_refs.is_empty() {
        None
    } else {
        Some(title_refs.join(","))
    }
}

/// Represents a queue request before being sent.
#[must_use = "QueueBuilder is lazy and won't do anything unless `call`ed"]
pub struct QueueBuilder<'a> {
    user: &'a User,
    kind: QueueKind,
    entry_id: Option<CowStr>,
    expand: Vec<Expand>,
    sort: Option<SortOrder>,
    start_index: Option<u32>,
    max_results: Option<u32>,
    updated_min: Option<DateTime<Utc>>,
}

impl<'a> QueueBuilder<'a> {
    /// Loads a single entry instead of the whole queue. Only the `InstantAvailable` and
    /// `InstantSaved` queues have addressable entries.
    pub fn entry(self, entry_id: impl Into<CowStr>) -> Self {
        QueueBuilder {
            entry_id: Some(entry_id.into()),
            ..self
        }
    }

    /// Includes the given part inline with each entry. Can be called several times.
    pub fn expand(mut self, expand: Expand) -> Self {
        if !self.expand.contains(&expand) {
            self.expand.push(expand);
        }
        self
    }

    /// Sets the order of the entries.
    pub fn sort(self, sort: SortOrder) -> Self {
        QueueBuilder {
            sort: Some(sort),
            ..self
        }
    }

    /// Sets the zero-based offset into the entries.
    pub fn start_index(self, start_index: u32) -> Self {
        QueueBuilder {
            start_index: Some(start_index),
            ..self
        }
    }

    /// Sets the number of entries per page.
    pub fn max_results(self, max_results: u32) -> Self {
        QueueBuilder {
            max_results: Some(max_results),
            ..self
        }
    }

    /// Only returns entries changed after the given time.
    pub fn updated_min(self, updated_min: DateTime<Utc>) -> Self {
        QueueBuilder {
            updated_min: Some(updated_min),
            ..self
        }
    }

    fn path_and_params(&self) -> error::Result<(String, ParamList)> {
        let path = match &self.entry_id {
            Some(entry) if self.kind.has_entries() => {
                self.user.item_path(self.kind.path(), entry)
            }
            Some(entry) => return Err(Error::InvalidParameter("queue entry", entry.to_string())),
            None => self.user.path(self.kind.path()),
        };

        let params = ParamList::new()
            .add_opt_param("expand", join_expands(&self.expand))
            .add_opt_param("sort", self.sort.map_string())
            .add_paging(self.start_index, self.max_results)
            .add_updated_min(self.updated_min);

        Ok((path, params))
    }

    /// Loads the queue, or the single entry.
    pub async fn call(self) -> error::Result<Value> {
        let (path, params) = self.path_and_params()?;
        self.user.send(Method::GET, &path, params).await
    }
}

/// Represents a rental history request before being sent.
#[must_use = "RentalHistoryBuilder is lazy and won't do anything unless `call`ed"]
pub struct RentalHistoryBuilder<'a> {
    user: &'a User,
    kind: Option<RentalHistoryType>,
    start_index: Option<u32>,
    max_results: Option<u32>,
    updated_min: Option<DateTime<Utc>>,
}

impl<'a> RentalHistoryBuilder<'a> {
    /// Only lists events of the given kind.
    pub fn kind(self, kind: RentalHistoryType) -> Self {
        RentalHistoryBuilder {
            kind: Some(kind),
            ..self
        }
    }

    /// Sets the zero-based offset into the history.
    pub fn start_index(self, start_index: u32) -> Self {
        RentalHistoryBuilder {
            start_index: Some(start_index),
            ..self
        }
    }

    /// Sets the number of events per page.
    pub fn max_results(self, max_results: u32) -> Self {
        RentalHistoryBuilder {
            max_results: Some(max_results),
            ..self
        }
    }

    /// Only returns events after the given time.
    pub fn updated_min(self, updated_min: DateTime<Utc>) -> Self {
        RentalHistoryBuilder {
            updated_min: Some(updated_min),
            ..self
        }
    }

    fn path_and_params(&self) -> (String, ParamList) {
        let path = match self.kind {
            Some(kind) => self.user.path(&format!("rental_history/{}", kind)),
            None => self.user.path("rental_history"),
        };
        let params = ParamList::new()
            .add_paging(self.start_index, self.max_results)
            .add_updated_min(self.updated_min);
        (path, params)
    }

    /// Loads the rental history.
    pub async fn call(self) -> error::Result<Value> {
        let (path, params) = self.path_and_params();
        self.user.send(Method::GET, &path, params).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn user() -> User {
        let client = Netflix::new("Queue Manager", "consumer-key", "consumer-secret").unwrap();
        let token = AccessToken::new("T1abc", "access-key", "access-secret").unwrap();
        User::new(&client, token).unwrap()
    }

    #[test]
    fn new_rejects_blank_token() {
        let client = Netflix::new("app", "key", "secret").unwrap();
        let token = AccessToken {
            user_id: "T1abc".to_string(),
            token: crate::auth::KeyPair::new("key", "  "),
        };
        match User::new(&client, token) {
            Err(Error::Config(field)) => assert_eq!(field, "access token secret"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn enumerations_parse() {
        assert_eq!("date_added".parse::<SortOrder>().unwrap(), SortOrder::DateAdded);
        assert_eq!(SortOrder::QueueSequence.to_string(), "queue_sequence");
        assert!("newest".parse::<SortOrder>().is_err());

        assert_eq!("watched".parse::<RentalHistoryType>().unwrap(), RentalHistoryType::Watched);
        assert!("lost".parse::<RentalHistoryType>().is_err());

        assert_eq!("4".parse::<Rating>().unwrap(), Rating::Stars(4));
        assert_eq!("no_opinion".parse::<Rating>().unwrap(), Rating::NoOpinion);
        assert!("0".parse::<Rating>().is_err());
        assert!("6".parse::<Rating>().is_err());
        assert!("great".parse::<Rating>().is_err());
    }

    #[test]
    fn queue_paths() {
        let user = user();

        let (path, params) = user.queue(QueueKind::All).path_and_params().unwrap();
        assert_eq!(path, "/users/T1abc/queues");
        assert_eq!(params.to_urlencoded(), "");

        let (path, _) = user
            .queue(QueueKind::InstantSaved)
            .entry("60002291")
            .path_and_params()
            .unwrap();
        assert_eq!(path, "/users/T1abc/queues/instant/saved/60002291");

        let (path, _) = user
            .queue(QueueKind::InstantAvailable)
            .entry("7?v=1.0")
            .path_and_params()
            .unwrap();
        assert_eq!(path, "/users/T1abc/queues/instant/available/7%3Fv%3D1.0");

        match user.queue(QueueKind::Disc).entry("1").path_and_params() {
            Err(Error::InvalidParameter(name, _)) => assert_eq!(name, "queue entry"),
            other => panic!("unexpected result: {:?}", other.map(|(p, _)| p)),
        }
    }

    #[test]
    fn queue_params() {
        let user = user();
        let (_, params) = user
            .queue(QueueKind::Instant)
            .sort(SortOrder::Alphabetical)
            .expand(Expand::BoxArt)
            .start_index(10)
            .updated_min(Utc.timestamp_opt(1219775019, 0).unwrap())
            .path_and_params()
            .unwrap();

        assert_eq!(
            params.to_urlencoded(),
            "expand=%40box_art&sort=alphabetical&start_index=10&updated_min=1219775019"
        );
        assert!(params.contains_key("max_results"));
    }

    #[test]
    fn rental_history_paths() {
        let user = user();

        let (path, _) = user.rental_history().path_and_params();
        assert_eq!(path, "/users/T1abc/rental_history");

        let (path, params) = user
            .rental_history()
            .kind(RentalHistoryType::Returned)
            .max_results(5)
            .path_and_params();
        assert_eq!(path, "/users/T1abc/rental_history/returned");
        assert_eq!(params.to_urlencoded(), "max_results=5");
    }

    #[test]
    fn session_signs_in_query() {
        let user = user();
        let req = user
            .client
            .prepare(
                Method::GET,
                &user.path(""),
                ParamList::new(),
                Headers::new(),
                Some(&user.token),
            )
            .unwrap();

        assert!(req.headers().get(hyper::header::AUTHORIZATION).is_none());
        assert!(req.uri().query().unwrap().contains("oauth_token=access-key"));

        let user = user.with_signature_type(SignatureType::Header);
        let req = user
            .client
            .prepare(
                Method::GET,
                &user.path(""),
                ParamList::new(),
                Headers::new(),
                Some(&user.token),
            )
            .unwrap();
        assert!(req.headers().get(hyper::header::AUTHORIZATION).is_some());
    }

    #[test]
    fn item_ids_stay_in_their_segment() {
        let user = user();
        assert_eq!(
            user.item_path(RatingKind::Actual.path(), "12/../../x"),
            "/users/T1abc/ratings/title/actual/12%2F..%2F..%2Fx"
        );

        let req = user
            .client
            .prepare(
                Method::DELETE,
                &user.item_path(QueueKind::InstantSaved.path(), "9?output=xml#top"),
                ParamList::new(),
                Headers::new(),
                Some(&user.token),
            )
            .unwrap();
        assert_eq!(
            req.uri().path(),
            "/users/T1abc/queues/instant/saved/9%3Foutput%3Dxml%23top"
        );
        assert!(!req.uri().query().unwrap_or("").contains("output=xml"));
    }

    #[test]
    fn joined_refs() {
        assert_eq!(join_refs(&[]), None);
        assert_eq!(
            join_refs(&["http://a/1", "http://a/2"]).as_deref(),
            Some("http://a/1,http://a/2")
        );
    }
}
