// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Set of structs and methods that act as a sort of internal prelude.
//!
//! The elements available in this module and its children are fairly basic building blocks that
//! the other modules all glob-import to make available as a common language.
//!
//! # Module contents
//!
//! ## Type Aliases
//!
//! * `hyper::header::HeaderMap<hyper::header::HeaderValue>` (re-exported as the alias `Headers`)
//! * `Cow<'static, str>` (as `CowStr`)
//!
//! ## `ParamList`
//!
//! `ParamList` is the collection of parameters to a given web call. Unlike a plain map of strings,
//! every key can also be held with an *absent* value: the caller named the parameter but has
//! nothing to send for it. The dispatcher treats an absent key as "the caller already decided
//! about this one" when filling in defaults, then drops every absent key before it signs the
//! request, so absent parameters never reach the wire.
//!
//! ## `percent_encode`
//!
//! The OAuth signature needs RFC 3986 encoding, which is stricter than what the `url` crate uses
//! for form bodies, so the request-building code goes through this one.
//!
//! ## `Response` handling
//!
//! The `response` child module holds the transport and the functions every web call goes through:
//! the ones that send a request, classify the status, and hand back either the body or a
//! `RemoteError`.

use std::borrow::Cow;
use std::collections::HashMap;

use chrono::{DateTime, Utc};
use hyper::header::{HeaderMap, HeaderValue};
use percent_encoding::{utf8_percent_encode, AsciiSet, PercentEncode, NON_ALPHANUMERIC};

mod response;

pub use crate::common::response::*;

// n.b. this type alias is re-exported in the `raw` module - these docs are public!
/// A set of headers sent with a request or returned with a response.
pub type Headers = HeaderMap<HeaderValue>;
pub type CowStr = Cow<'static, str>;

// n.b. this type is re-exported in the `raw` module - these docs are public!
/// Represents a list of parameters to a Netflix API call.
///
/// This type is a wrapper around a `HashMap<Cow<'static, str>, Option<Cow<'static, str>>>`. A
/// `None` value marks the parameter as *absent*: it is never transmitted, but its presence stops
/// the dispatcher from filling in a default for that key. All the functions that add parameters
/// accept `impl Into<Cow<'static, str>>`, so either a string literal or an owned `String` may be
/// used.
///
/// ```
/// use netflix_api::raw::ParamList;
///
/// let params = ParamList::new()
///     .add_param("term", "matrix")
///     .add_opt_param("max_results", None::<String>);
///
/// assert_eq!(params.to_urlencoded(), "term=matrix");
/// ```
#[derive(
    Debug, Clone, Default, PartialEq, derive_more::Deref, derive_more::DerefMut, derive_more::From,
)]
pub struct ParamList(HashMap<CowStr, Option<CowStr>>);

impl ParamList {
    /// Creates a new, empty `ParamList`.
    pub fn new() -> Self {
        Self(HashMap::new())
    }

    /// Adds the given key/value parameter to this `ParamList`.
    pub fn add_param(mut self, key: impl Into<CowStr>, value: impl Into<CowStr>) -> Self {
        self.insert(key.into(), Some(value.into()));
        self
    }

    /// Adds the given key to this `ParamList`, with the given value if it is `Some`, or as an
    /// absent parameter if it is `None`.
    pub fn add_opt_param(
        mut self,
        key: impl Into<CowStr>,
        value: Option<impl Into<CowStr>>,
    ) -> Self {
        self.insert(key.into(), value.map(Into::into));
        self
    }

    /// Adds the given key/value to this `ParamList` by mutating it in place, rather than consuming
    /// it as in `add_param`.
    pub fn add_param_ref(&mut self, key: impl Into<CowStr>, value: impl Into<CowStr>) {
        self.0.insert(key.into(), Some(value.into()));
    }

    /// Adds the `start_index` and `max_results` paging parameters.
    pub fn add_paging(self, start_index: Option<u32>, max_results: Option<u32>) -> Self {
        self.add_opt_param("start_index", start_index.map_string())
            .add_opt_param("max_results", max_results.map_string())
    }

    /// Adds the `updated_min` filter as a Unix timestamp.
    pub fn add_updated_min(self, updated_min: Option<DateTime<Utc>>) -> Self {
        self.add_opt_param("updated_min", updated_min.map(|t| t.timestamp().to_string()))
    }

    /// Merge the parameters from the given `ParamList` into this one.
    pub(crate) fn combine(&mut self, other: ParamList) {
        self.0.extend(other.0);
    }

    /// Removes every absent parameter.
    pub(crate) fn drop_absent(&mut self) {
        self.0.retain(|_, v| v.is_some());
    }

    /// Iterates over the parameters that have a value.
    pub fn present(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0
            .iter()
            .filter_map(|(k, v)| v.as_ref().map(|v| (k.as_ref(), v.as_ref())))
    }

    /// Renders this `ParamList` as an `application/x-www-form-urlencoded` string.
    ///
    /// The key/value pairs are printed as `key1=value1&key2=value2`, sorted by key, with all keys
    /// and values percent-encoded. Absent parameters are skipped.
    pub fn to_urlencoded(&self) -> String {
        let mut pairs = self
            .present()
            .map(|(k, v)| format!("{}={}", percent_encode(k), percent_encode(v)))
            .collect::<Vec<_>>();
        pairs.sort();
        pairs.join("&")
    }
}

// Helper trait to stringify the contents of an Option
pub(crate) trait MapString {
    fn map_string(&self) -> Option<String>;
}

impl<T: std::fmt::Display> MapString for Option<T> {
    fn map_string(&self) -> Option<String> {
        self.as_ref().map(|v| v.to_string())
    }
}

/// Set of bytes left alone by `percent_encode`: ASCII letters and digits, plus `-`, `.`, `_`,
/// and `~`.
const ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Percent-encodes the given string as required by the OAuth 1.0a signature rules.
///
/// The scheme is RFC 3986, Section 2.1: every *byte* that is not an ASCII number or letter, or
/// one of `-`, `.`, `_`, or `~`, is replaced with a percent sign (`%`) and the byte value in
/// uppercase hexadecimal. Notably, spaces become `%20` and never `+`.
pub fn percent_encode(src: &str) -> PercentEncode<'_> {
    utf8_percent_encode(src, ENCODE_SET)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Read;

    pub(crate) fn load_file(path: &str) -> String {
        let mut file = File::open(path).unwrap();
        let mut content = String::new();
        file.read_to_string(&mut content).unwrap();
        content
    }

    #[test]
    fn encode_reserved() {
        assert_eq!(
            percent_encode("Tom & Jerry + Friends").to_string(),
            "Tom%20%26%20Jerry%20%2B%20Friends"
        );
        assert_eq!(percent_encode("a-b.c_d~e").to_string(), "a-b.c_d~e");
        assert_eq!(percent_encode("ñ").to_string(), "%C3%B1");
    }

    #[test]
    fn absent_params_are_skipped() {
        let mut params = ParamList::new()
            .add_param("term", "the matrix")
            .add_opt_param("max_results", None::<String>)
            .add_paging(Some(0), None);

        assert!(params.contains_key("max_results"));
        assert_eq!(params.to_urlencoded(), "start_index=0&term=the%20matrix");

        params.drop_absent();
        assert!(!params.contains_key("max_results"));
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn updated_min_is_unix_seconds() {
        use chrono::TimeZone;

        let updated = Utc.timestamp_opt(1219775019, 0).unwrap();
        let params = ParamList::new().add_updated_min(Some(updated));
        assert_eq!(params.to_urlencoded(), "updated_min=1219775019");
    }
}
