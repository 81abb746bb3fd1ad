// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Searching and browsing the Netflix catalog.
//!
//! None of these calls need a subscriber: they are signed with the application's consumer
//! identity alone. Searches have several optional parameters, so they start with a builder. Call
//! `search`, `autocomplete`, or `people` with your search term, add the options you want, then
//! hand your client to `call`.
//!
//! ```rust,no_run
//! # #[tokio::main]
//! # async fn main() -> netflix_api::error::Result<()> {
//! # let client = netflix_api::Netflix::new("app", "key", "secret")?;
//! use netflix_api::catalog::{self, Expand, Filter};
//!
//! let results = catalog::search("the matrix")
//!     .filter(Filter::Instant)
//!     .expand(Expand::Synopsis)
//!     .max_results(10)
//!     .call(&client)
//!     .await?;
//!
//! println!("{}", serde_json::to_string_pretty(&results)?);
//! # Ok(())
//! # }
//! ```
//!
//! Titles and people are identified by the absolute URLs the search results carry in their `id`
//! fields, and `title` and `person` take those URLs directly.

use std::fmt;
use std::str::FromStr;

use hyper::header::{HeaderValue, ACCEPT_ENCODING};
use hyper::Method;
use serde_json::Value;

use crate::common::*;
use crate::error::{self, Error};
use crate::links;
use crate::{ApiVersion, Netflix};

/// A part of a catalog record that can be requested inline with it, or fetched on its own with
/// `title`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Expand {
    Title,
    BoxArt,
    Synopsis,
    ShortSynopsis,
    FormatAvailability,
    ScreenFormats,
    Cast,
    Directors,
    LanguagesAndAudio,
    Awards,
    Similars,
    BonusMaterials,
    Seasons,
    Episodes,
    Discs,
}

impl Expand {
    /// Every expandable part, in the order the API documents them.
    pub const ALL: [Expand; 15] = [
        Expand::Title,
        Expand::BoxArt,
        Expand::Synopsis,
        Expand::ShortSynopsis,
        Expand::FormatAvailability,
        Expand::ScreenFormats,
        Expand::Cast,
        Expand::Directors,
        Expand::LanguagesAndAudio,
        Expand::Awards,
        Expand::Similars,
        Expand::BonusMaterials,
        Expand::Seasons,
        Expand::Episodes,
        Expand::Discs,
    ];

    /// The name of this part without its `@` marker, as used in a title's sub-resource path.
    pub fn name(self) -> &'static str {
        match self {
            Expand::Title => "title",
            Expand::BoxArt => "box_art",
            Expand::Synopsis => "synopsis",
            Expand::ShortSynopsis => "short_synopsis",
            Expand::FormatAvailability => "format_availability",
            Expand::ScreenFormats => "screen_formats",
            Expand::Cast => "cast",
            Expand::Directors => "directors",
            Expand::LanguagesAndAudio => "languages_and_audio",
            Expand::Awards => "awards",
            Expand::Similars => "similars",
            Expand::BonusMaterials => "bonus_materials",
            Expand::Seasons => "seasons",
            Expand::Episodes => "episodes",
            Expand::Discs => "discs",
        }
    }
}

/// Formats the part as an `expand` parameter value, e.g. `@box_art`.
impl fmt::Display for Expand {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "@{}", self.name())
    }
}

/// Parses a part name, with or without its leading `@`.
impl FromStr for Expand {
    type Err = Error;

    fn from_str(s: &str) -> error::Result<Expand> {
        let name = s.strip_prefix('@').unwrap_or(s);
        Expand::ALL
            .iter()
            .copied()
            .find(|e| e.name() == name)
            .ok_or_else(|| Error::InvalidParameter("expand", s.to_string()))
    }
}

/// Restricts a search to one way of watching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Filter {
    /// Titles available on disc.
    Disc,
    /// Titles available to stream instantly.
    Instant,
}

impl Filter {
    /// The category URL the API expects in the `filters` parameter.
    pub fn category_url(self) -> &'static str {
        match self {
            Filter::Disc => links::filters::DISC,
            Filter::Instant => links::filters::INSTANT,
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Filter::Disc => write!(f, "disc"),
            Filter::Instant => write!(f, "instant"),
        }
    }
}

impl FromStr for Filter {
    type Err = Error;

    fn from_str(s: &str) -> error::Result<Filter> {
        match s {
            "disc" => Ok(Filter::Disc),
            "instant" => Ok(Filter::Instant),
            _ => Err(Error::InvalidParameter("filter", s.to_string())),
        }
    }
}

/// Which bulk catalog listing `full_catalog` downloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogType {
    /// Index of every title. 1.0 API only.
    Index,
    /// Every title with its full record. 2.0 API only.
    Full,
    /// Titles available to stream.
    Streaming,
    /// Titles available on DVD.
    Dvd,
}

impl CatalogType {
    /// Whether the given API version serves this listing.
    pub fn is_supported_by(self, version: ApiVersion) -> bool {
        match (self, version) {
            (CatalogType::Index, ApiVersion::V2) => false,
            (CatalogType::Full, ApiVersion::V1) => false,
            _ => true,
        }
    }
}

impl fmt::Display for CatalogType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CatalogType::Index => write!(f, "index"),
            CatalogType::Full => write!(f, "full"),
            CatalogType::Streaming => write!(f, "streaming"),
            CatalogType::Dvd => write!(f, "dvd"),
        }
    }
}

impl FromStr for CatalogType {
    type Err = Error;

    fn from_str(s: &str) -> error::Result<CatalogType> {
        match s {
            "index" => Ok(CatalogType::Index),
            "full" => Ok(CatalogType::Full),
            "streaming" => Ok(CatalogType::Streaming),
            "dvd" => Ok(CatalogType::Dvd),
            _ => Err(Error::InvalidParameter("catalog type", s.to_string())),
        }
    }
}

pub(crate) fn join_expands(expand: &[Expand]) -> Option<String> {
    if expand.is_empty() {
        None
    } else {
        Some(
            expand
                .iter()
                .map(|e| e.to_string())
                .collect::<Vec<_>>()
                .join(","),
        )
    }
}

/// Begin setting up a title search with the given term.
///
/// The API matches the term against titles and synopses. Results start at index 0, 25 to a page,
/// unless set otherwise.
pub fn search(term: impl Into<CowStr>) -> SearchBuilder {
    SearchBuilder {
        term: term.into(),
        filter: None,
        expand: Vec::new(),
        start_index: 0,
        max_results: 25,
    }
}

/// Represents a title search before being sent.
#[must_use = "SearchBuilder is lazy and won't do anything unless `call`ed"]
#[derive(Debug, Clone)]
pub struct SearchBuilder {
    term: CowStr,
    filter: Option<Filter>,
    expand: Vec<Expand>,
    start_index: u32,
    max_results: u32,
}

impl SearchBuilder {
    /// Restricts results to disc or instant titles. 2.0 API only.
    pub fn filter(self, filter: Filter) -> Self {
        SearchBuilder {
            filter: Some(filter),
            ..self
        }
    }

    /// Includes the given part inline with each result. Can be called several times. 2.0 API
    /// only.
    pub fn expand(mut self, expand: Expand) -> Self {
        if !self.expand.contains(&expand) {
            self.expand.push(expand);
        }
        self
    }

    /// Sets the zero-based offset into the results.
    pub fn start_index(self, start_index: u32) -> Self {
        SearchBuilder {
            start_index,
            ..self
        }
    }

    /// Sets the number of results per page. Netflix caps this at 100.
    pub fn max_results(self, max_results: u32) -> Self {
        SearchBuilder {
            max_results,
            ..self
        }
    }

    fn params(&self, version: ApiVersion) -> error::Result<ParamList> {
        if version == ApiVersion::V1 {
            if let Some(filter) = self.filter {
                return Err(Error::InvalidParameter("filter", filter.to_string()));
            }
            if let Some(expand) = join_expands(&self.expand) {
                return Err(Error::InvalidParameter("expand", expand));
            }
        }

        Ok(ParamList::new()
            .add_param("term", self.term.clone())
            .add_opt_param("filters", self.filter.map(Filter::category_url))
            .add_opt_param("expand", join_expands(&self.expand))
            .add_paging(Some(self.start_index), Some(self.max_results)))
    }

    /// Performs the search and returns the page of results.
    pub async fn call(&self, client: &Netflix) -> error::Result<Value> {
        let params = self.params(client.version)?;
        client
            .execute(Method::GET, links::catalog::TITLES, params, Headers::new(), None)
            .await
    }
}

/// Begin setting up a search for titles whose short title starts with the given text.
///
/// The names this returns can be fed back into `search`. Only titles can be autocompleted, not
/// people.
pub fn autocomplete(term: impl Into<CowStr>) -> AutocompleteBuilder {
    AutocompleteBuilder {
        term: term.into(),
        filter: None,
        start_index: None,
        max_results: None,
    }
}

/// Represents an autocomplete search before being sent.
#[must_use = "AutocompleteBuilder is lazy and won't do anything unless `call`ed"]
#[derive(Debug, Clone)]
pub struct AutocompleteBuilder {
    term: CowStr,
    filter: Option<Filter>,
    start_index: Option<u32>,
    max_results: Option<u32>,
}

impl AutocompleteBuilder {
    /// Restricts results to disc or instant titles. 2.0 API only.
    pub fn filter(self, filter: Filter) -> Self {
        AutocompleteBuilder {
            filter: Some(filter),
            ..self
        }
    }

    /// Sets the zero-based offset into the results.
    pub fn start_index(self, start_index: u32) -> Self {
        AutocompleteBuilder {
            start_index: Some(start_index),
            ..self
        }
    }

    /// Sets the number of results per page.
    pub fn max_results(self, max_results: u32) -> Self {
        AutocompleteBuilder {
            max_results: Some(max_results),
            ..self
        }
    }

    fn params(&self, version: ApiVersion) -> error::Result<ParamList> {
        if let (ApiVersion::V1, Some(filter)) = (version, self.filter) {
            return Err(Error::InvalidParameter("filter", filter.to_string()));
        }

        Ok(ParamList::new()
            .add_param("term", self.term.clone())
            .add_opt_param("filters", self.filter.map(Filter::category_url))
            .add_paging(self.start_index, self.max_results))
    }

    /// Performs the search and returns the matching title names.
    pub async fn call(&self, client: &Netflix) -> error::Result<Value> {
        let params = self.params(client.version)?;
        client
            .execute(Method::GET, links::catalog::AUTOCOMPLETE, params, Headers::new(), None)
            .await
    }
}

/// Begin setting up a search for people whose name contains the given term.
pub fn people(term: impl Into<CowStr>) -> PeopleBuilder {
    PeopleBuilder {
        term: term.into(),
        start_index: None,
        max_results: None,
    }
}

/// Represents a people search before being sent.
#[must_use = "PeopleBuilder is lazy and won't do anything unless `call`ed"]
#[derive(Debug, Clone)]
pub struct PeopleBuilder {
    term: CowStr,
    start_index: Option<u32>,
    max_results: Option<u32>,
}

impl PeopleBuilder {
    /// Sets the zero-based offset into the results.
    pub fn start_index(self, start_index: u32) -> Self {
        PeopleBuilder {
            start_index: Some(start_index),
            ..self
        }
    }

    /// Sets the number of results per page.
    pub fn max_results(self, max_results: u32) -> Self {
        PeopleBuilder {
            max_results: Some(max_results),
            ..self
        }
    }

    /// Performs the search. The results carry title entries for the people found, along with
    /// links to each person's details.
    pub async fn call(&self, client: &Netflix) -> error::Result<Value> {
        let params = ParamList::new()
            .add_param("term", self.term.clone())
            .add_paging(self.start_index, self.max_results);
        client
            .execute(Method::GET, links::catalog::PEOPLE, params, Headers::new(), None)
            .await
    }
}

fn require_absolute(id: &str) -> error::Result<()> {
    if id.starts_with("http://") || id.starts_with("https://") {
        Ok(())
    } else {
        Err(Error::BadUrl(id.to_string()))
    }
}

/// Appends the part name to the path of a title URL. A query on the URL is kept after it.
fn title_url(id: &str, part: Option<Expand>) -> error::Result<String> {
    require_absolute(id)?;
    let part = match part {
        Some(part) => part,
        None => return Ok(id.to_string()),
    };

    let mut url = url::Url::parse(id).map_err(|_| Error::BadUrl(id.to_string()))?;
    url.path_segments_mut()
        .map_err(|_| Error::BadUrl(id.to_string()))?
        .pop_if_empty()
        .push(part.name());
    Ok(url.into())
}

/// Loads the record of one catalog title, or just one part of it.
///
/// `id` is the title's absolute URL, as found in the `id` field of search results (e.g.
/// `http://api.netflix.com/catalog/titles/movies/60000870`). With a `part`, only that part of the
/// record is fetched, from `<id>/<part>`.
pub async fn title(client: &Netflix, id: &str, part: Option<Expand>) -> error::Result<Value> {
    let url = title_url(id, part)?;
    client
        .execute(Method::GET, &url, ParamList::new(), Headers::new(), None)
        .await
}

/// Loads the details of one person: biography, featured titles, and filmography.
///
/// `id` is the person's absolute URL, as found in people search results.
pub async fn person(client: &Netflix, id: &str) -> error::Result<Value> {
    require_absolute(id)?;
    client
        .execute(Method::GET, id, ParamList::new(), Headers::new(), None)
        .await
}

/// Searches for the given title, and returns the first result whose title matches it exactly,
/// ignoring case.
///
/// Returns `None` if nothing in the first page of results matches. `filter` is only accepted on
/// the 2.0 API.
pub async fn movie_by_title(
    client: &Netflix,
    movie_title: &str,
    filter: Option<Filter>,
) -> error::Result<Option<Value>> {
    let mut query = search(movie_title.to_string());
    if let Some(filter) = filter {
        query = query.filter(filter);
    }
    let results = query.call(client).await?;

    let found = find_title(client.version, &results, movie_title);
    if let Some(movie) = &found {
        tracing::debug!(title = movie_title, id = ?movie.get("id"), "found movie");
    }
    Ok(found)
}

/// Picks the first record with the given title out of a page of search results.
///
/// The 1.0 API lists results under `catalog_titles.catalog_title`, each titled at
/// `title.regular`; the 2.0 API lists them under `catalog`, each titled at `title`.
fn find_title(version: ApiVersion, results: &Value, wanted: &str) -> Option<Value> {
    let list = match version {
        ApiVersion::V1 => results["catalog_titles"]["catalog_title"].as_array(),
        ApiVersion::V2 => results["catalog"].as_array(),
    }?;

    let wanted = wanted.to_lowercase();
    list.iter()
        .find(|movie| title_of(version, movie).map_or(false, |t| t.to_lowercase() == wanted))
        .cloned()
}

fn title_of(version: ApiVersion, movie: &Value) -> Option<&str> {
    match version {
        ApiVersion::V1 => movie["title"]["regular"].as_str(),
        ApiVersion::V2 => movie["title"]
            .as_str()
            .or_else(|| movie["title"]["regular"].as_str()),
    }
}

/// Downloads one of the bulk catalog listings.
///
/// These listings run to hundreds of megabytes, so the body is handed back as a stream rather
/// than read and parsed. The request asks for gzip and leaves out `output`, so what the server
/// returns is its native format, usually compressed; check `BodyStream::content_encoding`.
///
/// `catalog_type` has to be one the client's API version serves (`Index` on 1.0, `Full` on 2.0,
/// `Streaming` and `Dvd` on both); anything else fails before the request is sent.
pub async fn full_catalog(
    client: &Netflix,
    catalog_type: CatalogType,
) -> error::Result<BodyStream> {
    if !catalog_type.is_supported_by(client.version) {
        return Err(Error::InvalidParameter("catalog type", catalog_type.to_string()));
    }

    let path = format!("{}{}", links::catalog::TITLES_STEM, catalog_type);
    let params = ParamList::new().add_opt_param("output", None::<String>);
    let mut headers = Headers::new();
    headers.insert(ACCEPT_ENCODING, HeaderValue::from_static("gzip"));

    client
        .execute_stream(Method::GET, &path, params, headers, None)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::tests::load_file;

    fn search_results(version: ApiVersion) -> Value {
        let path = match version {
            ApiVersion::V1 => "sample_payloads/search_titles_v1.json",
            ApiVersion::V2 => "sample_payloads/search_titles_v2.json",
        };
        serde_json::from_str(&load_file(path)).unwrap()
    }

    #[test]
    fn title_part_goes_before_the_query() {
        let id = "http://api.netflix.com/catalog/titles/movies/60000870";
        assert_eq!(title_url(id, None).unwrap(), id);
        assert_eq!(
            title_url(&format!("{}/", id), Some(Expand::Synopsis)).unwrap(),
            format!("{}/synopsis", id)
        );
        assert_eq!(
            title_url(&format!("{}?country=us", id), Some(Expand::BoxArt)).unwrap(),
            format!("{}/box_art?country=us", id)
        );

        match title_url("/catalog/titles/movies/1", Some(Expand::Cast)) {
            Err(Error::BadUrl(url)) => assert_eq!(url, "/catalog/titles/movies/1"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn expand_parses_with_or_without_marker() {
        assert_eq!("@box_art".parse::<Expand>().unwrap(), Expand::BoxArt);
        assert_eq!("languages_and_audio".parse::<Expand>().unwrap(), Expand::LanguagesAndAudio);
        assert_eq!(Expand::ShortSynopsis.to_string(), "@short_synopsis");

        for expand in &Expand::ALL {
            assert_eq!(expand.to_string().parse::<Expand>().unwrap(), *expand);
        }

        match "@trailers".parse::<Expand>() {
            Err(Error::InvalidParameter(name, value)) => {
                assert_eq!(name, "expand");
                assert_eq!(value, "@trailers");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn filter_and_catalog_type_reject_unknown_values() {
        assert_eq!("instant".parse::<Filter>().unwrap(), Filter::Instant);
        assert!("streaming".parse::<Filter>().is_err());
        assert!("".parse::<Filter>().is_err());

        assert_eq!("dvd".parse::<CatalogType>().unwrap(), CatalogType::Dvd);
        assert!("DVD".parse::<CatalogType>().is_err());
    }

    #[test]
    fn catalog_type_depends_on_version() {
        assert!(CatalogType::Index.is_supported_by(ApiVersion::V1));
        assert!(!CatalogType::Index.is_supported_by(ApiVersion::V2));
        assert!(CatalogType::Full.is_supported_by(ApiVersion::V2));
        assert!(!CatalogType::Full.is_supported_by(ApiVersion::V1));
        assert!(CatalogType::Streaming.is_supported_by(ApiVersion::V1));
        assert!(CatalogType::Dvd.is_supported_by(ApiVersion::V2));
    }

    #[test]
    fn search_params_with_defaults() {
        let params = search("matrix").params(ApiVersion::V2).unwrap();
        assert_eq!(params.to_urlencoded(), "max_results=25&start_index=0&term=matrix");
        assert!(params.contains_key("filters"));
    }

    #[test]
    fn search_params_with_options() {
        let params = search("matrix")
            .filter(Filter::Disc)
            .expand(Expand::Cast)
            .expand(Expand::BoxArt)
            .expand(Expand::Cast)
            .max_results(5)
            .params(ApiVersion::V2)
            .unwrap();

        let present = params.present().collect::<std::collections::HashMap<_, _>>();
        assert_eq!(present["filters"], links::filters::DISC);
        assert_eq!(present["expand"], "@cast,@box_art");
        assert_eq!(present["max_results"], "5");
    }

    #[test]
    fn v1_search_rejects_filter_and_expand() {
        match search("matrix").filter(Filter::Instant).params(ApiVersion::V1) {
            Err(Error::InvalidParameter(name, _)) => assert_eq!(name, "filter"),
            other => panic!("unexpected result: {:?}", other),
        }
        match search("matrix").expand(Expand::Awards).params(ApiVersion::V1) {
            Err(Error::InvalidParameter(name, value)) => {
                assert_eq!(name, "expand");
                assert_eq!(value, "@awards");
            }
            other => panic!("unexpected result: {:?}", other),
        }
        assert!(autocomplete("mat").filter(Filter::Disc).params(ApiVersion::V1).is_err());
        assert!(search("matrix").params(ApiVersion::V1).is_ok());
    }

    #[test]
    fn autocomplete_params_leave_paging_out() {
        let params = autocomplete("frances").params(ApiVersion::V2).unwrap();
        assert_eq!(params.to_urlencoded(), "term=frances");
    }

    #[test]
    fn find_title_v1() {
        let results = search_results(ApiVersion::V1);
        let movie = find_title(ApiVersion::V1, &results, "the matrix").unwrap();
        assert_eq!(
            movie["id"],
            "http://api-public.netflix.com/catalog/titles/movies/20557937"
        );
        assert!(find_title(ApiVersion::V1, &results, "The Matrix Rebooted").is_none());
        assert!(find_title(ApiVersion::V2, &results, "The Matrix").is_none());
    }

    #[test]
    fn find_title_v2() {
        let results = search_results(ApiVersion::V2);
        let movie = find_title(ApiVersion::V2, &results, "THE MATRIX RELOADED").unwrap();
        assert_eq!(
            movie["id"],
            "http://api-public.netflix.com/catalog/titles/movies/60027695"
        );
        assert!(find_title(ApiVersion::V2, &results, "Matrix").is_none());
    }
}
