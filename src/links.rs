// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Fixed endpoints of the Netflix public API.
//!
//! Everything under `catalog` and `users` is a path relative to `BASE_URL`; the dispatcher
//! prepends whichever base URL the client was configured with.

pub const BASE_URL: &str = "http://api-public.netflix.com";

pub mod auth {
    pub const REQUEST_TOKEN: &str = "http://api-public.netflix.com/oauth/request_token";
    pub const ACCESS_TOKEN: &str = "http://api-public.netflix.com/oauth/access_token";
}

pub mod catalog {
    pub const TITLES: &str = "/catalog/titles";
    pub const AUTOCOMPLETE: &str = "/catalog/titles/autocomplete";
    pub const PEOPLE: &str = "/catalog/people";
    pub const TITLES_STEM: &str = "/catalog/titles/";
}

pub mod filters {
    pub const DISC: &str = "http://api-public.netflix.com/categories/title_formats/disc";
    pub const INSTANT: &str = "http://api-public.netflix.com/categories/title_formats/instant";
}

pub mod users {
    pub const STEM: &str = "/users/";
}
