//! Search criteria derived from the results page's URL query string.
//!
//! The URL is the single source of truth for what the user searched for, so
//! [`parse`] is the only way a [`SearchCriteria`] enters a session. Parsing is
//! forgiving about malformed numbers (they are treated as absent) but strict
//! about the overall shape: a query with nothing to search on is rejected with
//! [`CriteriaError::NoCriteria`] and must never reach the network.
//!
//! ## Recognised keys
//!
//! | key | example | notes |
//! |-----|---------|-------|
//! | `keyword` | `ramen` | trimmed; empty means absent |
//! | `genre` | `G001,G013` | comma-separated, de-duplicated, order kept |
//! | `radius` | `3` | trimmed; empty means absent |
//! | `lat`, `lng` | `35.6812` | finite decimal degrees only |
//! | `page` | `2` | integer ≥ 1, defaults to `1` |

use std::collections::HashSet;

use serde::Serialize;
use url::form_urlencoded;

use crate::catalog;
use crate::CriteriaError;

/// Normalised search inputs for one search session.
///
/// Equality treats `genre_codes` as a set: `G001,G013` and `G013,G001` are
/// the same search, while the stored order is kept for display.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchCriteria {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyword: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub genre_codes: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub radius_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lng: Option<f64>,
}

/// Result of parsing a URL query: the criteria plus the requested page.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedQuery {
    pub criteria: SearchCriteria,
    pub page: u32,
}

impl PartialEq for SearchCriteria {
    #[allow(clippy::float_cmp)]
    fn eq(&self, other: &Self) -> bool {
        self.keyword == other.keyword
            && self.radius_code == other.radius_code
            && self.lat == other.lat
            && self.lng == other.lng
            && same_code_set(&self.genre_codes, &other.genre_codes)
    }
}

fn same_code_set(a: &[String], b: &[String]) -> bool {
    let a: HashSet<&str> = a.iter().map(String::as_str).collect();
    let b: HashSet<&str> = b.iter().map(String::as_str).collect();
    a == b
}

impl SearchCriteria {
    /// Both coordinates, when both are present.
    #[must_use]
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        self.lat.zip(self.lng)
    }

    /// Returns `true` when there is at least one thing to search on.
    #[must_use]
    pub fn is_searchable(&self) -> bool {
        self.keyword.as_deref().is_some_and(|k| !k.is_empty())
            || !self.genre_codes.is_empty()
            || self.radius_code.is_some()
            || self.coordinates().is_some()
    }

    /// Human-readable one-line description of the search.
    ///
    /// Unknown genre or radius codes are left out of the description; they
    /// are still sent to the API as-is.
    #[must_use]
    pub fn summary(&self) -> String {
        let mut parts = Vec::new();
        if let Some(keyword) = &self.keyword {
            parts.push(format!("keyword \"{keyword}\""));
        }
        let genres: Vec<&str> = self
            .genre_codes
            .iter()
            .filter_map(|code| catalog::genre_label(code))
            .collect();
        if !genres.is_empty() {
            parts.push(format!("genre {}", genres.join(", ")));
        }
        if let Some(label) = self.radius_code.as_deref().and_then(catalog::radius_label) {
            parts.push(label);
        }

        if parts.is_empty() {
            if self.coordinates().is_some() {
                return "near current location".to_owned();
            }
            return "all restaurants".to_owned();
        }
        parts.join(" / ")
    }

    /// Builds the canonical results-page query for these criteria at `page`.
    #[must_use]
    pub fn to_query(&self, page: u32) -> String {
        let mut out = form_urlencoded::Serializer::new(String::new());
        if let Some(keyword) = &self.keyword {
            out.append_pair("keyword", keyword);
        }
        if !self.genre_codes.is_empty() {
            out.append_pair("genre", &self.genre_codes.join(","));
        }
        if let Some(radius) = &self.radius_code {
            out.append_pair("radius", radius);
        }
        if let Some((lat, lng)) = self.coordinates() {
            out.append_pair("lat", &lat.to_string());
            out.append_pair("lng", &lng.to_string());
        }
        out.append_pair("page", &page.to_string());
        out.finish()
    }
}

/// Parses a URL query string (with or without the leading `?`).
///
/// When a key appears more than once the first occurrence wins.
///
/// # Errors
///
/// Returns [`CriteriaError::NoCriteria`] when none of keyword, genre, radius,
/// or a complete lat/lng pair is present.
pub fn parse(query: &str) -> Result<ParsedQuery, CriteriaError> {
    let query = query.strip_prefix('?').unwrap_or(query);

    let mut keyword = None;
    let mut genre = None;
    let mut radius = None;
    let mut lat = None;
    let mut lng = None;
    let mut page = None;

    for (key, value) in form_urlencoded::parse(query.as_bytes()) {
        let slot = match key.as_ref() {
            "keyword" => &mut keyword,
            "genre" => &mut genre,
            "radius" => &mut radius,
            "lat" => &mut lat,
            "lng" => &mut lng,
            "page" => &mut page,
            _ => continue,
        };
        if slot.is_none() {
            *slot = Some(value.into_owned());
        }
    }

    let criteria = SearchCriteria {
        keyword: keyword.as_deref().and_then(non_empty),
        genre_codes: genre.as_deref().map(split_codes).unwrap_or_default(),
        radius_code: radius.as_deref().and_then(non_empty),
        lat: lat.as_deref().and_then(parse_coordinate),
        lng: lng.as_deref().and_then(parse_coordinate),
    };

    if !criteria.is_searchable() {
        return Err(CriteriaError::NoCriteria);
    }

    let page = page.as_deref().and_then(parse_page).unwrap_or(1);
    Ok(ParsedQuery { criteria, page })
}

fn non_empty(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}

fn split_codes(raw: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    raw.split(',')
        .map(str::trim)
        .filter(|code| !code.is_empty() && seen.insert(*code))
        .map(str::to_owned)
        .collect()
}

fn parse_coordinate(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

fn parse_page(raw: &str) -> Option<u32> {
    raw.trim().parse::<u32>().ok().filter(|p| *p >= 1)
}

#[cfg(test)]
#[path = "criteria_test.rs"]
mod tests;
