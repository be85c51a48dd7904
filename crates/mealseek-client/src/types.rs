//! Wire types for the search backend.
//!
//! The backend wraps the upstream gourmet API and re-shapes its response to
//! `{ shops, results_available, results_returned, results_start }`. A body
//! without `shops` (absent or `null`) is not an empty result set: it means
//! the backend broke its contract, and the client reports it as an error.

use mealseek_core::{SearchCriteria, Shop};
use serde::{Deserialize, Serialize};

/// Body of `POST /hp/search`.
///
/// The criteria fields are flattened alongside the offset window, giving
/// `{ keyword?, genreCodes?, radiusCode?, lat?, lng?, start, count }`.
#[derive(Debug, Serialize)]
pub struct SearchRequest<'a> {
    #[serde(flatten)]
    pub criteria: &'a SearchCriteria,
    pub start: u32,
    pub count: u32,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchResponse {
    #[serde(default)]
    pub shops: Option<Vec<Shop>>,
    #[serde(default)]
    pub results_available: u32,
    #[serde(default)]
    pub results_returned: u32,
    #[serde(default)]
    pub results_start: u32,
}

/// Response of `GET /hp/shops/{id}`: `{ "shop": { ... } }`.
#[derive(Debug, Deserialize)]
pub(crate) struct ShopResponse {
    pub shop: Shop,
}

/// One page of search results.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchPage {
    pub shops: Vec<Shop>,
    /// Total matches across all pages (`results_available`).
    pub total_results: u32,
    pub results_returned: u32,
    pub results_start: u32,
}
