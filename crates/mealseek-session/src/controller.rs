//! The search-result session state machine.
//!
//! ```text
//!   Idle ──url──▶ Fetching ──ok──▶ Loaded
//!                   ▲   └──err──▶ Failed
//!                   └── new criteria / page (from Loaded or Failed)
//! ```
//!
//! Events arrive one at a time: an observed URL ([`SessionController::observe_url`]),
//! a settled fetch ([`SessionController::on_settled`]), or a user page request
//! ([`SessionController::request_page`]). Page requests are written to the
//! URL through the [`Navigator`] and only take effect when that URL is
//! observed, so the URL and the displayed page cannot drift apart.

use std::sync::Arc;

use mealseek_client::{ClientError, SearchPage};
use mealseek_core::{
    compute_display_range, compute_total_pages, page_window, parse, with_page, CriteriaError,
    DisplayRange, PageItem, ParsedQuery, SearchCriteria, Shop, PAGE_SIZE,
};
use tokio::sync::mpsc;

use crate::backend::SearchBackend;
use crate::error::{ErrorKind, PageChangeError};
use crate::navigator::Navigator;
use crate::orchestrator::{FetchOrchestrator, FetchToken, PageRequest, Settled};

const FIRST_RESULT_ZOOM: u8 = 15;
const SEARCH_CENTER_ZOOM: u8 = 14;

/// How a newly loaded page is combined with what is already shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PagingMode {
    /// Each page replaces the list.
    #[default]
    Paginated,
    /// "Load more": the next page is appended to the pages already shown.
    Append,
}

/// Lifecycle phase of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Fetching(FetchToken),
    Loaded,
    Failed,
}

/// Where the map should centre, handed to the map view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapCenter {
    pub lat: f64,
    pub lng: f64,
    pub zoom: u8,
}

/// The view model: everything the results page renders from.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    pub criteria: Option<SearchCriteria>,
    pub page: u32,
    pub results: Vec<Shop>,
    pub total_results: u32,
    pub is_loading: bool,
    pub is_initial_loading: bool,
    pub error: Option<ErrorKind>,
    pub map_center: Option<MapCenter>,
    pub mode: PagingMode,
}

impl SessionState {
    fn new(mode: PagingMode) -> Self {
        Self {
            criteria: None,
            page: 1,
            results: Vec::new(),
            total_results: 0,
            is_loading: false,
            is_initial_loading: false,
            error: None,
            map_center: None,
            mode,
        }
    }

    #[must_use]
    pub fn total_pages(&self) -> u32 {
        compute_total_pages(self.total_results, PAGE_SIZE)
    }

    #[must_use]
    pub fn display_range(&self) -> DisplayRange {
        compute_display_range(self.page, PAGE_SIZE, self.total_results)
    }

    #[must_use]
    pub fn page_window(&self, max_visible: u32) -> Vec<PageItem> {
        page_window(self.page, self.total_pages(), max_visible)
    }

    /// Whether a "load more" / "next page" affordance should be offered.
    #[must_use]
    pub fn has_more(&self) -> bool {
        if self.is_loading || self.criteria.is_none() {
            return false;
        }
        match self.mode {
            PagingMode::Paginated => self.page < self.total_pages(),
            PagingMode::Append => {
                u32::try_from(self.results.len()).is_ok_and(|n| n < self.total_results)
            }
        }
    }
}

pub struct SessionController<B, N> {
    orchestrator: FetchOrchestrator<B>,
    navigator: N,
    phase: Phase,
    state: SessionState,
    /// Last observed query, the base for page write-back.
    query: Option<String>,
    /// A fetch for the current criteria has succeeded.
    has_loaded: bool,
    /// Highest page whose results are currently in `state.results`.
    shown_through: Option<u32>,
}

impl<B: SearchBackend, N: Navigator> SessionController<B, N> {
    /// Creates an idle session. Settled fetches arrive on the returned
    /// receiver and must be fed back through [`Self::on_settled`].
    pub fn new(
        backend: Arc<B>,
        navigator: N,
        mode: PagingMode,
    ) -> (Self, mpsc::UnboundedReceiver<Settled>) {
        let (orchestrator, settled_rx) = FetchOrchestrator::new(backend);
        let controller = Self {
            orchestrator,
            navigator,
            phase: Phase::Idle,
            state: SessionState::new(mode),
            query: None,
            has_loaded: false,
            shown_through: None,
        };
        (controller, settled_rx)
    }

    #[must_use]
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub fn navigator(&self) -> &N {
        &self.navigator
    }

    /// Reacts to the URL query having changed (or having been loaded).
    pub fn observe_url(&mut self, query: &str) {
        let query = query.strip_prefix('?').unwrap_or(query);
        let ParsedQuery { criteria, page } = match parse(query) {
            Ok(parsed) => parsed,
            Err(err) => {
                self.fail_validation(&err);
                return;
            }
        };
        self.query = Some(query.to_owned());

        let same_criteria = self.state.criteria.as_ref() == Some(&criteria);
        if !same_criteria {
            self.start_search(criteria, page);
        } else if page != self.state.page {
            self.change_page(page);
        } else if self.phase == Phase::Failed
            && matches!(self.state.error, Some(ErrorKind::Network { .. }))
        {
            self.refetch_failed(criteria, page);
        } else {
            tracing::debug!(page, "url observed without changes");
        }
    }

    /// Applies a settled fetch if it is still the newest one.
    ///
    /// Returns `true` when the state changed.
    pub fn on_settled(&mut self, settled: Settled) -> bool {
        let Some(accepted) = self.orchestrator.accept(settled) else {
            return false;
        };
        match accepted.outcome {
            Ok(page) => self.apply_page(accepted.request.page, page),
            Err(err) => self.apply_failure(accepted.token, &err),
        }
        true
    }

    /// Asks to show `page` by writing it into the URL.
    ///
    /// # Errors
    ///
    /// - [`PageChangeError::NoActiveSearch`] before any valid search.
    /// - [`PageChangeError::OutOfRange`] outside `1..=total_pages`.
    /// - [`PageChangeError::AlreadyOnPage`] for the current page.
    pub fn request_page(&mut self, page: u32) -> Result<(), PageChangeError> {
        let Some(query) = self.query.as_deref().filter(|_| self.state.criteria.is_some()) else {
            return Err(PageChangeError::NoActiveSearch);
        };
        let total_pages = self.state.total_pages();
        if page < 1 || page > total_pages {
            return Err(PageChangeError::OutOfRange {
                requested: page,
                total_pages,
            });
        }
        if page == self.state.page {
            return Err(PageChangeError::AlreadyOnPage(page));
        }

        let next = with_page(query, page);
        tracing::debug!(page, query = %next, "writing page change to url");
        self.navigator.push(&next);
        Ok(())
    }

    /// Asks for the page after the current one.
    ///
    /// # Errors
    ///
    /// Same as [`Self::request_page`].
    pub fn load_more(&mut self) -> Result<(), PageChangeError> {
        self.request_page(self.state.page.saturating_add(1))
    }

    /// Re-issues the current request with a fresh call, even if one is
    /// outstanding. Returns `None` when there is nothing to retry.
    pub fn retry(&mut self) -> Option<FetchToken> {
        let criteria = self.state.criteria.clone()?;
        self.state.is_loading = true;
        self.state.is_initial_loading = !self.has_loaded;
        self.state.error = None;
        let token = self.orchestrator.resubmit(PageRequest {
            criteria,
            page: self.state.page,
        });
        tracing::debug!(%token, page = self.state.page, "retrying search");
        self.phase = Phase::Fetching(token);
        Some(token)
    }

    /// New criteria: start over on page 1 with an empty list.
    ///
    /// When no criteria were committed yet the URL's page is honoured, so a
    /// shared link lands where it points. Any later criteria change restarts
    /// at page 1 and rewrites the URL to match.
    fn start_search(&mut self, criteria: SearchCriteria, url_page: u32) {
        let page = if self.state.criteria.is_none() {
            url_page
        } else {
            1
        };
        if page != url_page {
            if let Some(query) = &self.query {
                let canonical = with_page(query, page);
                self.navigator.replace(&canonical);
                self.query = Some(canonical);
            }
        }

        tracing::debug!(summary = %criteria.summary(), page, "criteria changed");
        self.state.criteria = Some(criteria.clone());
        self.state.page = page;
        self.state.results.clear();
        self.state.total_results = 0;
        self.state.map_center = None;
        self.state.error = None;
        self.state.is_loading = true;
        self.state.is_initial_loading = true;
        self.has_loaded = false;
        self.shown_through = None;

        let token = self.orchestrator.submit(PageRequest { criteria, page });
        self.phase = Phase::Fetching(token);
    }

    /// Same criteria, different page: keep the current list on screen.
    fn change_page(&mut self, page: u32) {
        let Some(criteria) = self.state.criteria.clone() else {
            return;
        };
        tracing::debug!(from = self.state.page, to = page, "page changed");
        self.state.page = page;
        self.state.error = None;
        self.state.is_loading = true;

        let token = self.orchestrator.submit(PageRequest { criteria, page });
        self.phase = Phase::Fetching(token);
    }

    /// Same URL after its fetch failed: the user is asking again. Nothing is
    /// outstanding, so this issues exactly one new call.
    fn refetch_failed(&mut self, criteria: SearchCriteria, page: u32) {
        tracing::debug!(page, "failed url observed again; fetching");
        self.state.error = None;
        self.state.is_loading = true;
        self.state.is_initial_loading = !self.has_loaded;

        let token = self.orchestrator.submit(PageRequest { criteria, page });
        self.phase = Phase::Fetching(token);
    }

    fn apply_page(&mut self, page: u32, result: SearchPage) {
        let append = self.state.mode == PagingMode::Append
            && page > 1
            && self.shown_through == Some(page - 1);
        if append {
            self.state.results.extend(result.shops);
        } else {
            self.state.results = result.shops;
        }
        tracing::debug!(
            page,
            shown = self.state.results.len(),
            total = result.total_results,
            append,
            "results loaded"
        );

        self.state.total_results = result.total_results;
        self.state.is_loading = false;
        self.state.is_initial_loading = false;
        self.state.error = None;
        self.update_map_center(page);

        self.shown_through = Some(page);
        self.has_loaded = true;
        self.phase = Phase::Loaded;
    }

    /// Keeps whatever was already shown: a failed page after a good one
    /// leaves the good one visible. The first fetch of a search has nothing
    /// to keep, so its list stays empty and the error stands alone.
    fn apply_failure(&mut self, token: FetchToken, err: &ClientError) {
        tracing::warn!(%token, page = self.state.page, error = %err, "search fetch failed");
        if !self.has_loaded {
            self.state.results.clear();
        }
        self.state.error = Some(ErrorKind::from_search(err));
        self.state.is_loading = false;
        self.state.is_initial_loading = false;
        self.phase = Phase::Failed;
    }

    fn fail_validation(&mut self, err: &CriteriaError) {
        tracing::debug!(error = %err, "url has no searchable criteria");
        self.orchestrator.supersede();
        self.query = None;
        self.state.criteria = None;
        self.state.page = 1;
        self.state.results.clear();
        self.state.total_results = 0;
        self.state.map_center = None;
        self.state.error = Some(ErrorKind::Validation);
        self.state.is_loading = false;
        self.state.is_initial_loading = false;
        self.has_loaded = false;
        self.shown_through = None;
        self.phase = Phase::Failed;
    }

    fn update_map_center(&mut self, page: u32) {
        let first_result = self.state.results.first().filter(|_| page == 1);
        if let Some(shop) = first_result {
            self.state.map_center = Some(MapCenter {
                lat: shop.lat,
                lng: shop.lng,
                zoom: FIRST_RESULT_ZOOM,
            });
        } else if let Some((lat, lng)) = self
            .state
            .criteria
            .as_ref()
            .and_then(SearchCriteria::coordinates)
        {
            self.state.map_center = Some(MapCenter {
                lat,
                lng,
                zoom: SEARCH_CENTER_ZOOM,
            });
        }
    }
}

#[cfg(test)]
#[path = "controller_test.rs"]
mod tests;
