//! `search` and `query` handlers: drive a headless session and print what
//! a results page would show.

use std::sync::Arc;

use anyhow::Context;
use clap::Args;
use mealseek_client::SearchClient;
use mealseek_core::catalog::{self, GENRES};
use mealseek_core::{AppConfig, PageItem, SearchCriteria};
use mealseek_session::{ErrorKind, PagingMode, SessionHandle, SessionState};

/// Criteria flags, mirroring the results-page URL parameters.
#[derive(Debug, Args)]
pub struct CriteriaArgs {
    /// Free-text search term
    #[arg(long)]
    pub keyword: Option<String>,
    /// Genre codes, comma-separated (e.g. G001,G013)
    #[arg(long, value_delimiter = ',')]
    pub genre: Vec<String>,
    /// Search radius code, 1-5 (see `codes`)
    #[arg(long)]
    pub radius: Option<String>,
    /// Latitude of the search centre
    #[arg(long, requires = "lng", allow_hyphen_values = true)]
    pub lat: Option<f64>,
    /// Longitude of the search centre
    #[arg(long, requires = "lat", allow_hyphen_values = true)]
    pub lng: Option<f64>,
}

impl CriteriaArgs {
    /// The results-page query these flags describe, opened at `page`.
    pub(crate) fn to_query(&self, page: u32) -> String {
        SearchCriteria {
            keyword: self.keyword.clone(),
            genre_codes: self.genre.clone(),
            radius_code: self.radius.clone(),
            lat: self.lat,
            lng: self.lng,
        }
        .to_query(page)
    }
}

const PAGE_BUTTONS: u32 = 7;

/// How many pages to walk and how to show them.
#[derive(Debug, Args)]
pub struct SessionArgs {
    /// Number of pages to load, following "next page" from the first one
    #[arg(long, default_value_t = 1)]
    pub pages: u32,
    /// Accumulate pages into one list ("load more") instead of one list per page
    #[arg(long)]
    pub append: bool,
}

impl SessionArgs {
    fn mode(&self) -> PagingMode {
        if self.append {
            PagingMode::Append
        } else {
            PagingMode::Paginated
        }
    }
}

/// Opens `query` in a fresh session and pages forward up to `args.pages`.
///
/// # Errors
///
/// Returns an error if the client cannot be built, the query has no search
/// criteria, or a page fails to load.
pub(crate) async fn run_search(
    config: &AppConfig,
    query: &str,
    args: &SessionArgs,
) -> anyhow::Result<()> {
    let client = SearchClient::from_config(config).context("failed to build search client")?;
    let mode = args.mode();
    let session = SessionHandle::spawn(Arc::new(client), mode);

    session.navigate(query).await?;
    let mut state = session.wait_idle().await?;
    if mode == PagingMode::Paginated {
        print_page(&state);
    }

    let mut loaded = 1;
    while loaded < args.pages && state.error.is_none() && state.has_more() {
        session.load_more().await?;
        state = session.wait_idle().await?;
        loaded += 1;
        if mode == PagingMode::Paginated {
            print_page(&state);
        }
    }
    if mode == PagingMode::Append {
        print_page(&state);
    }
    session.shutdown().await;

    match state.error {
        None => Ok(()),
        Some(ErrorKind::Validation) => anyhow::bail!(
            "no search criteria given; pass --keyword, --genre, --radius, or --lat/--lng"
        ),
        Some(err) => Err(err).with_context(|| format!("search failed on page {}", state.page)),
    }
}

fn print_page(state: &SessionState) {
    if let Some(criteria) = &state.criteria {
        println!("{}", criteria.summary());
    }
    match state.mode {
        PagingMode::Paginated => println!(
            "page {}/{}  {}",
            state.page,
            state.total_pages(),
            state.display_range()
        ),
        PagingMode::Append => println!(
            "showing {} of {}",
            state.results.len(),
            state.total_results
        ),
    }
    let buttons: Vec<String> = state
        .page_window(PAGE_BUTTONS)
        .into_iter()
        .map(|item| match item {
            PageItem::Page(p) if p == state.page => format!("[{p}]"),
            PageItem::Page(p) => p.to_string(),
            PageItem::Ellipsis => "..".to_owned(),
        })
        .collect();
    if state.mode == PagingMode::Paginated && !buttons.is_empty() {
        println!("pages {}", buttons.join(" "));
    }
    if let Some(center) = state.map_center {
        println!("map {:.5},{:.5} zoom {}", center.lat, center.lng, center.zoom);
    }
    for shop in &state.results {
        let address = shop.detail_str("address").unwrap_or("");
        println!("  {:<10} {}  {}", shop.id, shop.name, address);
    }
    if state.has_more() {
        println!("(more results available)");
    }
}

/// Prints the genre and radius catalogue.
pub(crate) fn print_codes() {
    println!("genres:");
    for genre in GENRES {
        println!("  {}  {}", genre.code, genre.label);
    }
    println!("radius:");
    for code in ["1", "2", "3", "4", "5"] {
        if let Some(label) = catalog::radius_label(code) {
            println!("  {code}  {label}");
        }
    }
}
