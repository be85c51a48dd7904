pub mod app_config;
pub mod catalog;
mod config;
pub mod criteria;
pub mod pagination;
pub mod query;
pub mod shop;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use criteria::{parse, ParsedQuery, SearchCriteria};
pub use pagination::{
    compute_display_range, compute_total_pages, page_window, DisplayRange, PageItem, PAGE_SIZE,
};
pub use query::with_page;
pub use shop::Shop;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for environment variable {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

/// Raised when a URL query cannot produce a searchable [`SearchCriteria`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CriteriaError {
    #[error("no criteria")]
    NoCriteria,
}
