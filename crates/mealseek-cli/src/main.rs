mod search;
mod shop;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::search::{CriteriaArgs, SessionArgs};

#[derive(Debug, Parser)]
#[command(name = "mealseek-cli")]
#[command(about = "Restaurant search from the command line")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Search restaurants by keyword, genre, radius, or position
    Search {
        #[command(flatten)]
        criteria: CriteriaArgs,
        /// Page to open first
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[command(flatten)]
        session: SessionArgs,
    },
    /// Run a search from a raw results-page query (e.g. "keyword=ramen&page=2")
    Query {
        query: String,
        #[command(flatten)]
        session: SessionArgs,
    },
    /// Show one restaurant by id
    Shop { id: String },
    /// List the genre and radius codes the search understands
    Codes,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    if matches!(cli.command, Commands::Codes) {
        search::print_codes();
        return Ok(());
    }

    dotenvy::dotenv().ok();
    let config = mealseek_core::load_app_config_from_env()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
    tracing::debug!(env = %config.env, base_url = %config.api_base_url, "configuration loaded");

    match cli.command {
        Commands::Search {
            criteria,
            page,
            session,
        } => search::run_search(&config, &criteria.to_query(page), &session).await,
        Commands::Query { query, session } => search::run_search(&config, &query, &session).await,
        Commands::Shop { id } => shop::run_shop(&config, &id).await,
        Commands::Codes => Ok(()),
    }
}

#[cfg(test)]
mod tests;
