use anyhow::Context;
use mealseek_client::SearchClient;
use mealseek_core::AppConfig;
use mealseek_session::{fetch_shop_detail, ErrorKind};

/// Prints one restaurant from the detail endpoint.
///
/// # Errors
///
/// Returns an error if the shop does not exist or the lookup fails.
pub(crate) async fn run_shop(config: &AppConfig, id: &str) -> anyhow::Result<()> {
    let client = SearchClient::from_config(config).context("failed to build search client")?;

    match fetch_shop_detail(&client, id).await {
        Ok(shop) => {
            println!("{}  {}", shop.id, shop.name);
            println!("  position: {:.5},{:.5}", shop.lat, shop.lng);
            for (key, value) in &shop.details {
                if let Some(text) = value.as_str() {
                    println!("  {key}: {text}");
                }
            }
            Ok(())
        }
        Err(ErrorKind::NotFound { shop_id }) => {
            anyhow::bail!("shop {shop_id} not found; run `mealseek-cli search` to find another")
        }
        Err(err) => Err(err.into()),
    }
}
