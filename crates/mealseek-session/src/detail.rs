use mealseek_client::SearchClient;
use mealseek_core::Shop;

use crate::error::ErrorKind;

/// Loads one shop for the detail view.
///
/// # Errors
///
/// - [`ErrorKind::Validation`] for a blank id (nothing is sent).
/// - [`ErrorKind::NotFound`] when the backend has no such shop.
/// - [`ErrorKind::Network`] for any other failure.
pub async fn fetch_shop_detail(client: &SearchClient, shop_id: &str) -> Result<Shop, ErrorKind> {
    let shop_id = shop_id.trim();
    if shop_id.is_empty() {
        return Err(ErrorKind::Validation);
    }
    client.get_shop(shop_id).await.map_err(|err| {
        tracing::warn!(shop_id, error = %err, "shop detail fetch failed");
        ErrorKind::from_detail(&err)
    })
}
