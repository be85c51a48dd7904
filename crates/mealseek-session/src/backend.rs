//! The search call the orchestrator drives, behind a trait so sessions can
//! run against the real HTTP client or an in-memory double.

use async_trait::async_trait;
use mealseek_client::{ClientError, SearchClient, SearchPage};
use mealseek_core::SearchCriteria;

#[async_trait]
pub trait SearchBackend: Send + Sync + 'static {
    async fn search(&self, criteria: &SearchCriteria, page: u32)
        -> Result<SearchPage, ClientError>;
}

#[async_trait]
impl SearchBackend for SearchClient {
    async fn search(
        &self,
        criteria: &SearchCriteria,
        page: u32,
    ) -> Result<SearchPage, ClientError> {
        SearchClient::search(self, criteria, page).await
    }
}
