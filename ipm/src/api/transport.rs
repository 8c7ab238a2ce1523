use async_trait::async_trait;
use reqwest::Method;

use super::error::ApiError;

/// Performs one HTTP exchange against the API.
///
/// `path` is relative to the API base (`/ndus/...`) and may carry a query.
/// Implementations handle authentication and status interpretation, and must
/// be safe to share between concurrently running operations.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(
        &self,
        method: Method,
        path: &str,
        body: Option<Vec<u8>>,
    ) -> Result<Vec<u8>, ApiError>;
}
