//! `/stats` operation.

use reqwest::Method;
use tokio_util::sync::CancellationToken;

use crate::TrimtoolClient;
use crate::error::ApiError;
use crate::model::Stats;

use super::QueryParams;

impl TrimtoolClient {
    /// Aggregate pipeline counters.
    pub async fn stats(&self, cancel: &CancellationToken) -> Result<Stats, ApiError> {
        self.send_expecting::<(), Stats>(Method::GET, "/stats", QueryParams::new(), None, cancel)
            .await
    }
}
