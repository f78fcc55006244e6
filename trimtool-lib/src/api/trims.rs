//! `/trims` operations.

use reqwest::Method;
use tokio_util::sync::CancellationToken;

use crate::TrimtoolClient;
use crate::error::ApiError;
use crate::model::{NewTrim, Trim, TrimQuery};

use super::QueryParams;

impl TrimQuery {
    pub(crate) fn to_params(&self) -> QueryParams {
        QueryParams::new()
            .text("make", &self.make)
            .text("model", &self.model)
            .text("trim_name", &self.trim_name)
            .optional("skip", self.skip)
            .optional("limit", self.limit)
    }
}

impl TrimtoolClient {
    /// Lists canonical trims matching the query.
    pub async fn trims(
        &self,
        query: &TrimQuery,
        cancel: &CancellationToken,
    ) -> Result<Vec<Trim>, ApiError> {
        let trims = self
            .send::<(), Vec<Trim>>(Method::GET, "/trims", query.to_params(), None, cancel)
            .await?;
        Ok(trims.unwrap_or_default())
    }

    /// Creates a canonical trim.
    pub async fn create_trim(
        &self,
        trim: &NewTrim,
        cancel: &CancellationToken,
    ) -> Result<Trim, ApiError> {
        self.send_expecting(Method::POST, "/trims", QueryParams::new(), Some(trim), cancel)
            .await
    }
}
