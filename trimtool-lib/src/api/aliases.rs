//! `/aliases` operations.

use reqwest::Method;
use tokio_util::sync::CancellationToken;

use crate::TrimtoolClient;
use crate::error::ApiError;
use crate::model::{Alias, AliasQuery, NewAlias};

use super::QueryParams;
use super::query::segment;

impl AliasQuery {
    pub(crate) fn to_params(&self) -> QueryParams {
        QueryParams::new()
            .text("make", &self.make)
            .text("model", &self.model)
    }
}

impl TrimtoolClient {
    /// Lists aliases, optionally narrowed to a make/model.
    pub async fn aliases(
        &self,
        query: &AliasQuery,
        cancel: &CancellationToken,
    ) -> Result<Vec<Alias>, ApiError> {
        let aliases = self
            .send::<(), Vec<Alias>>(Method::GET, "/aliases", query.to_params(), None, cancel)
            .await?;
        Ok(aliases.unwrap_or_default())
    }

    /// Maps a new alias onto a canonical trim.
    pub async fn create_alias(
        &self,
        alias: &NewAlias,
        cancel: &CancellationToken,
    ) -> Result<Alias, ApiError> {
        self.send_expecting(Method::POST, "/aliases", QueryParams::new(), Some(alias), cancel)
            .await
    }

    /// Deletes an alias by id.
    pub async fn delete_alias(&self, id: i64, cancel: &CancellationToken) -> Result<(), ApiError> {
        let path = format!("/aliases/{}", segment(&id.to_string()));
        self.send::<(), serde_json::Value>(Method::DELETE, &path, QueryParams::new(), None, cancel)
            .await?;
        Ok(())
    }
}
