//! `/listings` and `/process-listings` operations.

use reqwest::Method;
use serde::Serialize;
use serde_json::json;
use tokio_util::sync::CancellationToken;

use crate::TrimtoolClient;
use crate::error::ApiError;
use crate::model::{
    Assignment, CandidateList, Listing, ListingDetails, ProcessSummary, ProcessedQuery,
    UnprocessedQuery,
};

use super::QueryParams;
use super::query::segment;

/// Batch size used when the requested process limit is not positive.
pub const DEFAULT_PROCESS_LIMIT: u32 = 500;

/// Number of candidates requested when none is given.
pub const DEFAULT_TOP_N: u32 = 10;

#[derive(Serialize)]
struct ProcessRequest {
    limit: u32,
}

impl ProcessedQuery {
    pub(crate) fn to_params(&self) -> QueryParams {
        QueryParams::new()
            .text("make", &self.make)
            .text("model", &self.model)
            .optional("assignment_method", self.method.as_param())
            .number("min_conf", self.min_conf())
            .number("max_conf", self.max_conf())
            .number("limit", self.limit)
    }
}

fn listing_path(ad_id: &str, action: &str) -> String {
    format!("/listings/{}/{}", segment(ad_id), action)
}

impl TrimtoolClient {
    /// Runs the normalization pipeline over up to `limit` unprocessed listings.
    pub async fn process_listings(
        &self,
        limit: u32,
        cancel: &CancellationToken,
    ) -> Result<ProcessSummary, ApiError> {
        let limit = if limit == 0 { DEFAULT_PROCESS_LIMIT } else { limit };
        let body = ProcessRequest { limit };
        self.send_expecting(Method::POST, "/process-listings", QueryParams::new(), Some(&body), cancel)
            .await
    }

    /// Listings that are new or flagged for manual review.
    pub async fn unprocessed_listings(
        &self,
        query: &UnprocessedQuery,
        cancel: &CancellationToken,
    ) -> Result<Vec<Listing>, ApiError> {
        let params = QueryParams::new().number("limit", query.limit);
        let listings = self
            .send::<(), Vec<Listing>>(Method::GET, "/listings/unprocessed", params, None, cancel)
            .await?;
        Ok(listings.unwrap_or_default())
    }

    /// Previously processed listings matching the filters.
    pub async fn processed_listings(
        &self,
        query: &ProcessedQuery,
        cancel: &CancellationToken,
    ) -> Result<Vec<Listing>, ApiError> {
        let listings = self
            .send::<(), Vec<Listing>>(
                Method::GET,
                "/listings/processed",
                query.to_params(),
                None,
                cancel,
            )
            .await?;
        Ok(listings.unwrap_or_default())
    }

    /// Full listing record plus scraped website details.
    pub async fn listing_details(
        &self,
        ad_id: &str,
        cancel: &CancellationToken,
    ) -> Result<ListingDetails, ApiError> {
        let path = listing_path(ad_id, "details");
        self.send_expecting::<(), ListingDetails>(Method::GET, &path, QueryParams::new(), None, cancel)
            .await
    }

    /// Binds a listing to a canonical trim or a normalized trim text.
    pub async fn assign_trim(
        &self,
        ad_id: &str,
        assignment: &Assignment,
        cancel: &CancellationToken,
    ) -> Result<(), ApiError> {
        let path = listing_path(ad_id, "assign-trim");
        self.send::<_, serde_json::Value>(Method::POST, &path, QueryParams::new(), Some(assignment), cancel)
            .await?;
        Ok(())
    }

    /// Re-runs matching for a single listing.
    pub async fn reprocess_listing(
        &self,
        ad_id: &str,
        cancel: &CancellationToken,
    ) -> Result<(), ApiError> {
        let path = listing_path(ad_id, "reprocess");
        self.send::<(), serde_json::Value>(Method::POST, &path, QueryParams::new(), None, cancel)
            .await?;
        Ok(())
    }

    /// Top-N scored trim suggestions for a listing's raw trim.
    pub async fn listing_candidates(
        &self,
        ad_id: &str,
        top_n: Option<u32>,
        cancel: &CancellationToken,
    ) -> Result<CandidateList, ApiError> {
        let path = listing_path(ad_id, "candidates");
        let params = QueryParams::new().number("top_n", top_n.unwrap_or(DEFAULT_TOP_N));
        let list = self
            .send::<(), CandidateList>(Method::GET, &path, params, None, cancel)
            .await?;
        Ok(list.unwrap_or_default())
    }

    /// Clears the needs-review flag.
    pub async fn mark_reviewed(&self, ad_id: &str, cancel: &CancellationToken) -> Result<(), ApiError> {
        let path = listing_path(ad_id, "reviewed");
        let body = json!({});
        self.send::<_, serde_json::Value>(Method::POST, &path, QueryParams::new(), Some(&body), cancel)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AssignmentMethod;

    #[test]
    fn test_processed_params_skip_blank_filters() {
        let q = ProcessedQuery::default();
        assert_eq!(q.to_params().to_query_string(), "?min_conf=0&max_conf=1&limit=50");
    }

    #[test]
    fn test_processed_params_include_method() {
        let mut q = ProcessedQuery::default();
        q.make = "Toyota".into();
        q.method = AssignmentMethod::Fuzzy;
        q.set_min_conf(0.5);
        assert_eq!(
            q.to_params().to_query_string(),
            "?make=Toyota&assignment_method=fuzzy&min_conf=0.5&max_conf=1&limit=50"
        );
    }

    #[test]
    fn test_listing_path_encodes_id() {
        assert_eq!(listing_path("a b", "details"), "/listings/a%20b/details");
    }
}
