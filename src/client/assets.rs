//! Asset listing, lookup, deletion, and search.

use super::NexusClient;
use super::exec::{ApiRequest, encode_query, json_page, json_value};
use super::paging::collect_all_pages;
use crate::error::Result;
use crate::types::{Asset, Page, SearchQuery};

impl NexusClient {
    /// List one page of the assets in a repository.
    pub async fn list_assets(
        &self,
        repository: &str,
        continuation_token: Option<&str>,
    ) -> Result<Page<Asset>> {
        let mut pairs = vec![("repository".to_string(), repository.to_string())];
        if let Some(token) = continuation_token {
            pairs.push(("continuationToken".to_string(), token.to_string()));
        }
        let path = format!("/assets?{}", encode_query(&pairs));
        let outcome = self
            .execute(ApiRequest::get(&path).timeout(self.config.http.metadata_timeout))
            .await?;
        json_page(outcome, &path)
    }

    /// Every asset in a repository, across all pages.
    pub async fn list_all_assets(&self, repository: &str) -> Vec<Asset> {
        collect_all_pages(|token| async move {
            self.list_assets(repository, token.as_deref()).await
        })
        .await
    }

    /// Fetch one asset record.
    pub async fn get_asset(&self, asset_id: &str) -> Result<Asset> {
        let path = format!("/assets/{}", asset_id);
        let outcome = self.execute(ApiRequest::get(&path)).await?;
        json_value(outcome, &path)
    }

    /// Delete a single asset.
    pub async fn delete_asset(&self, asset_id: &str) -> Result<()> {
        let path = format!("/assets/{}", asset_id);
        self.execute(ApiRequest::delete(path)).await?;
        Ok(())
    }

    /// Search assets, one page at a time.
    pub async fn search_assets(
        &self,
        query: &SearchQuery,
        continuation_token: Option<&str>,
    ) -> Result<Page<Asset>> {
        let mut pairs = query.query_pairs();
        if let Some(token) = continuation_token {
            pairs.push(("continuationToken".to_string(), token.to_string()));
        }
        let path = format!("/search/assets?{}", encode_query(&pairs));
        let outcome = self
            .execute(ApiRequest::get(&path).timeout(self.config.http.metadata_timeout))
            .await?;
        json_page(outcome, &path)
    }

    /// Every asset matching a search, across all pages.
    pub async fn search_all_assets(&self, query: &SearchQuery) -> Vec<Asset> {
        collect_all_pages(|token| async move {
            self.search_assets(query, token.as_deref()).await
        })
        .await
    }
}
