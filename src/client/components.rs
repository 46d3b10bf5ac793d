//! Component listing, lookup, deletion, and search.

use super::NexusClient;
use super::exec::{ApiRequest, encode_query, json_page, json_value};
use super::paging::collect_all_pages;
use crate::error::Result;
use crate::types::{Component, Page, SearchQuery};

impl NexusClient {
    /// List one page of the components in a repository.
    pub async fn list_components(
        &self,
        repository: &str,
        continuation_token: Option<&str>,
    ) -> Result<Page<Component>> {
        let mut pairs = vec![("repository".to_string(), repository.to_string())];
        if let Some(token) = continuation_token {
            pairs.push(("continuationToken".to_string(), token.to_string()));
        }
        let path = format!("/components?{}", encode_query(&pairs));
        let outcome = self
            .execute(ApiRequest::get(&path).timeout(self.config.http.metadata_timeout))
            .await?;
        json_page(outcome, &path)
    }

    /// Every component in a repository, across all pages.
    ///
    /// A page failure mid-walk returns what was gathered so far.
    pub async fn list_all_components(&self, repository: &str) -> Vec<Component> {
        collect_all_pages(|token| async move {
            self.list_components(repository, token.as_deref()).await
        })
        .await
    }

    /// Fetch one component with its asset list.
    pub async fn get_component(&self, component_id: &str) -> Result<Component> {
        let path = format!("/components/{}", component_id);
        let outcome = self.execute(ApiRequest::get(&path)).await?;
        json_value(outcome, &path)
    }

    /// Delete a component and all of its assets.
    ///
    /// Destructive and irreversible; confirmation belongs to the caller.
    pub async fn delete_component(&self, component_id: &str) -> Result<()> {
        let path = format!("/components/{}", component_id);
        self.execute(ApiRequest::delete(path)).await?;
        Ok(())
    }

    /// Search components, one page at a time.
    pub async fn search_components(
        &self,
        query: &SearchQuery,
        continuation_token: Option<&str>,
    ) -> Result<Page<Component>> {
        let mut pairs = query.query_pairs();
        if let Some(token) = continuation_token {
            pairs.push(("continuationToken".to_string(), token.to_string()));
        }
        let path = format!("/search?{}", encode_query(&pairs));
        let outcome = self
            .execute(ApiRequest::get(&path).timeout(self.config.http.metadata_timeout))
            .await?;
        json_page(outcome, &path)
    }

    /// Every component matching a search, across all pages.
    pub async fn search_all_components(&self, query: &SearchQuery) -> Vec<Component> {
        collect_all_pages(|token| async move {
            self.search_components(query, token.as_deref()).await
        })
        .await
    }
}
