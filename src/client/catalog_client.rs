use std::time::Duration;

use anyhow::Context;

use chrono::{DateTime, Utc};

use reqwest::Client;

use serde::Deserialize;

use url::Url;

use crate::domain::GameRecord;
use crate::error::{Error, Result};

/// Client for the storefront's promotional catalog feed
#[derive(Debug, Clone)]
pub struct CatalogClient {
    client: Client,
    catalog_url: Url,
}

impl CatalogClient {
    pub fn new(catalog_url: Url, timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build http client")?;

        Ok(Self {
            client,
            catalog_url,
        })
    }

    /// Fetch the feed and extract the game that is free right now
    #[tracing::instrument(name = "Fetch current free game", skip(self))]
    pub async fn fetch_current_free_game(&self) -> Result<Option<GameRecord>> {
        let feed: CatalogFeed = self
            .client
            .get(self.catalog_url.clone())
            .send()
            .await
            .and_then(|res| res.error_for_status())
            .map_err(Error::FetchError)?
            .json()
            .await
            .map_err(Error::FetchError)?;

        let elements = feed.data.catalog.search_store.elements;
        tracing::debug!("Catalog feed returned {} entries", elements.len());

        Ok(current_free_game(&elements, Utc::now()))
    }
}

/// Raw promotion entry as listed by the feed
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    pub title: String,
    pub effective_date: DateTime<Utc>,
    pub expiry_date: Option<DateTime<Utc>>,
}

impl CatalogEntry {
    /// Promotion has started and has a defined end
    fn is_free_at(&self, now: DateTime<Utc>) -> bool {
        self.expiry_date.is_some() && now > self.effective_date
    }
}

/// Select the active free game from the feed entries.
///
/// When several entries qualify the first one in feed order wins.
pub fn current_free_game(entries: &[CatalogEntry], now: DateTime<Utc>) -> Option<GameRecord> {
    entries
        .iter()
        .find(|entry| entry.is_free_at(now))
        .and_then(|entry| {
            let expiry = entry.expiry_date?;
            Some(GameRecord {
                title: entry.title.clone(),
                start_date: entry.effective_date.date_naive(),
                end_date: expiry.date_naive(),
            })
        })
}

#[derive(Debug, Deserialize)]
struct CatalogFeed {
    data: CatalogData,
}

#[derive(Debug, Deserialize)]
struct CatalogData {
    #[serde(rename = "Catalog")]
    catalog: Catalog,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Catalog {
    search_store: SearchStore,
}

#[derive(Debug, Deserialize)]
struct SearchStore {
    elements: Vec<CatalogEntry>,
}
