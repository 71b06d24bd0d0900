//! NewsAPI Client
//!
//! Pulls recent market headlines from the keyed `/v2/everything` endpoint and
//! classifies each article into a [`NewsItem`].

use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::error::ProviderResult;
use super::http::get_json;
use crate::news::classify_article;
use crate::types::NewsItem;

const PROVIDER: &str = "NewsAPI";
const BASE_URL: &str = "https://newsapi.org";
const QUERY: &str = "(stock market OR S&P 500 OR nasdaq OR federal reserve OR earnings)";
const PAGE_SIZE: &str = "15";

pub struct NewsApiClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl NewsApiClient {
    pub fn new(client: Client, api_key: impl Into<String>) -> Self {
        Self::with_base_url(client, api_key, BASE_URL)
    }

    pub fn with_base_url(client: Client, api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    /// Latest classified headlines, newest first
    pub async fn fetch_headlines(&self) -> ProviderResult<Vec<NewsItem>> {
        let url = format!("{}/v2/everything", self.base_url);
        let request = self.client.get(&url).query(&[
            ("q", QUERY),
            ("sortBy", "publishedAt"),
            ("pageSize", PAGE_SIZE),
            ("language", "en"),
            ("apiKey", self.api_key.as_str()),
        ]);

        debug!("Fetching headlines from NewsAPI");
        let body: EverythingResponse = get_json(PROVIDER, request).await?;
        Ok(normalize_articles(body.articles, Utc::now()))
    }
}

/// Drop articles without a title or description and classify the rest
fn normalize_articles(articles: Vec<Article>, now: DateTime<Utc>) -> Vec<NewsItem> {
    let stamp = now.timestamp_millis();
    articles
        .into_iter()
        .filter_map(|article| {
            let title = article.title.filter(|t| !t.trim().is_empty())?;
            let description = article.description.filter(|d| !d.trim().is_empty())?;
            Some((title, description, article.source, article.published_at))
        })
        .enumerate()
        .map(|(index, (title, description, source, published_at))| {
            let timestamp = published_at
                .as_deref()
                .and_then(|p| DateTime::parse_from_rfc3339(p).ok())
                .map(|t| t.with_timezone(&Utc))
                .unwrap_or(now);
            let source = source.and_then(|s| s.name).unwrap_or_else(|| PROVIDER.to_string());

            classify_article(
                format!("news_{}_{}", stamp, index),
                &title,
                &description,
                &source,
                timestamp,
            )
        })
        .collect()
}

#[derive(Debug, Deserialize)]
struct EverythingResponse {
    #[serde(default)]
    articles: Vec<Article>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Article {
    source: Option<ArticleSource>,
    title: Option<String>,
    description: Option<String>,
    published_at: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ArticleSource {
    name: Option<String>,
}
