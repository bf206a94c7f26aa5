//! Feed loading with default fallback.
//!
//! Any failure (missing file, HTTP error, bad JSON) degrades to the empty feed
//! so the dashboard keeps rendering with "no classes" / "no tests".

use anyhow::{Context, Result, bail};
use chrono::Utc;
use classboard_core::Feed;
use reqwest::Url;

use crate::source::FeedSource;

pub fn parse_feed(text: &str) -> Result<Feed> {
    serde_json::from_str(text).context("parse feed JSON")
}

/// Append `t=<millis>` so intermediate caches never serve a stale feed.
pub fn cache_busted_url(url: &str, now_millis: i64) -> Result<String> {
    let mut parsed = Url::parse(url).with_context(|| format!("invalid feed url {url}"))?;
    parsed
        .query_pairs_mut()
        .append_pair("t", &now_millis.to_string());
    Ok(parsed.into())
}

pub async fn load_feed(source: &FeedSource) -> Result<Feed> {
    let text = match source {
        FeedSource::File(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("read {}", path.display()))?,
        FeedSource::Url(url) => {
            let url = cache_busted_url(url, Utc::now().timestamp_millis())?;
            tracing::debug!(%url, "fetching feed");
            let resp = reqwest::get(&url)
                .await
                .with_context(|| format!("GET {url}"))?;
            let status = resp.status();
            if !status.is_success() {
                bail!("feed request failed: {status}");
            }
            resp.text().await.context("read feed body")?
        }
    };
    parse_feed(&text)
}

pub async fn load_feed_or_default(source: &FeedSource) -> Feed {
    match load_feed(source).await {
        Ok(feed) => {
            tracing::info!(
                %source,
                classes = feed.schedules.len(),
                periods = feed.time_settings.len(),
                tests = feed.tests.len(),
                "feed loaded"
            );
            feed
        }
        Err(e) => {
            tracing::warn!(%source, error = ?e, "feed load failed, using empty feed");
            Feed::default()
        }
    }
}
