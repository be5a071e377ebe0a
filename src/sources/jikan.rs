//! Jikan (MyAnimeList) title search: the anime source.

use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::candidate::{Candidate, SourceKind, attr};
use crate::config::EndpointConfig;
use super::{AdapterError, fetch_json, http_client, value_text};

pub const SOURCE_NAME: &str = "jikan";

/// Synopsis cap, in characters.
pub const SYNOPSIS_LIMIT: usize = 500;
pub const ELLIPSIS: &str = "...";

#[derive(Debug, Clone)]
pub struct JikanAdapter {
    client: Client,
    api_base_url: String,
    limit: usize,
}

impl JikanAdapter {
    pub fn new(endpoint: &EndpointConfig, timeout_seconds: u64) -> Result<Self, AdapterError> {
        Ok(Self {
            client: http_client(SOURCE_NAME, timeout_seconds)?,
            api_base_url: endpoint.api_base_url.clone(),
            limit: endpoint.limit,
        })
    }

    pub async fn query(&self, text: &str) -> Result<Vec<Candidate>, AdapterError> {
        let limit = self.limit.to_string();
        let req = self
            .client
            .get(format!("{}/anime", self.api_base_url))
            .query(&[("q", text), ("limit", limit.as_str())]);

        debug!(source = SOURCE_NAME, query = %text, "searching anime");
        let Some(body) = fetch_json::<SearchResponse>(SOURCE_NAME, req).await? else {
            return Ok(Vec::new());
        };
        Ok(body.data.into_iter().take(self.limit).filter_map(map_anime).collect())
    }
}

/// Cut `text` to [`SYNOPSIS_LIMIT`] characters, appending [`ELLIPSIS`] when
/// anything was removed.
pub fn truncate_synopsis(text: &str) -> String {
    let text = text.trim();
    match text.char_indices().nth(SYNOPSIS_LIMIT) {
        None => text.to_string(),
        Some((cut, _)) => format!("{}{ELLIPSIS}", text[..cut].trim_end()),
    }
}

fn map_anime(a: Anime) -> Option<Candidate> {
    let title = a.title_english.as_deref().filter(|t| !t.trim().is_empty()).or(a.title.as_deref())?;
    let synopsis = a
        .synopsis
        .as_deref()
        .map(truncate_synopsis)
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "No synopsis available.".to_string());

    let mut candidate = Candidate::new(SourceKind::AnimeApi, title)?
        .with_summary(synopsis)
        .with_image(a.images.and_then(|i| i.jpg).and_then(|j| j.image_url))
        .with_attr(attr::SCORE, value_text(a.score.as_ref()))
        .with_attr(attr::EPISODES, value_text(a.episodes.as_ref()));
    if let Some(url) = a.url.filter(|u| !u.is_empty()) {
        candidate = candidate.with_link("More info", url);
    }
    Some(candidate)
}

// ── Wire types ────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    data: Vec<Anime>,
}

#[derive(Debug, Deserialize)]
struct Anime {
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    title_english: Option<String>,
    #[serde(default)]
    synopsis: Option<String>,
    #[serde(default)]
    score: Option<serde_json::Value>,
    #[serde(default)]
    episodes: Option<serde_json::Value>,
    #[serde(default)]
    images: Option<Images>,
}

#[derive(Debug, Deserialize)]
struct Images {
    #[serde(default)]
    jpg: Option<ImageSet>,
}

#[derive(Debug, Deserialize)]
struct ImageSet {
    #[serde(default)]
    image_url: Option<String>,
}
