//! Marvel character search: the secondary structured source.
//!
//! Every request is signed with `ts`, `apikey` and
//! `hash = md5(ts + private_key + public_key)`.

use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::candidate::{Candidate, SourceKind, attr};
use crate::config::EndpointConfig;
use super::{AdapterError, fetch_json, http_client};

pub const SOURCE_NAME: &str = "marvel";

/// Thumbnail path Marvel returns when a character has no picture.
const NO_IMAGE_MARKER: &str = "image_not_available";

#[derive(Debug, Clone)]
pub struct MarvelAdapter {
    client: Client,
    api_base_url: String,
    public_key: String,
    private_key: String,
    limit: usize,
}

impl MarvelAdapter {
    pub fn new(
        endpoint: &EndpointConfig,
        public_key: String,
        private_key: String,
        timeout_seconds: u64,
    ) -> Result<Self, AdapterError> {
        Ok(Self {
            client: http_client(SOURCE_NAME, timeout_seconds)?,
            api_base_url: endpoint.api_base_url.clone(),
            public_key,
            private_key,
            limit: endpoint.limit,
        })
    }

    pub async fn query(&self, text: &str) -> Result<Vec<Candidate>, AdapterError> {
        let ts = chrono::Utc::now().timestamp_millis().to_string();
        let hash = sign(&ts, &self.private_key, &self.public_key);
        let limit = self.limit.to_string();
        let req = self.client.get(format!("{}/characters", self.api_base_url)).query(&[
            ("nameStartsWith", text),
            ("limit", limit.as_str()),
            ("ts", ts.as_str()),
            ("apikey", self.public_key.as_str()),
            ("hash", hash.as_str()),
        ]);

        debug!(source = SOURCE_NAME, query = %text, "searching characters");
        let Some(body) = fetch_json::<SearchResponse>(SOURCE_NAME, req).await? else {
            return Ok(Vec::new());
        };
        Ok(map_response(body, self.limit))
    }
}

fn sign(ts: &str, private_key: &str, public_key: &str) -> String {
    format!("{:x}", md5::compute(format!("{ts}{private_key}{public_key}")))
}

fn map_response(body: SearchResponse, limit: usize) -> Vec<Candidate> {
    body.data
        .map(|d| d.results)
        .unwrap_or_default()
        .into_iter()
        .take(limit)
        .filter_map(map_character)
        .collect()
}

fn map_character(c: Character) -> Option<Candidate> {
    let summary = c
        .description
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty())
        .unwrap_or_else(|| "No description available.".to_string());

    let image = c.thumbnail.and_then(|t| {
        let path = t.path?;
        if path.contains(NO_IMAGE_MARKER) {
            return None;
        }
        let path = path.replacen("http://", "https://", 1);
        Some(match t.extension {
            Some(ext) if !ext.is_empty() => format!("{path}.{ext}"),
            _ => path,
        })
    });

    let more_info = c
        .urls
        .iter()
        .find(|u| u.kind == "detail")
        .or_else(|| c.urls.iter().find(|u| u.kind == "wiki"))
        .or_else(|| c.urls.first())
        .map(|u| u.url.replacen("http://", "https://", 1));

    let mut candidate = Candidate::new(SourceKind::SecondaryApi, c.name.as_deref()?)?
        .with_summary(summary)
        .with_image(image)
        .with_attr(attr::PUBLISHER, Some("Marvel".into()))
        .with_attr(attr::COMICS, c.comics.map(|l| l.available.to_string()));
    if let Some(url) = more_info {
        candidate = candidate.with_link("More info", url);
    }
    Some(candidate)
}

// ── Wire types ────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    data: Option<DataContainer>,
}

#[derive(Debug, Deserialize)]
struct DataContainer {
    #[serde(default)]
    results: Vec<Character>,
}

#[derive(Debug, Deserialize)]
struct Character {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    thumbnail: Option<Thumbnail>,
    #[serde(default)]
    urls: Vec<Url>,
    #[serde(default)]
    comics: Option<ComicList>,
}

#[derive(Debug, Deserialize)]
struct Thumbnail {
    #[serde(default)]
    path: Option<String>,
    #[serde(default)]
    extension: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Url {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    url: String,
}

#[derive(Debug, Deserialize)]
struct ComicList {
    #[serde(default)]
    available: u64,
}
