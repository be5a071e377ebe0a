//! SuperHero API name search: the legacy structured source.
//!
//! `GET {base}/{token}/search/{name}` answers with `"response": "success"`
//! and a `results` list, or `"response": "error"` when nothing matches.
//!
//! Selection: a result whose name equals the query (ignoring case) wins
//! alone. Otherwise the first `limit` results are returned as an ambiguous
//! list, in API order.

use std::collections::BTreeMap;

use reqwest::{Client, Url};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::candidate::{Candidate, SourceKind, attr};
use crate::config::EndpointConfig;
use crate::store::normalize;
use super::{AdapterError, fetch_json, http_client, value_text};

pub const SOURCE_NAME: &str = "superhero";

#[derive(Debug, Clone)]
pub struct SuperHeroAdapter {
    client: Client,
    api_base_url: String,
    token: String,
    limit: usize,
}

impl SuperHeroAdapter {
    pub fn new(
        endpoint: &EndpointConfig,
        token: String,
        timeout_seconds: u64,
    ) -> Result<Self, AdapterError> {
        Ok(Self {
            client: http_client(SOURCE_NAME, timeout_seconds)?,
            api_base_url: endpoint.api_base_url.clone(),
            token,
            limit: endpoint.limit,
        })
    }

    fn search_url(&self, text: &str) -> Result<Url, AdapterError> {
        let mut url = Url::parse(&self.api_base_url).map_err(|e| AdapterError::Unavailable {
            source_name: SOURCE_NAME,
            reason: format!("bad base url '{}': {e}", self.api_base_url),
        })?;
        url.path_segments_mut()
            .map_err(|_| AdapterError::Unavailable {
                source_name: SOURCE_NAME,
                reason: format!("base url '{}' cannot hold a path", self.api_base_url),
            })?
            .pop_if_empty()
            .extend([self.token.as_str(), "search", text]);
        Ok(url)
    }

    pub async fn query(&self, text: &str) -> Result<Vec<Candidate>, AdapterError> {
        let req = self.client.get(self.search_url(text)?);

        debug!(source = SOURCE_NAME, query = %text, "searching characters");
        let Some(body) = fetch_json::<SearchResponse>(SOURCE_NAME, req).await? else {
            return Ok(Vec::new());
        };
        Ok(select(body, text, self.limit))
    }
}

/// Apply the exact-match-else-first-N policy.
fn select(body: SearchResponse, query: &str, limit: usize) -> Vec<Candidate> {
    if body.response != "success" || body.results.is_empty() {
        debug!(
            source = SOURCE_NAME,
            response = %body.response,
            error = body.error.as_deref().unwrap_or(""),
            "api reported no result"
        );
        return Vec::new();
    }

    let wanted = normalize(query);
    if let Some(hit) = body
        .results
        .iter()
        .position(|h| h.name.as_deref().map(normalize).as_deref() == Some(wanted.as_str()))
    {
        let hero = body.results.into_iter().nth(hit);
        return hero.and_then(map_hero).into_iter().collect();
    }

    body.results.into_iter().take(limit).filter_map(map_hero).collect()
}

fn map_hero(h: Hero) -> Option<Candidate> {
    let bio = |key: &str| value_text(h.biography.get(key));
    let look = |key: &str| value_text(h.appearance.get(key));
    let stat = |key: &str| value_text(h.powerstats.get(key));

    let full_name = bio("full-name");
    let summary = match (&full_name, bio("publisher")) {
        (Some(full), Some(publisher)) => format!("{full} ({publisher})"),
        (Some(full), None) => full.clone(),
        (None, Some(publisher)) => publisher,
        (None, None) => String::new(),
    };

    let mut candidate = Candidate::new(SourceKind::LegacyApi, h.name.as_deref()?)?
        .with_summary(summary)
        .with_image(value_text(h.image.get("url")))
        .with_attr(attr::FULL_NAME, full_name)
        .with_attr(attr::ALIGNMENT, bio("alignment"))
        .with_attr(attr::FIRST_APPEARANCE, bio("first-appearance"))
        .with_attr(attr::PUBLISHER, bio("publisher"))
        .with_attr(attr::GENDER, look("gender"))
        .with_attr(attr::RACE, look("race"))
        .with_attr(attr::HEIGHT, look("height"))
        .with_attr(attr::WEIGHT, look("weight"));
    for key in attr::POWER_STATS {
        candidate = candidate.with_attr(key, stat(key));
    }
    Some(candidate)
}

// ── Wire types ────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    response: String,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    results: Vec<Hero>,
}

/// Sections are kept loose: the API mixes strings, `"null"` and arrays.
#[derive(Debug, Deserialize)]
struct Hero {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    powerstats: BTreeMap<String, Value>,
    #[serde(default)]
    biography: BTreeMap<String, Value>,
    #[serde(default)]
    appearance: BTreeMap<String, Value>,
    #[serde(default)]
    image: BTreeMap<String, Value>,
}
