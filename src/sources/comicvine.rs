//! Comic Vine character search: the primary structured source.
//!
//! `GET {base}/characters/?filter=name:{q}` returns characters whose name
//! contains the query. The first `limit` results are mapped.

use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::candidate::{Candidate, SourceKind, attr};
use crate::config::EndpointConfig;
use super::{AdapterError, fetch_json, http_client, value_text};

pub const SOURCE_NAME: &str = "comicvine";

/// Comic Vine's `status_code` for a successful call.
const STATUS_OK: i64 = 1;

const FIELD_LIST: &str = "name,aliases,deck,gender,image,publisher,site_detail_url";

#[derive(Debug, Clone)]
pub struct ComicVineAdapter {
    client: Client,
    api_base_url: String,
    api_key: String,
    limit: usize,
}

impl ComicVineAdapter {
    pub fn new(
        endpoint: &EndpointConfig,
        api_key: String,
        timeout_seconds: u64,
    ) -> Result<Self, AdapterError> {
        Ok(Self {
            client: http_client(SOURCE_NAME, timeout_seconds)?,
            api_base_url: endpoint.api_base_url.clone(),
            api_key,
            limit: endpoint.limit,
        })
    }

    pub async fn query(&self, text: &str) -> Result<Vec<Candidate>, AdapterError> {
        let url = format!("{}/characters/", self.api_base_url);
        let limit = self.limit.to_string();
        let filter = name_filter(text);
        let req = self.client.get(url).query(&[
            ("api_key", self.api_key.as_str()),
            ("format", "json"),
            ("filter", filter.as_str()),
            ("limit", limit.as_str()),
            ("field_list", FIELD_LIST),
        ]);

        debug!(source = SOURCE_NAME, query = %text, "searching characters");
        let Some(body) = fetch_json::<SearchResponse>(SOURCE_NAME, req).await? else {
            return Ok(Vec::new());
        };
        Ok(map_response(body, self.limit))
    }
}

/// `filter` separates `field:value` pairs with commas, so a comma in the
/// name would start a new pair.
fn name_filter(text: &str) -> String {
    let name = text.split(',').flat_map(str::split_whitespace).collect::<Vec<_>>().join(" ");
    format!("name:{name}")
}

fn map_response(body: SearchResponse, limit: usize) -> Vec<Candidate> {
    if body.status_code != STATUS_OK {
        debug!(
            source = SOURCE_NAME,
            status_code = body.status_code,
            error = body.error.as_deref().unwrap_or(""),
            "api reported no result"
        );
        return Vec::new();
    }
    body.results.into_iter().take(limit).filter_map(map_character).collect()
}

fn map_character(c: Character) -> Option<Candidate> {
    let aliases = c.aliases.as_deref().map(split_aliases).filter(|a| !a.is_empty());
    let summary = c
        .deck
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty())
        .unwrap_or_else(|| "No description available.".to_string());

    let mut candidate = Candidate::new(SourceKind::PrimaryApi, c.name.as_deref()?)?
        .with_summary(summary)
        .with_image(c.image.and_then(|i| i.original_url))
        .with_attr(attr::ALIASES, aliases)
        .with_attr(attr::GENDER, gender_label(c.gender.as_ref()))
        .with_attr(attr::PUBLISHER, c.publisher.and_then(|p| p.name));
    if let Some(url) = c.site_detail_url.filter(|u| !u.is_empty()) {
        candidate = candidate.with_link("More info", url);
    }
    Some(candidate)
}

/// Aliases arrive as one newline-separated string.
fn split_aliases(raw: &str) -> String {
    raw.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Comic Vine encodes gender as 0 (other), 1 (male), 2 (female).
fn gender_label(raw: Option<&serde_json::Value>) -> Option<String> {
    match value_text(raw)?.as_str() {
        "1" => Some("Male".into()),
        "2" => Some("Female".into()),
        "0" => Some("Other".into()),
        other => Some(other.to_string()),
    }
}

// ── Wire types ────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    status_code: i64,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    results: Vec<Character>,
}

#[derive(Debug, Deserialize)]
struct Character {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    aliases: Option<String>,
    #[serde(default)]
    deck: Option<String>,
    #[serde(default)]
    gender: Option<serde_json::Value>,
    #[serde(default)]
    image: Option<Image>,
    #[serde(default)]
    publisher: Option<Publisher>,
    #[serde(default)]
    site_detail_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Image {
    #[serde(default)]
    original_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Publisher {
    #[serde(default)]
    name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commas_cannot_add_filter_fields() {
        assert_eq!(name_filter("Batman"), "name:Batman");
        assert_eq!(name_filter("Batman, Jr."), "name:Batman Jr.");
        assert_eq!(name_filter("Robin,publisher:Marvel"), "name:Robin publisher:Marvel");
        assert_eq!(name_filter("  Green   Lantern "), "name:Green Lantern");
    }

    const BATMAN: &str = r#"{
        "error": "OK",
        "status_code": 1,
        "results": [
            {
                "name": "Batman",
                "aliases": "The Dark Knight\r\nThe Caped Crusader\n",
                "deck": "The Dark Knight of Gotham City.",
                "gender": 1,
                "image": {"original_url": "https://cv.example/batman.jpg"},
                "publisher": {"name": "DC Comics"},
                "site_detail_url": "https://comicvine.gamespot.com/batman/4005-1699/"
            },
            {"name": "Batman Beyond", "gender": 1}
        ]
    }"#;

    #[test]
    fn maps_first_result_with_attributes() {
        let body: SearchResponse = serde_json::from_str(BATMAN).unwrap();
        let out = map_response(body, 1);
        assert_eq!(out.len(), 1);
        let c = &out[0];
        assert_eq!(c.name(), "Batman");
        assert_eq!(c.kind(), SourceKind::PrimaryApi);
        assert_eq!(c.summary, "The Dark Knight of Gotham City.");
        assert_eq!(c.attr(attr::ALIASES), Some("The Dark Knight, The Caped Crusader"));
        assert_eq!(c.attr(attr::GENDER), Some("Male"));
        assert_eq!(c.attr(attr::PUBLISHER), Some("DC Comics"));
        assert_eq!(c.image_url.as_deref(), Some("https://cv.example/batman.jpg"));
        assert_eq!(c.links[0].label, "More info");
    }

    #[test]
    fn missing_nested_fields_degrade() {
        let body: SearchResponse = serde_json::from_str(BATMAN).unwrap();
        let out = map_response(body, 2);
        let beyond = &out[1];
        assert_eq!(beyond.summary, "No description available.");
        assert_eq!(beyond.attr(attr::ALIASES), None);
        assert!(beyond.image_url.is_none());
        assert!(beyond.links.is_empty());
    }

    #[test]
    fn error_status_is_empty_match() {
        let body: SearchResponse =
            serde_json::from_str(r#"{"error":"Invalid API Key","status_code":100,"results":[]}"#)
                .unwrap();
        assert!(map_response(body, 1).is_empty());
    }

    #[test]
    fn nameless_result_is_skipped() {
        let body: SearchResponse =
            serde_json::from_str(r#"{"status_code":1,"results":[{"name":"  "}]}"#).unwrap();
        assert!(map_response(body, 1).is_empty());
    }
}
