//! Lookup sources: one adapter per external API, each mapping its own
//! response shape into [`Candidate`]s.
//!
//! `SourceAdapter` is an enum over the concrete adapters, the same way
//! [`LlmProvider`](crate::llm::LlmProvider) is: no trait objects, and
//! `query` is a plain `async fn`.
//!
//! # Result contract
//!
//! - `Ok(vec![])`: the source answered and has nothing (including 4xx
//!   responses and API-level "not found" envelopes).
//! - `Err(AdapterError)`: transport failure, 5xx, or a body that does not
//!   parse. The resolver logs it and moves on to the next source.

pub mod comicvine;
pub mod fixed;
pub mod generated;
pub mod jikan;
pub mod marvel;
pub mod superhero;

use std::time::Duration;

use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

use crate::candidate::{Candidate, SourceKind};
use crate::config::{Config, SourceId};

// ── Error ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("failed to build {source_name} client: {reason}")]
    Client { source_name: &'static str, reason: String },
    #[error("{source_name} credential missing: {var}")]
    MissingKey { source_name: &'static str, var: &'static str },
    #[error("{source_name} unavailable: {reason}")]
    Unavailable { source_name: &'static str, reason: String },
}

// ── Adapter enum ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub enum SourceAdapter {
    ComicVine(comicvine::ComicVineAdapter),
    Marvel(marvel::MarvelAdapter),
    SuperHero(superhero::SuperHeroAdapter),
    Jikan(jikan::JikanAdapter),
    Fixed(fixed::FixedAdapter),
}

impl SourceAdapter {
    /// Short name for log lines.
    pub fn name(&self) -> &'static str {
        match self {
            SourceAdapter::ComicVine(_) => comicvine::SOURCE_NAME,
            SourceAdapter::Marvel(_) => marvel::SOURCE_NAME,
            SourceAdapter::SuperHero(_) => superhero::SOURCE_NAME,
            SourceAdapter::Jikan(_) => jikan::SOURCE_NAME,
            SourceAdapter::Fixed(_) => fixed::SOURCE_NAME,
        }
    }

    /// Kind stamped on every candidate this adapter returns.
    pub fn kind(&self) -> SourceKind {
        match self {
            SourceAdapter::ComicVine(_) => SourceKind::PrimaryApi,
            SourceAdapter::Marvel(_) => SourceKind::SecondaryApi,
            SourceAdapter::SuperHero(_) => SourceKind::LegacyApi,
            SourceAdapter::Jikan(_) => SourceKind::AnimeApi,
            SourceAdapter::Fixed(a) => a.kind(),
        }
    }

    /// Look `text` up. See the module docs for the result contract.
    pub async fn query(&self, text: &str) -> Result<Vec<Candidate>, AdapterError> {
        match self {
            SourceAdapter::ComicVine(a) => a.query(text).await,
            SourceAdapter::Marvel(a) => a.query(text).await,
            SourceAdapter::SuperHero(a) => a.query(text).await,
            SourceAdapter::Jikan(a) => a.query(text).await,
            SourceAdapter::Fixed(a) => a.query(text).await,
        }
    }
}

// ── Factories ─────────────────────────────────────────────────────────────────

/// Build the structured hero chain in configured order.
pub fn build_chain(config: &Config) -> Result<Vec<SourceAdapter>, AdapterError> {
    let timeout = config.sources.timeout_seconds;
    let secrets = &config.secrets;
    config
        .sources
        .chain
        .iter()
        .map(|id| match id {
            SourceId::ComicVine => {
                let key = secrets.comicvine_api_key.clone().ok_or(AdapterError::MissingKey {
                    source_name: comicvine::SOURCE_NAME,
                    var: "COMICVINE_API_KEY",
                })?;
                comicvine::ComicVineAdapter::new(&config.sources.comicvine, key, timeout)
                    .map(SourceAdapter::ComicVine)
            }
            SourceId::Marvel => {
                let public = secrets.marvel_public_key.clone().ok_or(AdapterError::MissingKey {
                    source_name: marvel::SOURCE_NAME,
                    var: "MARVEL_PUBLIC_KEY",
                })?;
                let private = secrets.marvel_private_key.clone().ok_or(AdapterError::MissingKey {
                    source_name: marvel::SOURCE_NAME,
                    var: "MARVEL_PRIVATE_KEY",
                })?;
                marvel::MarvelAdapter::new(&config.sources.marvel, public, private, timeout)
                    .map(SourceAdapter::Marvel)
            }
            SourceId::SuperHero => {
                let token = secrets.superhero_api_token.clone().ok_or(AdapterError::MissingKey {
                    source_name: superhero::SOURCE_NAME,
                    var: "SUPERHERO_API_TOKEN",
                })?;
                superhero::SuperHeroAdapter::new(&config.sources.superhero, token, timeout)
                    .map(SourceAdapter::SuperHero)
            }
        })
        .collect()
}

/// Build the anime title adapter. Jikan needs no key.
pub fn build_anime(config: &Config) -> Result<SourceAdapter, AdapterError> {
    jikan::JikanAdapter::new(&config.sources.jikan, config.sources.timeout_seconds)
        .map(SourceAdapter::Jikan)
}

// ── Shared HTTP plumbing ──────────────────────────────────────────────────────

const USER_AGENT: &str = concat!("hero-bot/", env!("CARGO_PKG_VERSION"));

pub(crate) fn http_client(
    source_name: &'static str,
    timeout_seconds: u64,
) -> Result<Client, AdapterError> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_seconds))
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| AdapterError::Client { source_name, reason: e.to_string() })
}

/// Send `req` and decode a JSON body.
///
/// Returns `Ok(None)` for 4xx (the API's way of saying "no such thing").
pub(crate) async fn fetch_json<T: DeserializeOwned>(
    source_name: &'static str,
    req: RequestBuilder,
) -> Result<Option<T>, AdapterError> {
    let response = req.send().await.map_err(|e| AdapterError::Unavailable {
        source_name,
        reason: e.to_string(),
    })?;

    let status = response.status();
    if status.is_client_error() {
        debug!(source = source_name, %status, "client error treated as no match");
        return Ok(None);
    }
    if !status.is_success() {
        return Err(AdapterError::Unavailable { source_name, reason: format!("HTTP {status}") });
    }

    let body = response.text().await.map_err(|e| AdapterError::Unavailable {
        source_name,
        reason: format!("failed to read body: {e}"),
    })?;
    decode(source_name, status, &body).map(Some)
}

fn decode<T: DeserializeOwned>(
    source_name: &'static str,
    status: StatusCode,
    body: &str,
) -> Result<T, AdapterError> {
    serde_json::from_str(body).map_err(|e| AdapterError::Unavailable {
        source_name,
        reason: format!("malformed JSON (HTTP {status}): {e}"),
    })
}

/// Text of a loosely typed JSON field. `null`, blank strings and the
/// placeholder strings `"null"` / `"-"` count as absent; arrays are joined
/// with `" / "`.
pub(crate) fn value_text(value: Option<&serde_json::Value>) -> Option<String> {
    use serde_json::Value;
    let text = match value? {
        Value::Null => return None,
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().filter_map(|v| value_text(Some(v))).collect();
            if parts.is_empty() {
                return None;
            }
            parts.join(" / ")
        }
        Value::Object(_) => return None,
    };
    match text.as_str() {
        "" | "null" | "-" => None,
        _ => Some(text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn value_text_handles_placeholders() {
        assert_eq!(value_text(Some(&json!("null"))), None);
        assert_eq!(value_text(Some(&json!("-"))), None);
        assert_eq!(value_text(Some(&json!(""))), None);
        assert_eq!(value_text(Some(&json!(null))), None);
        assert_eq!(value_text(None), None);
        assert_eq!(value_text(Some(&json!(81))), Some("81".into()));
        assert_eq!(value_text(Some(&json!(" good "))), Some("good".into()));
    }

    #[test]
    fn value_text_joins_arrays() {
        assert_eq!(
            value_text(Some(&json!(["6'2", "188 cm"]))),
            Some("6'2 / 188 cm".into())
        );
        assert_eq!(value_text(Some(&json!(["-", "0 cm"]))), Some("0 cm".into()));
        assert_eq!(value_text(Some(&json!(["-"]))), None);
    }

    #[test]
    fn decode_reports_malformed_json() {
        let r: Result<serde_json::Value, _> = decode("test", StatusCode::OK, "<html>");
        assert!(matches!(r, Err(AdapterError::Unavailable { .. })));
    }

    /// Answer every connection with `status` and `body`, then close it.
    async fn canned_server(status: &'static str, body: &'static str) -> String {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let mut request = Vec::new();
                let mut buf = [0u8; 1024];
                while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                    match socket.read(&mut buf).await {
                        Ok(0) | Err(_) => break,
                        Ok(n) => request.extend_from_slice(&buf[..n]),
                    }
                }
                let reply = format!(
                    "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = socket.write_all(reply.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });
        format!("http://{addr}")
    }

    fn superhero_at(base: &str) -> superhero::SuperHeroAdapter {
        let endpoint = crate::config::EndpointConfig { api_base_url: base.to_string(), limit: 3 };
        superhero::SuperHeroAdapter::new(&endpoint, "token".into(), 2).unwrap()
    }

    #[tokio::test]
    async fn client_error_is_an_empty_match() {
        let base = canned_server("404 Not Found", r#"{"error":"not found"}"#).await;
        assert!(superhero_at(&base).query("Batman").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn server_error_is_unavailable() {
        let base = canned_server("500 Internal Server Error", "oops").await;
        let err = superhero_at(&base).query("Batman").await.unwrap_err();
        assert!(matches!(err, AdapterError::Unavailable { ref reason, .. } if reason.contains("500")));
    }

    #[tokio::test]
    async fn malformed_body_is_unavailable() {
        let base = canned_server("200 OK", "<html>garbage</html>").await;
        let err = superhero_at(&base).query("Batman").await.unwrap_err();
        assert!(matches!(err, AdapterError::Unavailable { ref reason, .. } if reason.contains("malformed JSON")));
    }

    #[tokio::test]
    async fn refused_connection_is_unavailable() {
        let addr = {
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
            listener.local_addr().unwrap()
        };
        let err = superhero_at(&format!("http://{addr}")).query("Batman").await.unwrap_err();
        assert!(matches!(err, AdapterError::Unavailable { .. }));
    }

    #[tokio::test]
    async fn api_level_error_envelope_is_an_empty_match() {
        let base = canned_server(
            "200 OK",
            r#"{"response":"error","error":"character with given name not found"}"#,
        )
        .await;
        assert!(superhero_at(&base).query("Zzqx123").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn success_envelope_yields_candidates() {
        let base = canned_server(
            "200 OK",
            r#"{"response":"success","results":[{"name":"Batman","biography":{"full-name":"Bruce Wayne"}}]}"#,
        )
        .await;
        let found = superhero_at(&base).query("Batman").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name(), "Batman");
        assert_eq!(found[0].kind(), SourceKind::LegacyApi);
    }

    #[test]
    fn build_chain_follows_config_order() {
        let mut cfg = Config::test_default(std::path::Path::new("/tmp"));
        cfg.sources.chain = vec![SourceId::SuperHero, SourceId::ComicVine];
        cfg.secrets.superhero_api_token = Some("t".into());
        cfg.secrets.comicvine_api_key = Some("k".into());
        let chain = build_chain(&cfg).unwrap();
        let kinds: Vec<_> = chain.iter().map(|a| a.kind()).collect();
        assert_eq!(kinds, vec![SourceKind::LegacyApi, SourceKind::PrimaryApi]);
    }

    #[test]
    fn build_chain_reports_missing_key() {
        let mut cfg = Config::test_default(std::path::Path::new("/tmp"));
        cfg.sources.chain = vec![SourceId::Marvel];
        cfg.secrets.marvel_public_key = Some("pub".into());
        assert!(matches!(
            build_chain(&cfg),
            Err(AdapterError::MissingKey { var: "MARVEL_PRIVATE_KEY", .. })
        ));
    }

    #[test]
    fn anime_adapter_needs_no_key() {
        let cfg = Config::test_default(std::path::Path::new("/tmp"));
        assert_eq!(build_anime(&cfg).unwrap().kind(), SourceKind::AnimeApi);
    }
}
