//! Raw TOML shape: `serde` target before resolution.

use serde::Deserialize;

use super::types::SourceId;

#[derive(Deserialize)]
pub(super) struct RawConfig {
    pub bot: RawBot,
    #[serde(default)]
    pub comms: RawComms,
    #[serde(default)]
    pub commands: RawCommands,
    #[serde(default)]
    pub store: RawStore,
    #[serde(default)]
    pub sources: RawSources,
    #[serde(default)]
    pub fallback: RawFallback,
    #[serde(default)]
    pub llm: RawLlm,
}

#[derive(Deserialize)]
pub(super) struct RawBot {
    #[serde(default = "default_bot_name")]
    pub name: String,
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

#[derive(Deserialize)]
pub(super) struct RawComms {
    /// Defaults to off: the console is opted into with `-i`.
    #[serde(default)]
    pub pty: RawToggle,
    /// Defaults to on: Telegram is the bot's main channel.
    #[serde(default = "RawToggle::on")]
    pub telegram: RawToggle,
}

impl Default for RawComms {
    fn default() -> Self {
        Self { pty: RawToggle::default(), telegram: RawToggle::on() }
    }
}

/// `enabled = bool` section, off unless stated.
#[derive(Deserialize, Default)]
pub(super) struct RawToggle {
    #[serde(default)]
    pub enabled: bool,
}

impl RawToggle {
    fn on() -> Self {
        Self { enabled: true }
    }
}

#[derive(Deserialize, Default)]
pub(super) struct RawCommands {
    #[serde(default)]
    pub admin_user_id: Option<u64>,
}

#[derive(Deserialize)]
pub(super) struct RawStore {
    #[serde(default = "default_store_file")]
    pub file: String,
}

impl Default for RawStore {
    fn default() -> Self {
        Self { file: default_store_file() }
    }
}

#[derive(Deserialize)]
pub(super) struct RawSources {
    #[serde(default = "default_chain")]
    pub chain: Vec<SourceId>,
    #[serde(default = "default_source_timeout")]
    pub timeout_seconds: u64,
    #[serde(default)]
    pub comicvine: RawEndpoint,
    #[serde(default)]
    pub marvel: RawEndpoint,
    #[serde(default)]
    pub superhero: RawEndpoint,
    #[serde(default)]
    pub jikan: RawEndpoint,
}

impl Default for RawSources {
    fn default() -> Self {
        Self {
            chain: default_chain(),
            timeout_seconds: default_source_timeout(),
            comicvine: RawEndpoint::default(),
            marvel: RawEndpoint::default(),
            superhero: RawEndpoint::default(),
            jikan: RawEndpoint::default(),
        }
    }
}

/// Partially specified endpoint; missing keys fall back per source.
#[derive(Deserialize, Default)]
pub(super) struct RawEndpoint {
    #[serde(default)]
    pub api_base_url: Option<String>,
    #[serde(default)]
    pub limit: Option<usize>,
}

#[derive(Deserialize)]
pub(super) struct RawFallback {
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for RawFallback {
    fn default() -> Self {
        Self { enabled: true }
    }
}

#[derive(Deserialize)]
pub(super) struct RawLlm {
    /// Maps to `default = "..."` in `[llm]`.
    #[serde(rename = "default", default = "default_llm_provider")]
    pub provider: String,
    #[serde(default)]
    pub openai: RawOpenAiConfig,
}

impl Default for RawLlm {
    fn default() -> Self {
        Self { provider: default_llm_provider(), openai: RawOpenAiConfig::default() }
    }
}

#[derive(Deserialize)]
pub(super) struct RawOpenAiConfig {
    #[serde(default = "default_openai_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_openai_model")]
    pub model: String,
    #[serde(default = "default_openai_temperature")]
    pub temperature: f32,
    #[serde(default = "default_openai_timeout_seconds")]
    pub timeout_seconds: u64,
    #[serde(default = "default_openai_max_tokens")]
    pub max_tokens: u32,
}

impl Default for RawOpenAiConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_openai_api_base_url(),
            model: default_openai_model(),
            temperature: default_openai_temperature(),
            timeout_seconds: default_openai_timeout_seconds(),
            max_tokens: default_openai_max_tokens(),
        }
    }
}

pub(super) const COMICVINE_BASE_URL: &str = "https://comicvine.gamespot.com/api";
pub(super) const MARVEL_BASE_URL: &str = "https://gateway.marvel.com/v1/public";
pub(super) const SUPERHERO_BASE_URL: &str = "https://superheroapi.com/api";
pub(super) const JIKAN_BASE_URL: &str = "https://api.jikan.moe/v4";

pub(super) fn default_bot_name() -> String { "hero-bot".to_string() }
pub(super) fn default_data_dir() -> String { "~/.hero-bot".to_string() }
pub(super) fn default_log_level() -> String { "info".to_string() }
pub(super) fn default_store_file() -> String { "heroes.json".to_string() }
pub(super) fn default_chain() -> Vec<SourceId> {
    vec![SourceId::ComicVine, SourceId::Marvel, SourceId::SuperHero]
}
pub(super) fn default_source_timeout() -> u64 { 15 }
fn default_llm_provider() -> String { "openai".to_string() }
fn default_openai_api_base_url() -> String { "https://api.openai.com/v1/chat/completions".to_string() }
fn default_openai_model() -> String { "gpt-4o-mini".to_string() }
fn default_openai_temperature() -> f32 { 0.7 }
fn default_openai_timeout_seconds() -> u64 { 60 }
fn default_openai_max_tokens() -> u32 { 250 }

fn default_true() -> bool {
    true
}
