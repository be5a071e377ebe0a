//! Resolved configuration structs handed to constructors at startup.

use std::path::PathBuf;

use serde::Deserialize;

/// Structured character sources that can appear in `[sources] chain`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceId {
    /// Comic Vine (primary).
    ComicVine,
    /// Marvel (secondary).
    Marvel,
    /// SuperHero API (legacy).
    SuperHero,
}

impl SourceId {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceId::ComicVine => "comicvine",
            SourceId::Marvel => "marvel",
            SourceId::SuperHero => "superhero",
        }
    }
}

/// PTY (console) channel configuration.
#[derive(Debug, Clone)]
pub struct PtyConfig {
    pub enabled: bool,
}

/// Telegram channel configuration.
#[derive(Debug, Clone)]
pub struct TelegramConfig {
    pub enabled: bool,
}

#[derive(Debug, Clone)]
pub struct CommsConfig {
    pub pty: PtyConfig,
    pub telegram: TelegramConfig,
}

/// Command dispatcher settings.
#[derive(Debug, Clone)]
pub struct CommandsConfig {
    /// When set, only this chat user id may run `addhero`.
    pub admin_user_id: Option<u64>,
}

/// Endpoint settings for one HTTP lookup source.
#[derive(Debug, Clone)]
pub struct EndpointConfig {
    pub api_base_url: String,
    /// Max results requested from the API.
    pub limit: usize,
}

#[derive(Debug, Clone)]
pub struct SourcesConfig {
    /// Structured hero sources, consulted in this order.
    pub chain: Vec<SourceId>,
    /// Per-request HTTP timeout for every source.
    pub timeout_seconds: u64,
    pub comicvine: EndpointConfig,
    pub marvel: EndpointConfig,
    pub superhero: EndpointConfig,
    pub jikan: EndpointConfig,
}

/// Generative fallback settings.
#[derive(Debug, Clone)]
pub struct FallbackConfig {
    /// When `false`, an exhausted chain is reported as not found.
    pub enabled: bool,
}

/// OpenAI / OpenAI-compatible provider configuration (`[llm.openai]`).
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    /// Full chat completions endpoint URL.
    pub api_base_url: String,
    pub model: String,
    pub temperature: f32,
    pub timeout_seconds: u64,
    /// Cap on generated tokens per request.
    pub max_tokens: u32,
}

#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Active provider: `"dummy"`, `"openai"` or `"openai-compatible"`.
    pub provider: String,
    pub openai: OpenAiConfig,
}

/// Credentials. Only ever read from the environment, never from TOML.
#[derive(Debug, Clone, Default)]
pub struct Secrets {
    pub telegram_bot_token: Option<String>,
    pub comicvine_api_key: Option<String>,
    pub marvel_public_key: Option<String>,
    pub marvel_private_key: Option<String>,
    pub superhero_api_token: Option<String>,
    /// `None` for keyless local models.
    pub llm_api_key: Option<String>,
}

/// Fully-resolved bot configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub bot_name: String,
    /// Directory for persistent data (already expanded, no `~`).
    pub data_dir: PathBuf,
    pub log_level: String,
    /// Custom entry snapshot, resolved against `data_dir`.
    pub store_file: PathBuf,
    pub comms: CommsConfig,
    pub commands: CommandsConfig,
    pub sources: SourcesConfig,
    pub fallback: FallbackConfig,
    pub llm: LlmConfig,
    pub secrets: Secrets,
}

impl Config {
    pub fn comms_pty_should_load(&self) -> bool {
        self.comms.pty.enabled
    }

    pub fn comms_telegram_should_load(&self) -> bool {
        self.comms.telegram.enabled
    }
}
