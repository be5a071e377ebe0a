//! Configuration loading with env-var overrides.
//!
//! Reads `config/default.toml` relative to the current working directory
//! (or the `--config` path), then applies `HERO_BOT_DATA_DIR` and
//! `HERO_BOT_LOG_LEVEL` env overrides. API keys and the bot token are read
//! from the environment only.
//!
//! # Module layout
//!
//! - **types**: Public configuration structs consumed at startup.
//! - **raw**: Raw TOML deserialization types; kept private.
//! - **load**: `load`, `load_from`, `Config::validate`, `expand_home`.

mod load;
mod raw;
mod types;

pub use load::{Overrides, expand_home, load, load_from};
pub use types::*;

impl Config {
    /// Offline `Config`: dummy LLM, no keys, no channels, endpoints that
    /// refuse connections.
    pub fn test_default(data_dir: &std::path::Path) -> Self {
        let endpoint = |limit| EndpointConfig {
            api_base_url: "http://localhost:0".into(),
            limit,
        };
        Self {
            bot_name: "test".into(),
            data_dir: data_dir.to_path_buf(),
            log_level: "info".into(),
            store_file: data_dir.join("heroes.json"),
            comms: CommsConfig {
                pty: PtyConfig { enabled: false },
                telegram: TelegramConfig { enabled: false },
            },
            commands: CommandsConfig { admin_user_id: None },
            sources: SourcesConfig {
                chain: Vec::new(),
                timeout_seconds: 1,
                comicvine: endpoint(1),
                marvel: endpoint(1),
                superhero: endpoint(3),
                jikan: endpoint(3),
            },
            fallback: FallbackConfig { enabled: true },
            llm: LlmConfig {
                provider: "dummy".into(),
                openai: OpenAiConfig {
                    api_base_url: "http://localhost:0/v1/chat/completions".into(),
                    model: "test-model".into(),
                    temperature: 0.0,
                    timeout_seconds: 1,
                    max_tokens: 250,
                },
            },
            secrets: Secrets::default(),
        }
    }
}
