//! Loading logic: read TOML, apply env overrides, resolve paths, validate.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::AppError;

use super::raw::{self, RawConfig, RawEndpoint};
use super::types::*;

/// Env-var overrides applied on top of the TOML file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub data_dir: Option<String>,
    pub log_level: Option<String>,
}

impl Overrides {
    /// Read `HERO_BOT_DATA_DIR` and `HERO_BOT_LOG_LEVEL`.
    pub fn from_env() -> Self {
        Self {
            data_dir: env::var("HERO_BOT_DATA_DIR").ok(),
            log_level: env::var("HERO_BOT_LOG_LEVEL").ok(),
        }
    }
}

impl Secrets {
    /// Read every credential from the process environment.
    pub fn from_env() -> Self {
        let var = |name: &str| env::var(name).ok().filter(|v| !v.trim().is_empty());
        Self {
            telegram_bot_token: var("TELEGRAM_BOT_TOKEN"),
            comicvine_api_key: var("COMICVINE_API_KEY"),
            marvel_public_key: var("MARVEL_PUBLIC_KEY"),
            marvel_private_key: var("MARVEL_PRIVATE_KEY"),
            superhero_api_token: var("SUPERHERO_API_TOKEN"),
            llm_api_key: var("LLM_API_KEY"),
        }
    }
}

/// Load config from `config_path`, else `config/default.toml` if it exists,
/// else built-in defaults. Env overrides and secrets are applied either way.
pub fn load(config_path: Option<&str>) -> Result<Config, AppError> {
    let overrides = Overrides::from_env();
    let secrets = Secrets::from_env();

    if let Some(path) = config_path {
        return load_from(Path::new(path), &overrides, secrets);
    }

    let default_path = Path::new("config/default.toml");
    if default_path.exists() {
        load_from(default_path, &overrides, secrets)
    } else {
        let parsed: RawConfig = toml::from_str("[bot]")
            .map_err(|e| AppError::Config(format!("built-in defaults: {e}")))?;
        Ok(resolve(parsed, &overrides, secrets))
    }
}

/// Internal loader: accepts an explicit path, overrides and secrets.
/// Tests pass these directly instead of mutating env vars.
pub fn load_from(
    path: &Path,
    overrides: &Overrides,
    secrets: Secrets,
) -> Result<Config, AppError> {
    let raw = fs::read_to_string(path)
        .map_err(|e| AppError::Config(format!("cannot read {}: {e}", path.display())))?;

    let parsed: RawConfig = toml::from_str(&raw)
        .map_err(|e| AppError::Config(format!("parse error in {}: {e}", path.display())))?;

    Ok(resolve(parsed, overrides, secrets))
}

fn resolve(parsed: RawConfig, overrides: &Overrides, secrets: Secrets) -> Config {
    let b = parsed.bot;

    let data_dir = expand_home(overrides.data_dir.as_deref().unwrap_or(&b.data_dir));
    let log_level = overrides.log_level.clone().unwrap_or(b.log_level);

    let store_file = {
        let p = expand_home(&parsed.store.file);
        if p.is_absolute() { p } else { data_dir.join(p) }
    };

    let s = parsed.sources;
    let endpoint = |raw: RawEndpoint, base: &str, limit: usize| EndpointConfig {
        api_base_url: raw
            .api_base_url
            .unwrap_or_else(|| base.to_string())
            .trim_end_matches('/')
            .to_string(),
        limit: raw.limit.unwrap_or(limit).max(1),
    };

    Config {
        bot_name: b.name,
        data_dir,
        log_level,
        store_file,
        comms: CommsConfig {
            pty: PtyConfig { enabled: parsed.comms.pty.enabled },
            telegram: TelegramConfig { enabled: parsed.comms.telegram.enabled },
        },
        commands: CommandsConfig { admin_user_id: parsed.commands.admin_user_id },
        sources: SourcesConfig {
            chain: s.chain,
            timeout_seconds: s.timeout_seconds,
            comicvine: endpoint(s.comicvine, raw::COMICVINE_BASE_URL, 1),
            marvel: endpoint(s.marvel, raw::MARVEL_BASE_URL, 1),
            superhero: endpoint(s.superhero, raw::SUPERHERO_BASE_URL, 3),
            jikan: endpoint(s.jikan, raw::JIKAN_BASE_URL, 3),
        },
        fallback: FallbackConfig { enabled: parsed.fallback.enabled },
        llm: LlmConfig {
            provider: parsed.llm.provider,
            openai: OpenAiConfig {
                api_base_url: parsed.llm.openai.api_base_url,
                model: parsed.llm.openai.model,
                temperature: parsed.llm.openai.temperature,
                timeout_seconds: parsed.llm.openai.timeout_seconds,
                max_tokens: parsed.llm.openai.max_tokens,
            },
        },
        secrets,
    }
}

impl Config {
    /// Fail startup when an enabled component lacks its credential.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.comms_telegram_should_load() && self.secrets.telegram_bot_token.is_none() {
            return Err(AppError::Config(
                "telegram channel enabled but TELEGRAM_BOT_TOKEN is not set".into(),
            ));
        }

        for id in &self.sources.chain {
            let missing = match id {
                SourceId::ComicVine => self.secrets.comicvine_api_key.is_none().then_some("COMICVINE_API_KEY"),
                SourceId::Marvel => {
                    if self.secrets.marvel_public_key.is_none() {
                        Some("MARVEL_PUBLIC_KEY")
                    } else if self.secrets.marvel_private_key.is_none() {
                        Some("MARVEL_PRIVATE_KEY")
                    } else {
                        None
                    }
                }
                SourceId::SuperHero => self.secrets.superhero_api_token.is_none().then_some("SUPERHERO_API_TOKEN"),
            };
            if let Some(var) = missing {
                return Err(AppError::Config(format!(
                    "source '{}' is in the chain but {var} is not set",
                    id.as_str()
                )));
            }
        }

        if self.fallback.enabled && self.llm.provider == "openai" && self.secrets.llm_api_key.is_none() {
            return Err(AppError::Config(
                "llm provider 'openai' requires LLM_API_KEY (use 'openai-compatible' for keyless servers)".into(),
            ));
        }

        Ok(())
    }
}

/// Expand a leading `~` to the user's home directory.
/// Absolute or relative paths without `~` are returned unchanged.
pub fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    }
    PathBuf::from(path)
}
