//! Command dispatcher: maps chat commands onto the resolver, the custom
//! store and the formatter.
//!
//! Transport-independent: channels hand in the raw message text plus the
//! caller's user id and get back the [`Reply`]s to send, in order.

use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{debug, error, info, warn};

use crate::config::CommandsConfig;
use crate::error::AppError;
use crate::format::{Reply, format_all};
use crate::resolve::{Resolution, Resolver};
use crate::sources::value_text;
use crate::store::{CustomEntry, EntryStore};

pub const HELP_TEXT: &str = "\
Hero lookup bot

/hero <name> - look up a superhero (alias: /search)
/anime <title> - look up an anime (top 3 results)
/addhero Name|Description|ImageURL - add a custom hero
    (a JSON object with \"name\" and \"summary\" also works)
/searchcustom <name> - search custom heroes only
/listcustom - list all custom heroes
/help - show this message";

const ADDHERO_USAGE: &str =
    "Usage: /addhero Name|Description|ImageURL (image optional) or a JSON object with \"name\" and \"summary\".";

// ── Command ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Hero(String),
    Anime(String),
    AddHero(String),
    SearchCustom(String),
    ListCustom,
    Unknown(String),
}

impl Command {
    /// Parse `/cmd args` or `/cmd@BotName args`.
    ///
    /// Text without a leading slash is a hero lookup, even when its first
    /// word names a command. Returns `None` for blank input.
    pub fn parse(text: &str) -> Option<Self> {
        Self::parse_with(text, false)
    }

    /// Like [`Command::parse`], but bare `cmd args` also counts as a command.
    /// Only the operator console reads input this way.
    pub fn parse_console(text: &str) -> Option<Self> {
        Self::parse_with(text, true)
    }

    fn parse_with(text: &str, bare_commands: bool) -> Option<Self> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        let slashed = text.strip_prefix('/');
        if slashed.is_none() && !bare_commands {
            return Some(Command::Hero(text.to_string()));
        }
        let rest = slashed.unwrap_or(text);

        let (head, args) = match rest.split_once(char::is_whitespace) {
            Some((head, args)) => (head, args.trim().to_string()),
            None => (rest, String::new()),
        };
        let name = head.split('@').next().unwrap_or(head).to_lowercase();

        match (Self::named(&name, args), slashed) {
            (Some(command), _) => Some(command),
            (None, Some(_)) => Some(Command::Unknown(name)),
            (None, None) => Some(Command::Hero(text.to_string())),
        }
    }

    fn named(name: &str, args: String) -> Option<Self> {
        Some(match name {
            "start" | "help" => Command::Help,
            "hero" | "search" => Command::Hero(args),
            "anime" => Command::Anime(args),
            "addhero" => Command::AddHero(args),
            "searchcustom" => Command::SearchCustom(args),
            "listcustom" => Command::ListCustom,
            _ => return None,
        })
    }
}

// ── addhero payload ───────────────────────────────────────────────────────────

/// Parse an `addhero` argument: `Name|Description[|ImageURL]` or a JSON object.
pub fn parse_addhero(args: &str) -> Result<CustomEntry, AppError> {
    let args = args.trim();
    if args.is_empty() {
        return Err(AppError::Validation("missing hero details".into()));
    }
    let entry = if args.starts_with('{') {
        parse_addhero_json(args)?
    } else {
        parse_addhero_pipe(args)?
    };
    entry.validate()?;
    Ok(entry)
}

fn parse_addhero_pipe(args: &str) -> Result<CustomEntry, AppError> {
    let fields: Vec<&str> = args.split('|').map(str::trim).collect();
    match fields.as_slice() {
        [name, summary] => Ok(CustomEntry::new(*name, *summary)),
        [name, summary, image] if image.is_empty() => Ok(CustomEntry::new(*name, *summary)),
        [name, summary, image] => Ok(CustomEntry::new(*name, *summary).with_image(*image)),
        _ => Err(AppError::Validation(format!(
            "expected 2 or 3 '|'-separated fields, got {}",
            fields.len()
        ))),
    }
}

fn parse_addhero_json(args: &str) -> Result<CustomEntry, AppError> {
    let value: Value = serde_json::from_str(args)
        .map_err(|e| AppError::Validation(format!("invalid JSON: {e}")))?;
    let Value::Object(mut map) = value else {
        return Err(AppError::Validation("JSON payload must be an object".into()));
    };

    let name = take_text(&mut map, &["name"])
        .ok_or_else(|| AppError::Validation("JSON payload needs a \"name\"".into()))?;
    let summary = take_text(&mut map, &["summary", "description"])
        .ok_or_else(|| AppError::Validation("JSON payload needs a \"summary\"".into()))?;
    let image = take_text(&mut map, &["image_url", "image"]);

    let mut entry = CustomEntry::new(name, summary);
    entry.image_url = image;
    entry.extra = map
        .into_iter()
        .filter_map(|(k, v)| value_text(Some(&v)).map(|text| (k, text)))
        .collect();
    Ok(entry)
}

/// Remove every key in `keys` and return the first non-blank text among them.
fn take_text(map: &mut Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|k| map.remove(*k))
        .fold(None, |found, v| found.or_else(|| value_text(Some(&v))))
}

// ── Dispatcher ────────────────────────────────────────────────────────────────

/// Shared across channels behind `Arc`.
pub struct Dispatcher {
    resolver: Resolver,
    admin_user_id: Option<u64>,
}

impl Dispatcher {
    pub fn new(resolver: Resolver, config: &CommandsConfig) -> Self {
        Self { resolver, admin_user_id: config.admin_user_id }
    }

    /// Parse and run `text`. Blank input yields no replies.
    pub async fn handle_text(&self, caller: Option<u64>, text: &str) -> Vec<Reply> {
        match Command::parse(text) {
            Some(command) => self.handle(caller, command).await,
            None => Vec::new(),
        }
    }

    pub async fn handle(&self, caller: Option<u64>, command: Command) -> Vec<Reply> {
        debug!(?caller, ?command, "dispatching command");
        match command {
            Command::Help => vec![Reply::text(HELP_TEXT)],
            Command::Hero(query) => self.hero(&query).await,
            Command::Anime(query) => self.anime(&query).await,
            Command::AddHero(args) => vec![self.add_hero(caller, &args).await],
            Command::SearchCustom(query) => self.search_custom(&query),
            Command::ListCustom => vec![self.list_custom()],
            Command::Unknown(name) => {
                vec![Reply::text(format!("Unknown command /{name}. Try /help."))]
            }
        }
    }

    async fn hero(&self, query: &str) -> Vec<Reply> {
        if query.trim().is_empty() {
            return vec![Reply::text("Usage: /hero <name>")];
        }
        match self.resolver.resolve_hero(query).await {
            Resolution::Matched { candidates, .. } => format_all(&candidates),
            Resolution::NotFound => {
                vec![Reply::text(format!("No hero found for '{}'.", query.trim()))]
            }
        }
    }

    async fn anime(&self, query: &str) -> Vec<Reply> {
        if query.trim().is_empty() {
            return vec![Reply::text("Usage: /anime <title>")];
        }
        match self.resolver.resolve_anime(query).await {
            Resolution::Matched { candidates, .. } => format_all(&candidates),
            Resolution::NotFound => {
                vec![Reply::text(format!("No anime found for '{}'.", query.trim()))]
            }
        }
    }

    fn authorize(&self, caller: Option<u64>) -> Result<(), AppError> {
        match self.admin_user_id {
            None => Ok(()),
            Some(admin) if caller == Some(admin) => Ok(()),
            Some(_) => Err(AppError::Unauthorized(format!(
                "user {} may not add heroes",
                caller.map(|c| c.to_string()).unwrap_or_else(|| "<unknown>".into())
            ))),
        }
    }

    async fn add_hero(&self, caller: Option<u64>, args: &str) -> Reply {
        if let Err(e) = self.authorize(caller) {
            warn!(?caller, error = %e, "addhero rejected");
            return Reply::text("Sorry, you are not allowed to add heroes.");
        }

        let mut entry = match parse_addhero(args) {
            Ok(entry) => entry,
            Err(e) => return Reply::text(format!("{e}\n{ADDHERO_USAGE}")),
        };
        entry.added_by = caller.map(|c| c.to_string());
        entry.added_at = Some(chrono::Utc::now().to_rfc3339());
        let name = entry.name.clone();

        let store: Arc<dyn EntryStore> = self.resolver.store().clone();
        match tokio::task::spawn_blocking(move || store.append(entry)).await {
            Ok(Ok(())) => {
                info!(?caller, %name, "custom hero added");
                Reply::text(format!("Added hero '{name}'."))
            }
            Ok(Err(e @ AppError::Validation(_))) => Reply::text(format!("{e}\n{ADDHERO_USAGE}")),
            Ok(Err(e)) => {
                error!(%name, error = %e, "failed to save custom hero");
                Reply::text("Could not save the hero, please try again later.")
            }
            Err(e) => {
                error!(%name, error = %e, "custom hero save task failed");
                Reply::text("Could not save the hero, please try again later.")
            }
        }
    }

    fn search_custom(&self, query: &str) -> Vec<Reply> {
        if query.trim().is_empty() {
            return vec![Reply::text("Usage: /searchcustom <name>")];
        }
        match self.resolver.store().lookup_substring(query) {
            Ok(entries) if entries.is_empty() => {
                vec![Reply::text(format!("No custom heroes match '{}'.", query.trim()))]
            }
            Ok(entries) => {
                let candidates: Vec<_> =
                    entries.iter().filter_map(CustomEntry::to_candidate).collect();
                format_all(&candidates)
            }
            Err(e) => {
                error!(%query, error = %e, "custom search failed");
                vec![Reply::text("Custom hero search is unavailable right now.")]
            }
        }
    }

    fn list_custom(&self) -> Reply {
        match self.resolver.store().list_all() {
            Ok(entries) if entries.is_empty() => Reply::text("No custom heroes yet."),
            Ok(entries) => {
                let mut text = format!("Custom heroes ({}):", entries.len());
                for (i, e) in entries.iter().enumerate() {
                    text.push_str(&format!("\n{}. {}: {}", i + 1, e.name, e.summary));
                }
                Reply::text(text)
            }
            Err(e) => {
                error!(error = %e, "custom list failed");
                Reply::text("Custom hero list is unavailable right now.")
            }
        }
    }
}
