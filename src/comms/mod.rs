//! Chat channels: the transports that carry commands in and replies out.
//!
//! Each channel implements [`Component`] and is spawned by [`start`] through
//! [`spawn_components`]. Channels capture an `Arc<Dispatcher>` at
//! construction; everything else (parsing, lookup, formatting) happens there.

#[cfg(feature = "channel-pty")]
pub mod pty;
#[cfg(feature = "channel-telegram")]
pub mod telegram;

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::commands::Dispatcher;
use crate::config::Config;
use crate::format::Reply;
use crate::runtime::{Component, RuntimeHandle, spawn_components};

/// Telegram rejects messages over 4096 characters; stay below that.
pub const MAX_MESSAGE_LENGTH: usize = 4000;

// ── start ─────────────────────────────────────────────────────────────────────

/// Spawn every configured channel. Returns as soon as the tasks are running.
pub fn start(
    config: &Config,
    dispatcher: Arc<Dispatcher>,
    shutdown: CancellationToken,
) -> Result<RuntimeHandle, crate::error::AppError> {
    let mut components: Vec<Box<dyn Component>> = Vec::new();

    if config.comms_pty_should_load() {
        #[cfg(feature = "channel-pty")]
        {
            info!("loading pty channel");
            components.push(Box::new(pty::PtyChannel::new(
                "pty0",
                dispatcher.clone(),
                config.commands.admin_user_id,
            )));
        }
        #[cfg(not(feature = "channel-pty"))]
        tracing::warn!("pty channel enabled but built without the channel-pty feature");
    }

    if config.comms_telegram_should_load() {
        #[cfg(feature = "channel-telegram")]
        {
            let token = config.secrets.telegram_bot_token.clone().ok_or_else(|| {
                crate::error::AppError::Config("TELEGRAM_BOT_TOKEN is not set".into())
            })?;
            info!("loading telegram channel");
            components.push(Box::new(telegram::TelegramChannel::new(
                "telegram0",
                token,
                dispatcher.clone(),
            )));
        }
        #[cfg(not(feature = "channel-telegram"))]
        tracing::warn!("telegram channel enabled but built without the channel-telegram feature");
    }

    if components.is_empty() {
        info!("no channels configured, waiting for shutdown");
    }
    drop(dispatcher);

    Ok(spawn_components(components, shutdown))
}

// ── shared rendering helpers ──────────────────────────────────────────────────

/// Split `text` into pieces of at most `max` characters, never inside a
/// character. Prefers breaking after a newline when one is close to the limit.
pub fn chunk_text(text: &str, max: usize) -> Vec<String> {
    let max = max.max(1);
    let mut chunks = Vec::new();
    let mut rest = text;

    while rest.chars().count() > max {
        let hard = rest.char_indices().nth(max).map(|(i, _)| i).unwrap_or(rest.len());
        let cut = match rest[..hard].rfind('\n') {
            Some(nl) if nl >= hard / 2 => nl + 1,
            _ => hard,
        };
        chunks.push(rest[..cut].to_string());
        rest = &rest[cut..];
    }
    if !rest.is_empty() || chunks.is_empty() {
        chunks.push(rest.to_string());
    }
    chunks
}

/// Plain-text rendering for channels without rich media: the reply text,
/// then the image and each link on its own line.
pub fn render_plain(reply: &Reply) -> String {
    let mut out = reply.text.clone();
    if let Some(image) = &reply.image {
        out.push_str(&format!("\nImage: {image}"));
    }
    for link in &reply.links {
        if reply.image.as_deref() == Some(link.url.as_str()) {
            continue;
        }
        out.push_str(&format!("\n{}: {}", link.label, link.url));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::candidate::Link;

    #[test]
    fn short_text_is_one_chunk() {
        assert_eq!(chunk_text("hello", 10), vec!["hello"]);
        assert_eq!(chunk_text("", 10), vec![""]);
    }

    #[test]
    fn long_text_splits_on_char_boundaries() {
        let text = "é".repeat(9);
        let chunks = chunk_text(&text, 4);
        assert_eq!(chunks, vec!["éééé", "éééé", "é"]);
        assert_eq!(chunks.concat(), text);
    }

    #[test]
    fn prefers_newline_near_limit() {
        let chunks = chunk_text("aaaaaaa\nbbbbbb", 10);
        assert_eq!(chunks, vec!["aaaaaaa\n", "bbbbbb"]);
    }

    #[test]
    fn every_chunk_respects_limit() {
        let text = "line of text\n".repeat(1000);
        let chunks = chunk_text(&text, MAX_MESSAGE_LENGTH);
        assert!(chunks.len() > 1);
        assert!(chunks.iter().all(|c| c.chars().count() <= MAX_MESSAGE_LENGTH));
        assert_eq!(chunks.concat(), text);
    }

    #[test]
    fn plain_rendering_lists_image_and_links_once() {
        let reply = Reply {
            text: "Foo".into(),
            image: Some("http://img".into()),
            links: vec![Link::new("Image", "http://img"), Link::new("Search the web", "http://s")],
        };
        assert_eq!(render_plain(&reply), "Foo\nImage: http://img\nSearch the web: http://s");
    }
}
