//! Telegram channel: long-polls the Bot API with `teloxide` and answers
//! each text message through the [`Dispatcher`](crate::commands::Dispatcher).
//!
//! Replies with an image go out as a photo, captioned when the text fits in
//! a caption. Links become an inline URL keyboard on the last message.

use std::sync::Arc;

use reqwest::Url;
use teloxide::prelude::*;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup, InputFile};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::{MAX_MESSAGE_LENGTH, chunk_text};
use crate::commands::Dispatcher as CommandDispatcher;
use crate::error::AppError;
use crate::format::Reply;
use crate::runtime::{Component, ComponentFuture};

/// Telegram caps photo captions at 1024 characters.
const MAX_CAPTION_LENGTH: usize = 1024;

pub struct TelegramChannel {
    channel_id: String,
    token: String,
    dispatcher: Arc<CommandDispatcher>,
}

impl TelegramChannel {
    pub fn new(
        channel_id: impl Into<String>,
        token: impl Into<String>,
        dispatcher: Arc<CommandDispatcher>,
    ) -> Self {
        Self { channel_id: channel_id.into(), token: token.into(), dispatcher }
    }
}

impl Component for TelegramChannel {
    fn id(&self) -> &str {
        &self.channel_id
    }

    fn run(self: Box<Self>, shutdown: CancellationToken) -> ComponentFuture {
        Box::pin(run_telegram(*self, shutdown))
    }
}

async fn run_telegram(channel: TelegramChannel, shutdown: CancellationToken) -> Result<(), AppError> {
    let TelegramChannel { channel_id, token, dispatcher } = channel;
    info!(%channel_id, "telegram channel starting");

    let bot = Bot::new(token);
    let handler_channel = channel_id.clone();
    let handler = Update::filter_message().endpoint(move |bot: Bot, msg: Message| {
        let dispatcher = dispatcher.clone();
        let channel_id = handler_channel.clone();
        async move {
            let Some(text) = msg.text() else {
                return respond(());
            };
            let caller = msg.from.as_ref().map(|u| u.id.0);
            debug!(%channel_id, ?caller, chat = msg.chat.id.0, "telegram received message");

            for reply in dispatcher.handle_text(caller, text).await {
                send_reply(&bot, msg.chat.id, reply).await;
            }
            respond(())
        }
    });

    let mut tg_dispatcher = Dispatcher::builder(bot, handler).build();

    tokio::select! {
        biased;

        _ = shutdown.cancelled() => {
            info!(%channel_id, "shutdown signal received, closing telegram channel");
        }
        _ = tg_dispatcher.dispatch() => {
            warn!(%channel_id, "telegram dispatcher exited unexpectedly");
        }
    }

    Ok(())
}

/// Inline keyboard with one URL button per row. `None` when no link parses.
fn keyboard(reply: &Reply) -> Option<InlineKeyboardMarkup> {
    let rows: Vec<Vec<InlineKeyboardButton>> = reply
        .links
        .iter()
        .filter_map(|link| {
            let url = Url::parse(&link.url).ok()?;
            Some(vec![InlineKeyboardButton::url(link.label.clone(), url)])
        })
        .collect();
    (!rows.is_empty()).then(|| InlineKeyboardMarkup::new(rows))
}

async fn send_reply(bot: &Bot, chat_id: ChatId, reply: Reply) {
    let markup = keyboard(&reply);
    let text = if reply.text.is_empty() { "(empty response)".to_string() } else { reply.text.clone() };

    if let Some(image) = reply.image.as_deref().and_then(|i| Url::parse(i).ok()) {
        let fits = text.chars().count() <= MAX_CAPTION_LENGTH;
        let mut request = bot.send_photo(chat_id, InputFile::url(image));
        if fits {
            request = request.caption(text.clone());
            if let Some(markup) = markup.clone() {
                request = request.reply_markup(markup);
            }
        }
        match request.await {
            Ok(_) if fits => return,
            Ok(_) => {}
            Err(e) => warn!(chat = chat_id.0, "failed to send telegram photo, falling back to text: {e}"),
        }
    }

    let chunks = chunk_text(&text, MAX_MESSAGE_LENGTH);
    let last = chunks.len().saturating_sub(1);
    for (i, chunk) in chunks.into_iter().enumerate() {
        let mut request = bot.send_message(chat_id, chunk);
        if i == last {
            if let Some(markup) = markup.clone() {
                request = request.reply_markup(markup);
            }
        }
        if let Err(e) = request.await {
            warn!(chat = chat_id.0, "failed to send telegram reply: {e}");
        }
    }
}
