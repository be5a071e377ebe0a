//! Console channel: reads commands from stdin and prints replies.
//!
//! Accepts the same commands as the chat channels, with or without the
//! leading `/`. Runs until shutdown is cancelled (Ctrl-C) or stdin closes.

use std::io::Write as _;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::render_plain;
use crate::commands::{Command, Dispatcher};
use crate::error::AppError;
use crate::runtime::{Component, ComponentFuture};

pub struct PtyChannel {
    channel_id: String,
    dispatcher: Arc<Dispatcher>,
    /// The local operator acts as this user id.
    operator: Option<u64>,
}

impl PtyChannel {
    pub fn new(
        channel_id: impl Into<String>,
        dispatcher: Arc<Dispatcher>,
        operator: Option<u64>,
    ) -> Self {
        Self { channel_id: channel_id.into(), dispatcher, operator }
    }
}

impl Component for PtyChannel {
    fn id(&self) -> &str {
        &self.channel_id
    }

    fn run(self: Box<Self>, shutdown: CancellationToken) -> ComponentFuture {
        Box::pin(run_pty(*self, shutdown))
    }
}

async fn run_pty(channel: PtyChannel, shutdown: CancellationToken) -> Result<(), AppError> {
    let PtyChannel { channel_id, dispatcher, operator } = channel;
    info!(%channel_id, "pty channel started");
    println!("─────────────────────────────────");
    println!(" hero-bot console  (Ctrl-C to quit)");
    println!(" type 'help' for commands");
    println!("─────────────────────────────────");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("> ");
        let _ = std::io::stdout().flush();

        tokio::select! {
            biased;

            _ = shutdown.cancelled() => {
                println!();
                info!(%channel_id, "pty channel shutting down");
                break;
            }

            line = lines.next_line() => {
                let input = match line {
                    Ok(Some(input)) => input,
                    Ok(None) => {
                        info!(%channel_id, "pty stdin closed");
                        break;
                    }
                    Err(e) => {
                        warn!(%channel_id, "pty read error: {e}");
                        break;
                    }
                };
                if input.trim().is_empty() {
                    continue;
                }
                debug!(%channel_id, input = %input.trim(), "pty received line");

                let Some(command) = Command::parse_console(&input) else {
                    continue;
                };
                for reply in dispatcher.handle(operator, command).await {
                    println!("{}\n", render_plain(&reply));
                }
            }
        }
    }

    Ok(())
}
