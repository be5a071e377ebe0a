//! hero-bot: a chat bot that looks up superheroes and anime.
//!
//! A query walks the custom store, then the structured sources in configured
//! order, then an LLM fallback; the first hit is formatted and sent back
//! through whichever channel the command arrived on.

pub mod candidate;
pub mod commands;
pub mod comms;
pub mod config;
pub mod error;
pub mod format;
pub mod llm;
pub mod logger;
pub mod resolve;
pub mod runtime;
pub mod sources;
pub mod store;
