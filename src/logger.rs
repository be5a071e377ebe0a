//! Logging setup via `tracing-subscriber`, written to stderr.
//!
//! Precedence: CLI `-v` flags, then `RUST_LOG`, then the configured level.

use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::Directive;

use crate::error::AppError;

/// HTTP plumbing under the lookup sources logs every connection at debug.
const QUIET_CRATES: &[&str] = &["hyper_util=warn", "h2=warn", "rustls=warn"];

/// Install the global subscriber. Call once.
///
/// `configured` is the config file level (or any `EnvFilter` directive such
/// as `"hero_bot=debug"`); `cli` is the level picked by `-v` flags.
pub fn init(configured: &str, cli: Option<&str>) -> Result<(), AppError> {
    let filter = build_filter(configured, cli)?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| AppError::Logger(format!("failed to set subscriber: {e}")))
}

fn build_filter(configured: &str, cli: Option<&str>) -> Result<EnvFilter, AppError> {
    let base = match cli {
        Some(level) => EnvFilter::try_new(level)
            .map_err(|e| AppError::Logger(format!("invalid log level '{level}': {e}")))?,
        None => EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(configured))
            .map_err(|e| AppError::Logger(format!("invalid log level '{configured}': {e}")))?,
    };

    QUIET_CRATES.iter().try_fold(base, |filter, directive| {
        let directive: Directive = directive
            .parse()
            .map_err(|e| AppError::Logger(format!("bad directive '{directive}': {e}")))?;
        Ok(filter.add_directive(directive))
    })
}

/// Parse a bare level name (`"error"` … `"trace"`, `"off"`).
pub fn parse_level(level: &str) -> Result<LevelFilter, AppError> {
    if level.trim().is_empty() {
        return Err(AppError::Logger("log level must not be empty".into()));
    }
    level
        .trim()
        .parse::<LevelFilter>()
        .map_err(|_| AppError::Logger(format!("unrecognised log level: '{level}'")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_levels_parse() {
        assert_eq!(parse_level("debug").unwrap(), LevelFilter::DEBUG);
        assert_eq!(parse_level(" warn ").unwrap(), LevelFilter::WARN);
        assert!(parse_level("verbose").is_err());
        assert!(parse_level("").is_err());
    }

    #[test]
    fn cli_level_is_used_verbatim() {
        let filter = build_filter("info", Some("trace")).unwrap();
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::TRACE));
    }

    #[test]
    fn invalid_cli_level_is_an_error() {
        assert!(matches!(build_filter("info", Some("hero_bot=loud")), Err(AppError::Logger(_))));
    }

    #[test]
    fn init_succeeds_or_is_already_set() {
        match init("info", None) {
            Ok(()) => {}
            Err(AppError::Logger(msg)) if msg.contains("set subscriber") => {}
            Err(e) => panic!("unexpected error: {e}"),
        }
    }
}
