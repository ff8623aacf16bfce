//! Logging setup using `tracing` and `tracing-subscriber`.
//!
//! - `error`: storage failures that lose user state
//! - `warn`: recoverable failures (storage writes, bad report data)
//! - `info`: screen transitions, login/logout, fetch completion
//! - `debug`: projections, history replays, guard corrections
//!
//! Patient identifiers are never written verbatim; use [`redact_token`].

use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Configuration for logging behavior.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Log level used when `RUST_LOG` is unset.
    pub level: Level,
    pub with_target: bool,
    pub with_ansi: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            with_target: false,
            with_ansi: true,
        }
    }
}

impl LogConfig {
    #[must_use]
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }
}

/// Install the global subscriber. Calling it twice is harmless; the second
/// call leaves the first subscriber in place.
pub fn init_logging(config: &LogConfig) {
    let layer = fmt::layer()
        .compact()
        .with_writer(std::io::stderr)
        .with_ansi(config.with_ansi)
        .with_target(config.with_target);

    let _ = tracing_subscriber::registry()
        .with(build_env_filter(config.level))
        .with(layer)
        .try_init();
}

/// Build an `EnvFilter` from the given level, respecting `RUST_LOG`.
fn build_env_filter(level: Level) -> EnvFilter {
    let level_str = level.as_str().to_lowercase();

    // External crates (wgpu, winit, cosmic-text) stay at warn
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,medisetu={level_str}")))
}

/// Mask a session token for log output, keeping only its last two characters.
pub fn redact_token(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() <= 2 {
        return "*".repeat(chars.len());
    }
    let visible: String = chars[chars.len() - 2..].iter().collect();
    format!("{}{}", "*".repeat(chars.len() - 2), visible)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redact_token_keeps_tail() {
        assert_eq!(redact_token("98765"), "***65");
        assert_eq!(redact_token("ab"), "**");
        assert_eq!(redact_token(""), "");
    }

    #[test]
    fn test_init_logging_twice_does_not_panic() {
        let config = LogConfig::default().with_level(Level::DEBUG);
        init_logging(&config);
        init_logging(&config);
    }
}
