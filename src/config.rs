/// Application configuration
///
/// Defaults match the behaviour of the hosted portal. Each value can be
/// overridden through an environment variable so the app can be pointed
/// at a scratch data directory or a custom report file.
use std::path::PathBuf;
use std::time::Duration;

use tracing::{warn, Level};

/// Overrides the directory holding `medisetu.db`
pub const ENV_DATA_DIR: &str = "MEDISETU_DATA_DIR";
/// Overrides the simulated network latency of the report fetch
pub const ENV_FETCH_DELAY_MS: &str = "MEDISETU_FETCH_DELAY_MS";
/// Points at a JSON file replacing the bundled report set
pub const ENV_REPORTS_FILE: &str = "MEDISETU_REPORTS";
/// Default log level when `RUST_LOG` is unset
pub const ENV_LOG: &str = "MEDISETU_LOG";
/// Address fragment to open at start, e.g. `#report-104`
pub const ENV_ROUTE: &str = "MEDISETU_ROUTE";

const DEFAULT_FETCH_DELAY: Duration = Duration::from_millis(800);
const DEFAULT_TOAST_DURATION: Duration = Duration::from_secs(3);
const DB_FILE_NAME: &str = "medisetu.db";

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Directory that holds the key-value database
    pub data_dir: PathBuf,
    /// Delay before the report fetch completes
    pub fetch_delay: Duration,
    /// How long a toast stays on screen
    pub toast_duration: Duration,
    /// Optional JSON file with the report collection
    pub reports_file: Option<PathBuf>,
    /// Deep link used for the first route derivation
    pub initial_fragment: String,
    pub log_level: Level,
}

impl AppConfig {
    /// Build the configuration from defaults and the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable lookup.
    /// Values that do not parse are ignored with a warning.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let data_dir = match lookup(ENV_DATA_DIR) {
            Some(dir) if !dir.trim().is_empty() => PathBuf::from(dir),
            _ => default_data_dir(),
        };

        let fetch_delay = parse_override(&lookup, ENV_FETCH_DELAY_MS, |ms| ms.parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_FETCH_DELAY);

        let reports_file = lookup(ENV_REPORTS_FILE)
            .filter(|path| !path.trim().is_empty())
            .map(PathBuf::from);

        Self {
            data_dir,
            fetch_delay,
            toast_duration: DEFAULT_TOAST_DURATION,
            reports_file,
            initial_fragment: lookup(ENV_ROUTE).unwrap_or_default(),
            log_level: log_level_from(&lookup),
        }
    }

    /// Path of the SQLite file backing the key-value surface
    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join(DB_FILE_NAME)
    }
}

/// Log level from `MEDISETU_LOG`, read on its own so logging can be
/// installed before the rest of the configuration is built.
pub fn log_level_from(lookup: &impl Fn(&str) -> Option<String>) -> Level {
    parse_override(lookup, ENV_LOG, |level| level.parse::<Level>().ok()).unwrap_or(Level::INFO)
}

/// Read `key` and parse it, warning when it is set but unusable
fn parse_override<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    parse: impl Fn(&str) -> Option<T>,
) -> Option<T> {
    let raw = lookup(key)?;
    let parsed = parse(raw.trim());
    if parsed.is_none() {
        warn!(variable = key, value = %raw, "ignoring unparseable override");
    }
    parsed
}

/// Get the directory where application data should be stored
/// - Linux: ~/.local/share/medisetu
/// - macOS: ~/Library/Application Support/medisetu
/// - Windows: %APPDATA%\medisetu
///
/// Falls back to the temp directory when no user directory is known.
fn default_data_dir() -> PathBuf {
    let mut path = dirs::data_dir().or_else(dirs::home_dir).unwrap_or_else(|| {
        warn!("no user data directory, keeping data in the temp directory");
        std::env::temp_dir()
    });
    path.push("medisetu");
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_overrides_are_applied() {
        let config = AppConfig::from_lookup(lookup(&[
            (ENV_DATA_DIR, "/tmp/medisetu-test"),
            (ENV_FETCH_DELAY_MS, "25"),
            (ENV_REPORTS_FILE, "/tmp/reports.json"),
            (ENV_LOG, "debug"),
            (ENV_ROUTE, "#report-104"),
        ]));

        assert_eq!(config.data_dir, PathBuf::from("/tmp/medisetu-test"));
        assert_eq!(config.db_path(), PathBuf::from("/tmp/medisetu-test/medisetu.db"));
        assert_eq!(config.fetch_delay, Duration::from_millis(25));
        assert_eq!(config.reports_file, Some(PathBuf::from("/tmp/reports.json")));
        assert_eq!(config.log_level, Level::DEBUG);
        assert_eq!(config.initial_fragment, "#report-104");
    }

    /// Collects formatted log output for assertions
    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl Captured {
        fn text(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    #[test]
    fn test_garbage_values_are_reported() {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();

        let config = tracing::subscriber::with_default(subscriber, || {
            AppConfig::from_lookup(lookup(&[
                (ENV_DATA_DIR, "/tmp/medisetu-test"),
                (ENV_FETCH_DELAY_MS, "soon"),
                (ENV_LOG, "loud"),
            ]))
        });

        assert_eq!(config.fetch_delay, DEFAULT_FETCH_DELAY);
        let output = captured.text();
        assert!(output.contains(ENV_FETCH_DELAY_MS), "{output}");
        assert!(output.contains(ENV_LOG), "{output}");
        assert!(output.contains("soon"), "{output}");
    }

    #[test]
    fn test_log_level_read_alone() {
        assert_eq!(log_level_from(&lookup(&[(ENV_LOG, " warn ")])), Level::WARN);
        assert_eq!(log_level_from(&lookup(&[])), Level::INFO);
    }

    #[test]
    fn test_garbage_values_fall_back_to_defaults() {
        let config = AppConfig::from_lookup(lookup(&[
            (ENV_DATA_DIR, "/tmp/medisetu-test"),
            (ENV_FETCH_DELAY_MS, "soon"),
            (ENV_LOG, "loud"),
        ]));

        assert_eq!(config.fetch_delay, DEFAULT_FETCH_DELAY);
        assert_eq!(config.toast_duration, DEFAULT_TOAST_DURATION);
        assert_eq!(config.reports_file, None);
        assert_eq!(config.log_level, Level::INFO);
        assert_eq!(config.initial_fragment, "");
    }
}
