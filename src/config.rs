//! Credentials, paths and the tracked-channel list.
//!
//! Settings come from config.yml in the working directory (or its parent),
//! with `${VAR}` placeholders and TELEGRAM_* variables resolved from the
//! environment.

use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::channel::normalize_channel_id;

/// Fallbacks used when config.yml is absent or silent
pub const SESSION_NAME: &str = "tracker_session";
pub const LOCK_FILE: &str = "tracker_session.lock";
pub const LOGS_DIR: &str = "logs";
pub const REPORT_FILE: &str = "sources.txt";
/// Existing logs above this size are treated as complete and not re-fetched
pub const MIN_LOG_BYTES: u64 = 1000;
/// 0 means no limit: fetch the full channel history
pub const DEFAULT_LIMIT: usize = 0;
pub const CI_LIMIT: usize = 1000;

/// A channel to track: either a numeric ID or a public username
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelRef {
    /// Channel by bare numeric ID
    Id(i64),
    /// Channel by username (without @)
    Username(String),
}

impl ChannelRef {
    /// Channel by ID. Marked `-100...` IDs are normalized to the bare form.
    pub fn id(id: i64) -> Self {
        ChannelRef::Id(normalize_channel_id(id))
    }

    pub fn username(name: &str) -> Self {
        let name = name.strip_prefix('@').unwrap_or(name);
        ChannelRef::Username(name.to_string())
    }

    /// Parse a CLI/config value: numeric strings become IDs, the rest
    /// are treated as usernames.
    pub fn parse(input: &str) -> Self {
        let trimmed = input.trim();
        match trimmed.parse::<i64>() {
            Ok(id) => ChannelRef::id(id),
            Err(_) => ChannelRef::username(trimmed),
        }
    }
}

impl fmt::Display for ChannelRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelRef::Id(id) => write!(f, "{}", id),
            ChannelRef::Username(name) => write!(f, "@{}", name),
        }
    }
}

/// Raw shape of config.yml before resolution against the environment.
#[derive(Debug, Deserialize)]
struct FileConfig {
    telegram: Option<TelegramSection>,
    scraper: Option<ScraperSection>,
    limits: Option<LimitsSection>,
    channels: Option<Vec<serde_yaml::Value>>,
}

#[derive(Debug, Default, Deserialize)]
struct TelegramSection {
    #[serde(default, deserialize_with = "deserialize_string_or_number")]
    api_id: Option<String>,
    api_hash: Option<String>,
    phone: Option<String>,
    session_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ScraperSection {
    logs_dir: Option<PathBuf>,
    report_file: Option<PathBuf>,
    min_log_bytes: Option<u64>,
    overwrite: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
struct LimitsSection {
    default: Option<usize>,
    ci: Option<usize>,
}

/// Accept both `api_id: 12345` and `api_id: "12345"` in the YAML.
fn deserialize_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error;
    let value = Option::<serde_yaml::Value>::deserialize(deserializer)?;
    value
        .map(|v| match v {
            serde_yaml::Value::String(s) => Ok(s),
            serde_yaml::Value::Number(n) => Ok(n.to_string()),
            other => Err(D::Error::custom(format!(
                "expected string or number, got {:?}",
                other
            ))),
        })
        .transpose()
}

/// Fully resolved runtime configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub phone: String,
    pub api_id: i32,
    pub api_hash: String,
    pub session_name: String,
    pub lock_file: String,
    pub logs_dir: PathBuf,
    pub report_file: PathBuf,
    pub min_log_bytes: u64,
    pub overwrite: bool,
    pub default_limit: usize,
    pub ci_limit: usize,
    pub channels: Vec<ChannelRef>,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    /// Load config.yml from the working directory or its parent, falling
    /// back to bare defaults when neither exists.
    pub fn new() -> Self {
        Self::load_from_file("config.yml")
            .or_else(|_| Self::load_from_file("../config.yml"))
            .unwrap_or_else(|_| Self::defaults())
    }

    /// Extract `VAR` from a `${VAR}` placeholder.
    fn placeholder_var(value: &str) -> Option<&str> {
        value.strip_prefix("${").and_then(|rest| rest.strip_suffix('}'))
    }

    /// Resolution order: `${VAR}` placeholder, then the well-known env key,
    /// then the raw YAML value.
    fn resolve_string(yaml_value: Option<String>, env_key: &str) -> String {
        if let Some(from_env) = yaml_value
            .as_deref()
            .and_then(Self::placeholder_var)
            .and_then(|name| std::env::var(name).ok())
        {
            return from_env;
        }
        match std::env::var(env_key) {
            Ok(from_env) => from_env,
            Err(_) => yaml_value.unwrap_or_default(),
        }
    }

    fn resolve_i32(yaml_value: Option<String>, env_key: &str) -> i32 {
        if let Some(v) = yaml_value {
            if let Some(parsed) = Self::placeholder_var(&v)
                .and_then(|name| std::env::var(name).ok())
                .and_then(|raw| raw.parse().ok())
            {
                return parsed;
            }
            // Literal numbers in the YAML win over the environment
            if let Ok(parsed) = v.parse() {
                return parsed;
            }
        }
        std::env::var(env_key)
            .ok()
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(0)
    }

    /// Pull a .env file into the process environment, if one is around.
    fn load_dotenv() {
        let _ = dotenvy::dotenv().or_else(|_| dotenvy::from_filename("../.env"));
    }

    /// Entries that are neither numbers nor strings are skipped.
    fn parse_channel_list(values: Vec<serde_yaml::Value>) -> Vec<ChannelRef> {
        values
            .into_iter()
            .filter_map(|value| match value {
                serde_yaml::Value::Number(n) => n.as_i64().map(ChannelRef::id),
                serde_yaml::Value::String(s) => Some(ChannelRef::parse(&s)),
                _ => None,
            })
            .collect()
    }

    /// Read one YAML file and resolve every field against the environment.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        Self::load_dotenv();

        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| format!("Cannot read {}: {}", path.display(), e))?;
        let yaml: FileConfig = serde_yaml::from_str(&content)
            .map_err(|e| format!("Invalid YAML in {}: {}", path.display(), e))?;

        let telegram = yaml.telegram.unwrap_or_default();
        let scraper = yaml.scraper.unwrap_or_default();
        let limits = yaml.limits.unwrap_or_default();
        let channels = Self::parse_channel_list(yaml.channels.unwrap_or_default());

        Ok(Self {
            phone: Self::resolve_string(telegram.phone, "TELEGRAM_PHONE"),
            api_id: Self::resolve_i32(telegram.api_id, "TELEGRAM_API_ID"),
            api_hash: Self::resolve_string(telegram.api_hash, "TELEGRAM_API_HASH"),
            session_name: telegram
                .session_name
                .unwrap_or_else(|| SESSION_NAME.to_string()),
            lock_file: LOCK_FILE.to_string(),
            logs_dir: scraper.logs_dir.unwrap_or_else(|| PathBuf::from(LOGS_DIR)),
            report_file: scraper
                .report_file
                .unwrap_or_else(|| PathBuf::from(REPORT_FILE)),
            min_log_bytes: scraper.min_log_bytes.unwrap_or(MIN_LOG_BYTES),
            overwrite: scraper.overwrite.unwrap_or(false),
            default_limit: limits.default.unwrap_or(DEFAULT_LIMIT),
            ci_limit: limits.ci.unwrap_or(CI_LIMIT),
            channels,
        })
    }

    /// Empty fallback; real credentials have to come from config.yml or
    /// the environment.
    fn defaults() -> Self {
        Self {
            phone: String::new(),
            api_id: 0,
            api_hash: String::new(),
            session_name: SESSION_NAME.to_string(),
            lock_file: LOCK_FILE.to_string(),
            logs_dir: PathBuf::from(LOGS_DIR),
            report_file: PathBuf::from(REPORT_FILE),
            min_log_bytes: MIN_LOG_BYTES,
            overwrite: false,
            default_limit: DEFAULT_LIMIT,
            ci_limit: CI_LIMIT,
            channels: Vec::new(),
        }
    }

    /// True when running under GitHub Actions.
    pub fn is_github_actions() -> bool {
        matches!(std::env::var("GITHUB_ACTIONS").as_deref(), Ok("true"))
    }

    /// Raw limit for the current environment; CI runs get a tighter cap.
    pub fn get_limit(&self) -> usize {
        if Self::is_github_actions() {
            self.ci_limit
        } else {
            self.default_limit
        }
    }

    /// Message cap for history fetches; `None` means the full history
    pub fn message_limit(&self) -> Option<usize> {
        match self.get_limit() {
            0 => None,
            n => Some(n),
        }
    }
}
