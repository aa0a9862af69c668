//! Run settings: organization, credentials and API tuning.
//!
//! # Sources
//!
//! ```text
//! ~/.maildelegate/config.yaml   (or --config <path>)
//! MAILDELEGATE_* environment     (overrides the file, key by key)
//! ```
//!
//! # API pattern
//!
//! - `load_at(path, required, env)`: explicit file and env lookup; used in tests
//! - `load(explicit)`: derives the default path from `dirs::home_dir()` and
//!   reads the process environment, delegates to `load_at`

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;

pub const DEFAULT_API_URL: &str = "https://api360.yandex.net";
pub const DEFAULT_AUTH_SCHEME: &str = "OAuth";
pub const DEFAULT_PER_PAGE: u32 = 100;
pub const DEFAULT_REQUEST_DELAY_MS: u64 = 100;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub const ENV_ORG_ID: &str = "MAILDELEGATE_ORG_ID";
pub const ENV_TOKEN: &str = "MAILDELEGATE_TOKEN";
pub const ENV_PER_PAGE: &str = "MAILDELEGATE_PER_PAGE";
pub const ENV_API_URL: &str = "MAILDELEGATE_API_URL";
pub const ENV_REQUEST_DELAY_MS: &str = "MAILDELEGATE_REQUEST_DELAY_MS";

/// Resolved settings for one run.
#[derive(Clone, PartialEq, Eq)]
pub struct Settings {
    pub org_id: String,
    pub token: String,
    pub per_page: u32,
    /// Base endpoint without trailing slash.
    pub api_url: String,
    /// Token type placed before the token in the `Authorization` header.
    pub auth_scheme: String,
    /// Fixed pause after each paced API call.
    pub request_delay: Duration,
    pub timeout: Duration,
}

impl Settings {
    /// Value for the `Authorization` request header.
    pub fn authorization(&self) -> String {
        format!("{} {}", self.auth_scheme, self.token)
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("org_id", &self.org_id)
            .field("token", &"<redacted>")
            .field("per_page", &self.per_page)
            .field("api_url", &self.api_url)
            .field("auth_scheme", &self.auth_scheme)
            .field("request_delay", &self.request_delay)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// On-disk shape; every key is optional so the environment can fill gaps.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawSettings {
    #[serde(deserialize_with = "string_or_number")]
    org_id: Option<String>,
    token: Option<String>,
    per_page: Option<u32>,
    api_url: Option<String>,
    auth_scheme: Option<String>,
    request_delay_ms: Option<u64>,
    timeout_secs: Option<u64>,
}

/// Organization ids are numeric; accept them quoted or bare.
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Scalar {
        Text(String),
        Number(u64),
    }

    Ok(Option::<Scalar>::deserialize(deserializer)?.map(|scalar| match scalar {
        Scalar::Text(s) => s,
        Scalar::Number(n) => n.to_string(),
    }))
}

/// `<home>/.maildelegate/config.yaml`; pure, no I/O.
pub fn config_path_at(home: &Path) -> PathBuf {
    home.join(".maildelegate").join("config.yaml")
}

/// Load settings from `path`, then apply environment overrides from `env`.
///
/// A missing file is an error only when `required` is set.
pub fn load_at(
    path: &Path,
    required: bool,
    env: impl Fn(&str) -> Option<String>,
) -> Result<Settings, ConfigError> {
    let mut raw = if path.exists() || required {
        read_file(path)?
    } else {
        RawSettings::default()
    };
    apply_env(&mut raw, env)?;
    finish(raw)
}

/// `load_at` convenience wrapper over the process environment.
///
/// `explicit` comes from `--config` and must exist; otherwise the default
/// path under the home directory is tried.
pub fn load(explicit: Option<&Path>) -> Result<Settings, ConfigError> {
    let env = |key: &str| std::env::var(key).ok();
    match explicit {
        Some(path) => load_at(path, true, env),
        None => {
            let home = dirs::home_dir().ok_or(ConfigError::HomeNotFound)?;
            load_at(&config_path_at(&home), false, env)
        }
    }
}

fn read_file(path: &Path) -> Result<RawSettings, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    if contents.trim().is_empty() {
        return Ok(RawSettings::default());
    }
    serde_yaml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn apply_env(
    raw: &mut RawSettings,
    env: impl Fn(&str) -> Option<String>,
) -> Result<(), ConfigError> {
    if let Some(v) = env(ENV_ORG_ID) {
        raw.org_id = Some(v);
    }
    if let Some(v) = env(ENV_TOKEN) {
        raw.token = Some(v);
    }
    if let Some(v) = env(ENV_API_URL) {
        raw.api_url = Some(v);
    }
    if let Some(v) = env(ENV_PER_PAGE) {
        raw.per_page = Some(parse_number("per_page", &v)?);
    }
    if let Some(v) = env(ENV_REQUEST_DELAY_MS) {
        raw.request_delay_ms = Some(parse_number("request_delay_ms", &v)?);
    }
    Ok(())
}

fn parse_number<N: std::str::FromStr>(key: &'static str, value: &str) -> Result<N, ConfigError>
where
    N::Err: fmt::Display,
{
    value.trim().parse().map_err(|e| ConfigError::Invalid {
        key,
        reason: format!("'{value}' is not a number: {e}"),
    })
}

fn finish(raw: RawSettings) -> Result<Settings, ConfigError> {
    let org_id = required(raw.org_id, "org_id", ENV_ORG_ID)?;
    let token = required(raw.token, "token", ENV_TOKEN)?;

    let per_page = raw.per_page.unwrap_or(DEFAULT_PER_PAGE);
    if per_page == 0 {
        return Err(ConfigError::Invalid {
            key: "per_page",
            reason: "must be at least 1".to_string(),
        });
    }

    let api_url = raw
        .api_url
        .unwrap_or_else(|| DEFAULT_API_URL.to_string())
        .trim_end_matches('/')
        .to_string();
    if api_url.is_empty() {
        return Err(ConfigError::Invalid {
            key: "api_url",
            reason: "must not be empty".to_string(),
        });
    }

    Ok(Settings {
        org_id,
        token,
        per_page,
        api_url,
        auth_scheme: raw
            .auth_scheme
            .unwrap_or_else(|| DEFAULT_AUTH_SCHEME.to_string()),
        request_delay: Duration::from_millis(
            raw.request_delay_ms.unwrap_or(DEFAULT_REQUEST_DELAY_MS),
        ),
        timeout: Duration::from_secs(raw.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)),
    })
}

fn required(
    value: Option<String>,
    key: &'static str,
    env: &'static str,
) -> Result<String, ConfigError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
        _ => Err(ConfigError::Missing { key, env }),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
