use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

/// Application-level constants
pub const APP_NAME: &str = "DealScope";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const DEFAULT_PORT: u16 = 5001;
pub const DEFAULT_MAX_UPLOAD_MB: u64 = 25;
pub const DEFAULT_MODEL: &str = "gemini-2.5-pro";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_LLM_TIMEOUT_SECS: u64 = 300;
pub const DEFAULT_LLM_TEMPERATURE: f32 = 2.0;

/// Log filter used when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    "dealscope_lib=info,dealscope=info,tower_http=warn"
}

/// Default temporary upload directory: `<cache dir>/dealscope/uploads`,
/// falling back to the system temp directory.
pub fn default_upload_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("dealscope")
        .join("uploads")
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required environment variable {0}")]
    Missing(&'static str),

    #[error("Invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

/// Generative model settings for the decision engine.
#[derive(Debug, Clone, PartialEq)]
pub struct GeminiSettings {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub timeout_secs: u64,
    pub temperature: f32,
    /// Attach the web-search tool to every request.
    pub search_grounding: bool,
}

/// Runtime configuration, read from the environment at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
    /// `(subject, token)` pairs accepted as bearer credentials.
    pub api_tokens: Vec<(String, String)>,
    pub gemini: GeminiSettings,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (the environment, or a map in tests).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let bind_addr = match get("DEALSCOPE_BIND") {
            Some(addr) => parse_value("DEALSCOPE_BIND", &addr)?,
            None => {
                let port: u16 = match get("PORT") {
                    Some(p) => parse_value("PORT", &p)?,
                    None => DEFAULT_PORT,
                };
                SocketAddr::from(([0, 0, 0, 0], port))
            }
        };

        let upload_dir = get("DEALSCOPE_UPLOAD_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(default_upload_dir);

        let max_upload_mb: u64 = match get("DEALSCOPE_MAX_UPLOAD_MB") {
            Some(v) => parse_value("DEALSCOPE_MAX_UPLOAD_MB", &v)?,
            None => DEFAULT_MAX_UPLOAD_MB,
        };
        let max_upload_bytes = max_upload_mb
            .checked_mul(1024 * 1024)
            .and_then(|bytes| usize::try_from(bytes).ok())
            .filter(|bytes| *bytes > 0)
            .ok_or_else(|| ConfigError::Invalid {
                key: "DEALSCOPE_MAX_UPLOAD_MB",
                value: max_upload_mb.to_string(),
            })?;

        let tokens_raw = get("DEALSCOPE_API_TOKENS").ok_or(ConfigError::Missing("DEALSCOPE_API_TOKENS"))?;
        let api_tokens = parse_token_pairs(&tokens_raw)?;

        let gemini = GeminiSettings {
            api_key: get("GEMINI_API_KEY").ok_or(ConfigError::Missing("GEMINI_API_KEY"))?,
            model: get("DEALSCOPE_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            base_url: get("GEMINI_BASE_URL").unwrap_or_else(|| DEFAULT_GEMINI_BASE_URL.to_string()),
            timeout_secs: match get("DEALSCOPE_LLM_TIMEOUT_SECS") {
                Some(v) => parse_value("DEALSCOPE_LLM_TIMEOUT_SECS", &v)?,
                None => DEFAULT_LLM_TIMEOUT_SECS,
            },
            temperature: match get("DEALSCOPE_LLM_TEMPERATURE") {
                Some(v) => parse_value("DEALSCOPE_LLM_TEMPERATURE", &v)?,
                None => DEFAULT_LLM_TEMPERATURE,
            },
            search_grounding: match get("DEALSCOPE_SEARCH_GROUNDING") {
                Some(v) => parse_flag("DEALSCOPE_SEARCH_GROUNDING", &v)?,
                None => true,
            },
        };

        Ok(Self {
            bind_addr,
            upload_dir,
            max_upload_bytes,
            api_tokens,
            gemini,
        })
    }
}

fn parse_value<T: std::str::FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::Invalid {
        key,
        value: value.to_string(),
    })
}

fn parse_flag(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid {
            key,
            value: value.to_string(),
        }),
    }
}

/// Parse `subject:token,subject:token`.
fn parse_token_pairs(raw: &str) -> Result<Vec<(String, String)>, ConfigError> {
    let invalid = || ConfigError::Invalid {
        key: "DEALSCOPE_API_TOKENS",
        value: "<redacted>".to_string(),
    };

    raw.split(',')
        .map(str::trim)
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (subject, token) = pair.split_once(':').ok_or_else(invalid)?;
            let (subject, token) = (subject.trim(), token.trim());
            if subject.is_empty() || token.is_empty() {
                return Err(invalid());
            }
            Ok((subject.to_string(), token.to_string()))
        })
        .collect::<Result<Vec<_>, _>>()
        .and_then(|pairs| if pairs.is_empty() { Err(invalid()) } else { Ok(pairs) })
}
