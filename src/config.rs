//! Environment-driven configuration
//!
//! Every knob is an environment variable (a `.env` file is loaded first by
//! `main`). Parsing goes through [`AppConfig::from_lookup`] so tests can feed
//! a map instead of touching the process environment.

use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_PORT: u16 = 8000;
const DEFAULT_QUESTION_COUNT: usize = 3;
const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
const DEFAULT_TEMPERATURE: f32 = 0.7;
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 60;
const DEFAULT_SEARCH_RADIUS_M: u32 = 5000;
const DEFAULT_MIN_RATING: f64 = 3.0;

/// Nominatim's usage policy requires an identifying user agent.
pub const NOMINATIM_USER_AGENT: &str = "FineYourDineTonight";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{key}={value:?} is invalid: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Text-generation provider settings
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
}

/// Which backend resolves place names to coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeocoderKind {
    Nominatim,
    Google,
}

impl FromStr for GeocoderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "nominatim" | "osm" => Ok(Self::Nominatim),
            "google" => Ok(Self::Google),
            other => Err(format!("unknown geocoder '{other}'")),
        }
    }
}

/// Places backend settings
#[derive(Debug, Clone)]
pub struct PlacesConfig {
    pub google_api_key: String,
    pub geocoder: GeocoderKind,
}

/// Default parameters for a nearby restaurant search
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchConfig {
    pub radius_m: u32,
    pub min_rating: f64,
    pub open_now: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            radius_m: DEFAULT_SEARCH_RADIUS_M,
            min_rating: DEFAULT_MIN_RATING,
            open_now: true,
        }
    }
}

/// Conversation flow settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConversationConfig {
    /// Answers collected before the recommendation is made
    pub question_count: usize,
    /// Idle conversations older than this are evicted; `None` keeps them forever
    pub idle_ttl: Option<Duration>,
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            question_count: DEFAULT_QUESTION_COUNT,
            idle_ttl: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub http_timeout: Duration,
    pub llm: LlmConfig,
    pub places: PlacesConfig,
    pub search: SearchConfig,
    pub conversation: ConversationConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_key = get("OPENAI_API_KEY").ok_or(ConfigError::Missing("OPENAI_API_KEY"))?;
        let google_api_key =
            get("GOOGLE_MAPS_API_KEY").ok_or(ConfigError::Missing("GOOGLE_MAPS_API_KEY"))?;

        let temperature = parse_or(&get, "OPENAI_TEMPERATURE", DEFAULT_TEMPERATURE)?;
        if !(0.0..=2.0).contains(&temperature) {
            return Err(invalid(
                "OPENAI_TEMPERATURE",
                temperature,
                "must be between 0 and 2",
            ));
        }

        let question_count = parse_or(&get, "DINE_QUESTION_COUNT", DEFAULT_QUESTION_COUNT)?;
        if question_count == 0 {
            return Err(invalid("DINE_QUESTION_COUNT", 0, "must be at least 1"));
        }

        let min_rating = parse_or(&get, "DINE_MIN_RATING", DEFAULT_MIN_RATING)?;
        if !(0.0..=5.0).contains(&min_rating) {
            return Err(invalid("DINE_MIN_RATING", min_rating, "must be between 0 and 5"));
        }

        let http_timeout_secs =
            parse_or(&get, "DINE_HTTP_TIMEOUT_SECS", DEFAULT_HTTP_TIMEOUT_SECS)?;
        if http_timeout_secs == 0 {
            return Err(invalid("DINE_HTTP_TIMEOUT_SECS", 0, "must be at least 1"));
        }

        // Unset disables eviction; zero would evict everything on each sweep
        let idle_ttl = get("DINE_CONVERSATION_TTL_SECS")
            .map(|v| parse_value::<u64>("DINE_CONVERSATION_TTL_SECS", &v))
            .transpose()?;
        if idle_ttl == Some(0) {
            return Err(invalid("DINE_CONVERSATION_TTL_SECS", 0, "must be at least 1"));
        }

        Ok(Self {
            port: parse_or(&get, "DINE_PORT", DEFAULT_PORT)?,
            http_timeout: Duration::from_secs(http_timeout_secs),
            llm: LlmConfig {
                api_key,
                base_url: get("OPENAI_BASE_URL")
                    .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string()),
                model: get("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
                temperature,
            },
            places: PlacesConfig {
                google_api_key,
                geocoder: parse_or(&get, "DINE_GEOCODER", GeocoderKind::Nominatim)?,
            },
            search: SearchConfig {
                radius_m: parse_or(&get, "DINE_SEARCH_RADIUS_M", DEFAULT_SEARCH_RADIUS_M)?,
                min_rating,
                open_now: parse_or(&get, "DINE_OPEN_NOW", true)?,
            },
            conversation: ConversationConfig {
                question_count,
                idle_ttl: idle_ttl.map(Duration::from_secs),
            },
        })
    }
}

fn parse_or<T, G>(get: &G, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    get(key).map_or(Ok(default), |v| parse_value(key, &v))
}

fn parse_value<T>(key: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        key,
        value: value.to_string(),
        reason: e.to_string(),
    })
}

fn invalid(key: &'static str, value: impl ToString, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        key,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}
