//! Configuration management for the resolver.
//!
//! This module handles loading configuration values from environment
//! variables and `.env` files. Library users can also build
//! [`ResolverOptions`] and [`NodeOptions`] directly; the environment is only
//! one way of filling them.
//!
//! The configuration system follows a hierarchical approach:
//! 1. Environment variables (highest priority)
//! 2. `.env` file in the local data directory
//! 3. Application defaults

use std::{env, fmt, path::PathBuf, str::FromStr};

use crate::error::{ResolveError, Result};

pub const DEFAULT_API_URL: &str = "https://api.spotify.com/v1";
pub const DEFAULT_EMBED_URL: &str = "https://open.spotify.com/embed";
pub const DEFAULT_SEARCH_PREFIX: &str = "ytsearch:";

/// Loads environment variables from a `.env` file in the local data directory.
///
/// The file lives under `spotresolve/.env` in the platform-specific local
/// data directory:
/// - Linux: `~/.local/share/spotresolve/.env`
/// - macOS: `~/Library/Application Support/spotresolve/.env`
/// - Windows: `%LOCALAPPDATA%/spotresolve/.env`
///
/// A missing file is not an error; the process environment is used as is.
///
/// # Errors
///
/// Returns an error if the parent directory cannot be created or the file
/// exists but cannot be parsed.
pub async fn load_env() -> std::result::Result<(), String> {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("spotresolve/.env");
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent)
            .await
            .map_err(|e| e.to_string())?;
    }

    if !path.is_file() {
        return Ok(());
    }

    dotenv::from_path(&path).map_err(|e| e.to_string())
}

/// How Spotify metadata is obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchStrategy {
    /// Authenticated Spotify Web API, paginated through `next` cursors.
    Api,
    /// Unauthenticated scraping of the public embed pages.
    #[default]
    Scrape,
}

impl FromStr for FetchStrategy {
    type Err = ResolveError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "api" => Ok(FetchStrategy::Api),
            "scrape" => Ok(FetchStrategy::Scrape),
            other => Err(ResolveError::Config(format!(
                "unknown fetch strategy '{}', expected 'api' or 'scrape'",
                other
            ))),
        }
    }
}

impl fmt::Display for FetchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchStrategy::Api => write!(f, "api"),
            FetchStrategy::Scrape => write!(f, "scrape"),
        }
    }
}

/// Options controlling how entities are fetched and resolved.
#[derive(Debug, Clone)]
pub struct ResolverOptions {
    pub fetch_strategy: FetchStrategy,
    /// Bearer token for the Web API strategy. Its lifecycle is owned by the host.
    pub token: Option<String>,
    pub api_url: String,
    pub embed_url: String,
    /// Market passed to endpoints that require one (top tracks, shows, episodes).
    pub market: String,
    /// Resolve every track right after fetching and drop the ones without a match.
    pub auto_resolve: bool,
    /// Overwrite title, author and uri of matches with the Spotify metadata.
    pub use_spotify_metadata: bool,
    /// Restrict searches to auto-generated audio uploads.
    pub audio_only_results: bool,
    /// Maximum number of pages loaded per listing, the first page included. 0 means unlimited.
    pub playlist_load_limit: u32,
    pub search_prefix: String,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            fetch_strategy: FetchStrategy::default(),
            token: None,
            api_url: DEFAULT_API_URL.to_string(),
            embed_url: DEFAULT_EMBED_URL.to_string(),
            market: "US".to_string(),
            auto_resolve: false,
            use_spotify_metadata: false,
            audio_only_results: false,
            playlist_load_limit: 0,
            search_prefix: DEFAULT_SEARCH_PREFIX.to_string(),
        }
    }
}

impl ResolverOptions {
    /// Builds options from the process environment, falling back to defaults.
    ///
    /// Recognized variables: `SPOTIFY_FETCH_STRATEGY`, `SPOTIFY_TOKEN`,
    /// `SPOTIFY_API_URL`, `SPOTIFY_EMBED_URL`, `SPOTIFY_MARKET`,
    /// `SPOTRESOLVE_AUTO_RESOLVE`, `SPOTRESOLVE_USE_SPOTIFY_METADATA`,
    /// `SPOTRESOLVE_AUDIO_ONLY`, `SPOTRESOLVE_PLAYLIST_LOAD_LIMIT` and
    /// `SPOTRESOLVE_SEARCH_PREFIX`.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::Config`] when a variable is set to a value
    /// that cannot be parsed.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            fetch_strategy: env_parse("SPOTIFY_FETCH_STRATEGY")?
                .unwrap_or(defaults.fetch_strategy),
            token: env_string("SPOTIFY_TOKEN"),
            api_url: env_string("SPOTIFY_API_URL").unwrap_or(defaults.api_url),
            embed_url: env_string("SPOTIFY_EMBED_URL").unwrap_or(defaults.embed_url),
            market: env_string("SPOTIFY_MARKET").unwrap_or(defaults.market),
            auto_resolve: env_bool("SPOTRESOLVE_AUTO_RESOLVE")?.unwrap_or(defaults.auto_resolve),
            use_spotify_metadata: env_bool("SPOTRESOLVE_USE_SPOTIFY_METADATA")?
                .unwrap_or(defaults.use_spotify_metadata),
            audio_only_results: env_bool("SPOTRESOLVE_AUDIO_ONLY")?
                .unwrap_or(defaults.audio_only_results),
            playlist_load_limit: env_parse("SPOTRESOLVE_PLAYLIST_LOAD_LIMIT")?
                .unwrap_or(defaults.playlist_load_limit),
            search_prefix: env_string("SPOTRESOLVE_SEARCH_PREFIX")
                .unwrap_or(defaults.search_prefix),
        })
    }
}

/// Address and credentials of the audio node a resolver is bound to.
#[derive(Debug, Clone)]
pub struct NodeOptions {
    pub host: String,
    pub port: u16,
    pub secure: bool,
    /// Sent verbatim in the `Authorization` header.
    pub password: String,
}

impl Default for NodeOptions {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 2333,
            secure: false,
            password: "youshallnotpass".to_string(),
        }
    }
}

impl NodeOptions {
    /// Builds node options from `NODE_HOST`, `NODE_PORT`, `NODE_SECURE` and `NODE_PASSWORD`.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            host: env_string("NODE_HOST").unwrap_or(defaults.host),
            port: env_parse("NODE_PORT")?.unwrap_or(defaults.port),
            secure: env_bool("NODE_SECURE")?.unwrap_or(defaults.secure),
            password: env_string("NODE_PASSWORD").unwrap_or(defaults.password),
        })
    }

    /// Base URL of the node, e.g. `http://localhost:2333`.
    pub fn base_url(&self) -> String {
        format!(
            "http{s}://{host}:{port}",
            s = if self.secure { "s" } else { "" },
            host = self.host,
            port = self.port
        )
    }
}

fn env_string(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_parse<T: FromStr>(key: &str) -> Result<Option<T>>
where
    T::Err: fmt::Display,
{
    env_string(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|e| ResolveError::Config(format!("{}={}: {}", key, raw, e)))
        })
        .transpose()
}

fn env_bool(key: &str) -> Result<Option<bool>> {
    env_string(key)
        .map(|raw| parse_bool(&raw).ok_or_else(|| {
            ResolveError::Config(format!("{}={}: expected a boolean", key, raw))
        }))
        .transpose()
}

/// Accepts the usual spellings of a boolean flag (`true/false`, `1/0`, `yes/no`, `on/off`).
pub fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
