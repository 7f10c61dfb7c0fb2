//! Spotify to audio node resolver library
//!
//! This library turns Spotify entities (tracks, albums, playlists, artists,
//! episodes and shows) into playable tracks obtained from an audio node's
//! search endpoint. Spotify metadata is fetched either through the
//! authenticated Web API or by scraping public embed pages, every Spotify
//! track is matched with a free-text search, and matches are cached per
//! Spotify track id for the lifetime of the resolver.
//!
//! # Modules
//!
//! - `cli` - Command-line front end used by the `spotresolve` binary
//! - `config` - Configuration management and environment variables
//! - `error` - Error taxonomy shared by every operation
//! - `management` - Resolver orchestration and the resolution cache
//! - `node` - Audio node search client
//! - `spotify` - Spotify metadata providers (Web API and embed scraping)
//! - `types` - Data structures and type definitions
//! - `utils` - URL parsing and search query helpers
//!
//! # Example
//!
//! ```
//! use spotresolve::{config::{NodeOptions, ResolverOptions}, management::Resolver, node::NodeClient};
//!
//! #[tokio::main]
//! async fn main() -> spotresolve::Res<()> {
//!     let node = NodeClient::new(NodeOptions::default());
//!     let resolver = Resolver::new(ResolverOptions::default(), node);
//!     let response = resolver.load("https://open.spotify.com/album/4aawyAB9vmqN3uQ7FjRGTy").await?;
//!     println!("{} tracks", response.tracks.len());
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod management;
pub mod node;
pub mod spotify;
pub mod types;
pub mod utils;

pub use error::{ResolveError, Result};

/// A convenient Result type alias for the binary and other top-level glue.
///
/// Library operations return the typed [`Result`]; this boxed alias is for
/// code that mixes several error sources and only needs to report them.
pub type Res<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Prints an informational message with a blue bullet point.
///
/// # Example
///
/// ```
/// info!("Loading {}", url);
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a success message with a green checkmark.
///
/// # Example
///
/// ```
/// success!("Resolved {} tracks", count);
/// ```
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints an error message with a red exclamation mark and exits the program.
///
/// Only meant for the binary: library code returns [`ResolveError`] instead.
///
/// # Example
///
/// ```
/// error!("Failed to load {}: {}", url, e);
/// // Program exits here - code after this will not execute
/// ```
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a warning message with a yellow exclamation mark.
///
/// # Example
///
/// ```
/// warning!("{} tracks could not be resolved", dropped);
/// ```
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
