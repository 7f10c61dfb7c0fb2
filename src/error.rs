//! Error types shared by the metadata providers, the node client and the resolver.

use thiserror::Error;

/// Result alias used across the library.
pub type Result<T> = std::result::Result<T, ResolveError>;

/// Everything that can go wrong while turning a Spotify entity into audio tracks.
///
/// A search that returns zero candidates is not an error; see
/// [`crate::management::Resolver::resolve`].
#[derive(Error, Debug)]
pub enum ResolveError {
    /// The Web API strategy was selected but no bearer token is configured.
    #[error("Spotify Web API strategy requires a token, none is configured")]
    Unauthenticated,

    /// A configuration value could not be parsed.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Transport or HTTP status failure talking to the metadata provider.
    #[error("Failed to fetch Spotify metadata: {0}")]
    Fetch(#[source] reqwest::Error),

    /// The metadata provider does not know the requested entity.
    #[error("Spotify entity not found: {0}")]
    NotFound(String),

    /// The metadata provider answered with something we could not interpret.
    #[error("Malformed Spotify response: {0}")]
    Malformed(String),

    /// Transport failure talking to the audio node.
    #[error("Audio node search failed: {0}")]
    Search(#[source] reqwest::Error),

    /// The input is not a Spotify URL or URI we understand.
    #[error("Not a supported Spotify URL: {0}")]
    InvalidUrl(String),
}

impl ResolveError {
    /// True for errors caused by missing credentials.
    pub fn is_auth_error(&self) -> bool {
        match self {
            ResolveError::Unauthenticated => true,
            ResolveError::Fetch(err) => err
                .status()
                .is_some_and(|s| s.as_u16() == 401 || s.as_u16() == 403),
            _ => false,
        }
    }

    /// True for errors raised while fetching entity metadata.
    pub fn is_fetch_error(&self) -> bool {
        matches!(
            self,
            ResolveError::Fetch(_) | ResolveError::NotFound(_) | ResolveError::Malformed(_)
        )
    }
}
