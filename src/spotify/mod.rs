//! # Spotify Metadata Providers
//!
//! This module abstracts how Spotify entity metadata is obtained. Two
//! interchangeable strategies implement [`MetadataProvider`]:
//!
//! - [`api::ApiProvider`] - the authenticated Spotify Web API. Requires a
//!   bearer token and follows `next` cursors for long listings.
//! - [`scrape::ScrapeProvider`] - the public embed pages at
//!   `open.spotify.com/embed`. No authentication, no pagination.
//!
//! The strategy is picked once from [`FetchStrategy`] when the resolver is
//! built; the resolver itself never branches on it.
//!
//! ```text
//! Resolver
//!    ↓ fetch_entity / fetch_page / fetch_episode_show
//! MetadataProvider
//!    ├── ApiProvider     → api.spotify.com/v1
//!    └── ScrapeProvider  → open.spotify.com/embed
//! ```
//!
//! Both providers flatten Spotify's records into [`SpotifyTrackRef`] values
//! in listing order, skipping entries without an id (local files, removed
//! tracks).
//!
//! ## Error Types
//!
//! Providers never retry. Transport failures surface as
//! [`crate::ResolveError::Fetch`], unknown ids as
//! [`crate::ResolveError::NotFound`] and unexpected payloads as
//! [`crate::ResolveError::Malformed`]. The Web API provider raises
//! [`crate::ResolveError::Unauthenticated`] before sending anything when no
//! token is configured.

use async_trait::async_trait;

use crate::{
    config::{FetchStrategy, ResolverOptions},
    error::Result,
    types::{EntityKind, SpotifyTrackRef},
};

pub mod api;
pub mod scrape;

pub use api::ApiProvider;
pub use scrape::ScrapeProvider;

/// Position of the next page of a listing, as handed out by a provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cursor {
    pub kind: EntityKind,
    pub url: String,
    /// Author to attach to items whose page does not carry one (show episodes).
    pub author: Option<String>,
}

/// First page of an entity: its display name and the first items.
#[derive(Debug, Clone, Default)]
pub struct EntityListing {
    pub name: Option<String>,
    pub items: Vec<SpotifyTrackRef>,
    pub next: Option<Cursor>,
}

/// Any page after the first one.
#[derive(Debug, Clone, Default)]
pub struct ListingPage {
    pub items: Vec<SpotifyTrackRef>,
    pub next: Option<Cursor>,
}

#[async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Fetches an entity and the first page of its tracks or episodes.
    async fn fetch_entity(&self, kind: EntityKind, id: &str) -> Result<EntityListing>;

    /// Fetches the page a previous listing pointed to.
    async fn fetch_page(&self, cursor: &Cursor) -> Result<ListingPage>;

    /// Looks up the id of the show an episode belongs to.
    async fn fetch_episode_show(&self, id: &str) -> Result<String>;
}

/// Builds the provider matching the configured strategy.
pub fn provider_for(options: &ResolverOptions) -> Box<dyn MetadataProvider> {
    match options.fetch_strategy {
        FetchStrategy::Api => Box::new(ApiProvider::new(options)),
        FetchStrategy::Scrape => Box::new(ScrapeProvider::new(options)),
    }
}
