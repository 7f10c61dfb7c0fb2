//! Audio node search client.
//!
//! The resolver only needs one capability from the node: turn a free-text
//! query into candidate tracks. [`AudioSearch`] captures that so tests and
//! hosts can plug in their own node handle; [`NodeClient`] talks to a node's
//! `/loadtracks` endpoint over HTTP.

use async_trait::async_trait;
use reqwest::{Client, header::AUTHORIZATION};
use tracing::debug;

use crate::{
    config::NodeOptions,
    error::{ResolveError, Result},
    types::{AudioTrack, NodeLoadResult},
};

#[async_trait]
pub trait AudioSearch: Send + Sync {
    /// Runs a search query. An empty vector means nothing matched.
    async fn search(&self, query: &str) -> Result<Vec<AudioTrack>>;
}

/// HTTP client bound to one audio node.
pub struct NodeClient {
    client: Client,
    options: NodeOptions,
}

impl NodeClient {
    pub fn new(options: NodeOptions) -> Self {
        Self {
            client: Client::new(),
            options,
        }
    }

    pub fn options(&self) -> &NodeOptions {
        &self.options
    }
}

#[async_trait]
impl AudioSearch for NodeClient {
    async fn search(&self, query: &str) -> Result<Vec<AudioTrack>> {
        let url = format!("{base}/loadtracks", base = self.options.base_url());
        debug!(url = %url, query, "searching audio node");

        let response = self
            .client
            .get(&url)
            .query(&[("identifier", query)])
            .header(AUTHORIZATION, &self.options.password)
            .send()
            .await
            .map_err(ResolveError::Search)?
            .error_for_status()
            .map_err(ResolveError::Search)?;

        let result = response
            .json::<NodeLoadResult>()
            .await
            .map_err(ResolveError::Search)?;

        Ok(result.tracks)
    }
}
