use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use tabled::{Table, settings::Style};

use crate::{
    config::{FetchStrategy, NodeOptions, ResolverOptions},
    error, info,
    management::Resolver,
    node::NodeClient,
    success,
    types::{LoadResponse, LoadType, TrackEntry, TrackTableRow},
    utils, warning,
};

/// Overrides given on the command line, applied on top of the environment.
#[derive(Debug, Clone, Default)]
pub struct LoadOverrides {
    pub resolve: bool,
    pub strategy: Option<FetchStrategy>,
    pub page_limit: Option<u32>,
    pub spotify_metadata: bool,
    pub json: bool,
}

pub async fn load(url: String, overrides: LoadOverrides) {
    let mut options = match ResolverOptions::from_env() {
        Ok(options) => options,
        Err(e) => error!("Invalid resolver configuration: {}", e),
    };
    let node_options = match NodeOptions::from_env() {
        Ok(options) => options,
        Err(e) => error!("Invalid node configuration: {}", e),
    };

    options.auto_resolve |= overrides.resolve;
    options.use_spotify_metadata |= overrides.spotify_metadata;
    if let Some(strategy) = overrides.strategy {
        options.fetch_strategy = strategy;
    }
    if let Some(limit) = overrides.page_limit {
        options.playlist_load_limit = limit;
    }

    if !overrides.json {
        info!(
            "Loading {} via {} (node {})",
            url,
            options.fetch_strategy,
            node_options.base_url()
        );
    }

    let resolver = Resolver::new(options, NodeClient::new(node_options));

    let pb = ProgressBar::new_spinner();
    pb.set_message("Loading Spotify entity...");
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_style(
        ProgressStyle::with_template("{spinner:.blue} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
    );

    let result = resolver.load(&url).await;
    pb.finish_and_clear();

    let response = match result {
        Ok(response) => response,
        Err(e) if e.is_auth_error() => error!(
            "Spotify rejected the request, set SPOTIFY_TOKEN or use --strategy scrape\n Error: {}",
            e
        ),
        Err(e) => error!("Failed to load {}: {}", url, e),
    };

    if overrides.json {
        match serde_json::to_string_pretty(&response) {
            Ok(json) => println!("{}", json),
            Err(e) => error!("Failed to serialize response: {}", e),
        }
        return;
    }

    print_response(&response);
}

fn print_response(response: &LoadResponse) {
    if response.tracks.is_empty() {
        warning!("No tracks found");
    } else {
        let rows: Vec<TrackTableRow> = response
            .tracks
            .iter()
            .enumerate()
            .map(|(i, entry)| table_row(i + 1, entry))
            .collect();

        let mut table = Table::new(rows);
        table.with(Style::rounded());
        println!("{}", table);
    }

    if let Some(exception) = &response.exception {
        warning!("{} ({:?})", exception.message, exception.severity);
    }

    match response.load_type {
        LoadType::Track => success!("Loaded {} track(s)", response.tracks.len()),
        LoadType::Playlist => success!(
            "Loaded {} track(s) from {}",
            response.tracks.len(),
            response.playlist_name.as_deref().unwrap_or("playlist")
        ),
    }
}

fn table_row(position: usize, entry: &TrackEntry) -> TrackTableRow {
    match entry {
        TrackEntry::Unresolved(track) => TrackTableRow {
            position,
            title: track.info.title.clone(),
            author: track.info.author(),
            duration: utils::format_duration(track.info.duration_ms),
            uri: track.info.source_uri.clone(),
        },
        TrackEntry::Resolved(track) => TrackTableRow {
            position,
            title: track.info.title.clone(),
            author: track.info.author.clone(),
            duration: utils::format_duration(track.info.length),
            uri: track.info.uri.clone(),
        },
    }
}
