use clap::{
    CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};
use tracing_subscriber::EnvFilter;

use spotresolve::{cli, config, config::FetchStrategy, error};

fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::White.on_default() | Effects::BOLD)
        .usage(AnsiColor::White.on_default() | Effects::BOLD)
        .literal(AnsiColor::BrightBlue.on_default())
        .placeholder(AnsiColor::BrightGreen.on_default())
}

#[derive(Parser, Debug, Clone)]
#[clap(
  version = env!("CARGO_PKG_VERSION"),
  name=env!("CARGO_PKG_NAME"),
  bin_name=env!("CARGO_PKG_NAME"),
  author=env!("CARGO_PKG_AUTHORS"),
  about=env!("CARGO_PKG_DESCRIPTION"),
  styles=styles(),
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Load a Spotify URL or URI and list its tracks
    Load(LoadOptions),

    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(Parser, Debug, Clone)]
pub struct LoadOptions {
    /// Spotify URL or URI (track, album, playlist, artist, episode, show)
    url: String,

    /// Resolve every track against the audio node
    #[clap(long)]
    resolve: bool,

    /// Metadata strategy: api or scrape
    #[clap(long, value_parser = parse_strategy)]
    strategy: Option<FetchStrategy>,

    /// Maximum pages per listing, 0 for unlimited
    #[clap(long)]
    page_limit: Option<u32>,

    /// Show Spotify titles and authors instead of the node's
    #[clap(long)]
    spotify_metadata: bool,

    /// Print the response as JSON
    #[clap(long)]
    json: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct CompletionsOption {
    shell: Shell,
}

fn parse_strategy(raw: &str) -> Result<FetchStrategy, String> {
    raw.parse::<FetchStrategy>().map_err(|e| e.to_string())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = config::load_env().await {
        error!("Cannot load environment. Err: {}", e);
    }

    let cli = Cli::parse();

    match cli.command {
        Command::Load(opt) => {
            cli::load(
                opt.url,
                cli::LoadOverrides {
                    resolve: opt.resolve,
                    strategy: opt.strategy,
                    page_limit: opt.page_limit,
                    spotify_metadata: opt.spotify_metadata,
                    json: opt.json,
                },
            )
            .await
        }
        Command::Completions(opt) => {
            let mut cmd = Cli::command_for_update();
            let name = cmd.get_name().to_string();
            generate(opt.shell, &mut cmd, name, &mut std::io::stdout())
        }
    }
}
