use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use igdb_map::catalog::load_catalog;
use igdb_map::igdb::auth::{fetch_app_token, TwitchCredentials};
use igdb_map::igdb::client::IgdbClient;
use igdb_map::resolver::{resolve_catalog, ResolverOptions};
use igdb_map::store::JsonFileStore;
use igdb_map::util::env as env_util;

#[derive(Parser, Debug)]
#[command(
    name = "igdb-map",
    version,
    about = "Resolves a local game catalog against IGDB into a durable id map"
)]
struct Cli {
    /// Input catalog: platform -> ordered list of titles
    #[arg(long, default_value = "games.json")]
    input: PathBuf,

    /// Output artifact: platform -> title -> resolved record
    #[arg(long, default_value = "igdb-map.json")]
    output: PathBuf,

    /// Resolve-once cache artifact, kept alongside the output
    #[arg(long, default_value = ".igdb-cache.json")]
    cache: PathBuf,

    /// Re-query entries that are already resolved
    #[arg(long, default_value_t = false)]
    force: bool,

    /// Cap the number of entries queried this run (resume picks up the rest)
    #[arg(long)]
    limit: Option<usize>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    env_util::init_env();
    igdb_map::tracing::init_tracing("info")?;

    // Fatal preconditions before any query is attempted.
    let catalog = load_catalog(&cli.input)?;
    let credentials = TwitchCredentials::from_env()?;
    let mut store = JsonFileStore::load(&cli.output, &cli.cache)?;

    let user_agent =
        env_util::env_opt("IGDB_USER_AGENT").unwrap_or_else(|| "igdb-map/0.1".to_string());
    let http = reqwest::Client::builder().user_agent(user_agent).build()?;
    let token = fetch_app_token(&http, &credentials).await?;
    let client = IgdbClient::new(http, token);

    let options = ResolverOptions {
        force: cli.force,
        limit: cli.limit,
        ..ResolverOptions::from_env()
    };

    let summary = resolve_catalog(&client, &mut store, &catalog, &options).await?;
    info!(
        target = "igdb-map",
        resolved = summary.resolved,
        skipped_output = summary.skipped_output,
        skipped_cache = summary.skipped_cache,
        unresolved = summary.unresolved,
        output = %cli.output.display(),
        "wrote IGDB map"
    );
    Ok(())
}
