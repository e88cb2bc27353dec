use std::error::Error;
use std::path::Path;

use config::Config;
use getposts::HttpFetcher;
use paginate::{Outcome, iterate_and_save};
use posts::PostStore;
use state::StateStore;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod config;
mod error;
mod getposts;
mod loader;
mod paginate;
mod persist;
mod postlist;
mod posts;
mod state;

const CONFIG_FILE: &str = "ig_posts.toml";

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = Config::load(Path::new(CONFIG_FILE))?;
    let fetcher = HttpFetcher::new(&config)?;
    let posts = PostStore::new(config.posts_file());
    let state = StateStore::new(config.state_file());

    let summary = iterate_and_save(&fetcher, &config.username, config.batch, &posts, &state)?;
    match &summary.outcome {
        Outcome::Failed(err) => warn!(
            error = %err,
            fetched = summary.fetched,
            total = summary.total,
            resume = %state.path().display(),
            "stopped early, rerun to resume"
        ),
        outcome => info!(
            ?outcome,
            pages = summary.pages,
            fetched = summary.fetched,
            total = summary.total,
            "finished"
        ),
    }

    match loader::load_json_file(posts.path()) {
        Ok(loaded) => info!(count = loaded.len(), path = %posts.path().display(), "loaded posts"),
        Err(err) => warn!(error = %err, "could not reload saved posts"),
    }
    Ok(())
}
