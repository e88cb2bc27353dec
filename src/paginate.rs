use tracing::{info, warn};

use crate::error::{FetchError, StoreError};
use crate::getposts::FetchPosts;
use crate::posts::PostStore;
use crate::state::StateStore;

#[derive(Debug)]
pub enum Outcome {
    /// The remote returned a page with no posts.
    Exhausted,
    /// The last page was saved; `has_next_page` was false.
    LastPage,
    /// `has_next_page` was set without an `end_cursor` to continue from.
    MissingCursor,
    /// Nothing more was saved; rerun to resume from the checkpoint.
    Failed(FetchError),
}

#[derive(Debug)]
pub struct Summary {
    pub outcome: Outcome,
    pub pages: usize,
    pub fetched: usize,
    pub total: usize,
}

/// Fetches `username`'s timeline in `batch`-sized pages, appending each page to
/// `posts` and checkpointing the cursor in `state` until the feed runs out or a
/// request fails.
pub fn iterate_and_save<F: FetchPosts>(
    fetcher: &F,
    username: &str,
    batch: usize,
    posts: &PostStore,
    state: &StateStore,
) -> Result<Summary, StoreError> {
    let mut all_posts = posts.load()?;
    let mut progress = state.load()?;
    let mut pages = 0;
    let mut fetched = 0;

    let outcome = loop {
        info!(batch, count = progress.post_count, "fetching next posts");
        let response = match fetcher.fetch_page(username, progress.after_cursor.as_deref(), batch)
        {
            Ok(response) => response,
            Err(err) => {
                warn!(error = %err, "no response received, stopping");
                break Outcome::Failed(err);
            }
        };

        let timeline = response.into_timeline();
        if timeline.edges.is_empty() {
            info!("no more posts found, finishing");
            break Outcome::Exhausted;
        }

        for edge in timeline.edges {
            all_posts.push(edge.node);
            progress.post_count += 1;
            fetched += 1;
        }
        posts.save(&all_posts)?;
        pages += 1;
        info!(total = all_posts.len(), path = %posts.path().display(), "saved posts");

        if !timeline.page_info.has_next_page {
            info!("reached the end of available pages");
            break Outcome::LastPage;
        }
        let Some(cursor) = timeline.page_info.end_cursor else {
            warn!("next page reported without an end cursor, stopping");
            break Outcome::MissingCursor;
        };
        progress.after_cursor = Some(cursor);
        state.save(&progress)?;
    };

    Ok(Summary {
        outcome,
        pages,
        fetched,
        total: all_posts.len(),
    })
}
