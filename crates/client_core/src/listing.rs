//! The single data-access path for what the post table shows.

use std::collections::HashMap;

use shared::{
    domain::{AuthorSummary, Post, UserId},
    protocol::PostsPage,
    search_params::ListingKey,
};
use tracing::info;

use crate::{
    api::{PageRequest, PostsApi},
    error::Result,
};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Listing {
    pub posts: Vec<Post>,
    pub total: u64,
}

impl Listing {
    pub fn from_page(page: PostsPage, authors: &[AuthorSummary]) -> Self {
        let total = page.total();
        let mut posts = page.posts;
        attach_authors(&mut posts, authors);
        Self { posts, total }
    }
}

/// Annotates each post with its author; posts whose author is unknown get `None`.
pub fn attach_authors(posts: &mut [Post], authors: &[AuthorSummary]) {
    let by_id: HashMap<UserId, &AuthorSummary> =
        authors.iter().map(|author| (author.id, author)).collect();
    for post in posts {
        post.author = by_id.get(&post.user_id).map(|author| (*author).clone());
    }
}

/// Tag filter set → every post carrying the tag, otherwise the paginated
/// listing; the user directory is fetched alongside and joined in.
pub async fn fetch_listing(api: &dyn PostsApi, key: &ListingKey) -> Result<Listing> {
    let posts = async {
        match key.tag.as_deref() {
            Some(tag) => api.posts_by_tag(tag).await,
            None => api.list_posts(PageRequest::from(key)).await,
        }
    };
    let (page, authors) = futures::try_join!(posts, api.user_directory())?;
    let listing = Listing::from_page(page, &authors);
    info!(
        skip = key.skip,
        limit = key.limit,
        tag = key.tag.as_deref().unwrap_or("-"),
        rows = listing.posts.len(),
        total = listing.total,
        "listing: fetched"
    );
    Ok(listing)
}

pub async fn fetch_search(api: &dyn PostsApi, term: &str) -> Result<Listing> {
    let (page, authors) = futures::try_join!(api.search_posts(term), api.user_directory())?;
    let listing = Listing::from_page(page, &authors);
    info!(term, rows = listing.posts.len(), total = listing.total, "listing: searched");
    Ok(listing)
}
