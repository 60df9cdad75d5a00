//! Applies backend events to the admin view state.

use client_core::{PageState, PageWindow};
use shared::{
    domain::{Comment, PostId, Tag, User, UserId},
    search_params::SearchParams,
};

use crate::controller::events::{UiError, UiEvent};

#[derive(Debug, Clone, PartialEq)]
pub enum Fetch<T> {
    Pending,
    Ready(T),
    Failed(String),
}

/// A single-record lookup and the id it was requested for.
#[derive(Debug, Clone, PartialEq)]
pub struct Lookup<K, T> {
    pub key: K,
    pub state: Fetch<T>,
}

impl<K: PartialEq, T> Lookup<K, T> {
    /// Starts a lookup for `key` unless one is pending or done; a failed one is retried.
    /// Returns whether a request must be sent.
    fn begin(slot: &mut Option<Self>, key: K) -> bool {
        if let Some(lookup) = slot.as_ref() {
            if lookup.key == key && !matches!(lookup.state, Fetch::Failed(_)) {
                return false;
            }
        }
        *slot = Some(Self {
            key,
            state: Fetch::Pending,
        });
        true
    }

    /// Records the outcome if it belongs to the current lookup.
    fn settle(slot: &mut Option<Self>, key: &K, state: Fetch<T>) -> bool {
        match slot {
            Some(lookup) if lookup.key == *key => {
                lookup.state = state;
                true
            }
            _ => false,
        }
    }
}

/// State of the lookup for `key`; `None` when nothing was requested for it.
pub fn lookup_state<'a, K: PartialEq, T>(
    lookup: Option<&'a Lookup<K, T>>,
    key: &K,
) -> Option<&'a Fetch<T>> {
    lookup
        .filter(|lookup| lookup.key == *key)
        .map(|lookup| &lookup.state)
}

#[derive(Debug, Default)]
pub struct AdminViewState {
    pub page: PageState,
    pub tags: Vec<Tag>,
    pub user: Option<Lookup<UserId, User>>,
    pub comments: Option<Lookup<PostId, Vec<Comment>>>,
    pub status: String,
    pub banner: Option<UiError>,
    pub mutation_in_flight: bool,
}

impl AdminViewState {
    pub fn begin_user(&mut self, user_id: UserId) -> bool {
        Lookup::begin(&mut self.user, user_id)
    }

    pub fn begin_comments(&mut self, post_id: PostId) -> bool {
        Lookup::begin(&mut self.comments, post_id)
    }
}

/// Work the app must do after an event has been applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Followup {
    RefetchListing,
    RefetchSearch,
    /// The server reported fewer rows than `skip` assumed.
    CorrectSkip(u32),
    CloseEditors,
}

pub fn apply_event(
    state: &mut AdminViewState,
    event: UiEvent,
    current: &SearchParams,
) -> Vec<Followup> {
    let mut followups = Vec::new();
    match event {
        UiEvent::Info(message) => state.status = message,
        UiEvent::ListingLoaded { ticket, listing } => {
            let total = listing.total;
            let rows = listing.posts.len();
            if !state.page.finish_listing(&ticket, listing) {
                tracing::debug!(generation = ticket.generation, "discarding stale listing");
                return followups;
            }
            state.status = format!("Loaded {rows} of {total} posts");
            // Tag listings are never paged, so their total says nothing about skip.
            if ticket.key.tag.is_none() {
                let window =
                    PageWindow::new(ticket.key.skip, ticket.key.limit, total).normalized();
                if window.skip != ticket.key.skip && current.listing_key() == ticket.key {
                    followups.push(Followup::CorrectSkip(window.skip));
                }
            }
        }
        UiEvent::ListingFailed { ticket, error } => {
            if state.page.fail_listing(&ticket) {
                state.status = "Failed to load posts".to_string();
                state.banner = Some(error);
            }
        }
        UiEvent::SearchLoaded { ticket, listing } => {
            let total = listing.total;
            let term = ticket.key.clone();
            if state.page.finish_search(&ticket, listing) {
                state.status = format!("{total} posts match \"{term}\"");
            } else {
                tracing::debug!(term = %term, "discarding stale search result");
            }
        }
        UiEvent::SearchFailed { ticket, error } => {
            if state.page.fail_search(&ticket) {
                state.status = "Search failed".to_string();
                state.banner = Some(error);
            }
        }
        UiEvent::TagsLoaded(tags) => state.tags = tags,
        UiEvent::UserLoaded(user) => {
            let user_id = user.id;
            if !Lookup::settle(&mut state.user, &user_id, Fetch::Ready(user)) {
                tracing::debug!(user_id = %user_id, "discarding user no longer requested");
            }
        }
        UiEvent::UserFailed { user_id, error } => {
            let failed = Fetch::Failed(error.message().to_string());
            if Lookup::settle(&mut state.user, &user_id, failed) {
                state.status = error.banner_text();
                state.banner = Some(error);
            }
        }
        UiEvent::CommentsLoaded { post_id, comments } => {
            if Lookup::settle(&mut state.comments, &post_id, Fetch::Ready(comments)) {
                state.status = format!("Loaded comments for post #{post_id}");
            }
        }
        UiEvent::CommentsFailed { post_id, error } => {
            let failed = Fetch::Failed(error.message().to_string());
            if Lookup::settle(&mut state.comments, &post_id, failed) {
                state.status = error.banner_text();
                state.banner = Some(error);
            }
        }
        UiEvent::PostCreated(post) => {
            state.status = format!("Created post #{}", post.id);
            mutation_done(state, current, &mut followups);
        }
        UiEvent::PostUpdated(post) => {
            state.status = format!("Saved post #{}", post.id);
            mutation_done(state, current, &mut followups);
        }
        UiEvent::PostDeleted(id) => {
            state.status = format!("Deleted post #{id}");
            mutation_done(state, current, &mut followups);
        }
        UiEvent::Error(error) => {
            tracing::warn!(context = ?error.context(), "ui error: {}", error.message());
            state.status = error.banner_text();
            if error.context().is_mutation() {
                state.mutation_in_flight = false;
            }
            state.banner = Some(error);
        }
    }
    followups
}

fn mutation_done(state: &mut AdminViewState, current: &SearchParams, followups: &mut Vec<Followup>) {
    state.mutation_in_flight = false;
    state.banner = None;
    followups.push(Followup::CloseEditors);
    followups.push(Followup::RefetchListing);
    if current.active_search().is_some() {
        followups.push(Followup::RefetchSearch);
    }
}

#[cfg(test)]
mod tests {
    use client_core::{ClientError, Listing};
    use shared::{
        domain::{Post, PostId, Reactions, UserId},
        error::ValidationError,
    };

    use super::*;
    use crate::controller::events::{UiErrorCategory, UiErrorContext};

    fn post(id: i64) -> Post {
        Post {
            id: PostId(id),
            title: format!("post {id}"),
            body: "body".into(),
            tags: Vec::new(),
            user_id: UserId(1),
            reactions: Reactions::default(),
            views: None,
            author: None,
        }
    }

    fn listing(ids: &[i64], total: u64) -> Listing {
        Listing {
            posts: ids.iter().copied().map(post).collect(),
            total,
        }
    }

    #[test]
    fn newer_listing_wins_over_late_response() {
        let params = SearchParams::parse("skip=10");
        let mut state = AdminViewState::default();
        let old = state.page.begin_listing(SearchParams::default().listing_key());
        let new = state.page.begin_listing(params.listing_key());

        apply_event(
            &mut state,
            UiEvent::ListingLoaded {
                ticket: new,
                listing: listing(&[11, 12], 30),
            },
            &params,
        );
        apply_event(
            &mut state,
            UiEvent::ListingLoaded {
                ticket: old,
                listing: listing(&[1, 2], 30),
            },
            &params,
        );
        let ids: Vec<i64> = state.page.rows(None).iter().map(|p| p.id.0).collect();
        assert_eq!(ids, vec![11, 12]);
    }

    #[test]
    fn skip_past_the_end_is_corrected() {
        let params = SearchParams::parse("skip=40&limit=10");
        let mut state = AdminViewState::default();
        let ticket = state.page.begin_listing(params.listing_key());

        let followups = apply_event(
            &mut state,
            UiEvent::ListingLoaded {
                ticket,
                listing: listing(&[], 25),
            },
            &params,
        );
        assert_eq!(followups, vec![Followup::CorrectSkip(20)]);
    }

    #[test]
    fn tag_listing_keeps_skip_even_when_total_is_smaller() {
        let params = SearchParams::parse("skip=20&limit=10&tag=history");
        let mut state = AdminViewState::default();
        let ticket = state.page.begin_listing(params.listing_key());

        let followups = apply_event(
            &mut state,
            UiEvent::ListingLoaded {
                ticket,
                listing: listing(&[5, 10, 15, 20, 25], 5),
            },
            &params,
        );
        assert!(followups.is_empty());
        assert_eq!(state.page.rows(None).len(), 5);
    }

    #[test]
    fn failure_keeps_rows_and_raises_banner() {
        let params = SearchParams::default();
        let mut state = AdminViewState::default();
        let ticket = state.page.begin_listing(params.listing_key());
        apply_event(
            &mut state,
            UiEvent::ListingLoaded {
                ticket,
                listing: listing(&[1], 1),
            },
            &params,
        );

        let ticket = state.page.begin_listing(params.listing_key());
        let error = UiError::from_message(UiErrorContext::LoadPosts, "connection refused");
        apply_event(&mut state, UiEvent::ListingFailed { ticket, error }, &params);

        assert_eq!(state.page.rows(None).len(), 1);
        let banner = state.banner.as_ref().expect("banner");
        assert_eq!(banner.category(), UiErrorCategory::Transport);
        assert!(!state.page.is_loading(None));
    }

    #[test]
    fn mutations_trigger_refetch() {
        let params = SearchParams::parse("search=love");
        let mut state = AdminViewState {
            mutation_in_flight: true,
            ..AdminViewState::default()
        };
        let followups = apply_event(&mut state, UiEvent::PostDeleted(PostId(3)), &params);
        assert_eq!(
            followups,
            vec![
                Followup::CloseEditors,
                Followup::RefetchListing,
                Followup::RefetchSearch
            ]
        );
        assert!(!state.mutation_in_flight);
        assert_eq!(state.status, "Deleted post #3");
    }

    #[test]
    fn lookup_failures_leave_pending_mutation_busy() {
        let params = SearchParams::default();
        let mut state = AdminViewState {
            mutation_in_flight: true,
            ..AdminViewState::default()
        };
        let error = UiError::from_message(UiErrorContext::LoadTags, "connection refused");
        apply_event(&mut state, UiEvent::Error(error), &params);
        assert!(state.mutation_in_flight);
        assert!(state.banner.is_some());

        assert!(state.begin_user(UserId(4)));
        let error = UiError::from_message(UiErrorContext::LoadUser, "connection refused");
        apply_event(
            &mut state,
            UiEvent::UserFailed {
                user_id: UserId(4),
                error,
            },
            &params,
        );
        assert!(state.mutation_in_flight);
    }

    #[test]
    fn failed_user_lookup_is_shown_and_retried() {
        let params = SearchParams::default();
        let mut state = AdminViewState::default();
        assert!(state.begin_user(UserId(4)));
        assert!(!state.begin_user(UserId(4)));

        let error = UiError::from_message(UiErrorContext::LoadUser, "network unreachable");
        apply_event(
            &mut state,
            UiEvent::UserFailed {
                user_id: UserId(4),
                error,
            },
            &params,
        );
        let lookup = state.user.as_ref().expect("lookup");
        assert_eq!(lookup.key, UserId(4));
        assert_eq!(lookup.state, Fetch::Failed("network unreachable".into()));
        assert!(state.begin_user(UserId(4)));
    }

    #[test]
    fn comments_for_another_post_are_ignored() {
        let params = SearchParams::default();
        let mut state = AdminViewState::default();
        assert!(state.begin_comments(PostId(2)));

        apply_event(
            &mut state,
            UiEvent::CommentsLoaded {
                post_id: PostId(1),
                comments: Vec::new(),
            },
            &params,
        );
        assert_eq!(
            lookup_state(state.comments.as_ref(), &PostId(2)),
            Some(&Fetch::Pending)
        );
        assert_eq!(lookup_state(state.comments.as_ref(), &PostId(1)), None);

        apply_event(
            &mut state,
            UiEvent::CommentsLoaded {
                post_id: PostId(2),
                comments: Vec::new(),
            },
            &params,
        );
        assert_eq!(
            state.comments.as_ref().map(|lookup| &lookup.state),
            Some(&Fetch::Ready(Vec::new()))
        );
    }

    #[test]
    fn failed_mutation_keeps_editors_open() {
        let params = SearchParams::default();
        let mut state = AdminViewState {
            mutation_in_flight: true,
            ..AdminViewState::default()
        };
        let error = UiError::from_client(
            UiErrorContext::UpdatePost,
            &ClientError::from(ValidationError::EmptyBody),
        );
        let followups = apply_event(&mut state, UiEvent::Error(error), &params);
        assert!(followups.is_empty());
        assert!(!state.mutation_in_flight);
        assert!(state.banner.is_some());
    }
}
