//! Location-backed filter/sort/pagination state with navigation history.
//!
//! Every accepted write publishes a [`QueryChange`] to subscribers before
//! returning; consumers decide from the change whether to refetch.

use shared::search_params::{SearchParams, SearchParamsPatch};
use tokio::sync::broadcast;
use tracing::debug;

const HISTORY_LIMIT: usize = 100;
const CHANGE_CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeOrigin {
    Patch,
    Location,
    Back,
    Forward,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryChange {
    pub previous: SearchParams,
    pub current: SearchParams,
    pub origin: ChangeOrigin,
}

impl QueryChange {
    /// Skip, limit, sort or tag changed, so the paginated listing is out of date.
    pub fn listing_changed(&self) -> bool {
        self.previous.listing_key() != self.current.listing_key()
    }

    pub fn search_changed(&self) -> bool {
        self.previous.active_search() != self.current.active_search()
    }
}

pub struct QueryParamStore {
    history: Vec<SearchParams>,
    cursor: usize,
    events: broadcast::Sender<QueryChange>,
}

impl QueryParamStore {
    pub fn new(initial: SearchParams) -> Self {
        let (events, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            history: vec![initial],
            cursor: 0,
            events,
        }
    }

    pub fn from_location(location: &str) -> Self {
        Self::new(SearchParams::parse(location))
    }

    pub fn current(&self) -> &SearchParams {
        &self.history[self.cursor]
    }

    /// `?`-prefixed query string, or empty when nothing is set.
    pub fn location(&self) -> String {
        let query = self.current().to_query_string();
        if query.is_empty() {
            query
        } else {
            format!("?{query}")
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<QueryChange> {
        self.events.subscribe()
    }

    /// Merges `patch` into the current params as a new history entry.
    /// Returns `None` (and publishes nothing) when the merge changes nothing.
    pub fn apply(&mut self, patch: &SearchParamsPatch) -> Option<QueryChange> {
        let next = self.current().merged(patch);
        self.push(next, ChangeOrigin::Patch)
    }

    /// Navigates to a pasted or shared location, replacing every field.
    pub fn replace_location(&mut self, location: &str) -> Option<QueryChange> {
        self.push(SearchParams::parse(location), ChangeOrigin::Location)
    }

    pub fn can_go_back(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_go_forward(&self) -> bool {
        self.cursor + 1 < self.history.len()
    }

    pub fn back(&mut self) -> Option<QueryChange> {
        if !self.can_go_back() {
            return None;
        }
        let previous = self.current().clone();
        self.cursor -= 1;
        Some(self.publish(previous, ChangeOrigin::Back))
    }

    pub fn forward(&mut self) -> Option<QueryChange> {
        if !self.can_go_forward() {
            return None;
        }
        let previous = self.current().clone();
        self.cursor += 1;
        Some(self.publish(previous, ChangeOrigin::Forward))
    }

    fn push(&mut self, next: SearchParams, origin: ChangeOrigin) -> Option<QueryChange> {
        if &next == self.current() {
            return None;
        }
        let previous = self.current().clone();
        self.history.truncate(self.cursor + 1);
        self.history.push(next);
        if self.history.len() > HISTORY_LIMIT {
            let overflow = self.history.len() - HISTORY_LIMIT;
            self.history.drain(..overflow);
        }
        self.cursor = self.history.len() - 1;
        Some(self.publish(previous, origin))
    }

    fn publish(&self, previous: SearchParams, origin: ChangeOrigin) -> QueryChange {
        let change = QueryChange {
            previous,
            current: self.current().clone(),
            origin,
        };
        debug!(location = %self.location(), ?origin, "query: location changed");
        // No subscribers is fine; the returned change still reaches the caller.
        let _ = self.events.send(change.clone());
        change
    }
}

#[cfg(test)]
#[path = "tests/query_state_tests.rs"]
mod tests;
