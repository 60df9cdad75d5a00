//! What the post table displays: search results vs. the paginated listing,
//! plus the bookkeeping that keeps late responses from overwriting newer ones.

use shared::{
    domain::{Post, PostId},
    search_params::ListingKey,
};

use crate::listing::Listing;

/// Identifies one issued request by generation and the parameters it was issued with.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestTicket<K> {
    pub generation: u64,
    pub key: K,
}

pub type ListingTicket = RequestTicket<ListingKey>;
pub type SearchTicket = RequestTicket<String>;

#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    pub term: String,
    pub listing: Listing,
}

/// Non-empty search term → last search result (empty until one arrives);
/// otherwise the paginated listing.
pub fn displayed_rows<'a>(
    search_term: Option<&str>,
    search: Option<&'a SearchResult>,
    listing: Option<&'a Listing>,
) -> &'a [Post] {
    let active = search_term.map(str::trim).is_some_and(|term| !term.is_empty());
    let source = if active {
        search.map(|result| &result.listing)
    } else {
        listing
    };
    source.map(|listing| listing.posts.as_slice()).unwrap_or(&[])
}

/// Same selection rule as [`displayed_rows`], for the row count.
pub fn displayed_total(
    search_term: Option<&str>,
    search: Option<&SearchResult>,
    listing: Option<&Listing>,
) -> u64 {
    let active = search_term.map(str::trim).is_some_and(|term| !term.is_empty());
    if active {
        search.map(|result| result.listing.total).unwrap_or(0)
    } else {
        listing.map(|listing| listing.total).unwrap_or(0)
    }
}

#[derive(Debug, Default)]
pub struct PageState {
    listing: Option<Listing>,
    search: Option<SearchResult>,
    next_generation: u64,
    pending_listing: Option<ListingTicket>,
    pending_search: Option<SearchTicket>,
}

impl PageState {
    pub fn new() -> Self {
        Self::default()
    }

    fn issue_generation(&mut self) -> u64 {
        self.next_generation += 1;
        self.next_generation
    }

    /// Issues a ticket for a listing request; any earlier pending ticket becomes stale.
    pub fn begin_listing(&mut self, key: ListingKey) -> ListingTicket {
        let ticket = RequestTicket {
            generation: self.issue_generation(),
            key,
        };
        self.pending_listing = Some(ticket.clone());
        ticket
    }

    pub fn begin_search(&mut self, term: impl Into<String>) -> SearchTicket {
        let ticket = RequestTicket {
            generation: self.issue_generation(),
            key: term.into(),
        };
        self.pending_search = Some(ticket.clone());
        ticket
    }

    /// Applies a listing if `ticket` is the latest issued; returns whether it was applied.
    pub fn finish_listing(&mut self, ticket: &ListingTicket, listing: Listing) -> bool {
        if self.pending_listing.as_ref() != Some(ticket) {
            return false;
        }
        self.pending_listing = None;
        self.listing = Some(listing);
        true
    }

    /// Clears the loading state for a failed request; previous rows stay visible.
    pub fn fail_listing(&mut self, ticket: &ListingTicket) -> bool {
        if self.pending_listing.as_ref() != Some(ticket) {
            return false;
        }
        self.pending_listing = None;
        true
    }

    pub fn finish_search(&mut self, ticket: &SearchTicket, listing: Listing) -> bool {
        if self.pending_search.as_ref() != Some(ticket) {
            return false;
        }
        self.pending_search = None;
        self.search = Some(SearchResult {
            term: ticket.key.clone(),
            listing,
        });
        true
    }

    pub fn fail_search(&mut self, ticket: &SearchTicket) -> bool {
        if self.pending_search.as_ref() != Some(ticket) {
            return false;
        }
        self.pending_search = None;
        true
    }

    pub fn listing(&self) -> Option<&Listing> {
        self.listing.as_ref()
    }

    pub fn search_result(&self) -> Option<&SearchResult> {
        self.search.as_ref()
    }

    pub fn rows(&self, search_term: Option<&str>) -> &[Post] {
        displayed_rows(search_term, self.search.as_ref(), self.listing.as_ref())
    }

    pub fn total(&self, search_term: Option<&str>) -> u64 {
        displayed_total(search_term, self.search.as_ref(), self.listing.as_ref())
    }

    pub fn is_loading(&self, search_term: Option<&str>) -> bool {
        let active = search_term.map(str::trim).is_some_and(|term| !term.is_empty());
        if active {
            self.pending_search.is_some()
        } else {
            self.pending_listing.is_some()
        }
    }

    pub fn find_post(&self, id: PostId) -> Option<&Post> {
        self.listing
            .iter()
            .chain(self.search.iter().map(|result| &result.listing))
            .flat_map(|listing| listing.posts.iter())
            .find(|post| post.id == id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment<'a> {
    pub text: &'a str,
    pub highlighted: bool,
}

/// Splits `text` around case-insensitive, literal occurrences of `query`.
pub fn highlight_segments<'a>(text: &'a str, query: &str) -> Vec<Segment<'a>> {
    let needle: Vec<char> = query.trim().chars().collect();
    if needle.is_empty() || text.is_empty() {
        return vec![Segment {
            text,
            highlighted: false,
        }];
    }

    let mut segments = Vec::new();
    let mut plain_start = 0;
    let mut index = 0;
    while index < text.len() {
        if let Some(end) = match_at(text, index, &needle) {
            if plain_start < index {
                segments.push(Segment {
                    text: &text[plain_start..index],
                    highlighted: false,
                });
            }
            segments.push(Segment {
                text: &text[index..end],
                highlighted: true,
            });
            index = end;
            plain_start = end;
        } else {
            index += text[index..].chars().next().map_or(1, char::len_utf8);
        }
    }
    if plain_start < text.len() {
        segments.push(Segment {
            text: &text[plain_start..],
            highlighted: false,
        });
    }
    segments
}

fn match_at(text: &str, start: usize, needle: &[char]) -> Option<usize> {
    let mut chars = text[start..].char_indices();
    let mut end = start;
    for expected in needle {
        let (offset, actual) = chars.next()?;
        if !chars_eq_ignore_case(actual, *expected) {
            return None;
        }
        end = start + offset + actual.len_utf8();
    }
    Some(end)
}

fn chars_eq_ignore_case(a: char, b: char) -> bool {
    a == b || a.to_lowercase().eq(b.to_lowercase())
}
