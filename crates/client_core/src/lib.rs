pub mod api;
pub mod config;
pub mod error;
pub mod listing;
pub mod pagination;
pub mod query_state;
pub mod view;

pub use api::{HttpPostsClient, PageRequest, PostsApi};
pub use config::{load_settings, Settings};
pub use error::{ClientError, ClientErrorKind};
pub use listing::{fetch_listing, fetch_search, Listing};
pub use pagination::PageWindow;
pub use query_state::{ChangeOrigin, QueryChange, QueryParamStore};
pub use view::{highlight_segments, ListingTicket, PageState, SearchTicket, Segment};

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
