//! Filter/sort/pagination state and its query-string encoding.
//!
//! Every field is optional so that a parsed location re-serializes to the same
//! set of pairs; readers go through the accessors, which apply defaults.

use url::form_urlencoded;

use crate::domain::{SortBy, SortOrder};

pub const DEFAULT_LIMIT: u32 = 10;
pub const LIMIT_CHOICES: [u32; 3] = [10, 20, 30];
/// Tag selector value meaning "no tag filter".
pub const ALL_TAGS: &str = "all";

const KEY_SEARCH: &str = "search";
const KEY_SORT_BY: &str = "sortBy";
const KEY_SORT_ORDER: &str = "sortOrder";
const KEY_TAG: &str = "tag";
const KEY_SKIP: &str = "skip";
const KEY_LIMIT: &str = "limit";

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct SearchParams {
    pub search: Option<String>,
    pub sort_by: Option<SortBy>,
    pub sort_order: Option<SortOrder>,
    pub tag: Option<String>,
    pub skip: Option<u32>,
    pub limit: Option<u32>,
}

/// The subset of [`SearchParams`] that determines the paginated listing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ListingKey {
    pub skip: u32,
    pub limit: u32,
    pub sort_by: Option<SortBy>,
    pub sort_order: SortOrder,
    pub tag: Option<String>,
}

impl SearchParams {
    /// Parses a query string, with or without the leading `?`.
    ///
    /// Unknown keys are ignored. Empty values, unparsable numbers, a zero
    /// limit and unknown sort values are treated as absent. Later duplicates win.
    pub fn parse(query: &str) -> Self {
        let query = query.trim();
        let query = query.strip_prefix('?').unwrap_or(query);
        let mut params = SearchParams::default();

        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            if value.is_empty() {
                continue;
            }
            match &*key {
                KEY_SEARCH => params.search = Some(value.into_owned()),
                KEY_SORT_BY => params.sort_by = SortBy::parse(&value),
                KEY_SORT_ORDER => params.sort_order = SortOrder::parse(&value),
                KEY_TAG => params.tag = Some(value.into_owned()),
                KEY_SKIP => params.skip = value.trim().parse::<u32>().ok(),
                KEY_LIMIT => params.limit = value.trim().parse::<u32>().ok().filter(|limit| *limit > 0),
                _ => {}
            }
        }

        params
    }

    /// Serializes the present fields in a fixed key order, without a leading `?`.
    pub fn to_query_string(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        if let Some(search) = &self.search {
            serializer.append_pair(KEY_SEARCH, search);
        }
        if let Some(sort_by) = self.sort_by {
            serializer.append_pair(KEY_SORT_BY, sort_by.as_str());
        }
        if let Some(sort_order) = self.sort_order {
            serializer.append_pair(KEY_SORT_ORDER, sort_order.as_str());
        }
        if let Some(tag) = &self.tag {
            serializer.append_pair(KEY_TAG, tag);
        }
        if let Some(skip) = self.skip {
            serializer.append_pair(KEY_SKIP, &skip.to_string());
        }
        if let Some(limit) = self.limit {
            serializer.append_pair(KEY_LIMIT, &limit.to_string());
        }
        serializer.finish()
    }

    pub fn search(&self) -> &str {
        self.search.as_deref().unwrap_or_default()
    }

    /// The trimmed search term when one is active.
    pub fn active_search(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|term| !term.is_empty())
    }

    pub fn sort_by(&self) -> Option<SortBy> {
        self.sort_by
    }

    pub fn sort_order(&self) -> SortOrder {
        self.sort_order.unwrap_or_default()
    }

    /// The tag filter, with `"all"` and blank values meaning no filter.
    pub fn tag(&self) -> Option<&str> {
        self.tag
            .as_deref()
            .map(str::trim)
            .filter(|tag| !tag.is_empty() && *tag != ALL_TAGS)
    }

    pub fn skip(&self) -> u32 {
        self.skip.unwrap_or(0)
    }

    pub fn limit(&self) -> u32 {
        self.limit.filter(|limit| *limit > 0).unwrap_or(DEFAULT_LIMIT)
    }

    pub fn listing_key(&self) -> ListingKey {
        ListingKey {
            skip: self.skip(),
            limit: self.limit(),
            sort_by: self.sort_by(),
            sort_order: self.sort_order(),
            tag: self.tag().map(str::to_string),
        }
    }

    pub fn merged(&self, patch: &SearchParamsPatch) -> SearchParams {
        SearchParams {
            search: patch.search.apply(&self.search),
            sort_by: patch.sort_by.apply(&self.sort_by),
            sort_order: patch.sort_order.apply(&self.sort_order),
            tag: patch.tag.apply(&self.tag),
            skip: patch.skip.apply(&self.skip),
            limit: patch.limit.apply(&self.limit),
        }
    }
}

/// One field of a partial update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FieldUpdate<T> {
    #[default]
    Keep,
    Set(T),
    Clear,
}

impl<T: Clone> FieldUpdate<T> {
    fn apply(&self, current: &Option<T>) -> Option<T> {
        match self {
            FieldUpdate::Keep => current.clone(),
            FieldUpdate::Set(value) => Some(value.clone()),
            FieldUpdate::Clear => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchParamsPatch {
    pub search: FieldUpdate<String>,
    pub sort_by: FieldUpdate<SortBy>,
    pub sort_order: FieldUpdate<SortOrder>,
    pub tag: FieldUpdate<String>,
    pub skip: FieldUpdate<u32>,
    pub limit: FieldUpdate<u32>,
}

impl SearchParamsPatch {
    /// A patch that turns any params into exactly `params`.
    pub fn replace_with(params: &SearchParams) -> Self {
        fn field<T: Clone>(value: &Option<T>) -> FieldUpdate<T> {
            match value {
                Some(value) => FieldUpdate::Set(value.clone()),
                None => FieldUpdate::Clear,
            }
        }
        Self {
            search: field(&params.search),
            sort_by: field(&params.sort_by),
            sort_order: field(&params.sort_order),
            tag: field(&params.tag),
            skip: field(&params.skip),
            limit: field(&params.limit),
        }
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        let search = search.into();
        self.search = if search.is_empty() {
            FieldUpdate::Clear
        } else {
            FieldUpdate::Set(search)
        };
        self
    }

    /// `"all"` or a blank tag clears the filter.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        let tag = tag.into();
        self.tag = if tag.trim().is_empty() || tag == ALL_TAGS {
            FieldUpdate::Clear
        } else {
            FieldUpdate::Set(tag)
        };
        self
    }

    pub fn with_sort_by(mut self, sort_by: Option<SortBy>) -> Self {
        self.sort_by = match sort_by {
            Some(sort_by) => FieldUpdate::Set(sort_by),
            None => FieldUpdate::Clear,
        };
        self
    }

    pub fn with_sort_order(mut self, sort_order: SortOrder) -> Self {
        self.sort_order = FieldUpdate::Set(sort_order);
        self
    }

    pub fn with_skip(mut self, skip: u32) -> Self {
        self.skip = FieldUpdate::Set(skip);
        self
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = if limit == 0 {
            FieldUpdate::Clear
        } else {
            FieldUpdate::Set(limit)
        };
        self
    }
}
