use super::*;
use shared::{
    domain::{SortBy, SortOrder},
    search_params::ALL_TAGS,
};

#[test]
fn reads_defaults_from_empty_location() {
    let store = QueryParamStore::from_location("");
    assert_eq!(store.current().skip(), 0);
    assert_eq!(store.current().limit(), 10);
    assert_eq!(store.location(), "");
    assert!(!store.can_go_back());
}

#[test]
fn apply_merges_and_serializes_location() {
    let mut store = QueryParamStore::from_location("?skip=10&limit=10");
    let change = store
        .apply(&SearchParamsPatch::default().with_sort_by(Some(SortBy::Title)))
        .expect("change");
    assert_eq!(change.origin, ChangeOrigin::Patch);
    assert!(change.listing_changed());
    assert!(!change.search_changed());
    assert_eq!(store.location(), "?sortBy=title&skip=10&limit=10");
    assert_eq!(SearchParams::parse(&store.location()), *store.current());
}

#[test]
fn no_op_patch_publishes_nothing() {
    let mut store = QueryParamStore::from_location("?tag=love");
    let mut rx = store.subscribe();
    assert!(store
        .apply(&SearchParamsPatch::default().with_tag("love"))
        .is_none());
    assert!(rx.try_recv().is_err());
    assert!(!store.can_go_back());
}

#[test]
fn subscribers_receive_changes_synchronously() {
    let mut store = QueryParamStore::from_location("");
    let mut rx = store.subscribe();
    store.apply(&SearchParamsPatch::default().with_skip(20));

    let change = rx.try_recv().expect("change published before apply returns");
    assert_eq!(change.previous.skip(), 0);
    assert_eq!(change.current.skip(), 20);
    assert!(change.listing_changed());
}

#[test]
fn search_only_change_does_not_invalidate_listing() {
    let mut store = QueryParamStore::from_location("?skip=10");
    let change = store
        .apply(&SearchParamsPatch::default().with_search("history"))
        .expect("change");
    assert!(!change.listing_changed());
    assert!(change.search_changed());
}

#[test]
fn tag_round_trip_restores_unfiltered_view() {
    let mut store = QueryParamStore::from_location("?skip=20&limit=10");
    let original = store.current().listing_key();

    let tagged = store
        .apply(&SearchParamsPatch::default().with_tag("history"))
        .expect("tagged");
    assert!(tagged.listing_changed());
    assert_eq!(store.current().tag(), Some("history"));

    let cleared = store
        .apply(&SearchParamsPatch::default().with_tag(ALL_TAGS))
        .expect("cleared");
    assert!(cleared.listing_changed());
    assert_eq!(store.current().listing_key(), original);
    assert_eq!(store.location(), "?skip=20&limit=10");
}

#[test]
fn back_and_forward_walk_history() {
    let mut store = QueryParamStore::from_location("");
    store.apply(&SearchParamsPatch::default().with_skip(10));
    store.apply(&SearchParamsPatch::default().with_skip(20));

    let change = store.back().expect("back");
    assert_eq!(change.origin, ChangeOrigin::Back);
    assert_eq!(store.current().skip(), 10);
    store.back().expect("back again");
    assert_eq!(store.current().skip(), 0);
    assert!(store.back().is_none());

    let change = store.forward().expect("forward");
    assert_eq!(change.origin, ChangeOrigin::Forward);
    assert_eq!(change.current.skip(), 10);

    // A new write drops the forward entries.
    store.apply(&SearchParamsPatch::default().with_sort_order(SortOrder::Desc));
    assert!(!store.can_go_forward());
    assert_eq!(store.current().skip(), 10);
}

#[test]
fn replace_location_overwrites_every_field() {
    let mut store = QueryParamStore::from_location("?tag=love&skip=30&search=x");
    let change = store
        .replace_location("limit=20")
        .expect("replaced");
    assert_eq!(change.origin, ChangeOrigin::Location);
    assert_eq!(store.location(), "?limit=20");
    assert_eq!(store.current().tag(), None);
    assert!(change.search_changed());
}

#[test]
fn history_is_bounded() {
    let mut store = QueryParamStore::from_location("");
    for skip in 1..=(HISTORY_LIMIT as u32 + 20) {
        store.apply(&SearchParamsPatch::default().with_skip(skip * 10));
    }
    let mut steps = 0;
    while store.back().is_some() {
        steps += 1;
    }
    assert_eq!(steps, HISTORY_LIMIT - 1);
}
