//! Properties of the listing pipeline over an in-memory collection.

use time::OffsetDateTime;
use time::macros::datetime;
use wayfare::application::feed::{FeedQuery, distinct_travel_types, feed_stats};
use wayfare::domain::entities::PostRecord;
use wayfare::domain::types::SortKey;

fn post(
    id: i64,
    title: &str,
    location: &str,
    travel_type: &str,
    like: i64,
    created_at: OffsetDateTime,
) -> PostRecord {
    PostRecord {
        id,
        title: title.to_string(),
        username: "someone".to_string(),
        user_password: String::new(),
        location: (!location.is_empty()).then(|| location.to_string()),
        travel_type: (!travel_type.is_empty()).then(|| travel_type.to_string()),
        photos: None,
        comments: None,
        like,
        description: None,
        created_at,
        updated_at: None,
    }
}

fn sample() -> Vec<PostRecord> {
    let t1 = datetime!(2024-05-01 10:00 UTC);
    let t2 = datetime!(2024-05-02 10:00 UTC);
    vec![
        post(1, "Paris Trip", "Paris, France", "Cultural", 5, t1),
        post(2, "Tokyo", "Tokyo, Japan", "Adventure", 9, t2),
    ]
}

#[test]
fn search_keeps_exactly_the_matching_posts() {
    let base = sample();
    let query = FeedQuery {
        search: Some("par".to_string()),
        ..FeedQuery::default()
    };
    let result = query.apply(&base);

    // No false positives.
    for found in &result {
        let title = found.title.to_lowercase();
        let location = found
            .location
            .as_deref()
            .unwrap_or("")
            .to_lowercase();
        assert!(title.contains("par") || location.contains("par"));
    }
    // No false negatives.
    assert_eq!(result.len(), 1);
    assert_eq!(result[0].id, 1);
}

#[test]
fn scenario_sort_by_like_without_search() {
    let base = sample();
    let query = FeedQuery {
        sort: Some(SortKey::Like),
        ..FeedQuery::default()
    };
    let ids: Vec<i64> = query.apply(&base).iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![2, 1]);
}

#[test]
fn like_sort_is_non_increasing_across_the_whole_result() {
    let t = datetime!(2024-05-01 10:00 UTC);
    let base = vec![
        post(1, "A", "", "", 3, t),
        post(2, "B", "", "", 11, t),
        post(3, "C", "", "", 7, t),
        post(4, "D", "", "", 7, t),
        post(5, "E", "", "", 0, t),
    ];
    let query = FeedQuery {
        sort: Some(SortKey::Like),
        ..FeedQuery::default()
    };
    let likes: Vec<i64> = query.apply(&base).iter().map(|p| p.like).collect();
    for pair in likes.windows(2) {
        assert!(pair[0] >= pair[1]);
    }
}

#[test]
fn created_at_sort_is_newest_first() {
    let base = sample();
    let query = FeedQuery {
        sort: Some(SortKey::CreatedAt),
        ..FeedQuery::default()
    };
    let stamps: Vec<OffsetDateTime> = query.apply(&base).iter().map(|p| p.created_at).collect();
    for pair in stamps.windows(2) {
        assert!(pair[0] >= pair[1]);
    }
}

#[test]
fn absent_sort_key_leaves_order_unchanged() {
    let base = sample();
    let query = FeedQuery::default();
    let ids: Vec<i64> = query.apply(&base).iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![1, 2]);
}

#[test]
fn pipeline_is_idempotent_and_does_not_mutate_the_base() {
    let base = sample();
    let query = FeedQuery {
        search: Some("o".to_string()),
        sort: Some(SortKey::Like),
        ..FeedQuery::default()
    };

    let first = query.apply(&base);
    let second = query.apply(&base);
    assert_eq!(first, second);
    assert_eq!(base, sample());
}

#[test]
fn combined_search_and_facet_apply_both_predicates() {
    let t = datetime!(2024-05-01 10:00 UTC);
    let base = vec![
        post(1, "Paris Trip", "Paris, France", "Cultural", 5, t),
        post(2, "Paris Again", "Paris, France", "Adventure", 2, t),
        post(3, "Tokyo", "Tokyo, Japan", "Cultural", 9, t),
    ];
    let query = FeedQuery {
        search: Some("paris".to_string()),
        travel_type: Some("Cultural".to_string()),
        ..FeedQuery::default()
    };
    let ids: Vec<i64> = query.apply(&base).iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![1]);
}

#[test]
fn facets_and_stats_come_from_the_unfiltered_base() {
    let base = sample();
    assert_eq!(distinct_travel_types(&base), vec!["Cultural", "Adventure"]);

    let stats = feed_stats(&base);
    assert_eq!(stats.journeys, 2);
    assert_eq!(stats.countries, 2);
}
