//! The listing pipeline: free-text search, a travel-type facet, and a sort
//! key, derived client-side over the full loaded collection.

use std::sync::Arc;

use crate::application::gateway::{GatewayError, PostsGateway};
use crate::domain::entities::PostRecord;
use crate::domain::types::SortKey;

/// The three independent view parameters of the feed.
///
/// Empty strings behave like absent parameters, matching how the search box
/// and facet selector report "no filter".
#[derive(Debug, Clone, Default)]
pub struct FeedQuery {
    pub search: Option<String>,
    pub travel_type: Option<String>,
    pub sort: Option<SortKey>,
}

impl FeedQuery {
    /// Derive the display list. Pure: the base collection is never mutated,
    /// and re-running on unchanged inputs yields identical output.
    pub fn apply(&self, base: &[PostRecord]) -> Vec<PostRecord> {
        let mut filtered: Vec<PostRecord> = base
            .iter()
            .filter(|post| self.matches_search(post) && self.matches_type(post))
            .cloned()
            .collect();

        match self.sort {
            Some(SortKey::CreatedAt) => {
                filtered.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            }
            Some(SortKey::Like) => {
                // Stable sort: ties keep their incoming order.
                filtered.sort_by(|a, b| b.like.cmp(&a.like));
            }
            None => {}
        }

        filtered
    }

    fn matches_search(&self, post: &PostRecord) -> bool {
        let Some(term) = self.search.as_deref().filter(|t| !t.is_empty()) else {
            return true;
        };
        let needle = term.to_lowercase();
        contains_ci(&post.title, &needle)
            || post
                .location
                .as_deref()
                .is_some_and(|location| contains_ci(location, &needle))
    }

    fn matches_type(&self, post: &PostRecord) -> bool {
        let Some(flag) = self.travel_type.as_deref().filter(|f| !f.is_empty()) else {
            return true;
        };
        post.travel_type.as_deref() == Some(flag)
    }
}

fn contains_ci(haystack: &str, lowered_needle: &str) -> bool {
    haystack.to_lowercase().contains(lowered_needle)
}

/// Distinct, non-empty travel types in first-seen order, always drawn from
/// the unfiltered base collection.
pub fn distinct_travel_types(base: &[PostRecord]) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for post in base {
        if let Some(kind) = post.travel_type.as_deref()
            && !kind.is_empty()
            && !seen.iter().any(|s| s == kind)
        {
            seen.push(kind.to_string());
        }
    }
    seen
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedStats {
    pub journeys: usize,
    pub countries: usize,
}

/// Totals for the stats bar. A country is the trailing comma-delimited
/// segment of the location text.
pub fn feed_stats(base: &[PostRecord]) -> FeedStats {
    let mut countries: Vec<String> = Vec::new();
    for post in base {
        let Some(location) = post.location.as_deref() else {
            continue;
        };
        let Some(country) = location.rsplit(',').next().map(str::trim) else {
            continue;
        };
        if !country.is_empty() && !countries.iter().any(|c| c == country) {
            countries.push(country.to_string());
        }
    }
    FeedStats {
        journeys: base.len(),
        countries: countries.len(),
    }
}

/// Everything the feed view renders in one pass.
#[derive(Debug, Clone)]
pub struct FeedPage {
    pub posts: Vec<PostRecord>,
    pub travel_types: Vec<String>,
    pub stats: FeedStats,
}

#[derive(Clone)]
pub struct FeedService {
    posts: Arc<dyn PostsGateway>,
}

impl FeedService {
    pub fn new(posts: Arc<dyn PostsGateway>) -> Self {
        Self { posts }
    }

    /// Load the full collection and derive the view for `query`.
    pub async fn page(&self, query: &FeedQuery) -> Result<FeedPage, GatewayError> {
        let base = self.posts.list_posts().await?;
        Ok(FeedPage {
            posts: query.apply(&base),
            travel_types: distinct_travel_types(&base),
            stats: feed_stats(&base),
        })
    }
}
