//! Terminal rendering of the journal views. Pure functions from typed view
//! contexts to text; the runners decide what to print.

use time::OffsetDateTime;
use time::macros::format_description;

use crate::application::feed::FeedPage;
use crate::application::guard;
use crate::application::posts::PostDetail;
use crate::domain::entities::PostRecord;
use crate::domain::types::Theme;
use crate::util::timeago;

const PREVIEW_CHARS: usize = 150;

pub fn render_feed(page: &FeedPage, show_content: bool, theme: Theme, now: OffsetDateTime) -> String {
    let mut out = String::new();
    let flourish = match theme {
        Theme::Light => "☀",
        Theme::Dark => "☾",
    };
    out.push_str(&format!("{flourish} Travel Collection\n"));
    out.push_str("Discover amazing places and travel experiences\n\n");

    if page.posts.is_empty() {
        out.push_str("No travel posts yet\n");
        out.push_str("Be the first to share your travel experience!\n\n");
    } else {
        for post in &page.posts {
            out.push_str(&render_card(post, show_content, now));
            out.push('\n');
        }
    }

    if !page.travel_types.is_empty() {
        out.push_str(&format!("Types: {}\n", page.travel_types.join(", ")));
    }
    out.push_str(&format!(
        "Total Journeys: {} · Countries Visited: {}\n",
        page.stats.journeys, page.stats.countries
    ));
    out
}

fn render_card(post: &PostRecord, show_content: bool, now: OffsetDateTime) -> String {
    let mut out = String::new();

    out.push_str(&format!("#{} {}", post.id, post.title));
    if let Some(kind) = nonempty(post.travel_type.as_deref()) {
        out.push_str(&format!(" [{kind}]"));
    }
    out.push('\n');

    out.push_str(&format!(
        "    {} · 📍 {} · ❤ {}\n",
        timeago::format_time_ago(post.created_at, now),
        post.location.as_deref().unwrap_or(""),
        post.like
    ));

    if show_content {
        if let Some(photos) = nonempty(post.photos.as_deref()) {
            out.push_str(&format!("    🖼 {photos}\n"));
        }
        if let Some(story) = nonempty(post.comments.as_deref()) {
            out.push_str(&format!("    {}\n", preview(story)));
        }
    }

    out.push_str(&format!("    by {}\n", post.username));
    out
}

pub fn render_detail(detail: &PostDetail, viewer: &str, now: OffsetDateTime) -> String {
    let post = &detail.post;
    let mut out = String::new();

    out.push_str(&post.title);
    if let Some(kind) = nonempty(post.travel_type.as_deref()) {
        out.push_str(&format!(" [{kind}]"));
    }
    out.push('\n');

    out.push_str(&format!(
        "👤 {} · 📍 {} · 📅 {} ({})\n",
        post.username,
        post.location.as_deref().unwrap_or(""),
        format_long_date(post.created_at),
        timeago::format_time_ago(post.created_at, now)
    ));

    if let Some(photos) = nonempty(post.photos.as_deref()) {
        out.push_str(&format!("🖼 {photos}\n"));
    }

    if let Some(referenced) = &detail.referenced {
        out.push_str("\nReferenced Post:\n");
        out.push_str(&format!("  #{} {}\n", referenced.id, referenced.title));
        out.push_str(&format!(
            "  By {} • {}\n",
            referenced.username,
            referenced.location.as_deref().unwrap_or("")
        ));
    }

    out.push_str(&format!("\n❤ {} Likes\n", post.like));

    if guard::owner_actions_visible(post, viewer) {
        out.push_str("Owner actions available: edit · delete (secret key required)\n");
    }

    if !detail.thread.story.trim().is_empty() {
        out.push_str("\nStory & Experience\n");
        out.push_str(detail.thread.story.trim_end());
        out.push('\n');
    }

    if !detail.thread.comments.is_empty() {
        out.push_str(&format!("\nComments ({})\n", detail.thread.comments.len()));
        for comment in &detail.thread.comments {
            out.push_str(&format!("  {}:\n", comment.username));
            for line in comment.content.trim_end().lines() {
                out.push_str(&format!("    {line}\n"));
            }
        }
    }

    out
}

fn nonempty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// First 150 characters of the story, single line.
fn preview(text: &str) -> String {
    let flattened = text.replace('\n', " ");
    let truncated: String = flattened.chars().take(PREVIEW_CHARS).collect();
    format!("{truncated}...")
}

fn format_long_date(at: OffsetDateTime) -> String {
    let format = format_description!(
        "[month repr:long] [day padding:none], [year] [hour repr:12]:[minute] [period]"
    );
    at.format(&format).unwrap_or_else(|_| at.to_string())
}
