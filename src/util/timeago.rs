use time::OffsetDateTime;

/// Relative age label used on feed cards: "Just now", "5m ago", "3h ago",
/// "2d ago".
pub fn format_time_ago(then: OffsetDateTime, now: OffsetDateTime) -> String {
    let minutes = (now - then).whole_minutes();
    if minutes < 1 {
        return "Just now".to_string();
    }
    if minutes < 60 {
        return format!("{minutes}m ago");
    }
    if minutes < 1440 {
        return format!("{}h ago", minutes / 60);
    }
    format!("{}d ago", minutes / 1440)
}
