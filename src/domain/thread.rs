//! Codec for the shared `comments` field.
//!
//! The field holds the post's story text followed by an inline, append-only
//! comment log. Each comment is introduced by a literal marker line:
//!
//! ```text
//! --- Comment by <username> ---
//! <content>
//! ```
//!
//! Parsing is a best-effort split on the marker. There is no escaping, so an
//! author name or comment body that itself contains the marker corrupts the
//! decode. Callers only parse for rendering; the parsed form is never
//! written back.

/// Literal delimiter introducing each appended comment.
pub const COMMENT_MARKER: &str = "--- Comment by";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentEntry {
    pub username: String,
    pub content: String,
}

/// The decoded view of a post's `comments` field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommentThread {
    /// Free-form text preceding the first marker.
    pub story: String,
    pub comments: Vec<CommentEntry>,
}

/// Append one comment to the stored text, producing the full replacement
/// value for the `comments` field.
pub fn append_comment(existing: &str, author: &str, content: &str) -> String {
    if existing.is_empty() {
        format!("{COMMENT_MARKER} {author} ---\n{content}")
    } else {
        format!("{existing}\n\n{COMMENT_MARKER} {author} ---\n{content}")
    }
}

/// Split the stored text into story and comment entries.
pub fn parse_thread(text: &str) -> CommentThread {
    let mut segments = text.split(COMMENT_MARKER);
    let story = segments.next().unwrap_or_default().to_string();

    let comments = segments
        .map(|segment| {
            let (user_line, rest) = segment.split_once('\n').unwrap_or((segment, ""));
            let username = user_line.replacen(" ---", "", 1).trim().to_string();
            let content = rest.trim_start_matches('\n').to_string();
            CommentEntry { username, content }
        })
        .collect();

    CommentThread { story, comments }
}
