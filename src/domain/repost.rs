//! The textual back-reference a repost carries to its original.
//!
//! Reposts hold no foreign key. The link is a banner embedded in stored
//! text, `Repost of: "<title>" by <username>`, re-parsed at read time and
//! resolved by an exact title + username lookup.

const REPOST_PREFIX: &str = "Repost of: \"";
const BY_SEPARATOR: &str = "\" by ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepostTag {
    pub title: String,
    pub username: String,
}

impl RepostTag {
    /// Extract the back-reference from stored text, if present.
    ///
    /// The title runs greedily to the last `" by ` on the banner line, so a
    /// quoted title survives as long as the author name does not contain the
    /// separator itself.
    pub fn parse(text: &str) -> Option<Self> {
        let start = text.find(REPOST_PREFIX)? + REPOST_PREFIX.len();
        let line = text[start..].lines().next()?;
        let sep = line.rfind(BY_SEPARATOR)?;
        let title = &line[..sep];
        let username = &line[sep + BY_SEPARATOR.len()..];
        if title.is_empty() || username.is_empty() {
            return None;
        }
        Some(Self {
            title: title.to_string(),
            username: username.to_string(),
        })
    }

    /// The banner line written into a repost's `description`.
    pub fn banner(&self) -> String {
        format!("Repost of: \"{}\" by {}", self.title, self.username)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_plain_banner() {
        let tag = RepostTag::parse("Repost of: \"Paris Trip\" by alice").expect("tag");
        assert_eq!(tag.title, "Paris Trip");
        assert_eq!(tag.username, "alice");
    }

    #[test]
    fn parses_banner_followed_by_story() {
        let text = "Repost of: \"Tokyo\" by bob\n\nMy take on the same route.";
        let tag = RepostTag::parse(text).expect("tag");
        assert_eq!(tag.title, "Tokyo");
        assert_eq!(tag.username, "bob");
    }

    #[test]
    fn quoted_title_resolves_to_last_separator() {
        let tag = RepostTag::parse("Repost of: \"Stopover \" by the sea\" by carol").expect("tag");
        assert_eq!(tag.title, "Stopover \" by the sea");
        assert_eq!(tag.username, "carol");
    }

    #[test]
    fn banner_round_trips_through_parse() {
        let tag = RepostTag {
            title: "Paris Trip".to_string(),
            username: "alice".to_string(),
        };
        assert_eq!(RepostTag::parse(&tag.banner()), Some(tag));
    }

    #[test]
    fn missing_banner_yields_nothing() {
        assert_eq!(RepostTag::parse("just a story"), None);
        assert_eq!(RepostTag::parse("Repost of: \"half"), None);
    }
}
