//! Post orchestration: detail assembly, likes, comments, the composer, and
//! the editor. Every mutation is an independent read-then-write against
//! shared remote state; there is no concurrency token, and lost updates
//! between simultaneous clients are an accepted limitation.

use std::sync::Arc;

use time::OffsetDateTime;

use crate::application::error::AppError;
use crate::application::gateway::{GeocodeGateway, PostsGateway};
use crate::domain::entities::{NewPost, PostPatch, PostRecord};
use crate::domain::error::DomainError;
use crate::domain::repost::RepostTag;
use crate::domain::thread::{self, CommentThread};

/// Everything the detail view renders in one pass.
#[derive(Debug, Clone)]
pub struct PostDetail {
    pub post: PostRecord,
    pub thread: CommentThread,
    pub referenced: Option<PostRecord>,
}

/// Field values collected by the composer.
#[derive(Debug, Clone, Default)]
pub struct ComposerInput {
    pub title: String,
    pub location: Option<String>,
    pub travel_type: Option<String>,
    pub photos: Option<String>,
    pub story: Option<String>,
    pub secret: String,
    pub repost_of: Option<i64>,
    pub coordinates: Option<(f64, f64)>,
}

/// Field values collected by the editor; unset fields keep their loaded
/// values.
#[derive(Debug, Clone, Default)]
pub struct EditorInput {
    pub title: Option<String>,
    pub location: Option<String>,
    pub travel_type: Option<String>,
    pub photos: Option<String>,
    pub story: Option<String>,
}

#[derive(Clone)]
pub struct PostService {
    posts: Arc<dyn PostsGateway>,
    geocode: Option<Arc<dyn GeocodeGateway>>,
}

impl PostService {
    pub fn new(posts: Arc<dyn PostsGateway>, geocode: Option<Arc<dyn GeocodeGateway>>) -> Self {
        Self { posts, geocode }
    }

    pub async fn require(&self, id: i64) -> Result<PostRecord, AppError> {
        self.posts
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::PostNotFound { id }.into())
    }

    pub async fn load_detail(&self, id: i64) -> Result<PostDetail, AppError> {
        let post = self.require(id).await?;
        let referenced = self.resolve_repost(&post).await;
        let thread = thread::parse_thread(post.story_text());
        Ok(PostDetail {
            post,
            thread,
            referenced,
        })
    }

    /// Resolve the textual back-reference, if any. Zero or ambiguous matches
    /// resolve to nothing; the reference is best-effort by design of the
    /// stored format.
    async fn resolve_repost(&self, post: &PostRecord) -> Option<PostRecord> {
        let tag = post
            .description
            .as_deref()
            .and_then(RepostTag::parse)
            .or_else(|| post.comments.as_deref().and_then(RepostTag::parse))?;

        match self
            .posts
            .find_by_title_and_username(&tag.title, &tag.username)
            .await
        {
            Ok(mut matches) if matches.len() == 1 => Some(matches.remove(0)),
            Ok(_) => None,
            Err(err) => {
                tracing::debug!(error = %err, "repost lookup failed");
                None
            }
        }
    }

    /// Read-modify-write increment from the caller's loaded copy. The local
    /// copy only advances after the backend accepts the write.
    pub async fn like(&self, post: &mut PostRecord) -> Result<(), AppError> {
        let next = post.like + 1;
        let patch = PostPatch {
            like: Some(next),
            ..PostPatch::default()
        };
        self.posts.update_post(post.id, &patch).await?;
        post.like = next;
        Ok(())
    }

    /// Append a comment by overwriting the whole `comments` field with the
    /// re-encoded thread.
    pub async fn add_comment(
        &self,
        post: &mut PostRecord,
        author: &str,
        content: &str,
    ) -> Result<(), AppError> {
        if content.trim().is_empty() {
            return Err(DomainError::validation("comment text is required").into());
        }

        let updated = thread::append_comment(post.story_text(), author, content);
        let patch = PostPatch {
            comments: Some(updated.clone()),
            updated_at: Some(OffsetDateTime::now_utc()),
            ..PostPatch::default()
        };
        self.posts.update_post(post.id, &patch).await?;
        post.comments = Some(updated);
        Ok(())
    }

    pub async fn create(&self, username: &str, input: ComposerInput) -> Result<PostRecord, AppError> {
        if input.title.trim().is_empty() {
            return Err(DomainError::validation("a journey title is required").into());
        }
        if input.secret.trim().is_empty() {
            return Err(DomainError::validation(
                "a secret key is required to manage the post later",
            )
            .into());
        }

        let location = match input.location {
            Some(value) => value,
            None => self.prefill_location(input.coordinates).await,
        };

        let story = input.story.unwrap_or_default();

        let mut description = None;
        if let Some(original_id) = input.repost_of {
            let original = self.posts.find_by_id(original_id).await?.ok_or_else(|| {
                DomainError::validation("original post not found; check the post id")
            })?;
            let tag = RepostTag {
                title: original.title,
                username: original.username,
            };
            description = Some(format!("{}\n\n{}", tag.banner(), story));
        }

        let record = self
            .posts
            .insert_post(&NewPost {
                title: input.title,
                username: username.to_string(),
                user_password: input.secret,
                photos: input.photos.unwrap_or_default(),
                location,
                travel_type: input.travel_type.unwrap_or_default(),
                comments: story,
                like: 0,
                description,
            })
            .await?;
        Ok(record)
    }

    /// Location prefill when the composer got none: reverse-geocode the
    /// coordinates when a geocoder is configured, fall back to the raw
    /// coordinates, and to blank when there are none.
    async fn prefill_location(&self, coordinates: Option<(f64, f64)>) -> String {
        let Some((lat, lon)) = coordinates else {
            return String::new();
        };

        if let Some(geocode) = &self.geocode {
            match geocode.reverse(lat, lon).await {
                Ok(Some(place)) => return place,
                Ok(None) => {}
                Err(err) => {
                    tracing::debug!(error = %err, "reverse geocoding failed; using raw coordinates");
                }
            }
        }

        format!("{lat:.4}, {lon:.4}")
    }

    /// Replace every editable field. The whole `comments` text is part of
    /// the overwrite, so any comment log accumulated on the post is
    /// discarded here; the comment-append path and this one are not
    /// reconciled.
    pub async fn update(&self, post: &PostRecord, input: EditorInput) -> Result<(), AppError> {
        let title = input.title.unwrap_or_else(|| post.title.clone());
        if title.trim().is_empty() {
            return Err(DomainError::validation("a journey title is required").into());
        }

        let patch = PostPatch {
            title: Some(title),
            location: Some(
                input
                    .location
                    .or_else(|| post.location.clone())
                    .unwrap_or_default(),
            ),
            travel_type: Some(
                input
                    .travel_type
                    .or_else(|| post.travel_type.clone())
                    .unwrap_or_default(),
            ),
            photos: Some(
                input
                    .photos
                    .or_else(|| post.photos.clone())
                    .unwrap_or_default(),
            ),
            comments: Some(
                input
                    .story
                    .or_else(|| post.comments.clone())
                    .unwrap_or_default(),
            ),
            updated_at: Some(OffsetDateTime::now_utc()),
            like: None,
        };
        self.posts.update_post(post.id, &patch).await?;
        Ok(())
    }

    pub async fn delete(&self, id: i64) -> Result<(), AppError> {
        self.posts.delete_post(id).await?;
        Ok(())
    }
}
