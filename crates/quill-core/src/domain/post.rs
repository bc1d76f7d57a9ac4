use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::identity::Identity;
use super::user::User;
use crate::error::{DomainError, FieldError};

const TITLE_MIN_CHARS: usize = 3;
const TITLE_MAX_CHARS: usize = 200;
const BODY_MIN_CHARS: usize = 10;
const EXCERPT_MAX_CHARS: usize = 200;
const WORDS_PER_MINUTE: usize = 200;

/// Publication state of a post. Drafts are visible to their author only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    Draft,
    #[default]
    Published,
}

impl PostStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostStatus::Draft => "draft",
            PostStatus::Published => "published",
        }
    }
}

impl fmt::Display for PostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PostStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(PostStatus::Draft),
            "published" => Ok(PostStatus::Published),
            _ => Err(DomainError::invalid(
                "status",
                "Status must be either draft or published",
            )),
        }
    }
}

/// Post entity - a blog article owned by exactly one author.
///
/// `excerpt` and `read_time` are derived from `body` and refreshed on every
/// write that changes it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub body: String,
    pub excerpt: String,
    pub status: PostStatus,
    pub tags: BTreeSet<String>,
    pub read_time: u32,
    pub published_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    /// Build a new post for `author_id` from client input.
    pub fn compose(author_id: Uuid, draft: PostDraft) -> Result<Self, DomainError> {
        let mut errors = Vec::new();
        let title = collect(validate_title(&draft.title), &mut errors);
        let body = collect(validate_body(&draft.body), &mut errors);
        if !errors.is_empty() {
            return Err(DomainError::Validation(errors));
        }
        let (title, body) = (title.unwrap_or_default(), body.unwrap_or_default());

        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            author_id,
            excerpt: excerpt_of(&body),
            read_time: read_time_of(&body),
            title,
            body,
            status: draft.status.unwrap_or_default(),
            tags: normalize_tags(draft.tags.unwrap_or_default()),
            published_date: now,
            created_at: now,
            updated_at: now,
        })
    }

    /// Apply a partial update. Nothing is modified unless every supplied
    /// field is valid.
    pub fn apply(&mut self, changes: PostChanges) -> Result<(), DomainError> {
        let mut errors = Vec::new();
        let title = changes
            .title
            .as_deref()
            .and_then(|t| collect(validate_title(t), &mut errors));
        let body = changes
            .body
            .as_deref()
            .and_then(|b| collect(validate_body(b), &mut errors));
        if !errors.is_empty() {
            return Err(DomainError::Validation(errors));
        }

        if let Some(title) = title {
            self.title = title;
        }
        if let Some(body) = body {
            self.excerpt = excerpt_of(&body);
            self.read_time = read_time_of(&body);
            self.body = body;
        }
        if let Some(status) = changes.status {
            self.status = status;
        }
        if let Some(tags) = changes.tags {
            self.tags = normalize_tags(tags);
        }
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn is_authored_by(&self, user_id: Uuid) -> bool {
        self.author_id == user_id
    }
}

/// Client input for a new post. Author, excerpt and read time are never
/// taken from the client.
#[derive(Debug, Clone, Default)]
pub struct PostDraft {
    pub title: String,
    pub body: String,
    pub status: Option<PostStatus>,
    pub tags: Option<Vec<String>>,
}

/// Partial update; `None` leaves the field unchanged.
#[derive(Debug, Clone, Default)]
pub struct PostChanges {
    pub title: Option<String>,
    pub body: Option<String>,
    pub status: Option<PostStatus>,
    pub tags: Option<Vec<String>>,
}

/// Display-safe subset of the author's account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorSummary {
    pub id: Uuid,
    pub username: String,
    pub email: String,
}

impl From<&User> for AuthorSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
        }
    }
}

impl From<&Identity> for AuthorSummary {
    fn from(identity: &Identity) -> Self {
        Self {
            id: identity.user_id,
            username: identity.username.clone(),
            email: identity.email.clone(),
        }
    }
}

/// A post joined with its author, as returned to callers.
#[derive(Debug, Clone)]
pub struct PostWithAuthor {
    pub post: Post,
    pub author: Option<AuthorSummary>,
}

/// First 200 characters of the body, trimmed, with `...` appended when the
/// body was cut.
pub fn excerpt_of(body: &str) -> String {
    let mut chars = body.chars();
    let head: String = chars.by_ref().take(EXCERPT_MAX_CHARS).collect();
    let mut excerpt = head.trim().to_string();
    if chars.next().is_some() {
        excerpt.push_str("...");
    }
    excerpt
}

/// Minutes to read at 200 words per minute, never less than one.
pub fn read_time_of(body: &str) -> u32 {
    let words = body.split_whitespace().count();
    words.div_ceil(WORDS_PER_MINUTE).max(1) as u32
}

fn validate_title(title: &str) -> Result<String, FieldError> {
    let title = title.trim();
    let len = title.chars().count();
    if (TITLE_MIN_CHARS..=TITLE_MAX_CHARS).contains(&len) {
        Ok(title.to_string())
    } else {
        Err(FieldError::new(
            "title",
            format!("Title must be between {TITLE_MIN_CHARS} and {TITLE_MAX_CHARS} characters"),
        ))
    }
}

fn validate_body(body: &str) -> Result<String, FieldError> {
    if body.chars().count() >= BODY_MIN_CHARS {
        Ok(body.to_string())
    } else {
        Err(FieldError::new(
            "body",
            format!("Body must be at least {BODY_MIN_CHARS} characters long"),
        ))
    }
}

fn normalize_tags(tags: Vec<String>) -> BTreeSet<String> {
    tags.into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

fn collect<T>(result: Result<T, FieldError>, errors: &mut Vec<FieldError>) -> Option<T> {
    result.map_err(|e| errors.push(e)).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(n: usize) -> String {
        vec!["word"; n].join(" ")
    }

    fn draft(title: &str, body: &str) -> PostDraft {
        PostDraft {
            title: title.to_string(),
            body: body.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_short_body_excerpt_is_whole_body() {
        let post = Post::compose(Uuid::new_v4(), draft("Hi there", "0123456789")).unwrap();

        assert_eq!(post.excerpt, "0123456789");
        assert_eq!(post.read_time, 1);
        assert_eq!(post.status, PostStatus::Published);
    }

    #[test]
    fn test_long_body_excerpt_is_cut_with_ellipsis() {
        let body = "x".repeat(250);
        let excerpt = excerpt_of(&body);

        assert_eq!(excerpt, format!("{}...", "x".repeat(200)));
    }

    #[test]
    fn test_exactly_200_chars_has_no_ellipsis() {
        let body = "y".repeat(200);
        assert_eq!(excerpt_of(&body), body);
    }

    #[test]
    fn test_excerpt_counts_characters_not_bytes() {
        let body = "é".repeat(201);
        let excerpt = excerpt_of(&body);

        assert_eq!(excerpt.chars().count(), 203);
        assert!(excerpt.ends_with("..."));
    }

    #[test]
    fn test_read_time() {
        assert_eq!(read_time_of(&words(150)), 1);
        assert_eq!(read_time_of(&words(200)), 1);
        assert_eq!(read_time_of(&words(201)), 2);
        assert_eq!(read_time_of(&words(450)), 3);
        assert_eq!(read_time_of("          "), 1);
    }

    #[test]
    fn test_compose_rejects_bad_fields_together() {
        let err = Post::compose(Uuid::new_v4(), draft("Hi", "short")).unwrap_err();

        match err {
            DomainError::Validation(fields) => {
                assert_eq!(fields.len(), 2);
                assert_eq!(fields[0].field, "title");
                assert_eq!(fields[1].field, "body");
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_title_is_trimmed_before_length_check() {
        assert!(Post::compose(Uuid::new_v4(), draft("  ab  ", "0123456789")).is_err());

        let post = Post::compose(Uuid::new_v4(), draft("  abc  ", "0123456789")).unwrap();
        assert_eq!(post.title, "abc");

        let too_long = "t".repeat(201);
        assert!(Post::compose(Uuid::new_v4(), draft(&too_long, "0123456789")).is_err());
    }

    #[test]
    fn test_tags_behave_as_a_set() {
        let post = Post::compose(
            Uuid::new_v4(),
            PostDraft {
                tags: Some(vec![
                    " rust ".into(),
                    "web".into(),
                    "rust".into(),
                    "".into(),
                ]),
                ..draft("Tagged", "0123456789")
            },
        )
        .unwrap();

        assert_eq!(
            post.tags.into_iter().collect::<Vec<_>>(),
            vec!["rust".to_string(), "web".to_string()]
        );
    }

    #[test]
    fn test_apply_recomputes_derived_fields() {
        let mut post = Post::compose(Uuid::new_v4(), draft("Title", "0123456789")).unwrap();
        let original_title = post.title.clone();

        post.apply(PostChanges {
            body: Some(words(450)),
            ..Default::default()
        })
        .unwrap();

        assert_eq!(post.title, original_title);
        assert_eq!(post.read_time, 3);
        assert!(post.excerpt.ends_with("..."));
    }

    #[test]
    fn test_apply_is_all_or_nothing() {
        let mut post = Post::compose(Uuid::new_v4(), draft("Title", "0123456789")).unwrap();

        let result = post.apply(PostChanges {
            title: Some("A brand new title".into()),
            body: Some("tiny".into()),
            status: Some(PostStatus::Draft),
            ..Default::default()
        });

        assert!(result.is_err());
        assert_eq!(post.title, "Title");
        assert_eq!(post.status, PostStatus::Published);
    }

    #[test]
    fn test_status_parsing() {
        assert_eq!("draft".parse::<PostStatus>().unwrap(), PostStatus::Draft);
        assert_eq!(
            "published".parse::<PostStatus>().unwrap(),
            PostStatus::Published
        );
        assert!("archived".parse::<PostStatus>().is_err());
    }
}
