use serde::{Deserialize, Serialize};

use crate::{
    domain::{AuthorSummary, Comment, Post, Tag, UserId},
    error::ValidationError,
};

/// Response of the listing, tag and search endpoints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PostsPage {
    pub posts: Vec<Post>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

impl PostsPage {
    /// Server-reported total, falling back to the number of rows received.
    pub fn total(&self) -> u64 {
        self.total.unwrap_or(self.posts.len() as u64)
    }
}

/// Response of `GET /comments/post/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentsPage {
    pub comments: Vec<Comment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDirectoryPage {
    pub users: Vec<AuthorSummary>,
}

/// The tags endpoint has served both bare names and `{slug, name, url}` objects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TagEntry {
    Name(String),
    Full(Tag),
}

impl From<TagEntry> for Tag {
    fn from(value: TagEntry) -> Self {
        match value {
            TagEntry::Full(tag) => tag,
            TagEntry::Name(name) => Tag {
                slug: name.clone(),
                name,
                url: String::new(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPost {
    pub title: String,
    pub body: String,
    pub user_id: UserId,
}

impl NewPost {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_fields(&self.title, &self.body, self.user_id)
    }
}

/// The add form starts out attributed to user 1.
impl Default for NewPost {
    fn default() -> Self {
        Self {
            title: String::new(),
            body: String::new(),
            user_id: UserId(1),
        }
    }
}

/// Body of `PUT /posts/{id}`; the client-side author annotation never leaves the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostUpdate {
    pub title: String,
    pub body: String,
    pub tags: Vec<String>,
    pub user_id: UserId,
}

impl PostUpdate {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_fields(&self.title, &self.body, self.user_id)
    }
}

impl From<&Post> for PostUpdate {
    fn from(post: &Post) -> Self {
        Self {
            title: post.title.clone(),
            body: post.body.clone(),
            tags: post.tags.clone(),
            user_id: post.user_id,
        }
    }
}

fn validate_fields(title: &str, body: &str, user_id: UserId) -> Result<(), ValidationError> {
    if title.trim().is_empty() {
        return Err(ValidationError::EmptyTitle);
    }
    if body.trim().is_empty() {
        return Err(ValidationError::EmptyBody);
    }
    if user_id.0 <= 0 {
        return Err(ValidationError::InvalidUserId(user_id.0));
    }
    Ok(())
}
