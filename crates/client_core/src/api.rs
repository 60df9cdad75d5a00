//! Request/response access to the posts, users, search and tags endpoints.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use shared::{
    domain::{AuthorSummary, Comment, Post, PostId, SortBy, SortOrder, Tag, User, UserId},
    error::ValidationError,
    protocol::{CommentsPage, NewPost, PostUpdate, PostsPage, TagEntry, UserDirectoryPage},
    search_params::ListingKey,
};
use tracing::{debug, warn};
use url::Url;

use crate::{
    config::Settings,
    error::{ClientError, Result},
};

/// Paginated listing request; sorting is only sent when a sort key is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub limit: u32,
    pub skip: u32,
    pub sort: Option<(SortBy, SortOrder)>,
}

impl From<&ListingKey> for PageRequest {
    fn from(key: &ListingKey) -> Self {
        Self {
            limit: key.limit,
            skip: key.skip,
            sort: key.sort_by.map(|sort_by| (sort_by, key.sort_order)),
        }
    }
}

#[async_trait]
pub trait PostsApi: Send + Sync {
    async fn list_posts(&self, page: PageRequest) -> Result<PostsPage>;
    /// Every post carrying `tag`; the endpoint takes no paging or sort parameters.
    async fn posts_by_tag(&self, tag: &str) -> Result<PostsPage>;
    async fn search_posts(&self, term: &str) -> Result<PostsPage>;
    async fn list_tags(&self) -> Result<Vec<Tag>>;
    async fn post_comments(&self, id: PostId) -> Result<Vec<Comment>>;
    async fn add_post(&self, post: &NewPost) -> Result<Post>;
    async fn update_post(&self, id: PostId, update: &PostUpdate) -> Result<Post>;
    async fn delete_post(&self, id: PostId) -> Result<()>;
    /// Id/username/image of every user, used to annotate posts with their author.
    async fn user_directory(&self) -> Result<Vec<AuthorSummary>>;
    async fn get_user(&self, id: UserId) -> Result<User>;
}

pub struct HttpPostsClient {
    http: Client,
    base_url: Url,
}

impl HttpPostsClient {
    pub fn new(base_url: &str) -> Result<Self> {
        Ok(Self {
            http: Client::new(),
            base_url: parse_base_url(base_url)?,
        })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .build()
            .map_err(|e| ClientError::Config(format!("failed to build http client: {e}")))?;
        Ok(Self {
            http,
            base_url: parse_base_url(&settings.api_base_url)?,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        {
            let mut path = url.path_segments_mut().map_err(|_| {
                ClientError::Config(format!("base url {} cannot carry a path", self.base_url))
            })?;
            path.pop_if_empty();
            path.extend(segments);
        }
        Ok(url)
    }

    fn request(&self, method: Method, segments: &[&str]) -> Result<(String, RequestBuilder)> {
        let url = self.endpoint(segments)?;
        let label = format!("{method} {}", url.path());
        Ok((label, self.http.request(method, url)))
    }

    async fn send_raw(&self, label: &str, request: RequestBuilder) -> Result<Vec<u8>> {
        debug!(endpoint = label, "api: sending request");
        let response = request
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|source| {
                warn!(endpoint = label, status = ?source.status(), "api: request failed: {source}");
                ClientError::network(label, source)
            })?;
        let body = response
            .bytes()
            .await
            .map_err(|source| ClientError::network(label, source))?;
        Ok(body.to_vec())
    }

    async fn send_json<T: DeserializeOwned>(&self, label: &str, request: RequestBuilder) -> Result<T> {
        let body = self.send_raw(label, request).await?;
        serde_json::from_slice(&body).map_err(|source| {
            warn!(endpoint = label, "api: malformed response body: {source}");
            ClientError::decode(label, source)
        })
    }
}

fn parse_base_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim())
        .map_err(|e| ClientError::Config(format!("invalid api base url '{raw}': {e}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ClientError::Config(format!(
            "api base url '{raw}' must use http or https"
        )));
    }
    Ok(url)
}

fn page_query(page: PageRequest) -> Vec<(&'static str, String)> {
    let mut query = vec![
        ("limit", page.limit.to_string()),
        ("skip", page.skip.to_string()),
    ];
    if let Some((sort_by, sort_order)) = page.sort {
        query.push(("sortBy", sort_by.as_str().to_string()));
        query.push(("order", sort_order.as_str().to_string()));
    }
    query
}

#[async_trait]
impl PostsApi for HttpPostsClient {
    async fn list_posts(&self, page: PageRequest) -> Result<PostsPage> {
        let (label, request) = self.request(Method::GET, &["posts"])?;
        self.send_json(&label, request.query(&page_query(page))).await
    }

    async fn posts_by_tag(&self, tag: &str) -> Result<PostsPage> {
        let (label, request) = self.request(Method::GET, &["posts", "tag", tag])?;
        self.send_json(&label, request).await
    }

    async fn search_posts(&self, term: &str) -> Result<PostsPage> {
        let (label, request) = self.request(Method::GET, &["posts", "search"])?;
        self.send_json(&label, request.query(&[("q", term)])).await
    }

    async fn list_tags(&self) -> Result<Vec<Tag>> {
        let (label, request) = self.request(Method::GET, &["posts", "tags"])?;
        let entries: Vec<TagEntry> = self.send_json(&label, request).await?;
        Ok(entries.into_iter().map(Tag::from).collect())
    }

    async fn post_comments(&self, id: PostId) -> Result<Vec<Comment>> {
        let id = id.to_string();
        let (label, request) = self.request(Method::GET, &["comments", "post", id.as_str()])?;
        let page: CommentsPage = self.send_json(&label, request).await?;
        Ok(page.comments)
    }

    async fn add_post(&self, post: &NewPost) -> Result<Post> {
        post.validate()?;
        let (label, request) = self.request(Method::POST, &["posts"])?;
        self.send_json(&label, request.json(post)).await
    }

    async fn update_post(&self, id: PostId, update: &PostUpdate) -> Result<Post> {
        if id.0 <= 0 {
            return Err(ValidationError::InvalidPostId(id.0).into());
        }
        update.validate()?;
        let id = id.to_string();
        let (label, request) = self.request(Method::PUT, &["posts", id.as_str()])?;
        self.send_json(&label, request.json(update)).await
    }

    async fn delete_post(&self, id: PostId) -> Result<()> {
        if id.0 <= 0 {
            return Err(ValidationError::InvalidPostId(id.0).into());
        }
        let id = id.to_string();
        let (label, request) = self.request(Method::DELETE, &["posts", id.as_str()])?;
        // The deleted record may or may not be echoed back; only the status matters.
        self.send_raw(&label, request).await?;
        Ok(())
    }

    async fn user_directory(&self) -> Result<Vec<AuthorSummary>> {
        let (label, request) = self.request(Method::GET, &["users"])?;
        let page: UserDirectoryPage = self
            .send_json(
                &label,
                request.query(&[("limit", "0"), ("select", "username,image")]),
            )
            .await?;
        Ok(page.users)
    }

    async fn get_user(&self, id: UserId) -> Result<User> {
        let id = id.to_string();
        let (label, request) = self.request(Method::GET, &["users", id.as_str()])?;
        self.send_json(&label, request).await
    }
}
