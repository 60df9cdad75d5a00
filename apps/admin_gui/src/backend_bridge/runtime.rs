//! Runtime bridge between UI command queue and backend event intake.

use std::{sync::Arc, thread};

use client_core::{fetch_listing, fetch_search, HttpPostsClient, PostsApi, Settings};
use crossbeam_channel::{Receiver, Sender};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiError, UiErrorContext, UiEvent};

/// Spawns the worker thread. Commands run concurrently; each completion is
/// posted back as one [`UiEvent`].
pub fn launch(settings: Settings, cmd_rx: Receiver<BackendCommand>, ui_tx: Sender<UiEvent>) {
    thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                    UiErrorContext::BackendStartup,
                    format!("backend worker startup failure: failed to build runtime: {err}"),
                )));
                tracing::error!("failed to build backend runtime: {err}");
                return;
            }
        };

        let client = match HttpPostsClient::from_settings(&settings) {
            Ok(client) => Arc::new(client),
            Err(err) => {
                tracing::error!(api_base_url = %settings.api_base_url, "failed to build api client: {err}");
                let _ = ui_tx.try_send(UiEvent::Error(UiError::from_client(
                    UiErrorContext::BackendStartup,
                    &err,
                )));
                return;
            }
        };
        tracing::info!(api_base_url = %client.base_url(), "backend worker ready");
        let _ = ui_tx.try_send(UiEvent::Info(format!("Using {}", client.base_url())));

        runtime.block_on(async move {
            while let Ok(cmd) = cmd_rx.recv() {
                let client = Arc::clone(&client);
                let ui_tx = ui_tx.clone();
                tokio::spawn(async move {
                    let name = cmd.name();
                    let event = handle_command(client.as_ref(), cmd).await;
                    if ui_tx.try_send(event).is_err() {
                        tracing::warn!(command = name, "ui event queue unavailable; dropping result");
                    }
                });
            }
            tracing::info!("ui command channel closed; backend worker stopping");
        });
    });
}

pub async fn handle_command(api: &dyn PostsApi, cmd: BackendCommand) -> UiEvent {
    match cmd {
        BackendCommand::FetchListing { ticket } => match fetch_listing(api, &ticket.key).await {
            Ok(listing) => UiEvent::ListingLoaded { ticket, listing },
            Err(err) => {
                tracing::warn!(generation = ticket.generation, "listing fetch failed: {err}");
                UiEvent::ListingFailed {
                    ticket,
                    error: UiError::from_client(UiErrorContext::LoadPosts, &err),
                }
            }
        },
        BackendCommand::Search { ticket } => match fetch_search(api, &ticket.key).await {
            Ok(listing) => UiEvent::SearchLoaded { ticket, listing },
            Err(err) => {
                tracing::warn!(term = %ticket.key, "search failed: {err}");
                UiEvent::SearchFailed {
                    ticket,
                    error: UiError::from_client(UiErrorContext::SearchPosts, &err),
                }
            }
        },
        BackendCommand::LoadTags => match api.list_tags().await {
            Ok(tags) => UiEvent::TagsLoaded(tags),
            Err(err) => failure(UiErrorContext::LoadTags, &err),
        },
        BackendCommand::LoadUser { user_id } => match api.get_user(user_id).await {
            Ok(user) => UiEvent::UserLoaded(user),
            Err(err) => {
                tracing::warn!(user_id = %user_id, "user lookup failed: {err}");
                UiEvent::UserFailed {
                    user_id,
                    error: UiError::from_client(UiErrorContext::LoadUser, &err),
                }
            }
        },
        BackendCommand::LoadComments { post_id } => match api.post_comments(post_id).await {
            Ok(comments) => UiEvent::CommentsLoaded { post_id, comments },
            Err(err) => {
                tracing::warn!(post_id = %post_id, "comments fetch failed: {err}");
                UiEvent::CommentsFailed {
                    post_id,
                    error: UiError::from_client(UiErrorContext::LoadComments, &err),
                }
            }
        },
        BackendCommand::AddPost { post } => match api.add_post(&post).await {
            Ok(created) => {
                tracing::info!(post_id = %created.id, "post created");
                UiEvent::PostCreated(created)
            }
            Err(err) => failure(UiErrorContext::AddPost, &err),
        },
        BackendCommand::UpdatePost { id, update } => match api.update_post(id, &update).await {
            Ok(updated) => {
                tracing::info!(post_id = %id, "post updated");
                UiEvent::PostUpdated(updated)
            }
            Err(err) => failure(UiErrorContext::UpdatePost, &err),
        },
        BackendCommand::DeletePost { id } => match api.delete_post(id).await {
            Ok(()) => {
                tracing::info!(post_id = %id, "post deleted");
                UiEvent::PostDeleted(id)
            }
            Err(err) => failure(UiErrorContext::DeletePost, &err),
        },
    }
}

fn failure(context: UiErrorContext, err: &client_core::ClientError) -> UiEvent {
    tracing::warn!(?context, "backend command failed: {err}");
    UiEvent::Error(UiError::from_client(context, err))
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use client_core::{ClientError, PageRequest, PageState};
    use shared::{
        domain::{
            AuthorSummary, Comment, CommentAuthor, CommentId, Post, PostId, Reactions, Tag, User,
            UserId,
        },
        protocol::{NewPost, PostUpdate, PostsPage},
        search_params::SearchParams,
    };

    use super::*;
    use crate::controller::events::UiErrorCategory;

    type ApiResult<T> = Result<T, ClientError>;

    struct FakeApi {
        posts: Mutex<Vec<Post>>,
    }

    impl FakeApi {
        fn new() -> Self {
            let posts = (1..=3)
                .map(|id| Post {
                    id: PostId(id),
                    title: format!("post {id}"),
                    body: "body".into(),
                    tags: vec!["love".into()],
                    user_id: UserId(id),
                    reactions: Reactions::default(),
                    views: None,
                    author: None,
                })
                .collect();
            Self {
                posts: Mutex::new(posts),
            }
        }

        fn page(&self) -> PostsPage {
            let posts = self.posts.lock().expect("posts").clone();
            PostsPage {
                total: Some(posts.len() as u64),
                posts,
                skip: Some(0),
                limit: Some(10),
            }
        }
    }

    #[async_trait]
    impl PostsApi for FakeApi {
        async fn list_posts(&self, _page: PageRequest) -> ApiResult<PostsPage> {
            Ok(self.page())
        }

        async fn posts_by_tag(&self, _tag: &str) -> ApiResult<PostsPage> {
            Ok(self.page())
        }

        async fn search_posts(&self, _term: &str) -> ApiResult<PostsPage> {
            Err(ClientError::Decode {
                endpoint: "GET /posts/search".into(),
                source: serde_json::from_str::<PostsPage>("{").expect_err("truncated json"),
            })
        }

        async fn list_tags(&self) -> ApiResult<Vec<Tag>> {
            Ok(Vec::new())
        }

        async fn post_comments(&self, id: PostId) -> ApiResult<Vec<Comment>> {
            Ok(vec![Comment {
                id: CommentId(1),
                body: "first".into(),
                post_id: id,
                likes: 0,
                user: CommentAuthor {
                    id: UserId(2),
                    username: "michaelw".into(),
                    full_name: "Michael Williams".into(),
                },
            }])
        }

        async fn add_post(&self, post: &NewPost) -> ApiResult<Post> {
            post.validate()?;
            unreachable!("only invalid posts are submitted in these tests")
        }

        async fn update_post(&self, _id: PostId, _update: &PostUpdate) -> ApiResult<Post> {
            unreachable!("not exercised")
        }

        async fn delete_post(&self, id: PostId) -> ApiResult<()> {
            self.posts.lock().expect("posts").retain(|post| post.id != id);
            Ok(())
        }

        async fn user_directory(&self) -> ApiResult<Vec<AuthorSummary>> {
            Ok(vec![AuthorSummary {
                id: UserId(2),
                username: "michaelw".into(),
                image: String::new(),
            }])
        }

        async fn get_user(&self, id: UserId) -> ApiResult<User> {
            Err(ClientError::Config(format!("no user {id}")))
        }
    }

    #[tokio::test]
    async fn listing_result_carries_its_ticket_and_authors() {
        let api = FakeApi::new();
        let mut page = PageState::new();
        let ticket = page.begin_listing(SearchParams::default().listing_key());

        let event = handle_command(
            &api,
            BackendCommand::FetchListing {
                ticket: ticket.clone(),
            },
        )
        .await;
        match event {
            UiEvent::ListingLoaded {
                ticket: returned,
                listing,
            } => {
                assert_eq!(returned, ticket);
                assert_eq!(listing.total, 3);
                let authors: Vec<Option<&str>> = listing
                    .posts
                    .iter()
                    .map(|p| p.author.as_ref().map(|a| a.username.as_str()))
                    .collect();
                assert_eq!(authors, vec![None, Some("michaelw"), None]);
            }
            _ => panic!("expected ListingLoaded"),
        }
    }

    #[tokio::test]
    async fn failed_search_reports_decode_error_with_ticket() {
        let api = FakeApi::new();
        let mut page = PageState::new();
        let ticket = page.begin_search("love");

        let event = handle_command(
            &api,
            BackendCommand::Search {
                ticket: ticket.clone(),
            },
        )
        .await;
        match event {
            UiEvent::SearchFailed {
                ticket: returned,
                error,
            } => {
                assert_eq!(returned, ticket);
                assert_eq!(error.category(), UiErrorCategory::Decode);
                assert_eq!(error.context(), UiErrorContext::SearchPosts);
            }
            _ => panic!("expected SearchFailed"),
        }
    }

    #[tokio::test]
    async fn invalid_post_surfaces_validation_error() {
        let api = FakeApi::new();
        let event = handle_command(
            &api,
            BackendCommand::AddPost {
                post: NewPost::default(),
            },
        )
        .await;
        match event {
            UiEvent::Error(error) => {
                assert_eq!(error.category(), UiErrorCategory::Validation);
                assert_eq!(error.context(), UiErrorContext::AddPost);
            }
            _ => panic!("expected Error"),
        }
    }

    #[tokio::test]
    async fn failed_user_lookup_names_the_user() {
        let api = FakeApi::new();
        let event = handle_command(&api, BackendCommand::LoadUser { user_id: UserId(9) }).await;
        match event {
            UiEvent::UserFailed { user_id, error } => {
                assert_eq!(user_id, UserId(9));
                assert_eq!(error.context(), UiErrorContext::LoadUser);
            }
            _ => panic!("expected UserFailed"),
        }
    }

    #[tokio::test]
    async fn comments_arrive_tagged_with_their_post() {
        let api = FakeApi::new();
        let event = handle_command(&api, BackendCommand::LoadComments { post_id: PostId(3) }).await;
        match event {
            UiEvent::CommentsLoaded { post_id, comments } => {
                assert_eq!(post_id, PostId(3));
                assert_eq!(comments.len(), 1);
                assert_eq!(comments[0].post_id, PostId(3));
            }
            _ => panic!("expected CommentsLoaded"),
        }
    }

    #[tokio::test]
    async fn delete_reports_the_removed_id() {
        let api = FakeApi::new();
        let event = handle_command(&api, BackendCommand::DeletePost { id: PostId(2) }).await;
        assert!(matches!(event, UiEvent::PostDeleted(PostId(2))));
        assert_eq!(api.page().posts.len(), 2);
    }
}
