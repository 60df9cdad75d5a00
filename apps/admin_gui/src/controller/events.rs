//! Backend-to-UI events and error modeling for the admin controller.

use client_core::{ClientError, ClientErrorKind, Listing, ListingTicket, SearchTicket};
use shared::domain::{Comment, Post, PostId, Tag, User, UserId};

pub enum UiEvent {
    Info(String),
    ListingLoaded {
        ticket: ListingTicket,
        listing: Listing,
    },
    ListingFailed {
        ticket: ListingTicket,
        error: UiError,
    },
    SearchLoaded {
        ticket: SearchTicket,
        listing: Listing,
    },
    SearchFailed {
        ticket: SearchTicket,
        error: UiError,
    },
    TagsLoaded(Vec<Tag>),
    UserLoaded(User),
    UserFailed {
        user_id: UserId,
        error: UiError,
    },
    CommentsLoaded {
        post_id: PostId,
        comments: Vec<Comment>,
    },
    CommentsFailed {
        post_id: PostId,
        error: UiError,
    },
    PostCreated(Post),
    PostUpdated(Post),
    PostDeleted(PostId),
    Error(UiError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorCategory {
    Transport,
    Decode,
    Validation,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorContext {
    BackendStartup,
    LoadPosts,
    SearchPosts,
    LoadTags,
    LoadUser,
    LoadComments,
    AddPost,
    UpdatePost,
    DeletePost,
    General,
}

impl UiErrorContext {
    /// Failures that end an add, edit or delete request.
    pub fn is_mutation(self) -> bool {
        matches!(
            self,
            UiErrorContext::AddPost | UiErrorContext::UpdatePost | UiErrorContext::DeletePost
        )
    }

    fn action(self) -> &'static str {
        match self {
            UiErrorContext::BackendStartup => "starting the backend worker",
            UiErrorContext::LoadPosts => "loading posts",
            UiErrorContext::SearchPosts => "searching posts",
            UiErrorContext::LoadTags => "loading tags",
            UiErrorContext::LoadUser => "loading the user profile",
            UiErrorContext::LoadComments => "loading comments",
            UiErrorContext::AddPost => "adding the post",
            UiErrorContext::UpdatePost => "saving the post",
            UiErrorContext::DeletePost => "deleting the post",
            UiErrorContext::General => "processing the request",
        }
    }
}

#[derive(Debug, Clone)]
pub struct UiError {
    category: UiErrorCategory,
    context: UiErrorContext,
    message: String,
}

impl UiError {
    pub fn from_client(context: UiErrorContext, err: &ClientError) -> Self {
        let category = match err.kind() {
            ClientErrorKind::Network => UiErrorCategory::Transport,
            ClientErrorKind::Decode => UiErrorCategory::Decode,
            ClientErrorKind::Validation => UiErrorCategory::Validation,
            ClientErrorKind::Config => UiErrorCategory::Unknown,
        };
        Self {
            category,
            context,
            message: err.to_string(),
        }
    }

    /// Classifies free-form failures (worker startup, queue errors) by keyword.
    pub fn from_message(context: UiErrorContext, message: impl Into<String>) -> Self {
        let message = message.into();
        let message_lower = message.to_ascii_lowercase();
        let category = if message_lower.contains("malformed")
            || message_lower.contains("decode")
            || message_lower.contains("expected value")
        {
            UiErrorCategory::Decode
        } else if message_lower.contains("invalid")
            || message_lower.contains("missing")
            || message_lower.contains("must not be empty")
        {
            UiErrorCategory::Validation
        } else if message_lower.contains("timeout")
            || message_lower.contains("connection")
            || message_lower.contains("network")
            || message_lower.contains("unavailable")
            || message_lower.contains("disconnect")
        {
            UiErrorCategory::Transport
        } else {
            UiErrorCategory::Unknown
        };

        Self {
            category,
            context,
            message,
        }
    }

    pub fn category(&self) -> UiErrorCategory {
        self.category
    }

    pub fn context(&self) -> UiErrorContext {
        self.context
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// One-line banner text, e.g. `Transport error while loading posts: ...`.
    pub fn banner_text(&self) -> String {
        format!(
            "{} error while {}: {}",
            category_label(self.category),
            self.context.action(),
            self.message
        )
    }
}

pub fn category_label(category: UiErrorCategory) -> &'static str {
    match category {
        UiErrorCategory::Transport => "Transport",
        UiErrorCategory::Decode => "Decode",
        UiErrorCategory::Validation => "Validation",
        UiErrorCategory::Unknown => "Unexpected",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::error::ValidationError;

    #[test]
    fn client_errors_map_to_categories() {
        let err = ClientError::from(ValidationError::EmptyTitle);
        let ui = UiError::from_client(UiErrorContext::AddPost, &err);
        assert_eq!(ui.category(), UiErrorCategory::Validation);
        assert_eq!(ui.context(), UiErrorContext::AddPost);
        assert!(ui.banner_text().starts_with("Validation error while adding the post"));

        let err = ClientError::Config("bad url".into());
        assert_eq!(
            UiError::from_client(UiErrorContext::General, &err).category(),
            UiErrorCategory::Unknown
        );
    }

    #[test]
    fn startup_failures_are_classified_by_keyword() {
        let err = UiError::from_message(
            UiErrorContext::BackendStartup,
            "backend worker startup failure: connection reset",
        );
        assert_eq!(err.category(), UiErrorCategory::Transport);
        let err = UiError::from_message(UiErrorContext::BackendStartup, "invalid api base url");
        assert_eq!(err.category(), UiErrorCategory::Validation);
    }

    #[test]
    fn only_post_writes_count_as_mutations() {
        assert!(UiErrorContext::AddPost.is_mutation());
        assert!(UiErrorContext::DeletePost.is_mutation());
        assert!(!UiErrorContext::LoadTags.is_mutation());
        assert!(!UiErrorContext::LoadComments.is_mutation());
    }

    #[test]
    fn unrecognized_messages_are_unknown() {
        let err = UiError::from_message(UiErrorContext::BackendStartup, "something odd");
        assert_eq!(err.category(), UiErrorCategory::Unknown);
        assert_eq!(err.message(), "something odd");
    }
}
