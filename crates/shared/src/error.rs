use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("post title must not be empty")]
    EmptyTitle,
    #[error("post body must not be empty")]
    EmptyBody,
    #[error("user id must be positive, got {0}")]
    InvalidUserId(i64),
    #[error("post id must be positive, got {0}")]
    InvalidPostId(i64),
}
