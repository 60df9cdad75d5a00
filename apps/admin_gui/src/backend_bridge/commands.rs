//! Backend commands queued from UI to backend worker.

use client_core::{ListingTicket, SearchTicket};
use shared::{
    domain::{PostId, UserId},
    protocol::{NewPost, PostUpdate},
};

#[derive(Debug, Clone, PartialEq)]
pub enum BackendCommand {
    FetchListing { ticket: ListingTicket },
    Search { ticket: SearchTicket },
    LoadTags,
    LoadUser { user_id: UserId },
    LoadComments { post_id: PostId },
    AddPost { post: NewPost },
    UpdatePost { id: PostId, update: PostUpdate },
    DeletePost { id: PostId },
}

impl BackendCommand {
    pub fn name(&self) -> &'static str {
        match self {
            BackendCommand::FetchListing { .. } => "fetch_listing",
            BackendCommand::Search { .. } => "search",
            BackendCommand::LoadTags => "load_tags",
            BackendCommand::LoadUser { .. } => "load_user",
            BackendCommand::LoadComments { .. } => "load_comments",
            BackendCommand::AddPost { .. } => "add_post",
            BackendCommand::UpdatePost { .. } => "update_post",
            BackendCommand::DeletePost { .. } => "delete_post",
        }
    }
}
