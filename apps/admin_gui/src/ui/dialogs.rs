//! Add/edit forms, post detail, delete confirmation and the user profile window.

use eframe::egui;
use shared::{
    domain::{Comment, Post, PostId, User, UserId},
    protocol::{NewPost, PostUpdate},
};

use crate::controller::reducer::Fetch;
use crate::ui::widgets::highlighted_label;

const FAILURE_COLOR: egui::Color32 = egui::Color32::from_rgb(220, 110, 110);

/// Editable text fields behind the add and edit forms.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostDraft {
    pub title: String,
    pub body: String,
    pub tags: String,
    pub user_id: String,
}

impl PostDraft {
    pub fn for_new_post() -> Self {
        let defaults = NewPost::default();
        Self {
            user_id: defaults.user_id.to_string(),
            ..Self::default()
        }
    }

    pub fn from_post(post: &Post) -> Self {
        Self {
            title: post.title.clone(),
            body: post.body.clone(),
            tags: post.tags.join(", "),
            user_id: post.user_id.to_string(),
        }
    }

    fn parsed_user_id(&self) -> Result<UserId, String> {
        self.user_id
            .trim()
            .parse::<i64>()
            .map(UserId)
            .map_err(|_| format!("user id '{}' is not a number", self.user_id.trim()))
    }

    pub fn parsed_tags(&self) -> Vec<String> {
        self.tags
            .split(',')
            .map(str::trim)
            .filter(|tag| !tag.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub fn to_new_post(&self) -> Result<NewPost, String> {
        let post = NewPost {
            title: self.title.trim().to_string(),
            body: self.body.trim().to_string(),
            user_id: self.parsed_user_id()?,
        };
        post.validate().map_err(|err| err.to_string())?;
        Ok(post)
    }

    pub fn to_update(&self) -> Result<PostUpdate, String> {
        let update = PostUpdate {
            title: self.title.trim().to_string(),
            body: self.body.trim().to_string(),
            tags: self.parsed_tags(),
            user_id: self.parsed_user_id()?,
        };
        update.validate().map_err(|err| err.to_string())?;
        Ok(update)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dialog {
    Add {
        draft: PostDraft,
        error: Option<String>,
    },
    Edit {
        id: PostId,
        draft: PostDraft,
        error: Option<String>,
    },
    Detail {
        id: PostId,
    },
    ConfirmDelete {
        id: PostId,
        title: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogAction {
    None,
    Close,
    Submit,
    EditPost(PostId),
    OpenAuthor(UserId),
}

pub fn show_post_form(
    ctx: &egui::Context,
    heading: &str,
    draft: &mut PostDraft,
    error: Option<&str>,
    show_tags: bool,
    busy: bool,
) -> DialogAction {
    let mut action = DialogAction::None;
    let mut open = true;
    egui::Window::new(heading)
        .id(egui::Id::new("post_form_window"))
        .collapsible(false)
        .resizable(true)
        .default_width(520.0)
        .open(&mut open)
        .show(ctx, |ui| {
            egui::Grid::new("post_form_grid")
                .num_columns(2)
                .spacing([8.0, 6.0])
                .show(ui, |ui| {
                    ui.label("Title");
                    ui.add(egui::TextEdit::singleline(&mut draft.title).desired_width(f32::INFINITY));
                    ui.end_row();

                    ui.label("Body");
                    ui.add(
                        egui::TextEdit::multiline(&mut draft.body)
                            .desired_rows(8)
                            .desired_width(f32::INFINITY),
                    );
                    ui.end_row();

                    if show_tags {
                        ui.label("Tags");
                        ui.add(
                            egui::TextEdit::singleline(&mut draft.tags)
                                .hint_text("comma separated")
                                .desired_width(f32::INFINITY),
                        );
                        ui.end_row();
                    }

                    ui.label("User id");
                    ui.add(egui::TextEdit::singleline(&mut draft.user_id).desired_width(80.0));
                    ui.end_row();
                });

            if let Some(error) = error {
                ui.colored_label(FAILURE_COLOR, error);
            }

            ui.separator();
            ui.horizontal(|ui| {
                if ui.add_enabled(!busy, egui::Button::new("Save")).clicked() {
                    action = DialogAction::Submit;
                }
                if ui.button("Cancel").clicked() {
                    action = DialogAction::Close;
                }
                if busy {
                    ui.spinner();
                }
            });
        });
    if !open {
        action = DialogAction::Close;
    }
    action
}

pub fn show_post_detail(
    ctx: &egui::Context,
    post: &Post,
    query: &str,
    comments: Option<&Fetch<Vec<Comment>>>,
) -> DialogAction {
    let mut action = DialogAction::None;
    let mut open = true;
    egui::Window::new(format!("Post #{}", post.id))
        .id(egui::Id::new("post_detail_window"))
        .collapsible(false)
        .default_width(560.0)
        .open(&mut open)
        .show(ctx, |ui| {
            highlighted_label(ui, &post.title, query);
            ui.separator();
            egui::ScrollArea::vertical()
                .max_height(320.0)
                .show(ui, |ui| {
                    highlighted_label(ui, &post.body, query);
                });
            ui.separator();
            ui.horizontal_wrapped(|ui| {
                ui.label(format!(
                    "👍 {}  👎 {}",
                    post.reactions.likes, post.reactions.dislikes
                ));
                if let Some(views) = post.views {
                    ui.label(format!("{views} views"));
                }
                if !post.tags.is_empty() {
                    ui.label(format!("tags: {}", post.tags.join(", ")));
                }
            });
            ui.horizontal(|ui| {
                let author = post
                    .author
                    .as_ref()
                    .map(|author| author.username.clone())
                    .unwrap_or_else(|| format!("user {}", post.user_id));
                if ui.link(author).clicked() {
                    action = DialogAction::OpenAuthor(post.user_id);
                }
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("Edit").clicked() {
                        action = DialogAction::EditPost(post.id);
                    }
                });
            });
            ui.separator();
            show_comments(ui, comments, query);
        });
    if !open {
        action = DialogAction::Close;
    }
    action
}

fn show_comments(ui: &mut egui::Ui, comments: Option<&Fetch<Vec<Comment>>>, query: &str) {
    match comments {
        Some(Fetch::Ready(comments)) => {
            ui.strong(format!("Comments ({})", comments.len()));
            if comments.is_empty() {
                ui.label(egui::RichText::new("No comments yet").weak());
                return;
            }
            egui::ScrollArea::vertical()
                .id_salt("post_comments")
                .max_height(200.0)
                .show(ui, |ui| {
                    for comment in comments {
                        ui.horizontal_wrapped(|ui| {
                            ui.label(egui::RichText::new(&comment.user.username).strong());
                            highlighted_label(ui, &comment.body, query);
                            ui.label(egui::RichText::new(format!("♥ {}", comment.likes)).weak());
                        });
                    }
                });
        }
        Some(Fetch::Failed(message)) => {
            ui.colored_label(FAILURE_COLOR, format!("Could not load comments: {message}"));
        }
        Some(Fetch::Pending) | None => {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label("Loading comments...");
            });
        }
    }
}

pub fn show_delete_confirmation(
    ctx: &egui::Context,
    id: PostId,
    title: &str,
    busy: bool,
) -> DialogAction {
    let mut action = DialogAction::None;
    egui::Window::new("Delete post")
        .id(egui::Id::new("delete_confirm_window"))
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
        .show(ctx, |ui| {
            ui.label(format!("Delete post #{id} \"{title}\"?"));
            ui.horizontal(|ui| {
                if ui.add_enabled(!busy, egui::Button::new("Delete")).clicked() {
                    action = DialogAction::Submit;
                }
                if ui.button("Cancel").clicked() {
                    action = DialogAction::Close;
                }
                if busy {
                    ui.spinner();
                }
            });
        });
    action
}

/// Returns false once the window is closed.
pub fn show_user_profile(ctx: &egui::Context, requested: UserId, user: Option<&Fetch<User>>) -> bool {
    let mut open = true;
    egui::Window::new("Author")
        .id(egui::Id::new("user_profile_window"))
        .collapsible(false)
        .resizable(false)
        .open(&mut open)
        .show(ctx, |ui| match user {
            Some(Fetch::Ready(user)) => {
                ui.heading(user.full_name());
                ui.label(egui::RichText::new(format!("@{}", user.username)).weak());
                ui.separator();
                egui::Grid::new("user_profile_grid")
                    .num_columns(2)
                    .show(ui, |ui| {
                        ui.label("Email");
                        ui.label(&user.email);
                        ui.end_row();
                        ui.label("Phone");
                        ui.label(&user.phone);
                        ui.end_row();
                        ui.label("Age");
                        ui.label(user.age.to_string());
                        ui.end_row();
                        ui.label("Address");
                        ui.label(format!(
                            "{}, {}, {}",
                            user.address.address, user.address.city, user.address.state
                        ));
                        ui.end_row();
                        ui.label("Company");
                        ui.label(format!("{} ({})", user.company.name, user.company.title));
                        ui.end_row();
                    });
            }
            Some(Fetch::Failed(message)) => {
                ui.colored_label(FAILURE_COLOR, format!("Could not load user {requested}"));
                ui.label(egui::RichText::new(message).weak().small());
                ui.label("Close and reopen the author to retry.");
            }
            Some(Fetch::Pending) | None => {
                ui.horizontal(|ui| {
                    ui.spinner();
                    ui.label(format!("Loading user {requested}..."));
                });
            }
        });
    open
}

#[cfg(test)]
mod tests {
    use shared::domain::Reactions;

    use super::*;

    #[test]
    fn new_post_draft_validates_before_submit() {
        let mut draft = PostDraft::for_new_post();
        assert_eq!(draft.user_id, "1");
        assert_eq!(draft.to_new_post(), Err("post title must not be empty".to_string()));

        draft.title = "  Title  ".into();
        draft.body = "Body".into();
        draft.user_id = "abc".into();
        assert!(draft.to_new_post().is_err());

        draft.user_id = "5".into();
        let post = draft.to_new_post().expect("valid");
        assert_eq!(post.title, "Title");
        assert_eq!(post.user_id, UserId(5));
    }

    #[test]
    fn edit_draft_round_trips_tags() {
        let post = Post {
            id: PostId(3),
            title: "t".into(),
            body: "b".into(),
            tags: vec!["love".into(), "history".into()],
            user_id: UserId(2),
            reactions: Reactions::default(),
            views: None,
            author: None,
        };
        let mut draft = PostDraft::from_post(&post);
        assert_eq!(draft.tags, "love, history");
        draft.tags = "love, , crime ,".into();
        let update = draft.to_update().expect("valid");
        assert_eq!(update.tags, vec!["love".to_string(), "crime".to_string()]);
        assert_eq!(update.user_id, UserId(2));
    }
}
