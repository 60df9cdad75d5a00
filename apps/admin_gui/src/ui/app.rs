use std::time::Duration;

use arboard::Clipboard;
use chrono::Local;
use client_core::{PageWindow, QueryChange, QueryParamStore};
use crossbeam_channel::{Receiver, Sender};
use eframe::egui;
use serde::{Deserialize, Serialize};
use shared::{
    domain::{PostId, SortBy, SortOrder, UserId},
    search_params::{SearchParams, SearchParamsPatch, ALL_TAGS, DEFAULT_LIMIT, LIMIT_CHOICES},
};
use tokio::sync::broadcast::{self, error::TryRecvError};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::UiEvent;
use crate::controller::orchestration::{
    commands_for_change, dispatch_backend_command, listing_command, search_command,
};
use crate::controller::reducer::{apply_event, lookup_state, AdminViewState, Followup};
use crate::ui::dialogs::{
    show_delete_confirmation, show_post_detail, show_post_form, show_user_profile, Dialog,
    DialogAction, PostDraft,
};
use crate::ui::widgets::{highlighted_label, status_banner, tag_chips};

pub const SETTINGS_STORAGE_KEY: &str = "posts_admin_gui_settings";

#[derive(Debug, Clone)]
pub struct StartupConfig {
    pub api_base_url: String,
    pub default_limit: u32,
    pub location: Option<String>,
}

impl Default for StartupConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://dummyjson.com".to_string(),
            default_limit: DEFAULT_LIMIT,
            location: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PersistedAdminSettings {
    #[serde(default)]
    pub last_location: String,
}

/// Parses the start location; a configured page size fills in a missing `limit`.
pub fn initial_params(location: &str, default_limit: u32) -> SearchParams {
    let mut params = SearchParams::parse(location);
    if params.limit.is_none() && default_limit != DEFAULT_LIMIT {
        params.limit = Some(default_limit);
    }
    params
}

fn sort_label(sort_by: Option<SortBy>) -> &'static str {
    match sort_by {
        None => "None",
        Some(SortBy::Id) => "Id",
        Some(SortBy::Title) => "Title",
        Some(SortBy::Reactions) => "Reactions",
    }
}

fn order_label(order: SortOrder) -> &'static str {
    match order {
        SortOrder::Asc => "Ascending",
        SortOrder::Desc => "Descending",
    }
}

/// User intents collected while rendering a frame, applied afterwards.
#[derive(Debug, Clone, PartialEq)]
enum Intent {
    Patch(SearchParamsPatch),
    SubmitSearch,
    ClearSearch,
    Back,
    Forward,
    GoToLocation,
    CopyLocation,
    Reload,
    OpenAdd,
    OpenDetail(PostId),
    OpenEdit(PostId),
    ConfirmDelete(PostId),
    OpenAuthor(UserId),
}

pub struct PostsAdminApp {
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,
    store: QueryParamStore,
    changes: broadcast::Receiver<QueryChange>,
    view: AdminViewState,
    api_base_url: String,
    search_input: String,
    location_input: String,
    dialog: Option<Dialog>,
    user_dialog: Option<UserId>,
    last_event_at: Option<String>,
}

impl PostsAdminApp {
    pub fn new(
        startup: StartupConfig,
        cmd_tx: Sender<BackendCommand>,
        ui_rx: Receiver<UiEvent>,
        persisted: Option<PersistedAdminSettings>,
    ) -> Self {
        let location = startup
            .location
            .or_else(|| persisted.map(|settings| settings.last_location))
            .unwrap_or_default();
        let store = QueryParamStore::new(initial_params(&location, startup.default_limit));
        let changes = store.subscribe();
        let mut app = Self {
            cmd_tx,
            ui_rx,
            search_input: store.current().search().to_string(),
            location_input: store.location(),
            store,
            changes,
            view: AdminViewState {
                status: "Starting".to_string(),
                ..AdminViewState::default()
            },
            api_base_url: startup.api_base_url,
            dialog: None,
            user_dialog: None,
            last_event_at: None,
        };
        tracing::info!(location = %app.store.location(), "admin gui starting");
        app.reload();
        app
    }

    fn dispatch(&mut self, cmd: BackendCommand) -> bool {
        dispatch_backend_command(&self.cmd_tx, cmd, &mut self.view.status)
    }

    fn reload(&mut self) {
        self.dispatch(BackendCommand::LoadTags);
        self.refetch_listing();
        self.refetch_search();
    }

    fn refetch_listing(&mut self) {
        let cmd = listing_command(&mut self.view.page, self.store.current());
        self.dispatch(cmd);
    }

    fn refetch_search(&mut self) {
        if let Some(cmd) = search_command(&mut self.view.page, self.store.current()) {
            self.dispatch(cmd);
        }
    }

    fn process_ui_events(&mut self) {
        while let Ok(event) = self.ui_rx.try_recv() {
            let followups = apply_event(&mut self.view, event, self.store.current());
            self.last_event_at = Some(Local::now().format("%H:%M:%S").to_string());
            for followup in followups {
                match followup {
                    Followup::RefetchListing => self.refetch_listing(),
                    Followup::RefetchSearch => self.refetch_search(),
                    Followup::CorrectSkip(skip) => {
                        self.store.apply(&SearchParamsPatch::default().with_skip(skip));
                    }
                    Followup::CloseEditors => self.dialog = None,
                }
            }
        }
    }

    /// Drains the location subscription and issues whatever refetches each change needs.
    fn process_query_changes(&mut self) {
        loop {
            match self.changes.try_recv() {
                Ok(change) => {
                    let commands = commands_for_change(&mut self.view.page, &change);
                    for cmd in commands {
                        self.dispatch(cmd);
                    }
                    self.location_input = self.store.location();
                    if change.search_changed() {
                        self.search_input = change.current.search().to_string();
                    }
                }
                Err(TryRecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "query change subscription lagged; refetching");
                    self.location_input = self.store.location();
                    self.refetch_listing();
                    self.refetch_search();
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
            }
        }
    }

    fn apply_intent(&mut self, intent: Intent) {
        match intent {
            Intent::Patch(patch) => {
                self.store.apply(&patch);
            }
            Intent::SubmitSearch => {
                let term = self.search_input.trim().to_string();
                let patch = SearchParamsPatch::default().with_search(term);
                // Resubmitting the current term changes nothing, so search again explicitly.
                if self.store.apply(&patch).is_none() {
                    self.refetch_search();
                }
            }
            Intent::ClearSearch => {
                self.search_input.clear();
                self.store.apply(&SearchParamsPatch::default().with_search(""));
            }
            Intent::Back => {
                self.store.back();
            }
            Intent::Forward => {
                self.store.forward();
            }
            Intent::GoToLocation => {
                let location = self.location_input.clone();
                if self.store.replace_location(&location).is_none() {
                    self.location_input = self.store.location();
                }
            }
            Intent::CopyLocation => {
                let location = self.store.location();
                match Clipboard::new().and_then(|mut clipboard| clipboard.set_text(location)) {
                    Ok(()) => self.view.status = "Location copied to clipboard".to_string(),
                    Err(err) => {
                        tracing::warn!("clipboard unavailable: {err}");
                        self.view.status = format!("Could not copy location: {err}");
                    }
                }
            }
            Intent::Reload => self.reload(),
            Intent::OpenAdd => {
                self.dialog = Some(Dialog::Add {
                    draft: PostDraft::for_new_post(),
                    error: None,
                });
            }
            Intent::OpenDetail(id) => {
                self.dialog = Some(Dialog::Detail { id });
                if self.view.begin_comments(id) {
                    self.dispatch(BackendCommand::LoadComments { post_id: id });
                }
            }
            Intent::OpenEdit(id) => {
                if let Some(post) = self.view.page.find_post(id) {
                    self.dialog = Some(Dialog::Edit {
                        id,
                        draft: PostDraft::from_post(post),
                        error: None,
                    });
                }
            }
            Intent::ConfirmDelete(id) => {
                if let Some(post) = self.view.page.find_post(id) {
                    self.dialog = Some(Dialog::ConfirmDelete {
                        id,
                        title: post.title.clone(),
                    });
                }
            }
            Intent::OpenAuthor(user_id) => {
                self.user_dialog = Some(user_id);
                if self.view.begin_user(user_id) {
                    self.dispatch(BackendCommand::LoadUser { user_id });
                }
            }
        }
    }

    fn show_location_bar(&mut self, ctx: &egui::Context, intents: &mut Vec<Intent>) {
        egui::TopBottomPanel::top("location_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui
                    .add_enabled(self.store.can_go_back(), egui::Button::new("◀"))
                    .on_hover_text("Back")
                    .clicked()
                {
                    intents.push(Intent::Back);
                }
                if ui
                    .add_enabled(self.store.can_go_forward(), egui::Button::new("▶"))
                    .on_hover_text("Forward")
                    .clicked()
                {
                    intents.push(Intent::Forward);
                }
                let response = ui.add(
                    egui::TextEdit::singleline(&mut self.location_input)
                        .hint_text("?tag=love&skip=10")
                        .desired_width((ui.available_width() - 260.0).max(160.0)),
                );
                if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                    intents.push(Intent::GoToLocation);
                }
                if ui.button("Go").clicked() {
                    intents.push(Intent::GoToLocation);
                }
                if ui.button("Copy").clicked() {
                    intents.push(Intent::CopyLocation);
                }
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.label(egui::RichText::new(&self.api_base_url).weak().small());
                });
            });
        });
    }

    fn show_finder(&mut self, ui: &mut egui::Ui, intents: &mut Vec<Intent>) {
        let params = self.store.current().clone();
        ui.horizontal_wrapped(|ui| {
            let response = ui.add(
                egui::TextEdit::singleline(&mut self.search_input)
                    .hint_text("Search posts")
                    .desired_width(220.0),
            );
            if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                intents.push(Intent::SubmitSearch);
            }
            if ui.button("Search").clicked() {
                intents.push(Intent::SubmitSearch);
            }
            if params.active_search().is_some() && ui.button("Clear").clicked() {
                intents.push(Intent::ClearSearch);
            }

            ui.separator();
            let current_tag = params.tag().unwrap_or(ALL_TAGS).to_string();
            let mut selected_tag = current_tag.clone();
            ui.label("Tag");
            egui::ComboBox::from_id_salt("tag_filter")
                .selected_text(selected_tag.clone())
                .show_ui(ui, |ui| {
                    ui.selectable_value(&mut selected_tag, ALL_TAGS.to_string(), "All tags");
                    for tag in &self.view.tags {
                        ui.selectable_value(&mut selected_tag, tag.slug.clone(), &tag.name);
                    }
                });
            if selected_tag != current_tag {
                intents.push(Intent::Patch(
                    SearchParamsPatch::default().with_tag(selected_tag),
                ));
            }

            let current_sort = params.sort_by();
            let mut selected_sort = current_sort;
            ui.label("Sort by");
            egui::ComboBox::from_id_salt("sort_by")
                .selected_text(sort_label(selected_sort))
                .show_ui(ui, |ui| {
                    ui.selectable_value(&mut selected_sort, None, sort_label(None));
                    for sort_by in SortBy::ALL {
                        ui.selectable_value(&mut selected_sort, Some(sort_by), sort_label(Some(sort_by)));
                    }
                });
            if selected_sort != current_sort {
                intents.push(Intent::Patch(
                    SearchParamsPatch::default().with_sort_by(selected_sort),
                ));
            }

            let current_order = params.sort_order();
            let mut selected_order = current_order;
            egui::ComboBox::from_id_salt("sort_order")
                .selected_text(order_label(selected_order))
                .show_ui(ui, |ui| {
                    for order in [SortOrder::Asc, SortOrder::Desc] {
                        ui.selectable_value(&mut selected_order, order, order_label(order));
                    }
                });
            if selected_order != current_order {
                intents.push(Intent::Patch(
                    SearchParamsPatch::default().with_sort_order(selected_order),
                ));
            }

            ui.separator();
            if ui.button("Add post").clicked() {
                intents.push(Intent::OpenAdd);
            }
            if ui.button("Reload").clicked() {
                intents.push(Intent::Reload);
            }
        });
    }

    fn show_posts_table(&self, ui: &mut egui::Ui, intents: &mut Vec<Intent>) {
        let params = self.store.current();
        let term = params.active_search();
        let rows = self.view.page.rows(term);
        let query = term.unwrap_or_default();

        if rows.is_empty() {
            ui.add_space(12.0);
            if self.view.page.is_loading(term) {
                ui.horizontal(|ui| {
                    ui.spinner();
                    ui.label("Loading posts...");
                });
            } else {
                ui.label(egui::RichText::new("No posts to show").weak());
            }
            return;
        }

        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .max_height(ui.available_height() - 48.0)
            .show(ui, |ui| {
                egui::Grid::new("posts_table")
                    .striped(true)
                    .num_columns(6)
                    .spacing([12.0, 6.0])
                    .show(ui, |ui| {
                        for header in ["#", "Title", "Tags", "Author", "Reactions", ""] {
                            ui.label(egui::RichText::new(header).strong());
                        }
                        ui.end_row();

                        for post in rows {
                            ui.label(post.id.to_string());
                            ui.scope(|ui| {
                                ui.set_max_width(360.0);
                                highlighted_label(ui, &post.title, query);
                            });
                            if let Some(tag) = tag_chips(ui, &post.tags, params.tag()) {
                                intents.push(Intent::Patch(
                                    SearchParamsPatch::default().with_tag(tag),
                                ));
                            }
                            match &post.author {
                                Some(author) => {
                                    if ui.link(author.username.as_str()).clicked() {
                                        intents.push(Intent::OpenAuthor(post.user_id));
                                    }
                                }
                                None => {
                                    if ui.link(format!("user {}", post.user_id)).clicked() {
                                        intents.push(Intent::OpenAuthor(post.user_id));
                                    }
                                }
                            }
                            ui.label(format!(
                                "👍 {}  👎 {}",
                                post.reactions.likes, post.reactions.dislikes
                            ));
                            ui.horizontal(|ui| {
                                if ui.small_button("View").clicked() {
                                    intents.push(Intent::OpenDetail(post.id));
                                }
                                if ui.small_button("Edit").clicked() {
                                    intents.push(Intent::OpenEdit(post.id));
                                }
                                if ui.small_button("Delete").clicked() {
                                    intents.push(Intent::ConfirmDelete(post.id));
                                }
                            });
                            ui.end_row();
                        }
                    });
            });
    }

    fn show_pagination(&self, ui: &mut egui::Ui, intents: &mut Vec<Intent>) {
        let params = self.store.current();
        if let Some(term) = params.active_search() {
            ui.horizontal(|ui| {
                ui.label(format!(
                    "{} results for \"{term}\"",
                    self.view.page.total(Some(term))
                ));
                if self.view.page.is_loading(Some(term)) {
                    ui.spinner();
                }
            });
            return;
        }
        if let Some(tag) = params.tag() {
            ui.horizontal(|ui| {
                ui.label(format!(
                    "{} posts tagged \"{tag}\"",
                    self.view.page.total(None)
                ));
                if self.view.page.is_loading(None) {
                    ui.spinner();
                }
            });
            return;
        }

        let window = PageWindow::new(params.skip(), params.limit(), self.view.page.total(None));
        ui.horizontal(|ui| {
            if ui
                .add_enabled(window.has_prev(), egui::Button::new("‹ Prev"))
                .clicked()
            {
                intents.push(Intent::Patch(
                    SearchParamsPatch::default().with_skip(window.prev().skip),
                ));
            }
            ui.label(format!(
                "Page {} of {} ({})",
                window.page_number(),
                window.page_count(),
                window.range_label()
            ));
            if ui
                .add_enabled(window.has_next(), egui::Button::new("Next ›"))
                .clicked()
            {
                intents.push(Intent::Patch(
                    SearchParamsPatch::default().with_skip(window.next().skip),
                ));
            }

            ui.separator();
            let mut selected_limit = window.limit;
            ui.label("Rows");
            egui::ComboBox::from_id_salt("page_limit")
                .selected_text(selected_limit.to_string())
                .width(60.0)
                .show_ui(ui, |ui| {
                    for limit in LIMIT_CHOICES {
                        ui.selectable_value(&mut selected_limit, limit, limit.to_string());
                    }
                });
            if selected_limit != window.limit {
                let resized = window.with_limit(selected_limit);
                intents.push(Intent::Patch(
                    SearchParamsPatch::default()
                        .with_limit(resized.limit)
                        .with_skip(resized.skip),
                ));
            }
            if self.view.page.is_loading(None) {
                ui.spinner();
            }
        });
    }

    fn show_status_bar(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.small(&self.view.status);
                if let Some(at) = &self.last_event_at {
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        ui.small(egui::RichText::new(format!("updated {at}")).weak());
                    });
                }
            });
        });
    }

    fn show_dialogs(&mut self, ctx: &egui::Context, intents: &mut Vec<Intent>) {
        let busy = self.view.mutation_in_flight;
        let query = self.store.current().active_search().unwrap_or_default().to_string();
        let mut close = false;
        let mut command = None;

        match &mut self.dialog {
            Some(Dialog::Add { draft, error }) => {
                match show_post_form(ctx, "Add post", draft, error.as_deref(), false, busy) {
                    DialogAction::Submit => match draft.to_new_post() {
                        Ok(post) => command = Some(BackendCommand::AddPost { post }),
                        Err(message) => *error = Some(message),
                    },
                    DialogAction::Close => close = true,
                    _ => {}
                }
            }
            Some(Dialog::Edit { id, draft, error }) => {
                let heading = format!("Edit post #{id}");
                match show_post_form(ctx, &heading, draft, error.as_deref(), true, busy) {
                    DialogAction::Submit => match draft.to_update() {
                        Ok(update) => command = Some(BackendCommand::UpdatePost { id: *id, update }),
                        Err(message) => *error = Some(message),
                    },
                    DialogAction::Close => close = true,
                    _ => {}
                }
            }
            Some(Dialog::Detail { id }) => match self.view.page.find_post(*id) {
                Some(post) => match show_post_detail(
                    ctx,
                    post,
                    &query,
                    lookup_state(self.view.comments.as_ref(), &*id),
                ) {
                    DialogAction::Close => close = true,
                    DialogAction::EditPost(id) => intents.push(Intent::OpenEdit(id)),
                    DialogAction::OpenAuthor(user_id) => intents.push(Intent::OpenAuthor(user_id)),
                    _ => {}
                },
                None => close = true,
            },
            Some(Dialog::ConfirmDelete { id, title }) => {
                match show_delete_confirmation(ctx, *id, title, busy) {
                    DialogAction::Submit => command = Some(BackendCommand::DeletePost { id: *id }),
                    DialogAction::Close => close = true,
                    _ => {}
                }
            }
            None => {}
        }

        if close {
            self.dialog = None;
        }
        if let Some(command) = command {
            self.view.mutation_in_flight = self.dispatch(command);
        }

        if let Some(user_id) = self.user_dialog {
            let user = lookup_state(self.view.user.as_ref(), &user_id);
            if !show_user_profile(ctx, user_id, user) {
                self.user_dialog = None;
            }
        }
    }
}

impl eframe::App for PostsAdminApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events();
        self.process_query_changes();

        let mut intents = Vec::new();
        self.show_location_bar(ctx, &mut intents);
        self.show_status_bar(ctx);
        egui::CentralPanel::default().show(ctx, |ui| {
            if let Some(banner) = &self.view.banner {
                let dismissed = status_banner(ui, banner);
                ui.add_space(6.0);
                if dismissed {
                    self.view.banner = None;
                }
            }
            self.show_finder(ui, &mut intents);
            ui.separator();
            self.show_posts_table(ui, &mut intents);
            ui.separator();
            self.show_pagination(ui, &mut intents);
        });
        self.show_dialogs(ctx, &mut intents);

        for intent in intents {
            self.apply_intent(intent);
        }

        ctx.request_repaint_after(Duration::from_millis(100));
    }

    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        let settings = PersistedAdminSettings {
            last_location: self.store.location(),
        };
        if let Ok(serialized) = serde_json::to_string(&settings) {
            storage.set_string(SETTINGS_STORAGE_KEY, serialized);
        }
    }
}
