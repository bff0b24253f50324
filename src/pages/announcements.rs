//! Announcements
//!
//! The announcement board: client-side search and filters over the last
//! fetched list, bookmark and read toggles, and the urgent badge.

use maud::{html, Markup};
use reqwest::Method;

use crate::api::dto::{Announcement, BookmarkUpdate, ReadUpdate};
use crate::api::{Endpoint, RequestBody};
use crate::view::render;
use crate::view::{
    render_collection, ActionButton, ActionLabels, ActionOutcome, ActionRequest, Card, CountFormat,
    LoadOutcome, Region, ViewController,
};

/// Tab above the list; anything other than `all` or `urgent` names a category
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AnnouncementTab {
    #[default]
    All,
    Urgent,
    Category(String),
}

impl AnnouncementTab {
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        if value.is_empty() || value.eq_ignore_ascii_case("all") {
            AnnouncementTab::All
        } else if value.eq_ignore_ascii_case("urgent") {
            AnnouncementTab::Urgent
        } else {
            AnnouncementTab::Category(value.to_lowercase())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            AnnouncementTab::All => "all",
            AnnouncementTab::Urgent => "urgent",
            AnnouncementTab::Category(category) => category,
        }
    }

    fn admits(&self, announcement: &Announcement) -> bool {
        match self {
            AnnouncementTab::All => true,
            AnnouncementTab::Urgent => announcement.is_urgent(),
            AnnouncementTab::Category(category) => announcement.category().eq_ignore_ascii_case(category),
        }
    }
}

/// Active search and filters. `None` means "all".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnnouncementFilter {
    pub search: String,
    pub category: Option<String>,
    pub priority: Option<String>,
    pub tab: AnnouncementTab,
}

impl AnnouncementFilter {
    pub fn matches(&self, announcement: &Announcement) -> bool {
        let term = self.search.trim().to_lowercase();
        if !term.is_empty() {
            let contains = |field: &str| field.to_lowercase().contains(&term);
            let found = contains(&announcement.title)
                || contains(announcement.body())
                || announcement.author_name.as_deref().is_some_and(contains);
            if !found {
                return false;
            }
        }

        if let Some(category) = &self.category {
            if !announcement.category().eq_ignore_ascii_case(category) {
                return false;
            }
        }

        if let Some(priority) = &self.priority {
            if !announcement.priority().eq_ignore_ascii_case(priority) {
                return false;
            }
        }

        self.tab.admits(announcement)
    }
}

/// `"all"` and blank select values clear a filter
fn select_value(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() || value.eq_ignore_ascii_case("all") {
        None
    } else {
        Some(value.to_string())
    }
}

pub struct AnnouncementsPage {
    controller: ViewController,
    announcements: Vec<Announcement>,
    filter: AnnouncementFilter,
    pub list: Region,
}

impl AnnouncementsPage {
    pub fn new(controller: ViewController) -> Self {
        Self {
            controller,
            announcements: Vec::new(),
            filter: AnnouncementFilter::default(),
            list: Region::new("announcements")
                .with_count(CountFormat::Noun {
                    singular: "announcement",
                    plural: "announcements",
                })
                .with_skeletons(3),
        }
    }

    pub fn controller(&self) -> &ViewController {
        &self.controller
    }

    pub fn announcements(&self) -> &[Announcement] {
        &self.announcements
    }

    pub fn filter(&self) -> &AnnouncementFilter {
        &self.filter
    }

    pub async fn load(&mut self) {
        tracing::info!("Loading announcements");

        let outcome = self
            .controller
            .load_collection::<Announcement, _, _, _>(
                &mut self.list,
                &Endpoint::Announcements,
                announcement_cards,
                empty_state,
                |message| render::error_state("Failed to load announcements", message),
            )
            .await;

        match outcome {
            LoadOutcome::Loaded { items, .. } => {
                self.announcements = items;
                self.render();
            }
            LoadOutcome::Empty => self.announcements.clear(),
            LoadOutcome::Failed(_) => self.announcements.clear(),
        }
    }

    /// Announcements passing the active filter, in server order
    pub fn visible(&self) -> Vec<Announcement> {
        self.announcements
            .iter()
            .filter(|a| self.filter.matches(a))
            .cloned()
            .collect()
    }

    pub fn apply_filter(&mut self, filter: AnnouncementFilter) {
        self.filter = filter;
        self.render();
    }

    pub fn set_search(&mut self, term: &str) {
        self.filter.search = term.to_string();
        self.render();
    }

    pub fn set_category(&mut self, category: &str) {
        self.filter.category = select_value(category);
        self.render();
    }

    pub fn set_priority(&mut self, priority: &str) {
        self.filter.priority = select_value(priority);
        self.render();
    }

    pub fn set_tab(&mut self, tab: AnnouncementTab) {
        self.filter.tab = tab;
        self.render();
    }

    /// Urgent announcements not yet read
    pub fn urgent_count(&self) -> usize {
        self.announcements
            .iter()
            .filter(|a| a.is_urgent() && !a.read)
            .count()
    }

    fn render(&mut self) {
        let visible = self.visible();
        let rendered = render_collection(&mut self.list, &visible, announcement_cards, empty_state);
        tracing::debug!(
            total = self.announcements.len(),
            rendered,
            tab = self.filter.tab.as_str(),
            "Announcements filtered"
        );
    }

    pub async fn toggle_bookmark(&mut self, id: &str) -> ActionOutcome<serde_json::Value> {
        let Some(current) = self.find(id).map(|a| a.bookmarked) else {
            return ActionOutcome::Ignored;
        };
        let body = match RequestBody::json(&BookmarkUpdate { bookmarked: !current }) {
            Ok(body) => body,
            Err(err) => return ActionOutcome::Failed(err),
        };
        let message = if current {
            "Bookmark removed!"
        } else {
            "Announcement bookmarked!"
        };

        let outcome = self
            .run_toggle(
                &format!("bookmark:{}", id),
                ActionRequest::new(Method::PUT, Endpoint::AnnouncementBookmark(id.to_string())).with_body(body),
                ActionLabels::new("Saving...", bookmark_label(!current), "Failed to update bookmark").notify(message),
            )
            .await;

        if outcome.is_success() {
            if let Some(announcement) = self.find_mut(id) {
                announcement.bookmarked = !current;
            }
            self.render();
        }
        outcome
    }

    pub async fn toggle_read(&mut self, id: &str) -> ActionOutcome<serde_json::Value> {
        let Some(current) = self.find(id).map(|a| a.read) else {
            return ActionOutcome::Ignored;
        };
        let body = match RequestBody::json(&ReadUpdate { read: !current }) {
            Ok(body) => body,
            Err(err) => return ActionOutcome::Failed(err),
        };
        let message = if current { "Marked as unread!" } else { "Marked as read!" };

        let outcome = self
            .run_toggle(
                &format!("read:{}", id),
                ActionRequest::new(Method::PUT, Endpoint::AnnouncementRead(id.to_string())).with_body(body),
                ActionLabels::new("Saving...", read_label(!current), "Failed to update read status").notify(message),
            )
            .await;

        if outcome.is_success() {
            if let Some(announcement) = self.find_mut(id) {
                announcement.read = !current;
            }
            self.render();
        }
        outcome
    }

    async fn run_toggle(
        &self,
        key: &str,
        request: ActionRequest,
        labels: ActionLabels,
    ) -> ActionOutcome<serde_json::Value> {
        match self.list.button(key) {
            Some(button) => self.controller.perform_action(&button, request, labels).await,
            None => {
                tracing::debug!(control = key, "Control not rendered, ignoring");
                ActionOutcome::Ignored
            }
        }
    }

    fn find(&self, id: &str) -> Option<&Announcement> {
        self.announcements.iter().find(|a| a.id == id)
    }

    fn find_mut(&mut self, id: &str) -> Option<&mut Announcement> {
        self.announcements.iter_mut().find(|a| a.id == id)
    }

    pub fn html(&self) -> Markup {
        let tabs = ["all", "urgent", "academic", "events", "general"];
        html! {
            main.announcements {
                (self.controller.notifications().render())
                nav.filter-tabs {
                    @for tab in tabs {
                        @let class = if tab == self.filter.tab.as_str() { "filter-tab active" } else { "filter-tab" };
                        button type="button" class=(class) data-filter=(tab) {
                            (tab)
                            @if tab == "urgent" {
                                (render::urgent_badge(self.urgent_count()))
                            }
                        }
                    }
                }
                (self.list.html())
            }
        }
    }
}

fn bookmark_label(bookmarked: bool) -> &'static str {
    if bookmarked {
        "Bookmarked"
    } else {
        "Bookmark"
    }
}

fn read_label(read: bool) -> &'static str {
    if read {
        "Mark as unread"
    } else {
        "Mark as read"
    }
}

fn empty_state() -> Markup {
    render::empty_state("No announcements found", "Try adjusting your filters or search terms.")
}

fn announcement_cards(items: &[Announcement]) -> Vec<Card> {
    items
        .iter()
        .map(|a| {
            Card::new("announcement-card", a.id.clone(), render::announcement_card(a))
                .control(
                    format!("bookmark:{}", a.id),
                    "bookmark-btn",
                    ActionButton::toggle(bookmark_label(a.bookmarked), a.bookmarked),
                )
                .control(
                    format!("read:{}", a.id),
                    "read-btn",
                    ActionButton::toggle(read_label(a.read), a.read),
                )
        })
        .collect()
}
