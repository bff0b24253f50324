//! Communities
//!
//! Directory of all communities and the caller's joined ones, a search
//! filter, and a detail view with members, announcements and posts.

use maud::{html, Markup};
use reqwest::Method;
use serde_json::Value;

use super::ProfileHeader;
use crate::api::dto::{Announcement, Community, JoinCommunityRequest, Member, Post, Profile};
use crate::api::{ClientError, Endpoint, RequestBody};
use crate::view::render;
use crate::view::{
    render_collection, ActionButton, ActionKind, ActionLabels, ActionOutcome, ActionRequest, Card,
    CountFormat, LoadOutcome, NotificationKind, Region, SharedButton, ViewController,
};

/// Detail view of one community
pub struct CommunityDetail {
    pub community: Community,
    pub members: Region,
    pub announcements: Region,
    pub posts: Region,
    /// Join/leave toggle; pressed while the caller is a member
    pub membership: SharedButton,
}

impl CommunityDetail {
    fn new(community: Community, joined: bool) -> Self {
        let label = if joined { "Leave Community" } else { "Join Community" };
        Self {
            community,
            members: Region::new("members").with_count(CountFormat::Parenthesized),
            announcements: Region::new("community-announcements").with_count(CountFormat::Parenthesized),
            posts: Region::new("community-posts").with_count(CountFormat::Parenthesized),
            membership: ActionButton::toggle(label, joined).into_shared(),
        }
    }

    pub fn html(&self) -> Markup {
        let community = &self.community;
        html! {
            section.community-detail data-id=(community.id) {
                h2 { (community.display_name()) }
                p.community-description {
                    (community.description.as_deref().filter(|d| !d.is_empty()).unwrap_or("No description available."))
                }
                div.community-stats {
                    span { (render::plural(community.member_count, "member", "members")) }
                    span { (render::plural(community.post_count, "post", "posts")) }
                    span.community-category { (community.category.as_deref().unwrap_or("General")) }
                }
                (self.membership.lock().render("membership", "join-btn"))
                (self.members.html())
                (self.announcements.html())
                (self.posts.html())
            }
        }
    }
}

pub struct CommunitiesPage {
    controller: ViewController,
    pub header: ProfileHeader,
    pub all: Region,
    pub joined: Region,
    pub detail: Option<CommunityDetail>,
    /// Public profile of the member last opened from the detail view
    pub member_profile: Option<Markup>,
    all_items: Vec<Community>,
    joined_items: Vec<Community>,
    search: String,
}

impl CommunitiesPage {
    pub fn new(controller: ViewController) -> Self {
        Self {
            controller,
            header: ProfileHeader::guest(),
            all: Region::new("all-communities")
                .with_skeletons(6)
                .with_count(CountFormat::Noun {
                    singular: "community",
                    plural: "communities",
                }),
            joined: Region::new("joined-communities").with_count(CountFormat::Parenthesized),
            detail: None,
            member_profile: None,
            all_items: Vec::new(),
            joined_items: Vec::new(),
            search: String::new(),
        }
    }

    pub fn controller(&self) -> &ViewController {
        &self.controller
    }

    pub fn all_items(&self) -> &[Community] {
        &self.all_items
    }

    pub fn joined_items(&self) -> &[Community] {
        &self.joined_items
    }

    pub fn is_joined(&self, community_id: &str) -> bool {
        self.joined_items.iter().any(|c| c.id == community_id)
    }

    pub async fn initialize(&mut self) {
        tracing::info!("Initializing communities page");
        self.header = ProfileHeader::load(&self.controller).await;
        self.refresh().await;
    }

    /// Re-fetch both lists concurrently
    pub async fn refresh(&mut self) {
        let controller = &self.controller;
        let (all, joined) = tokio::join!(
            load_all(controller, &mut self.all),
            load_joined(controller, &mut self.joined),
        );
        self.all_items = all.into_items();
        self.joined_items = joined.into_items();

        if !self.search.is_empty() {
            self.render_filtered();
        }
    }

    pub async fn join(&mut self, community_id: &str) -> ActionOutcome<Value> {
        let Some(button) = self.list_button(&format!("join:{}", community_id)) else {
            return ActionOutcome::Ignored;
        };
        self.join_with(&button, community_id, "Join").await
    }

    pub async fn leave(&mut self, community_id: &str) -> ActionOutcome<Value> {
        let Some(button) = self.list_button(&format!("leave:{}", community_id)) else {
            return ActionOutcome::Ignored;
        };
        self.leave_with(&button, community_id, "Leave").await
    }

    fn list_button(&self, key: &str) -> Option<SharedButton> {
        let button = self.all.button(key).or_else(|| self.joined.button(key));
        if button.is_none() {
            tracing::warn!(key, "No such control on the communities page");
        }
        button
    }

    async fn join_with(&mut self, button: &SharedButton, community_id: &str, idle: &str) -> ActionOutcome<Value> {
        let name = self.community_name(community_id);
        let body = match RequestBody::json(&JoinCommunityRequest {
            community_id: community_id.to_string(),
        }) {
            Ok(body) => body,
            Err(err) => return ActionOutcome::Failed(err),
        };

        let outcome = self
            .controller
            .perform_action(
                button,
                ActionRequest::new(Method::POST, Endpoint::JoinedCommunities).with_body(body),
                ActionLabels::new("Joining...", idle, format!("Failed to join {}", name))
                    .notify(format!("Successfully joined {}!", name)),
            )
            .await;

        if outcome.is_success() {
            self.refresh().await;
        }
        outcome
    }

    async fn leave_with(&mut self, button: &SharedButton, community_id: &str, idle: &str) -> ActionOutcome<Value> {
        let name = self.community_name(community_id);
        let outcome = self
            .controller
            .perform_action(
                button,
                ActionRequest::new(Method::DELETE, Endpoint::LeaveCommunity(community_id.to_string())),
                ActionLabels::new("Leaving...", idle, format!("Failed to leave {}", name))
                    .notify(format!("Successfully left {}!", name)),
            )
            .await;

        if outcome.is_success() {
            self.refresh().await;
        }
        outcome
    }

    fn community_name(&self, community_id: &str) -> String {
        self.all_items
            .iter()
            .chain(self.joined_items.iter())
            .find(|c| c.id == community_id)
            .map(|c| c.display_name().to_string())
            .unwrap_or_else(|| "community".to_string())
    }

    /// Narrow the directory to communities matching `term`. An empty term
    /// re-fetches the full list.
    pub async fn filter(&mut self, term: &str) {
        self.search = term.trim().to_string();
        if self.search.is_empty() {
            self.all_items = load_all(&self.controller, &mut self.all).await.into_items();
        } else {
            self.render_filtered();
        }
    }

    fn render_filtered(&mut self) {
        let matches: Vec<Community> = self
            .all_items
            .iter()
            .filter(|c| c.matches(&self.search))
            .cloned()
            .collect();
        tracing::debug!(term = %self.search, matches = matches.len(), "Filtering communities");

        render_collection(&mut self.all, &matches, community_cards, || {
            render::empty_state("No communities found", "Try a different search term.")
        });
    }

    /// Open the detail view, loading its three sections concurrently
    pub async fn open_detail(&mut self, community_id: &str) -> bool {
        let Some(community) = self
            .all_items
            .iter()
            .chain(self.joined_items.iter())
            .find(|c| c.id == community_id)
            .cloned()
        else {
            tracing::warn!(community_id, "Cannot open unknown community");
            return false;
        };

        let mut detail = CommunityDetail::new(community, self.is_joined(community_id));
        let id = community_id.to_string();
        let members = Endpoint::CommunityMembers(id.clone());
        let announcements = Endpoint::CommunityAnnouncements(id.clone());
        let posts = Endpoint::CommunityPosts(id);
        let controller = &self.controller;

        tokio::join!(
            controller.load_collection::<Member, _, _, _>(
                &mut detail.members,
                &members,
                member_cards,
                || render::empty_state("No members yet", "Be the first to join this community!"),
                |message| render::error_state("Failed to load members", message),
            ),
            controller.load_collection::<Announcement, _, _, _>(
                &mut detail.announcements,
                &announcements,
                announcement_cards,
                || render::empty_state("No announcements yet", "Check back later for updates!"),
                |message| render::error_state("Failed to load announcements", message),
            ),
            controller.load_collection::<Post, _, _, _>(
                &mut detail.posts,
                &posts,
                post_cards,
                || render::empty_state("No posts yet", "Be the first to start a conversation!"),
                |message| render::error_state("Failed to load posts", message),
            ),
        );

        self.detail = Some(detail);
        true
    }

    pub fn close_detail(&mut self) {
        self.detail = None;
        self.member_profile = None;
    }

    /// Join or leave the community shown in the detail view
    pub async fn toggle_membership(&mut self) -> ActionOutcome<Value> {
        let Some((id, button)) = self
            .detail
            .as_ref()
            .map(|d| (d.community.id.clone(), d.membership.clone()))
        else {
            return ActionOutcome::Ignored;
        };

        if self.is_joined(&id) {
            self.leave_with(&button, &id, "Join Community").await
        } else {
            self.join_with(&button, &id, "Leave Community").await
        }
    }

    /// Open a member's public profile as a modal
    pub async fn view_member(&mut self, username: &str) -> Result<(), ClientError> {
        match self
            .controller
            .client()
            .get_json::<Profile>(&Endpoint::UserProfile(username.to_string()))
            .await
        {
            Ok(mut profile) => {
                profile.profile_pic_url = profile
                    .profile_pic_url
                    .filter(|p| !p.is_empty())
                    .map(|p| self.controller.client().resolve_asset(&p));
                self.member_profile = Some(render::member_profile(&profile));
                Ok(())
            }
            Err(err) => {
                tracing::warn!(username, error = %err, "Failed to load member profile");
                self.controller.show_notification(
                    err.action_message("Failed to load profile"),
                    NotificationKind::Error,
                );
                Err(err)
            }
        }
    }

    pub fn html(&self) -> Markup {
        html! {
            main.communities {
                (self.header.html())
                (self.controller.notifications().render())
                @if let Some(detail) = &self.detail {
                    (detail.html())
                } @else {
                    (self.all.html())
                    (self.joined.html())
                }
                @if let Some(profile) = &self.member_profile {
                    (profile)
                }
            }
        }
    }
}

async fn load_all(controller: &ViewController, region: &mut Region) -> LoadOutcome<Community> {
    let outcome = controller
        .load_collection(
            region,
            &Endpoint::AllCommunities,
            community_cards,
            || render::empty_state("No communities available", "Check back later for new communities."),
            |message| render::error_state("Failed to load communities", message),
        )
        .await;
    if let LoadOutcome::Failed(err) = &outcome {
        controller.show_notification(err.action_message("Failed to load communities"), NotificationKind::Error);
    }
    outcome
}

async fn load_joined(controller: &ViewController, region: &mut Region) -> LoadOutcome<Community> {
    let outcome = controller
        .load_collection(
            region,
            &Endpoint::JoinedCommunities,
            joined_cards,
            || render::empty_state("No joined communities", "Join some communities to get started!"),
            |message| render::error_state("Failed to load joined communities", message),
        )
        .await;
    if let LoadOutcome::Failed(err) = &outcome {
        controller.show_notification(
            err.action_message("Failed to load joined communities"),
            NotificationKind::Error,
        );
    }
    outcome
}

fn membership_card(c: &Community, joined: bool) -> Card {
    let card = Card::new("community-card", c.id.clone(), render::community_card(c));
    if joined {
        card.control(
            format!("leave:{}", c.id),
            "leave-btn",
            ActionButton::new(ActionKind::Repeatable, "Leave"),
        )
    } else {
        card.control(
            format!("join:{}", c.id),
            "join-btn",
            ActionButton::new(ActionKind::Repeatable, "Join"),
        )
    }
}

fn community_cards(items: &[Community]) -> Vec<Card> {
    items.iter().map(|c| membership_card(c, c.is_joined)).collect()
}

fn joined_cards(items: &[Community]) -> Vec<Card> {
    items.iter().map(|c| membership_card(c, true)).collect()
}

fn member_cards(items: &[Member]) -> Vec<Card> {
    items
        .iter()
        .map(|m| Card::new("member-item", m.handle().to_string(), render::member_card(m)))
        .collect()
}

fn announcement_cards(items: &[Announcement]) -> Vec<Card> {
    items
        .iter()
        .map(|a| Card::new("announcement-item", a.id.clone(), render::announcement_card(a)))
        .collect()
}

fn post_cards(items: &[Post]) -> Vec<Card> {
    items
        .iter()
        .map(|p| Card::new("post-item", p.id.clone(), render::post_item(p)))
        .collect()
}
