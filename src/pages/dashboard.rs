//! Dashboard
//!
//! Communities slider, newest-first posts feed and the post composer.

use maud::{html, Markup};
use reqwest::Method;
use serde_json::{json, Value};

use super::{join_button, ProfileHeader};
use crate::api::dto::{Community, JoinCommunityRequest, LikeState, Post, PostDraft};
use crate::api::{Endpoint, FormPart, RequestBody};
use crate::config::FeedConfig;
use crate::view::render;
use crate::view::{
    ActionButton, ActionKind, ActionLabels, ActionOutcome, ActionRequest, Card, CountFormat,
    LoadOutcome, NotificationKind, Region, SharedButton, ViewController,
};

pub const LOGIN_REQUIRED_MESSAGE: &str = "You must be logged in to join a community.";
pub const MISSING_FIELDS_MESSAGE: &str = "Please fill in all required fields";

pub struct DashboardPage {
    controller: ViewController,
    feed: FeedConfig,
    pub header: ProfileHeader,
    pub communities: Region,
    pub posts: Region,
    community_items: Vec<Community>,
    post_items: Vec<Post>,
    composer_options: Vec<Community>,
    publish: SharedButton,
}

impl DashboardPage {
    pub fn new(controller: ViewController, feed: FeedConfig) -> Self {
        Self {
            controller,
            feed,
            header: ProfileHeader::guest(),
            communities: Region::new("communities")
                .with_skeletons(6)
                .with_count(CountFormat::Noun {
                    singular: "community",
                    plural: "communities",
                }),
            posts: Region::new("posts").with_count(CountFormat::Noun {
                singular: "post",
                plural: "posts",
            }),
            community_items: Vec::new(),
            post_items: Vec::new(),
            composer_options: Vec::new(),
            publish: ActionButton::new(ActionKind::Repeatable, "Publish").into_shared(),
        }
    }

    pub fn controller(&self) -> &ViewController {
        &self.controller
    }

    pub fn community_items(&self) -> &[Community] {
        &self.community_items
    }

    pub fn post_items(&self) -> &[Post] {
        &self.post_items
    }

    /// Communities offered by the composer's picker
    pub fn composer_options(&self) -> &[Community] {
        &self.composer_options
    }

    pub fn publish_button(&self) -> SharedButton {
        self.publish.clone()
    }

    /// Load every section concurrently; each one falls back on its own
    pub async fn initialize(&mut self) {
        tracing::info!("Initializing dashboard");

        let controller = &self.controller;
        let (header, slider, feed, options) = tokio::join!(
            ProfileHeader::load(controller),
            load_slider(controller, &mut self.communities),
            load_feed(controller, &mut self.posts, self.feed.page_size),
            load_composer_options(controller),
        );

        self.header = header;
        self.community_items = slider.into_items();
        self.post_items = feed.into_items();
        self.composer_options = options;
    }

    pub async fn reload_feed(&mut self) {
        self.post_items = load_feed(&self.controller, &mut self.posts, self.feed.page_size)
            .await
            .into_items();
    }

    /// Join from a card in the communities slider
    pub async fn join_community(&mut self, community_id: &str) -> ActionOutcome<Value> {
        match self.communities.button(&format!("join:{}", community_id)) {
            Some(button) => self.join_with(button, community_id).await,
            None => {
                tracing::warn!(community_id, "No join control for community");
                ActionOutcome::Ignored
            }
        }
    }

    /// Join the community a feed post belongs to
    pub async fn join_from_post(&mut self, post_id: &str) -> ActionOutcome<Value> {
        let community_id = self
            .post_items
            .iter()
            .find(|p| p.id == post_id)
            .and_then(Post::community_id)
            .map(str::to_string);
        let button = self.posts.button(&format!("join-post:{}", post_id));

        match (community_id, button) {
            (Some(community_id), Some(button)) => self.join_with(button, &community_id).await,
            _ => {
                tracing::warn!(post_id, "Post has no joinable community");
                ActionOutcome::Ignored
            }
        }
    }

    async fn join_with(&mut self, button: SharedButton, community_id: &str) -> ActionOutcome<Value> {
        if !self.controller.client().has_token() {
            self.controller
                .show_notification(LOGIN_REQUIRED_MESSAGE, NotificationKind::Error);
            return ActionOutcome::Ignored;
        }

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
                &button,
                ActionRequest::new(Method::POST, Endpoint::JoinedCommunities).with_body(body),
                ActionLabels::new("Joining...", "Joined", format!("Failed to join {}", name))
                    .notify(format!("Successfully joined {}!", name)),
            )
            .await;

        if outcome.is_success() {
            self.mark_joined(community_id);
        }
        outcome
    }

    /// Reflect a join on every card of the same community
    fn mark_joined(&mut self, community_id: &str) {
        for community in self.community_items.iter_mut().filter(|c| c.id == community_id) {
            community.is_joined = true;
        }
        if let Some(button) = self.communities.button(&format!("join:{}", community_id)) {
            button.lock().complete("Joined");
        }

        for post in self
            .post_items
            .iter_mut()
            .filter(|p| p.community_id() == Some(community_id))
        {
            post.owner = true;
            if let Some(button) = self.posts.button(&format!("join-post:{}", post.id)) {
                button.lock().complete("Joined");
            }
        }
    }

    fn community_name(&self, community_id: &str) -> String {
        self.community_items
            .iter()
            .find(|c| c.id == community_id)
            .map(|c| c.display_name().to_string())
            .or_else(|| {
                self.post_items
                    .iter()
                    .find(|p| p.community_id() == Some(community_id))
                    .map(|p| p.community_label().to_string())
            })
            .unwrap_or_else(|| "community".to_string())
    }

    /// Like or unlike a post. The count moves by one while the request is
    /// in flight, then settles on what the server reports; a response
    /// without a count keeps the optimistic one.
    pub async fn toggle_like(&mut self, post_id: &str) -> ActionOutcome<LikeState> {
        let Some(button) = self.posts.button(&format!("like:{}", post_id)) else {
            return ActionOutcome::Ignored;
        };
        let Some(index) = self.post_items.iter().position(|p| p.id == post_id) else {
            return ActionOutcome::Ignored;
        };

        let liked = self.post_items[index].is_liked;
        let count = self.post_items[index].like_count;
        let optimistic = if liked { count.saturating_sub(1) } else { count + 1 };

        let outcome = self
            .controller
            .perform_action::<LikeState>(
                &button,
                ActionRequest::new(Method::POST, Endpoint::LikePost(post_id.to_string())),
                ActionLabels::new(optimistic.to_string(), optimistic.to_string(), "Error liking post"),
            )
            .await;

        if let ActionOutcome::Succeeded(reported) = &outcome {
            let reported = reported.unwrap_or_default();
            let is_liked = reported.is_liked.unwrap_or(!liked);
            let like_count = reported.like_count.unwrap_or(optimistic);
            button.lock().reconcile(like_count.to_string(), is_liked);

            let post = &mut self.post_items[index];
            post.is_liked = is_liked;
            post.like_count = like_count;

            let message = if is_liked { "Post liked!" } else { "Post unliked!" };
            self.controller
                .show_notification(message, NotificationKind::Success);
        }
        outcome
    }

    /// Publish a post from the composer, then reload the feed
    pub async fn publish_post(&mut self, draft: PostDraft) -> ActionOutcome<Value> {
        let blank = |s: &str| s.trim().is_empty();
        if blank(&draft.community_id) || blank(&draft.title) || blank(&draft.content) {
            self.controller
                .show_notification(MISSING_FIELDS_MESSAGE, NotificationKind::Error);
            return ActionOutcome::Ignored;
        }

        let mut parts = vec![
            FormPart::text("title", draft.title.trim()),
            FormPart::text("content", draft.content.trim()),
            FormPart::text("communities", json!([draft.community_id]).to_string()),
        ];
        if let Some(image) = draft.image {
            parts.push(FormPart::file("image", image));
        }

        let outcome = self
            .controller
            .perform_action(
                &self.publish,
                ActionRequest::new(Method::POST, Endpoint::CommunityPosts(draft.community_id))
                    .with_body(RequestBody::Multipart(parts)),
                ActionLabels::new("Publishing...", "Publish", "Failed to publish post")
                    .notify("Post published successfully!"),
            )
            .await;

        if outcome.is_success() {
            self.reload_feed().await;
        }
        outcome
    }

    pub fn html(&self) -> Markup {
        html! {
            main.dashboard {
                (self.header.html())
                (self.controller.notifications().render())
                (self.communities.html())
                form.composer {
                    select name="community" {
                        option value="" { "Select a community" }
                        @for community in &self.composer_options {
                            (render::community_option(community))
                        }
                    }
                    input type="text" name="title" placeholder="Title";
                    textarea name="content" placeholder="Share something with your community" {}
                    (self.publish.lock().render("publish", "publish-btn"))
                }
                (self.posts.html())
            }
        }
    }
}

async fn load_slider(controller: &ViewController, region: &mut Region) -> LoadOutcome<Community> {
    controller
        .load_collection(
            region,
            &Endpoint::AllCommunities,
            community_cards,
            || render::empty_state("No communities available", "Check back later for new communities."),
            |message| render::error_state("Failed to load communities", message),
        )
        .await
}

async fn load_feed(controller: &ViewController, region: &mut Region, page_size: u32) -> LoadOutcome<Post> {
    controller
        .load_collection(
            region,
            &Endpoint::Feed {
                page: 0,
                size: page_size,
            },
            post_cards,
            || render::empty_state("No posts available", "Be the first to share something!"),
            |message| render::error_state("Failed to load posts", message),
        )
        .await
}

async fn load_composer_options(controller: &ViewController) -> Vec<Community> {
    match controller
        .client()
        .fetch_collection::<Community>(&Endpoint::JoinedCommunities)
        .await
    {
        Ok((communities, _)) => communities,
        Err(err) => {
            tracing::warn!(error = %err, "Failed to load composer communities");
            Vec::new()
        }
    }
}

fn community_cards(items: &[Community]) -> Vec<Card> {
    items
        .iter()
        .map(|c| {
            Card::new("community-card", c.id.clone(), render::community_card(c)).control(
                format!("join:{}", c.id),
                "joinnow",
                join_button(c.is_joined),
            )
        })
        .collect()
}

fn post_cards(items: &[Post]) -> Vec<Card> {
    items
        .iter()
        .map(|p| {
            let card = Card::new("post", p.id.clone(), render::post_card(p)).control(
                format!("like:{}", p.id),
                "like-btn",
                ActionButton::toggle(p.like_count.to_string(), p.is_liked),
            );
            match p.community_id() {
                Some(_) => card.control(format!("join-post:{}", p.id), "join-btn", join_button(p.owner)),
                None => card,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::dto::FileUpload;
    use crate::testing::{StubApi, StubResponse};
    use crate::view::{ButtonPhase, RegionState};

    async fn stub_backend() -> StubApi {
        let stub = StubApi::start().await;
        stub.route("GET", "/profile", StubResponse::json(200, json!({"name": "Ada"})));
        stub.route(
            "GET",
            "/communities/all",
            StubResponse::json(
                200,
                json!([{"id": "1", "name": "AI Club", "memberCount": 10, "isJoined": false}]),
            ),
        );
        stub.route(
            "GET",
            "/posts",
            StubResponse::json(
                200,
                json!({"content": [{
                    "id": "p1", "title": "Hello", "content": "First post",
                    "likeCount": 4, "isLiked": false, "owner": false,
                    "community": {"id": "1", "name": "AI Club"}
                }], "totalElements": 1}),
            ),
        );
        stub.route(
            "GET",
            "/communities/join",
            StubResponse::json(200, json!([{"id": "2", "name": "Robotics"}])),
        );
        stub
    }

    async fn dashboard(stub: &StubApi, token: Option<&str>) -> DashboardPage {
        let mut page = DashboardPage::new(stub.controller(token), FeedConfig::default());
        page.initialize().await;
        page
    }

    fn latest_message(page: &DashboardPage) -> String {
        page.controller().notifications().latest().unwrap().message
    }

    #[tokio::test]
    async fn test_initialize_renders_every_section() {
        let stub = stub_backend().await;
        let page = dashboard(&stub, Some("t")).await;

        assert_eq!(page.header.welcome(), "Welcome, Ada!");
        assert_eq!(page.communities.state(), RegionState::Items(1));
        assert_eq!(page.communities.count_text().as_deref(), Some("1 community"));
        assert_eq!(page.posts.count_text().as_deref(), Some("1 post"));
        assert_eq!(page.composer_options().len(), 1);

        let html = page.html().into_string();
        assert!(html.contains("AI Club"));
        assert!(html.contains("10 members"));
        assert!(html.contains("Robotics"));

        let join = page.communities.button("join:1").unwrap();
        assert_eq!(join.lock().label(), "Join");
        assert!(join.lock().is_enabled());

        let feed = stub
            .requests()
            .into_iter()
            .find(|r| r.path() == "/posts")
            .unwrap();
        assert_eq!(feed.uri, "/posts?page=0&size=10&sortBy=createdAt&sortDir=desc");
    }

    #[tokio::test]
    async fn test_empty_feed() {
        let stub = stub_backend().await;
        stub.route(
            "GET",
            "/posts",
            StubResponse::json(200, json!({"content": [], "totalElements": 0})),
        );
        let page = dashboard(&stub, Some("t")).await;

        assert_eq!(page.posts.state(), RegionState::Empty);
        assert_eq!(page.posts.count_text().as_deref(), Some("0 posts"));
        assert!(page.posts.html().into_string().contains("No posts available"));
    }

    #[tokio::test]
    async fn test_sections_fail_independently() {
        let stub = stub_backend().await;
        stub.route("GET", "/profile", StubResponse::json(500, json!({})));
        stub.route("GET", "/posts", StubResponse::json(503, json!({"message": "Feed offline"})));
        let page = dashboard(&stub, Some("t")).await;

        assert_eq!(page.header.welcome(), "Welcome, Guest!");
        assert_eq!(page.posts.state(), RegionState::Error);
        assert!(page.posts.html().into_string().contains("Feed offline"));
        assert_eq!(page.communities.state(), RegionState::Items(1));
    }

    #[tokio::test]
    async fn test_join_success() {
        let stub = stub_backend().await;
        stub.route("POST", "/communities/join", StubResponse::json(200, json!({})));
        let mut page = dashboard(&stub, Some("t")).await;

        let outcome = page.join_community("1").await;
        assert!(outcome.is_success());

        let join = page.communities.button("join:1").unwrap();
        assert_eq!(join.lock().label(), "Joined");
        assert!(!join.lock().is_enabled());
        assert_eq!(latest_message(&page), "Successfully joined AI Club!");

        // The post card of the same community follows
        let post_join = page.posts.button("join-post:p1").unwrap();
        assert_eq!(post_join.lock().phase(), ButtonPhase::Done);

        let join_request = stub
            .requests()
            .into_iter()
            .find(|r| r.method == "POST")
            .unwrap();
        assert_eq!(join_request.json_body(), Some(json!({"communityId": "1"})));
    }

    #[tokio::test]
    async fn test_join_forbidden() {
        let stub = stub_backend().await;
        stub.route(
            "POST",
            "/communities/join",
            StubResponse::json(403, json!({"message": "Not authorized"})),
        );
        let mut page = dashboard(&stub, Some("t")).await;

        let outcome = page.join_community("1").await;
        assert!(matches!(outcome, ActionOutcome::Failed(_)));

        let join = page.communities.button("join:1").unwrap();
        assert_eq!(join.lock().label(), "Join");
        assert!(join.lock().is_enabled());
        assert_eq!(latest_message(&page), "Failed to join AI Club: Not authorized");
    }

    #[tokio::test]
    async fn test_join_requires_login() {
        let stub = stub_backend().await;
        let mut page = dashboard(&stub, None).await;

        let outcome = page.join_from_post("p1").await;
        assert!(matches!(outcome, ActionOutcome::Ignored));
        assert_eq!(latest_message(&page), LOGIN_REQUIRED_MESSAGE);
        assert_eq!(stub.count("POST", "/communities/join"), 0);
    }

    #[tokio::test]
    async fn test_like_then_unlike_restores_state() {
        let stub = stub_backend().await;
        let mut page = dashboard(&stub, Some("t")).await;
        let button = page.posts.button("like:p1").unwrap();
        let original = button.lock().clone();

        stub.route(
            "POST",
            "/posts/p1/like",
            StubResponse::json(200, json!({"isLiked": true, "likeCount": 5})),
        );
        assert!(page.toggle_like("p1").await.is_success());
        assert_eq!(button.lock().label(), "5");
        assert!(button.lock().is_pressed());
        assert_eq!(latest_message(&page), "Post liked!");

        stub.route(
            "POST",
            "/posts/p1/like",
            StubResponse::json(200, json!({"isLiked": false, "likeCount": 4})),
        );
        assert!(page.toggle_like("p1").await.is_success());
        assert_eq!(*button.lock(), original);
        assert_eq!(page.post_items()[0].like_count, 4);
        assert!(!page.post_items()[0].is_liked);
    }

    #[tokio::test]
    async fn test_like_reconciles_with_server_count() {
        let stub = stub_backend().await;
        stub.route(
            "POST",
            "/posts/p1/like",
            StubResponse::json(200, json!({"isLiked": true, "likeCount": 9})),
        );
        let mut page = dashboard(&stub, Some("t")).await;

        page.toggle_like("p1").await;
        let button = page.posts.button("like:p1").unwrap();
        assert_eq!(button.lock().label(), "9");
        assert_eq!(page.post_items()[0].like_count, 9);
    }

    #[tokio::test]
    async fn test_like_without_reported_count_keeps_optimistic_count() {
        let stub = stub_backend().await;
        let mut page = dashboard(&stub, Some("t")).await;
        let button = page.posts.button("like:p1").unwrap();
        let original = button.lock().clone();

        stub.route(
            "POST",
            "/posts/p1/like",
            StubResponse::json(
                200,
                json!({"status": "success", "isLiked": true, "message": "Post liked"}),
            ),
        );
        assert!(page.toggle_like("p1").await.is_success());
        assert_eq!(button.lock().label(), "5");
        assert_eq!(page.post_items()[0].like_count, 5);

        stub.route(
            "POST",
            "/posts/p1/like",
            StubResponse::json(
                200,
                json!({"status": "success", "isLiked": false, "message": "Post unliked"}),
            ),
        );
        assert!(page.toggle_like("p1").await.is_success());
        assert_eq!(*button.lock(), original);
        assert_eq!(page.post_items()[0].like_count, 4);
    }

    #[tokio::test]
    async fn test_like_message_follows_server_state() {
        let stub = stub_backend().await;
        // The server's state wins over the local guess
        stub.route(
            "POST",
            "/posts/p1/like",
            StubResponse::json(200, json!({"isLiked": false, "likeCount": 3})),
        );
        let mut page = dashboard(&stub, Some("t")).await;

        page.toggle_like("p1").await;
        assert_eq!(latest_message(&page), "Post unliked!");
        assert!(!page.post_items()[0].is_liked);
        assert_eq!(page.posts.button("like:p1").unwrap().lock().label(), "3");
    }

    #[tokio::test]
    async fn test_publish_requires_fields() {
        let stub = stub_backend().await;
        let mut page = dashboard(&stub, Some("t")).await;

        let outcome = page
            .publish_post(PostDraft {
                community_id: "2".into(),
                content: "No title".into(),
                ..PostDraft::default()
            })
            .await;

        assert!(matches!(outcome, ActionOutcome::Ignored));
        assert_eq!(latest_message(&page), MISSING_FIELDS_MESSAGE);
        assert_eq!(stub.count("POST", "/communities/2/posts"), 0);
    }

    #[tokio::test]
    async fn test_publish_sends_multipart_and_reloads_feed() {
        let stub = stub_backend().await;
        stub.route("POST", "/communities/2/posts", StubResponse::json(201, json!({"id": "p2"})));
        let mut page = dashboard(&stub, Some("t")).await;

        let outcome = page
            .publish_post(PostDraft {
                community_id: "2".into(),
                title: "Build night".into(),
                content: "Friday at 6".into(),
                image: Some(FileUpload {
                    file_name: "poster.png".into(),
                    mime: "image/png".into(),
                    bytes: vec![0x89, 0x50],
                }),
            })
            .await;

        assert!(outcome.is_success());
        assert_eq!(latest_message(&page), "Post published successfully!");
        assert_eq!(page.publish_button().lock().label(), "Publish");
        assert!(page.publish_button().lock().is_enabled());
        assert_eq!(stub.count("GET", "/posts"), 2);

        let publish = stub
            .requests()
            .into_iter()
            .find(|r| r.method == "POST")
            .unwrap();
        let body = String::from_utf8_lossy(&publish.body).to_string();
        assert!(body.contains("name=\"communities\""));
        assert!(body.contains("[\"2\"]"));
        assert!(body.contains("filename=\"poster.png\""));
    }
}
