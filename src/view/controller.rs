//! View Controller
//!
//! The fetch, render, act and reconcile loop shared by every page.

use maud::Markup;
use reqwest::Method;
use serde::de::DeserializeOwned;
use std::sync::Arc;

use super::action::SharedButton;
use super::notify::{NotificationCenter, NotificationKind};
use super::region::{Card, Region};
use crate::api::{ApiClient, ClientError, Endpoint, RequestBody};

/// A mutating request issued on behalf of a control
#[derive(Debug, Clone)]
pub struct ActionRequest {
    pub method: Method,
    pub endpoint: Endpoint,
    pub body: RequestBody,
}

impl ActionRequest {
    pub fn new(method: Method, endpoint: Endpoint) -> Self {
        Self {
            method,
            endpoint,
            body: RequestBody::Empty,
        }
    }

    pub fn with_body(mut self, body: RequestBody) -> Self {
        self.body = body;
        self
    }
}

/// Texts a control shows across one action
#[derive(Debug, Clone)]
pub struct ActionLabels {
    pub pending: String,
    pub success: String,
    pub success_message: Option<String>,
    /// Prefix of the error notification, e.g. "Failed to join AI Club"
    pub failure_message: String,
}

impl ActionLabels {
    pub fn new(pending: impl Into<String>, success: impl Into<String>, failure: impl Into<String>) -> Self {
        Self {
            pending: pending.into(),
            success: success.into(),
            success_message: None,
            failure_message: failure.into(),
        }
    }

    pub fn notify(mut self, message: impl Into<String>) -> Self {
        self.success_message = Some(message.into());
        self
    }
}

#[derive(Debug)]
pub enum LoadOutcome<T> {
    Loaded { items: Vec<T>, total: u64 },
    Empty,
    Failed(ClientError),
}

impl<T> LoadOutcome<T> {
    /// Fetched items; empty for both the empty and failed outcomes
    pub fn into_items(self) -> Vec<T> {
        match self {
            LoadOutcome::Loaded { items, .. } => items,
            LoadOutcome::Empty | LoadOutcome::Failed(_) => Vec::new(),
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, LoadOutcome::Failed(_))
    }
}

#[derive(Debug)]
pub enum ActionOutcome<T> {
    /// The control was not idle; no request was sent
    Ignored,
    Succeeded(Option<T>),
    Failed(ClientError),
}

impl<T> ActionOutcome<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, ActionOutcome::Succeeded(_))
    }
}

pub struct ViewController {
    client: Arc<ApiClient>,
    notifications: NotificationCenter,
}

impl ViewController {
    pub fn new(client: Arc<ApiClient>, notifications: NotificationCenter) -> Self {
        Self {
            client,
            notifications,
        }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn notifications(&self) -> &NotificationCenter {
        &self.notifications
    }

    pub fn show_notification(&self, message: impl Into<String>, kind: NotificationKind) {
        self.notifications.show(message, kind);
    }

    /// Fill a region from a collection endpoint.
    ///
    /// Exactly one of `render`, `empty` and `error` runs, and the region is
    /// replaced wholesale with its result.
    pub async fn load_collection<T, R, E, X>(
        &self,
        region: &mut Region,
        endpoint: &Endpoint,
        render: R,
        empty: E,
        error: X,
    ) -> LoadOutcome<T>
    where
        T: DeserializeOwned,
        R: FnOnce(&[T]) -> Vec<Card>,
        E: FnOnce() -> Markup,
        X: FnOnce(&str) -> Markup,
    {
        region.show_loading();

        match self.client.fetch_collection::<T>(endpoint).await {
            Ok((items, total)) => {
                let total = total.unwrap_or(items.len() as u64);
                tracing::debug!(region = region.name(), %endpoint, count = items.len(), "Collection loaded");
                render_collection(region, &items, render, empty);
                if items.is_empty() {
                    LoadOutcome::Empty
                } else {
                    region.set_count(total);
                    LoadOutcome::Loaded { items, total }
                }
            }
            Err(err) => {
                tracing::warn!(region = region.name(), %endpoint, error = %err, "Failed to load collection");
                region.show_error(error(&err.user_message()));
                region.set_count(0);
                LoadOutcome::Failed(err)
            }
        }
    }

    /// Run a control's request with optimistic pending state.
    ///
    /// A control that is not idle sends nothing. The button lock is only
    /// held between awaits.
    pub async fn perform_action<T: DeserializeOwned>(
        &self,
        button: &SharedButton,
        request: ActionRequest,
        labels: ActionLabels,
    ) -> ActionOutcome<T> {
        let begun = button.lock().begin(&labels.pending);
        if let Err(rejected) = begun {
            tracing::debug!(endpoint = %request.endpoint, reason = %rejected, "Ignoring activation");
            return ActionOutcome::Ignored;
        }

        let result = self
            .client
            .execute::<T>(request.method.clone(), &request.endpoint, &request.body)
            .await;

        match result {
            Ok(value) => {
                button.lock().succeed(&labels.success);
                tracing::info!(method = %request.method, endpoint = %request.endpoint, "Action succeeded");
                if let Some(message) = labels.success_message {
                    self.show_notification(message, NotificationKind::Success);
                }
                ActionOutcome::Succeeded(value)
            }
            Err(err) => {
                button.lock().fail();
                tracing::warn!(method = %request.method, endpoint = %request.endpoint, error = %err, "Action failed");
                self.show_notification(err.action_message(&labels.failure_message), NotificationKind::Error);
                ActionOutcome::Failed(err)
            }
        }
    }
}

/// Render already-fetched items into a region, or its empty state.
/// Returns the number of rendered items.
pub fn render_collection<T, R, E>(region: &mut Region, items: &[T], render: R, empty: E) -> usize
where
    R: FnOnce(&[T]) -> Vec<Card>,
    E: FnOnce() -> Markup,
{
    if items.is_empty() {
        region.show_empty(empty());
        region.set_count(0);
        return 0;
    }

    let cards = render(items);
    let rendered = cards.len();
    region.show_cards(cards);
    region.set_count(items.len() as u64);
    rendered
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::dto::Community;
    use crate::api::NETWORK_ERROR_MESSAGE;
    use crate::config::{ApiConfig, NotificationConfig};
    use crate::session::MemoryTokenStore;
    use crate::testing::{StubApi, StubResponse};
    use crate::view::action::{ActionButton, ActionKind, ButtonPhase};
    use crate::view::region::{CountFormat, RegionState};
    use crate::view::render;
    use maud::html;
    use serde_json::json;
    use std::time::Duration;

    fn communities_region() -> Region {
        Region::new("communities").with_count(CountFormat::Noun {
            singular: "community",
            plural: "communities",
        })
    }

    fn render_communities(items: &[Community]) -> Vec<Card> {
        items
            .iter()
            .map(|c| {
                Card::new("community-card", c.id.clone(), render::community_card(c)).control(
                    format!("join:{}", c.id),
                    "join-btn",
                    ActionButton::new(ActionKind::Terminal, "Join"),
                )
            })
            .collect()
    }

    async fn load(controller: &ViewController, region: &mut Region) -> LoadOutcome<Community> {
        controller
            .load_collection(
                region,
                &Endpoint::AllCommunities,
                render_communities,
                || render::empty_state("No communities available", "Check back later."),
                |msg| render::error_state("Failed to load communities", msg),
            )
            .await
    }

    #[tokio::test]
    async fn test_load_renders_every_item() {
        let stub = StubApi::start().await;
        stub.route(
            "GET",
            "/communities/all",
            StubResponse::json(
                200,
                json!([
                    {"id": "1", "name": "AI Club", "memberCount": 10, "isJoined": false},
                    {"id": "2", "name": "Chess", "memberCount": 1}
                ]),
            ),
        );
        let controller = stub.controller(Some("t"));
        let mut region = communities_region();

        let outcome = load(&controller, &mut region).await;
        assert!(matches!(outcome, LoadOutcome::Loaded { total: 2, .. }));
        assert_eq!(region.state(), RegionState::Items(2));
        assert_eq!(region.count_text().as_deref(), Some("2 communities"));

        let html = region.html().into_string();
        assert!(html.contains("AI Club"));
        assert!(html.contains("10 members"));
        assert!(html.contains("1 member<"));

        let join = region.button("join:1").unwrap();
        assert!(join.lock().is_enabled());
        assert_eq!(join.lock().label(), "Join");
    }

    #[tokio::test]
    async fn test_empty_collection_is_not_an_error() {
        let stub = StubApi::start().await;
        stub.route("GET", "/communities/all", StubResponse::json(200, json!([])));
        let controller = stub.controller(None);
        let mut region = communities_region();

        let outcome = load(&controller, &mut region).await;
        assert!(matches!(outcome, LoadOutcome::Empty));
        assert_eq!(region.state(), RegionState::Empty);
        assert_eq!(region.count(), Some(0));
        assert!(region.html().into_string().contains("No communities available"));
    }

    #[tokio::test]
    async fn test_error_status_shows_error_state() {
        let stub = StubApi::start().await;
        stub.route(
            "GET",
            "/communities/all",
            StubResponse::json(500, json!({"message": "Database unavailable"})),
        );
        let controller = stub.controller(None);
        let mut region = communities_region();
        region.show_cards(render_communities(&[serde_json::from_value(json!({"id": "9"})).unwrap()]));

        let outcome = load(&controller, &mut region).await;
        assert!(outcome.is_failed());
        assert_eq!(region.state(), RegionState::Error);
        assert!(region.is_empty());
        assert!(region.button("join:9").is_none());
        assert_eq!(region.count(), Some(0));
        assert!(region.html().into_string().contains("Database unavailable"));
    }

    #[tokio::test]
    async fn test_page_total_drives_count_label() {
        let stub = StubApi::start().await;
        stub.route(
            "GET",
            "/communities/all",
            StubResponse::json(200, json!({"content": [{"id": "1", "name": "AI Club"}], "totalElements": 12})),
        );
        let controller = stub.controller(None);
        let mut region = communities_region();

        load(&controller, &mut region).await;
        assert_eq!(region.len(), 1);
        assert_eq!(region.count_text().as_deref(), Some("12 communities"));
    }

    #[tokio::test]
    async fn test_action_success_and_failure() {
        let stub = StubApi::start().await;
        stub.route("POST", "/communities/join", StubResponse::json(200, json!({})));
        let controller = stub.controller(Some("t"));
        let button = ActionButton::new(ActionKind::Terminal, "Join").into_shared();

        let request = ActionRequest::new(Method::POST, Endpoint::JoinedCommunities)
            .with_body(RequestBody::json(&json!({"communityId": "1"})).unwrap());
        let labels = ActionLabels::new("Joining...", "Joined", "Failed to join AI Club")
            .notify("Successfully joined AI Club!");

        let outcome = controller
            .perform_action::<serde_json::Value>(&button, request.clone(), labels.clone())
            .await;
        assert!(outcome.is_success());
        assert_eq!(button.lock().phase(), ButtonPhase::Done);
        assert_eq!(
            controller.notifications().latest().unwrap().message,
            "Successfully joined AI Club!"
        );

        // Terminal: a second activation sends nothing
        let outcome = controller
            .perform_action::<serde_json::Value>(&button, request, labels)
            .await;
        assert!(matches!(outcome, ActionOutcome::Ignored));
        assert_eq!(stub.count("POST", "/communities/join"), 1);
    }

    #[tokio::test]
    async fn test_action_error_restores_button() {
        let stub = StubApi::start().await;
        stub.route(
            "POST",
            "/communities/join",
            StubResponse::json(403, json!({"message": "Not authorized"})),
        );
        let controller = stub.controller(Some("t"));
        let button = ActionButton::new(ActionKind::Terminal, "Join").into_shared();

        let outcome = controller
            .perform_action::<serde_json::Value>(
                &button,
                ActionRequest::new(Method::POST, Endpoint::JoinedCommunities),
                ActionLabels::new("Joining...", "Joined", "Failed to join AI Club"),
            )
            .await;

        assert!(matches!(outcome, ActionOutcome::Failed(_)));
        let state = button.lock().clone();
        assert_eq!(state.label(), "Join");
        assert!(state.is_enabled());

        let note = controller.notifications().latest().unwrap();
        assert_eq!(note.kind, NotificationKind::Error);
        assert_eq!(note.message, "Failed to join AI Club: Not authorized");
    }

    #[tokio::test]
    async fn test_network_failure_message() {
        let config = ApiConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            request_timeout_secs: 2,
        };
        let client = ApiClient::new(&config, Arc::new(MemoryTokenStore::new(Some("t".into())))).unwrap();
        let controller = ViewController::new(
            Arc::new(client),
            NotificationCenter::new(NotificationConfig::default()),
        );
        let button = ActionButton::toggle("4", false).into_shared();

        let outcome = controller
            .perform_action::<serde_json::Value>(
                &button,
                ActionRequest::new(Method::POST, Endpoint::LikePost("p1".into())),
                ActionLabels::new("...", "5", "Error liking post"),
            )
            .await;

        assert!(matches!(outcome, ActionOutcome::Failed(ref e) if e.is_network()));
        assert_eq!(button.lock().label(), "4");
        assert_eq!(
            controller.notifications().latest().unwrap().message,
            NETWORK_ERROR_MESSAGE
        );
    }

    #[tokio::test]
    async fn test_timeout_counts_as_network_failure() {
        let stub = StubApi::start().await;
        stub.route(
            "POST",
            "/posts/p1/like",
            StubResponse::json(200, json!({"isLiked": true, "likeCount": 5}))
                .delayed(Duration::from_secs(3)),
        );
        let config = ApiConfig {
            base_url: stub.base_url(),
            request_timeout_secs: 1,
        };
        let client = ApiClient::new(&config, Arc::new(MemoryTokenStore::new(Some("t".into())))).unwrap();
        let controller = ViewController::new(
            Arc::new(client),
            NotificationCenter::new(NotificationConfig::default()),
        );
        let button = ActionButton::toggle("4", false).into_shared();

        let outcome = controller
            .perform_action::<serde_json::Value>(
                &button,
                ActionRequest::new(Method::POST, Endpoint::LikePost("p1".into())),
                ActionLabels::new("5", "5", "Error liking post"),
            )
            .await;

        assert!(matches!(outcome, ActionOutcome::Failed(ClientError::Timeout)));
        assert_eq!(button.lock().label(), "4");
        assert!(button.lock().is_enabled());
        assert_eq!(button.lock().phase(), ButtonPhase::Idle);
        assert_eq!(
            controller.notifications().latest().unwrap().message,
            NETWORK_ERROR_MESSAGE
        );
    }

    #[tokio::test]
    async fn test_double_submit_sends_one_request() {
        let stub = StubApi::start().await;
        stub.route(
            "POST",
            "/posts/p1/like",
            StubResponse::json(200, json!({"isLiked": true, "likeCount": 5}))
                .delayed(Duration::from_millis(300)),
        );
        let controller = stub.controller(Some("t"));
        let button = ActionButton::toggle("4", false).into_shared();

        let request = ActionRequest::new(Method::POST, Endpoint::LikePost("p1".into()));
        let labels = ActionLabels::new("...", "5", "Error liking post");

        let (first, second) = tokio::join!(
            controller.perform_action::<serde_json::Value>(&button, request.clone(), labels.clone()),
            async {
                tokio::time::sleep(Duration::from_millis(50)).await;
                assert!(!button.lock().is_enabled());
                controller
                    .perform_action::<serde_json::Value>(&button, request.clone(), labels.clone())
                    .await
            }
        );

        assert!(first.is_success());
        assert!(matches!(second, ActionOutcome::Ignored));
        assert_eq!(stub.count("POST", "/posts/p1/like"), 1);
        assert!(button.lock().is_enabled());
    }

    #[test]
    fn test_render_collection_locally() {
        let mut region = communities_region();
        let items: Vec<Community> =
            serde_json::from_value(json!([{"id": "1", "name": "AI Club"}])).unwrap();

        let rendered = render_collection(&mut region, &items, render_communities, || html! { "none" });
        assert_eq!(rendered, 1);
        assert_eq!(region.count_text().as_deref(), Some("1 community"));

        let rendered = render_collection(&mut region, &items[..0], render_communities, || html! { "none" });
        assert_eq!(rendered, 0);
        assert_eq!(region.state(), RegionState::Empty);
    }
}
