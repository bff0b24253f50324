//! # Circulo
//!
//! Client for a university community network. Each page of the site is a
//! controller that fetches from the REST backend, renders regions of HTML
//! and drives optimistic action buttons.
//!
//! ## Modules
//!
//! - [`api`]: REST client, endpoint contract and wire types
//! - [`view`]: regions, action buttons, notifications and the view controller
//! - [`pages`]: dashboard, communities, profile, announcements and landing
//! - [`session`]: bearer token storage
//! - [`config`]: TOML configuration with environment overrides
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use circulo::{ApiClient, Config, DashboardPage, FileTokenStore, NotificationCenter, ViewController};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load_default();
//!     let tokens = Arc::new(FileTokenStore::new(config.session.token_file.clone()));
//!     let client = Arc::new(ApiClient::new(&config.api, tokens)?);
//!     let controller = ViewController::new(client, NotificationCenter::new(config.notifications.clone()));
//!
//!     let mut dashboard = DashboardPage::new(controller, config.feed.clone());
//!     dashboard.initialize().await;
//!     println!("{}", dashboard.html().into_string());
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod pages;
pub mod session;
pub mod view;

#[cfg(test)]
pub(crate) mod testing;

pub use api::{ApiClient, ClientError, ClientResult, Endpoint, RequestBody};

pub use config::{
    generate_default_config, ApiConfig, Config, ConfigError, FeedConfig, LoggingConfig,
    NotificationConfig, SessionConfig, StackPolicy,
};

pub use pages::{
    AnnouncementFilter, AnnouncementTab, AnnouncementsPage, CommunitiesPage, CommunityDetail,
    DashboardPage, LandingPage, ProfileHeader, ProfilePage,
};

pub use session::{token_from_redirect, FileTokenStore, MemoryTokenStore, SessionError, TokenStore};

pub use view::{
    ActionButton, ActionOutcome, LoadOutcome, NotificationCenter, NotificationKind, Region,
    ViewController,
};
