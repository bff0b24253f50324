//! Page Controllers
//!
//! One controller per page. Each owns an explicit page state built when the
//! page initializes; nothing is shared between pages except the API client.

pub mod announcements;
pub mod communities;
pub mod dashboard;
pub mod landing;
pub mod profile;

use maud::Markup;

use crate::api::dto::Profile;
use crate::api::Endpoint;
use crate::view::render::{self, DEFAULT_PROFILE_IMAGE};
use crate::view::{ActionButton, ActionKind, ViewController};

pub use announcements::{AnnouncementFilter, AnnouncementTab, AnnouncementsPage};
pub use communities::{CommunitiesPage, CommunityDetail};
pub use dashboard::DashboardPage;
pub use landing::LandingPage;
pub use profile::ProfilePage;

pub const GUEST_NAME: &str = "Guest";

/// Join control for a community card; already-joined communities get a
/// finished button.
pub(crate) fn join_button(joined: bool) -> ActionButton {
    if joined {
        ActionButton::completed("Joined")
    } else {
        ActionButton::new(ActionKind::Terminal, "Join")
    }
}

/// Signed-in user's name and picture, shown at the top of a page
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileHeader {
    pub name: String,
    pub picture: String,
}

impl ProfileHeader {
    pub fn guest() -> Self {
        Self {
            name: GUEST_NAME.to_string(),
            picture: DEFAULT_PROFILE_IMAGE.to_string(),
        }
    }

    /// Fetch the current profile; any failure yields the guest header
    pub async fn load(controller: &ViewController) -> Self {
        match controller.client().get_json::<Profile>(&Endpoint::Profile).await {
            Ok(profile) => {
                let name = profile
                    .name
                    .filter(|n| !n.trim().is_empty())
                    .unwrap_or_else(|| GUEST_NAME.to_string());
                let picture = profile
                    .profile_pic_url
                    .filter(|p| !p.is_empty())
                    .map(|p| controller.client().resolve_asset(&p))
                    .unwrap_or_else(|| DEFAULT_PROFILE_IMAGE.to_string());
                Self { name, picture }
            }
            Err(err) => {
                tracing::warn!(error = %err, "Failed to load profile header, showing guest");
                Self::guest()
            }
        }
    }

    pub fn welcome(&self) -> String {
        format!("Welcome, {}!", self.name)
    }

    pub fn html(&self) -> Markup {
        render::profile_header(&self.name, &self.picture)
    }
}

impl Default for ProfileHeader {
    fn default() -> Self {
        Self::guest()
    }
}
