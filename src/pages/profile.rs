//! Profile
//!
//! The caller's profile with inline editors for personal info, social
//! links and the profile photo, plus joined communities and recent posts.

use maud::{html, Markup};
use reqwest::{Method, Url};

use crate::api::dto::{Community, FileUpload, PersonalInfoUpdate, Post, Profile, SocialLinksUpdate};
use crate::api::{Endpoint, FormPart, RequestBody};
use crate::config::FeedConfig;
use crate::view::render;
use crate::view::{
    ActionButton, ActionKind, ActionLabels, ActionOutcome, ActionRequest, Card, CountFormat,
    NotificationKind, Region, SharedButton, ViewController,
};

/// Largest accepted profile photo
pub const MAX_PHOTO_BYTES: usize = 5 * 1024 * 1024;

pub const REQUIRED_FIELDS_MESSAGE: &str = "Name and email are required.";
pub const INVALID_URLS_MESSAGE: &str = "Please enter valid URLs.";
pub const PHOTO_TOO_LARGE_MESSAGE: &str = "Image size should be less than 5MB.";

/// 1x1 transparent PNG uploaded in place of a removed photo
const PLACEHOLDER_PHOTO: [u8; 67] = [
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44, 0x52,
    0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F, 0x15, 0xC4,
    0x89, 0x00, 0x00, 0x00, 0x0A, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9C, 0x63, 0x00, 0x01, 0x00, 0x00,
    0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D, 0xB4, 0x00, 0x00, 0x00, 0x00, 0x49, 0x45, 0x4E, 0x44, 0xAE,
    0x42, 0x60, 0x82,
];

pub struct ProfilePage {
    controller: ViewController,
    feed: FeedConfig,
    pub profile: Profile,
    /// False while showing guest data
    pub loaded: bool,
    pub communities: Region,
    pub posts: Region,
    save_personal: SharedButton,
    save_social: SharedButton,
    upload: SharedButton,
    remove: SharedButton,
}

impl ProfilePage {
    pub fn new(controller: ViewController, feed: FeedConfig) -> Self {
        Self {
            controller,
            feed,
            profile: guest_profile(),
            loaded: false,
            communities: Region::new("my-communities").with_count(CountFormat::Parenthesized),
            posts: Region::new("my-posts"),
            save_personal: ActionButton::new(ActionKind::Repeatable, "Save Changes").into_shared(),
            save_social: ActionButton::new(ActionKind::Repeatable, "Save Links").into_shared(),
            upload: ActionButton::new(ActionKind::Repeatable, "Upload Photo").into_shared(),
            remove: ActionButton::new(ActionKind::Repeatable, "Remove Photo").into_shared(),
        }
    }

    pub fn controller(&self) -> &ViewController {
        &self.controller
    }

    pub fn save_personal_button(&self) -> SharedButton {
        self.save_personal.clone()
    }

    /// Load the profile, then the joined communities and recent posts
    pub async fn load(&mut self) {
        tracing::info!("Loading profile page");

        match self.controller.client().get_json::<Profile>(&Endpoint::Profile).await {
            Ok(profile) => {
                self.set_profile(profile);
                self.loaded = true;
            }
            Err(err) => {
                tracing::warn!(error = %err, "Failed to load profile, showing guest data");
                self.profile = guest_profile();
                self.loaded = false;
                self.communities.show_empty(render::empty_state(
                    "No communities yet",
                    "Log in to see the communities you joined.",
                ));
                self.communities.set_count(0);
                self.posts.show_empty(render::empty_state("No recent posts", "Log in to see your posts."));
                return;
            }
        }

        let my_posts = Endpoint::MyPosts {
            page: 0,
            size: self.feed.my_posts_page_size,
        };
        let controller = &self.controller;
        tokio::join!(
            controller.load_collection::<Community, _, _, _>(
                &mut self.communities,
                &Endpoint::JoinedCommunities,
                community_items,
                || render::empty_state("No communities yet", "Join a community to see it here."),
                |message| render::error_state("Failed to load communities", message),
            ),
            controller.load_collection::<Post, _, _, _>(
                &mut self.posts,
                &my_posts,
                post_items,
                || render::empty_state("No recent posts", "Share something with a community."),
                |message| render::error_state("Failed to load posts", message),
            ),
        );
    }

    fn set_profile(&mut self, mut profile: Profile) {
        profile.profile_pic_url = profile
            .profile_pic_url
            .filter(|p| !p.is_empty())
            .map(|p| self.controller.client().resolve_asset(&p));
        self.profile = profile;
    }

    /// Save name, email and the other personal fields
    pub async fn update_personal_info(&mut self, update: PersonalInfoUpdate) -> ActionOutcome<Profile> {
        let update = PersonalInfoUpdate {
            name: update.name.trim().to_string(),
            email: update.email.trim().to_string(),
            university: update.university.trim().to_string(),
            major: update.major.trim().to_string(),
            location: update.location.trim().to_string(),
            bio: update.bio.trim().to_string(),
            profile_pic_url: update.profile_pic_url,
        };
        if update.name.is_empty() || update.email.is_empty() {
            self.controller
                .show_notification(REQUIRED_FIELDS_MESSAGE, NotificationKind::Error);
            return ActionOutcome::Ignored;
        }

        let body = match RequestBody::json(&update) {
            Ok(body) => body,
            Err(err) => return ActionOutcome::Failed(err),
        };

        let outcome = self
            .controller
            .perform_action::<Profile>(
                &self.save_personal,
                ActionRequest::new(Method::PUT, Endpoint::PersonalInfo).with_body(body),
                ActionLabels::new("Saving...", "Save Changes", "Failed to update personal info")
                    .notify("Personal info updated successfully!"),
            )
            .await;

        if let ActionOutcome::Succeeded(saved) = &outcome {
            let saved = saved.clone().unwrap_or_default();
            let merged = Profile {
                name: saved.name.or(Some(update.name)),
                email: saved.email.or(Some(update.email)),
                university: saved.university.or(Some(update.university)),
                major: saved.major.or(Some(update.major)),
                location: saved.location.or(Some(update.location)),
                bio: saved.bio.or(Some(update.bio)),
                profile_pic_url: saved.profile_pic_url.or_else(|| self.profile.profile_pic_url.clone()),
                ..self.profile.clone()
            };
            self.set_profile(merged);
        }
        outcome
    }

    /// Save the LinkedIn, GitHub and LeetCode links. Empty links clear them.
    pub async fn update_social_links(&mut self, links: SocialLinksUpdate) -> ActionOutcome<Profile> {
        let links = SocialLinksUpdate {
            linkedin_url: links.linkedin_url.trim().to_string(),
            github_url: links.github_url.trim().to_string(),
            leetcode_url: links.leetcode_url.trim().to_string(),
        };
        let valid = [&links.linkedin_url, &links.github_url, &links.leetcode_url]
            .into_iter()
            .all(|url| is_valid_link(url));
        if !valid {
            self.controller
                .show_notification(INVALID_URLS_MESSAGE, NotificationKind::Error);
            return ActionOutcome::Ignored;
        }

        let body = match RequestBody::json(&links) {
            Ok(body) => body,
            Err(err) => return ActionOutcome::Failed(err),
        };

        let outcome = self
            .controller
            .perform_action::<Profile>(
                &self.save_social,
                ActionRequest::new(Method::PUT, Endpoint::SocialLinks).with_body(body),
                ActionLabels::new("Saving...", "Save Links", "Failed to update social links")
                    .notify("Social links updated successfully!"),
            )
            .await;

        if let ActionOutcome::Succeeded(saved) = &outcome {
            let non_empty = |url: String| Some(url).filter(|u| !u.is_empty());
            match saved {
                Some(saved) => {
                    self.profile.linkedin_url = saved.linkedin_url.clone();
                    self.profile.github_url = saved.github_url.clone();
                    self.profile.leetcode_url = saved.leetcode_url.clone();
                }
                None => {
                    self.profile.linkedin_url = non_empty(links.linkedin_url);
                    self.profile.github_url = non_empty(links.github_url);
                    self.profile.leetcode_url = non_empty(links.leetcode_url);
                }
            }
        }
        outcome
    }

    /// Upload a new profile photo (at most 5 MiB)
    pub async fn upload_photo(&mut self, file: FileUpload) -> ActionOutcome<Profile> {
        if file.bytes.len() > MAX_PHOTO_BYTES {
            self.controller
                .show_notification(PHOTO_TOO_LARGE_MESSAGE, NotificationKind::Error);
            return ActionOutcome::Ignored;
        }
        tracing::debug!(file = %file.file_name, size = file.bytes.len(), "Uploading profile photo");

        let outcome = self
            .controller
            .perform_action::<Profile>(
                &self.upload,
                ActionRequest::new(Method::POST, Endpoint::ProfilePicture)
                    .with_body(RequestBody::Multipart(vec![FormPart::file("file", file)])),
                ActionLabels::new("Uploading...", "Upload Photo", "Upload failed")
                    .notify("Photo uploaded successfully!"),
            )
            .await;

        if let ActionOutcome::Succeeded(Some(saved)) = &outcome {
            if let Some(url) = saved.profile_pic_url.as_deref().filter(|u| !u.is_empty()) {
                self.profile.profile_pic_url = Some(self.controller.client().resolve_asset(url));
            }
        }
        outcome
    }

    /// Replace the photo with a blank placeholder. The picture falls back
    /// to the default image unless the server returns a new URL.
    pub async fn remove_photo(&mut self) -> ActionOutcome<Profile> {
        let placeholder = FileUpload {
            file_name: "profile_pic.png".to_string(),
            mime: "image/png".to_string(),
            bytes: PLACEHOLDER_PHOTO.to_vec(),
        };

        let outcome = self
            .controller
            .perform_action::<Profile>(
                &self.remove,
                ActionRequest::new(Method::POST, Endpoint::ProfilePicture)
                    .with_body(RequestBody::Multipart(vec![FormPart::file("file", placeholder)])),
                ActionLabels::new("Removing...", "Remove Photo", "Failed to remove photo")
                    .notify("Photo removed successfully!"),
            )
            .await;

        if let ActionOutcome::Succeeded(saved) = &outcome {
            self.profile.profile_pic_url = saved
                .as_ref()
                .and_then(|p| p.profile_pic_url.as_deref())
                .filter(|u| !u.is_empty())
                .map(|u| self.controller.client().resolve_asset(u));
        }
        outcome
    }

    pub fn html(&self) -> Markup {
        html! {
            main.profile {
                (self.controller.notifications().render())
                (render::profile_details(&self.profile))
                div.profile-actions {
                    (self.save_personal.lock().render("save-personal", "save-btn"))
                    (self.save_social.lock().render("save-social", "save-btn"))
                    (self.upload.lock().render("upload-photo", "upload-btn"))
                    (self.remove.lock().render("remove-photo", "remove-btn"))
                }
                (self.communities.html())
                (self.posts.html())
            }
        }
    }
}

fn guest_profile() -> Profile {
    Profile {
        name: Some("Guest User".to_string()),
        ..Profile::default()
    }
}

/// Empty links are allowed; anything else must be an absolute URL
fn is_valid_link(url: &str) -> bool {
    url.is_empty() || Url::parse(url).is_ok()
}

fn community_items(items: &[Community]) -> Vec<Card> {
    items
        .iter()
        .map(|c| Card::new("community-item", c.id.clone(), render::joined_community_item(c)))
        .collect()
}

fn post_items(items: &[Post]) -> Vec<Card> {
    items
        .iter()
        .map(|p| Card::new("post-item", p.id.clone(), render::my_post_item(p)))
        .collect()
}
