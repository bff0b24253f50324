//! HTML Fragments
//!
//! Pure renderers from entities to markup. maud escapes every interpolated
//! value, so server strings never reach the page as raw HTML.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use maud::{html, Markup};

use crate::api::dto::{Announcement, Community, Member, Post, Profile};

pub const DEFAULT_COMMUNITY_IMAGE: &str = "/images/community_logo.png";
pub const DEFAULT_PROFILE_IMAGE: &str = "/images/profile_pic.png";

/// "1 member" / "3 members"
pub fn plural(count: u64, singular: &str, plural: &str) -> String {
    format!("{} {}", count, if count == 1 { singular } else { plural })
}

/// Display name for a backend role; unknown roles read "Member"
pub fn role_display(role: Option<&str>) -> &'static str {
    match role.map(str::to_ascii_uppercase).as_deref() {
        Some("STUDENT") => "Student",
        Some("ALUMNI") => "Alumni",
        Some("TEACHER") => "Teacher",
        Some("ADMIN") => "Admin",
        Some("FACULTY") => "Faculty",
        Some("STAFF") => "Staff",
        _ => "Member",
    }
}

pub fn initials(name: Option<&str>) -> String {
    let initials: String = name
        .unwrap_or_default()
        .split_whitespace()
        .filter_map(|word| word.chars().next())
        .flat_map(char::to_uppercase)
        .collect();

    if initials.is_empty() {
        "U".to_string()
    } else {
        initials
    }
}

/// Format a backend timestamp as "Mar 1, 2024". Accepts RFC 3339, local
/// date-times with optional fractional seconds, and plain dates.
pub fn format_date(raw: &str) -> Option<String> {
    let date = DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.date_naive())
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f").map(|dt| dt.date()))
        .or_else(|_| NaiveDate::parse_from_str(raw, "%Y-%m-%d"))
        .ok()?;
    Some(date.format("%b %-d, %Y").to_string())
}

fn or_default<'a>(value: Option<&'a str>, default: &'a str) -> &'a str {
    value.filter(|v| !v.trim().is_empty()).unwrap_or(default)
}

// ============ Region states ============

pub fn loading(skeletons: usize) -> Markup {
    html! {
        div.loading-state {
            @for _ in 0..skeletons {
                div.skeleton-card {
                    div.skeleton-line {}
                    div.skeleton-line.short {}
                }
            }
        }
    }
}

pub fn empty_state(title: &str, hint: &str) -> Markup {
    html! {
        div.empty-state {
            h3 { (title) }
            p { (hint) }
        }
    }
}

pub fn error_state(title: &str, message: &str) -> Markup {
    html! {
        div.error-state {
            h3 { (title) }
            p { (message) }
        }
    }
}

// ============ Communities ============

pub fn community_card(community: &Community) -> Markup {
    html! {
        div.community-card-header {
            img src=(or_default(community.image_url.as_deref(), DEFAULT_COMMUNITY_IMAGE)) alt=(community.display_name());
            span.member-count { (plural(community.member_count, "member", "members")) }
        }
        div.community-card-body {
            h3.community-title { (community.display_name()) }
            p.community-description { (or_default(community.description.as_deref(), "No description available.")) }
            div.community-stats {
                span.stat-item { (plural(community.post_count, "post", "posts")) }
            }
            div.community-category { (or_default(community.category.as_deref(), "General")) }
        }
    }
}

/// Entry in a "my communities" list
pub fn joined_community_item(community: &Community) -> Markup {
    html! {
        img.community-logo src=(or_default(community.image_url.as_deref(), DEFAULT_COMMUNITY_IMAGE)) alt=(community.display_name());
        div.community-info {
            span.community-name { (community.display_name()) }
            span.community-meta {
                (role_display(community.role.as_deref()))
                @if let Some(joined) = community.joined_at.as_deref().and_then(format_date) {
                    " · Joined " (joined)
                }
            }
        }
    }
}

/// `<option>` for the composer's community picker
pub fn community_option(community: &Community) -> Markup {
    html! {
        option value=(community.id) { (community.display_name()) }
    }
}

// ============ Posts ============

pub fn post_card(post: &Post) -> Markup {
    let author = or_default(post.author_name.as_deref(), "Anonymous");
    html! {
        div.post-header {
            img.author-avatar src=(or_default(post.author_profile_url.as_deref(), DEFAULT_PROFILE_IMAGE)) alt=(author);
            div.author-details {
                span.author-name { (author) }
                span.author-role { (role_display(post.author_role.as_deref())) }
            }
            span.post-community { (post.community_label()) }
            @if let Some(date) = post.created_at.as_deref().and_then(format_date) {
                span.post-time { (date) }
            }
        }
        @if let Some(image) = post.image_url.as_deref().filter(|i| !i.is_empty()) {
            img.post-image src=(image) alt=(post.title.as_deref().unwrap_or("Post image"));
        }
        div.post-body {
            @if let Some(title) = post.title.as_deref() {
                h3.post-title { (title) }
            }
            p.post-content { (post.content.as_deref().unwrap_or_default()) }
        }
    }
}

/// Compact post entry for a community detail view
pub fn post_item(post: &Post) -> Markup {
    html! {
        div.post-header {
            div.post-author-avatar { (initials(post.author_name.as_deref())) }
            div.post-author-info {
                div.post-author-name { (or_default(post.author_name.as_deref(), "Anonymous")) }
                div.post-time {
                    (post.created_at.as_deref().and_then(format_date).unwrap_or_else(|| "Recently".to_string()))
                }
            }
        }
        div.post-title { (post.title.as_deref().unwrap_or_default()) }
        div.post-content { (post.content.as_deref().unwrap_or_default()) }
        span.post-likes { (plural(post.like_count, "like", "likes")) }
    }
}

/// Entry in the profile page's "my posts" list
pub fn my_post_item(post: &Post) -> Markup {
    let when = match (post.time_ago.as_deref(), post.created_at.as_deref()) {
        (Some(ago), _) => Some(ago.to_string()),
        (None, Some(created)) => Some(format_date(created).unwrap_or_else(|| created.to_string())),
        (None, None) => None,
    };
    html! {
        span.post-title { (or_default(post.title.as_deref(), "Untitled post")) }
        span.post-meta {
            (post.community_label())
            @if let Some(when) = when {
                " · " (when)
            }
        }
    }
}

// ============ Members ============

pub fn member_card(member: &Member) -> Markup {
    let role = member.role.as_deref().unwrap_or("Student");
    html! {
        div.member-avatar { (initials(member.name.as_deref())) }
        div.member-info {
            div.member-name { (or_default(member.name.as_deref(), "Unknown User")) }
            div.member-role { (or_default(member.major.as_deref(), "No department specified")) }
        }
        div class={ "member-badge " (role.to_lowercase()) } { (role) }
    }
}

/// Modal body for another user's public profile
pub fn member_profile(profile: &Profile) -> Markup {
    let name = or_default(profile.name.as_deref(), "Unknown User");
    html! {
        div.profile-modal {
            img.profile-modal-pic src=(or_default(profile.profile_pic_url.as_deref(), DEFAULT_PROFILE_IMAGE)) alt=(name);
            h2 { (name) }
            p.profile-modal-role { (role_display(profile.role.as_deref())) }
            dl {
                dt { "Email" } dd { (or_default(profile.email.as_deref(), "Not provided")) }
                dt { "University" } dd { (or_default(profile.university.as_deref(), "Not provided")) }
                dt { "Major" } dd { (or_default(profile.major.as_deref(), "Not provided")) }
            }
            @if let Some(bio) = profile.bio.as_deref().filter(|b| !b.is_empty()) {
                p.profile-modal-bio { (bio) }
            }
            (social_links(profile))
        }
    }
}

// ============ Profile ============

pub fn profile_header(name: &str, picture: &str) -> Markup {
    html! {
        div.profile-header {
            img.profile-pic src=(picture) alt=(name);
            span.profile-name { (name) }
            h2.welcome { "Welcome, " (name) "!" }
        }
    }
}

pub fn profile_details(profile: &Profile) -> Markup {
    html! {
        div.profile-details {
            img.profile-pic src=(or_default(profile.profile_pic_url.as_deref(), DEFAULT_PROFILE_IMAGE)) alt="Profile picture";
            h1.profile-name { (or_default(profile.name.as_deref(), "Guest User")) }
            p.profile-email { (or_default(profile.email.as_deref(), "No email")) }
            p.profile-university { (or_default(profile.university.as_deref(), "University not set")) }
            p.profile-major { (or_default(profile.major.as_deref(), "Major not set")) }
            p.profile-location { (or_default(profile.location.as_deref(), "Location not set")) }
            p.profile-bio { (or_default(profile.bio.as_deref(), "No bio yet.")) }
            (social_links(profile))
        }
    }
}

fn social_links(profile: &Profile) -> Markup {
    let links = [
        ("LinkedIn", profile.linkedin_url.as_deref()),
        ("GitHub", profile.github_url.as_deref()),
        ("LeetCode", profile.leetcode_url.as_deref()),
    ];
    html! {
        ul.social-links {
            @for (site, url) in links {
                li {
                    @match url.filter(|u| !u.trim().is_empty()) {
                        Some(url) => {
                            a href=(url) target="_blank" rel="noopener" { (site) }
                        }
                        None => {
                            span.not-set { (site) " (Not set)" }
                        }
                    }
                }
            }
        }
    }
}

// ============ Announcements ============

pub fn announcement_card(announcement: &Announcement) -> Markup {
    let date = announcement
        .created_at
        .as_deref()
        .map(|d| format_date(d).unwrap_or_else(|| d.to_string()));
    html! {
        div.announcement-header {
            div {
                div.announcement-title {
                    @if announcement.is_urgent() {
                        span.urgent-tag { "URGENT" }
                    }
                    (announcement.title)
                }
                div.announcement-meta {
                    "By " (or_default(announcement.author_name.as_deref(), "Admin"))
                    @if let Some(date) = date {
                        " • " (date)
                    }
                    " • " (or_default(announcement.location.as_deref(), "Online"))
                }
            }
            @if let Some(kind) = announcement.kind.as_deref() {
                div.announcement-type { (kind) }
            }
            span class={ "priority priority-" (announcement.priority()) } { (announcement.priority()) }
            span.category { (announcement.category()) }
        }
        div.announcement-description { (announcement.body()) }
    }
}

pub fn urgent_badge(count: usize) -> Markup {
    html! {
        @if count > 0 {
            span.urgent-badge { (count) }
        }
    }
}
