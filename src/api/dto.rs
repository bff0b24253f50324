//! Data Transfer Objects
//!
//! Entities and request bodies exchanged with the backend. Field names are
//! camelCase on the wire. The backend is lenient about nulls, so flags and
//! counters treat `null` the same as a missing field.

use serde::{Deserialize, Deserializer, Serialize};

/// Accept ids sent either as JSON strings (UUIDs) or numbers
fn id_from_string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(i64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(text) => text,
        RawId::Number(number) => number.to_string(),
    })
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// ============ Collections ============

/// Spring-style page wrapper
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub content: Vec<T>,
    #[serde(default)]
    pub total_elements: Option<u64>,
}

/// A collection endpoint answers with either a bare array or a page
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Collection<T> {
    List(Vec<T>),
    Page(Page<T>),
}

impl<T> Collection<T> {
    /// Items plus the server-side total, when the page wrapper reports one
    pub fn into_parts(self) -> (Vec<T>, Option<u64>) {
        match self {
            Collection::List(items) => (items, None),
            Collection::Page(page) => (page.content, page.total_elements),
        }
    }
}

// ============ Entities ============

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Community {
    #[serde(deserialize_with = "id_from_string_or_number")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub member_count: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub post_count: u64,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_joined: bool,
    /// Caller's role in the community (joined listings only)
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub joined_at: Option<String>,
}

impl Community {
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            "Unnamed Community"
        } else {
            &self.name
        }
    }

    /// Case-insensitive match on name, description or category
    pub fn matches(&self, term: &str) -> bool {
        let term = term.to_lowercase();
        let contains = |field: &str| field.to_lowercase().contains(&term);

        contains(&self.name)
            || self.description.as_deref().is_some_and(contains)
            || self.category.as_deref().is_some_and(contains)
    }
}

/// Community reference embedded in a post
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommunityRef {
    #[serde(deserialize_with = "id_from_string_or_number")]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    #[serde(deserialize_with = "id_from_string_or_number")]
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, alias = "description")]
    pub content: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub author_name: Option<String>,
    #[serde(default)]
    pub author_role: Option<String>,
    #[serde(default)]
    pub author_profile_url: Option<String>,
    #[serde(default, alias = "likesCount", deserialize_with = "null_as_default")]
    pub like_count: u64,
    #[serde(default, alias = "likedByMe", deserialize_with = "null_as_default")]
    pub is_liked: bool,
    #[serde(default)]
    pub community: Option<CommunityRef>,
    #[serde(default)]
    pub community_name: Option<String>,
    #[serde(default)]
    pub community_image_url: Option<String>,
    /// True when the caller already belongs to the post's community
    #[serde(default, deserialize_with = "null_as_default")]
    pub owner: bool,
    #[serde(default)]
    pub time_ago: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub comments: u64,
}

impl Post {
    pub fn community_id(&self) -> Option<&str> {
        self.community.as_ref().map(|c| c.id.as_str())
    }

    pub fn community_label(&self) -> &str {
        self.community_name
            .as_deref()
            .or_else(|| self.community.as_ref().and_then(|c| c.name.as_deref()))
            .unwrap_or("Unknown Community")
    }
}

/// Response of the like toggle. The backend reports `isLiked` but not
/// always the new count.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeState {
    #[serde(default, alias = "likedByMe")]
    pub is_liked: Option<bool>,
    #[serde(default, alias = "likesCount")]
    pub like_count: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub university: Option<String>,
    #[serde(default)]
    pub major: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub profile_pic_url: Option<String>,
    #[serde(default)]
    pub linkedin_url: Option<String>,
    #[serde(default)]
    pub github_url: Option<String>,
    #[serde(default)]
    pub leetcode_url: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    #[serde(deserialize_with = "id_from_string_or_number")]
    pub id: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub major: Option<String>,
    #[serde(default)]
    pub university: Option<String>,
    #[serde(default)]
    pub profile_pic_url: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
}

impl Member {
    /// Key used to open the member's public profile
    pub fn handle(&self) -> &str {
        self.username
            .as_deref()
            .or(self.email.as_deref())
            .unwrap_or(&self.id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Announcement {
    #[serde(deserialize_with = "id_from_string_or_number")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, alias = "author")]
    pub author_name: Option<String>,
    #[serde(default, alias = "date")]
    pub created_at: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub priority: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub category: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub read: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub bookmarked: bool,
}

impl Announcement {
    pub fn priority(&self) -> &str {
        if self.priority.is_empty() {
            "normal"
        } else {
            &self.priority
        }
    }

    pub fn category(&self) -> &str {
        if self.category.is_empty() {
            "general"
        } else {
            &self.category
        }
    }

    pub fn is_urgent(&self) -> bool {
        self.priority().eq_ignore_ascii_case("urgent")
    }

    pub fn body(&self) -> &str {
        self.content
            .as_deref()
            .or(self.description.as_deref())
            .unwrap_or_default()
    }
}

// ============ Request bodies ============

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinCommunityRequest {
    pub community_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalInfoUpdate {
    pub name: String,
    pub email: String,
    pub university: String,
    pub major: String,
    pub location: String,
    pub bio: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_pic_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialLinksUpdate {
    pub linkedin_url: String,
    pub github_url: String,
    pub leetcode_url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct BookmarkUpdate {
    pub bookmarked: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReadUpdate {
    pub read: bool,
}

/// A file picked for upload
#[derive(Debug, Clone, PartialEq)]
pub struct FileUpload {
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

/// New post from the dashboard composer
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostDraft {
    pub community_id: String,
    pub title: String,
    pub content: String,
    pub image: Option<FileUpload>,
}
