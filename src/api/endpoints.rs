//! REST Endpoints
//!
//! The one canonical contract every page talks to.

/// A backend route, including any path parameters and query string
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    /// Current user's profile
    Profile,
    /// Another user's public profile
    UserProfile(String),
    PersonalInfo,
    SocialLinks,
    ProfilePicture,

    AllCommunities,
    /// GET lists the caller's communities, POST joins one
    JoinedCommunities,
    LeaveCommunity(String),
    CommunityMembers(String),
    CommunityAnnouncements(String),
    /// GET lists a community's posts, POST creates one
    CommunityPosts(String),

    /// Newest-first feed page
    Feed { page: u32, size: u32 },
    MyPosts { page: u32, size: u32 },
    LikePost(String),

    Announcements,
    AnnouncementBookmark(String),
    AnnouncementRead(String),
}

impl Endpoint {
    /// Path and query relative to the API base URL
    pub fn path(&self) -> String {
        match self {
            Endpoint::Profile => "/profile".to_string(),
            Endpoint::UserProfile(username) => format!("/profile/{}", segment(username)),
            Endpoint::PersonalInfo => "/profile/personal-info".to_string(),
            Endpoint::SocialLinks => "/profile/social-links".to_string(),
            Endpoint::ProfilePicture => "/profile/profile-pic".to_string(),

            Endpoint::AllCommunities => "/communities/all".to_string(),
            Endpoint::JoinedCommunities => "/communities/join".to_string(),
            Endpoint::LeaveCommunity(id) => format!("/communities/leave/{}", segment(id)),
            Endpoint::CommunityMembers(id) => format!("/communities/{}/members", segment(id)),
            Endpoint::CommunityAnnouncements(id) => {
                format!("/communities/{}/announcements", segment(id))
            }
            Endpoint::CommunityPosts(id) => format!("/communities/{}/posts", segment(id)),

            Endpoint::Feed { page, size } => format!(
                "/posts?page={}&size={}&sortBy=createdAt&sortDir=desc",
                page, size
            ),
            Endpoint::MyPosts { page, size } => {
                format!("/posts/my-posts?page={}&size={}", page, size)
            }
            Endpoint::LikePost(id) => format!("/posts/{}/like", segment(id)),

            Endpoint::Announcements => "/announcements".to_string(),
            Endpoint::AnnouncementBookmark(id) => {
                format!("/announcements/{}/bookmark", segment(id))
            }
            Endpoint::AnnouncementRead(id) => format!("/announcements/{}/read", segment(id)),
        }
    }
}

fn segment(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths() {
        assert_eq!(Endpoint::AllCommunities.path(), "/communities/all");
        assert_eq!(Endpoint::JoinedCommunities.path(), "/communities/join");
        assert_eq!(
            Endpoint::LeaveCommunity("42".into()).path(),
            "/communities/leave/42"
        );
        assert_eq!(
            Endpoint::Feed { page: 0, size: 10 }.path(),
            "/posts?page=0&size=10&sortBy=createdAt&sortDir=desc"
        );
        assert_eq!(
            Endpoint::MyPosts { page: 0, size: 5 }.path(),
            "/posts/my-posts?page=0&size=5"
        );
        assert_eq!(
            Endpoint::AnnouncementRead("7".into()).to_string(),
            "/announcements/7/read"
        );
    }

    #[test]
    fn test_path_segments_are_encoded() {
        assert_eq!(
            Endpoint::UserProfile("jane doe@uni.edu".into()).path(),
            "/profile/jane%20doe%40uni.edu"
        );
    }
}
