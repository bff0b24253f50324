//! Community REST API
//!
//! Client side of the backend contract.
//!
//! # Endpoints
//!
//! ## Profile
//! - `GET /profile` - Current user's profile
//! - `GET /profile/{username}` - Another user's profile
//! - `PUT /profile/personal-info` - Update personal info
//! - `PUT /profile/social-links` - Update social links
//! - `POST /profile/profile-pic` - Upload a profile picture (multipart)
//!
//! ## Communities
//! - `GET /communities/all` - Every community
//! - `GET /communities/join` - Communities the caller joined
//! - `POST /communities/join` - Join a community
//! - `DELETE /communities/leave/{id}` - Leave a community
//! - `GET /communities/{id}/members|announcements|posts` - Community detail
//! - `POST /communities/{id}/posts` - Publish a post (multipart)
//!
//! ## Posts
//! - `GET /posts` - Feed (page wrapper)
//! - `GET /posts/my-posts` - Caller's posts (page wrapper)
//! - `POST /posts/{id}/like` - Toggle like
//!
//! ## Announcements
//! - `GET /announcements` - Announcement board
//! - `PUT /announcements/{id}/bookmark|read` - Toggle flags

pub mod client;
pub mod dto;
pub mod endpoints;
pub mod error;

pub use client::{ApiClient, FormPart, FormValue, RequestBody};
pub use endpoints::Endpoint;
pub use error::{ClientError, ClientResult, NETWORK_ERROR_MESSAGE, UNKNOWN_ERROR_MESSAGE};
