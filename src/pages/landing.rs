//! Landing
//!
//! Public page showcasing communities. Works without a session and never
//! shows an error: when the backend is unreachable a built-in list is shown.

use maud::{html, Markup};

use crate::api::dto::Community;
use crate::api::Endpoint;
use crate::view::render;
use crate::view::{render_collection, Card, CountFormat, Region, ViewController};

const FALLBACK_COMMUNITIES: [(&str, u64, &str); 6] = [
    ("AI & Machine Learning", 12450, "Exploring AI frontiers"),
    ("Web Development", 8920, "Building the future web"),
    ("Cybersecurity", 15600, "Defending the digital world"),
    ("Data Science", 11200, "Extracting insights from data"),
    ("Mobile Development", 7850, "Creating amazing mobile experiences"),
    ("Blockchain", 9300, "Building decentralized applications"),
];

/// Built-in showcase used when the community list cannot be fetched
pub fn fallback_communities() -> Vec<Community> {
    FALLBACK_COMMUNITIES
        .iter()
        .enumerate()
        .map(|(i, (name, members, description))| Community {
            id: (i + 1).to_string(),
            name: name.to_string(),
            description: Some(description.to_string()),
            image_url: None,
            member_count: *members,
            post_count: 0,
            category: None,
            is_joined: false,
            role: None,
            joined_at: None,
        })
        .collect()
}

pub struct LandingPage {
    controller: ViewController,
    pub featured: Region,
    using_fallback: bool,
}

impl LandingPage {
    pub fn new(controller: ViewController) -> Self {
        Self {
            controller,
            featured: Region::new("featured-communities").with_count(CountFormat::Noun {
                singular: "community",
                plural: "communities",
            }),
            using_fallback: false,
        }
    }

    pub fn using_fallback(&self) -> bool {
        self.using_fallback
    }

    pub async fn load_featured(&mut self) -> usize {
        self.featured.show_loading();

        let communities = match self
            .controller
            .client()
            .fetch_collection::<Community>(&Endpoint::AllCommunities)
            .await
        {
            Ok((items, _)) if !items.is_empty() => {
                self.using_fallback = false;
                items
            }
            Ok(_) => {
                tracing::info!("No communities yet, showing fallback showcase");
                self.using_fallback = true;
                fallback_communities()
            }
            Err(err) => {
                tracing::warn!(error = %err, "Community list unavailable, showing fallback showcase");
                self.using_fallback = true;
                fallback_communities()
            }
        };

        render_collection(&mut self.featured, &communities, featured_cards, || {
            render::empty_state("No communities available", "Check back soon.")
        })
    }

    pub fn html(&self) -> Markup {
        html! {
            main.landing {
                section.hero {
                    h1 { "Find your people on campus" }
                    a.cta href="/login" { "Get Started" }
                }
                (self.featured.html())
            }
        }
    }
}

fn featured_cards(items: &[Community]) -> Vec<Card> {
    items
        .iter()
        .map(|c| Card::new("community-card", c.id.clone(), render::community_card(c)))
        .collect()
}
