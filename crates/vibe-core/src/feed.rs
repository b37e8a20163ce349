//! Community feed posts and the data source seam.
//!
//! The feed itself is not part of the gate; it is what the gate protects.
//! Posts come from a [`FeedSource`]. [`MockFeedSource`] produces a
//! deterministic set from fixtures when seeded.

use chrono::{DateTime, Duration, Utc};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_pcg::Mcg128Xsl64;
use serde::{Deserialize, Serialize};

use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostAuthor {
    pub id: String,
    pub name: String,
    pub avatar: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedPost {
    pub id: String,
    pub author: PostAuthor,
    pub image: String,
    pub caption: String,
    #[serde(default)]
    pub location: Option<String>,
    pub posted_at: DateTime<Utc>,
    pub likes: u32,
    pub comments: u32,
    #[serde(default)]
    pub liked: bool,
}

impl FeedPost {
    /// Flip the viewer's like and keep the counter in step.
    pub fn toggle_like(&mut self) {
        if self.liked {
            self.liked = false;
            self.likes = self.likes.saturating_sub(1);
        } else {
            self.liked = true;
            self.likes += 1;
        }
    }
}

/// Where feed posts come from.
pub trait FeedSource {
    /// Load the posts visible at `now`, newest first.
    fn load(&mut self, now: DateTime<Utc>) -> Result<Vec<FeedPost>>;
}

struct Fixture {
    name: &'static str,
    avatar: &'static str,
    image: &'static str,
    caption: &'static str,
    location: &'static str,
}

const FIXTURES: &[Fixture] = &[
    Fixture {
        name: "Emma Wilson",
        avatar: "https://i.pravatar.cc/150?img=1",
        image: "https://images.unsplash.com/photo-1607560105214-0ddef7080cb0",
        caption: "Found this amazing hidden garden tucked away between buildings. Never knew it existed!",
        location: "Secret Garden",
    },
    Fixture {
        name: "Alex Chen",
        avatar: "https://i.pravatar.cc/150?img=2",
        image: "https://images.unsplash.com/photo-1547150492-da7ff1742941",
        caption: "This obscure coffee shop has the best brew in town. Can't believe I've walked past it so many times!",
        location: "Hidden Brew Cafe",
    },
    Fixture {
        name: "Maya Johnson",
        avatar: "https://i.pravatar.cc/150?img=5",
        image: "https://images.unsplash.com/photo-1504173010664-32509aeebb62",
        caption: "Stumbled upon this street art in an alley I never explore. Our city has so many hidden gems!",
        location: "Artist Alley",
    },
    Fixture {
        name: "Jordan Park",
        avatar: "https://i.pravatar.cc/150?img=8",
        image: "https://images.unsplash.com/photo-1506905925346-21bda4d32df4",
        caption: "Took the long way home and caught the light just right over the ridge.",
        location: "North Ridge Trail",
    },
    Fixture {
        name: "Priya Natarajan",
        avatar: "https://i.pravatar.cc/150?img=9",
        image: "https://images.unsplash.com/photo-1519331379826-f10be5486c6f",
        caption: "Tiny bookshop with a reading corner by the window. My new favourite nook.",
        location: "Corner Pages",
    },
];

/// Fixture-backed feed source.
///
/// With a seed the output depends only on the seed and `now`.
pub struct MockFeedSource {
    rng: Mcg128Xsl64,
    post_count: usize,
}

impl MockFeedSource {
    pub fn new(post_count: usize, seed: Option<u64>) -> Self {
        let seed = seed.unwrap_or_else(|| rand::thread_rng().gen());
        Self {
            rng: Mcg128Xsl64::seed_from_u64(seed),
            post_count: post_count.min(FIXTURES.len()),
        }
    }
}

impl FeedSource for MockFeedSource {
    fn load(&mut self, now: DateTime<Utc>) -> Result<Vec<FeedPost>> {
        let picked: Vec<&Fixture> = FIXTURES
            .choose_multiple(&mut self.rng, self.post_count)
            .collect();

        let mut posts: Vec<FeedPost> = picked
            .into_iter()
            .enumerate()
            .map(|(i, f)| {
                let age_min = self.rng.gen_range(5..=90);
                FeedPost {
                    id: (i + 1).to_string(),
                    author: PostAuthor {
                        id: format!("user{}", i + 1),
                        name: f.name.to_string(),
                        avatar: f.avatar.to_string(),
                    },
                    image: f.image.to_string(),
                    caption: f.caption.to_string(),
                    location: Some(f.location.to_string()),
                    posted_at: now - Duration::minutes(age_min),
                    likes: self.rng.gen_range(0..40),
                    comments: self.rng.gen_range(0..10),
                    liked: false,
                }
            })
            .collect();

        posts.sort_by(|a, b| b.posted_at.cmp(&a.posted_at));
        Ok(posts)
    }
}

/// Relative age: `Ns ago`, `Nm ago`, `Nh ago`, `Nd ago`.
///
/// Timestamps in the future count as `0s ago`.
pub fn time_ago(now: DateTime<Utc>, then: DateTime<Utc>) -> String {
    let seconds = (now - then).num_seconds().max(0);
    if seconds < 60 {
        return format!("{seconds}s ago");
    }
    let minutes = seconds / 60;
    if minutes < 60 {
        return format!("{minutes}m ago");
    }
    let hours = minutes / 60;
    if hours < 24 {
        return format!("{hours}h ago");
    }
    format!("{}d ago", hours / 24)
}
