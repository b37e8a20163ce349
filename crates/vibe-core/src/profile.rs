//! User profile and rated interests.
//!
//! Interests drive which challenges are offered. A profile needs at least
//! `min_interests` of them (3 by default), each rated 1-5.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;

pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;
pub const DEFAULT_RATING: u8 = 3;
pub const DEFAULT_MIN_INTERESTS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Interest {
    Reading,
    Music,
    Art,
    Coffee,
    Photography,
    Travel,
    Exploration,
    Cooking,
    Wellness,
    Fitness,
    Coding,
    Gardening,
}

impl Interest {
    pub const ALL: [Interest; 12] = [
        Interest::Reading,
        Interest::Music,
        Interest::Art,
        Interest::Coffee,
        Interest::Photography,
        Interest::Travel,
        Interest::Exploration,
        Interest::Cooking,
        Interest::Wellness,
        Interest::Fitness,
        Interest::Coding,
        Interest::Gardening,
    ];

    pub fn id(self) -> &'static str {
        match self {
            Interest::Reading => "reading",
            Interest::Music => "music",
            Interest::Art => "art",
            Interest::Coffee => "coffee",
            Interest::Photography => "photography",
            Interest::Travel => "travel",
            Interest::Exploration => "exploration",
            Interest::Cooking => "cooking",
            Interest::Wellness => "wellness",
            Interest::Fitness => "fitness",
            Interest::Coding => "coding",
            Interest::Gardening => "gardening",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Interest::Reading => "Reading",
            Interest::Music => "Music",
            Interest::Art => "Art",
            Interest::Coffee => "Coffee",
            Interest::Photography => "Photography",
            Interest::Travel => "Travel",
            Interest::Exploration => "Exploration",
            Interest::Cooking => "Cooking",
            Interest::Wellness => "Wellness",
            Interest::Fitness => "Fitness",
            Interest::Coding => "Coding",
            Interest::Gardening => "Gardening",
        }
    }
}

impl fmt::Display for Interest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Interest {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        Interest::ALL
            .into_iter()
            .find(|i| i.id() == needle)
            .ok_or_else(|| ValidationError::UnknownInterest(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterestRating {
    pub interest: Interest,
    pub rating: u8,
}

impl InterestRating {
    /// Parse `id` or `id:rating`. A missing rating defaults to 3.
    pub fn parse(arg: &str) -> Result<Self, ValidationError> {
        let (id, rating) = match arg.split_once(':') {
            Some((id, rating)) => {
                let rating = rating.trim().parse::<u8>().map_err(|_| ValidationError::InvalidValue {
                    field: format!("{id}.rating"),
                    message: format!("'{rating}' is not a number"),
                })?;
                (id, rating)
            }
            None => (arg, DEFAULT_RATING),
        };
        let interest = id.parse::<Interest>()?;
        let rated = Self { interest, rating };
        rated.validate()?;
        Ok(rated)
    }

    fn validate(&self) -> Result<(), ValidationError> {
        if !(MIN_RATING..=MAX_RATING).contains(&self.rating) {
            return Err(ValidationError::RatingOutOfRange {
                interest: self.interest.id().to_string(),
                rating: self.rating,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub username: String,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub interests: Vec<InterestRating>,
    pub created_at: DateTime<Utc>,
}

impl UserProfile {
    pub fn new(name: &str, username: &str) -> Result<Self, ValidationError> {
        let name = name.trim();
        let username = username.trim().trim_start_matches('@');
        if name.is_empty() {
            return Err(ValidationError::InvalidValue {
                field: "name".into(),
                message: "name cannot be empty".into(),
            });
        }
        if username.is_empty() || username.contains(char::is_whitespace) {
            return Err(ValidationError::InvalidValue {
                field: "username".into(),
                message: "username must be a single non-empty word".into(),
            });
        }
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            username: username.to_string(),
            avatar: None,
            interests: Vec::new(),
            created_at: Utc::now(),
        })
    }

    /// Replace the profile's interests.
    ///
    /// # Errors
    /// Fails on fewer than `min_interests` entries, duplicates, or ratings outside 1-5.
    pub fn set_interests(
        &mut self,
        interests: Vec<InterestRating>,
        min_interests: usize,
    ) -> Result<(), ValidationError> {
        validate_interests(&interests, min_interests)?;
        self.interests = interests;
        Ok(())
    }

    pub fn interest_ids(&self) -> Vec<Interest> {
        self.interests.iter().map(|r| r.interest).collect()
    }

    pub fn rating_for(&self, interest: Interest) -> Option<u8> {
        self.interests
            .iter()
            .find(|r| r.interest == interest)
            .map(|r| r.rating)
    }

    /// Check a profile loaded from storage.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::InvalidValue {
                field: "name".into(),
                message: "name cannot be empty".into(),
            });
        }
        // Interests may still be empty right after signup.
        if self.interests.is_empty() {
            return Ok(());
        }
        validate_interests(&self.interests, 0)
    }
}

fn validate_interests(interests: &[InterestRating], min_interests: usize) -> Result<(), ValidationError> {
    if interests.len() < min_interests {
        return Err(ValidationError::TooFewInterests {
            required: min_interests,
            got: interests.len(),
        });
    }
    for (i, rated) in interests.iter().enumerate() {
        rated.validate()?;
        if interests[..i].iter().any(|r| r.interest == rated.interest) {
            return Err(ValidationError::DuplicateInterest(rated.interest.id().to_string()));
        }
    }
    Ok(())
}
