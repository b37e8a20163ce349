//! Daily challenges.
//!
//! A challenge is picked from the catalog for one of the user's interests,
//! then completed with a photo or text submission. Completing the current
//! challenge is what unlocks the feed window.

use std::fmt;

use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::events::Event;
use crate::profile::Interest;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChallengeKind {
    Photo,
    Text,
}

impl fmt::Display for ChallengeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChallengeKind::Photo => f.write_str("photo"),
            ChallengeKind::Text => f.write_str("text"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Difficulty::Easy => f.write_str("easy"),
            Difficulty::Medium => f.write_str("medium"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Challenge {
    pub id: String,
    pub interest: Interest,
    pub title: String,
    pub description: String,
    pub kind: ChallengeKind,
    pub difficulty: Difficulty,
}

type CatalogEntry = (Interest, &'static str, &'static str, &'static str, ChallengeKind, Difficulty);

const CATALOG: &[CatalogEntry] = &[
    (
        Interest::Reading,
        "reading-1",
        "Find a Reading Nook",
        "Discover a new spot in your area perfect for reading. Take a photo and share what makes it special.",
        ChallengeKind::Photo,
        Difficulty::Easy,
    ),
    (
        Interest::Reading,
        "reading-2",
        "Book Recommendation",
        "Write a short review of a book you recently read and would recommend to others.",
        ChallengeKind::Text,
        Difficulty::Medium,
    ),
    (
        Interest::Art,
        "art-1",
        "Street Art Hunt",
        "Find an interesting piece of street art or mural in your city and capture it.",
        ChallengeKind::Photo,
        Difficulty::Easy,
    ),
    (
        Interest::Art,
        "art-2",
        "Create a Sketch",
        "Draw something that represents your current mood and share it with the community.",
        ChallengeKind::Photo,
        Difficulty::Medium,
    ),
    (
        Interest::Music,
        "music-1",
        "Song of the Day",
        "Share the song that's been on repeat for you today and why it resonates.",
        ChallengeKind::Text,
        Difficulty::Easy,
    ),
    (
        Interest::Music,
        "music-2",
        "Local Music Venue",
        "Find a local music venue or spot where musicians perform and share it.",
        ChallengeKind::Photo,
        Difficulty::Medium,
    ),
    (
        Interest::Photography,
        "photography-1",
        "Morning Light",
        "Capture something beautiful in the morning light today.",
        ChallengeKind::Photo,
        Difficulty::Easy,
    ),
    (
        Interest::Photography,
        "photography-2",
        "Shadows & Reflections",
        "Find an interesting shadow or reflection and photograph it creatively.",
        ChallengeKind::Photo,
        Difficulty::Medium,
    ),
    (
        Interest::Exploration,
        "exploration-1",
        "Hidden Spot",
        "Find a hidden or lesser-known spot in your city that you've never visited before.",
        ChallengeKind::Photo,
        Difficulty::Medium,
    ),
    (
        Interest::Exploration,
        "exploration-2",
        "New Route Home",
        "Take a different route home today and share something interesting you discovered.",
        ChallengeKind::Photo,
        Difficulty::Easy,
    ),
];

/// Placeholder captures used when no camera is available.
pub const MOCK_CAPTURE_IMAGES: &[&str] = &[
    "https://images.unsplash.com/photo-1506905925346-21bda4d32df4",
    "https://images.unsplash.com/photo-1519331379826-f10be5486c6f",
    "https://images.unsplash.com/photo-1449034446853-66c86144b0ad",
    "https://images.unsplash.com/photo-1507608616040-a5cc07d189b9",
];

fn to_challenge(entry: &CatalogEntry) -> Challenge {
    let (interest, id, title, description, kind, difficulty) = *entry;
    Challenge {
        id: id.to_string(),
        interest,
        title: title.to_string(),
        description: description.to_string(),
        kind,
        difficulty,
    }
}

/// The full challenge catalog.
pub fn catalog() -> Vec<Challenge> {
    CATALOG.iter().map(to_challenge).collect()
}

/// Look up a challenge by id.
pub fn find(id: &str) -> Option<Challenge> {
    CATALOG.iter().find(|e| e.1 == id).map(to_challenge)
}

/// Challenges for the given interests, grouped in the order the interests are listed.
pub fn for_interests(interests: &[Interest]) -> Vec<Challenge> {
    interests
        .iter()
        .flat_map(|interest| CATALOG.iter().filter(move |e| e.0 == *interest))
        .map(to_challenge)
        .collect()
}

/// What the user hands in to complete a challenge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Submission {
    Photo { image: String },
    Text { body: String },
}

impl Submission {
    pub fn kind(&self) -> ChallengeKind {
        match self {
            Submission::Photo { .. } => ChallengeKind::Photo,
            Submission::Text { .. } => ChallengeKind::Text,
        }
    }

    /// Pick one of the placeholder images.
    pub fn mock_photo<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let image = MOCK_CAPTURE_IMAGES
            .choose(rng)
            .copied()
            .unwrap_or(MOCK_CAPTURE_IMAGES[0]);
        Submission::Photo {
            image: image.to_string(),
        }
    }

    fn is_empty(&self) -> bool {
        match self {
            Submission::Photo { image } => image.trim().is_empty(),
            Submission::Text { body } => body.trim().is_empty(),
        }
    }
}

/// The challenge the user is working on today.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentChallenge {
    pub challenge: Challenge,
    pub selected_at: DateTime<Utc>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub submission: Option<Submission>,
}

impl CurrentChallenge {
    /// Select a challenge from the catalog.
    ///
    /// # Errors
    /// Returns `ValidationError::UnknownChallenge` if `id` is not in the catalog.
    pub fn select(id: &str, now: DateTime<Utc>) -> Result<Self, ValidationError> {
        let challenge = find(id).ok_or_else(|| ValidationError::UnknownChallenge(id.to_string()))?;
        Ok(Self {
            challenge,
            selected_at: now,
            completed: false,
            completed_at: None,
            submission: None,
        })
    }

    pub fn selected_event(&self) -> Event {
        Event::ChallengeSelected {
            challenge_id: self.challenge.id.clone(),
            kind: self.challenge.kind,
            at: self.selected_at,
        }
    }

    /// Complete the challenge with a matching, non-empty submission.
    ///
    /// # Errors
    /// Fails if already completed, if the submission kind differs from the
    /// challenge kind, or if the submission is blank.
    pub fn complete(
        &mut self,
        submission: Submission,
        now: DateTime<Utc>,
    ) -> Result<Event, ValidationError> {
        if self.completed {
            return Err(ValidationError::AlreadyCompleted(self.challenge.id.clone()));
        }
        if submission.kind() != self.challenge.kind {
            return Err(ValidationError::SubmissionMismatch {
                challenge: self.challenge.id.clone(),
                expected: self.challenge.kind.to_string(),
            });
        }
        if submission.is_empty() {
            return Err(ValidationError::EmptySubmission(self.challenge.id.clone()));
        }
        self.completed = true;
        self.completed_at = Some(now);
        self.submission = Some(submission);
        Ok(Event::ChallengeCompleted {
            challenge_id: self.challenge.id.clone(),
            kind: self.challenge.kind,
            at: now,
        })
    }

    pub fn unlocks_feed(&self) -> bool {
        self.completed
    }

    /// Check a record loaded from storage.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if find(&self.challenge.id).is_none() {
            return Err(ValidationError::UnknownChallenge(self.challenge.id.clone()));
        }
        if self.completed && (self.completed_at.is_none() || self.submission.is_none()) {
            return Err(ValidationError::InvalidValue {
                field: "completed".into(),
                message: "completed challenge has no submission".into(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Mcg128Xsl64;

    #[test]
    fn catalog_ids_are_unique() {
        let all = catalog();
        for (i, c) in all.iter().enumerate() {
            assert!(all[..i].iter().all(|o| o.id != c.id), "duplicate {}", c.id);
        }
        assert_eq!(all.len(), 10);
    }

    #[test]
    fn for_interests_keeps_interest_order() {
        let list = for_interests(&[Interest::Music, Interest::Reading, Interest::Coffee]);
        let ids: Vec<_> = list.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["music-1", "music-2", "reading-1", "reading-2"]);
    }

    #[test]
    fn select_unknown_challenge_fails() {
        let err = CurrentChallenge::select("cooking-9", Utc::now()).unwrap_err();
        assert_eq!(err, ValidationError::UnknownChallenge("cooking-9".into()));
    }

    #[test]
    fn complete_text_challenge() {
        let now = Utc::now();
        let mut current = CurrentChallenge::select("music-1", now).unwrap();
        assert!(!current.unlocks_feed());

        let event = current
            .complete(Submission::Text { body: "Heroes, on repeat".into() }, now)
            .unwrap();
        assert!(matches!(event, Event::ChallengeCompleted { ref challenge_id, .. } if challenge_id == "music-1"));
        assert!(current.unlocks_feed());
        assert_eq!(current.completed_at, Some(now));
        assert!(current.validate().is_ok());
    }

    #[test]
    fn complete_rejects_wrong_kind_and_blank() {
        let now = Utc::now();
        let mut current = CurrentChallenge::select("art-1", now).unwrap();
        assert!(matches!(
            current.complete(Submission::Text { body: "a mural".into() }, now),
            Err(ValidationError::SubmissionMismatch { .. })
        ));
        assert!(matches!(
            current.complete(Submission::Photo { image: "  ".into() }, now),
            Err(ValidationError::EmptySubmission(_))
        ));
        assert!(!current.completed);
    }

    #[test]
    fn complete_twice_fails() {
        let now = Utc::now();
        let mut rng = Mcg128Xsl64::seed_from_u64(7);
        let mut current = CurrentChallenge::select("photography-1", now).unwrap();
        current.complete(Submission::mock_photo(&mut rng), now).unwrap();
        let err = current
            .complete(Submission::mock_photo(&mut rng), now)
            .unwrap_err();
        assert_eq!(err, ValidationError::AlreadyCompleted("photography-1".into()));
    }

    #[test]
    fn mock_photo_uses_placeholder_set() {
        let mut rng = Mcg128Xsl64::seed_from_u64(42);
        match Submission::mock_photo(&mut rng) {
            Submission::Photo { image } => assert!(MOCK_CAPTURE_IMAGES.contains(&image.as_str())),
            other => panic!("expected photo, got {other:?}"),
        }
    }
}
