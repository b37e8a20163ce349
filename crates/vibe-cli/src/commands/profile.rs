//! Profile commands: create a profile and rate interests.

use clap::Subcommand;
use vibe_core::profile::{Interest, InterestRating};
use vibe_core::{Config, SessionStore, UserProfile};

#[derive(Subcommand)]
pub enum ProfileAction {
    /// Show the current profile
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Create a profile, replacing any existing one
    Create {
        /// Display name
        #[arg(long)]
        name: String,
        /// Handle, with or without a leading '@'
        #[arg(long)]
        username: String,
    },
    /// Set interests as `id` or `id:rating` (rating 1-5, default 3)
    Interests {
        #[arg(required = true)]
        interests: Vec<String>,
    },
    /// List the interests that can be picked
    Catalog,
}

pub fn run(action: ProfileAction) -> Result<(), Box<dyn std::error::Error>> {
    let store = SessionStore::open()?;
    match action {
        ProfileAction::Show { json } => {
            let Some(profile) = store.load_profile()? else {
                return Err("no profile yet; run `vibe-cli profile create`".into());
            };
            if json {
                println!("{}", serde_json::to_string_pretty(&profile)?);
            } else {
                print_profile(&profile);
            }
        }
        ProfileAction::Create { name, username } => {
            let profile = UserProfile::new(&name, &username)?;
            store.save_profile(&profile)?;
            println!("Profile created: @{}", profile.username);
        }
        ProfileAction::Interests { interests } => {
            let config = Config::load()?;
            let Some(mut profile) = store.load_profile()? else {
                return Err("no profile yet; run `vibe-cli profile create`".into());
            };
            let rated = interests
                .iter()
                .map(|s| InterestRating::parse(s))
                .collect::<Result<Vec<_>, _>>()?;
            profile.set_interests(rated, config.profile.min_interests)?;
            store.save_profile(&profile)?;
            println!("Preferences saved: {} interests", profile.interests.len());
        }
        ProfileAction::Catalog => {
            for interest in Interest::ALL {
                println!("{:<12} {}", interest.id(), interest.name());
            }
        }
    }
    Ok(())
}

fn print_profile(profile: &UserProfile) {
    println!("{} (@{})", profile.name, profile.username);
    if profile.interests.is_empty() {
        println!("  no interests yet");
        return;
    }
    for rated in &profile.interests {
        let stars = "*".repeat(rated.rating as usize);
        println!("  {:<12} {stars}", rated.interest.name());
    }
}
