use chrono::Utc;
use clap::{ArgGroup, Subcommand};
use vibe_core::challenge::{self, CurrentChallenge, Submission};
use vibe_core::{Challenge, SessionStore};

#[derive(Subcommand)]
pub enum ChallengeAction {
    /// List challenges for your interests
    List {
        /// Include challenges for every interest
        #[arg(long)]
        all: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Pick today's challenge
    Select {
        /// Challenge ID (e.g. "reading-1")
        id: String,
    },
    /// Complete the current challenge
    #[command(group(ArgGroup::new("submission").required(true).args(["photo", "text", "mock_photo"])))]
    Complete {
        /// Image path or URL for photo challenges
        #[arg(long)]
        photo: Option<String>,
        /// Entry text for text challenges
        #[arg(long)]
        text: Option<String>,
        /// Use a placeholder image
        #[arg(long)]
        mock_photo: bool,
    },
    /// Show the current challenge
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Forget the current challenge
    Clear,
}

pub fn run(action: ChallengeAction) -> Result<(), Box<dyn std::error::Error>> {
    let store = SessionStore::open()?;
    match action {
        ChallengeAction::List { all, json } => {
            let challenges = if all {
                challenge::catalog()
            } else {
                let interests = store
                    .load_profile()?
                    .map(|p| p.interest_ids())
                    .unwrap_or_default();
                if interests.is_empty() {
                    return Err(
                        "no interests found; set them with `vibe-cli profile interests` or pass --all"
                            .into(),
                    );
                }
                challenge::for_interests(&interests)
            };
            if json {
                println!("{}", serde_json::to_string_pretty(&challenges)?);
            } else {
                for c in &challenges {
                    print_challenge(c);
                }
            }
        }
        ChallengeAction::Select { id } => {
            let current = CurrentChallenge::select(&id, Utc::now())?;
            store.save_challenge(&current)?;
            println!("{}", serde_json::to_string(&current.selected_event())?);
        }
        ChallengeAction::Complete {
            photo,
            text,
            mock_photo,
        } => {
            let Some(mut current) = store.load_challenge()? else {
                return Err("no challenge selected; run `vibe-cli challenge select <id>`".into());
            };
            let submission = match (photo, text) {
                (Some(image), _) => Submission::Photo { image },
                (None, Some(body)) => Submission::Text { body },
                (None, None) if mock_photo => Submission::mock_photo(&mut rand::thread_rng()),
                (None, None) => return Err("nothing to submit".into()),
            };
            let event = current.complete(submission, Utc::now())?;
            store.save_challenge(&current)?;
            println!("{}", serde_json::to_string(&event)?);
        }
        ChallengeAction::Status { json } => match store.load_challenge()? {
            Some(current) if json => println!("{}", serde_json::to_string_pretty(&current)?),
            Some(current) => {
                print_challenge(&current.challenge);
                if current.completed {
                    println!("  completed: feed unlocked");
                } else {
                    println!("  pending since {}", current.selected_at.format("%H:%M"));
                }
            }
            None if json => println!("null"),
            None => println!("no challenge selected"),
        },
        ChallengeAction::Clear => {
            if store.clear_challenge()? {
                println!("challenge cleared");
            } else {
                println!("no challenge selected");
            }
        }
    }
    Ok(())
}

fn print_challenge(c: &Challenge) {
    println!("{:<16} [{}/{}] {}", c.id, c.kind, c.difficulty, c.title);
}
