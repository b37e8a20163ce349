//! Feed commands.
//!
//! `feed open` is the gated view: it shows the posts, runs the session
//! countdown, and leaves for the "time's up" screen when the window expires.
//! Ctrl-C tears the window down early.

use std::io::{IsTerminal, Write};

use chrono::Utc;
use clap::Subcommand;
use tokio::sync::oneshot;
use vibe_core::feed::time_ago;
use vibe_core::storage::UiConfig;
use vibe_core::{
    open_feed_window, Config, FeedPost, FeedSource, GateExit, GateRunner, MockFeedSource,
    SessionStore, SessionWindowGate, WindowSnapshot,
};

const BAR_WIDTH: usize = 24;

#[derive(Subcommand)]
pub enum FeedAction {
    /// Unlock the feed and run the session countdown
    Open {
        /// Window length in seconds (overrides gate.duration_secs)
        #[arg(long)]
        duration: Option<u64>,
        /// Tick length in milliseconds (overrides gate.tick_millis)
        #[arg(long)]
        tick_ms: Option<u64>,
        /// Seed for the mock feed (overrides feed.seed)
        #[arg(long)]
        seed: Option<u64>,
        /// Emit posts and window events as JSON lines
        #[arg(long)]
        json: bool,
    },
    /// Show whether the feed is unlocked
    Status,
}

pub fn run(action: FeedAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        FeedAction::Open {
            duration,
            tick_ms,
            seed,
            json,
        } => {
            let mut config = Config::load()?;
            if let Some(duration) = duration {
                config.gate.duration_secs = duration;
            }
            if let Some(tick_ms) = tick_ms {
                config.gate.tick_millis = tick_ms;
            }
            config.validate()?;

            let store = SessionStore::open()?;
            let (time_up_tx, time_up_rx) = oneshot::channel::<()>();
            let gate = open_feed_window(&store, &config.gate, move || {
                let _ = time_up_tx.send(());
            })?;

            let posts = MockFeedSource::new(config.feed.post_count, seed.or(config.feed.seed))
                .load(Utc::now())?;
            print_posts(&posts, json)?;

            let runtime = tokio::runtime::Runtime::new()?;
            let exit = runtime.block_on(run_window(gate, time_up_rx, &config, json))?;
            if !json {
                print_exit(exit, &config);
            }
        }
        FeedAction::Status => {
            let store = SessionStore::open()?;
            match store.load_challenge()? {
                Some(current) if current.unlocks_feed() => println!("unlocked"),
                Some(_) => println!("locked: challenge not completed"),
                None => println!("locked: no challenge selected"),
            }
        }
    }
    Ok(())
}

async fn run_window(
    gate: SessionWindowGate,
    mut time_up: oneshot::Receiver<()>,
    config: &Config,
    json: bool,
) -> Result<GateExit, Box<dyn std::error::Error>> {
    let mut handle = GateRunner::new(gate)
        .tick_period(config.gate.tick_period())
        .spawn();
    let mut events = handle.events().ok_or("event stream already taken")?;
    let mut snapshots = handle.subscribe();
    let live = !json && std::io::stdout().is_terminal();
    let mut rendered_secs = None;
    // One listener for the whole window so a Ctrl-C between polls is not lost.
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let exit = loop {
        tokio::select! {
            biased;
            _ = &mut ctrl_c => break handle.cancel().await,
            // Either expiry (sent) or teardown (sender dropped) ends the view.
            _ = &mut time_up => break handle.wait().await,
            Some(event) = events.recv(), if json => {
                println!("{}", serde_json::to_string(&event)?);
            }
            Ok(()) = snapshots.changed() => {
                let snapshot = snapshots.borrow_and_update().clone();
                if !json {
                    render_countdown(&snapshot, &config.ui, live)?;
                    rendered_secs = Some(snapshot.elapsed_secs);
                }
            }
        }
    };

    if json {
        while let Ok(event) = events.try_recv() {
            println!("{}", serde_json::to_string(&event)?);
        }
    } else {
        // The last tick can race the exit signal; make sure it is shown.
        let last = snapshots.borrow().clone();
        if rendered_secs != Some(last.elapsed_secs) {
            render_countdown(&last, &config.ui, live)?;
        }
        if live {
            println!();
        }
    }
    Ok(exit)
}

fn print_posts(posts: &[FeedPost], json: bool) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        println!("{}", serde_json::to_string(posts)?);
        return Ok(());
    }
    let now = Utc::now();
    println!("Today's Community Posts");
    println!("See how others found hidden spots in their cities\n");
    for post in posts {
        println!(
            "{} · {}{}",
            post.author.name,
            time_ago(now, post.posted_at),
            post.location
                .as_deref()
                .map(|l| format!(" · {l}"))
                .unwrap_or_default()
        );
        println!("  {}", post.caption);
        println!("  {} likes · {} comments\n", post.likes, post.comments);
    }
    Ok(())
}

/// One countdown line. The bar shrinks as the window is used up.
fn render_countdown(
    snapshot: &WindowSnapshot,
    ui: &UiConfig,
    live: bool,
) -> std::io::Result<()> {
    let left = 1.0 - snapshot.progress_ratio;
    let filled = (left * BAR_WIDTH as f64).round() as usize;
    let bar = format!("{}{}", "█".repeat(filled), "░".repeat(BAR_WIDTH - filled));
    let mut out = std::io::stdout().lock();
    if live {
        let (r, g, b) = hex_rgb(ui.countdown_color(snapshot.warning));
        write!(
            out,
            "\r\x1b[38;2;{r};{g};{b}m{bar}\x1b[0m {}",
            snapshot.remaining_clock
        )?;
        out.flush()
    } else {
        let marker = if snapshot.warning { " !" } else { "" };
        writeln!(out, "{bar} {}{marker}", snapshot.remaining_clock)
    }
}

fn print_exit(exit: GateExit, config: &Config) {
    match exit {
        GateExit::Expired => {
            println!("Time's up!");
            println!(
                "Your {} minute viewing session has ended. Come back tomorrow for a new challenge.",
                config.gate.duration_secs.div_ceil(60)
            );
        }
        GateExit::Cancelled => println!("Feed closed."),
    }
}

/// `#rrggbb` to components. Anything else renders black.
fn hex_rgb(color: &str) -> (u8, u8, u8) {
    let Some(hex) = color.strip_prefix('#').filter(|h| h.len() == 6) else {
        return (0, 0, 0);
    };
    let channel = |i: usize| hex.get(i..i + 2).and_then(|h| u8::from_str_radix(h, 16).ok());
    match (channel(0), channel(2), channel(4)) {
        (Some(r), Some(g), Some(b)) => (r, g, b),
        _ => (0, 0, 0),
    }
}
