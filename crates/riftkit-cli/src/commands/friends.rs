//! Friend list and new-friend watcher.

use anyhow::{Context, Result};
use chrono::Utc;
use riftkit::friends::fetch_friends;
use riftkit::storage::format_table;
use riftkit::{ChatFriend, FriendTracker};
use tracing::{info, warn};

use crate::app::App;
use crate::cli::FriendsAction;

pub fn run(app: &App, action: FriendsAction) -> Result<()> {
    match action {
        FriendsAction::List { recent } => list(app, recent),
        FriendsAction::Watch => watch(app),
    }
}

fn list(app: &App, recent_only: bool) -> Result<()> {
    let client = app.local_client();
    let tracker = FriendTracker::new(app.store());

    let fetched = fetch_friends(&client).context("Failed to fetch friends")?;
    let report = tracker.refresh(&fetched, Utc::now())?;

    let friends: Vec<_> = report
        .friends
        .into_iter()
        .filter(|f| !recent_only || f.recently_added)
        .collect();
    print!("{}", format_table(&friends));

    let recent = friends.iter().filter(|f| f.recently_added).count();
    println!("\n{} friends, {} added in the last week", friends.len(), recent);
    for name in &report.removed {
        println!("No longer on the list: {}", name);
    }
    Ok(())
}

fn watch(app: &App) -> Result<()> {
    let client = app.local_client();
    let tracker = FriendTracker::new(app.store());
    let poller = app.poller();
    let (shutdown, keyboard) = app.shutdown()?;
    let mut seen = app.load_seen("friends");

    println!(
        "Watching for new friends every {}s (Press Esc or q to quit)",
        poller.interval().as_secs()
    );

    let stats = poller.run(
        &mut seen,
        &shutdown,
        || {
            let fetched = fetch_friends(&client)?;
            // Keep first-seen times current; a storage error should not stop the watch.
            if let Err(e) = tracker.refresh(&fetched, Utc::now()) {
                warn!("Failed to update friend snapshot: {}", e);
            }
            Ok(fetched)
        },
        |added: &[&ChatFriend]| {
            for friend in added {
                println!("New friend: {}", friend.display_name());
            }
        },
    );

    app.finish(&shutdown, keyboard);
    app.save_seen("friends", &seen)?;

    let stats = stats.context("Friend watch stopped")?;
    info!(
        "Watch ended after {} polls ({} failed), {} new friends",
        stats.polls, stats.failures, stats.emitted
    );
    Ok(())
}
