//! Replay listing, download and upload.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use riftkit::replay::{download, recent_matches, upload};
use riftkit::storage::format_table;
use riftkit::{LocalClient, MatchSummary, ShutdownSignal};
use tracing::{error, info};

use crate::app::App;
use crate::cli::ReplayAction;

/// Matches fetched per poll when watching.
const WATCH_WINDOW: usize = 5;

pub fn run(app: &App, action: ReplayAction) -> Result<()> {
    match action {
        ReplayAction::List { count } => {
            let matches =
                recent_matches(&app.local_client(), count).context("Failed to fetch match history")?;
            print!("{}", format_table(&matches));
            Ok(())
        }
        ReplayAction::Download { game_id, timeout } => {
            let (shutdown, keyboard) = app.shutdown()?;
            let result = download_one(
                &app.local_client(),
                game_id,
                Duration::from_secs(timeout),
                &shutdown,
            );
            app.finish(&shutdown, keyboard);
            result
        }
        ReplayAction::Upload {
            file,
            endpoint,
            token,
        } => upload_file(app, &file, &endpoint, token),
        ReplayAction::Watch { timeout } => watch(app, Duration::from_secs(timeout)),
    }
}

fn download_one(
    client: &LocalClient,
    game_id: u64,
    timeout: Duration,
    shutdown: &ShutdownSignal,
) -> Result<()> {
    eprintln!("Downloading replay for game {}...", game_id);
    let path = download(client, game_id, timeout, shutdown)
        .with_context(|| format!("Failed to download replay for game {}", game_id))?;
    println!("{}", path.display());
    Ok(())
}

fn upload_file(app: &App, file: &Path, endpoint: &str, token: Option<String>) -> Result<()> {
    let mut rest = app.rest_client(endpoint);
    if let Some(token) = token {
        rest = rest.with_token(token);
    }

    let status = upload(&rest, file).with_context(|| format!("Failed to upload {}", file.display()))?;
    if !(200..300).contains(&status) {
        bail!("Upload rejected with HTTP {}", status);
    }
    println!("Uploaded {} (HTTP {})", file.display(), status);
    Ok(())
}

fn watch(app: &App, timeout: Duration) -> Result<()> {
    let client = app.local_client();
    let poller = app.poller();
    let (shutdown, keyboard) = app.shutdown()?;
    let mut seen = app.load_seen("matches");

    println!(
        "Downloading replays of new matches, checking every {}s (Press Esc or q to quit)",
        poller.interval().as_secs()
    );

    let stats = poller.run(
        &mut seen,
        &shutdown,
        || recent_matches(&client, WATCH_WINDOW),
        |new: &[&MatchSummary]| {
            for game in new {
                info!("New match {} ({})", game.game_id, game.game_mode);
                if let Err(e) = download_one(&client, game.game_id, timeout, &shutdown) {
                    error!("{:#}", e);
                }
            }
        },
    );

    app.finish(&shutdown, keyboard);
    app.save_seen("matches", &seen)?;
    stats.context("Replay watch stopped")?;
    Ok(())
}
