//! Ranked stats.

use anyhow::{Context, Result};
use chrono::Utc;
use riftkit::RankedSnapshot;
use riftkit::ranked::{HISTORY_SNAPSHOT, fetch_ranked, lp_delta, record_snapshot};
use riftkit::storage::format_table;

use crate::app::App;

pub fn run(app: &App, record: bool) -> Result<()> {
    let queues = fetch_ranked(&app.local_client()).context("Failed to fetch ranked stats")?;
    if queues.is_empty() {
        println!("No ranked queues reported");
        return Ok(());
    }
    print!("{}", format_table(&queues));

    let store = app.store();
    let history: Vec<RankedSnapshot> = store.load_or_default(HISTORY_SNAPSHOT)?;
    if let Some(previous) = history.last() {
        let deltas = lp_delta(previous, &queues);
        if !deltas.is_empty() {
            println!("\nSince {}:", previous.taken_at.format("%Y-%m-%d %H:%M"));
            for (queue, delta) in deltas {
                println!("  {}: {:+} LP", queue, delta);
            }
        }
    }

    if record {
        let history = record_snapshot(&store, &queues, Utc::now())?;
        eprintln!("Recorded snapshot ({} in history)", history.len());
    }
    Ok(())
}
