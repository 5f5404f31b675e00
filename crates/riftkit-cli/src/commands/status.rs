//! Presence commands.

use anyhow::{Context, Result};
use riftkit::status::{current_status, load_history, update_and_record};
use riftkit::storage::format_table;

use crate::app::App;
use crate::cli::StatusAction;

pub fn run(app: &App, action: StatusAction) -> Result<()> {
    match action {
        StatusAction::Show => {
            let me = current_status(&app.local_client()).context("Failed to read status")?;
            let label = me
                .availability()
                .map(|a| a.label())
                .unwrap_or(me.availability.as_str());
            println!("{}: {}", me.display_name(), label);
            if !me.status_message.is_empty() {
                println!("  \"{}\"", me.status_message);
            }
        }
        StatusAction::Set {
            availability,
            message,
        } => {
            let me = update_and_record(
                &app.local_client(),
                &app.store(),
                availability,
                message.as_deref(),
            )
            .context("Failed to update status")?;
            println!("Status set to {} for {}", availability.label(), me.display_name());
        }
        StatusAction::History { limit } => {
            let history = load_history(&app.store())?;
            if history.is_empty() {
                println!("No status changes recorded yet");
                return Ok(());
            }
            let start = history.len().saturating_sub(limit);
            print!("{}", format_table(&history[start..]));
        }
    }
    Ok(())
}
