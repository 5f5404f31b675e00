//! Inventory listing and export.

use std::path::Path;

use anyhow::{Context, Result};
use riftkit::loot::{fetch_loot, filter_by_type, sort_items, total_disenchant};
use riftkit::storage::{export_to_path, format_table};
use riftkit::{LootItem, LootSort};

use crate::app::App;
use crate::cli::LootAction;

pub fn run(app: &App, action: LootAction) -> Result<()> {
    match action {
        LootAction::List { item_type, sort } => {
            let items = load(app, item_type.as_deref(), sort)?;
            print!("{}", format_table(&items));
            println!(
                "\n{} items, {} essence if everything is disenchanted",
                items.len(),
                total_disenchant(&items)
            );
        }
        LootAction::Export { output, item_type } => {
            let items = load(app, item_type.as_deref(), LootSort::Name)?;
            export(&output, &items)?;
        }
    }
    Ok(())
}

fn load(app: &App, item_type: Option<&str>, sort: LootSort) -> Result<Vec<LootItem>> {
    let mut items = fetch_loot(&app.local_client()).context("Failed to fetch loot")?;
    if let Some(t) = item_type {
        items = filter_by_type(items, t);
    }
    sort_items(&mut items, sort);
    Ok(items)
}

fn export(output: &Path, items: &[LootItem]) -> Result<()> {
    export_to_path(output, items)
        .with_context(|| format!("Failed to export to {}", output.display()))?;
    eprintln!("Exported {} items to {}", items.len(), output.display());
    Ok(())
}
