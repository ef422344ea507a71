//! The `drillbook notes` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use drillbook_core::config::Quiz;
use drillbook_core::persistence::JsonFileBlobStore;
use drillbook_core::store::RecordStore;
use drillbook_core::validator::round_to;

use super::drill;
use crate::SessionArgs;

pub fn execute(
    notes: Option<PathBuf>,
    config: Option<PathBuf>,
    arith: bool,
    clear: bool,
) -> Result<()> {
    let quiz = if arith { Quiz::Arithmetic } else { Quiz::Tables };
    let config = drill::resolve_config(
        &SessionArgs {
            notes,
            config,
            ..Default::default()
        },
        quiz,
    )?;
    let notes_path = config.notes_path_for(quiz);
    let blobs = JsonFileBlobStore::new(notes_path);
    let mut store = RecordStore::load_with_limits(&blobs, config.capacity, config.timeout_secs);

    if clear {
        let removed = store.len();
        store.clear();
        store.save(&blobs)?;
        println!("Cleared {removed} record(s) from {}", notes_path.display());
        return Ok(());
    }

    if store.is_empty() {
        println!("No stored records in {}", notes_path.display());
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Kind", "Question", "Correct", "Your answer", "Time"]);
    for record in store.errors().chain(store.timeouts()) {
        table.add_row(vec![
            Cell::new(record.provenance()),
            Cell::new(&record.question),
            Cell::new(&record.correct),
            Cell::new(&record.user),
            Cell::new(format!("{:.1}s", round_to(record.elapsed_secs, 1))),
        ]);
    }

    println!("{table}");
    println!(
        "{} error(s), {} timeout(s) in {}",
        store.errors().len(),
        store.timeouts().len(),
        notes_path.display()
    );
    Ok(())
}
