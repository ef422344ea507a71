//! The `drillbook validate` command.

use std::path::PathBuf;

use anyhow::Result;

use drillbook_core::catalog::{parse_catalog, validate_catalog};

pub fn execute(path: PathBuf) -> Result<()> {
    let catalog = parse_catalog(&path)?;
    println!(
        "Catalog: {} ({} tables, {} questions)",
        path.display(),
        catalog.len(),
        catalog.distinct_prompts()
    );

    let warnings = validate_catalog(&catalog);
    for w in &warnings {
        let prefix = w
            .table
            .as_ref()
            .map(|name| format!("  [{name}]"))
            .unwrap_or_else(|| "  ".to_string());
        println!("{prefix} WARNING: {}", w.message);
    }

    if warnings.is_empty() {
        println!("All tables valid.");
    } else {
        println!("\n{} warning(s) found.", warnings.len());
    }

    Ok(())
}
