//! The `drillbook tables` command.

use std::path::PathBuf;

use anyhow::Result;

use drillbook_core::catalog::{parse_catalog, validate_catalog, TableCatalog};
use drillbook_core::config::Quiz;
use drillbook_core::generator::{QuestionGenerator, TableQuiz};

use super::drill;
use crate::SessionArgs;

pub fn execute(tables: Option<PathBuf>, args: SessionArgs) -> Result<()> {
    let config = drill::resolve_config(&args, Quiz::Tables)?;

    let (catalog, detail) = match tables.or_else(|| config.tables.clone()) {
        Some(path) => {
            let catalog = parse_catalog(&path)?;
            for w in validate_catalog(&catalog) {
                tracing::warn!(table = ?w.table, "{}", w.message);
            }
            (catalog, path.display().to_string())
        }
        None => (TableCatalog::builtin(), "built-in".to_string()),
    };

    let names: Vec<&str> = catalog.tables().iter().map(|t| t.name()).collect();
    println!("Tables: {}", names.join(", "));

    let generator = QuestionGenerator::new(Box::new(TableQuiz::new(&catalog)?))
        .with_replay_probability(config.table_replay_probability)?;

    drill::run_session(generator, detail, &config, Quiz::Tables, args.seed)
}
