//! The `drillbook init` command.

use anyhow::Result;

use drillbook_core::config::DrillConfig;

pub fn execute() -> Result<()> {
    if std::path::Path::new("drillbook.toml").exists() {
        println!("drillbook.toml already exists, skipping.");
    } else {
        let body = DrillConfig::default().to_toml_string()?;
        std::fs::write("drillbook.toml", format!("{CONFIG_HEADER}{body}"))?;
        println!("Created drillbook.toml");
    }

    std::fs::create_dir_all("tables")?;
    let example_path = std::path::Path::new("tables/example.toml");
    if example_path.exists() {
        println!("tables/example.toml already exists, skipping.");
    } else {
        std::fs::write(example_path, EXAMPLE_TABLES)?;
        println!("Created tables/example.toml");
    }

    println!("\nNext steps:");
    println!("  1. Run: drillbook validate --tables tables/example.toml");
    println!("  2. Run: drillbook tables --tables tables/example.toml");
    println!("  3. Run: drillbook arith --digits 2x1");

    Ok(())
}

const CONFIG_HEADER: &str = "# drillbook configuration
#
# tables = \"tables/example.toml\"
# report_dir = \"drill-reports\"

";

const EXAMPLE_TABLES: &str = r#"# Each table is asked in both directions.
# Templates may use {name}, {x} and {y}.

[[tables]]
name = "sq"
pairs = [[11, 121], [12, 144], [13, 169], [14, 196], [15, 225], [16, 256]]

[[tables]]
name = "log10"
pairs = [[2, 0.30], [3, 0.48], [5, 0.70], [7, 0.85]]
forward = "log10({x}) = ?"
inverse = "10^? = {y}"
"#;
