//! Function tables for table-lookup questions.
//!
//! A [`FunctionTable`] maps sample inputs to outputs (`R2(4) = 2.0`). Tables
//! ask in both directions: forward prompts show `x` and expect `y`, inverse
//! prompts show `y` and expect `x`. The built-in catalog can be replaced by
//! a TOML file:
//!
//! ```toml
//! [[tables]]
//! name = "R2"
//! pairs = [[2, 1.41], [3, 1.74]]
//! forward = "sqrt({x}) = ?"      # optional
//! inverse = "sqrt(?) = {y}"      # optional
//! ```

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::model::Answer;

/// Default forward prompt.
pub const DEFAULT_FORWARD_TEMPLATE: &str = "{name}({x}) = ?";
/// Default inverse prompt.
pub const DEFAULT_INVERSE_TEMPLATE: &str = "{name}^-1({y}) = ?";

/// Which way a table is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Show `x`, expect `y`.
    Forward,
    /// Show `y`, expect `x`.
    Inverse,
}

/// A named set of `(x, y)` samples with optional prompt templates.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionTable {
    name: String,
    pairs: Vec<(Answer, Answer)>,
    forward_template: Option<String>,
    inverse_template: Option<String>,
}

impl FunctionTable {
    pub fn new(name: impl Into<String>, pairs: Vec<(Answer, Answer)>) -> Self {
        Self {
            name: name.into(),
            pairs,
            forward_template: None,
            inverse_template: None,
        }
    }

    /// Register custom templates. `{name}`, `{x}` and `{y}` are substituted.
    pub fn with_templates(mut self, forward: Option<String>, inverse: Option<String>) -> Self {
        self.forward_template = forward;
        self.inverse_template = inverse;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pairs(&self) -> &[(Answer, Answer)] {
        &self.pairs
    }

    pub fn forward_template(&self) -> &str {
        self.forward_template
            .as_deref()
            .unwrap_or(DEFAULT_FORWARD_TEMPLATE)
    }

    pub fn inverse_template(&self) -> &str {
        self.inverse_template
            .as_deref()
            .unwrap_or(DEFAULT_INVERSE_TEMPLATE)
    }

    /// Render the prompt for one pair and return it with its expected answer.
    pub fn ask(&self, pair: &(Answer, Answer), direction: Direction) -> (String, Answer) {
        let (x, y) = pair;
        match direction {
            Direction::Forward => (self.render(self.forward_template(), x, y), y.clone()),
            Direction::Inverse => (self.render(self.inverse_template(), x, y), x.clone()),
        }
    }

    fn render(&self, template: &str, x: &Answer, y: &Answer) -> String {
        template
            .replace("{name}", &self.name)
            .replace("{x}", &x.to_string())
            .replace("{y}", &y.to_string())
    }
}

/// An immutable set of function tables.
#[derive(Debug, Clone, PartialEq)]
pub struct TableCatalog {
    tables: Vec<FunctionTable>,
}

impl TableCatalog {
    pub fn new(tables: Vec<FunctionTable>) -> Self {
        Self { tables }
    }

    /// The standard tables: `alpha` and the square to fifth roots of 2..=9.
    pub fn builtin() -> Self {
        let alpha = [
            (-0.15, 1.13),
            (-0.05, 1.05),
            (0.05, 0.95),
            (0.15, 0.87),
            (0.25, 0.8),
            (0.35, 0.74),
            (0.45, 0.69),
            (0.55, 0.65),
            (0.65, 0.61),
            (0.75, 0.57),
            (0.85, 0.54),
            (0.95, 0.51),
        ];
        let roots: [(&str, [f64; 8]); 4] = [
            ("R2", [1.41, 1.74, 2.00, 2.24, 2.45, 2.65, 2.83, 3.00]),
            ("R3", [1.26, 1.44, 1.59, 1.70, 1.82, 1.91, 2.00, 2.08]),
            ("R4", [1.19, 1.32, 1.41, 1.50, 1.57, 1.63, 1.68, 1.73]),
            ("R5", [1.14, 1.24, 1.31, 1.37, 1.43, 1.48, 1.52, 1.55]),
        ];

        let mut tables = vec![FunctionTable::new(
            "alpha",
            alpha
                .iter()
                .map(|&(x, y)| (Answer::Float(x), Answer::Float(y)))
                .collect(),
        )];
        for (name, ys) in roots {
            let pairs = (2i64..)
                .zip(ys)
                .map(|(x, y)| (Answer::Integer(x), Answer::Float(y)))
                .collect();
            tables.push(FunctionTable::new(name, pairs));
        }

        Self { tables }
    }

    pub fn tables(&self) -> &[FunctionTable] {
        &self.tables
    }

    pub fn get(&self, name: &str) -> Option<&FunctionTable> {
        self.tables.iter().find(|t| t.name == name)
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Number of distinct prompts the catalog can produce.
    pub fn distinct_prompts(&self) -> usize {
        let mut prompts = HashSet::new();
        for table in &self.tables {
            for pair in &table.pairs {
                prompts.insert(table.ask(pair, Direction::Forward).0);
                prompts.insert(table.ask(pair, Direction::Inverse).0);
            }
        }
        prompts.len()
    }
}

impl Default for TableCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Intermediate TOML structure for catalog files.
#[derive(Debug, Deserialize)]
struct TomlCatalogFile {
    #[serde(default)]
    tables: Vec<TomlTable>,
}

#[derive(Debug, Deserialize)]
struct TomlTable {
    name: String,
    #[serde(default)]
    pairs: Vec<(Answer, Answer)>,
    #[serde(default)]
    forward: Option<String>,
    #[serde(default)]
    inverse: Option<String>,
}

/// Load a catalog from a TOML file.
pub fn parse_catalog(path: &Path) -> Result<TableCatalog> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read table file: {}", path.display()))?;

    parse_catalog_str(&content, path)
}

/// Parse catalog TOML from a string (useful for testing).
pub fn parse_catalog_str(content: &str, source_path: &Path) -> Result<TableCatalog> {
    let parsed: TomlCatalogFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let tables = parsed
        .tables
        .into_iter()
        .map(|t| FunctionTable::new(t.name, t.pairs).with_templates(t.forward, t.inverse))
        .collect();

    Ok(TableCatalog::new(tables))
}

/// A warning from catalog validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The table name (if applicable).
    pub table: Option<String>,
    /// Warning message.
    pub message: String,
}

/// Check a catalog for problems that would make quizzes misbehave.
pub fn validate_catalog(catalog: &TableCatalog) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();
    let warn = |table: &FunctionTable, message: String| ValidationWarning {
        table: Some(table.name.clone()),
        message,
    };

    if catalog.is_empty() {
        warnings.push(ValidationWarning {
            table: None,
            message: "catalog defines no tables".into(),
        });
    }

    let mut seen_names = HashSet::new();
    for table in catalog.tables() {
        if !seen_names.insert(table.name()) {
            warnings.push(warn(table, format!("duplicate table name: {}", table.name)));
        }

        if table.pairs.is_empty() {
            warnings.push(warn(table, "table has no pairs".into()));
        }

        if !table.forward_template().contains("{x}") {
            warnings.push(warn(table, "forward template does not show {x}".into()));
        }
        if table.forward_template().contains("{y}") {
            warnings.push(warn(table, "forward template reveals the answer {y}".into()));
        }
        if !table.inverse_template().contains("{y}") {
            warnings.push(warn(table, "inverse template does not show {y}".into()));
        }
        if table.inverse_template().contains("{x}") {
            warnings.push(warn(table, "inverse template reveals the answer {x}".into()));
        }

        // Repeated inputs give one prompt two different answers.
        let mut xs = HashSet::new();
        let mut ys = HashSet::new();
        for (x, y) in &table.pairs {
            if !xs.insert(x.to_string()) {
                warnings.push(warn(table, format!("duplicate x value: {x}")));
            }
            if !ys.insert(y.to_string()) {
                warnings.push(warn(table, format!("duplicate y value: {y}")));
            }
        }
    }

    warnings
}
