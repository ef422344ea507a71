//! User configuration: `drillbook.toml` plus environment overrides.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::generator::{ARITHMETIC_REPLAY_PROBABILITY, TABLE_REPLAY_PROBABILITY};
use crate::session::DEFAULT_BATCH_SIZE;
use crate::store::{DEFAULT_CAPACITY, DEFAULT_TIMEOUT_SECS};
use crate::validator::DEFAULT_ROUND_LEVEL;

/// Largest accepted `round_level`.
pub const MAX_ROUND_LEVEL: u32 = 8;

/// The quiz variants, each with its own record file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quiz {
    Tables,
    Arithmetic,
}

/// Top-level drillbook configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DrillConfig {
    /// Error and timeout records of the table quiz.
    #[serde(default = "default_notes_path")]
    pub notes_path: PathBuf,
    /// Error and timeout records of the arithmetic quiz.
    #[serde(default = "default_arith_notes_path")]
    pub arith_notes_path: PathBuf,
    /// Decimal places used when comparing numeric answers.
    #[serde(default = "default_round_level")]
    pub round_level: u32,
    /// Answers slower than this many seconds are recorded as timeouts.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: f64,
    /// Records kept per collection.
    #[serde(default = "default_capacity")]
    pub capacity: usize,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_table_replay")]
    pub table_replay_probability: f64,
    #[serde(default = "default_arithmetic_replay")]
    pub arithmetic_replay_probability: f64,
    /// Custom table catalog replacing the built-in tables.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tables: Option<PathBuf>,
    /// Directory for per-session JSON reports. No reports when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_dir: Option<PathBuf>,
}

fn default_notes_path() -> PathBuf {
    PathBuf::from("note.json")
}
fn default_arith_notes_path() -> PathBuf {
    PathBuf::from("arith-note.json")
}
fn default_round_level() -> u32 {
    DEFAULT_ROUND_LEVEL
}
fn default_timeout_secs() -> f64 {
    DEFAULT_TIMEOUT_SECS
}
fn default_capacity() -> usize {
    DEFAULT_CAPACITY
}
fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}
fn default_table_replay() -> f64 {
    TABLE_REPLAY_PROBABILITY
}
fn default_arithmetic_replay() -> f64 {
    ARITHMETIC_REPLAY_PROBABILITY
}

impl Default for DrillConfig {
    fn default() -> Self {
        Self {
            notes_path: default_notes_path(),
            arith_notes_path: default_arith_notes_path(),
            round_level: default_round_level(),
            timeout_secs: default_timeout_secs(),
            capacity: default_capacity(),
            batch_size: default_batch_size(),
            table_replay_probability: default_table_replay(),
            arithmetic_replay_probability: default_arithmetic_replay(),
            tables: None,
            report_dir: None,
        }
    }
}

impl DrillConfig {
    /// Record file of one quiz variant.
    pub fn notes_path_for(&self, quiz: Quiz) -> &Path {
        match quiz {
            Quiz::Tables => &self.notes_path,
            Quiz::Arithmetic => &self.arith_notes_path,
        }
    }

    pub fn set_notes_path(&mut self, quiz: Quiz, path: PathBuf) {
        match quiz {
            Quiz::Tables => self.notes_path = path,
            Quiz::Arithmetic => self.arith_notes_path = path,
        }
    }

    /// Parse a config from TOML text. `source` is only used in messages.
    pub fn from_toml_str(content: &str, source: &Path) -> Result<Self> {
        let config: DrillConfig = toml::from_str(content)
            .with_context(|| format!("failed to parse config: {}", source.display()))?;
        Ok(config)
    }

    /// Reject values the rest of the system cannot work with.
    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            self.round_level <= MAX_ROUND_LEVEL,
            "round_level must be between 0 and {MAX_ROUND_LEVEL}, got {}",
            self.round_level
        );
        anyhow::ensure!(
            self.timeout_secs.is_finite() && self.timeout_secs >= 0.0,
            "timeout_secs must be a non-negative number, got {}",
            self.timeout_secs
        );
        anyhow::ensure!(
            self.notes_path != self.arith_notes_path,
            "notes_path and arith_notes_path must name different files, both are {}",
            self.notes_path.display()
        );
        anyhow::ensure!(self.capacity >= 1, "capacity must be at least 1");
        anyhow::ensure!(self.batch_size >= 1, "batch_size must be at least 1");
        for (key, p) in [
            ("table_replay_probability", self.table_replay_probability),
            ("arithmetic_replay_probability", self.arithmetic_replay_probability),
        ] {
            anyhow::ensure!(
                (0.0..=1.0).contains(&p),
                "{key} must be between 0.0 and 1.0, got {p}"
            );
        }
        Ok(())
    }

    /// Apply `DRILLBOOK_NOTES`, `DRILLBOOK_ARITH_NOTES` and `DRILLBOOK_ROUND_LEVEL`.
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_overrides(
            std::env::var("DRILLBOOK_NOTES").ok(),
            std::env::var("DRILLBOOK_ARITH_NOTES").ok(),
            std::env::var("DRILLBOOK_ROUND_LEVEL").ok(),
        )
    }

    fn apply_overrides(
        &mut self,
        notes: Option<String>,
        arith_notes: Option<String>,
        round_level: Option<String>,
    ) -> Result<()> {
        if let Some(notes) = notes.filter(|n| !n.trim().is_empty()) {
            self.notes_path = PathBuf::from(notes);
        }
        if let Some(notes) = arith_notes.filter(|n| !n.trim().is_empty()) {
            self.arith_notes_path = PathBuf::from(notes);
        }
        if let Some(level) = round_level {
            self.round_level = level
                .trim()
                .parse()
                .with_context(|| format!("DRILLBOOK_ROUND_LEVEL is not a number: '{level}'"))?;
        }
        Ok(())
    }

    /// Render as TOML, for `drillbook init`.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).context("failed to serialize config")
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `drillbook.toml` in the current directory
/// 2. `~/.config/drillbook/config.toml`
///
/// Environment variable overrides: `DRILLBOOK_NOTES`, `DRILLBOOK_ARITH_NOTES`,
/// `DRILLBOOK_ROUND_LEVEL`.
pub fn load_config() -> Result<DrillConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<DrillConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("drillbook.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            tracing::debug!(path = %path.display(), "loading config");
            DrillConfig::from_toml_str(&content, &path)?
        }
        None => DrillConfig::default(),
    };

    config.apply_env()?;
    config.validate()?;
    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("drillbook"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = DrillConfig::default();
        assert_eq!(config.notes_path, PathBuf::from("note.json"));
        assert_eq!(config.arith_notes_path, PathBuf::from("arith-note.json"));
        assert_eq!(config.round_level, 2);
        assert_eq!(config.timeout_secs, 20.0);
        assert_eq!(config.capacity, 20);
        assert_eq!(config.batch_size, 10);
        assert_eq!(config.table_replay_probability, 0.6);
        assert_eq!(config.arithmetic_replay_probability, 0.5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let toml_str = r#"
notes_path = "drill/notes.json"
round_level = 3
report_dir = "reports"
"#;
        let config = DrillConfig::from_toml_str(toml_str, Path::new("drillbook.toml")).unwrap();
        assert_eq!(config.notes_path, PathBuf::from("drill/notes.json"));
        assert_eq!(config.round_level, 3);
        assert_eq!(config.report_dir, Some(PathBuf::from("reports")));
        assert_eq!(config.capacity, 20);
        assert_eq!(config.tables, None);
    }

    #[test]
    fn unknown_key_is_an_error() {
        let err = DrillConfig::from_toml_str("notes = \"x.json\"", Path::new("drillbook.toml"))
            .unwrap_err();
        assert!(format!("{err:#}").contains("drillbook.toml"));
    }

    #[test]
    fn invalid_values_are_rejected() {
        let cases = [
            DrillConfig {
                round_level: 9,
                ..Default::default()
            },
            DrillConfig {
                timeout_secs: -1.0,
                ..Default::default()
            },
            DrillConfig {
                capacity: 0,
                ..Default::default()
            },
            DrillConfig {
                arith_notes_path: PathBuf::from("note.json"),
                ..Default::default()
            },
            DrillConfig {
                batch_size: 0,
                ..Default::default()
            },
            DrillConfig {
                table_replay_probability: 1.5,
                ..Default::default()
            },
            DrillConfig {
                arithmetic_replay_probability: -0.1,
                ..Default::default()
            },
        ];
        for config in cases {
            assert!(config.validate().is_err(), "{config:?}");
        }
    }

    #[test]
    fn overrides_replace_file_values() {
        let mut config = DrillConfig::default();
        config
            .apply_overrides(Some("other.json".into()), None, Some(" 4 ".into()))
            .unwrap();
        assert_eq!(config.notes_path, PathBuf::from("other.json"));
        assert_eq!(config.arith_notes_path, PathBuf::from("arith-note.json"));
        assert_eq!(config.round_level, 4);

        let mut config = DrillConfig::default();
        config
            .apply_overrides(Some("  ".into()), Some("mul.json".into()), None)
            .unwrap();
        assert_eq!(config.notes_path, PathBuf::from("note.json"));
        assert_eq!(config.arith_notes_path, PathBuf::from("mul.json"));

        assert!(config.apply_overrides(None, None, Some("two".into())).is_err());
    }

    #[test]
    fn quiz_variants_keep_separate_records() {
        let mut config = DrillConfig::default();
        assert_ne!(
            config.notes_path_for(Quiz::Tables),
            config.notes_path_for(Quiz::Arithmetic)
        );

        config.set_notes_path(Quiz::Arithmetic, PathBuf::from("x.json"));
        assert_eq!(config.notes_path_for(Quiz::Arithmetic), Path::new("x.json"));
        assert_eq!(config.notes_path_for(Quiz::Tables), Path::new("note.json"));
    }

    #[test]
    fn explicit_missing_path_is_an_error() {
        let err = load_config_from(Some(Path::new("/nonexistent/drillbook.toml"))).unwrap_err();
        assert!(err.to_string().contains("config file not found"));
    }

    #[test]
    fn explicit_path_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "batch_size = 5\ncapacity = 7\n").unwrap();
        let config = load_config_from(Some(&path)).unwrap();
        assert_eq!(config.batch_size, 5);
        assert_eq!(config.capacity, 7);
    }

    #[test]
    fn init_output_parses_back() {
        let rendered = DrillConfig::default().to_toml_string().unwrap();
        let parsed = DrillConfig::from_toml_str(&rendered, Path::new("init")).unwrap();
        assert_eq!(parsed, DrillConfig::default());
    }
}
