use anyhow::{Context, Result};
use ledgerscan_ingest::{CorrectionRules, ParserOptions};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Picked up from the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "ledgerscan.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub parser: ParserSection,
    #[serde(default)]
    pub corrections: CorrectionRules,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParserSection {
    /// Year for `MM-DD` rows when a statement prints no statement date.
    #[serde(default)]
    pub fallback_year: Option<i32>,
    /// Insert `--- Page N ---` lines between form-feed separated pages.
    #[serde(default = "default_page_separators")]
    pub page_separators: bool,
}

fn default_page_separators() -> bool {
    true
}

impl Default for ParserSection {
    fn default() -> Self {
        Self {
            fallback_year: None,
            page_separators: default_page_separators(),
        }
    }
}

impl Config {
    /// `--year` beats the configured fallback year.
    pub fn parser_options(&self, year: Option<i32>) -> ParserOptions {
        ParserOptions {
            fallback_year: year.or(self.parser.fallback_year),
            corrections: self.corrections.clone(),
        }
    }
}

pub fn config_path(explicit: Option<&Path>) -> PathBuf {
    explicit
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
}

/// An explicit path must exist; the default file is optional.
pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    let p = config_path(explicit);
    if explicit.is_none() && !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    toml::from_str(&s).with_context(|| format!("parse {}", p.display()))
}

pub fn save_config(cfg: &Config, path: &Path) -> Result<()> {
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(path, s).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

pub fn init_config(explicit: Option<&Path>) -> Result<()> {
    let p = config_path(explicit);
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    save_config(&Config::default(), &p)?;
    println!("Wrote {}", p.display());
    Ok(())
}
