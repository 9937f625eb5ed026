use anyhow::{Context, Result};
use clap::ValueEnum;
use ledgerscan_core::BankStatement;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Summary,
    Json,
    Csv,
}

pub fn render(statement: &BankStatement, format: OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Summary => statement.to_summary_text(),
        OutputFormat::Json => statement.to_json().context("render json")?,
        OutputFormat::Csv => statement.to_csv().context("render csv")?,
    })
}

/// Output file prefix: the input's file stem.
pub fn base_name(input: &Path) -> String {
    input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "statement".to_string())
}

/// Write `<base>.json`, `<base>_transactions.csv`, `<base>_summary.txt` and
/// `<base>_corrected.txt` into `dir`.
pub fn write_outputs(dir: &Path, base: &str, statement: &BankStatement, corrected: &str) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;

    let files = [
        (format!("{base}.json"), render(statement, OutputFormat::Json)?),
        (format!("{base}_transactions.csv"), render(statement, OutputFormat::Csv)?),
        (format!("{base}_summary.txt"), render(statement, OutputFormat::Summary)?),
        (format!("{base}_corrected.txt"), corrected.to_string()),
    ];

    let mut written = Vec::with_capacity(files.len());
    for (name, contents) in files {
        let path = dir.join(name);
        fs::write(&path, contents).with_context(|| format!("write {}", path.display()))?;
        written.push(path);
    }
    Ok(written)
}
