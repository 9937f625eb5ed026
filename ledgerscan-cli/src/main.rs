use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use ledgerscan_ingest::{CorrectionStats, StatementParser};
use log::{info, warn};
use std::path::{Path, PathBuf};

mod config;
mod input;
mod output;

use config::Config;
use output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "ledgerscan", version, about = "Turn bank statement text into structured transactions")]
struct Cli {
    /// Debug logging (RUST_LOG still wins when set)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (defaults to ./ledgerscan.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse extracted statement text into a statement with transactions
    Parse {
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Printed format when --output is not given
        #[arg(long, value_enum, default_value_t = OutputFormat::Summary)]
        format: OutputFormat,

        /// Write json, csv, summary and corrected text per input into this directory
        #[arg(long)]
        output: Option<PathBuf>,

        /// Year for MM-DD rows when the statement has no statement date
        #[arg(long)]
        year: Option<i32>,
    },

    /// Print OCR-corrected text
    Normalize {
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Print correction statistics to stderr
        #[arg(long)]
        stats: bool,
    },

    /// Write a default config file
    InitConfig,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::InitConfig => {
            config::init_config(cli.config.as_deref())?;
        }

        Command::Parse {
            files,
            format,
            output: out_dir,
            year,
        } => {
            let cfg = config::load_config(cli.config.as_deref())?;
            let parser = StatementParser::with_options(&cfg.parser_options(year))
                .context("build parser from config")?;

            let mut failed = 0;
            for file in &files {
                if let Err(err) = parse_file(&parser, &cfg, file, format, out_dir.as_deref()) {
                    eprintln!("{}: {err:#}", file.display());
                    failed += 1;
                }
            }
            if failed > 0 {
                bail!("{failed} of {} files failed", files.len());
            }
        }

        Command::Normalize { files, stats } => {
            let cfg = config::load_config(cli.config.as_deref())?;
            let parser = StatementParser::with_options(&cfg.parser_options(None))
                .context("build parser from config")?;

            for file in &files {
                let raw = input::read_statement_text(file, cfg.parser.page_separators)?;
                let corrected = parser.normalize(&raw);
                print!("{corrected}");

                if stats {
                    let s = CorrectionStats::between(&raw, &corrected);
                    eprintln!(
                        "{}: {} of {} words changed, {} -> {} chars",
                        file.display(),
                        s.words_changed,
                        s.total_words,
                        s.original_length,
                        s.corrected_length
                    );
                }
            }
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();
}

fn parse_file(
    parser: &StatementParser,
    cfg: &Config,
    file: &Path,
    format: OutputFormat,
    out_dir: Option<&Path>,
) -> Result<()> {
    let raw = input::read_statement_text(file, cfg.parser.page_separators)?;
    let corrected = parser.normalize(&raw);
    let (statement, strategy) = parser
        .parse_with_strategy(&corrected)
        .with_context(|| format!("parse {}", file.display()))?;

    info!(
        "{}: {} transactions via {strategy}",
        file.display(),
        statement.transactions.len()
    );
    if !statement.validate() {
        let report = statement.balance_report();
        warn!(
            "{}: balances do not reconcile (expected {}, found {})",
            file.display(),
            report.expected_ending,
            report.actual_ending
        );
    }

    match out_dir {
        Some(dir) => {
            let base = output::base_name(file);
            for path in output::write_outputs(dir, &base, &statement, &corrected)? {
                println!("Wrote {}", path.display());
            }
        }
        None => println!("{}", output::render(&statement, format)?.trim_end()),
    }
    Ok(())
}
