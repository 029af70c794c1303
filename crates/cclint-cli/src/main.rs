//! `cclint` command-line interface.
//!
//! Exit codes: 0 when no errors were found, 1 when errors were found,
//! 2 on internal failure.

use std::fs;
use std::io::Write as _;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use cclint_diagnostics::Fixer;
use cclint_engine::{AnalysisEngine, Config};
use cclint_output::{OutputFormat, format_to_string};

#[derive(Debug, Parser)]
#[command(name = "cclint", version, about = "Customizable C++ static analyzer")]
struct Cli {
    /// Source files to analyze
    #[arg(value_name = "FILE", required = true)]
    files: Vec<String>,

    /// Configuration file (JSON)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Output format: text, json, or xml
    #[arg(long, default_value = "text")]
    format: String,

    /// Apply fix-it hints to the analyzed files
    #[arg(long)]
    fix: bool,

    /// Show what --fix would change without touching any file
    #[arg(long)]
    fix_preview: bool,

    /// Define a macro (NAME or NAME=VALUE); may be repeated
    #[arg(short = 'D', value_name = "NAME[=VALUE]")]
    define: Vec<String>,

    /// Undefine a macro; may be repeated
    #[arg(short = 'U', value_name = "NAME")]
    undef: Vec<String>,

    /// Add an include search path; may be repeated
    #[arg(short = 'I', value_name = "DIR")]
    include: Vec<String>,

    /// Stop after this many errors (0 = unlimited)
    #[arg(long, value_name = "N")]
    max_errors: Option<usize>,

    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Silence all logging
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli);

    match run(&cli) {
        Ok(has_errors) => {
            if has_errors {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(err) => {
            eprintln!("cclint: error: {err:#}");
            ExitCode::from(2)
        }
    }
}

fn init_logging(cli: &Cli) {
    let level = if cli.quiet {
        "off"
    } else {
        match cli.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

fn run(cli: &Cli) -> anyhow::Result<bool> {
    let format: OutputFormat = cli
        .format
        .parse()
        .map_err(|err: String| anyhow::anyhow!(err))?;

    let config = load_config(cli)?;
    debug!(?format, files = cli.files.len(), "starting analysis");

    let engine = AnalysisEngine::new(config);
    let results = engine.analyze_files(&cli.files);

    let diagnostics = engine.all_diagnostics();
    let rendered = format_to_string(format, &diagnostics);
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(rendered.as_bytes()).context("writing output")?;

    for result in &results {
        if !result.success {
            eprintln!("cclint: failed to analyze {}: {}", result.path, result.error_message);
        }
    }

    let stats = engine.stats();
    if stats.stopped_early {
        eprintln!(
            "cclint: stopped early after reaching max_errors ({})",
            engine.config().max_errors
        );
    }

    if cli.fix || cli.fix_preview {
        let fixer = Fixer::new(cli.fix_preview);
        let mut outcome = fixer.apply(&diagnostics);
        for err in &outcome.errors {
            eprintln!("cclint: fixer: {err}");
        }
        if cli.fix_preview {
            for (file, content) in &outcome.fixed {
                println!("--- fixed: {file} ---");
                print!("{content}");
            }
        } else {
            let written = fixer.write(&mut outcome);
            eprintln!("cclint: applied fixes to {written} file(s)");
        }
    }

    Ok(engine.has_errors())
}

fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading config file {}", path.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("parsing config file {}", path.display()))?
        }
        None => Config::default(),
    };

    // Command-line switches override the configuration file
    config.defines.extend(cli.define.iter().cloned());
    config.undefines.extend(cli.undef.iter().cloned());
    config.include_paths.extend(cli.include.iter().cloned());
    if let Some(max_errors) = cli.max_errors {
        config.max_errors = max_errors;
    }
    if cli.format != "text" {
        config.output_format = cli.format.clone();
    }

    Ok(config)
}
