use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use clap::Parser;

use analyzer::conf::AnalyzerConfig;
use analyzer::parser::FormatHint;
use analyzer::runtime::{analyze, boot, init_logging};

/// Parse mixed-format log files and print a JSON report.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log files to analyze
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// TOML config file (defaults to $ANALYZER_CONFIG_FILE or ./analyzer.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Skip detection: auto, syslog, nginx_access, nginx_error, app
    #[arg(short, long)]
    format: Option<FormatHint>,

    /// Entries per ranked list
    #[arg(short = 'n', long = "top")]
    top: Option<usize>,

    /// Stop after this many lines in total
    #[arg(long)]
    max_lines: Option<u64>,

    /// Lower time bound: RFC 3339, YYYY-MM-DD[ HH:MM:SS] or relative (24h, 7d)
    #[arg(long)]
    from: Option<String>,

    /// Upper time bound (exclusive), same forms as --from
    #[arg(long)]
    to: Option<String>,

    /// Year assumed for syslog timestamps
    #[arg(long)]
    year: Option<i32>,

    /// Analyze files one after another
    #[arg(long)]
    sequential: bool,

    /// Pretty-print the JSON report
    #[arg(long)]
    pretty: bool,

    /// Print only the summary, findings and any input errors
    #[arg(long)]
    summary_only: bool,
}

impl Cli {
    fn apply(&self, config: &mut AnalyzerConfig) {
        if let Some(format) = self.format {
            config.format = format;
        }
        if let Some(top) = self.top {
            config.top_n = top;
        }
        if let Some(max_lines) = self.max_lines {
            config.max_lines = Some(max_lines);
        }
        if let Some(from) = &self.from {
            config.from = Some(from.clone());
        }
        if let Some(to) = &self.to {
            config.to = Some(to.clone());
        }
        if let Some(year) = self.year {
            config.syslog_year = Some(year);
        }
        if self.sequential {
            config.parallel = false;
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => AnalyzerConfig::load_from(path)?,
        None => AnalyzerConfig::load()?,
    };
    cli.apply(&mut config);

    let analysis = Arc::new(boot(config, Utc::now())?);
    let outcome = analyze(analysis, cli.files.clone()).await;

    let output = if cli.summary_only {
        outcome.summary_payload()
    } else {
        serde_json::to_value(&outcome)?
    };
    let json = if cli.pretty {
        serde_json::to_string_pretty(&output)?
    } else {
        serde_json::to_string(&output)?
    };
    println!("{}", json);
    Ok(())
}
