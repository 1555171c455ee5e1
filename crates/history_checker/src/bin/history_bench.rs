use {
    anyhow::{bail, Context},
    clap::Parser,
    colorful::{Color, Colorful},
    history_checker::{
        bench::{history_files, run_file, BenchmarkStats, Outcome},
        CheckOptions, CheckResult, LinearizabilityChecker, LogFormat, ModelKind,
    },
    std::{path::PathBuf, time::Duration},
    tracing_subscriber::EnvFilter,
};

/// Checks every `*.csv` history in a directory and prints outcome counts and timing statistics.
#[derive(Parser)]
#[command(name = "history_bench", version)]
struct Cli {
    /// Directory containing the history CSV files.
    #[arg(long)]
    dir: PathBuf,

    /// Reference model to check against (kv or queue).
    #[arg(long)]
    model: ModelKind,

    /// Log schema (auto, paired or interleaved).
    #[arg(long, default_value_t = LogFormat::Auto)]
    format: LogFormat,

    /// Per-file search timeout in milliseconds. 0 searches until a verdict is reached.
    #[arg(long, env = "HISTORY_CHECKER_TIMEOUT_MS", default_value_t = 0)]
    timeout_ms: u64,
}

const RULE: &str = "============================================================";

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    let files = history_files(&cli.dir)
        .with_context(|| format!("could not list {}", cli.dir.display()))?;
    if files.is_empty() {
        bail!("no CSV files found in directory {}", cli.dir.display());
    }

    println!("{RULE}");
    println!("STARTING BENCHMARK");
    println!("{RULE}");
    println!("Directory:          {}", cli.dir.display());
    println!("Model:              {}", cli.model);
    println!("Number of Files:    {}", files.len());
    println!("{RULE}");

    let options = CheckOptions {
        format: cli.format,
        timeout: (cli.timeout_ms > 0).then(|| Duration::from_millis(cli.timeout_ms)),
        visualization: None,
    };
    let mut outcomes = Vec::with_capacity(files.len());
    for path in &files {
        let name = path.file_name().unwrap_or(path.as_os_str()).to_string_lossy();
        let outcome = run_file(cli.model, &LinearizabilityChecker, path, &options);
        let color = match &outcome.outcome {
            Outcome::Checked {
                result: CheckResult::Ok,
                ..
            } => Color::Green,
            Outcome::Checked {
                result: CheckResult::Illegal,
                ..
            }
            | Outcome::Failed { .. } => Color::Red,
            Outcome::Checked {
                result: CheckResult::Unknown,
                ..
            } => Color::Yellow,
        };
        println!("Processing {name}... {}", outcome.outcome.to_string().color(color));
        outcomes.push(outcome);
    }

    println!("\n{}\n", BenchmarkStats::from_outcomes(&outcomes));
    Ok(())
}
