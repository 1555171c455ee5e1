use {
    anyhow::Context,
    clap::Parser,
    colorful::{Color, Colorful},
    history_checker::{
        check_file_as, CheckOptions, CheckResult, LinearizabilityChecker, LogFormat, ModelKind,
    },
    std::{path::PathBuf, process::ExitCode, time::Duration},
    tracing::info,
    tracing_subscriber::EnvFilter,
};

/// Checks one recorded history for linearizability and writes an HTML visualization of the
/// result. Exits with 0 if linearizable, 2 if not, 3 if the search timed out.
#[derive(Parser)]
#[command(name = "history_checker", version)]
struct Cli {
    /// Path to the history CSV file.
    #[arg(long)]
    input: PathBuf,

    /// Path for the HTML visualization, written even when the history is linearizable.
    #[arg(long)]
    output: PathBuf,

    /// Reference model to check against (kv or queue).
    #[arg(long)]
    model: ModelKind,

    /// Log schema (auto, paired or interleaved).
    #[arg(long, default_value_t = LogFormat::Auto)]
    format: LogFormat,

    /// Search timeout in milliseconds. 0 searches until a verdict is reached.
    #[arg(long, env = "HISTORY_CHECKER_TIMEOUT_MS", default_value_t = 0)]
    timeout_ms: u64,
}

fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    let options = CheckOptions {
        format: cli.format,
        timeout: (cli.timeout_ms > 0).then(|| Duration::from_millis(cli.timeout_ms)),
        visualization: Some(cli.output.clone()),
    };
    let report = check_file_as(cli.model, &LinearizabilityChecker, &cli.input, &options)
        .with_context(|| format!("could not check {}", cli.input.display()))?;
    info!(
        operations = report.operations,
        warnings = report.warnings.len(),
        discarded = report.discarded,
        elapsed = ?report.elapsed,
        "Checked history."
    );

    let verdict = format!("Linearizable? {}", report.result == CheckResult::Ok);
    let (color, code) = match report.result {
        CheckResult::Ok => (Color::Green, 0),
        CheckResult::Illegal => (Color::Red, 2),
        CheckResult::Unknown => (Color::Yellow, 3),
    };
    println!("{} ({})", verdict.color(color), report.result);
    println!(
        "Wrote visualization to {} (open it in a browser)",
        cli.output.display()
    );
    Ok(ExitCode::from(code))
}
