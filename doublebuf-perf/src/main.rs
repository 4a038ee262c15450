use std::path::PathBuf;

use tracing::{error, info, warn};

mod config;
mod runner;

#[derive(clap::Parser)]
struct Args {
    config: PathBuf,
    /// write the reports of all runs to this file as JSON
    #[clap(long, short)]
    output: Option<PathBuf>,
    #[clap(flatten)]
    verbose: clap_verbosity_flag::Verbosity<clap_verbosity_flag::InfoLevel>,
}

fn main() -> eyre::Result<()> {
    color_eyre::install()?;

    let args: Args = clap::Parser::parse();

    tracing_subscriber::fmt()
        .with_max_level(args.verbose.tracing_level_filter())
        .init();

    let config = std::fs::read(&args.config)?;
    let config = config::parse(&config)?;

    if config::total_updates(&config)? == 0 {
        error!("Tried to create a perf test with no updates");
        return Ok(());
    }

    let mut reports = Vec::with_capacity(config.len());

    for entry in &config {
        if entry.updates == 0 {
            continue;
        }

        let report = runner::run(entry)?;

        info!(
            time = report.elapsed_secs,
            updates = report.updates,
            update_attempts = report.update_attempts,
            swaps = report.swaps,
            swap_attempts = report.swap_attempts,
            "{} ({:?})",
            report.name,
            report.backend,
        );

        if report.torn_reads != 0 {
            warn!(torn_reads = report.torn_reads, "{} observed torn buffers", report.name);
        }

        reports.push(report);
    }

    if let Some(output) = args.output {
        std::fs::write(&output, serde_json::to_vec_pretty(&reports)?)?;
        info!(path = %output.display(), "wrote reports");
    }

    let torn_reads: u64 = reports.iter().map(|report| report.torn_reads).sum();
    if torn_reads != 0 {
        eyre::bail!("{torn_reads} torn reads detected");
    }

    Ok(())
}
