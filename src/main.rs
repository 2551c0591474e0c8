use std::io::Write;

use clap::Parser;
use junit_annotator::constants::LOG_FILTER_ENV;
use junit_annotator::error_report::ErrorReport;
use junit_annotator::runner::{run_annotate, AnnotateArgs};

#[derive(Debug, Parser)]
#[command(
    version = std::env!("CARGO_PKG_VERSION"),
    name = "junit-annotator",
    about = "Adds testsuites properties and test case ids to JUnit XML reports"
)]
struct Cli {
    #[command(flatten)]
    annotate_args: AnnotateArgs,
}

fn main() -> anyhow::Result<()> {
    setup_logger()?;
    let cli = Cli::parse();
    log::debug!(
        "Starting junit-annotator {} with {:?}",
        env!("CARGO_PKG_VERSION"),
        cli
    );
    match run_annotate(cli.annotate_args) {
        Ok(exit_code) => std::process::exit(exit_code),
        Err(e) => std::process::exit(ErrorReport::new(e).exit_code),
    }
}

fn setup_logger() -> anyhow::Result<()> {
    let mut builder = env_logger::Builder::new();
    builder
        .format(|buf, record| {
            writeln!(
                buf,
                "{} [{}] - {}",
                chrono::Local::now().format("%Y-%m-%dT%H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .filter(None, log::LevelFilter::Info);
    if let Ok(log) = std::env::var(LOG_FILTER_ENV) {
        builder.parse_filters(&log);
    }
    builder.init();
    Ok(())
}
