use anyhow::Result;
use clap::error::ErrorKind;
use clap::{Arg, Command};
use std::path::PathBuf;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use danmaku_chart::{ChartProcessor, Config};

fn cli() -> Command {
    Command::new("danmaku-chart")
        .version("0.1.0")
        .author("TigreRoll")
        .about("Per-second danmaku density chart for a bilibili video")
        .arg(
            Arg::new("url")
                .value_name("URL")
                .help("Video page URL")
                .required(true)
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file (TOML)")
        )
        .arg(
            Arg::new("output-dir")
                .short('o')
                .long("output-dir")
                .value_name("DIR")
                .help("Directory for the generated <cid>.html")
        )
        .arg(
            Arg::new("timeout")
                .short('t')
                .long("timeout")
                .value_name("SECONDS")
                .help("Request timeout in seconds (default: wait forever)")
                .value_parser(clap::value_parser!(u64))
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging")
                .action(clap::ArgAction::SetTrue)
        )
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Usage errors exit with 1 like every other failure
    let matches = match cli().try_get_matches() {
        Ok(matches) => matches,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(e) => {
            e.print().ok();
            std::process::exit(1);
        }
    };

    let default_level = if matches.get_flag("verbose") { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    if let Err(e) = run(&matches).await {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

async fn run(matches: &clap::ArgMatches) -> Result<()> {
    let mut config = match matches.get_one::<String>("config") {
        Some(path) => Config::load_from(&PathBuf::from(path))?,
        None => Config::load()?,
    };

    if let Some(dir) = matches.get_one::<String>("output-dir") {
        config.output.dir = PathBuf::from(dir);
    }
    if let Some(timeout) = matches.get_one::<u64>("timeout") {
        config.http.timeout_seconds = Some(*timeout);
    }

    config.validate()?;
    debug!("{}", config.summary());

    let url = matches
        .get_one::<String>("url")
        .map(String::as_str)
        .unwrap_or_default();

    let processor = ChartProcessor::new(config)?;
    let report = processor.run(url).await?;

    info!("✅ {} comments charted into {}", report.total_in_chart, report.output_path.display());
    Ok(())
}
