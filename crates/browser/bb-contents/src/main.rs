//! bb-contents - Main Entry Point

use std::path::PathBuf;

use clap::Parser;

use bb_contents::Options;

#[derive(Parser)]
#[command(
    name = "bb-contents",
    about = "Apply declarative bb-* behaviors to a static HTML page",
    version
)]
struct Cli {
    /// HTML file to enhance (`-` reads stdin).
    input: PathBuf,

    /// Output file (defaults to stdout).
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Page URL used for sharing and relative links.
    #[arg(long)]
    url: Option<String>,

    /// Attribute prefix (default `bb-`).
    #[arg(long)]
    prefix: Option<String>,

    /// Video feed proxy endpoint.
    #[arg(long)]
    endpoint: Option<String>,

    /// Verbose pass summaries.
    #[arg(long)]
    debug: bool,
}

impl From<Cli> for Options {
    fn from(cli: Cli) -> Self {
        Self {
            input: cli.input,
            output: cli.output,
            config: cli.config,
            url: cli.url,
            prefix: cli.prefix,
            endpoint: cli.endpoint,
            debug: cli.debug,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.debug { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    bb_contents::run(&cli.into())
}
