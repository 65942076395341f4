//! bb-contents host
//!
//! Loads a page, runs the built-in behaviors on it in virtual time and
//! writes the enhanced HTML back out.

use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use bb_core::{Config, Coordinator};

/// Where the page comes from and what overrides apply
#[derive(Debug, Clone, Default)]
pub struct Options {
    /// HTML file, or `-` for stdin
    pub input: PathBuf,
    /// Output file; stdout when absent
    pub output: Option<PathBuf>,
    /// TOML configuration file
    pub config: Option<PathBuf>,
    /// Page URL; defaults to the input's `file://` URL
    pub url: Option<String>,
    pub prefix: Option<String>,
    pub endpoint: Option<String>,
    pub debug: bool,
}

impl Options {
    fn reads_stdin(&self) -> bool {
        self.input.as_os_str() == "-"
    }

    /// Configuration file merged with command-line overrides
    pub fn load_config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::load(path).with_context(|| format!("Loading config {}", path.display()))?,
            None => Config::default(),
        };
        if let Some(prefix) = &self.prefix {
            config.prefix = prefix.clone();
        }
        if let Some(endpoint) = &self.endpoint {
            config.video_feed.endpoint = Some(endpoint.clone());
        }
        config.debug |= self.debug;
        Ok(config)
    }

    fn page_url(&self) -> String {
        if let Some(url) = &self.url {
            return url.clone();
        }
        if self.reads_stdin() {
            return "about:blank".to_string();
        }
        std::fs::canonicalize(&self.input)
            .ok()
            .and_then(|path| url::Url::from_file_path(path).ok())
            .map_or_else(|| "about:blank".to_string(), String::from)
    }
}

/// Enhance one page and return the resulting HTML
pub fn enhance(html: &str, url: &str, config: Config) -> Result<String> {
    let mut document = bb_html::parse(html, url).context("Parsing HTML")?;

    let Some(mut coordinator) = Coordinator::new(config).install(&mut document) else {
        return Ok(bb_html::serialize(&document));
    };
    bb_behaviors::register_defaults(&mut coordinator).context("Registering behaviors")?;

    if let Some(report) = coordinator.init(&mut document) {
        for (module, error) in &report.failed {
            tracing::warn!("{} failed: {}", module, error);
        }
    }
    let fired = coordinator.run_until_idle(&mut document);
    coordinator.disconnect(&mut document);
    tracing::info!(
        "Enhanced {} in {} passes ({} timers, {}ms virtual)",
        url,
        coordinator.passes(),
        fired,
        coordinator.now_ms()
    );

    Ok(bb_html::serialize(&document))
}

fn read_input(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut html = String::new();
        std::io::stdin().read_to_string(&mut html).context("Reading stdin")?;
        return Ok(html);
    }
    std::fs::read_to_string(path).with_context(|| format!("Reading {}", path.display()))
}

/// Read, enhance, write
pub fn run(options: &Options) -> Result<()> {
    let config = options.load_config()?;
    let html = read_input(&options.input)?;
    let output = enhance(&html, &options.page_url(), config)?;

    match &options.output {
        Some(path) => std::fs::write(path, output).with_context(|| format!("Writing {}", path.display()))?,
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(output.as_bytes()).context("Writing stdout")?;
            stdout.flush()?;
        }
    }
    Ok(())
}
