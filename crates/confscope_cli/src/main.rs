//! `confscope` - print a layered configuration report.
//!
//! ```text
//! confscope -f appsettings.json -o appsettings.Development.json -e APP_ \
//!     --set HostInfo:RedactSecrets=false --environment Development
//! ```
//!
//! Settings of the report itself live in the `HostInfo` section of the
//! assembled configuration (`DisplayEnvironment`, `DisplayConfig`,
//! `IgnoreGlobalEnvironment`, `RedactSecrets`), so they can come from any
//! layer.

mod cli;

use std::env;

use clap::{CommandFactory, FromArgMatches};
use confscope::{HostEnvironment, HostReport, TerminalRenderer};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, ColorChoice};

fn main() -> miette::Result<()> {
    let matches = Cli::command().get_matches();
    let cli = Cli::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());

    init_tracing(cli.log_level.as_deref());

    let layers = cli.layers(&matches);
    debug!(layers = layers.len(), "assembling configuration");

    let config = cli.build(layers)?;

    let content_root = match &cli.base_path {
        Some(base) => base.clone(),
        None => env::current_dir().unwrap_or_default(),
    };

    let mut host = HostEnvironment::detect(cli.app_name.as_str(), cli.app_version.as_str())
        .with_content_root(content_root);
    if let Some(environment) = &cli.environment {
        host = host.with_environment(environment.as_str());
    }

    let renderer = TerminalRenderer::stdout();
    let mut renderer = match cli.color {
        ColorChoice::Auto => renderer,
        ColorChoice::Always => renderer.with_color(true),
        ColorChoice::Never => renderer.with_color(false),
    };

    HostReport::new(&host, &config)?.display(&mut renderer)?;

    Ok(())
}

/// Logs to stderr; `--log-level` wins over `RUST_LOG`, default `warn`.
fn init_tracing(level: Option<&str>) {
    let filter = match level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
