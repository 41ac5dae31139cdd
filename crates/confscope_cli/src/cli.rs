//! Command-line arguments and the configuration layers they declare.

use std::path::PathBuf;

use clap::{ArgMatches, Parser, ValueEnum};
use confscope::{ConfigBuilder, ConfigRoot, Error};

/// Print a report of a layered configuration: where every value comes from,
/// which layers override it, and the host it runs on.
///
/// Layers are applied in command-line order; later layers win.
#[derive(Parser, Debug)]
#[command(name = "confscope", version, about, long_about = None)]
pub struct Cli {
    /// Required configuration file (JSON, TOML, YAML or .env)
    #[arg(short = 'f', long = "file", value_name = "PATH")]
    pub files: Vec<PathBuf>,

    /// Configuration file that may be missing
    #[arg(short = 'o', long = "optional-file", value_name = "PATH")]
    pub optional_files: Vec<PathBuf>,

    /// Environment variables starting with PREFIX, prefix stripped
    #[arg(short = 'e', long = "env-prefix", value_name = "PREFIX")]
    pub env_prefixes: Vec<String>,

    /// The whole process environment
    #[arg(long)]
    pub global_env: bool,

    /// Inline setting, e.g. `Db:Port=5432`
    #[arg(short = 's', long = "set", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub settings: Vec<(String, String)>,

    /// Optional `.env` file in the base path
    #[arg(long)]
    pub dotenv: bool,

    /// Directory relative file paths are resolved against (defaults to the
    /// current directory)
    #[arg(long, value_name = "DIR")]
    pub base_path: Option<PathBuf>,

    /// Application name shown in the report
    #[arg(long, default_value = "confscope")]
    pub app_name: String,

    /// Application version shown in the report
    #[arg(long, default_value = env!("CARGO_PKG_VERSION"))]
    pub app_version: String,

    /// Environment name, e.g. Development
    #[arg(long, env = "APP_ENVIRONMENT")]
    pub environment: Option<String>,

    /// When to use colours and hyperlinks
    #[arg(long, value_enum, default_value_t = ColorChoice::Auto)]
    pub color: ColorChoice,

    /// Log filter for diagnostics on stderr, e.g. `debug` (overrides RUST_LOG)
    #[arg(long, value_name = "FILTER")]
    pub log_level: Option<String>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum ColorChoice {
    /// Colour if stdout supports it
    #[default]
    Auto,
    Always,
    Never,
}

/// A configuration layer, in the order it was given.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Layer {
    File(PathBuf),
    OptionalFile(PathBuf),
    EnvPrefix(String),
    GlobalEnv,
    Settings(Vec<(String, String)>),
    Dotenv,
}

impl Cli {
    /// Layers in command-line order.
    ///
    /// Consecutive `--set` options form one in-memory layer.
    pub fn layers(&self, matches: &ArgMatches) -> Vec<Layer> {
        let mut indexed: Vec<(usize, Layer)> = Vec::new();

        indexed.extend(positions(matches, "files").zip(self.files.iter().cloned().map(Layer::File)));
        indexed.extend(
            positions(matches, "optional_files")
                .zip(self.optional_files.iter().cloned().map(Layer::OptionalFile)),
        );
        indexed.extend(
            positions(matches, "env_prefixes")
                .zip(self.env_prefixes.iter().cloned().map(Layer::EnvPrefix)),
        );
        indexed.extend(
            positions(matches, "settings")
                .zip(self.settings.iter().map(|kv| Layer::Settings(vec![kv.clone()]))),
        );
        if self.global_env {
            indexed.extend(positions(matches, "global_env").take(1).map(|i| (i, Layer::GlobalEnv)));
        }
        if self.dotenv {
            indexed.extend(positions(matches, "dotenv").take(1).map(|i| (i, Layer::Dotenv)));
        }

        indexed.sort_by_key(|(index, _)| *index);

        let mut layers: Vec<Layer> = Vec::with_capacity(indexed.len());
        for (_, layer) in indexed {
            match (layers.last_mut(), layer) {
                (Some(Layer::Settings(previous)), Layer::Settings(next)) => previous.extend(next),
                (_, layer) => layers.push(layer),
            }
        }

        layers
    }

    /// Builds the configuration from `layers`.
    ///
    /// # Errors
    ///
    /// Returns every file error at once.
    pub fn build(&self, layers: Vec<Layer>) -> Result<ConfigRoot, Error> {
        let mut builder = ConfigBuilder::new();
        if let Some(base) = &self.base_path {
            builder = builder.base_path(base);
        }

        for layer in layers {
            builder = match layer {
                Layer::File(path) => builder.file(path),
                Layer::OptionalFile(path) => builder.file_optional(path),
                Layer::EnvPrefix(prefix) => builder.env_prefix(prefix),
                Layer::GlobalEnv => builder.env(),
                Layer::Settings(pairs) => builder.in_memory(pairs),
                Layer::Dotenv => builder.file_optional(".env"),
            };
        }

        builder.build()
    }
}

fn positions<'a>(matches: &'a ArgMatches, id: &str) -> impl Iterator<Item = usize> + 'a {
    matches.indices_of(id).into_iter().flatten()
}

fn parse_key_value(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got `{s}`"))?;

    if key.trim().is_empty() {
        return Err("key must not be empty".to_string());
    }

    Ok((key.trim().to_string(), value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::{CommandFactory, FromArgMatches};
    use confscope::Configuration;

    fn parse(args: &[&str]) -> (Cli, ArgMatches) {
        let matches = Cli::command()
            .try_get_matches_from(std::iter::once("confscope").chain(args.iter().copied()))
            .expect("valid arguments");
        let cli = Cli::from_arg_matches(&matches).expect("derive");

        (cli, matches)
    }

    #[test]
    fn test_layers_follow_command_line_order() {
        let (cli, matches) = parse(&[
            "-o",
            "b.json",
            "--global-env",
            "-f",
            "a.json",
            "-e",
            "APP_",
            "--dotenv",
        ]);

        assert_eq!(
            cli.layers(&matches),
            [
                Layer::OptionalFile("b.json".into()),
                Layer::GlobalEnv,
                Layer::File("a.json".into()),
                Layer::EnvPrefix("APP_".to_string()),
                Layer::Dotenv,
            ]
        );
    }

    #[test]
    fn test_consecutive_settings_merge() {
        let (cli, matches) = parse(&["-s", "A=1", "--set", "B=2", "-e", "X_", "-s", "A=3"]);

        assert_eq!(
            cli.layers(&matches),
            [
                Layer::Settings(vec![
                    ("A".to_string(), "1".to_string()),
                    ("B".to_string(), "2".to_string()),
                ]),
                Layer::EnvPrefix("X_".to_string()),
                Layer::Settings(vec![("A".to_string(), "3".to_string())]),
            ]
        );
    }

    #[test]
    fn test_set_requires_key_value() {
        assert!(
            Cli::command()
                .try_get_matches_from(["confscope", "--set", "novalue"])
                .is_err()
        );
        assert_eq!(
            parse_key_value("Conn=Server=a;Password=b;"),
            Ok(("Conn".to_string(), "Server=a;Password=b;".to_string()))
        );
    }

    #[test]
    fn test_build_applies_layers() {
        let dir = tempfile::tempdir().expect("temp dir");
        std::fs::write(dir.path().join("a.json"), r#"{ "Port": 1, "Name": "a" }"#).expect("write");

        let base = dir.path().to_str().expect("utf-8 path");
        let (cli, matches) = parse(&["--base-path", base, "-f", "a.json", "-s", "Port=2"]);
        let config = cli.build(cli.layers(&matches)).expect("build");

        assert_eq!(config.get("port").as_deref(), Some("2"));
        assert_eq!(config.get("name").as_deref(), Some("a"));
        assert_eq!(config.provider_list().len(), 2);
    }

    #[test]
    fn test_missing_required_file_is_reported() {
        let dir = tempfile::tempdir().expect("temp dir");
        let base = dir.path().to_str().expect("utf-8 path");

        let (cli, matches) = parse(&["--base-path", base, "-f", "a.json", "-f", "b.json"]);
        let err = cli.build(cli.layers(&matches)).err().expect("missing files");

        assert!(matches!(err, Error::Multiple { ref errors } if errors.len() == 2), "{err:?}");
    }

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }
}
