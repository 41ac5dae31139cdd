//! File-backed configuration providers.
//!
//! Files are parsed once, when the provider is loaded, and flattened into
//! `:`-delimited keys:
//!
//! ```json
//! { "Db": { "Host": "localhost", "Replicas": ["r1", "r2"] } }
//! ```
//!
//! becomes `Db:Host = localhost`, `Db:Replicas:0 = r1`, `Db:Replicas:1 = r2`.
//!
//! # Supported Formats
//!
//! - **JSON** - always available
//! - **TOML** - available with the `toml` feature
//! - **YAML** - available with the `yaml` feature
//! - **dotenv** - available with the `dotenv` feature (`__` nests keys)

use std::fmt::{self, Display, Formatter};
use std::path::{Path, PathBuf};

use miette::{Diagnostic, NamedSource, SourceSpan};
use serde_json::Value;

use crate::key;
use crate::macros::debug;
use crate::provider::{KeyValueStore, Provider, ProviderDetails};

/// Supported configuration file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    /// JSON format (.json)
    Json,
    /// TOML format (.toml)
    #[cfg(feature = "toml")]
    Toml,
    /// YAML format (.yaml, .yml)
    #[cfg(feature = "yaml")]
    Yaml,
    /// dotenv format (.env, .env.*, *.env)
    #[cfg(feature = "dotenv")]
    Dotenv,
}

impl FileFormat {
    /// Detect file format from the file name or extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        #[cfg(feature = "dotenv")]
        {
            let name = path.file_name()?.to_str()?;
            if name == ".env" || name.starts_with(".env.") {
                return Some(FileFormat::Dotenv);
            }
        }

        let ext = path.extension()?.to_str()?;
        match ext.to_lowercase().as_str() {
            "json" => Some(FileFormat::Json),
            #[cfg(feature = "toml")]
            "toml" => Some(FileFormat::Toml),
            #[cfg(feature = "yaml")]
            "yaml" | "yml" => Some(FileFormat::Yaml),
            #[cfg(feature = "dotenv")]
            "env" => Some(FileFormat::Dotenv),
            _ => None,
        }
    }

    /// Human-readable format name.
    pub fn name(self) -> &'static str {
        match self {
            FileFormat::Json => "JSON",
            #[cfg(feature = "toml")]
            FileFormat::Toml => "TOML",
            #[cfg(feature = "yaml")]
            FileFormat::Yaml => "YAML",
            #[cfg(feature = "dotenv")]
            FileFormat::Dotenv => "dotenv",
        }
    }

    fn provider_name(self) -> &'static str {
        match self {
            FileFormat::Json => "JsonFileProvider",
            #[cfg(feature = "toml")]
            FileFormat::Toml => "TomlFileProvider",
            #[cfg(feature = "yaml")]
            FileFormat::Yaml => "YamlFileProvider",
            #[cfg(feature = "dotenv")]
            FileFormat::Dotenv => "DotenvFileProvider",
        }
    }
}

impl Display for FileFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A configuration file could not be loaded.
///
/// Parse failures carry the file content and a span so miette can point at
/// the offending token.
#[derive(Debug, Diagnostic, thiserror::Error)]
pub enum FileError {
    /// A required file does not exist.
    #[error("configuration file not found: {path}")]
    #[diagnostic(
        code(confscope::file::not_found),
        help("create the file or register it with `file_optional`")
    )]
    NotFound {
        /// Full path that was checked.
        path: String,
    },

    /// The file exists but could not be read.
    #[error("cannot read configuration file {path}")]
    #[diagnostic(
        code(confscope::file::read_error),
        help("the process needs read access to the file")
    )]
    ReadError {
        /// Full path of the file.
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// No format is registered for the file name.
    #[error("no configuration format for `.{extension}` files")]
    #[diagnostic(code(confscope::file::unknown_format), help("{}", supported_formats()))]
    UnknownFormat {
        /// Extension of the rejected file.
        extension: String,
    },

    /// The content is not valid for its format.
    #[error("invalid {format} in {path}")]
    #[diagnostic(code(confscope::file::parse_error))]
    Parse {
        /// Format name.
        format: &'static str,
        /// Path of the file.
        path: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("{message}")]
        span: SourceSpan,
        /// Parser message.
        message: String,
        #[help]
        help: String,
    },

    /// The content is not valid for its format and the parser gave no
    /// location.
    #[error("invalid {format}: {message}")]
    #[diagnostic(code(confscope::file::parse_error))]
    ParseNoSpan {
        /// Format name.
        format: &'static str,
        /// Parser message.
        message: String,
        #[help]
        help: String,
    },
}

fn supported_formats() -> String {
    let mut formats = vec![".json"];
    #[cfg(feature = "toml")]
    formats.push(".toml");
    #[cfg(feature = "yaml")]
    formats.extend([".yaml", ".yml"]);
    #[cfg(feature = "dotenv")]
    formats.extend([".env", "*.env"]);

    format!("supported formats: {}", formats.join(", "))
}

fn parse_error(
    format: FileFormat,
    path: &Path,
    content: &str,
    span: Option<SourceSpan>,
    message: String,
    help: &str,
) -> FileError {
    match span {
        Some(span) => FileError::Parse {
            format: format.name(),
            path: path.display().to_string(),
            src: NamedSource::new(path.display().to_string(), content.to_string()),
            span,
            message,
            help: help.to_string(),
        },
        None => FileError::ParseNoSpan {
            format: format.name(),
            message,
            help: help.to_string(),
        },
    }
}

/// Span of the token starting at 1-based `line` and `column`.
fn span_at(content: &str, line: usize, column: usize) -> Option<SourceSpan> {
    let line_start: usize = content
        .split_inclusive('\n')
        .take(line.checked_sub(1)?)
        .map(str::len)
        .sum();
    let offset = (line_start + column.saturating_sub(1)).min(content.len());

    let rest = content.get(offset..).unwrap_or_default();
    let len = rest
        .find(|c: char| c.is_whitespace() || matches!(c, ',' | ']' | '}'))
        .unwrap_or(rest.len())
        .max(usize::from(!rest.is_empty()));

    Some(SourceSpan::new(offset.into(), len))
}

#[cfg(feature = "yaml")]
static YAML_LOCATION_RE: std::sync::LazyLock<regex::Regex> = std::sync::LazyLock::new(|| {
    regex::Regex::new(r"line (\d+)\D+?column (\d+)").expect("valid regex")
});

/// `line N ... column M` as reported in YAML error messages.
#[cfg(feature = "yaml")]
fn yaml_location(message: &str) -> Option<(usize, usize)> {
    let caps = YAML_LOCATION_RE.captures(message)?;

    Some((caps[1].parse().ok()?, caps[2].parse().ok()?))
}

#[cfg(feature = "toml")]
fn toml_to_json(value: toml::Value) -> Value {
    match value {
        toml::Value::Table(table) => Value::Object(
            table
                .into_iter()
                .map(|(k, v)| (k, toml_to_json(v)))
                .collect(),
        ),
        toml::Value::Array(items) => items.into_iter().map(toml_to_json).collect(),
        toml::Value::Float(f) if !f.is_finite() => Value::String(f.to_string()),
        toml::Value::Float(f) => Value::from(f),
        toml::Value::Integer(i) => Value::from(i),
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::String(s) => Value::String(s),
    }
}

/// Parses file content into a flat key/value store.
///
/// `path` is only used for diagnostics.
pub fn parse_str(content: &str, format: FileFormat, path: &Path) -> Result<KeyValueStore, FileError> {
    let value: Value = match format {
        FileFormat::Json => serde_json::from_str(content).map_err(|e| {
            let span = span_at(content, e.line(), e.column());
            parse_error(
                format,
                path,
                content,
                span,
                e.to_string(),
                "look for a missing comma, quote or bracket near the marked token",
            )
        })?,

        #[cfg(feature = "toml")]
        FileFormat::Toml => {
            let table: toml::Table = toml::from_str(content).map_err(|e| {
                parse_error(
                    format,
                    path,
                    content,
                    e.span().map(SourceSpan::from),
                    e.message().to_string(),
                    "values must be quoted strings, numbers, booleans, arrays or tables",
                )
            })?;
            toml_to_json(toml::Value::Table(table))
        }

        #[cfg(feature = "yaml")]
        FileFormat::Yaml => serde_saphyr::from_str(content).map_err(|e| {
            let message = e.to_string();
            let span = yaml_location(&message)
                .and_then(|(line, column)| span_at(content, line, column));
            parse_error(
                format,
                path,
                content,
                span,
                message,
                "check the indentation of the marked line",
            )
        })?,

        #[cfg(feature = "dotenv")]
        FileFormat::Dotenv => return parse_dotenv(content),
    };

    let mut store = KeyValueStore::new();
    match value {
        Value::Object(_) => flatten(&value, None, &mut store),
        // An empty YAML document deserializes to null.
        Value::Null => {}
        _ => {
            return Err(FileError::ParseNoSpan {
                format: format.name(),
                message: "top-level element must be an object".to_string(),
                help: "wrap the settings in a mapping of keys to values".to_string(),
            });
        }
    }

    Ok(store)
}

#[cfg(feature = "dotenv")]
fn parse_dotenv(content: &str) -> Result<KeyValueStore, FileError> {
    use crate::provider::ENV_NESTING_SEPARATOR;

    let mut store = KeyValueStore::new();

    for item in dotenvy::from_read_iter(content.as_bytes()) {
        let (name, value) = item.map_err(|e| FileError::ParseNoSpan {
            format: "dotenv",
            message: e.to_string(),
            help: "each line must look like NAME=value".to_string(),
        })?;

        store.insert(
            name.replace(ENV_NESTING_SEPARATOR, &key::KEY_DELIMITER.to_string()),
            value,
        );
    }

    Ok(store)
}

/// Flattens a JSON tree into `:`-delimited keys.
///
/// Arrays use their element index as the segment; `null` becomes an empty
/// string; empty objects and arrays produce no keys.
pub fn flatten(value: &Value, prefix: Option<&str>, store: &mut KeyValueStore) {
    match value {
        Value::Object(map) => {
            for (k, v) in map {
                flatten(v, Some(&key::combine(prefix, k)), store);
            }
        }
        Value::Array(items) => {
            for (i, v) in items.iter().enumerate() {
                flatten(v, Some(&key::combine(prefix, &i.to_string())), store);
            }
        }
        scalar => {
            if let Some(prefix) = prefix {
                store.insert(prefix, scalar_text(scalar));
            }
        }
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Where a file provider's data came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDetails {
    /// Path as configured.
    pub path: PathBuf,
    /// Path resolved against the base directory.
    pub full_path: PathBuf,
    /// Whether a missing file is tolerated.
    pub optional: bool,
    /// Detected format.
    pub format: FileFormat,
}

impl FileDetails {
    /// Checks whether the file exists right now.
    pub fn exists(&self) -> bool {
        self.full_path.is_file()
    }
}

/// Provider over a parsed configuration file.
#[derive(Debug, Clone)]
pub struct FileProvider {
    details: FileDetails,
    store: KeyValueStore,
}

impl FileProvider {
    /// Loads a file, detecting its format from the name.
    ///
    /// Relative paths are resolved against `base`. A missing optional file
    /// yields an empty provider.
    ///
    /// # Errors
    ///
    /// Returns a [`FileError`] if a required file is missing, the format is
    /// unknown, or the content does not parse.
    pub fn load(path: impl AsRef<Path>, base: &Path, optional: bool) -> Result<Self, FileError> {
        let path = path.as_ref();
        let format = FileFormat::from_path(path).ok_or_else(|| FileError::UnknownFormat {
            extension: path
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or("unknown")
                .to_string(),
        })?;

        Self::load_with_format(path, base, optional, format)
    }

    /// Loads a file with an explicit format.
    ///
    /// # Errors
    ///
    /// Returns a [`FileError`] if a required file is missing or the content
    /// does not parse.
    pub fn load_with_format(
        path: impl AsRef<Path>,
        base: &Path,
        optional: bool,
        format: FileFormat,
    ) -> Result<Self, FileError> {
        let path = path.as_ref();
        let details = FileDetails {
            path: path.to_path_buf(),
            full_path: base.join(path),
            optional,
            format,
        };

        if !details.full_path.exists() {
            if !optional {
                return Err(FileError::NotFound {
                    path: details.full_path.display().to_string(),
                });
            }

            debug!(path = %details.full_path.display(), "optional configuration file missing");
            return Ok(Self {
                details,
                store: KeyValueStore::new(),
            });
        }

        let content =
            std::fs::read_to_string(&details.full_path).map_err(|e| FileError::ReadError {
                path: details.full_path.display().to_string(),
                source: e,
            })?;

        let store = parse_str(&content, format, &details.full_path)?;

        debug!(
            path = %details.full_path.display(),
            format = format.name(),
            keys = store.len(),
            "loaded configuration file"
        );

        Ok(Self { details, store })
    }

    /// File metadata.
    pub fn file_details(&self) -> &FileDetails {
        &self.details
    }

    /// The parsed keys.
    pub fn store(&self) -> &KeyValueStore {
        &self.store
    }
}

impl Provider for FileProvider {
    fn kind_name(&self) -> &str {
        self.details.format.provider_name()
    }

    fn try_get(&self, key: &str) -> Option<String> {
        self.store.get(key).map(str::to_string)
    }

    fn child_keys(&self, parent: Option<&str>) -> Vec<String> {
        self.store.child_keys(parent)
    }

    fn details(&self) -> ProviderDetails<'_> {
        ProviderDetails::File(&self.details)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn parse_json(content: &str) -> KeyValueStore {
        parse_str(content, FileFormat::Json, Path::new("test.json")).expect("valid json")
    }

    #[test]
    fn test_format_detection() {
        assert_eq!(
            FileFormat::from_path(Path::new("appsettings.json")),
            Some(FileFormat::Json)
        );
        assert_eq!(
            FileFormat::from_path(Path::new("a/B.JSON")),
            Some(FileFormat::Json)
        );
        assert_eq!(FileFormat::from_path(Path::new("settings.ini")), None);
        assert_eq!(FileFormat::from_path(Path::new("noext")), None);
    }

    #[cfg(feature = "dotenv")]
    #[test]
    fn test_dotenv_detection() {
        assert_eq!(
            FileFormat::from_path(Path::new(".env")),
            Some(FileFormat::Dotenv)
        );
        assert_eq!(
            FileFormat::from_path(Path::new("conf/.env.local")),
            Some(FileFormat::Dotenv)
        );
        assert_eq!(
            FileFormat::from_path(Path::new("prod.env")),
            Some(FileFormat::Dotenv)
        );
    }

    #[test]
    fn test_json_flattening() {
        let store = parse_json(
            r#"{
                "Db": { "Host": "localhost", "Port": 5432, "Replicas": ["r1", "r2"] },
                "Debug": true,
                "Nothing": null,
                "Empty": {}
            }"#,
        );

        assert_eq!(store.get("Db:Host"), Some("localhost"));
        assert_eq!(store.get("db:port"), Some("5432"));
        assert_eq!(store.get("Db:Replicas:1"), Some("r2"));
        assert_eq!(store.get("Debug"), Some("true"));
        assert_eq!(store.get("Nothing"), Some(""));
        assert_eq!(store.get("Empty"), None);
        assert_eq!(store.child_keys(None), vec!["Db", "Debug", "Nothing"]);
    }

    #[test]
    fn test_json_parse_error_has_span() {
        let err = parse_str("{ \"a\": }", FileFormat::Json, Path::new("bad.json")).unwrap_err();
        assert!(matches!(err, FileError::Parse { format: "JSON", .. }));
    }

    #[test]
    fn test_span_covers_token_at_line_and_column() {
        let span = span_at("a = 1\nbad line\n", 2, 5).expect("in range");
        assert_eq!((span.offset(), span.len()), (10, 4));

        let span = span_at("x\r\ny z", 2, 3).expect("crlf");
        assert_eq!((span.offset(), span.len()), (5, 1));

        let span = span_at("ab", 1, 10).expect("clamped");
        assert_eq!((span.offset(), span.len()), (2, 0));

        assert!(span_at("ab", 0, 1).is_none());
    }

    #[cfg(feature = "yaml")]
    #[test]
    fn test_yaml_location_from_message() {
        assert_eq!(
            yaml_location("mapping values are not allowed at line 3, column 7"),
            Some((3, 7))
        );
        assert_eq!(yaml_location("unexpected end of input"), None);
    }

    #[test]
    fn test_json_top_level_must_be_object() {
        let err = parse_str("[1, 2]", FileFormat::Json, Path::new("list.json")).unwrap_err();
        assert!(matches!(err, FileError::ParseNoSpan { .. }));
    }

    #[cfg(feature = "toml")]
    #[test]
    fn test_toml_flattening() {
        let store = parse_str(
            "name = \"svc\"\n[db]\nhost = \"h\"\nport = 1\nratio = 0.5\n",
            FileFormat::Toml,
            Path::new("c.toml"),
        )
        .expect("valid toml");

        assert_eq!(store.get("name"), Some("svc"));
        assert_eq!(store.get("db:host"), Some("h"));
        assert_eq!(store.get("db:port"), Some("1"));
        assert_eq!(store.get("db:ratio"), Some("0.5"));
    }

    #[cfg(feature = "toml")]
    #[test]
    fn test_toml_parse_error() {
        let err = parse_str("name = ", FileFormat::Toml, Path::new("c.toml")).unwrap_err();
        assert!(matches!(
            err,
            FileError::Parse { format: "TOML", .. } | FileError::ParseNoSpan { format: "TOML", .. }
        ));
    }

    #[cfg(feature = "yaml")]
    #[test]
    fn test_yaml_flattening() {
        let store = parse_str(
            "db:\n  host: h\n  ports:\n    - 1\n    - 2\n",
            FileFormat::Yaml,
            Path::new("c.yaml"),
        )
        .expect("valid yaml");

        assert_eq!(store.get("db:host"), Some("h"));
        assert_eq!(store.get("db:ports:0"), Some("1"));
    }

    #[cfg(feature = "dotenv")]
    #[test]
    fn test_dotenv_nesting() {
        let store = parse_str(
            "# comment\nDB__HOST=h\nAPI_KEY=\"quoted\"\n",
            FileFormat::Dotenv,
            Path::new(".env"),
        )
        .expect("valid dotenv");

        assert_eq!(store.get("db:host"), Some("h"));
        assert_eq!(store.get("API_KEY"), Some("quoted"));
    }

    #[test]
    fn test_required_file_missing() {
        let dir = tempfile::tempdir().expect("temp dir");
        let err = FileProvider::load("appsettings.json", dir.path(), false).unwrap_err();
        assert!(matches!(err, FileError::NotFound { .. }));
    }

    #[test]
    fn test_optional_file_missing_is_empty() {
        let dir = tempfile::tempdir().expect("temp dir");
        let provider = FileProvider::load("appsettings.json", dir.path(), true).expect("optional");

        assert!(provider.store().is_empty());
        assert!(!provider.file_details().exists());
        assert!(provider.file_details().optional);
    }

    #[test]
    fn test_unknown_format() {
        let dir = tempfile::tempdir().expect("temp dir");
        let err = FileProvider::load("settings.ini", dir.path(), true).unwrap_err();
        assert!(matches!(err, FileError::UnknownFormat { extension } if extension == "ini"));
    }

    #[test]
    fn test_load_existing_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        fs::write(dir.path().join("appsettings.json"), r#"{"A":{"B":"c"}}"#).expect("write");

        let provider = FileProvider::load("appsettings.json", dir.path(), false).expect("load");

        assert_eq!(provider.kind_name(), "JsonFileProvider");
        assert_eq!(provider.try_get("a:b").as_deref(), Some("c"));
        assert!(provider.file_details().exists());
        assert_eq!(
            provider.file_details().full_path,
            dir.path().join("appsettings.json")
        );
        assert!(matches!(provider.details(), ProviderDetails::File(_)));
    }
}
