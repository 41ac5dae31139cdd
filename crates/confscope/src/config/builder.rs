//! Builder for layered configuration roots.

use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::Error;
use crate::file::{self, FileProvider};
use crate::macros::debug;
use crate::provider::{ChainedProvider, EnvProvider, KeyValueStore, MemoryProvider, Provider};

use super::ConfigRoot;

enum Layer {
    Provider(Box<dyn Provider>),
    File { path: PathBuf, optional: bool },
}

/// Builder for layered configuration.
///
/// `ConfigBuilder` provides a fluent API for stacking providers. Layers are
/// kept in the order they were added; later layers override earlier ones.
///
/// # Layering Order
///
/// 1. **Defaults** - [`in_memory()`](Self::in_memory) or [`defaults()`](Self::defaults)
/// 2. **Config files** - [`file()`](Self::file) or [`file_optional()`](Self::file_optional)
/// 3. **Environment variables** - [`env_prefix()`](Self::env_prefix)
///
/// Any order is allowed; this one is just the usual one.
///
/// # Example
///
/// ```
/// use confscope::{ConfigBuilder, Configuration};
///
/// let root = ConfigBuilder::new()
///     .in_memory([("Db:Port", "5432"), ("Db:Host", "localhost")])
///     .file_optional("appsettings.json")
///     .env_vars(Some("APP_"), [("APP_DB__HOST", "db.internal")])
///     .build()?;
///
/// assert_eq!(root.get("Db:Host").as_deref(), Some("db.internal"));
/// assert_eq!(root.get("Db:Port").as_deref(), Some("5432"));
/// # Ok::<(), confscope::Error>(())
/// ```
///
/// # Errors Are Accumulated
///
/// Files are loaded in [`build()`](Self::build). Every failing file is
/// reported, wrapped in [`Error::Multiple`] when there is more than one.
#[derive(Default)]
pub struct ConfigBuilder {
    base_path: Option<PathBuf>,
    layers: Vec<Layer>,
}

impl ConfigBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Directory that relative file paths are resolved against.
    ///
    /// Defaults to the current directory.
    #[must_use]
    pub fn base_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.base_path = Some(path.into());

        self
    }

    /// Adds in-memory key/value pairs.
    #[must_use]
    pub fn in_memory<K, V>(self, pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.provider(pairs.into_iter().collect::<MemoryProvider>())
    }

    /// Adds defaults from a serializable value, flattened like a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Bind`] if `defaults` cannot be serialized.
    pub fn defaults<T: Serialize>(self, defaults: &T) -> Result<Self, Error> {
        let value = serde_json::to_value(defaults).map_err(|e| Error::Bind {
            path: String::new(),
            message: format!(
                "failed to serialize defaults of type '{}': {e}",
                std::any::type_name::<T>()
            ),
            help: "defaults must serialize to a JSON object".to_string(),
        })?;

        Ok(self.defaults_value(&value))
    }

    /// Adds defaults from a raw JSON value.
    #[must_use]
    pub fn defaults_value(self, value: &Value) -> Self {
        let mut store = KeyValueStore::new();
        file::flatten(value, None, &mut store);

        self.provider(store.iter().collect::<MemoryProvider>())
    }

    /// Adds a required configuration file.
    ///
    /// If the file does not exist, [`build()`](Self::build) fails with
    /// [`FileError::NotFound`](crate::file::FileError::NotFound).
    #[must_use]
    pub fn file(mut self, path: impl AsRef<Path>) -> Self {
        self.layers.push(Layer::File {
            path: path.as_ref().to_path_buf(),
            optional: false,
        });

        self
    }

    /// Adds an optional configuration file.
    ///
    /// A missing file still appears in the provider list, as an empty
    /// provider whose file does not exist.
    #[must_use]
    pub fn file_optional(mut self, path: impl AsRef<Path>) -> Self {
        self.layers.push(Layer::File {
            path: path.as_ref().to_path_buf(),
            optional: true,
        });

        self
    }

    /// Adds process environment variables starting with `prefix`.
    ///
    /// With prefix `"APP_"`:
    /// - `APP_DB__HOST` → `DB:HOST`
    /// - `APP_PORT` → `PORT`
    /// - `OTHER_VAR` → ignored
    #[must_use]
    pub fn env_prefix(self, prefix: impl Into<String>) -> Self {
        self.provider(EnvProvider::with_prefix(prefix))
    }

    /// Adds the whole process environment.
    ///
    /// Reports hide this provider unless `HostInfo:IgnoreGlobalEnvironment`
    /// is `false`.
    #[must_use]
    pub fn env(self) -> Self {
        self.provider(EnvProvider::new())
    }

    /// Adds an explicit list of environment variables.
    #[must_use]
    pub fn env_vars<K, V>(self, prefix: Option<&str>, vars: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: AsRef<str>,
        V: Into<String>,
    {
        self.provider(EnvProvider::from_vars(prefix.map(str::to_string), vars))
    }

    /// Adds another configuration root as a single layer.
    #[must_use]
    pub fn chained(self, root: Arc<ConfigRoot>) -> Self {
        self.provider(ChainedProvider::new(root))
    }

    /// Adds any provider.
    #[must_use]
    pub fn provider(mut self, provider: impl Provider + 'static) -> Self {
        self.layers.push(Layer::Provider(Box::new(provider)));

        self
    }

    /// Loads all files and returns the configuration root.
    ///
    /// # Errors
    ///
    /// Returns [`Error::File`] for a single failing file, or
    /// [`Error::Multiple`] listing every failing file.
    pub fn build(self) -> Result<ConfigRoot, Error> {
        let base = self
            .base_path
            .unwrap_or_else(|| env::current_dir().unwrap_or_default());

        let mut providers: Vec<Box<dyn Provider>> = Vec::with_capacity(self.layers.len());
        let mut errors = Vec::new();

        for layer in self.layers {
            match layer {
                Layer::Provider(provider) => providers.push(provider),
                Layer::File { path, optional } => {
                    match FileProvider::load(&path, &base, optional) {
                        Ok(provider) => providers.push(Box::new(provider)),
                        Err(e) => errors.push(Error::from(e)),
                    }
                }
            }
        }

        if let Some(error) = Error::multiple(errors) {
            return Err(error);
        }

        debug!(providers = providers.len(), "built configuration root");

        Ok(ConfigRoot::new(providers))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Configuration;
    use crate::provider::ProviderDetails;
    use std::fs;

    #[test]
    fn test_layers_keep_insertion_order() {
        let root = ConfigBuilder::new()
            .in_memory([("A", "1"), ("B", "1")])
            .env_vars(Some("X_"), [("X_A", "2")])
            .in_memory([("B", "3")])
            .build()
            .expect("no files");

        assert_eq!(root.get("A").as_deref(), Some("2"));
        assert_eq!(root.get("B").as_deref(), Some("3"));

        let kinds: Vec<_> = root
            .provider_list()
            .iter()
            .map(|p| p.kind_name().to_string())
            .collect();
        assert_eq!(
            kinds,
            ["MemoryProvider", "EnvironmentVariablesProvider", "MemoryProvider"]
        );
    }

    #[test]
    fn test_files_resolve_against_base_path() {
        let dir = tempfile::tempdir().expect("temp dir");
        fs::write(dir.path().join("appsettings.json"), r#"{"Name":"svc"}"#).expect("write");

        let root = ConfigBuilder::new()
            .base_path(dir.path())
            .file("appsettings.json")
            .file_optional("appsettings.Development.json")
            .build()
            .expect("build");

        assert_eq!(root.get("name").as_deref(), Some("svc"));
        assert_eq!(root.provider_list().len(), 2);

        let ProviderDetails::File(details) = root.provider_list()[1].details() else {
            panic!("expected file details");
        };
        assert!(details.optional);
        assert!(!details.exists());
    }

    #[test]
    fn test_missing_files_are_accumulated() {
        let dir = tempfile::tempdir().expect("temp dir");

        let err = ConfigBuilder::new()
            .base_path(dir.path())
            .file("a.json")
            .file("b.json")
            .build()
            .unwrap_err();

        let Error::Multiple { errors } = err else {
            panic!("expected multiple errors, got {err:?}");
        };
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_single_missing_file_is_not_wrapped() {
        let dir = tempfile::tempdir().expect("temp dir");

        let err = ConfigBuilder::new()
            .base_path(dir.path())
            .file("a.json")
            .build()
            .unwrap_err();

        assert!(matches!(err, Error::File(_)));
    }

    #[test]
    fn test_defaults_flatten_nested_values() {
        #[derive(Serialize)]
        struct Defaults {
            port: u16,
            db: Db,
        }

        #[derive(Serialize)]
        struct Db {
            hosts: Vec<&'static str>,
        }

        let root = ConfigBuilder::new()
            .defaults(&Defaults {
                port: 8080,
                db: Db {
                    hosts: vec!["a", "b"],
                },
            })
            .expect("serializable")
            .build()
            .expect("no files");

        assert_eq!(root.get("port").as_deref(), Some("8080"));
        assert_eq!(root.get("db:hosts:1").as_deref(), Some("b"));
    }

    #[test]
    fn test_chained_layer() {
        let inner = ConfigBuilder::new()
            .in_memory([("A", "inner")])
            .build()
            .expect("inner");

        let root = ConfigBuilder::new()
            .in_memory([("A", "outer"), ("B", "outer")])
            .chained(Arc::new(inner))
            .build()
            .expect("outer");

        assert_eq!(root.get("A").as_deref(), Some("inner"));
        assert_eq!(root.get("B").as_deref(), Some("outer"));
    }
}
