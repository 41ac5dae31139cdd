//! Binding configuration sections to typed structs.
//!
//! Configuration values are untyped strings, so a section is first turned
//! into a JSON object tree whose leaves are all strings and whose keys are
//! lowercased, then deserialized with [`serde_path_to_error`] so a failure
//! names the exact key that caused it.
//!
//! Target types therefore use `#[serde(rename_all = "lowercase")]` and
//! string-accepting helpers such as [`bool_from_str`] for non-string fields.

use serde::de::{self, DeserializeOwned, Deserializer, Unexpected};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::config::Configuration;
use crate::key;
use crate::Error;

/// Builds a JSON tree for the subtree at `path` (`None` = whole configuration).
///
/// A key with children becomes an object; its own value, if any, is dropped.
/// A key without children becomes a string.
pub fn section_to_value(config: &dyn Configuration, path: Option<&str>) -> Value {
    let children = config.child_keys(path);

    if children.is_empty() {
        return match path.and_then(|path| config.get(path)) {
            Some(value) => Value::String(value),
            None => Value::Object(Map::new()),
        };
    }

    let map = children
        .into_iter()
        .map(|child| {
            let child_path = key::combine(path, &child);
            (key::fold(&child), section_to_value(config, Some(&child_path)))
        })
        .collect();

    Value::Object(map)
}

/// Deserializes the section at `section` into `T`.
///
/// A missing section binds from an empty object, so `#[serde(default)]`
/// types get their defaults.
///
/// # Errors
///
/// Returns [`Error::Bind`] naming the offending key path.
///
/// # Example
///
/// ```
/// use confscope::{ConfigBuilder, bind};
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// #[serde(rename_all = "lowercase")]
/// struct Db {
///     host: String,
///     #[serde(deserialize_with = "bind::bool_from_str")]
///     pooling: bool,
/// }
///
/// let config = ConfigBuilder::new()
///     .in_memory([("Db:Host", "localhost"), ("Db:Pooling", "True")])
///     .build()?;
///
/// let db: Db = bind::bind(&config, "Db")?;
/// assert_eq!(db.host, "localhost");
/// assert!(db.pooling);
/// # Ok::<(), confscope::Error>(())
/// ```
pub fn bind<T: DeserializeOwned>(config: &dyn Configuration, section: &str) -> Result<T, Error> {
    let value = section_to_value(config, Some(section));

    serde_path_to_error::deserialize(value).map_err(|e| {
        let relative = e.path().to_string();
        let path = if relative == "." {
            section.to_string()
        } else {
            key::combine(
                Some(section),
                &relative.replace('.', &key::KEY_DELIMITER.to_string()),
            )
        };

        Error::Bind {
            path,
            message: e.inner().to_string(),
            help: "check that the configured values match the expected types".to_string(),
        }
    })
}

/// Deserializes a `bool` from `true`/`false` in any case, or a JSON bool.
///
/// # Errors
///
/// Fails for any other text.
pub fn bool_from_str<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Bool(bool),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Bool(b) => Ok(b),
        Raw::Text(text) if text.trim().eq_ignore_ascii_case("true") => Ok(true),
        Raw::Text(text) if text.trim().eq_ignore_ascii_case("false") => Ok(false),
        Raw::Text(text) => Err(de::Error::invalid_value(
            Unexpected::Str(&text),
            &"`true` or `false`",
        )),
    }
}
