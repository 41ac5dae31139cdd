//! Example: a typical layered service configuration and its report.
//!
//! Layers, lowest precedence first:
//!
//! 1. built-in defaults from a serializable struct
//! 2. `appsettings.json`
//! 3. `appsettings.{Environment}.json` (optional)
//! 4. `.env` (optional)
//! 5. `APP_`-prefixed environment variables
//! 6. the whole process environment (hidden from the report by default)
//!
//! Run with:
//!   `cargo run --example layered`
//!
//! Or with an override:
//!   `APP_Server__Port=9000 cargo run --example layered`

use confscope::{ConfigBuilder, HostEnvironment, HostReport};
use serde::Serialize;

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct Defaults {
    server: Server,
    connection_strings: ConnectionStrings,
    host_info: HostInfo,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct Server {
    host: String,
    port: u16,
    tls: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct ConnectionStrings {
    orders: String,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct HostInfo {
    redact_secrets: bool,
}

fn main() -> miette::Result<()> {
    let dir = tempfile::tempdir().map_err(|e| miette::miette!("{e}"))?;

    std::fs::write(
        dir.path().join("appsettings.json"),
        r#"{
  "Server": { "Port": 8080 },
  "Logging": { "LogLevel": { "Default": "Information" } },
  "Docs": "https://example.com/orders"
}"#,
    )
    .map_err(|e| miette::miette!("{e}"))?;

    std::fs::write(
        dir.path().join("appsettings.Development.json"),
        r#"{ "Logging": { "LogLevel": { "Default": "Debug" } } }"#,
    )
    .map_err(|e| miette::miette!("{e}"))?;

    let host = HostEnvironment::detect("orders", env!("CARGO_PKG_VERSION"))
        .with_environment("Development")
        .with_content_root(dir.path());

    let defaults = Defaults {
        server: Server {
            host: "0.0.0.0".to_string(),
            port: 80,
            tls: false,
        },
        connection_strings: ConnectionStrings {
            orders: "Host=db;Database=orders;Password=hunter2;".to_string(),
        },
        host_info: HostInfo {
            redact_secrets: true,
        },
    };

    let config = ConfigBuilder::new()
        .base_path(dir.path())
        .defaults(&defaults)?
        .file("appsettings.json")
        .file_optional(format!("appsettings.{}.json", host.environment_name))
        .file_optional(".env")
        .env_prefix("APP_")
        .env()
        .build()?;

    HostReport::new(&host, &config)?.print()?;

    Ok(())
}
