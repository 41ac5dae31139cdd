//! Example: a shared base configuration chained into a service's own.
//!
//! The report cites the providers of the shared root individually, in the
//! position the chained layer occupies.
//!
//! Run with:
//!   `cargo run --example chained`

use std::sync::Arc;

use confscope::{ConfigBuilder, ConfigRoot, HostEnvironment, HostReport};

fn main() -> miette::Result<()> {
    let shared = ConfigRoot::builder()
        .in_memory([
            ("Telemetry:Endpoint", "https://otel.example.com:4317"),
            ("Telemetry:SampleRate", "0.25"),
            ("Telemetry:ApiKey", "tk-0001"),
        ])
        .env_vars(Some("SHARED_"), [("SHARED_Telemetry__SampleRate", "1.0")])
        .build()?;

    let config = ConfigBuilder::new()
        .in_memory([("Telemetry:Enabled", "true"), ("Telemetry:SampleRate", "0.5")])
        .chained(Arc::new(shared))
        .in_memory([("Telemetry:Enabled", "False")])
        .build()?;

    let host = HostEnvironment::detect("chained-demo", env!("CARGO_PKG_VERSION"));

    HostReport::new(&host, &config)?.print()?;

    Ok(())
}
