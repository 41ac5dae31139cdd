//! Tests that read the real process environment.
//!
//! These mutate process-wide state and are serialized with `serial_test`.

use std::env;
use std::panic::{self, AssertUnwindSafe};

use confscope::provider::{EnvProvider, Provider, ProviderDetails};
use confscope::{ConfigBuilder, Configuration, HostEnvironment, HostReport, TerminalRenderer};
use serial_test::serial;

/// Runs `test` with `vars` set, restoring the previous values afterwards,
/// even on panic.
fn with_env_vars<F, R>(vars: &[(&str, &str)], test: F) -> R
where
    F: FnOnce() -> R,
{
    // SAFETY: every test in this file is #[serial]
    let originals: Vec<_> = vars
        .iter()
        .map(|(k, v)| {
            let original = env::var(k).ok();
            unsafe { env::set_var(k, v) };
            (*k, original)
        })
        .collect();

    let result = panic::catch_unwind(AssertUnwindSafe(test));

    for (key, original) in originals {
        match original {
            Some(val) => unsafe { env::set_var(key, val) },
            None => unsafe { env::remove_var(key) },
        }
    }

    match result {
        Ok(r) => r,
        Err(e) => panic::resume_unwind(e),
    }
}

#[test]
#[serial]
fn prefixed_snapshot_strips_prefix_and_nests() {
    with_env_vars(
        &[
            ("CSTEST_Db__Host", "db.internal"),
            ("CSTEST_PORT", "5432"),
            ("CSTESTX_OTHER", "nope"),
        ],
        || {
            let provider = EnvProvider::with_prefix("CSTEST_");

            assert_eq!(provider.try_get("db:host").as_deref(), Some("db.internal"));
            assert_eq!(provider.try_get("Port").as_deref(), Some("5432"));
            assert_eq!(provider.try_get("OTHER"), None);
            assert_eq!(provider.child_keys(None).len(), 2);
            assert!(matches!(
                provider.details(),
                ProviderDetails::Environment { prefix: Some("CSTEST_") }
            ));
        },
    );
}

#[test]
#[serial]
fn snapshot_is_taken_at_creation() {
    with_env_vars(&[("CSTEST_LATE", "before")], || {
        let provider = EnvProvider::with_prefix("CSTEST_");

        // SAFETY: serialized
        unsafe { env::set_var("CSTEST_LATE", "after") };

        assert_eq!(provider.try_get("LATE").as_deref(), Some("before"));
    });
}

#[test]
#[serial]
fn whole_environment_is_global() {
    with_env_vars(&[("CSTEST_GLOBAL", "1")], || {
        let provider = EnvProvider::new();

        assert_eq!(provider.try_get("CSTEST_GLOBAL").as_deref(), Some("1"));
        assert!(provider.details().is_global_environment());
    });
}

#[test]
#[serial]
fn env_layer_overrides_files_in_report() {
    with_env_vars(
        &[
            ("CSTEST_Api__Secret", "s3cr3t"),
            ("CSTEST_Api__Timeout", "30"),
        ],
        || {
            let config = ConfigBuilder::new()
                .in_memory([("Api:Timeout", "10"), ("Api:Url", "https://api.example.com")])
                .env_prefix("CSTEST_")
                .env()
                .build()
                .expect("build");

            assert_eq!(config.get("api:timeout").as_deref(), Some("30"));

            let host = HostEnvironment::detect("env-test", "0.1.0");
            let report = HostReport::new(&host, &config).expect("options");

            let entries = report.providers().expect("providers");
            assert_eq!(entries.len(), 2, "unprefixed environment is hidden");

            let mut renderer = TerminalRenderer::plain(Vec::new());
            report.display(&mut renderer).expect("render");
            let out = String::from_utf8(renderer.into_inner()).expect("utf-8");

            assert!(out.contains("Prefix = CSTEST_"), "{out}");
            assert!(out.contains("2| Secret = \"*****\""), "{out}");
            assert!(out.contains("2| Timeout = 30"), "{out}");
            assert!(!out.contains("s3cr3t"));
        },
    );
}
