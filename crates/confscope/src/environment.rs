//! Facts about the hosting process, shown in the environment table.

use std::env;
use std::fmt::{self, Display, Formatter};
use std::path::PathBuf;

/// Environment name used when none is configured.
pub const DEFAULT_ENVIRONMENT: &str = "Production";

const RUSTC_DESCRIPTION: &str = env!("CONFSCOPE_RUSTC_DESCRIPTION");
const TARGET: &str = env!("CONFSCOPE_TARGET");

/// Processor architecture of the running process.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Architecture {
    /// 32-bit x86.
    X86,
    /// x86-64.
    X64,
    /// 32-bit ARM.
    Arm,
    /// AArch64.
    Arm64,
    /// WebAssembly.
    Wasm,
    /// Anything else.
    Other,
}

impl Architecture {
    /// Architecture this binary was compiled for.
    pub fn current() -> Self {
        Self::from_arch(env::consts::ARCH)
    }

    /// Maps a `std::env::consts::ARCH` value.
    pub fn from_arch(arch: &str) -> Self {
        match arch {
            "x86" => Architecture::X86,
            "x86_64" => Architecture::X64,
            "arm" => Architecture::Arm,
            "aarch64" => Architecture::Arm64,
            "wasm32" | "wasm64" => Architecture::Wasm,
            _ => Architecture::Other,
        }
    }
}

impl Display for Architecture {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Architecture::X86 => "X86",
            Architecture::X64 => "X64",
            Architecture::Arm => "Arm",
            Architecture::Arm64 => "Arm64",
            Architecture::Wasm => "Wasm",
            Architecture::Other => "Other",
        })
    }
}

/// The toolchain the process was built with.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RuntimeInfo {
    /// Runtime identifier, e.g. `rustc`.
    pub identifier: String,
    /// Runtime version, e.g. `1.91.1`.
    pub version: String,
    /// Build profile, e.g. `release`.
    pub profile: String,
}

impl RuntimeInfo {
    /// Facts captured when this crate was compiled.
    pub fn current() -> Self {
        let mut words = RUSTC_DESCRIPTION.split_whitespace();
        let identifier = words.next().unwrap_or("rustc").to_string();
        let version = words.next().unwrap_or_default().to_string();

        Self {
            identifier,
            version,
            profile: if cfg!(debug_assertions) { "debug" } else { "release" }.to_string(),
        }
    }
}

/// Read-only facts about the host.
///
/// Every field is public so hosts with their own notion of these facts can
/// fill them directly; [`detect`](Self::detect) covers the common case.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HostEnvironment {
    /// Application name.
    pub application_name: String,
    /// Application version.
    pub application_version: String,
    /// Environment name, e.g. `Development`.
    pub environment_name: String,
    /// Directory the application considers its root.
    pub content_root: PathBuf,
    /// Process architecture.
    pub architecture: Architecture,
    /// Toolchain identity.
    pub runtime: RuntimeInfo,
    /// Free-form runtime description, e.g. `rustc 1.91.1 (ed61e7d7e 2025-11-07)`.
    pub runtime_description: String,
    /// Operating system description.
    pub os_description: String,
}

impl HostEnvironment {
    /// Detects process facts for the named application.
    ///
    /// The environment name defaults to [`DEFAULT_ENVIRONMENT`] and the
    /// content root to the current directory.
    pub fn detect(name: impl Into<String>, version: impl Into<String>) -> Self {
        let runtime = RuntimeInfo::current();
        let runtime_description = if RUSTC_DESCRIPTION.is_empty() {
            format!("{} {}", runtime.identifier, runtime.version)
                .trim()
                .to_string()
        } else {
            RUSTC_DESCRIPTION.to_string()
        };

        Self {
            application_name: name.into(),
            application_version: version.into(),
            environment_name: DEFAULT_ENVIRONMENT.to_string(),
            content_root: env::current_dir().unwrap_or_default(),
            architecture: Architecture::current(),
            runtime,
            runtime_description,
            os_description: os_description(),
        }
    }

    /// Sets the environment name.
    #[must_use]
    pub fn with_environment(mut self, name: impl Into<String>) -> Self {
        self.environment_name = name.into();

        self
    }

    /// Sets the content root.
    #[must_use]
    pub fn with_content_root(mut self, path: impl Into<PathBuf>) -> Self {
        self.content_root = path.into();

        self
    }

    /// Target triple this binary was compiled for.
    pub fn target() -> &'static str {
        TARGET
    }
}

/// Operating system description: `PRETTY_NAME` from `/etc/os-release` when
/// present, otherwise the OS family with the target triple.
fn os_description() -> String {
    #[cfg(target_os = "linux")]
    if let Some(name) = std::fs::read_to_string("/etc/os-release")
        .ok()
        .and_then(|content| pretty_name(&content))
    {
        return name;
    }

    if TARGET.is_empty() {
        env::consts::OS.to_string()
    } else {
        format!("{} ({TARGET})", env::consts::OS)
    }
}

/// Extracts `PRETTY_NAME` from os-release content.
#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
fn pretty_name(content: &str) -> Option<String> {
    content.lines().find_map(|line| {
        let value = line.trim().strip_prefix("PRETTY_NAME=")?;
        let value = value.trim_matches(|c| c == '"' || c == '\'');
        (!value.is_empty()).then(|| value.to_string())
    })
}
