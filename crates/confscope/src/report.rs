//! The host report.
//!
//! A [`HostReport`] turns environment facts, the normalized provider list and
//! the key tree into [`Section`]s:
//!
//! 1. `🌳 Environment Details` rule and the environment table
//! 2. `🔧 Configuration Details` rule, the provider table and the key tree
//! 3. a closing rule
//!
//! Parts 1 and 2 are controlled by [`ReportOptions`]. Part 2 is skipped when
//! the configuration does not expose its providers.

use std::path::Path;

use crate::config::Configuration;
use crate::environment::HostEnvironment;
use crate::normalize::{self, ProviderEntry};
use crate::options::ReportOptions;
use crate::provider::ProviderDetails;
use crate::render::{
    Border, Column, Decoration, Justify, Label, Paragraph, Renderer, Section, Span, Style, Table,
    TerminalRenderer, Tree, TreeItem,
};
use crate::resolve::ValueContribution;
use crate::tree::{self, KeyNode};
use crate::value::{self, FormattedValue, Fragment};
use crate::Error;

/// Title of the environment section.
pub const ENVIRONMENT_TITLE: &str = "🌳 Environment Details";

/// Title of the configuration section.
pub const CONFIGURATION_TITLE: &str = "🔧 Configuration Details";

/// Label of the key tree's root.
pub const TREE_ROOT: &str = "Root";

/// Shown for environment providers without a prefix.
pub const NO_PREFIX: &str = "(none)";

const TREE_PADDING: usize = 2;

/// Diagnostic report over a configuration and its host.
///
/// # Example
///
/// ```
/// use confscope::{ConfigBuilder, HostEnvironment, HostReport, TerminalRenderer};
///
/// let config = ConfigBuilder::new()
///     .in_memory([("Db:Password", "hunter2"), ("Db:Port", "5432")])
///     .build()?;
/// let host = HostEnvironment::detect("svc", "1.0.0");
///
/// let mut renderer = TerminalRenderer::plain(Vec::new());
/// HostReport::new(&host, &config)?.display(&mut renderer)?;
///
/// let out = String::from_utf8(renderer.into_inner()).unwrap();
/// assert!(out.contains("*****"));
/// assert!(!out.contains("hunter2"));
/// # Ok::<(), confscope::Error>(())
/// ```
#[derive(Clone, Copy)]
pub struct HostReport<'a> {
    host: &'a HostEnvironment,
    config: &'a dyn Configuration,
    options: ReportOptions,
}

impl<'a> HostReport<'a> {
    /// Creates a report, reading [`ReportOptions`] from the configuration's
    /// `HostInfo` section.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Bind`] if the `HostInfo` section is invalid.
    pub fn new(host: &'a HostEnvironment, config: &'a dyn Configuration) -> Result<Self, Error> {
        let options = ReportOptions::from_config(config)?;

        Ok(Self::with_options(host, config, options))
    }

    /// Creates a report with explicit options.
    pub fn with_options(
        host: &'a HostEnvironment,
        config: &'a dyn Configuration,
        options: ReportOptions,
    ) -> Self {
        Self {
            host,
            config,
            options,
        }
    }

    /// The options in effect.
    pub fn options(&self) -> &ReportOptions {
        &self.options
    }

    /// The normalized providers, or `None` if the configuration does not
    /// expose them.
    pub fn providers(&self) -> Option<Vec<ProviderEntry<'a>>> {
        let config: &'a dyn Configuration = self.config;

        config
            .providers()
            .map(|providers| normalize::normalize(providers, self.options.ignore_global_environment))
    }

    /// The resolved key tree, or `None` if the configuration does not
    /// expose its providers.
    pub fn key_tree(&self) -> Option<KeyNode> {
        self.providers()
            .map(|entries| tree::build(&entries, self.config))
    }

    /// The report as renderable sections.
    pub fn sections(&self) -> Vec<Section> {
        let mut sections = Vec::new();

        if self.options.display_environment {
            sections.push(Section::Rule(Some(ENVIRONMENT_TITLE.to_string())));
            sections.push(Section::Table(self.environment_table()));
        }

        if self.options.display_config
            && let Some(entries) = self.providers()
        {
            let root = tree::build(&entries, self.config);

            sections.push(Section::Rule(Some(CONFIGURATION_TITLE.to_string())));
            sections.push(Section::Table(self.provider_table(&entries)));
            sections.push(Section::Tree(self.tree(&root)));
        }

        sections.push(Section::Rule(None));
        sections
    }

    /// Draws the report.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Render`] if the renderer fails to write.
    pub fn display(&self, renderer: &mut dyn Renderer) -> Result<(), Error> {
        for section in self.sections() {
            renderer.section(&section)?;
        }

        Ok(())
    }

    /// Draws the report to stdout.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Render`] if stdout cannot be written.
    pub fn print(&self) -> Result<(), Error> {
        self.display(&mut TerminalRenderer::stdout())
    }

    fn environment_table(&self) -> Table {
        let host = self.host;
        let runtime = &host.runtime;

        let mut table = Table::new(vec![
            Column::new(Span::new("Key", Style::Header)).justify(Justify::Right),
            Column::new(Span::new("Value", Style::Header)),
        ])
        .hide_headers();

        let framework: Paragraph = [
            runtime.identifier.as_str(),
            ",Version=",
            runtime.version.as_str(),
            ",Profile=",
            runtime.profile.as_str(),
        ]
        .into_iter()
        .flat_map(|part| spans(&value::classify_inline(part), Decoration::NONE))
        .collect();

        let rows = [
            ("App Name", Paragraph::styled(&host.application_name, Style::Value)),
            ("App Version", Paragraph::styled(&host.application_version, Style::Number)),
            ("Environment", Paragraph::styled(&host.environment_name, Style::Value)),
            ("Content Root", self.format(&host.content_root.display().to_string(), Decoration::NONE)),
            ("Architecture", Paragraph::styled(host.architecture.to_string(), Style::Value)),
            ("Framework Version", framework),
            ("Runtime Name", Paragraph::styled(&host.runtime_description, Style::Value)),
            ("Runtime Version", Paragraph::styled(&runtime.version, Style::Number)),
            ("Operating System", Paragraph::styled(&host.os_description, Style::Value)),
        ];

        for (key, value) in rows {
            table.add_row(vec![Paragraph::styled(key, Style::Key), value]);
        }

        table
    }

    fn provider_table(&self, entries: &[ProviderEntry<'_>]) -> Table {
        let mut table = Table::new(vec![
            Column::new(Span::new("#", Style::Header)),
            Column::new(Span::new("Type", Style::Header)),
            Column::new(Span::new("Info", Style::Header)),
        ]);

        for entry in entries {
            table.add_row(vec![
                self.format(&entry.index.to_string(), Decoration::NONE),
                Paragraph::styled(entry.provider.kind_name(), Style::Value),
                self.provider_info(entry.provider.details()),
            ]);
        }

        table
    }

    fn provider_info(&self, details: ProviderDetails<'_>) -> Paragraph {
        let mut info = Paragraph::new();

        match details {
            ProviderDetails::File(file) => {
                let shown = relative_to(&file.full_path, &self.host.content_root);
                info.push(
                    Span::new(shown, Style::SecondaryValue).linked(file_url(&file.full_path)),
                );
                info.extend(flag("Present", file.exists()));
                info.extend(flag("Optional", file.optional));
            }
            ProviderDetails::Environment { prefix } => {
                info.push(Span::new("Prefix", Style::Key));
                info.push(Span::plain(" = "));
                info.push(Span::new(
                    prefix.filter(|p| !p.is_empty()).unwrap_or(NO_PREFIX),
                    Style::Value,
                ));
            }
            ProviderDetails::Chained(_) | ProviderDetails::Memory | ProviderDetails::Other => {}
        }

        info
    }

    fn tree(&self, root: &KeyNode) -> Tree {
        Tree {
            root: Paragraph::styled(TREE_ROOT, Style::Header),
            children: root
                .children
                .iter()
                .filter_map(|node| self.tree_item(node))
                .collect(),
            padding: TREE_PADDING,
        }
    }

    /// A node is shown iff it has values or children.
    fn tree_item(&self, node: &KeyNode) -> Option<TreeItem> {
        if node.values.is_empty() && node.children.is_empty() {
            return None;
        }

        let label = match node.values.winner() {
            None => Label::Text(Paragraph::from(
                Span::new(&node.name, Style::Key).decorated(Decoration::DIM),
            )),
            Some(winner) => Label::Table(self.value_table(node, winner)),
        };

        Some(TreeItem {
            label,
            children: node
                .children
                .iter()
                .filter_map(|child| self.tree_item(child))
                .collect(),
        })
    }

    fn value_table(&self, node: &KeyNode, winner: &ValueContribution) -> Table {
        let mut table = Table::new(vec![
            Column::new(Paragraph::new()),
            Column::new(Span::plain("Key")),
            Column::new(Paragraph::new()),
            Column::new(Span::plain("Value")),
        ])
        .hide_headers()
        .border(Border::None);

        table.add_row(vec![
            citation(winner.provider_index),
            Paragraph::styled(&node.name, Style::Key),
            Paragraph::from(Span::plain("=")),
            self.node_value(&node.name, &winner.value, Decoration::NONE),
        ]);

        for overridden in node.values.overridden() {
            table.add_row(vec![
                citation(overridden.provider_index),
                Paragraph::new(),
                Paragraph::new(),
                self.node_value(&node.name, &overridden.value, Decoration::OVERRIDDEN),
            ]);
        }

        table
    }

    fn node_value(&self, key: &str, raw: &str, decoration: Decoration) -> Paragraph {
        let shown = value::redact(key, raw, self.options.redact_secrets);
        self.format(&shown, decoration)
    }

    fn format(&self, raw: &str, decoration: Decoration) -> Paragraph {
        spans(
            &value::classify(raw, self.options.redact_secrets),
            decoration,
        )
        .into_iter()
        .collect()
    }
}

/// Styled spans for a classified value.
pub fn spans(value: &FormattedValue, decoration: Decoration) -> Vec<Span> {
    let spans = match value {
        FormattedValue::Number(text) => vec![Span::new(text, Style::Number)],
        FormattedValue::Boolean(text) => vec![Span::new(text, Style::Boolean)],
        FormattedValue::Pairs(fragments) => fragments
            .iter()
            .flat_map(|fragment| match fragment {
                Fragment::Pair { key, value } => vec![
                    Span::new(key, Style::Key),
                    Span::plain("="),
                    Span::new(value, Style::Value),
                    Span::plain(";"),
                ],
                Fragment::Text(text) => vec![Span::plain(text)],
            })
            .collect(),
        FormattedValue::Link { text, target } => {
            vec![Span::new(text, Style::SecondaryValue).linked(target)]
        }
        FormattedValue::Literal(text) => vec![Span::new(format!("\"{text}\""), Style::Value)],
        FormattedValue::Plain(text) => vec![Span::new(text, Style::Value)],
    };

    spans
        .into_iter()
        .map(|span| span.decorated(decoration))
        .collect()
}

fn citation(index: usize) -> Paragraph {
    Paragraph::new()
        .with(Span::new(index.to_string(), Style::SecondaryValue))
        .with(Span::plain("|"))
}

fn flag(name: &str, value: bool) -> [Span; 4] {
    [
        Span::plain(", "),
        Span::new(name, Style::Key),
        Span::plain("="),
        Span::new(value.to_string(), Style::Boolean),
    ]
}

fn relative_to(path: &Path, base: &Path) -> String {
    path.strip_prefix(base)
        .unwrap_or(path)
        .display()
        .to_string()
}

fn file_url(path: &Path) -> String {
    let text = path.display().to_string().replace(' ', "%20");
    if text.starts_with('/') {
        format!("file://{text}")
    } else {
        format!("file:///{}", text.replace('\\', "/"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigBuilder, ConfigRoot, ConfigSection};
    use crate::environment::{Architecture, RuntimeInfo};
    use std::path::PathBuf;

    fn host() -> HostEnvironment {
        HostEnvironment {
            application_name: "svc".to_string(),
            application_version: "1.2.0".to_string(),
            environment_name: "Development".to_string(),
            content_root: PathBuf::from("/srv/svc"),
            architecture: Architecture::X64,
            runtime: RuntimeInfo {
                identifier: "rustc".to_string(),
                version: "1.91.1".to_string(),
                profile: "release".to_string(),
            },
            runtime_description: "rustc 1.91.1".to_string(),
            os_description: "Linux".to_string(),
        }
    }

    fn config() -> ConfigRoot {
        ConfigBuilder::new()
            .in_memory([
                ("Logging:Level", "Information"),
                ("Db", "Server=a;Password=p1;"),
                ("ApiKey", "abc"),
                ("Port", "80"),
            ])
            .env_vars(None, [("Port", "1")])
            .env_vars(Some("APP_"), [("APP_Port", "8080")])
            .build()
            .expect("no files")
    }

    fn plain(report: &HostReport<'_>) -> String {
        let mut renderer = TerminalRenderer::plain(Vec::new());
        report.display(&mut renderer).expect("write");
        String::from_utf8(renderer.into_inner()).expect("utf-8")
    }

    fn section_kinds(sections: &[Section]) -> Vec<&'static str> {
        sections
            .iter()
            .map(|s| match s {
                Section::Rule(_) => "rule",
                Section::Table(_) => "table",
                Section::Tree(_) => "tree",
            })
            .collect()
    }

    #[test]
    fn test_full_report_sections() {
        let host = host();
        let config = config();
        let report = HostReport::new(&host, &config).expect("options");

        assert_eq!(
            section_kinds(&report.sections()),
            ["rule", "table", "rule", "table", "tree", "rule"]
        );
    }

    #[test]
    fn test_options_hide_sections() {
        let host = host();
        let config = config();
        let options = ReportOptions {
            display_environment: false,
            display_config: false,
            ..ReportOptions::default()
        };

        let report = HostReport::with_options(&host, &config, options);
        assert_eq!(section_kinds(&report.sections()), ["rule"]);
    }

    #[test]
    fn test_section_view_skips_configuration() {
        let host = host();
        let config = config();
        let section: ConfigSection<'_> = config.section("Logging");

        let report = HostReport::new(&host, &section).expect("options");
        assert!(report.providers().is_none());
        assert_eq!(section_kinds(&report.sections()), ["rule", "table", "rule"]);
    }

    #[test]
    fn test_global_environment_hidden_by_default() {
        let host = host();
        let config = config();
        let report = HostReport::new(&host, &config).expect("options");

        let entries = report.providers().expect("root");
        assert_eq!(entries.len(), 2);

        let tree = report.key_tree().expect("root");
        let port = tree.find("Port").expect("port");
        assert_eq!(port.values.winner().map(|c| c.value.as_str()), Some("8080"));
        assert_eq!(port.values.winner().map(|c| c.provider_index), Some(2));
    }

    #[test]
    fn test_plain_render() {
        let host = host();
        let config = config();
        let out = plain(&HostReport::new(&host, &config).expect("options"));

        assert!(out.contains(ENVIRONMENT_TITLE));
        assert!(out.contains("│          App Name │ svc"), "{out}");
        assert!(out.contains("│ Framework Version │ rustc,Version=1.91.1,Profile=release"), "{out}");
        assert!(out.contains("│ 1 │ MemoryProvider"), "{out}");
        assert!(out.contains("│ 2 │ EnvironmentVariablesProvider │ Prefix = APP_"), "{out}");
        assert!(out.contains("Db = Server=a;Password=*****;"), "{out}");
        assert!(out.contains("ApiKey = \"*****\""), "{out}");
        assert!(out.contains("Level = \"Information\""), "{out}");
        assert!(out.contains("2| Port = 8080"), "{out}");
        assert!(out.contains("1|        80"), "{out}");
        assert!(!out.contains("p1"));
        assert!(!out.contains("abc"));
    }

    #[test]
    fn test_redaction_can_be_disabled() {
        let host = host();
        let config = ConfigBuilder::new()
            .in_memory([("Secret", "s3"), ("HostInfo:RedactSecrets", "false")])
            .build()
            .expect("build");

        let out = plain(&HostReport::new(&host, &config).expect("options"));
        assert!(out.contains("Secret = \"s3\""), "{out}");
    }

    #[test]
    fn test_overridden_values_are_decorated() {
        let host = host();
        let config = config();
        let report = HostReport::new(&host, &config).expect("options");
        let tree = report.key_tree().expect("root");
        let port = tree.find("Port").expect("port");

        let winner = port.values.winner().expect("winner");
        let table = report.value_table(port, winner);

        assert_eq!(table.rows.len(), 2);
        assert!(table.rows[0][3].spans.iter().all(|s| s.decoration == Decoration::NONE));
        assert!(table.rows[1][3].spans.iter().all(|s| s.decoration == Decoration::OVERRIDDEN));
    }

    #[test]
    fn test_file_provider_info() {
        let dir = tempfile::tempdir().expect("temp dir");
        std::fs::write(dir.path().join("appsettings.json"), "{}").expect("write");

        let config = ConfigBuilder::new()
            .base_path(dir.path())
            .file("appsettings.json")
            .file_optional("missing.json")
            .build()
            .expect("build");
        let host = host().with_content_root(dir.path());
        let report = HostReport::new(&host, &config).expect("options");

        let entries = report.providers().expect("root");
        let info = report.provider_info(entries[0].provider.details());
        assert_eq!(info.text(), "appsettings.json, Present=true, Optional=false");
        assert!(info.spans[0].link.as_deref().is_some_and(|l| l.starts_with("file://")));

        let info = report.provider_info(entries[1].provider.details());
        assert_eq!(info.text(), "missing.json, Present=false, Optional=true");
    }

    #[test]
    fn test_branches_without_values_are_kept() {
        let host = host();
        let config = ConfigBuilder::new()
            .in_memory([("Keep:Me", "1")])
            .env_vars(None, [("Drop__Me", "x")])
            .build()
            .expect("build");

        let report = HostReport::new(&host, &config).expect("options");
        let tree = report.key_tree().expect("root");
        assert!(tree.find("Drop:Me").is_some_and(|n| n.values.is_empty()));

        let items = tree_items(&report);
        let label = |item: &TreeItem| match &item.label {
            Label::Text(text) => text.text(),
            Label::Table(_) => String::new(),
        };
        let drop = items.iter().find(|i| label(i) == "Drop").expect("drop branch");
        assert!(drop.children.is_empty());
        let keep = items.iter().find(|i| label(i) == "Keep").expect("keep branch");
        assert_eq!(keep.children.len(), 1);

        assert!(plain(&report).contains("Drop"));
    }

    fn tree_items(report: &HostReport<'_>) -> Vec<TreeItem> {
        report
            .sections()
            .into_iter()
            .find_map(|s| match s {
                Section::Tree(tree) => Some(tree.children),
                _ => None,
            })
            .expect("tree section")
    }

    #[test]
    fn test_empty_key_segments_render() {
        let host = host();
        let config = ConfigBuilder::new()
            .in_memory([("A", "1"), ("::", "deep")])
            .env_vars(None, [("__", "x")])
            .build()
            .expect("build");
        let options = ReportOptions {
            ignore_global_environment: false,
            ..ReportOptions::default()
        };

        let report = HostReport::with_options(&host, &config, options);
        assert_eq!(
            section_kinds(&report.sections()),
            ["rule", "table", "rule", "table", "tree", "rule"]
        );

        let out = plain(&report);
        assert!(out.contains("\"deep\""), "{out}");
        assert!(out.contains("\"x\""), "{out}");
    }
}
