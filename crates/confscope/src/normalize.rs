//! Flattening the provider stack into the list the report cites.

use crate::macros::{debug, warning};
use crate::provider::{Provider, ProviderDetails};

/// A provider in the normalized list.
#[derive(Clone, Copy, Debug)]
pub struct ProviderEntry<'a> {
    /// 1-based citation number; also the precedence order (higher wins).
    pub index: usize,
    /// The provider itself.
    pub provider: &'a dyn Provider,
}

/// Flattens `providers` in override order.
///
/// Chained providers are replaced in place by their inner providers,
/// recursively. A chained provider that cannot list its inner providers is
/// kept as one opaque entry. With `ignore_global_environment`, environment
/// providers without a prefix are dropped. Indices are assigned afterwards,
/// starting at 1.
pub fn normalize(
    providers: &[Box<dyn Provider>],
    ignore_global_environment: bool,
) -> Vec<ProviderEntry<'_>> {
    let mut stack: Vec<&dyn Provider> = providers.iter().rev().map(AsRef::as_ref).collect();
    let mut entries = Vec::with_capacity(providers.len());

    while let Some(provider) = stack.pop() {
        let details = provider.details();

        match details {
            ProviderDetails::Chained(Some(inner)) => {
                debug!(
                    provider = provider.kind_name(),
                    inner = inner.len(),
                    "expanding chained provider"
                );
                stack.extend(inner.iter().rev().map(AsRef::as_ref));
                continue;
            }
            ProviderDetails::Chained(None) => {
                warning!(
                    provider = provider.kind_name(),
                    "chained provider cannot be expanded; keeping it opaque"
                );
            }
            _ if ignore_global_environment && details.is_global_environment() => {
                debug!(
                    provider = provider.kind_name(),
                    "skipping unprefixed environment provider"
                );
                continue;
            }
            _ => {}
        }

        entries.push(ProviderEntry {
            index: entries.len() + 1,
            provider,
        });
    }

    debug!(providers = entries.len(), "normalized provider list");

    entries
}
