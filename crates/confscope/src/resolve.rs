//! Per-key value resolution across the normalized providers.

use crate::macros::trace;
use crate::normalize::ProviderEntry;

/// Values longer than this many characters are truncated.
pub const MAX_VALUE_CHARS: usize = 130;

/// Appended to truncated values.
pub const ELLIPSIS: &str = "...";

/// One provider's value for a key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValueContribution {
    /// The value, truncated to [`MAX_VALUE_CHARS`].
    pub value: String,
    /// Citation index of the contributing provider.
    pub provider_index: usize,
}

/// All contributions for a key, lowest precedence first.
///
/// The last contribution is the effective value.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ValueStack {
    contributions: Vec<ValueContribution>,
}

impl ValueStack {
    /// The effective value, if any provider defines the key.
    pub fn winner(&self) -> Option<&ValueContribution> {
        self.contributions.last()
    }

    /// Overridden contributions, highest precedence first.
    pub fn overridden(&self) -> impl Iterator<Item = &ValueContribution> {
        self.contributions.iter().rev().skip(1)
    }

    /// Contributions from highest to lowest precedence, winner first.
    pub fn iter(&self) -> impl Iterator<Item = &ValueContribution> {
        self.contributions.iter().rev()
    }

    /// Contributions in provider order, lowest precedence first.
    pub fn as_slice(&self) -> &[ValueContribution] {
        &self.contributions
    }

    /// Number of contributing providers.
    pub fn len(&self) -> usize {
        self.contributions.len()
    }

    /// Returns `true` if no provider defines the key.
    pub fn is_empty(&self) -> bool {
        self.contributions.is_empty()
    }
}

/// Queries every provider for `key`, in order.
pub fn resolve(providers: &[ProviderEntry<'_>], key: &str) -> ValueStack {
    let contributions: Vec<_> = providers
        .iter()
        .filter_map(|entry| {
            entry.provider.try_get(key).map(|value| ValueContribution {
                value: truncate(value),
                provider_index: entry.index,
            })
        })
        .collect();

    trace!(key, contributions = contributions.len(), "resolved key");

    ValueStack { contributions }
}

/// Cuts `value` to [`MAX_VALUE_CHARS`] characters plus [`ELLIPSIS`].
pub fn truncate(mut value: String) -> String {
    if let Some((cut, _)) = value.char_indices().nth(MAX_VALUE_CHARS) {
        value.truncate(cut);
        value.push_str(ELLIPSIS);
    }

    value
}
