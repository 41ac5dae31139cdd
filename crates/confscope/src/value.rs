//! Value classification and secret redaction.
//!
//! Every rendered configuration value goes through [`classify`], which picks
//! the first matching rule:
//!
//! 1. invariant decimal number → [`FormattedValue::Number`]
//! 2. `true` / `false` in any case → [`FormattedValue::Boolean`]
//! 3. `key=value;` pairs, as in connection strings → [`FormattedValue::Pairs`]
//! 4. absolute URI (`https://…`, `mailto:…`, `urn:…`) or filesystem path →
//!    [`FormattedValue::Link`]
//! 5. anything else → [`FormattedValue::Literal`]
//!
//! Classification never fails.

use std::borrow::Cow;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

/// Replacement for redacted values.
pub const MASK: &str = "*****";

/// Key substrings (matched ignoring case) that mark a value as sensitive.
pub const SECRET_KEYWORDS: [&str; 3] = ["key", "password", "secret"];

/// Largest number of integer digits an invariant decimal can hold.
const MAX_DECIMAL_DIGITS: i64 = 29;

static PAIR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?<key>[^=]+)=(?<value>[^;]+);?").expect("valid regex"));

/// Returns `true` if `key` contains a [secret keyword](SECRET_KEYWORDS).
pub fn is_sensitive(key: &str) -> bool {
    let key = key.to_lowercase();
    SECRET_KEYWORDS.iter().any(|word| key.contains(word))
}

/// Replaces `value` with [`MASK`] when `enabled` and `key` is sensitive.
pub fn redact<'a>(key: &str, value: &'a str, enabled: bool) -> Cow<'a, str> {
    if enabled && is_sensitive(key) {
        Cow::Borrowed(MASK)
    } else {
        Cow::Borrowed(value)
    }
}

/// One piece of a [`FormattedValue::Pairs`] value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Fragment {
    /// A `key=value` pair; rendered as `key=value;`.
    Pair {
        /// Pair key.
        key: String,
        /// Pair value, already redacted.
        value: String,
    },
    /// Text outside any pair, rendered verbatim.
    Text(String),
}

/// A classified value, ready to style.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FormattedValue {
    /// Invariant decimal number, kept as written.
    Number(String),
    /// `true` or `false`, kept as written.
    Boolean(String),
    /// `key=value` pairs with any surrounding text.
    Pairs(Vec<Fragment>),
    /// Hyperlink.
    Link {
        /// Text shown.
        text: String,
        /// Link target.
        target: String,
    },
    /// Quoted string.
    Literal(String),
    /// Unquoted string (inline formatting only).
    Plain(String),
}

impl FormattedValue {
    /// Plain text of the value as it is displayed, without styling.
    pub fn display_text(&self) -> String {
        match self {
            FormattedValue::Number(text)
            | FormattedValue::Boolean(text)
            | FormattedValue::Plain(text) => text.clone(),
            FormattedValue::Link { text, .. } => text.clone(),
            FormattedValue::Literal(text) => format!("\"{text}\""),
            FormattedValue::Pairs(fragments) => fragments
                .iter()
                .map(|fragment| match fragment {
                    Fragment::Pair { key, value } => format!("{key}={value};"),
                    Fragment::Text(text) => text.clone(),
                })
                .collect(),
        }
    }
}

/// Classifies a raw value.
///
/// With `redact_secrets`, values of sensitive pair keys are replaced by
/// [`MASK`]. Redacting the value as a whole is the caller's job, since only
/// the caller knows its key (see [`redact`]).
///
/// ```
/// use confscope::value::{classify, Fragment, FormattedValue};
///
/// assert_eq!(classify("42", true), FormattedValue::Number("42".into()));
/// assert_eq!(classify("True", true), FormattedValue::Boolean("True".into()));
/// assert_eq!(
///     classify("Server=a;Password=p1;", true),
///     FormattedValue::Pairs(vec![
///         Fragment::Pair { key: "Server".into(), value: "a".into() },
///         Fragment::Pair { key: "Password".into(), value: "*****".into() },
///     ])
/// );
/// ```
pub fn classify(raw: &str, redact_secrets: bool) -> FormattedValue {
    if is_invariant_number(raw) {
        return FormattedValue::Number(raw.to_string());
    }

    if is_boolean(raw) {
        return FormattedValue::Boolean(raw.to_string());
    }

    if let Some(fragments) = pairs(raw, redact_secrets) {
        return FormattedValue::Pairs(fragments);
    }

    if let Some(target) = link_target(raw) {
        return FormattedValue::Link {
            text: raw.to_string(),
            target,
        };
    }

    FormattedValue::Literal(raw.to_string())
}

/// Classifies a fact for inline display: numbers and booleans are styled,
/// everything else stays plain.
pub fn classify_inline(raw: &str) -> FormattedValue {
    if is_invariant_number(raw) {
        FormattedValue::Number(raw.to_string())
    } else if is_boolean(raw) {
        FormattedValue::Boolean(raw.to_string())
    } else {
        FormattedValue::Plain(raw.to_string())
    }
}

fn is_boolean(raw: &str) -> bool {
    raw.eq_ignore_ascii_case("true") || raw.eq_ignore_ascii_case("false")
}

fn pairs(raw: &str, redact_secrets: bool) -> Option<Vec<Fragment>> {
    let mut fragments = Vec::new();
    let mut end = 0;

    for caps in PAIR_RE.captures_iter(raw) {
        let (Some(whole), Some(key), Some(value)) =
            (caps.get(0), caps.name("key"), caps.name("value"))
        else {
            continue;
        };

        if whole.start() > end {
            fragments.push(Fragment::Text(raw[end..whole.start()].to_string()));
        }

        fragments.push(Fragment::Pair {
            key: key.as_str().to_string(),
            value: redact(key.as_str(), value.as_str(), redact_secrets).into_owned(),
        });
        end = whole.end();
    }

    if fragments.is_empty() {
        return None;
    }

    if end < raw.len() {
        fragments.push(Fragment::Text(raw[end..].to_string()));
    }

    Some(fragments)
}

/// Link target for absolute URIs and absolute filesystem paths.
///
/// Drive paths such as `C:\app` are paths, not single-letter schemes.
fn link_target(raw: &str) -> Option<String> {
    if raw.is_empty() || raw.contains(char::is_control) {
        return None;
    }

    let drive = raw.as_bytes().first().is_some_and(u8::is_ascii_alphabetic)
        && matches!(raw.get(1..3), Some(":\\" | ":/"));
    if drive || Path::new(raw).is_absolute() {
        let target = raw.replace(' ', "%20");
        return Some(if target.starts_with('/') {
            format!("file://{target}")
        } else {
            format!("file:///{}", target.replace('\\', "/"))
        });
    }

    if !raw.contains(char::is_whitespace) && url::Url::parse(raw).is_ok() {
        return Some(raw.to_string());
    }

    None
}

/// Returns `true` if `text` parses as a decimal under invariant number rules:
/// surrounding whitespace, a leading or trailing sign or enclosing
/// parentheses, `,` group separators in the integer part, `.` as the decimal
/// point and an optional exponent.
pub fn is_invariant_number(text: &str) -> bool {
    let mut s = text.trim_matches(|c: char| c.is_ascii_whitespace());

    let mut signed = false;
    if let Some(inner) = s.strip_prefix('(').and_then(|s| s.strip_suffix(')')) {
        s = inner;
        signed = true;
    }

    if let Some(rest) = s.strip_prefix(['+', '-']) {
        if signed {
            return false;
        }
        s = rest;
        signed = true;
    }
    if let Some(rest) = s.strip_suffix(['+', '-']) {
        if signed {
            return false;
        }
        s = rest;
    }

    let bytes = s.as_bytes();
    let mut i = 0;

    // Integer part: digits with interior group separators.
    let mut int_digits: i64 = 0;
    let mut seen_digit = false;
    while i < bytes.len() {
        match bytes[i] {
            b'0'..=b'9' => {
                if bytes[i] != b'0' || int_digits > 0 {
                    int_digits += 1;
                }
                seen_digit = true;
            }
            b',' if seen_digit => {}
            _ => break,
        }
        i += 1;
    }

    // Fraction.
    if bytes.get(i) == Some(&b'.') {
        i += 1;
        while let Some(b'0'..=b'9') = bytes.get(i) {
            seen_digit = true;
            i += 1;
        }
    }

    if !seen_digit {
        return false;
    }

    // Exponent.
    let mut exponent: i64 = 0;
    if let Some(b'e' | b'E') = bytes.get(i) {
        i += 1;
        let negative = match bytes.get(i) {
            Some(b'-') => {
                i += 1;
                true
            }
            Some(b'+') => {
                i += 1;
                false
            }
            _ => false,
        };

        let start = i;
        while let Some(&digit @ b'0'..=b'9') = bytes.get(i) {
            exponent = exponent
                .saturating_mul(10)
                .saturating_add(i64::from(digit - b'0'));
            i += 1;
        }
        if i == start {
            return false;
        }
        if negative {
            exponent = -exponent;
        }
    }

    i == bytes.len() && int_digits.saturating_add(exponent) <= MAX_DECIMAL_DIGITS
}
