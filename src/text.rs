//! Small string helpers used by the statement parser and the filter.

use std::borrow::Cow;

/// Split `value` on every separator in turn and trim each part.
///
/// An empty (or blank) input yields no parts at all.
pub fn trim_split(value: &str, separators: &[&str]) -> Vec<String> {
    let value = value.trim();
    if value.is_empty() {
        return vec![];
    }
    let mut parts = vec![value.to_string()];
    for sep in separators {
        parts = parts
            .iter()
            .flat_map(|part| part.split(sep).map(str::to_string).collect::<Vec<_>>())
            .collect();
    }
    parts.into_iter().map(|p| p.trim().to_string()).collect()
}

/// Strip one pair of matching single or double quotes.
pub fn unquote(s: &str) -> &str {
    if s.len() < 2 {
        return s;
    }
    for quote in ['"', '\''] {
        if s.starts_with(quote) && s.ends_with(quote) {
            return &s[1..s.len() - 1];
        }
    }
    s
}

/// Strip `prefix` and `suffix` if both are present.
pub fn unwrap<'a>(s: &'a str, prefix: &str, suffix: &str) -> &'a str {
    if s.len() >= prefix.len() + suffix.len()
        && let Some(inner) = s.strip_prefix(prefix).and_then(|s| s.strip_suffix(suffix))
    {
        return inner;
    }
    s
}

/// Quote `name` if the statement parser would otherwise split it.
pub fn quote(name: &str) -> Cow<'_, str> {
    let plain = !name.is_empty()
        && !name.starts_with(['\'', '"'])
        && !name.contains("->")
        && !name.contains(|c: char| c.is_whitespace() || matches!(c, ',' | ':' | '|'));
    if plain {
        return Cow::Borrowed(name);
    }
    let q = if name.contains('\'') { '"' } else { '\'' };
    Cow::Owned(format!("{q}{name}{q}"))
}

/// Split `s` wherever `separator_at` finds a separator outside quotes.
///
/// `separator_at(s, i)` returns the byte length of a separator starting at
/// `i`. A quote without a matching closing quote is an ordinary character.
/// The parts borrow from `s` and are not trimmed.
pub fn split_outside_quotes<F>(s: &str, separator_at: F) -> Vec<&str>
where
    F: Fn(&str, usize) -> Option<usize>,
{
    let mut parts = Vec::new();
    let mut start = 0;
    let mut quote = None;
    for (i, c) in s.char_indices() {
        if i < start {
            continue;
        }
        match quote {
            Some(q) => {
                if c == q {
                    quote = None;
                }
            }
            None if matches!(c, '\'' | '"') && s[i + 1..].contains(c) => quote = Some(c),
            None => {
                if let Some(len) = separator_at(s, i) {
                    parts.push(&s[start..i]);
                    start = i + len;
                }
            }
        }
    }
    parts.push(&s[start..]);
    parts
}

/// Split on `sep` outside quotes and trim each part.
pub fn split_unquoted(s: &str, sep: char) -> Vec<&str> {
    split_outside_quotes(s, |s, i| s[i..].starts_with(sep).then_some(sep.len_utf8()))
        .into_iter()
        .map(str::trim)
        .collect()
}

/// Split off the first whitespace-separated token of `s`.
///
/// A token that opens with a quote runs to the closing quote, spaces
/// included. The rest is returned with leading whitespace removed.
pub fn split_token(s: &str) -> (&str, &str) {
    let s = s.trim_start();
    let quoted_end = match s.chars().next() {
        Some(q @ ('\'' | '"')) => s[1..].find(q).map(|j| j + 2),
        _ => None,
    };
    let end = quoted_end
        .or_else(|| s.find(char::is_whitespace))
        .unwrap_or(s.len());
    (&s[..end], s[end..].trim_start())
}
