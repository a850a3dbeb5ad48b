use regex::Regex;
use std::{cmp::min, sync::OnceLock};
use syn::Path;

pub fn matches_path(path: &Path, expect: &[&str]) -> bool {
    let len = min(path.segments.len(), expect.len());
    path.segments
        .iter()
        .rev()
        .take(len)
        .map(|v| &v.ident)
        .eq(expect.iter().rev().take(len))
}

pub fn separated_by<T, F>(
    out: &mut String,
    values: impl IntoIterator<Item = T>,
    mut f: F,
    separator: &str,
) where
    F: FnMut(&mut String, T),
{
    let mut first = true;
    for v in values {
        let start = out.len();
        if !first {
            out.push_str(separator);
        }
        let len = out.len();
        f(out, v);
        // A step that wrote nothing takes its separator back.
        if out.len() == len {
            out.truncate(start);
        } else {
            first = false;
        }
    }
}

fn alias_regex() -> &'static Regex {
    static ALIAS_RE: OnceLock<Regex> = OnceLock::new();
    ALIAS_RE.get_or_init(|| Regex::new(r"(.*)\s+as\s+(.*)").expect("invalid built-in alias regex"))
}

/// Splits `"name as alias"` into its two parts, the alias is empty when absent.
pub fn split_alias(value: &str) -> (String, String) {
    match alias_regex().captures(value) {
        Some(captures) => (
            captures[1].trim().to_string(),
            captures[2].trim().to_string(),
        ),
        None => (value.trim().to_string(), String::new()),
    }
}

/// Accepts the same spellings as a boolean tag attribute.
pub fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "" | "1" | "t" | "T" | "true" | "TRUE" | "True" => Some(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Some(false),
        _ => None,
    }
}

/// Longest prefix of `value` within `max` bytes that ends on a char boundary.
pub fn truncate_at(value: &str, max: usize) -> &str {
    if value.len() <= max {
        return value;
    }
    let end = value
        .char_indices()
        .map(|(i, _)| i)
        .take_while(|i| *i <= max)
        .last()
        .unwrap_or_default();
    &value[..end]
}

#[macro_export]
macro_rules! truncate_long {
    ($query:expr) => {
        format_args!(
            "{}{}",
            $crate::truncate_at(&$query, 497).trim_end(),
            if $query.len() > 497 { "..." } else { "" },
        )
    };
}
