//! Attribute and doc-comment helpers for Rust items.

use regex::Regex;
use std::sync::LazyLock;

use crate::types::SerdeAttrs;

static SERDE_ATTR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^#\[\s*serde\s*\((.*)\)\s*\]$").expect("valid regex"));
static DOC_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)^#\[\s*doc\s*=\s*"((?:[^"\\]|\\.)*)"\s*\]$"#).expect("valid regex")
});
static DEPRECATED_ATTR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^#\[\s*deprecated\b(.*)\]$").expect("valid regex"));
static DEPRECATED_NOTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?:\bnote\s*=\s*|^\s*=\s*)"((?:[^"\\]|\\.)*)""#).expect("valid regex")
});
static PATH_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^#\[\s*path\s*=\s*"((?:[^"\\]|\\.)*)"\s*\]$"#).expect("valid regex")
});
static CFG_TEST_ATTR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#\[\s*cfg\s*\(\s*test\s*\)\s*\]$").expect("valid regex"));

/// Doc text carried by a `///` line, if it is an outer doc comment
pub fn outer_doc_line(comment: &str) -> Option<&str> {
    let rest = comment.strip_prefix("///")?;
    if rest.starts_with('/') {
        return None;
    }
    let rest = rest.trim_end_matches(['\n', '\r']);
    Some(rest.strip_prefix(' ').unwrap_or(rest))
}

/// Lines of a `/** ... */` outer doc block
pub fn outer_doc_block(comment: &str) -> Option<Vec<String>> {
    let inner = comment.strip_prefix("/**")?.strip_suffix("*/")?;
    if inner.starts_with('*') || inner.is_empty() {
        return None;
    }
    let mut lines: Vec<String> = inner
        .lines()
        .map(|line| {
            let trimmed = line.trim_start();
            let trimmed = trimmed.strip_prefix('*').unwrap_or(trimmed);
            trimmed.strip_prefix(' ').unwrap_or(trimmed).trim_end().to_string()
        })
        .collect();
    while lines.first().is_some_and(|l| l.is_empty()) {
        lines.remove(0);
    }
    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    Some(lines)
}

/// Lines of a `#[doc = "..."]` attribute
pub fn doc_attribute(attribute: &str) -> Option<Vec<String>> {
    let caps = DOC_ATTR.captures(attribute.trim())?;
    let text = unescape(&caps[1]);
    Some(
        text.lines()
            .map(|l| l.strip_prefix(' ').unwrap_or(l).to_string())
            .collect(),
    )
}

/// Note of a `#[deprecated]` attribute; an empty string when none is given
pub fn deprecated_attribute(attribute: &str) -> Option<String> {
    let caps = DEPRECATED_ATTR.captures(attribute.trim())?;
    let args = caps.get(1).map_or("", |m| m.as_str());
    Some(
        DEPRECATED_NOTE
            .captures(args)
            .map(|c| unescape(&c[1]))
            .unwrap_or_default(),
    )
}

pub fn path_attribute(attribute: &str) -> Option<String> {
    PATH_ATTR
        .captures(attribute.trim())
        .map(|caps| unescape(&caps[1]))
}

pub fn is_cfg_test(attribute: &str) -> bool {
    CFG_TEST_ATTR.is_match(attribute.trim())
}

/// Fold every `#[serde(...)]` attribute into one set of settings
pub fn serde_attributes<'a>(attributes: impl IntoIterator<Item = &'a str>) -> SerdeAttrs {
    let mut attrs = SerdeAttrs::default();
    for attribute in attributes {
        let Some(caps) = SERDE_ATTR.captures(attribute.trim()) else {
            continue;
        };
        for item in split_top_level(&caps[1]) {
            apply_serde_item(&mut attrs, item.trim());
        }
    }
    attrs
}

fn apply_serde_item(attrs: &mut SerdeAttrs, item: &str) {
    let key_end = item.find(['=', '(']).unwrap_or(item.len());
    let key = item[..key_end].trim();
    let rest = item[key_end..].trim();

    match key {
        "skip" | "skip_serializing" => attrs.skip = true,
        "flatten" => attrs.flatten = true,
        "transparent" => attrs.transparent = true,
        "rename" => attrs.rename = serialize_value(rest),
        "rename_all" => attrs.rename_all = serialize_value(rest),
        _ => {}
    }
}

/// Value of `= "x"` or the `serialize = "x"` entry of `(...)`
fn serialize_value(rest: &str) -> Option<String> {
    if let Some(value) = rest.strip_prefix('=') {
        return quoted(value.trim());
    }
    let inner = rest.strip_prefix('(')?.strip_suffix(')')?;
    split_top_level(inner).into_iter().find_map(|entry| {
        let (key, value) = entry.split_once('=')?;
        (key.trim() == "serialize")
            .then(|| quoted(value.trim()))
            .flatten()
    })
}

fn quoted(value: &str) -> Option<String> {
    let inner = value.strip_prefix('"')?.strip_suffix('"')?;
    Some(unescape(inner))
}

/// Split on commas outside quotes and parentheses
pub fn split_top_level(text: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut in_string = false;
    let mut escaped = false;
    let mut start = 0;

    for (i, c) in text.char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '(' | '[' | '{' | '<' => depth += 1,
            ')' | ']' | '}' | '>' => depth -= 1,
            ',' if depth == 0 => {
                parts.push(&text[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    if !text[start..].trim().is_empty() {
        parts.push(&text[start..]);
    }
    parts
}

fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}
