//! Expansion of `use` trees into local bindings.

use super::attributes::split_top_level;

/// Expand the argument of a `use` declaration into (alias, path) pairs.
///
/// Grouped trees are flattened, `self` inside a group binds the group's
/// prefix, and glob or `as _` imports bind nothing.
pub fn expand_use_tree(tree: &str) -> Vec<(String, String)> {
    let mut bindings = Vec::new();
    expand_into("", tree, &mut bindings);
    bindings
}

fn expand_into(prefix: &str, tree: &str, bindings: &mut Vec<(String, String)>) {
    let tree = tree.trim().trim_start_matches("::");
    if tree.is_empty() {
        return;
    }

    if tree.ends_with('}')
        && let Some(open) = tree.find('{')
    {
        let head = compact(tree[..open].trim_end_matches(|c: char| c == ':' || c.is_whitespace()));
        let group_prefix = join(prefix, &head);
        for item in split_top_level(&tree[open + 1..tree.len() - 1]) {
            expand_into(&group_prefix, item, bindings);
        }
        return;
    }

    let (path, alias) = match split_alias(tree) {
        Some((path, alias)) => (compact(path), Some(alias.trim())),
        None => (compact(tree), None),
    };
    if path.ends_with('*') || alias == Some("_") {
        return;
    }

    let (full, last) = if path == "self" {
        (prefix.to_string(), last_segment(prefix).to_string())
    } else {
        let full = join(prefix, &path);
        let last = last_segment(&full).to_string();
        (full, last)
    };
    if full.is_empty() {
        return;
    }
    bindings.push((alias.map(str::to_string).unwrap_or(last), full));
}

fn split_alias(tree: &str) -> Option<(&str, &str)> {
    let idx = tree.rfind(" as ")?;
    Some((&tree[..idx], &tree[idx + 4..]))
}

fn compact(path: &str) -> String {
    path.split_whitespace().collect()
}

fn join(prefix: &str, path: &str) -> String {
    match (prefix.is_empty(), path.is_empty()) {
        (true, _) => path.to_string(),
        (_, true) => prefix.to_string(),
        _ => format!("{}::{}", prefix, path),
    }
}

fn last_segment(path: &str) -> &str {
    path.rsplit("::").next().unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(a, p)| (a.to_string(), p.to_string()))
            .collect()
    }

    #[test]
    fn test_simple_path() {
        assert_eq!(
            expand_use_tree("crate::models::Teacher"),
            pairs(&[("Teacher", "crate::models::Teacher")])
        );
    }

    #[test]
    fn test_alias() {
        assert_eq!(
            expand_use_tree("super::moremodels::University as Uni"),
            pairs(&[("Uni", "super::moremodels::University")])
        );
        assert!(expand_use_tree("std::fmt::Write as _").is_empty());
    }

    #[test]
    fn test_grouped_tree() {
        assert_eq!(
            expand_use_tree("crate::{models::{self, Teacher as T}, moremodels::University}"),
            pairs(&[
                ("models", "crate::models"),
                ("T", "crate::models::Teacher"),
                ("University", "crate::moremodels::University"),
            ])
        );
    }

    #[test]
    fn test_glob_is_ignored() {
        assert!(expand_use_tree("crate::models::*").is_empty());
        assert_eq!(
            expand_use_tree("std::collections::{HashMap, hash_map::*}"),
            pairs(&[("HashMap", "std::collections::HashMap")])
        );
    }

    #[test]
    fn test_leading_colons_and_whitespace() {
        assert_eq!(
            expand_use_tree("::serde :: Serialize"),
            pairs(&[("Serialize", "serde::Serialize")])
        );
    }
}
