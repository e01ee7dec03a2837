//! Doc comment rendering.
//!
//! Doc comments are Markdown already; rendering resolves rustdoc intra-doc
//! links (`[Foo]`, `` [`crate::a::Foo`] ``, `[Foo::field]`) into links to
//! the item's rustdoc page.

use regex::{Captures, Regex};
use std::collections::HashSet;
use std::sync::LazyLock;

use super::index::{DeclarationStore, LinkTarget};

static LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?P<code>`+[^`]*`+)|\[(?P<label>[^\[\]]+)\](?P<tail>\([^)]*\)|\[[^\]]*\])?")
        .expect("valid regex")
});
static REFERENCE_DEF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s{0,3}\[([^\]]+)\]:\s*\S").expect("valid regex"));
static DISAMBIGUATOR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[a-z]+@").expect("valid regex"));
static RUST_PATH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(::)?[A-Za-z_][A-Za-z0-9_]*(::[A-Za-z_][A-Za-z0-9_]*)*$").expect("valid regex")
});

impl DeclarationStore {
    /// Render a raw doc comment written inside module `scope`.
    ///
    /// Links that do not resolve are kept as written, brackets included, so
    /// prose like `values[idx]` survives. Code spans,
    /// fenced blocks, explicit-target links and labels with a reference
    /// definition are left as written.
    pub fn render_comment(&self, scope: &str, raw: &str) -> String {
        if raw.trim().is_empty() {
            return String::new();
        }

        let references = reference_labels(raw);
        let mut fence: Option<&str> = None;
        let mut lines = Vec::new();

        for line in raw.lines() {
            let trimmed = line.trim_start();
            if let Some(marker) = fence {
                if trimmed.starts_with(marker) {
                    fence = None;
                }
                lines.push(line.to_string());
                continue;
            }
            if let Some(marker) = fence_marker(trimmed) {
                fence = Some(marker);
                lines.push(line.to_string());
                continue;
            }
            if REFERENCE_DEF.is_match(line) {
                lines.push(line.to_string());
                continue;
            }
            lines.push(self.render_links(scope, line, &references));
        }

        lines.join("\n")
    }

    fn render_links(&self, scope: &str, line: &str, references: &HashSet<String>) -> String {
        LINK.replace_all(line, |caps: &Captures| {
            let whole = &caps[0];
            let Some(label) = caps.name("label").map(|m| m.as_str()) else {
                return whole.to_string();
            };
            if caps.name("tail").is_some() || references.contains(&label.to_lowercase()) {
                return whole.to_string();
            }
            let Some(path) = link_path(label) else {
                return whole.to_string();
            };

            match self.resolve_path(scope, path) {
                Some(target) => format!("[{}]({})", label, self.link_url(&target)),
                None => {
                    tracing::debug!("Unresolved doc link [{}] in {}", label, scope);
                    whole.to_string()
                }
            }
        })
        .into_owned()
    }

    /// rustdoc page of a link target under the configured base URL
    pub fn link_url(&self, target: &LinkTarget) -> String {
        let (namespace, page) = match target {
            LinkTarget::Module { namespace } => (namespace, "index.html".to_string()),
            LinkTarget::Item {
                namespace,
                name,
                kind,
                member,
            } => {
                let anchor = member
                    .as_ref()
                    .map(|(_, anchor)| format!("#{}", anchor))
                    .unwrap_or_default();
                (
                    namespace,
                    format!("{}.{}.html{}", kind.rustdoc_prefix(), name, anchor),
                )
            }
        };

        let mut segments = namespace.split("::");
        let crate_name = segments.next().unwrap_or_default();
        let mut url = format!(
            "{}/{}/latest/{}",
            self.doc_link_base_url(),
            crate_name,
            crate_name
        );
        for segment in segments {
            url.push('/');
            url.push_str(segment);
        }
        url.push('/');
        url.push_str(&page);
        url
    }
}

/// Path named by a link label, with backticks, disambiguators and call or
/// macro suffixes removed
fn link_path(label: &str) -> Option<&str> {
    let mut text = label.trim();
    if text.len() >= 2 && text.starts_with('`') && text.ends_with('`') {
        text = text.trim_matches('`').trim();
    }
    if let Some(m) = DISAMBIGUATOR.find(text) {
        text = &text[m.end()..];
    }
    let text = text
        .strip_suffix("()")
        .or_else(|| text.strip_suffix('!'))
        .unwrap_or(text);
    RUST_PATH.is_match(text).then_some(text)
}

fn reference_labels(raw: &str) -> HashSet<String> {
    raw.lines()
        .filter_map(|line| REFERENCE_DEF.captures(line))
        .map(|caps| caps[1].to_lowercase())
        .collect()
}

fn fence_marker(trimmed: &str) -> Option<&'static str> {
    if trimmed.starts_with("```") {
        Some("```")
    } else if trimmed.starts_with("~~~") {
        Some("~~~")
    } else {
        None
    }
}
