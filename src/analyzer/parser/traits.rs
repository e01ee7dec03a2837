use crate::types::{Declaration, Result};

/// Contents of one module body.
///
/// A file yields one of these for its top level; inline `mod x { ... }`
/// blocks nest as [`ChildModule::Inline`].
#[derive(Debug, Clone, Default)]
pub struct ModuleSource {
    pub declarations: Vec<Declaration>,
    /// `use` bindings as (local alias, full path)
    pub imports: Vec<(String, String)>,
    pub children: Vec<ChildModule>,
}

#[derive(Debug, Clone)]
pub enum ChildModule {
    Inline {
        name: String,
        body: ModuleSource,
    },
    /// `mod name;`, backed by another file
    External {
        name: String,
        /// `#[path = "..."]` override
        path_attr: Option<String>,
        line: u32,
    },
}

impl ChildModule {
    pub fn name(&self) -> &str {
        match self {
            Self::Inline { name, .. } | Self::External { name, .. } => name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    pub line: u32,
    pub column: u32,
    pub message: String,
}

pub struct ParseResult {
    pub module: ModuleSource,
    pub syntax_errors: Vec<SyntaxError>,
}

impl ParseResult {
    pub fn new() -> Self {
        Self {
            module: ModuleSource::default(),
            syntax_errors: Vec::new(),
        }
    }

    pub fn is_clean(&self) -> bool {
        self.syntax_errors.is_empty()
    }
}

impl Default for ParseResult {
    fn default() -> Self {
        Self::new()
    }
}

pub trait Parser: Send + Sync {
    fn parse(&self, path: &str, content: &str) -> Result<ParseResult>;
}

/// Extract text content from a tree-sitter node.
/// Returns empty string if extraction fails (with debug logging).
#[inline]
pub fn get_node_text<'a>(node: tree_sitter::Node, content: &'a [u8]) -> &'a str {
    node.utf8_text(content).unwrap_or_else(|e| {
        tracing::debug!(
            "UTF-8 extraction failed at {}:{}-{}:{}: {}",
            node.start_position().row + 1,
            node.start_position().column,
            node.end_position().row + 1,
            node.end_position().column,
            e
        );
        ""
    })
}

/// 1-based start line of a node
#[inline]
pub fn get_node_line(node: tree_sitter::Node) -> u32 {
    node.start_position().row as u32 + 1
}

/// Create a tree-sitter parser for the given language.
pub fn create_ts_parser<L: Into<tree_sitter::Language>>(
    language: L,
    lang_name: &str,
) -> Result<tree_sitter::Parser> {
    let mut parser = tree_sitter::Parser::new();
    parser
        .set_language(&language.into())
        .map_err(|e| crate::types::ShapeDocError::StoreLoadFailure {
            path: Default::default(),
            message: format!("Failed to set {} language: {}", lang_name, e),
        })?;
    Ok(parser)
}

/// Collect ERROR and MISSING nodes, descending only into subtrees that
/// contain errors. At most `limit` entries are returned.
pub fn collect_syntax_errors(
    root: tree_sitter::Node,
    content: &[u8],
    limit: usize,
) -> Vec<SyntaxError> {
    let mut errors = Vec::new();
    let mut stack = vec![root];

    while let Some(node) = stack.pop() {
        if errors.len() >= limit {
            break;
        }
        if node.is_missing() {
            errors.push(SyntaxError {
                line: get_node_line(node),
                column: node.start_position().column as u32,
                message: format!("missing `{}`", node.kind()),
            });
            continue;
        }
        if node.is_error() {
            let snippet: String = get_node_text(node, content).chars().take(40).collect();
            errors.push(SyntaxError {
                line: get_node_line(node),
                column: node.start_position().column as u32,
                message: format!("unexpected `{}`", snippet.trim()),
            });
            continue;
        }
        if node.has_error() {
            let mut cursor = node.walk();
            let children: Vec<_> = node.children(&mut cursor).collect();
            // Reverse so the stack yields errors in source order.
            stack.extend(children.into_iter().rev());
        }
    }

    errors
}
