use super::attributes::{
    deprecated_attribute, doc_attribute, is_cfg_test, outer_doc_block, outer_doc_line,
    path_attribute, serde_attributes,
};
use super::use_tree::expand_use_tree;
use super::{
    ChildModule, ModuleSource, ParseResult, Parser, collect_syntax_errors, create_ts_parser,
    get_node_line, get_node_text,
};
use crate::constants::source::MAX_SYNTAX_ERRORS_PER_FILE;
use crate::types::{
    DeclBody, DeclKind, Declaration, FieldDecl, Result, SerdeAttrs, ShapeDocError, VariantDecl,
};

pub struct RustParser;

impl RustParser {
    pub fn new() -> Result<Self> {
        // Validate parser creation at construction time
        let _ = create_ts_parser(tree_sitter_rust::LANGUAGE, "Rust")?;
        Ok(Self)
    }
}

impl Parser for RustParser {
    fn parse(&self, path: &str, content: &str) -> Result<ParseResult> {
        let mut parser =
            create_ts_parser(tree_sitter_rust::LANGUAGE, "Rust").map_err(|mut e| {
                // Update error path to current file being parsed
                if let ShapeDocError::StoreLoadFailure { path: ref mut p, .. } = e {
                    *p = path.into();
                }
                e
            })?;

        let tree = parser
            .parse(content, None)
            .ok_or_else(|| ShapeDocError::store_load(path, "Failed to parse Rust file"))?;

        let root = tree.root_node();
        let source = content.as_bytes();

        let syntax_errors = if root.has_error() {
            collect_syntax_errors(root, source, MAX_SYNTAX_ERRORS_PER_FILE)
        } else {
            Vec::new()
        };

        Ok(ParseResult {
            module: extract_module(root, source),
            syntax_errors,
        })
    }
}

// =============================================================================
// Modules
// =============================================================================

/// Extract the items of a `source_file` or `declaration_list`
fn extract_module(container: tree_sitter::Node, source: &[u8]) -> ModuleSource {
    let mut module = ModuleSource::default();
    let mut cursor = container.walk();

    for node in container.named_children(&mut cursor) {
        match node.kind() {
            "use_declaration" => {
                if let Some(argument) = node.child_by_field_name("argument") {
                    module
                        .imports
                        .extend(expand_use_tree(get_node_text(argument, source)));
                }
            }
            "mod_item" => {
                if let Some(child) = extract_child_module(node, source) {
                    module.children.push(child);
                }
            }
            kind => {
                if let Some(decl_kind) = DeclKind::from_node_kind(kind)
                    && let Some(declaration) = extract_declaration(node, decl_kind, source)
                {
                    module.declarations.push(declaration);
                }
            }
        }
    }

    module
}

fn extract_child_module(node: tree_sitter::Node, source: &[u8]) -> Option<ChildModule> {
    let trivia = Trivia::leading(node, source);
    if trivia.attributes.iter().any(|a| is_cfg_test(a)) {
        return None;
    }

    let name = get_node_text(node.child_by_field_name("name")?, source).to_string();
    let child = match node.child_by_field_name("body") {
        Some(body) => ChildModule::Inline {
            name,
            body: extract_module(body, source),
        },
        None => ChildModule::External {
            name,
            path_attr: trivia.attributes.iter().find_map(|a| path_attribute(a)),
            line: get_node_line(node),
        },
    };
    Some(child)
}

// =============================================================================
// Declarations
// =============================================================================

fn extract_declaration(
    node: tree_sitter::Node,
    kind: DeclKind,
    source: &[u8],
) -> Option<Declaration> {
    let name = get_node_text(node.child_by_field_name("name")?, source).to_string();
    let trivia = Trivia::leading(node, source);

    let body = match kind {
        DeclKind::Struct | DeclKind::Union => match node.child_by_field_name("body") {
            Some(body) if body.kind() == "field_declaration_list" => {
                DeclBody::Named(extract_named_fields(body, source))
            }
            Some(body) if body.kind() == "ordered_field_declaration_list" => {
                DeclBody::Tuple(extract_tuple_fields(body, source))
            }
            _ => DeclBody::Empty,
        },
        DeclKind::Enum => node
            .child_by_field_name("body")
            .map(|body| DeclBody::Variants(extract_variants(body, source)))
            .unwrap_or(DeclBody::Empty),
        DeclKind::TypeAlias => node
            .child_by_field_name("type")
            .map(|ty| DeclBody::Alias(get_node_text(ty, source).to_string()))
            .unwrap_or(DeclBody::Empty),
        _ => DeclBody::Empty,
    };

    Some(Declaration {
        name,
        kind,
        doc: trivia.doc(),
        deprecated: trivia.deprecated(),
        serde: trivia.serde(),
        public: has_visibility(node),
        generics: extract_type_parameters(node, source),
        body,
        line: get_node_line(node),
    })
}

/// Type and const parameter names in declaration order, matching the
/// positions of written arguments once lifetimes are left out
fn extract_type_parameters(node: tree_sitter::Node, source: &[u8]) -> Vec<String> {
    let Some(params) = node.child_by_field_name("type_parameters") else {
        return Vec::new();
    };
    let mut cursor = params.walk();
    params
        .named_children(&mut cursor)
        .filter_map(type_parameter_name)
        .map(|name| get_node_text(name, source).to_string())
        .collect()
}

fn type_parameter_name(param: tree_sitter::Node) -> Option<tree_sitter::Node> {
    match param.kind() {
        "type_identifier" | "identifier" => Some(param),
        "type_parameter" | "constrained_type_parameter" | "optional_type_parameter"
        | "const_parameter" => param
            .child_by_field_name("name")
            .or_else(|| param.child_by_field_name("left"))
            .and_then(type_parameter_name),
        _ => None,
    }
}

fn extract_named_fields(list: tree_sitter::Node, source: &[u8]) -> Vec<FieldDecl> {
    let mut cursor = list.walk();
    list.named_children(&mut cursor)
        .filter(|n| n.kind() == "field_declaration")
        .filter_map(|field| {
            let name = get_node_text(field.child_by_field_name("name")?, source).to_string();
            let ty = field
                .child_by_field_name("type")
                .map(|t| get_node_text(t, source).to_string())
                .unwrap_or_default();
            let trivia = Trivia::leading(field, source);
            Some(FieldDecl {
                name,
                ty,
                doc: trivia.doc(),
                deprecated: trivia.deprecated(),
                serde: trivia.serde(),
                public: has_visibility(field),
                line: get_node_line(field),
            })
        })
        .collect()
}

/// Tuple fields interleave attributes, visibility and types in one list
fn extract_tuple_fields(list: tree_sitter::Node, source: &[u8]) -> Vec<FieldDecl> {
    let mut fields = Vec::new();
    let mut trivia = Trivia::default();
    let mut public = false;

    let mut cursor = list.walk();
    if !cursor.goto_first_child() {
        return fields;
    }
    loop {
        let child = cursor.node();
        if cursor.field_name() == Some("type") {
            fields.push(FieldDecl {
                name: fields.len().to_string(),
                ty: get_node_text(child, source).to_string(),
                doc: trivia.doc(),
                deprecated: trivia.deprecated(),
                serde: trivia.serde(),
                public,
                line: get_node_line(child),
            });
            trivia = Trivia::default();
            public = false;
        } else {
            match child.kind() {
                "visibility_modifier" => public = true,
                "line_comment" | "block_comment" | "attribute_item" => {
                    trivia.push(child, source)
                }
                _ => {}
            }
        }
        if !cursor.goto_next_sibling() {
            break;
        }
    }

    fields
}

fn extract_variants(list: tree_sitter::Node, source: &[u8]) -> Vec<VariantDecl> {
    let mut cursor = list.walk();
    list.named_children(&mut cursor)
        .filter(|n| n.kind() == "enum_variant")
        .filter_map(|variant| {
            let name = get_node_text(variant.child_by_field_name("name")?, source).to_string();
            let trivia = Trivia::leading(variant, source);
            Some(VariantDecl {
                name,
                doc: trivia.doc(),
                deprecated: trivia.deprecated(),
                serde: trivia.serde(),
                has_fields: variant.child_by_field_name("body").is_some(),
            })
        })
        .collect()
}

fn has_visibility(node: tree_sitter::Node) -> bool {
    let mut cursor = node.walk();
    node.children(&mut cursor)
        .any(|c| c.kind() == "visibility_modifier")
}

// =============================================================================
// Leading Trivia
// =============================================================================

/// Doc comment lines and attributes attached in front of an item
#[derive(Default)]
struct Trivia {
    doc_lines: Vec<String>,
    attributes: Vec<String>,
}

impl Trivia {
    /// Collect the comments and attributes directly preceding `node`
    fn leading(node: tree_sitter::Node, source: &[u8]) -> Self {
        let mut preceding = Vec::new();
        let mut current = node.prev_sibling();
        while let Some(sibling) = current {
            if !matches!(
                sibling.kind(),
                "line_comment" | "block_comment" | "attribute_item"
            ) {
                break;
            }
            preceding.push(sibling);
            current = sibling.prev_sibling();
        }

        let mut trivia = Self::default();
        for sibling in preceding.into_iter().rev() {
            trivia.push(sibling, source);
        }
        trivia
    }

    fn push(&mut self, node: tree_sitter::Node, source: &[u8]) {
        let text = get_node_text(node, source);
        match node.kind() {
            "line_comment" => {
                if let Some(line) = outer_doc_line(text) {
                    self.doc_lines.push(line.to_string());
                }
            }
            "block_comment" => {
                if let Some(lines) = outer_doc_block(text) {
                    self.doc_lines.extend(lines);
                }
            }
            "attribute_item" => match doc_attribute(text) {
                Some(lines) => self.doc_lines.extend(lines),
                None => self.attributes.push(text.to_string()),
            },
            _ => {}
        }
    }

    fn doc(&self) -> String {
        self.doc_lines.join("\n").trim_end().to_string()
    }

    fn deprecated(&self) -> Option<String> {
        self.attributes.iter().find_map(|a| deprecated_attribute(a))
    }

    fn serde(&self) -> SerdeAttrs {
        serde_attributes(self.attributes.iter().map(String::as_str))
    }
}
