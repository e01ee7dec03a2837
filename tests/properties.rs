use proptest::prelude::*;
use shapedoc::docgen::{DEFAULT_TRANSFORMS, ExclusionList, ObjectMapper, post_process};
use shapedoc::{Member, ObjectDoc, PropertyNode, ShapeKind, TypeDescriptor, TypeShape};

const NS: &str = "school::models";

fn leaf() -> impl Strategy<Value = TypeShape> {
    prop_oneof![
        Just(TypeShape::of::<String>()),
        Just(TypeShape::of::<i64>()),
        Just(TypeShape::of::<bool>()),
        Just(TypeShape::named("Grade", NS, TypeShape::of::<String>())),
        Just(TypeShape::opaque("Value")),
    ]
}

fn shape() -> impl Strategy<Value = TypeShape> {
    leaf().prop_recursive(4, 32, 4, |inner| {
        prop_oneof![
            inner.clone().prop_map(TypeShape::sequence),
            inner.clone().prop_map(TypeShape::pointer),
            (leaf(), inner.clone()).prop_map(|(k, v)| TypeShape::mapping(k, v)),
            prop::collection::btree_map("[a-z]{1,6}", inner, 0..4).prop_map(|members| {
                members
                    .into_iter()
                    .fold(TypeShape::structure("", ""), |builder, (name, shape)| {
                        builder.member(Member::lazy(name, move || shape.clone()))
                    })
                    .build()
            }),
        ]
    })
}

fn doc_text() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop_oneof![
            Just("Deprecated: use other.".to_string()),
            Just("  Deprecated:".to_string()),
            Just("ENUM(a, b)".to_string()),
            Just(String::new()),
            "[a-z ]{0,12}",
        ],
        0..5,
    )
    .prop_map(|lines| lines.join("\n"))
}

fn is_parent(parent: &str, path: &str) -> bool {
    path.strip_prefix(parent)
        .is_some_and(|rest| rest.starts_with('.') || rest.starts_with('['))
}

proptest! {
    #[test]
    fn prop_paths_are_unique_and_rooted(shape in shape()) {
        let doc = ObjectMapper::object_doc(&shape);
        let paths = doc.paths();

        prop_assert_eq!(paths[0], "$");
        let unique: std::collections::HashSet<_> = paths.iter().collect();
        prop_assert_eq!(unique.len(), paths.len());

        for path in &paths[1..] {
            prop_assert!(
                paths.iter().any(|candidate| is_parent(candidate, path)),
                "{} has no parent", path
            );
        }
    }

    #[test]
    fn prop_children_are_existing_descendants(shape in shape()) {
        let doc = ObjectMapper::object_doc(&shape);
        for property in &doc.properties {
            for child in &property.children_paths {
                prop_assert!(doc.property(child).is_some());
                prop_assert!(is_parent(&property.path, child));
                prop_assert!(!child[property.path.len() + 1..].contains('.'));
            }
        }
    }

    #[test]
    fn prop_descriptor_follows_shape_kind(shape in shape()) {
        let descriptor = TypeDescriptor::describe(&shape);
        prop_assert_eq!(
            &TypeDescriptor::describe(&TypeShape::pointer(shape.clone())),
            &descriptor
        );

        let target = shape.deref_pointers();
        match &target.kind {
            ShapeKind::Sequence(_) => {
                prop_assert!(descriptor.structural_kind.starts_with("sequence<"));
                if target.name.is_empty() {
                    prop_assert!(descriptor.name.starts_with("sequence<"));
                }
            }
            ShapeKind::Mapping(..) => {
                prop_assert!(descriptor.structural_kind.starts_with("mapping<"));
            }
            ShapeKind::Structure(_) => prop_assert_eq!(descriptor.structural_kind.as_str(), "struct"),
            _ => prop_assert!(!descriptor.structural_kind.contains('<')),
        }
    }

    #[test]
    fn prop_post_process_is_idempotent(
        docs in prop::collection::vec((doc_text(), doc_text()), 1..4),
        excluded in prop::collection::vec("\\$\\.[a-c]", 0..2),
    ) {
        let properties = docs
            .into_iter()
            .enumerate()
            .map(|(i, (type_doc, field_doc))| {
                let path = if i == 0 { "$".to_string() } else { format!("$.{}", (b'a' + i as u8) as char) };
                let mut node = PropertyNode::new(path, TypeDescriptor::default());
                node.type_doc = type_doc;
                node.field_doc = field_doc;
                node
            })
            .collect();
        let doc = ObjectDoc { name: "Doc".to_string(), properties, ..Default::default() };
        let exclusions = ExclusionList::new(excluded);

        let once = post_process(doc, &exclusions, DEFAULT_TRANSFORMS);
        let twice = post_process(once.clone(), &exclusions, DEFAULT_TRANSFORMS);
        prop_assert_eq!(once, twice);
    }
}
