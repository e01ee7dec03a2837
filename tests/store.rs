mod common;

use common::{MODELS, school_project, write};
use shapedoc::{ErrorKind, ShapeDocError, StoreLoader, find_project_root_from};
use tempfile::TempDir;

#[test]
fn test_project_root_found_from_nested_directory() {
    let project = school_project();
    let nested = project.path().join("src/models");
    let root = find_project_root_from(&nested, "Cargo.toml").unwrap();
    assert_eq!(
        root.canonicalize().unwrap(),
        project.path().canonicalize().unwrap()
    );
}

#[test]
fn test_missing_marker_is_root_not_found() {
    let temp = TempDir::new().unwrap();
    let err = find_project_root_from(temp.path(), "shapedoc-no-such-marker.toml").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::RootNotFound);
    assert!(err.to_string().contains("shapedoc-no-such-marker.toml not found"));
}

#[test]
fn test_store_indexes_transitive_modules() {
    let project = school_project();
    let store = StoreLoader::new(project.path()).load().unwrap();

    let teacher = store.lookup(MODELS, "Teacher").unwrap();
    assert_eq!(teacher.qualified_name(), "school::models.Teacher");
    assert_eq!(teacher.declaration.fields().len(), 5);

    assert!(store.lookup_qualified("school::models::moremodels.University").is_ok());

    let err = store.lookup(MODELS, "Principal").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DeclarationNotFound);
}

#[test]
fn test_render_comment_resolves_and_keeps_unknown_text() {
    let project = school_project();
    let store = StoreLoader::new(project.path()).load().unwrap();

    let rendered = store.render_comment(
        MODELS,
        "See [Teacher::students], [`moremodels::University`] and [Nowhere].",
    );
    assert_eq!(
        rendered,
        "See [Teacher::students](https://docs.rs/school/latest/school/models/struct.Teacher.html#structfield.students), \
         [`moremodels::University`](https://docs.rs/school/latest/school/models/moremodels/struct.University.html) \
         and [Nowhere]."
    );
    assert_eq!(
        store.render_comment(MODELS, "Index with grades[course], not [Teacher]s."),
        "Index with grades[course], not [Teacher](https://docs.rs/school/latest/school/models/struct.Teacher.html)s."
    );

    let untouched = "```\n[Teacher]\n```\nUse `[Teacher]` or [the docs](https://example.com).";
    assert_eq!(store.render_comment(MODELS, untouched), untouched);
}

#[test]
fn test_package_errors_are_aggregated() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(root, "Cargo.toml", "[package]\nname = \"school\"\n");
    write(root, "src/lib.rs", "pub mod broken;\npub mod gone;\npub mod fine;\n");
    write(root, "src/broken.rs", "pub struct Broken {\n    a: ,\n}\n");
    write(root, "src/fine.rs", "pub struct Fine;\n");

    let err = StoreLoader::new(root).load().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::PackageErrors);

    let ShapeDocError::PackageErrors { errors } = &err else {
        panic!("expected package errors, got {err}");
    };
    assert!(errors.iter().any(|e| e.package == "school::broken"));
    assert!(
        errors
            .iter()
            .any(|e| e.package == "school" && e.message.contains("`gone`"))
    );
    let message = err.to_string();
    assert!(message.contains("school::broken"));
    assert!(message.contains("file not found for module `gone`"));
}

#[test]
fn test_unreadable_root_is_load_failure() {
    let temp = TempDir::new().unwrap();
    let err = StoreLoader::new(temp.path().join("missing"))
        .load()
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::StoreLoadFailure);
}
