//! Throw-away "school" project shared by the integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use shapedoc::{DeclarationStore, Member, Reflect, StoreLoader, TypeShape};
use tempfile::TempDir;

pub const MODELS: &str = "school::models";
pub const MOREMODELS: &str = "school::models::moremodels";

const LIB_RS: &str = "pub mod models;\n";

const MODELS_RS: &str = r#"pub mod moremodels;

use std::collections::HashMap;
use self::moremodels::University;

/// Teacher teaches [Student]s at a [University].
pub struct Teacher {
    /// Full name of the teacher.
    pub name: String,
    /// Students currently assigned.
    pub students: Vec<Student>,
    /// Where the teacher works.
    pub employer: Option<University>,
    /// Never leaves the building.
    pub secret: String,
    /// Grade per course.
    pub grades: HashMap<String, Grade>,
}

/// Student attends classes.
///
/// Deprecated: use [Pupil] instead.
pub struct Student {
    /// Index number.
    pub index: u32,
    /// Former name.
    ///
    /// Deprecated: use index.
    pub old_name: String,
}

/// Replacement for students.
pub struct Pupil;

/// Letter grade.
///
/// ENUM(A, B, C)
pub type Grade = String;

/// A node of a tree.
pub struct Tree {
    /// Label of the node.
    pub label: String,
    /// Child nodes.
    pub children: Vec<Tree>,
}

/// Person belongs to a club.
pub struct Person {
    /// Name of the person.
    pub name: String,
    /// Club the person joined.
    pub club: Option<Box<Club>>,
}

/// Club gathers people.
pub struct Club {
    /// Current members.
    pub members: Vec<Person>,
    /// People by tag.
    pub tags: HashMap<String, Vec<Person>>,
}

/// Course taught by a teacher.
#[deprecated(note = "courses moved to the catalog")]
pub struct Course {
    /// Course title.
    pub title: String,
}
"#;

const MOREMODELS_RS: &str = r#"/// A university.
pub struct University {
    /// Official name.
    pub name: String,
}
"#;

pub fn write(root: &Path, path: &str, content: &str) {
    let full = root.join(path);
    fs::create_dir_all(full.parent().unwrap()).unwrap();
    fs::write(full, content).unwrap();
}

/// Write the school crate into a fresh temporary directory
pub fn school_project() -> TempDir {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(
        root,
        "Cargo.toml",
        "[package]\nname = \"school\"\nversion = \"0.1.0\"\nedition = \"2021\"\n",
    );
    write(root, "src/lib.rs", LIB_RS);
    write(root, "src/models.rs", MODELS_RS);
    write(root, "src/models/moremodels.rs", MOREMODELS_RS);
    temp
}

pub fn school_store(root: &Path) -> Arc<DeclarationStore> {
    Arc::new(StoreLoader::new(root).load().unwrap())
}

// Runtime shapes mirroring the source above

pub struct Teacher;
pub struct Student;
pub struct University;
pub struct Grade;
pub struct Tree;
pub struct Course;
pub struct Person;
pub struct Club;

impl Reflect for Teacher {
    fn shape() -> TypeShape {
        TypeShape::structure("Teacher", MODELS)
            .member(Member::of::<String>("name"))
            .member(Member::of::<Vec<Student>>("students"))
            .member(Member::of::<Option<University>>("employer"))
            .member(Member::of::<String>("secret"))
            .member(Member::of::<HashMap<String, Grade>>("grades"))
            .build()
    }
}

impl Reflect for Student {
    fn shape() -> TypeShape {
        TypeShape::structure("Student", MODELS)
            .member(Member::of::<u32>("index"))
            .member(Member::of::<String>("old_name").rename("oldName"))
            .build()
    }
}

impl Reflect for University {
    fn shape() -> TypeShape {
        TypeShape::structure("University", MOREMODELS)
            .member(Member::of::<String>("name"))
            .build()
    }
}

impl Reflect for Grade {
    fn shape() -> TypeShape {
        TypeShape::named("Grade", MODELS, TypeShape::of::<String>())
    }
}

impl Reflect for Tree {
    fn shape() -> TypeShape {
        TypeShape::structure("Tree", MODELS)
            .member(Member::of::<String>("label"))
            .member(Member::of::<Vec<Tree>>("children"))
            .build()
    }
}

impl Reflect for Course {
    fn shape() -> TypeShape {
        TypeShape::structure("Course", MODELS)
            .member(Member::of::<String>("title"))
            .build()
    }
}

impl Reflect for Person {
    fn shape() -> TypeShape {
        TypeShape::structure("Person", MODELS)
            .member(Member::of::<String>("name"))
            .member(Member::of::<Option<Box<Club>>>("club"))
            .build()
    }
}

impl Reflect for Club {
    fn shape() -> TypeShape {
        TypeShape::structure("Club", MODELS)
            .member(Member::of::<Vec<Person>>("members"))
            .member(Member::of::<HashMap<String, Vec<Person>>>("tags"))
            .build()
    }
}
