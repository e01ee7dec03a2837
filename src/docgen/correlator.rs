//! Type/Doc Correlator
//!
//! Pairs every named type reachable from a root shape with the rendered
//! doc comment of its declaration, recursing through structure members.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use tracing::{debug, trace};

use crate::store::DeclarationStore;
use crate::types::{FieldDecl, Member, Result, ShapeDocError, ShapeKind, TypeShape};

/// Documentation of one named type
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocEntry {
    pub name: String,
    pub namespace: String,
    /// Rendered type comment
    pub doc: String,
    /// Output name → member documentation
    pub members: BTreeMap<String, MemberDoc>,
}

/// Documentation of a structure member
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberDoc {
    /// Rendered comment on the member itself
    pub doc: String,
    /// Entry of the member's type
    pub entry: Arc<DocEntry>,
}

/// Qualified name → documentation
pub type DocMap = BTreeMap<String, Arc<DocEntry>>;

/// Correlate `shape` with the store. Fails with
/// [`ShapeDocError::NoDocumentation`] when nothing named is reachable.
pub fn correlate(store: &DeclarationStore, shape: &TypeShape) -> Result<DocMap> {
    let mut correlator = Correlator::new(store);
    correlator.visit(shape)?;
    if correlator.docs.is_empty() {
        return Err(ShapeDocError::NoDocumentation {
            type_name: shape.deref_pointers().qualified_name(),
        });
    }
    debug!(
        "Correlated {} type(s) for {}",
        correlator.docs.len(),
        shape.deref_pointers().qualified_name()
    );
    Ok(correlator.docs)
}

pub struct Correlator<'s> {
    store: &'s DeclarationStore,
    docs: DocMap,
    /// Structures whose members are being correlated
    in_progress: HashSet<String>,
}

impl<'s> Correlator<'s> {
    pub fn new(store: &'s DeclarationStore) -> Self {
        Self {
            store,
            docs: DocMap::new(),
            in_progress: HashSet::new(),
        }
    }

    pub fn into_docs(self) -> DocMap {
        self.docs
    }

    /// Correlate one shape, returning the entry of the type it stands for.
    ///
    /// Anonymous sequences stand for their element. Anonymous mappings are
    /// built-in but their key and value types are still correlated.
    pub fn visit(&mut self, shape: &TypeShape) -> Result<Arc<DocEntry>> {
        let shape = shape.deref_pointers();

        if shape.is_builtin() {
            return match &shape.kind {
                ShapeKind::Sequence(element) => self.visit(element),
                ShapeKind::Mapping(key, value) => {
                    self.visit(key)?;
                    self.visit(value)?;
                    Ok(Arc::new(builtin_entry(shape)))
                }
                _ => Ok(Arc::new(builtin_entry(shape))),
            };
        }

        let key = shape.qualified_name();
        if let Some(entry) = self.docs.get(&key) {
            return Ok(Arc::clone(entry));
        }

        let store = self.store;
        let handle = store.lookup(&shape.namespace, &shape.name)?;
        let scope = handle.module.namespace.as_str();
        let declaration = handle.declaration;
        let doc = store.render_comment(scope, &declaration.documentation());

        if self.in_progress.contains(&key) {
            trace!("Revisiting {} while correlating its members", key);
            return Ok(Arc::new(DocEntry {
                name: shape.name.clone(),
                namespace: shape.namespace.clone(),
                doc,
                members: BTreeMap::new(),
            }));
        }

        let mut entry = DocEntry {
            name: shape.name.clone(),
            namespace: shape.namespace.clone(),
            doc,
            members: BTreeMap::new(),
        };

        match &shape.kind {
            ShapeKind::Structure(members) => {
                if !declaration.is_structure() {
                    return Err(ShapeDocError::MalformedDeclaration {
                        qualified_name: key,
                        expected: "struct".to_string(),
                        found: declaration.kind.to_string(),
                    });
                }

                let fields: HashMap<&str, &FieldDecl> = declaration
                    .fields()
                    .iter()
                    .map(|f| (f.name.as_str(), f))
                    .collect();

                self.in_progress.insert(key.clone());
                let result = self.visit_members(&key, scope, members, &fields, &mut entry);
                self.in_progress.remove(&key);
                result?;
            }
            ShapeKind::Sequence(element) => {
                self.visit(element)?;
            }
            ShapeKind::Mapping(k, v) => {
                self.visit(k)?;
                self.visit(v)?;
            }
            _ => {}
        }

        let entry = Arc::new(entry);
        self.docs.insert(key, Arc::clone(&entry));
        Ok(entry)
    }

    fn visit_members(
        &mut self,
        owner: &str,
        scope: &str,
        members: &[Member],
        fields: &HashMap<&str, &FieldDecl>,
        entry: &mut DocEntry,
    ) -> Result<()> {
        for member in members {
            let Some(output_name) = member.output_name() else {
                continue;
            };

            let member_entry = self
                .visit(&member.shape())
                .map_err(|e| e.in_member(owner, &member.name))?;

            if member.flatten {
                for (name, doc) in &member_entry.members {
                    entry.members.insert(name.clone(), doc.clone());
                }
                continue;
            }

            let doc = fields
                .get(member.name.as_str())
                .map(|field| self.store.render_comment(scope, &field.documentation()))
                .unwrap_or_default();

            entry.members.insert(
                output_name.to_string(),
                MemberDoc {
                    doc,
                    entry: member_entry,
                },
            );
        }
        Ok(())
    }
}

fn builtin_entry(shape: &TypeShape) -> DocEntry {
    DocEntry {
        name: shape.name.clone(),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::ModuleInfo;
    use crate::types::{DeclBody, DeclKind, Declaration, ErrorKind, Reflect, SerdeAttrs};

    const NS: &str = "school::models";

    fn field(name: &str, ty: &str, doc: &str) -> FieldDecl {
        FieldDecl {
            name: name.to_string(),
            ty: ty.to_string(),
            doc: doc.to_string(),
            deprecated: None,
            serde: SerdeAttrs::default(),
            public: true,
            line: 1,
        }
    }

    fn structure(name: &str, doc: &str, fields: Vec<FieldDecl>) -> Declaration {
        Declaration {
            name: name.to_string(),
            kind: DeclKind::Struct,
            doc: doc.to_string(),
            deprecated: None,
            serde: SerdeAttrs::default(),
            public: true,
            generics: Vec::new(),
            body: DeclBody::Named(fields),
            line: 1,
        }
    }

    fn store() -> DeclarationStore {
        let mut module = ModuleInfo::new(NS, "src/models.rs");
        module.insert(structure(
            "Teacher",
            "Teacher is a person who teaches [Student]s.",
            vec![
                field("name", "String", "Name of the teacher."),
                field("students", "Vec<Student>", "Students taught."),
                field("mentor", "Option<Box<Teacher>>", ""),
            ],
        ));
        module.insert(structure(
            "Student",
            "Student attends classes.",
            vec![field("index", "String", "Index number.")],
        ));
        module.insert(Declaration {
            name: "Grade".to_string(),
            kind: DeclKind::Enum,
            doc: "Grade of a student.".to_string(),
            deprecated: None,
            serde: SerdeAttrs::default(),
            public: true,
            generics: Vec::new(),
            body: DeclBody::Variants(Vec::new()),
            line: 1,
        });

        module.insert(structure(
            "Person",
            "Person belongs to a club.",
            vec![
                field("name", "String", "Name of the person."),
                field("club", "Option<Box<Club>>", "Club the person joined."),
            ],
        ));
        module.insert(structure(
            "Club",
            "Club gathers people.",
            vec![
                field("members", "Vec<Person>", "Current members."),
                field("tags", "HashMap<String, Vec<Person>>", "People by tag."),
            ],
        ));

        let mut store = DeclarationStore::new("/tmp/school");
        store.add_module(module);
        store
    }

    struct Student;

    impl Reflect for Student {
        fn shape() -> TypeShape {
            TypeShape::structure("Student", NS)
                .field::<String>("index", "index")
                .build()
        }
    }

    struct Teacher;

    impl Reflect for Teacher {
        fn shape() -> TypeShape {
            TypeShape::structure("Teacher", NS)
                .field::<String>("name", "name")
                .field::<Vec<Student>>("students", "students")
                .field::<Option<Box<Teacher>>>("mentor", "mentor")
                .build()
        }
    }

    struct Person;
    struct Club;

    impl Reflect for Person {
        fn shape() -> TypeShape {
            TypeShape::structure("Person", NS)
                .field::<String>("name", "name")
                .field::<Option<Box<Club>>>("club", "club")
                .build()
        }
    }

    impl Reflect for Club {
        fn shape() -> TypeShape {
            TypeShape::structure("Club", NS)
                .field::<Vec<Person>>("members", "members")
                .field::<HashMap<String, Vec<Person>>>("tags", "tags")
                .build()
        }
    }

    #[test]
    fn test_correlates_reachable_types() {
        let store = store();
        let docs = correlate(&store, &Teacher::shape()).unwrap();

        let keys: Vec<&str> = docs.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["school::models.Student", "school::models.Teacher"]);

        let teacher = &docs["school::models.Teacher"];
        assert!(teacher.doc.starts_with("Teacher is a person who teaches [Student]("));
        assert_eq!(teacher.members["name"].doc, "Name of the teacher.");
        assert!(teacher.members["name"].entry.namespace.is_empty());
        assert_eq!(teacher.members["students"].doc, "Students taught.");
        assert_eq!(teacher.members["students"].entry.name, "Student");
        assert_eq!(
            teacher.members["students"].entry.doc,
            "Student attends classes."
        );
    }

    #[test]
    fn test_self_reference_yields_stub_entry() {
        let store = store();
        let docs = correlate(&store, &Teacher::shape()).unwrap();
        let mentor = &docs["school::models.Teacher"].members["mentor"];
        assert_eq!(mentor.entry.name, "Teacher");
        assert!(mentor.entry.members.is_empty());
        assert!(mentor.doc.is_empty());
    }

    #[test]
    fn test_mutual_recursion_registers_both_entries() {
        let store = store();
        let docs = correlate(&store, &Person::shape()).unwrap();

        let keys: Vec<&str> = docs.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["school::models.Club", "school::models.Person"]);

        let person = &docs["school::models.Person"];
        assert_eq!(person.members["club"].doc, "Club the person joined.");
        let club = &person.members["club"].entry;
        assert_eq!(club.doc, "Club gathers people.");
        assert_eq!(club.members["members"].doc, "Current members.");
        assert_eq!(club.members["tags"].doc, "People by tag.");

        let revisited = &club.members["members"].entry;
        assert_eq!(revisited.name, "Person");
        assert_eq!(revisited.doc, "Person belongs to a club.");
        assert!(revisited.members.is_empty());
        assert_eq!(docs["school::models.Club"], *club);
    }

    #[test]
    fn test_builtin_root_has_no_documentation() {
        let err = correlate(&store(), &TypeShape::of::<Vec<String>>()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NoDocumentation);
    }

    #[test]
    fn test_missing_package_and_declaration() {
        let store = store();
        let shape = TypeShape::structure("University", "school::elsewhere").build();
        let err = correlate(&store, &shape).unwrap_err();
        assert_eq!(
            err.to_string(),
            "could not find school::elsewhere package for type University"
        );

        let shape = TypeShape::structure("Janitor", NS).build();
        let err = correlate(&store, &shape).unwrap_err();
        assert_eq!(err.to_string(), "school::models.Janitor not found");
    }

    #[test]
    fn test_member_failure_carries_owner_and_member() {
        let store = store();
        let shape = TypeShape::structure("Teacher", NS)
            .member(Member::lazy("office", || {
                TypeShape::structure("Office", NS).build()
            }))
            .build();
        let err = correlate(&store, &shape).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DeclarationNotFound);
        assert_eq!(err.member_trail(), vec![("school::models.Teacher", "office")]);
    }

    #[test]
    fn test_structure_against_enum_declaration_is_malformed() {
        let shape = TypeShape::structure("Grade", NS).build();
        let err = correlate(&store(), &shape).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedDeclaration);
        assert!(err.to_string().contains("school::models.Grade"));
    }

    #[test]
    fn test_suppressed_member_is_not_correlated() {
        let shape = TypeShape::structure("Teacher", NS)
            .field::<String>("name", "name")
            .member(Member::lazy("ghost", || TypeShape::structure("Ghost", NS).build()).skip())
            .build();
        let docs = correlate(&store(), &shape).unwrap();
        assert_eq!(docs.len(), 1);
    }

    #[test]
    fn test_renamed_member_keyed_by_output_name() {
        let shape = TypeShape::structure("Teacher", NS)
            .field::<String>("name", "fullName")
            .build();
        let docs = correlate(&store(), &shape).unwrap();
        let teacher = &docs["school::models.Teacher"];
        assert_eq!(teacher.members["fullName"].doc, "Name of the teacher.");
    }

    #[test]
    fn test_named_scalar_is_documented() {
        let grade = TypeShape::named("Grade", NS, TypeShape::of::<String>());
        let docs = correlate(&store(), &grade).unwrap();
        assert_eq!(docs["school::models.Grade"].doc, "Grade of a student.");
    }
}
