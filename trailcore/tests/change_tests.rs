use std::{
    collections::hash_map::DefaultHasher,
    hash::{Hash, Hasher},
};

use trailcore::{
    change::{Change, NewObject, ObjectRemoved},
    chrono::NaiveDate,
    commit::{CommitId, CommitMetadata},
    ids::GlobalId,
    printer::{PrettyValuePrinter, ValuePrinter},
    snapshot::{PropertyValue, Snapshot, Tracked},
};
use trailmeta::{
    discovery::discover,
    types::{
        TypeRegistry,
        hierarchy::{ClassDecl, MethodDecl},
        primary::PrimitiveType,
    },
};

fn hash_of<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

fn bob() -> GlobalId {
    GlobalId::instance("Employee", "bob")
}

fn bob_snapshot() -> Snapshot {
    Snapshot::new().with("name", "Bob").with("salary", 1000i64)
}

fn commit(minor: u32) -> CommitMetadata {
    let date = NaiveDate::from_ymd_opt(2024, 3, 1)
        .and_then(|d| d.and_hms_opt(12, 0, 0))
        .unwrap();
    CommitMetadata::new("alice", date, CommitId::new(1, minor)).with_property("ticket", "HR-12")
}

/// A printer that must never be consulted for identity-only messages.
struct PanickingPrinter;

impl ValuePrinter for PanickingPrinter {
    fn format(&self, _value: &PropertyValue) -> String {
        panic!("the removal message must not depend on the value printer")
    }
}

#[test]
fn pretty_print_requires_a_printer() {
    let removed = ObjectRemoved::new(bob(), Some(bob_snapshot()));
    let err = removed.pretty_print(None).unwrap_err();
    assert!(err.is_invalid_argument());

    let without_snapshot = ObjectRemoved::new(GlobalId::unbounded("Address"), None);
    assert!(without_snapshot.pretty_print(None).is_err());
}

#[test]
fn pretty_print_uses_the_global_id_only() {
    let removed = ObjectRemoved::new(bob(), Some(bob_snapshot()));
    assert_eq!(
        removed.pretty_print(Some(&PrettyValuePrinter)).unwrap(),
        "object removed: Employee/bob"
    );
    assert_eq!(
        removed.pretty_print(Some(&PanickingPrinter)).unwrap(),
        "object removed: Employee/bob"
    );

    let owner = GlobalId::instance("Employee", 7);
    let nested = ObjectRemoved::new(GlobalId::value_object("Address", owner, "address"), None);
    assert_eq!(
        Change::from(nested).to_string(),
        "object removed: Employee/7#address"
    );
}

#[test]
fn equal_removals_hash_equal() {
    let a = ObjectRemoved::new(bob(), Some(bob_snapshot()));
    let b = ObjectRemoved::new(bob(), Some(bob_snapshot()));
    assert_eq!(a, b);
    assert_eq!(hash_of(&a), hash_of(&b));
    assert_eq!(hash_of(&Change::from(a)), hash_of(&Change::from(b)));
}

#[test]
fn id_or_snapshot_difference_breaks_equality() {
    let base = ObjectRemoved::new(bob(), Some(bob_snapshot()));
    let other_id = ObjectRemoved::new(GlobalId::instance("Employee", "carol"), Some(bob_snapshot()));
    let other_snapshot = ObjectRemoved::new(bob(), Some(bob_snapshot().with("salary", 2000i64)));
    let no_snapshot = ObjectRemoved::new(bob(), None);
    assert_ne!(base, other_id);
    assert_ne!(base, other_snapshot);
    assert_ne!(base, no_snapshot);
}

#[test]
fn equality_is_variant_aware() {
    let removed: Change = ObjectRemoved::new(bob(), Some(bob_snapshot())).into();
    let created: Change = NewObject::new(bob(), Some(bob_snapshot())).into();
    assert_ne!(removed, created);
    assert!(removed.is_object_removed());
    assert_eq!(created.to_string(), "new object: Employee/bob");
}

#[test]
fn attaching_a_commit_yields_a_new_record() {
    let original = ObjectRemoved::new(bob(), Some(bob_snapshot()));
    let attached = original.attach_commit(commit(0));

    assert!(original.commit_metadata().is_none(), "the original is left untouched");
    assert_eq!(attached.commit_metadata(), Some(&commit(0)));
    assert_ne!(original, attached);
    assert_eq!(attached.affected_id(), original.affected_id());
    assert_eq!(attached.affected_snapshot(), original.affected_snapshot());

    let attached_elsewhere = original.attach_commit(commit(1));
    assert_ne!(attached, attached_elsewhere);
    assert_eq!(attached, ObjectRemoved::with_commit(bob(), Some(bob_snapshot()), Some(commit(0))));
}

#[test]
fn change_forwards_to_its_variant() {
    let change: Change = ObjectRemoved::new(bob(), Some(bob_snapshot())).into();
    let attached = change.attach_commit(commit(3));
    assert_eq!(attached.affected_id(), &bob());
    assert_eq!(
        attached.affected_snapshot().and_then(|s| s.get("name")),
        Some(&PropertyValue::Text("Bob".to_string()))
    );
    assert_eq!(attached.commit_metadata().map(|c| c.id.to_string()), Some("1.3".to_string()));
    assert!(change.commit_metadata().is_none());
    assert!(attached.try_as_object_removed_ref().is_some());
}

struct Employee {
    login: &'static str,
    salary: i64,
}

impl Tracked for Employee {
    fn global_id(&self) -> GlobalId {
        GlobalId::instance("Employee", self.login)
    }

    fn property_value(&self, property: &str) -> Option<PropertyValue> {
        match property {
            "login" => Some(self.login.into()),
            "salary" => Some(self.salary.into()),
            _ => None,
        }
    }
}

#[test]
fn removal_captures_discovered_properties() {
    let reg = TypeRegistry::new([0; 6]);
    let string = reg.class_type("String");
    let employee = reg.class_type("Employee");
    reg.declare(
        ClassDecl::new(employee)
            .method(MethodDecl::getter("getLogin", string).annotated("Id"))
            .method(MethodDecl::getter("getSalary", reg.primitive(PrimitiveType::Long)))
            .method(MethodDecl::getter("getManager", employee)),
    )
    .unwrap();
    let properties = discover(&reg, employee);

    let removed = ObjectRemoved::of(&Employee { login: "bob", salary: 1000 }, &properties);
    let snapshot = removed.affected_snapshot().unwrap();
    assert_eq!(removed.affected_id(), &bob());
    assert_eq!(snapshot.len(), 3);
    assert_eq!(snapshot.get("salary"), Some(&PropertyValue::Integer(1000)));
    assert_eq!(snapshot.get("manager"), Some(&PropertyValue::Null));
    assert_eq!(removed.pretty_print(Some(&PrettyValuePrinter)).unwrap(), "object removed: Employee/bob");
}
