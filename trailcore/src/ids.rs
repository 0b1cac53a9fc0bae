use serde::{Deserialize, Serialize};
use strum::EnumIs;

/// Stable identity of a tracked domain object.
///
/// The identity is independent of the object's mutable state and is what
/// change records are anchored to. Its canonical string form is given by
/// [`GlobalId::value`]:
///
/// | kind           | example                       |
/// |----------------|-------------------------------|
/// | `Instance`     | `Employee/42`                 |
/// | `ValueObject`  | `Employee/42#address`         |
/// | `Unbounded`    | `Address/`                    |
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, EnumIs)]
pub enum GlobalId {
    /// An entity instance, identified by its type and local id.
    Instance { type_name: String, local_id: String },

    /// A value object reachable from an owner through a property path.
    ValueObject {
        type_name: String,
        owner: Box<GlobalId>,
        fragment: String,
    },

    /// A value object with no owner.
    Unbounded { type_name: String },
}

impl GlobalId {
    pub fn instance(type_name: impl Into<String>, local_id: impl ToString) -> Self {
        GlobalId::Instance {
            type_name: type_name.into(),
            local_id: local_id.to_string(),
        }
    }

    pub fn value_object(type_name: impl Into<String>, owner: GlobalId, fragment: impl Into<String>) -> Self {
        GlobalId::ValueObject {
            type_name: type_name.into(),
            owner: Box::new(owner),
            fragment: fragment.into(),
        }
    }

    pub fn unbounded(type_name: impl Into<String>) -> Self {
        GlobalId::Unbounded {
            type_name: type_name.into(),
        }
    }

    /// Name of the type of the identified object.
    pub fn type_name(&self) -> &str {
        match self {
            GlobalId::Instance { type_name, .. }
            | GlobalId::ValueObject { type_name, .. }
            | GlobalId::Unbounded { type_name } => type_name,
        }
    }

    /// Canonical string form of this identity.
    pub fn value(&self) -> String {
        match self {
            GlobalId::Instance {
                type_name,
                local_id,
            } => format!("{type_name}/{local_id}"),
            GlobalId::ValueObject {
                owner, fragment, ..
            } => format!("{}#{}", owner.value(), fragment),
            GlobalId::Unbounded { type_name } => format!("{type_name}/"),
        }
    }
}

impl std::fmt::Display for GlobalId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_forms() {
        let employee = GlobalId::instance("Employee", 42);
        assert_eq!(employee.value(), "Employee/42");
        let address = GlobalId::value_object("Address", employee.clone(), "address");
        assert_eq!(address.value(), "Employee/42#address");
        assert_eq!(address.type_name(), "Address");
        assert_eq!(GlobalId::unbounded("Address").to_string(), "Address/");
    }

    #[test]
    fn identity_ignores_construction_path() {
        assert_eq!(GlobalId::instance("Employee", "7"), GlobalId::instance("Employee", 7));
        assert_ne!(GlobalId::instance("Employee", 7), GlobalId::instance("Manager", 7));
    }
}
