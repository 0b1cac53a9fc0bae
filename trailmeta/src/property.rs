//! Property descriptors and the accessor predicate.
use std::sync::Arc;

use crate::{
    config::MetaConfig,
    types::{AnyType, TypeRegistry, Typeref, hierarchy::Method, primary::PrimitiveType},
};

/// Canonical accessor for one property of a class.
///
/// Built once per discovery walk and never modified afterwards. The raw
/// method is shared with the registry declaration it comes from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PropertyDescriptor {
    raw: Arc<Method>,
    name: String,
    resolved_type: Typeref,
    looks_like_id: bool,
}

impl PropertyDescriptor {
    /// Build a descriptor for `raw`, whose return type resolved to `resolved_type`.
    ///
    /// The property name is derived from the accessor name using the prefixes of `config`.
    pub fn new(raw: Arc<Method>, resolved_type: Typeref, looks_like_id: bool, config: &MetaConfig) -> Self {
        let name = match config.accessor_prefix(raw.name()) {
            Some(prefix) => property_name(raw.name(), prefix),
            None => raw.name().to_string(),
        };

        Self {
            raw,
            name,
            resolved_type,
            looks_like_id,
        }
    }

    /// The accessor method backing this property.
    #[inline]
    pub fn raw(&self) -> &Arc<Method> {
        &self.raw
    }

    /// Logical property name (`getFirstName` gives `firstName`).
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The accessor's return type, with type variables substituted as seen
    /// from the class discovery started at.
    #[inline]
    pub fn resolved_type(&self) -> Typeref {
        self.resolved_type
    }

    /// Whether this property is (part of) the identity of its class.
    #[inline]
    pub fn looks_like_id(&self) -> bool {
        self.looks_like_id
    }

    #[inline]
    pub fn declaring(&self) -> Typeref {
        self.raw.declaring()
    }
}

/// Derive a property name from an accessor name by stripping `prefix` and
/// decapitalising the rest.
///
/// Follows the bean convention: a remainder starting with two capitals
/// (`getURL`) keeps its case. An accessor made of the prefix alone keeps its
/// full name.
pub fn property_name(accessor: &str, prefix: &str) -> String {
    let rest = accessor.strip_prefix(prefix).unwrap_or(accessor);
    let mut chars = rest.chars();
    match chars.next() {
        None => accessor.to_string(),
        Some(first) => {
            if chars.next().is_some_and(char::is_uppercase) && first.is_uppercase() {
                rest.to_string()
            } else {
                first.to_lowercase().chain(rest[first.len_utf8()..].chars()).collect()
            }
        }
    }
}

/// Returns `true` if `method` has the shape of a property accessor.
///
/// An accessor is named with one of the configured prefixes, takes no
/// parameters, returns something, is an instance method, is not native and is
/// not a compiler-generated bridge.
pub fn is_accessor(registry: &TypeRegistry, method: &Method, config: &MetaConfig) -> bool {
    config.accessor_prefix(method.name()).is_some()
        && method.parameters().is_empty()
        && !matches!(
            registry.get_cloned(method.generic_return_type()),
            Some(AnyType::Primitive(PrimitiveType::Void))
        )
        && !method.is_static()
        && !method.is_native()
        && !method.is_bridge()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::hierarchy::{ClassDecl, MethodDecl, MethodFlags};

    #[test]
    fn property_names_follow_bean_convention() {
        assert_eq!(property_name("getName", "get"), "name");
        assert_eq!(property_name("isActive", "is"), "active");
        assert_eq!(property_name("getURL", "get"), "URL");
        assert_eq!(property_name("getX", "get"), "x");
        assert_eq!(property_name("get", "get"), "get");
    }

    #[test]
    fn accessor_predicate_rejects_non_accessor_shapes() {
        let reg = TypeRegistry::new([0; 6]);
        let config = MetaConfig::default();
        let int = reg.primitive(PrimitiveType::Int);
        let void = reg.primitive(PrimitiveType::Void);
        let class = reg.class_type("Sample");
        reg.declare(
            ClassDecl::new(class)
                .method(MethodDecl::getter("getAge", int))
                .method(MethodDecl::getter("isAdult", reg.primitive(PrimitiveType::Boolean)))
                .method(MethodDecl::getter("age", int))
                .method(MethodDecl::getter("getNothing", void))
                .method(MethodDecl::getter("getAt", int).param(int))
                .method(MethodDecl::getter("getCount", int).flags(MethodFlags::STATIC))
                .method(MethodDecl::getter("getHash", int).flags(MethodFlags::NATIVE))
                .method(MethodDecl::getter("getBridge", int).flags(MethodFlags::BRIDGE | MethodFlags::SYNTHETIC)),
        )
        .unwrap();

        let accepted: Vec<String> = reg
            .declared_methods(class)
            .filter(|m| is_accessor(&reg, m, &config))
            .map(|m| m.name().to_string())
            .collect();
        assert_eq!(accepted, vec!["getAge", "isAdult"]);
    }

    #[test]
    fn descriptor_uses_configured_prefixes() {
        let reg = TypeRegistry::new([0; 6]);
        let int = reg.primitive(PrimitiveType::Int);
        let class = reg.class_type("Sample");
        reg.declare(ClassDecl::new(class).method(MethodDecl::getter("fetchSize", int)))
            .unwrap();
        let config = MetaConfig {
            accessor_prefixes: vec!["fetch".to_string()],
            ..MetaConfig::default()
        };

        let method = reg.declared_methods(class).next().unwrap();
        assert!(is_accessor(&reg, &method, &config));
        let descriptor = PropertyDescriptor::new(method, int, false, &config);
        assert_eq!(descriptor.name(), "size");
        assert_eq!(descriptor.declaring(), class);
    }
}
