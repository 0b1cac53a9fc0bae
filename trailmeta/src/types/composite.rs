//! Composite types
//!
//! This file provides the reference types built on top of `Typeref` handles
//! stored in the central `TypeRegistry`:
//! - `ClassType`: a nominal class (or interface) type, identified by its name.
//! - `ParameterizedType`: a generic class applied to type arguments.
//! - `TypeVariable`: a type parameter scoped to the class declaring it.
//! - `ArrayType`: an array of some element type.
//!
//! Each of them carries a lightweight `fmt` helper that accepts a
//! `&TypeRegistry` so that nested references can be resolved for display.
use std::{collections::BTreeMap, ops::Deref};

use uuid::Uuid;

use crate::types::{AnyType, TypeRegistry, Typeref};

fn fmt_ref<U>(f: &mut std::fmt::Formatter<'_>, ref_object: &U, typeref: Typeref) -> std::fmt::Result
where
    U: Deref<Target = BTreeMap<Uuid, AnyType>>,
{
    match ref_object.deref().get(&typeref.0) {
        Some(elem) => write!(f, "{}", elem.internal_fmt(ref_object.deref())),
        None => write!(f, "<unknown type {}>", typeref.0),
    }
}

/// Nominal class type.
///
/// Two class types with the same name are the same type; the registry interns
/// them to a single [`Typeref`].
#[derive(Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct ClassType {
    pub name: String,
}

impl ClassType {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl std::fmt::Display for ClassType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// A generic class applied to concrete (or variable) type arguments, e.g. `List<String>`.
#[derive(Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct ParameterizedType {
    /// The raw (generic) class being instantiated.
    pub raw: Typeref,
    /// Type arguments, in declaration order of the raw class's type parameters.
    pub arguments: Vec<Typeref>,
}

impl ParameterizedType {
    pub(super) fn internal_fmt<'a, U>(&'a self, ref_object: U) -> impl std::fmt::Display
    where
        U: Deref<Target = BTreeMap<Uuid, AnyType>> + Sized,
    {
        struct ParameterizedTypeFmt<'a, U> {
            r#ref: &'a ParameterizedType,
            ref_object: U,
        }

        impl<U: Deref<Target = BTreeMap<Uuid, AnyType>> + Sized> std::fmt::Display
            for ParameterizedTypeFmt<'_, U>
        {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                fmt_ref(f, &self.ref_object, self.r#ref.raw)?;
                write!(f, "<")?;
                for (i, typeref) in self.r#ref.arguments.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    fmt_ref(f, &self.ref_object, *typeref)?;
                }
                write!(f, ">")
            }
        }

        ParameterizedTypeFmt {
            r#ref: self,
            ref_object,
        }
    }

    /// Build a formatting helper for this `ParameterizedType`.
    pub fn fmt<'a>(&'a self, registry: &'a TypeRegistry) -> impl std::fmt::Display {
        self.internal_fmt(registry.types.read_recursive())
    }
}

/// A type parameter, scoped to the class that declares it.
///
/// `T` declared by `Box` and `T` declared by `Pair` are distinct variables
/// because their `declaring` class differs.
#[derive(Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct TypeVariable {
    pub declaring: Typeref,
    pub name: String,
    /// Upper bound. `None` stands for the universal root.
    pub bound: Option<Typeref>,
}

impl std::fmt::Display for TypeVariable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Array type
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct ArrayType {
    pub element: Typeref,
}

impl ArrayType {
    pub(super) fn internal_fmt<'a, U>(&'a self, ref_object: U) -> impl std::fmt::Display
    where
        U: Deref<Target = BTreeMap<Uuid, AnyType>> + Sized,
    {
        struct ArrayTypeFmt<'a, U> {
            r#ref: &'a ArrayType,
            ref_object: U,
        }

        impl<U: Deref<Target = BTreeMap<Uuid, AnyType>> + Sized> std::fmt::Display for ArrayTypeFmt<'_, U> {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                fmt_ref(f, &self.ref_object, self.r#ref.element)?;
                write!(f, "[]")
            }
        }

        ArrayTypeFmt {
            r#ref: self,
            ref_object,
        }
    }

    /// Build a formatting helper for this `ArrayType`.
    pub fn fmt<'a>(&'a self, registry: &'a TypeRegistry) -> impl std::fmt::Display {
        self.internal_fmt(registry.types.read_recursive())
    }
}
