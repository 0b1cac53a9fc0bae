//! Types module
//!
//! This module contains the canonical representation of types used by the
//! `trailmeta` crate. It stands in for runtime reflection: instead of asking a
//! live runtime for a class's members, callers describe their classes once in
//! a [`TypeRegistry`] and discovery works over that description.
//!
//! - Primary types: primitives, including `void` (see `primary.rs`).
//! - Composite types: classes, parameterized types, type variables and arrays
//!   (see `composite.rs`).
//! - Class declarations and the subtype relation (see `hierarchy.rs`).
//! - A registry-backed [`AnyType`] wrapper and [`TypeRegistry`] which deduplicates
//!   types and provides stable [`Typeref`] identifiers (UUID-based).
use std::{
    collections::BTreeMap,
    hash::{DefaultHasher, Hash, Hasher},
    ops::Deref,
    sync::Arc,
};

use log::{debug, info};
use parking_lot::{MappedRwLockReadGuard, RwLock, RwLockReadGuard};
use smallvec::{SmallVec, smallvec};
use strum::{EnumIs, EnumTryAs};
use uuid::{Timestamp, Uuid};

use crate::{
    constants::ROOT_CLASS_NAME,
    types::{
        composite::{ArrayType, ClassType, ParameterizedType, TypeVariable},
        hierarchy::ClassDecl,
        primary::PrimitiveType,
    },
};
pub mod composite;
pub mod hierarchy;
pub mod primary;

/// A stable reference to a type stored inside a `TypeRegistry`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Typeref(Uuid);

impl Typeref {
    /// The UUID backing this reference.
    pub fn uuid(&self) -> Uuid {
        self.0
    }
}

/// A sum-type representing any type that can be stored in the registry.
///
/// [`AnyType`] implements `Hash`/`Eq` so it can be deduplicated by the
/// [`TypeRegistry`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIs, EnumTryAs)]
pub enum AnyType {
    /// Primitive types, `void` included.
    Primitive(PrimitiveType),

    /// A nominal class or interface type.
    ///
    /// The members of a class are not part of its type; they live in the
    /// [`ClassDecl`] registered with [`TypeRegistry::declare`].
    Class(ClassType),

    /// A generic class applied to type arguments.
    Parameterized(ParameterizedType),

    /// A type parameter of some generic class.
    Variable(TypeVariable),

    /// An array of elements of a given type.
    Array(ArrayType),
}

impl From<PrimitiveType> for AnyType {
    fn from(value: PrimitiveType) -> Self {
        AnyType::Primitive(value)
    }
}

impl From<ClassType> for AnyType {
    fn from(value: ClassType) -> Self {
        AnyType::Class(value)
    }
}

impl From<ParameterizedType> for AnyType {
    fn from(value: ParameterizedType) -> Self {
        AnyType::Parameterized(value)
    }
}

impl From<TypeVariable> for AnyType {
    fn from(value: TypeVariable) -> Self {
        AnyType::Variable(value)
    }
}

impl From<ArrayType> for AnyType {
    fn from(value: ArrayType) -> Self {
        AnyType::Array(value)
    }
}

impl AnyType {
    fn internal_fmt<U>(&self, ref_object: U) -> impl std::fmt::Display
    where
        U: Deref<Target = BTreeMap<Uuid, AnyType>> + Sized,
    {
        struct AnyTypeFmt<'a, U> {
            ty: &'a AnyType,
            ref_object: U,
        }

        impl<U: Deref<Target = BTreeMap<Uuid, AnyType>> + Sized> std::fmt::Display for AnyTypeFmt<'_, U> {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self.ty {
                    AnyType::Primitive(primitive) => write!(f, "{primitive}"),
                    AnyType::Class(class) => write!(f, "{class}"),
                    AnyType::Variable(variable) => write!(f, "{variable}"),
                    AnyType::Parameterized(parameterized) => parameterized
                        .internal_fmt(self.ref_object.deref())
                        .fmt(f),
                    AnyType::Array(array) => array.internal_fmt(self.ref_object.deref()).fmt(f),
                }
            }
        }

        AnyTypeFmt {
            ty: self,
            ref_object,
        }
    }

    /// Build a formatting helper that renders this type using the provided
    /// registry to resolve referenced types.
    ///
    /// Example:
    /// ```rust
    /// # use trailmeta::types::{AnyType, TypeRegistry, primary::PrimitiveType};
    /// let reg = TypeRegistry::new([0; 6]);
    /// let t = AnyType::from(PrimitiveType::Int);
    /// assert_eq!(format!("{}", t.fmt(&reg)), "int");
    /// ```
    pub fn fmt<'a>(&'a self, registry: &'a TypeRegistry) -> impl std::fmt::Display {
        self.internal_fmt(registry.types.read_recursive())
    }
}

/// A central registry that stores and deduplicates `AnyType` values, and
/// holds the class declarations that describe members and ancestry.
///
/// Every registry owns exactly one universal root class (see
/// [`TypeRegistry::root`]); classes declared without an explicit superclass
/// extend it.
///
/// Example:
///
/// ```rust
/// # use trailmeta::types::{TypeRegistry, primary::PrimitiveType};
/// let reg = TypeRegistry::new([0u8; 6]);
/// let typeref = reg.search_or_insert(PrimitiveType::Int.into());
/// assert_eq!(reg.search_or_insert(PrimitiveType::Int.into()), typeref);
/// assert_eq!(reg.get(typeref).as_deref(), Some(&PrimitiveType::Int.into()));
/// ```
pub struct TypeRegistry {
    types: RwLock<BTreeMap<Uuid, AnyType>>,
    inverse_lookup: RwLock<BTreeMap<u64, SmallVec<Uuid, 1>>>,
    classes: RwLock<BTreeMap<Typeref, Arc<ClassDecl>>>,
    context: uuid::timestamp::context::Context,
    node_id: [u8; 6],
    root: Typeref,
}

impl TypeRegistry {
    fn hash_ty(ty: &AnyType) -> u64 {
        let mut hasher = DefaultHasher::new();
        ty.hash(&mut hasher);
        hasher.finish()
    }

    fn next_uuid(&self) -> Uuid {
        let ts = Timestamp::now(&self.context);
        Uuid::new_v6(ts, &self.node_id)
    }

    /// Create a new [`TypeRegistry`] instance, with its root class already declared.
    ///
    /// `node_id` is used when allocating UUIDs for newly inserted types.
    pub fn new(node_id: [u8; 6]) -> Self {
        let mut registry = Self {
            types: Default::default(),
            inverse_lookup: Default::default(), // INFO: Always lock types before inverse_lookup to avoid deadlock
            classes: Default::default(),
            context: uuid::timestamp::context::Context::new(0),
            node_id,
            root: Typeref(Uuid::nil()),
        };

        let root = registry.search_or_insert(ClassType::new(ROOT_CLASS_NAME).into());
        registry.root = root;
        registry
            .classes
            .get_mut()
            .insert(root, Arc::new(ClassDecl::new(root)));
        registry
    }

    /// The universal root class. Its accessors are never reported as properties.
    #[inline]
    pub fn root(&self) -> Typeref {
        self.root
    }

    /// Retrieve a borrowed [`AnyType`] for the given `typeref`. Returns
    /// [`None`] if the given `typeref` is not present in the registry.
    ///
    /// # A note on concurrency
    /// This method internally acquires a read lock on the type storage. As a
    /// result,
    ///  1) Multiple concurrent readers are allowed.
    ///  2) You mustn't hold a read-guard while calling [`Self::search_or_insert`] as
    ///     it may attempt to upgrade to a write lock, leading to a deadlock.
    ///  3) The returned guard keeps the read lock held for the lifetime of the guard.
    pub fn get(&self, typeref: Typeref) -> Option<MappedRwLockReadGuard<'_, AnyType>> {
        let types_lock = self.types.read_recursive();
        RwLockReadGuard::try_map(types_lock, |map| map.get(&typeref.0)).ok()
    }

    /// Same as [`Self::get`] but returns an owned copy, releasing the lock immediately.
    ///
    /// Prefer this whenever the caller may intern new types while inspecting the result.
    pub fn get_cloned(&self, typeref: Typeref) -> Option<AnyType> {
        self.types.read_recursive().get(&typeref.0).cloned()
    }

    /// Insert `ty` into the registry if an equivalent type doesn't already
    /// exist and return the [`Typeref`] for it.
    ///
    /// If an identical type is already present, its existing [`Typeref`] is returned,
    /// otherwise a new UUID is allocated and the type is inserted.
    ///
    /// # A note on concurrency
    /// This method internally acquires read locks on the type storage, and
    /// upgrades them to write locks if a new type must be inserted. As a result,
    ///  1) You **MUST NOT** hold a read-guard returned by [`Self::get`] while calling this method,
    ///     as it may attempt to upgrade to a write lock, leading to a deadlock.
    ///  2) Multiple concurrent readers are allowed, but writers are exclusive.
    ///
    /// Hash collisions only cost a linear scan of the colliding bucket; they are
    /// logged at info level since they should essentially never happen.
    pub fn search_or_insert(&self, ty: AnyType) -> Typeref {
        let h = Self::hash_ty(&ty);

        // Lock, notice that the order is critical, always lock the type storage first
        let mut types_lock = self.types.upgradable_read();
        let mut inverse_lookup_lock = self.inverse_lookup.upgradable_read();

        if let Some(typerefs) = inverse_lookup_lock.get(&h) {
            for typeref in typerefs {
                if types_lock.get(typeref) == Some(&ty) {
                    return Typeref(*typeref);
                }
            }
        }

        // NOTE: Ordering of upgrade is paramount to avoid deadlock
        types_lock.with_upgraded(|types_lock| {
            inverse_lookup_lock.with_upgraded(|inverse_lookup_lock| {
                let new_typeref = self.next_uuid();

                if let Some(list) = inverse_lookup_lock.get_mut(&h) {
                    info!(
                        "Detected an hash collision on hash 0x{:016x}. The following types collided:\n{}",
                        h,
                        list.iter()
                            .filter_map(|uuid| types_lock
                                .get(uuid)
                                .map(|other| format!(" - {} -> {}", uuid, other.internal_fmt(&*types_lock))))
                            .collect::<Vec<_>>()
                            .join("\n"),
                    );
                    debug!(
                        "Inverse lookup updated for hash 0x{:016x}: {:?} (type {})",
                        h,
                        list,
                        ty.internal_fmt(&*types_lock)
                    );
                    list.push(new_typeref);
                } else {
                    debug!(
                        "New type encountered {}. Registered with UUID {}.",
                        ty.internal_fmt(&*types_lock),
                        new_typeref
                    );
                    inverse_lookup_lock.insert(h, smallvec![new_typeref]);
                }

                types_lock.insert(new_typeref, ty);
                Typeref(new_typeref)
            })
        })
    }

    /// Intern a primitive type.
    pub fn primitive(&self, primitive: PrimitiveType) -> Typeref {
        self.search_or_insert(primitive.into())
    }

    /// Intern the nominal class type called `name`.
    pub fn class_type(&self, name: impl Into<String>) -> Typeref {
        self.search_or_insert(ClassType::new(name).into())
    }

    /// Intern `raw<arguments...>`.
    pub fn parameterized(&self, raw: Typeref, arguments: impl IntoIterator<Item = Typeref>) -> Typeref {
        self.search_or_insert(
            ParameterizedType {
                raw,
                arguments: arguments.into_iter().collect(),
            }
            .into(),
        )
    }

    /// Intern the type variable `name` declared by `declaring`, with an optional upper bound.
    pub fn type_variable(
        &self,
        declaring: Typeref,
        name: impl Into<String>,
        bound: Option<Typeref>,
    ) -> Typeref {
        self.search_or_insert(
            TypeVariable {
                declaring,
                name: name.into(),
                bound,
            }
            .into(),
        )
    }

    /// Intern `element[]`.
    pub fn array(&self, element: Typeref) -> Typeref {
        self.search_or_insert(ArrayType { element }.into())
    }

    /// Format a given `Typeref` using this registry.
    pub fn fmt(&self, typeref: Typeref) -> impl std::fmt::Display {
        struct Fmt<'a> {
            registry: &'a TypeRegistry,
            typeref: Typeref,
        }

        impl<'a> std::fmt::Display for Fmt<'a> {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self.registry.get(self.typeref) {
                    Some(ty_guard) => ty_guard.fmt(self.registry).fmt(f),
                    None => write!(f, "<unknown type {}>", self.typeref.0),
                }
            }
        }

        Fmt {
            registry: self,
            typeref,
        }
    }
}
