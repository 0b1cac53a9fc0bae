//! Class declarations and the subtype relation.
//!
//! A [`ClassDecl`] is the explicit stand-in for what a reflective runtime would
//! report about a class: its type parameters, its generic superclass, the
//! interfaces it implements and the methods it declares directly. Inherited
//! members are never copied into a declaration; they are found by walking the
//! superclass chain.
use std::{
    collections::{BTreeSet, VecDeque},
    sync::Arc,
};

use bitflags::bitflags;
use either::Either;
use log::debug;
use smallvec::SmallVec;
use strum::{Display, EnumIs};

use crate::{
    error::{MetaError, MetaResult},
    types::{AnyType, TypeRegistry, Typeref},
};

bitflags! {
    /// Modifiers attached to a declared method.
    #[derive(Default, Clone, Copy, PartialEq, Eq, Hash, Debug)]
    pub struct MethodFlags: u8 {
        /// Class-level method, not invoked on an instance.
        const STATIC = 1 << 0;

        /// Implemented outside of the tracked runtime (e.g. through FFI).
        const NATIVE = 1 << 1;

        /// Compiler-generated duplicate emitted to keep covariant overrides
        /// binary compatible. Always skipped by discovery.
        const BRIDGE = 1 << 2;

        /// Compiler-generated member without a source counterpart.
        const SYNTHETIC = 1 << 3;

        /// Declared without a body.
        const ABSTRACT = 1 << 4;
    }
}

/// Whether a declaration describes a concrete/abstract class or an interface.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIs)]
#[strum(serialize_all = "lowercase")]
pub enum ClassKind {
    #[default]
    Class,
    Interface,
}

/// A method as declared by a class, before being attached to it.
///
/// ```rust
/// # use trailmeta::types::{TypeRegistry, primary::PrimitiveType, hierarchy::{MethodDecl, MethodFlags}};
/// let reg = TypeRegistry::new([0; 6]);
/// let decl = MethodDecl::getter("getAge", reg.primitive(PrimitiveType::Int))
///     .flags(MethodFlags::ABSTRACT);
/// assert_eq!(decl.name(), "getAge");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodDecl {
    name: String,
    parameters: SmallVec<Typeref, 2>,
    return_type: Typeref,
    flags: MethodFlags,
    annotations: SmallVec<String, 1>,
}

impl MethodDecl {
    /// A method with the given name and generic return type, no parameters and no modifiers.
    pub fn new(name: impl Into<String>, return_type: Typeref) -> Self {
        Self {
            name: name.into(),
            parameters: SmallVec::new(),
            return_type,
            flags: MethodFlags::empty(),
            annotations: SmallVec::new(),
        }
    }

    /// Shorthand for a zero-argument instance method, the usual accessor shape.
    pub fn getter(name: impl Into<String>, return_type: Typeref) -> Self {
        Self::new(name, return_type)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn param(mut self, ty: Typeref) -> Self {
        self.parameters.push(ty);
        self
    }

    pub fn flags(mut self, flags: MethodFlags) -> Self {
        self.flags |= flags;
        self
    }

    /// Attach an annotation, by simple name (e.g. `Id`).
    pub fn annotated(mut self, annotation: impl Into<String>) -> Self {
        self.annotations.push(annotation.into());
        self
    }
}

/// A method attached to its declaring class.
///
/// Methods are shared through [`Arc`] and never mutated once their class has
/// been declared; property descriptors hold on to them by reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Method {
    declaring: Typeref,
    name: String,
    parameters: SmallVec<Typeref, 2>,
    return_type: Typeref,
    flags: MethodFlags,
    annotations: SmallVec<String, 1>,
}

impl Method {
    /// Class declaring this method.
    #[inline]
    pub fn declaring(&self) -> Typeref {
        self.declaring
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn parameters(&self) -> &[Typeref] {
        &self.parameters
    }

    /// The return type as written in the declaration, type variables included.
    #[inline]
    pub fn generic_return_type(&self) -> Typeref {
        self.return_type
    }

    #[inline]
    pub fn flags(&self) -> MethodFlags {
        self.flags
    }

    pub fn is_static(&self) -> bool {
        self.flags.contains(MethodFlags::STATIC)
    }

    pub fn is_native(&self) -> bool {
        self.flags.contains(MethodFlags::NATIVE)
    }

    pub fn is_bridge(&self) -> bool {
        self.flags.contains(MethodFlags::BRIDGE)
    }

    pub fn annotations(&self) -> &[String] {
        &self.annotations
    }

    pub fn has_annotation(&self, name: &str) -> bool {
        self.annotations.iter().any(|a| a == name)
    }
}

/// Declaration of a class: ancestry plus directly declared methods.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassDecl {
    ty: Typeref,
    kind: ClassKind,
    type_params: Vec<Typeref>,
    superclass: Option<Typeref>,
    interfaces: Vec<Typeref>,
    methods: Vec<Arc<Method>>,
}

impl ClassDecl {
    /// Start a declaration for the class type `ty` (see [`TypeRegistry::class_type`]).
    pub fn new(ty: Typeref) -> Self {
        Self {
            ty,
            kind: ClassKind::Class,
            type_params: Vec::new(),
            superclass: None,
            interfaces: Vec::new(),
            methods: Vec::new(),
        }
    }

    /// Start an interface declaration.
    pub fn interface(ty: Typeref) -> Self {
        Self {
            kind: ClassKind::Interface,
            ..Self::new(ty)
        }
    }

    /// Declare the next type parameter (a type variable whose `declaring` class is this one).
    pub fn type_param(mut self, variable: Typeref) -> Self {
        self.type_params.push(variable);
        self
    }

    /// Set the generic superclass, either a class type or a parameterized type.
    pub fn extends(mut self, superclass: Typeref) -> Self {
        self.superclass = Some(superclass);
        self
    }

    pub fn implements(mut self, interface: Typeref) -> Self {
        self.interfaces.push(interface);
        self
    }

    pub fn method(mut self, method: MethodDecl) -> Self {
        let MethodDecl {
            name,
            parameters,
            return_type,
            flags,
            annotations,
        } = method;
        self.methods.push(Arc::new(Method {
            declaring: self.ty,
            name,
            parameters,
            return_type,
            flags,
            annotations,
        }));
        self
    }

    #[inline]
    pub fn ty(&self) -> Typeref {
        self.ty
    }

    #[inline]
    pub fn kind(&self) -> ClassKind {
        self.kind
    }

    pub fn type_params(&self) -> &[Typeref] {
        &self.type_params
    }

    /// The superclass exactly as declared, `None` when left implicit.
    pub fn declared_superclass(&self) -> Option<Typeref> {
        self.superclass
    }

    pub fn interfaces(&self) -> &[Typeref] {
        &self.interfaces
    }

    /// Methods declared directly by this class, in declaration order.
    pub fn methods(&self) -> &[Arc<Method>] {
        &self.methods
    }
}

impl TypeRegistry {
    /// Register the declaration of a class.
    ///
    /// Each class may be declared once. Classes that are referenced but never
    /// declared behave as empty classes extending the root.
    pub fn declare(&self, decl: ClassDecl) -> MetaResult<()> {
        let name = match self.get_cloned(decl.ty) {
            Some(AnyType::Class(class)) => class.name,
            Some(_) => {
                return Err(MetaError::NotAClass {
                    found: self.fmt(decl.ty).to_string(),
                });
            }
            None => {
                return Err(MetaError::NotAClass {
                    found: format!("{:?}", decl.ty),
                });
            }
        };

        if decl.ty == self.root {
            return Err(MetaError::RootRedeclared(name));
        }

        let mut classes = self.classes.write();
        if classes.contains_key(&decl.ty) {
            return Err(MetaError::DuplicateDeclaration { name });
        }

        debug!(
            "Declared {} `{}` with {} method(s) and superclass {}",
            decl.kind,
            name,
            decl.methods.len(),
            decl.superclass
                .map(|s| self.fmt(s).to_string())
                .unwrap_or_else(|| "<implicit>".to_string()),
        );
        classes.insert(decl.ty, Arc::new(decl));
        Ok(())
    }

    /// Retrieve the declaration of `class`, if any.
    pub fn class(&self, class: Typeref) -> Option<Arc<ClassDecl>> {
        self.classes.read().get(&class).cloned()
    }

    /// Methods declared directly by `class`; empty for undeclared classes.
    pub fn declared_methods(&self, class: Typeref) -> impl Iterator<Item = Arc<Method>> {
        match self.class(class) {
            Some(decl) => Either::Left((0..decl.methods.len()).map(move |i| decl.methods[i].clone())),
            None => Either::Right(std::iter::empty()),
        }
    }

    /// The generic superclass of `class`, as declared.
    ///
    /// Returns `None` for the root, for interfaces and for non-class types.
    /// Classes with an implicit superclass (and undeclared classes) report the root.
    pub fn superclass(&self, class: Typeref) -> Option<Typeref> {
        if class == self.root || !self.get(class).is_some_and(|ty| ty.is_class()) {
            return None;
        }

        match self.class(class) {
            Some(decl) if decl.kind.is_interface() => None,
            Some(decl) => Some(decl.superclass.unwrap_or(self.root)),
            None => Some(self.root),
        }
    }

    /// Erase generic information from `ty`.
    ///
    /// Parameterized types erase to their raw class, type variables to the
    /// erasure of their bound (the root when unbounded) and arrays to arrays of
    /// erased elements.
    pub fn erasure(&self, ty: Typeref) -> Typeref {
        match self.get_cloned(ty) {
            Some(AnyType::Parameterized(p)) => self.erasure(p.raw),
            Some(AnyType::Variable(v)) => v.bound.map(|b| self.erasure(b)).unwrap_or(self.root),
            Some(AnyType::Array(a)) => {
                let element = self.erasure(a.element);
                if element == a.element {
                    ty
                } else {
                    self.array(element)
                }
            }
            _ => ty,
        }
    }

    /// Erased direct supertypes of a class: superclass first, then interfaces.
    fn direct_supertypes(&self, class: Typeref) -> SmallVec<Typeref, 4> {
        let mut supertypes = SmallVec::new();
        if let Some(superclass) = self.superclass(class) {
            supertypes.push(self.erasure(superclass));
        }
        if let Some(decl) = self.class(class) {
            supertypes.extend(decl.interfaces.iter().map(|i| self.erasure(*i)));
        }
        supertypes
    }

    /// Returns `true` if a value of type `child` can be used where `parent` is expected.
    ///
    /// The check operates on erased types:
    /// - every type is assignable to itself;
    /// - primitives are only assignable to themselves;
    /// - the root accepts every reference type;
    /// - a class accepts its transitive superclasses and interfaces;
    /// - arrays are covariant in their (reference) element type.
    pub fn is_assignable_from(&self, parent: Typeref, child: Typeref) -> bool {
        let parent = self.erasure(parent);
        let child = self.erasure(child);
        if parent == child {
            return true;
        }

        match (self.get_cloned(parent), self.get_cloned(child)) {
            (Some(AnyType::Primitive(_)), _) | (_, Some(AnyType::Primitive(_))) => false,
            _ if parent == self.root => true,
            (Some(AnyType::Array(p)), Some(AnyType::Array(c))) => {
                self.is_assignable_from(p.element, c.element)
            }
            (Some(AnyType::Class(_)), Some(AnyType::Class(_))) => {
                let mut visited = BTreeSet::new();
                let mut queue = VecDeque::from([child]);
                while let Some(current) = queue.pop_front() {
                    if !visited.insert(current) {
                        continue;
                    }
                    for supertype in self.direct_supertypes(current) {
                        if supertype == parent {
                            return true;
                        }
                        queue.push_back(supertype);
                    }
                }
                false
            }
            _ => false,
        }
    }
}
