//! Generic type resolution along a class chain.
use std::collections::BTreeMap;

use log::trace;

use crate::types::{AnyType, TypeRegistry, Typeref};

/// Bindings from type variables to the concrete types supplied by more-derived classes.
///
/// The context is filled while walking a hierarchy from the most-derived class
/// towards the root: each class contributes the arguments it passes to its
/// generic superclass before the superclass's own members are looked at.
/// Variables are keyed by their [`Typeref`], which already scopes them to their
/// declaring class. Bindings are only ever added.
#[derive(Debug, Default, Clone)]
pub struct SubstitutionContext {
    bindings: BTreeMap<Typeref, Typeref>,
}

impl SubstitutionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the bindings `class` supplies to its generic superclass.
    ///
    /// For `class Employee extends Entity<Long>` this binds `Entity.T` to
    /// `Long`. Arguments are resolved against the bindings already known, so
    /// an argument that is itself a variable bound further down the chain is
    /// stored in its concrete form. The first binding recorded for a variable
    /// is kept.
    pub fn add_bindings(&mut self, registry: &TypeRegistry, class: Typeref) {
        if let Some(superclass) = registry.superclass(class) {
            self.add_type_arguments(registry, superclass);
        }
    }

    /// Record the bindings carried by a parameterized type, e.g. `Box<String>`
    /// binds `Box.T` to `String`. Does nothing for any other kind of type.
    pub fn add_type_arguments(&mut self, registry: &TypeRegistry, ty: Typeref) {
        let Some(AnyType::Parameterized(parameterized)) = registry.get_cloned(ty) else {
            return;
        };
        let Some(raw) = registry.class(parameterized.raw) else {
            return;
        };

        for (variable, argument) in raw.type_params().iter().zip(&parameterized.arguments) {
            let concrete = self.resolve(registry, *argument);
            self.bindings.entry(*variable).or_insert_with(|| {
                trace!(
                    "Binding {} of {} to {}",
                    registry.fmt(*variable),
                    registry.fmt(parameterized.raw),
                    registry.fmt(concrete)
                );
                concrete
            });
        }
    }

    /// Substitute every bound type variable occurring in `ty`.
    ///
    /// Types without variables are returned unchanged, and so are variables
    /// without a binding.
    pub fn resolve(&self, registry: &TypeRegistry, ty: Typeref) -> Typeref {
        match registry.get_cloned(ty) {
            Some(AnyType::Variable(_)) => self.bindings.get(&ty).copied().unwrap_or(ty),
            Some(AnyType::Parameterized(parameterized)) => {
                let arguments: Vec<Typeref> = parameterized
                    .arguments
                    .iter()
                    .map(|argument| self.resolve(registry, *argument))
                    .collect();
                if arguments == parameterized.arguments {
                    ty
                } else {
                    registry.parameterized(parameterized.raw, arguments)
                }
            }
            Some(AnyType::Array(array)) => {
                let element = self.resolve(registry, array.element);
                if element == array.element {
                    ty
                } else {
                    registry.array(element)
                }
            }
            _ => ty,
        }
    }

    /// The binding recorded for `variable`, if any.
    pub fn binding(&self, variable: Typeref) -> Option<Typeref> {
        self.bindings.get(&variable).copied()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
