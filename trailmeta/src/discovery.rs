//! Property discovery
//!
//! Walks a class hierarchy from the target class up to (but excluding) the
//! universal root, collecting accessor methods and resolving overrides into
//! one canonical [`PropertyDescriptor`] per property.
//!
//! # Override precedence
//!
//! Classes are scanned from the most-derived one upwards. When an ancestor's
//! accessor covariantly subsumes an accessor collected earlier (same name,
//! same parameters, declaring class and return type both assignable from the
//! collected one), the collected descriptor is *replaced* by the ancestor's.
//! The inventory therefore ends up with the least-derived declaration and its
//! return type, while the identity marker of the replaced descriptor is kept.
//! This is possibly unintended (the most specific declaration would usually
//! win) but is kept as is; see the
//! `ancestor_declaration_wins_over_covariant_override` test.
use std::{
    collections::{BTreeMap, BTreeSet},
    sync::Arc,
};

use log::{debug, trace};
use parking_lot::RwLock;

use crate::{
    config::MetaConfig,
    property::{PropertyDescriptor, is_accessor},
    resolve::SubstitutionContext,
    types::{TypeRegistry, Typeref, hierarchy::Method},
};

/// Lists the properties of classes described in a [`TypeRegistry`].
#[derive(Clone, Copy)]
pub struct GetterFactory<'a> {
    registry: &'a TypeRegistry,
    config: &'a MetaConfig,
}

impl<'a> GetterFactory<'a> {
    pub fn new(registry: &'a TypeRegistry, config: &'a MetaConfig) -> Self {
        Self { registry, config }
    }

    /// List every canonical accessor visible on `target`, inherited ones included.
    ///
    /// `target` may be a class or a parameterized type; for the latter the raw
    /// class is walked with its type parameters bound to the given arguments. Any other type, and any class without accessors, yields an
    /// empty list. Never fails.
    pub fn all_getters(&self, target: Typeref) -> Vec<PropertyDescriptor> {
        let registry = self.registry;
        let mut getters: Vec<PropertyDescriptor> = Vec::new();
        let mut context = SubstitutionContext::new();
        context.add_type_arguments(registry, target);
        let mut visited = BTreeSet::new();

        let mut current = Some(registry.erasure(target)).filter(|c| {
            registry.get(*c).is_some_and(|ty| ty.is_class())
        });

        while let Some(class) = current {
            if class == registry.root() || !visited.insert(class) {
                break;
            }

            context.add_bindings(registry, class);

            for method in registry
                .declared_methods(class)
                .filter(|m| is_accessor(registry, m, self.config))
            {
                let mut looks_like_id = method
                    .annotations()
                    .iter()
                    .any(|a| self.config.is_id_annotation(a));

                getters.retain(|existing| {
                    let overridden = self.is_overridden(&method, existing.raw());
                    if overridden {
                        trace!(
                            "{}.{} replaces {}.{}",
                            registry.fmt(method.declaring()),
                            method.name(),
                            registry.fmt(existing.declaring()),
                            existing.raw().name()
                        );
                        looks_like_id |= existing.looks_like_id();
                    }
                    !overridden
                });

                let resolved_type = context.resolve(registry, method.generic_return_type());
                getters.push(PropertyDescriptor::new(
                    method,
                    resolved_type,
                    looks_like_id,
                    self.config,
                ));
            }

            current = registry.superclass(class).map(|s| registry.erasure(s));
        }

        debug!(
            "Discovered {} propert{} on {}",
            getters.len(),
            if getters.len() == 1 { "y" } else { "ies" },
            registry.fmt(target)
        );
        getters
    }

    /// `parent` overrides `to_check` when it is declared on the same class or
    /// an ancestor, has the same name and parameters, and its erased return
    /// type accepts `to_check`'s.
    fn is_overridden(&self, parent: &Method, to_check: &Method) -> bool {
        self.registry
            .is_assignable_from(parent.declaring(), to_check.declaring())
            && parent.name() == to_check.name()
            && self.registry.is_assignable_from(
                self.registry.erasure(parent.generic_return_type()),
                self.registry.erasure(to_check.generic_return_type()),
            )
            && parent.parameters() == to_check.parameters()
    }
}

/// Discover the properties of `target` using the default conventions.
pub fn discover(registry: &TypeRegistry, target: Typeref) -> Vec<PropertyDescriptor> {
    GetterFactory::new(registry, &MetaConfig::default()).all_getters(target)
}

/// Memoises discovery results per class.
///
/// A cache must only ever be used with the registry its entries were computed
/// from, since [`Typeref`]s are registry-local. Discovery is deterministic, so
/// two threads racing on the same class compute equal results and the first
/// insertion wins.
#[derive(Default)]
pub struct PropertyCache {
    config: MetaConfig,
    entries: RwLock<BTreeMap<Typeref, Arc<[PropertyDescriptor]>>>,
}

impl PropertyCache {
    pub fn new(config: MetaConfig) -> Self {
        Self {
            config,
            entries: Default::default(),
        }
    }

    pub fn config(&self) -> &MetaConfig {
        &self.config
    }

    /// Return the cached properties of `class`, discovering them on first use.
    pub fn get_or_discover(&self, registry: &TypeRegistry, class: Typeref) -> Arc<[PropertyDescriptor]> {
        if let Some(found) = self.entries.read().get(&class) {
            return found.clone();
        }

        let discovered: Arc<[PropertyDescriptor]> =
            GetterFactory::new(registry, &self.config).all_getters(class).into();
        self.entries
            .write()
            .entry(class)
            .or_insert(discovered)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }
}
