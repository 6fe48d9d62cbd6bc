// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Named layout styles.

use alloc::{boxed::Box, string::String};
use hashbrown::HashMap;

use crate::error::LayoutError;
use crate::layout::Layout;

/// Builds a fresh layout instance for one node.
pub type LayoutFactory = Box<dyn Fn() -> Box<dyn Layout>>;

/// Mapping from style names to layout constructors.
///
/// The first name ever registered becomes the default style, used by the
/// root (and so by every node below it) when no node on the way up carries
/// an explicit style. Registering a name again replaces its constructor but
/// leaves the default alone.
///
/// A registry is an ordinary value: the [`Layouter`](crate::Layouter) owns
/// one, and tests can build as many scoped registries as they like.
///
/// ```rust
/// use understory_tree_layout::{Layout, LayoutCx, LayoutError, LayoutRegistry};
///
/// #[derive(Default)]
/// struct Stack;
///
/// impl Layout for Stack {
///     fn layout(&mut self, _cx: &mut LayoutCx<'_>) -> Result<(), LayoutError> {
///         Ok(())
///     }
/// }
///
/// let mut registry = LayoutRegistry::new();
/// registry.register_default::<Stack>("stack");
/// registry.register_default::<Stack>("other");
/// assert_eq!(registry.default_style(), Some("stack"));
/// assert!(registry.instantiate("missing").is_err());
/// ```
#[derive(Default)]
pub struct LayoutRegistry {
    factories: HashMap<String, LayoutFactory>,
    default_style: Option<String>,
}

impl core::fmt::Debug for LayoutRegistry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LayoutRegistry")
            .field("styles", &self.factories.len())
            .field("default_style", &self.default_style)
            .finish_non_exhaustive()
    }
}

impl LayoutRegistry {
    /// An empty registry with no default style.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the constructor for `name`.
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn() -> Box<dyn Layout> + 'static,
    {
        let name = name.into();
        if self.default_style.is_none() {
            log::debug!("default layout style is now `{name}`");
            self.default_style = Some(name.clone());
        }
        self.factories.insert(name, Box::new(factory));
    }

    /// Register `L` under `name`, constructing it with [`Default`].
    pub fn register_default<L>(&mut self, name: impl Into<String>)
    where
        L: Layout + Default + 'static,
    {
        self.register(name, || Box::new(L::default()) as Box<dyn Layout>);
    }

    /// Whether `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// The style used where no node sets one, if any style is registered.
    pub fn default_style(&self) -> Option<&str> {
        self.default_style.as_deref()
    }

    /// Switch the default to an already registered style.
    pub fn set_default_style(&mut self, name: &str) -> Result<(), LayoutError> {
        if !self.contains(name) {
            return Err(LayoutError::UnknownStyle(name.into()));
        }
        self.default_style = Some(name.into());
        Ok(())
    }

    /// Registered names, in no particular order.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.factories.keys().map(String::as_str)
    }

    /// Number of registered styles.
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// Whether nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Construct a fresh instance of the style `name`.
    pub fn instantiate(&self, name: &str) -> Result<Box<dyn Layout>, LayoutError> {
        self.factories
            .get(name)
            .map(|factory| factory())
            .ok_or_else(|| LayoutError::UnknownStyle(name.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::LayoutCx;
    use alloc::vec::Vec;
    use core::cell::Cell;

    #[derive(Default)]
    struct Noop;

    impl Layout for Noop {
        fn layout(&mut self, _cx: &mut LayoutCx<'_>) -> Result<(), LayoutError> {
            Ok(())
        }
    }

    #[test]
    fn first_registration_sets_default() {
        let mut r = LayoutRegistry::new();
        assert_eq!(r.default_style(), None);
        r.register_default::<Noop>("right");
        r.register_default::<Noop>("radial");
        assert_eq!(r.default_style(), Some("right"));
        assert_eq!(r.len(), 2);
    }

    #[test]
    fn reregistering_keeps_default() {
        let mut r = LayoutRegistry::new();
        r.register_default::<Noop>("right");
        r.register_default::<Noop>("radial");
        r.register_default::<Noop>("radial");
        assert_eq!(r.default_style(), Some("right"));
        assert_eq!(r.len(), 2);
    }

    #[test]
    fn instantiate_builds_fresh_instances() {
        let built = alloc::rc::Rc::new(Cell::new(0_u32));
        let counter = built.clone();
        let mut r = LayoutRegistry::new();
        r.register("counted", move || {
            counter.set(counter.get() + 1);
            Box::new(Noop) as Box<dyn Layout>
        });
        let _a = r.instantiate("counted").unwrap();
        let _b = r.instantiate("counted").unwrap();
        assert_eq!(built.get(), 2);
    }

    #[test]
    fn unknown_style_is_an_error() {
        let r = LayoutRegistry::new();
        assert!(matches!(
            r.instantiate("ghost"),
            Err(LayoutError::UnknownStyle(name)) if name == "ghost"
        ));
    }

    #[test]
    fn default_can_only_move_to_registered_names() {
        let mut r = LayoutRegistry::new();
        r.register_default::<Noop>("right");
        r.register_default::<Noop>("radial");
        assert_eq!(
            r.set_default_style("ghost"),
            Err(LayoutError::UnknownStyle("ghost".into()))
        );
        r.set_default_style("radial").unwrap();
        assert_eq!(r.default_style(), Some("radial"));

        let mut names: Vec<_> = r.names().collect();
        names.sort_unstable();
        assert_eq!(names, ["radial", "right"]);
    }
}
