//! Type tag → column factory mapping.
//!
//! The [`TypeRegistry`] is what lets a container rebuild heterogeneous
//! columns from nothing but the type tags stored in a persisted stream.
//! It uses `IndexMap` so that [`TypeRegistry::tags`] iterates in
//! registration order.

use std::any::TypeId;

use indexmap::IndexMap;
use strata_core::Element;

use crate::chunked::ChunkedColumn;
use crate::erased::AnyColumn;

/// Builds an empty column with the given chunk size.
pub type ColumnFactory = fn(u32) -> Box<dyn AnyColumn>;

fn make_column<T: Element>(chunk_size: u32) -> Box<dyn AnyColumn> {
    Box::new(ChunkedColumn::<T>::new(chunk_size))
}

#[derive(Clone, Copy)]
struct Registration {
    type_id: TypeId,
    factory: ColumnFactory,
}

/// Maps element type tags to factories producing erased columns.
#[derive(Clone, Default)]
pub struct TypeRegistry {
    entries: IndexMap<&'static str, Registration>,
}

impl TypeRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry pre-populated with every built-in element type.
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.register::<bool>();
        registry.register::<u8>();
        registry.register::<u16>();
        registry.register::<u32>();
        registry.register::<u64>();
        registry.register::<i8>();
        registry.register::<i16>();
        registry.register::<i32>();
        registry.register::<i64>();
        registry.register::<f32>();
        registry.register::<f64>();
        registry.register::<[f32; 2]>();
        registry.register::<[f32; 3]>();
        registry.register::<[f64; 2]>();
        registry.register::<[f64; 3]>();
        registry.register::<[u32; 2]>();
        registry.register::<[u32; 3]>();
        registry.register::<String>();
        registry
    }

    /// Register `T` under its type tag.
    ///
    /// Registering the same type again is a no-op. Returns `true` if the
    /// tag was newly added.
    ///
    /// # Panics
    ///
    /// Panics if a different type is already registered under `T::TYPE_TAG`.
    pub fn register<T: Element>(&mut self) -> bool {
        let type_id = TypeId::of::<T>();
        if let Some(existing) = self.entries.get(T::TYPE_TAG) {
            assert!(
                existing.type_id == type_id,
                "type tag '{}' is already registered for a different type",
                T::TYPE_TAG,
            );
            return false;
        }
        self.entries.insert(
            T::TYPE_TAG,
            Registration {
                type_id,
                factory: make_column::<T>,
            },
        );
        true
    }

    /// Build an empty column for `tag`, or `None` if the tag is unknown.
    pub fn create(&self, tag: &str, chunk_size: u32) -> Option<Box<dyn AnyColumn>> {
        self.entries.get(tag).map(|reg| (reg.factory)(chunk_size))
    }

    /// Whether `tag` is registered.
    pub fn contains(&self, tag: &str) -> bool {
        self.entries.contains_key(tag)
    }

    /// Number of registered types.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no types are registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registered tags in registration order.
    pub fn tags(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.keys().copied()
    }
}

impl std::fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.entries.keys()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{self, Read, Write};

    #[derive(Clone, Debug, Default, PartialEq)]
    struct Label(u32);

    impl Element for Label {
        const TYPE_TAG: &'static str = "Label";

        fn encode(&self, w: &mut dyn Write) -> io::Result<()> {
            self.0.encode(w)
        }

        fn decode(r: &mut dyn Read) -> io::Result<Self> {
            u32::decode(r).map(Label)
        }
    }

    #[derive(Clone, Debug, Default)]
    struct Impostor;

    impl Element for Impostor {
        const TYPE_TAG: &'static str = "Label";

        fn encode(&self, _w: &mut dyn Write) -> io::Result<()> {
            Ok(())
        }

        fn decode(_r: &mut dyn Read) -> io::Result<Self> {
            Ok(Impostor)
        }
    }

    #[test]
    fn builtin_registry_creates_each_type() {
        let registry = TypeRegistry::with_builtin();
        assert_eq!(registry.len(), 18);
        for tag in registry.tags() {
            let col = registry.create(tag, 8).unwrap();
            assert_eq!(col.type_tag(), tag);
            assert_eq!(col.chunk_size(), 8);
        }
    }

    #[test]
    fn unknown_tag_creates_nothing() {
        let registry = TypeRegistry::with_builtin();
        assert!(registry.create("Label", 8).is_none());
        assert!(!registry.contains("Label"));
    }

    #[test]
    fn register_is_idempotent() {
        let mut registry = TypeRegistry::new();
        assert!(registry.register::<Label>());
        assert!(!registry.register::<Label>());
        assert_eq!(registry.len(), 1);
        let col = registry.create("Label", 4).unwrap();
        assert!(crate::erased::downcast_ref::<Label>(col.as_ref()).is_some());
    }

    #[test]
    #[should_panic(expected = "already registered for a different type")]
    fn conflicting_tag_panics() {
        let mut registry = TypeRegistry::new();
        registry.register::<Label>();
        registry.register::<Impostor>();
    }
}
