//! Type-erased, heterogeneous component storage.
//!
//! # Design
//!
//! Each component type `T` is stored as a `Vec<T>` behind a
//! `Box<dyn ComponentVec>` in a `HashMap<TypeId, …>`.  Indexing is always by
//! entity slot (`vec[handle.index()]`), so component arrays are kept the same
//! length as the entity arena at all times.  A slot that is freed and later
//! reused has its components reset to `T::default()`.
//!
//! # Usage
//!
//! ```rust
//! use loco_agent::ComponentMap;
//!
//! #[derive(Default)]
//! struct Health(f32);
//!
//! let mut map = ComponentMap::new();
//! map.register::<Health>(0);
//! assert!(map.contains::<Health>());
//! ```

use std::any::{Any, TypeId};
use std::collections::HashMap;

// ── Trait object ──────────────────────────────────────────────────────────────

/// Type-erased interface for a per-slot `Vec<T>`.
///
/// Sealed via the private `Sealed` supertrait so external implementations
/// cannot break the length invariant.
pub trait ComponentVec: 'static + sealed::Sealed {
    /// Append `T::default()` for a newly allocated slot.
    fn push_default(&mut self);

    /// Overwrite slot `index` with `T::default()` (slot reuse).
    fn reset(&mut self, index: usize);

    /// Current element count (always equals the arena's slot count).
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[doc(hidden)]
    fn as_any(&self) -> &dyn Any;

    #[doc(hidden)]
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

mod sealed {
    pub trait Sealed {}
}

// ── Concrete wrapper ──────────────────────────────────────────────────────────

/// A `Vec<T>` wrapped so it can be stored as `Box<dyn ComponentVec>`.
pub struct TypedComponentVec<T: Default + 'static>(pub Vec<T>);

impl<T: Default + 'static> sealed::Sealed for TypedComponentVec<T> {}

impl<T: Default + 'static> ComponentVec for TypedComponentVec<T> {
    fn push_default(&mut self) {
        self.0.push(T::default());
    }

    fn reset(&mut self, index: usize) {
        if let Some(slot) = self.0.get_mut(index) {
            *slot = T::default();
        }
    }

    fn len(&self) -> usize {
        self.0.len()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

// ── ComponentMap ──────────────────────────────────────────────────────────────

/// Registry of application-defined component arrays, one `Vec<T>` per type.
#[derive(Default)]
pub struct ComponentMap {
    map: HashMap<TypeId, Box<dyn ComponentVec>>,
}

impl ComponentMap {
    pub fn new() -> Self {
        Self { map: HashMap::new() }
    }

    /// Register component type `T`, pre-filling `current_count` default values.
    ///
    /// Calling this twice for the same `T` is a no-op; existing data is not
    /// disturbed.
    pub fn register<T: Default + 'static>(&mut self, current_count: usize) {
        let key = TypeId::of::<T>();
        if self.map.contains_key(&key) {
            return;
        }
        let mut vec = TypedComponentVec::<T>(Vec::with_capacity(current_count));
        for _ in 0..current_count {
            vec.push_default();
        }
        self.map.insert(key, Box::new(vec));
    }

    /// Append `T::default()` for every registered component type.
    pub(crate) fn push_defaults(&mut self) {
        for vec in self.map.values_mut() {
            vec.push_default();
        }
    }

    /// Reset slot `index` of every registered component type.
    pub(crate) fn reset_slot(&mut self, index: usize) {
        for vec in self.map.values_mut() {
            vec.reset(index);
        }
    }

    // ── Read access ───────────────────────────────────────────────────────

    /// Shared slice of component `T` for all slots.
    ///
    /// Returns `None` if `T` was never registered.
    pub fn get<T: Default + 'static>(&self) -> Option<&[T]> {
        self.map
            .get(&TypeId::of::<T>())
            .and_then(|v| v.as_any().downcast_ref::<TypedComponentVec<T>>())
            .map(|v| v.0.as_slice())
    }

    /// Mutable slice of component `T`.
    pub fn get_mut<T: Default + 'static>(&mut self) -> Option<&mut [T]> {
        self.map
            .get_mut(&TypeId::of::<T>())
            .and_then(|v| v.as_any_mut().downcast_mut::<TypedComponentVec<T>>())
            .map(|v| v.0.as_mut_slice())
    }

    // ── Metadata ──────────────────────────────────────────────────────────

    pub fn type_count(&self) -> usize {
        self.map.len()
    }

    pub fn contains<T: Default + 'static>(&self) -> bool {
        self.map.contains_key(&TypeId::of::<T>())
    }
}
