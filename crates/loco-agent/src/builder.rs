//! Fluent builder for [`EntityStore`].
//!
//! # Usage
//!
//! ```rust
//! use loco_agent::EntityStoreBuilder;
//!
//! #[derive(Default)]
//! struct Health(f32);
//!
//! let mut store = EntityStoreBuilder::new(64)
//!     .register_component::<Health>()
//!     .build();
//!
//! let e = store.spawn(None);
//! assert_eq!(store.get::<Health>(e).map(|h| h.0), Some(0.0));
//! ```

use crate::{ComponentMap, EntityStore};

pub struct EntityStoreBuilder {
    capacity:   usize,
    components: ComponentMap,
}

impl EntityStoreBuilder {
    /// `capacity` only pre-reserves slot storage; the arena grows on demand.
    pub fn new(capacity: usize) -> Self {
        Self { capacity, components: ComponentMap::new() }
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Register an application-defined component type `T`.
    ///
    /// Every entity starts with `T::default()`.  Calling this twice for the
    /// same `T` is harmless.
    pub fn register_component<T: Default + 'static>(mut self) -> Self {
        self.components.register::<T>(0);
        self
    }

    pub fn build(self) -> EntityStore {
        EntityStore::new(self.capacity, self.components)
    }
}
