//! Generational entity arena.
//!
//! # Slot lifecycle
//!
//! ```text
//!   spawn ──► alive ──mark_for_deletion──► alive + marked ──flush──► free
//!                                                                     │
//!   spawn (reuse, generation already bumped) ◄────────────────────────┘
//! ```
//!
//! A marked entity still resolves until the end-of-tick flush so that logic
//! running later in the same tick (an Attack task checking whether its target
//! is being destroyed) can observe it.  Flushing bumps the slot generation;
//! every outstanding `EntityHandle` to the old occupant then fails
//! [`EntityStore::resolve`].

use loco_core::{BodyId, EntityHandle};

use crate::component::ComponentMap;

/// Structure-of-Arrays storage for every entity slot.
///
/// Every `Vec` field has exactly `slot_count()` elements; `handle.index()` is
/// the index into all of them.
pub struct EntityStore {
    generations: Vec<u32>,
    alive:       Vec<bool>,
    marked:      Vec<bool>,

    /// Physics body owned by the entity, if any.
    pub body: Vec<Option<BodyId>>,

    /// Freed slot indices, reused LIFO.
    free: Vec<u32>,

    components: ComponentMap,
}

impl EntityStore {
    pub(crate) fn new(capacity: usize, components: ComponentMap) -> Self {
        Self {
            generations: Vec::with_capacity(capacity),
            alive:       Vec::with_capacity(capacity),
            marked:      Vec::with_capacity(capacity),
            body:        Vec::with_capacity(capacity),
            free:        Vec::new(),
            components,
        }
    }

    /// Number of slots ever allocated (live or free).
    #[inline]
    pub fn slot_count(&self) -> usize {
        self.generations.len()
    }

    /// Number of live entities (marked ones included).
    pub fn live_count(&self) -> usize {
        self.alive.iter().filter(|a| **a).count()
    }

    pub fn is_empty(&self) -> bool {
        self.live_count() == 0
    }

    // ── Lifecycle ─────────────────────────────────────────────────────────

    /// Allocate a new entity, reusing a freed slot when one exists.
    pub fn spawn(&mut self, body: Option<BodyId>) -> EntityHandle {
        if let Some(index) = self.free.pop() {
            let i = index as usize;
            self.alive[i] = true;
            self.marked[i] = false;
            self.body[i] = body;
            self.components.reset_slot(i);
            return EntityHandle::new(index, self.generations[i]);
        }

        let index = self.generations.len() as u32;
        self.generations.push(0);
        self.alive.push(true);
        self.marked.push(false);
        self.body.push(body);
        self.components.push_defaults();
        EntityHandle::new(index, 0)
    }

    /// Slot index of `handle` if it refers to a live entity of the current
    /// generation.
    #[inline]
    pub fn resolve(&self, handle: EntityHandle) -> Option<usize> {
        let i = handle.index();
        (i < self.generations.len() && self.alive[i] && self.generations[i] == handle.generation)
            .then_some(i)
    }

    #[inline]
    pub fn is_alive(&self, handle: EntityHandle) -> bool {
        self.resolve(handle).is_some()
    }

    /// Body owned by `handle`, if it resolves and has one.
    pub fn body(&self, handle: EntityHandle) -> Option<BodyId> {
        self.resolve(handle).and_then(|i| self.body[i])
    }

    /// Flag `handle` for removal at the next [`flush_deletions`](Self::flush_deletions).
    ///
    /// Returns `false` if the handle is stale.
    pub fn mark_for_deletion(&mut self, handle: EntityHandle) -> bool {
        match self.resolve(handle) {
            Some(i) => {
                self.marked[i] = true;
                true
            }
            None => false,
        }
    }

    /// `true` if `handle` resolves and is awaiting deletion.
    pub fn is_marked(&self, handle: EntityHandle) -> bool {
        self.resolve(handle).is_some_and(|i| self.marked[i])
    }

    /// Free every marked slot, bumping its generation.
    ///
    /// Returns the removed handles (as they were before the bump) together
    /// with the body each one owned, in ascending slot order.
    pub fn flush_deletions(&mut self) -> Vec<(EntityHandle, Option<BodyId>)> {
        let mut removed = Vec::new();
        for i in 0..self.generations.len() {
            if !(self.alive[i] && self.marked[i]) {
                continue;
            }
            removed.push((EntityHandle::new(i as u32, self.generations[i]), self.body[i].take()));
            self.alive[i] = false;
            self.marked[i] = false;
            self.generations[i] = self.generations[i].wrapping_add(1);
            self.free.push(i as u32);
        }
        if !removed.is_empty() {
            log::debug!("flushed {} entities", removed.len());
        }
        removed
    }

    /// Live handles in ascending slot order.
    pub fn handles(&self) -> impl Iterator<Item = EntityHandle> + '_ {
        (0..self.generations.len())
            .filter(|&i| self.alive[i])
            .map(|i| EntityHandle::new(i as u32, self.generations[i]))
    }

    // ── Component access ──────────────────────────────────────────────────

    /// Read-only slice of application component `T`, indexed by slot.
    pub fn component<T: Default + 'static>(&self) -> Option<&[T]> {
        self.components.get::<T>()
    }

    pub fn component_mut<T: Default + 'static>(&mut self) -> Option<&mut [T]> {
        self.components.get_mut::<T>()
    }

    /// Component `T` of a single live entity.
    pub fn get<T: Default + 'static>(&self, handle: EntityHandle) -> Option<&T> {
        let i = self.resolve(handle)?;
        self.components.get::<T>().and_then(|s| s.get(i))
    }

    pub fn get_mut<T: Default + 'static>(&mut self, handle: EntityHandle) -> Option<&mut T> {
        let i = self.resolve(handle)?;
        self.components.get_mut::<T>().and_then(|s| s.get_mut(i))
    }

    pub fn components(&self) -> &ComponentMap {
        &self.components
    }
}
