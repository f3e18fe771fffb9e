//! `loco-agent`: generational entity storage for the `loco` framework.
//!
//! # Crate layout
//!
//! | Module          | Contents                                                     |
//! |-----------------|--------------------------------------------------------------|
//! | [`component`]   | `ComponentVec` trait, `TypedComponentVec<T>`, `ComponentMap` |
//! | [`store`]       | `EntityStore` (slot arena, deletion marking, flush)          |
//! | [`builder`]     | `EntityStoreBuilder` (fluent construction)                   |

pub mod builder;
pub mod component;
pub mod store;


pub use builder::EntityStoreBuilder;
pub use component::{ComponentMap, ComponentVec, TypedComponentVec};
pub use store::EntityStore;
