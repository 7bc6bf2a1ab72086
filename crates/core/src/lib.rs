//! Bakehouse Core - Cart types and state.
//!
//! This crate provides the types and the cart state machine used across all
//! Bakehouse components:
//! - `storefront` - Configuration, file persistence, checkout submission
//! - `cli` - Command-line cart management
//!
//! # Architecture
//!
//! The core crate contains only types, traits, and pure state transitions -
//! no network, no filesystem. Persistence reaches the cart through the
//! [`KeyValueStore`] trait so any medium (or an in-memory fake) can back it.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, prices, variations, and statuses
//! - [`cart`] - The cart store and its line items
//! - [`storage`] - The key-value persistence capability

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod storage;
pub mod types;

pub use cart::*;
pub use storage::{KeyValueStore, MemoryStore, StorageError};
pub use types::*;
