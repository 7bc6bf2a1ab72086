//! Shopping cart state and operations.
//!
//! - [`CartStore`] - the mutable cart, persisted on every change
//! - [`CartState`] - a plain snapshot of lines and order type
//! - [`LineItem`] - one product + variation combination

mod line_item;
mod state;
mod store;

pub use line_item::{LineItem, ProductSnapshot, line_id};
pub use state::{CartState, SnapshotError};
pub use store::{AddItem, AddOutcome, CartStore, OrderTypeConflict, QuantityUpdate, keys};
