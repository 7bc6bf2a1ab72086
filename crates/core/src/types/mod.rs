//! Core types for Bakehouse.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod price;
pub mod status;
pub mod variation;

pub use id::*;
pub use price::Price;
pub use status::*;
pub use variation::{VariationError, Variations};
