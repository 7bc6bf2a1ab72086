//! Bakehouse Storefront library.
//!
//! Runtime pieces around the core cart, kept as a library so the CLI and
//! the integration tests share them:
//!
//! - [`config`] - Environment configuration
//! - [`storage`] - JSON file key-value store backing the cart
//! - [`entities`] - Entity API client used at checkout
//! - [`checkout`] - Order validation and submission
//! - [`state`] - Application state built once at startup
//! - [`view`] - Display formatting for carts

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod checkout;
pub mod config;
pub mod entities;
pub mod error;
pub mod state;
pub mod storage;
pub mod view;
