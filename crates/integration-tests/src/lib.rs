//! Integration tests for Bakehouse.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p bakehouse-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `cart_persistence` - Cart state across file store reopen
//! - `checkout_flow` - Order submission against a fake entity API
//!
//! This library holds the shared fixtures.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;
use std::sync::Mutex;

use bakehouse_core::{AddItem, OrderType, Price, ProductSnapshot};
use bakehouse_storefront::entities::{EntityClient, EntityError};
use serde_json::{Value, json};

/// A fresh, unique cart file path under the system temp directory.
#[must_use]
pub fn scratch_cart_path(test: &str) -> PathBuf {
    std::env::temp_dir()
        .join(format!("bakehouse-it-{test}-{}", uuid::Uuid::new_v4()))
        .join("cart.json")
}

/// A made-to-order cake.
#[must_use]
pub fn cake(size: &str, quantity: u32) -> AddItem {
    AddItem::new(
        ProductSnapshot::new("cake-cenoura", "Carrot cake", Price::from_cents(4500))
            .with_image("https://cdn.bakehouse.test/cake.jpg"),
        quantity,
    )
    .with_variation("size", size)
    .with_order_type(OrderType::ScheduledOrder)
}

/// A display-case pastry.
#[must_use]
pub fn pastry(quantity: u32) -> AddItem {
    AddItem::new(
        ProductSnapshot::new("pao-de-queijo", "Pão de queijo", Price::from_cents(250)),
        quantity,
    )
    .with_order_type(OrderType::SameDayPickup)
}

/// In-process stand-in for the entity API.
///
/// Records every created record and assigns sequential IDs. Set `fail` to
/// make every call return a 503.
#[derive(Debug, Default)]
pub struct FakeEntityApi {
    pub records: Mutex<Vec<(String, Value)>>,
    pub fail: bool,
}

impl FakeEntityApi {
    #[must_use]
    pub fn failing() -> Self {
        Self {
            records: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    /// Number of records created so far.
    ///
    /// # Panics
    ///
    /// Panics if the lock is poisoned.
    #[must_use]
    #[allow(clippy::unwrap_used)]
    pub fn created(&self) -> usize {
        self.records.lock().unwrap().len()
    }
}

impl EntityClient for FakeEntityApi {
    async fn create(&self, entity: &str, data: Value) -> Result<Value, EntityError> {
        if self.fail {
            return Err(EntityError::Status {
                status: 503,
                body: "maintenance".to_string(),
            });
        }

        let mut records = self
            .records
            .lock()
            .map_err(|_| EntityError::Status {
                status: 500,
                body: "poisoned".to_string(),
            })?;
        let id = format!("{}_{}", entity.to_lowercase(), records.len() + 1);
        let mut stored = data.clone();
        if let Value::Object(map) = &mut stored {
            map.insert("id".to_string(), json!(id));
        }
        records.push((entity.to_string(), data));
        drop(records);

        Ok(stored)
    }
}
