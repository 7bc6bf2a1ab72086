//! Application state constructed once at startup.

use bakehouse_core::CartStore;
use chrono::NaiveDate;

use crate::checkout::{self, FulfillmentDetails, SubmittedOrder};
use crate::config::StorefrontConfig;
use crate::entities::HttpEntityClient;
use crate::error::{AppError, Result};
use crate::storage::FileStore;

/// Everything a cart consumer needs: configuration, the persisted cart, and
/// the entity API client when one is configured.
///
/// There is exactly one per process; consumers borrow it.
#[derive(Debug)]
pub struct AppState {
    config: StorefrontConfig,
    cart: CartStore<FileStore>,
    entities: Option<HttpEntityClient>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// Opens the cart file and restores the cart from it.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity API client cannot be created.
    pub fn new(config: StorefrontConfig) -> Result<Self> {
        let cart = CartStore::load(FileStore::open(&config.cart_path));
        let entities = config
            .api
            .as_ref()
            .map(HttpEntityClient::new)
            .transpose()?;

        tracing::debug!(
            cart_path = %config.cart_path.display(),
            api = entities.is_some(),
            "Application state ready"
        );

        Ok(Self {
            config,
            cart,
            entities,
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub const fn config(&self) -> &StorefrontConfig {
        &self.config
    }

    #[must_use]
    pub const fn cart(&self) -> &CartStore<FileStore> {
        &self.cart
    }

    pub const fn cart_mut(&mut self) -> &mut CartStore<FileStore> {
        &mut self.cart
    }

    /// Submit the cart as an order.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotConfigured` without an entity API, or the
    /// checkout error.
    pub async fn checkout(
        &mut self,
        details: &FulfillmentDetails,
        today: NaiveDate,
    ) -> Result<SubmittedOrder> {
        let (Some(api), Some(client)) = (self.config.api.as_ref(), self.entities.as_ref()) else {
            return Err(AppError::NotConfigured(
                "BAKEHOUSE_API_URL must be set to check out".to_string(),
            ));
        };

        Ok(checkout::submit_order(&mut self.cart, client, &api.order_entity, details, today).await?)
    }
}
