//! Unified error handling.
//!
//! Provides a unified `AppError` type for everything the storefront library
//! can fail at. Cart mutations themselves never fail; only startup and
//! checkout do.

use thiserror::Error;

use crate::checkout::CheckoutError;
use crate::config::ConfigError;
use crate::entities::EntityError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Entity API client could not be created.
    #[error("Entity API error: {0}")]
    Entity(#[from] EntityError),

    /// Checkout failed.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// An operation needs the entity API but none is configured.
    #[error("Not configured: {0}")]
    NotConfigured(String),

    /// Bad input from the user.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl AppError {
    /// Whether retrying the same operation later might succeed.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Entity(EntityError::Http(_) | EntityError::RateLimited(_))
                | Self::Checkout(CheckoutError::Entity(
                    EntityError::Http(_) | EntityError::RateLimited(_)
                ))
        )
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotConfigured("BAKEHOUSE_API_URL".to_string());
        assert_eq!(err.to_string(), "Not configured: BAKEHOUSE_API_URL");

        let err = AppError::from(CheckoutError::EmptyCart);
        assert_eq!(err.to_string(), "Checkout error: Cart is empty");
    }

    #[test]
    fn test_is_transient() {
        assert!(AppError::from(CheckoutError::Entity(EntityError::RateLimited(3))).is_transient());
        assert!(!AppError::from(CheckoutError::EmptyCart).is_transient());
        assert!(
            !AppError::from(EntityError::Status {
                status: 400,
                body: String::new(),
            })
            .is_transient()
        );
    }
}
