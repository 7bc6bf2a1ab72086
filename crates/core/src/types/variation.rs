//! Product variation selections (size, flavor, filling, ...).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a `name=value` variation pair.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum VariationError {
    /// The input has no `=` separator.
    #[error("variation must be written as name=value, got {0:?}")]
    MissingSeparator(String),
    /// The option name is blank.
    #[error("variation name cannot be empty")]
    EmptyName,
}

/// Chosen value per option name.
///
/// Backed by a `BTreeMap`, so iteration is always sorted by option name and
/// two selections with the same pairs compare equal regardless of the order
/// they were chosen in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Variations(BTreeMap<String, String>);

impl Variations {
    /// An empty selection.
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    /// Set the value for an option, replacing any previous choice.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    /// The chosen value for an option.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Pairs sorted by option name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Parse a `name=value` pair, as typed on a command line.
    ///
    /// # Errors
    ///
    /// Returns an error if there is no `=` or the name is blank.
    pub fn parse_pair(input: &str) -> Result<(String, String), VariationError> {
        let (name, value) = input
            .split_once('=')
            .ok_or_else(|| VariationError::MissingSeparator(input.to_owned()))?;
        let name = name.trim();
        if name.is_empty() {
            return Err(VariationError::EmptyName);
        }
        Ok((name.to_owned(), value.trim().to_owned()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Variations {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}
