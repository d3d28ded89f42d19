//! Route parameter values extracted by a successful match

use std::collections::HashMap;
use thiserror::Error;

/// Errors that can occur when reading parameters
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParamError {
    #[error("Missing parameter: {0}")]
    Missing(String),
    #[error("Invalid parameter format: {0}")]
    InvalidFormat(String),
}

/// Ordered parameter values, keyed by name.
///
/// Order follows the template, which is the order handlers receive
/// positional arguments in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteParams {
    entries: Vec<(String, String)>,
}

impl RouteParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.push((name.into(), value.into()));
    }

    /// Get parameter value by name
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Get parameter value as typed value
    pub fn get_typed<T>(&self, name: &str) -> Result<T, ParamError>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        let value = self
            .get(name)
            .ok_or_else(|| ParamError::Missing(name.to_string()))?;
        value.parse::<T>().map_err(|e| {
            ParamError::InvalidFormat(format!(
                "Cannot convert '{}' for parameter '{}': {}",
                value, name, e
            ))
        })
    }

    /// Positional values in template order
    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(_, value)| value.as_str())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn to_map(&self) -> HashMap<String, String> {
        self.entries.iter().cloned().collect()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RouteParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = RouteParams::new();
        for (name, value) in iter {
            params.push(name, value);
        }
        params
    }
}
