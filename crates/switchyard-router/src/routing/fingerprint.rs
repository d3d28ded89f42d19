//! Route set fingerprints
//!
//! Hosts persist the fingerprint of the last registered rewrite route set
//! and only rebuild their rule cache when it changes.

use super::{HttpMethod, Position};
use serde::Serialize;

/// The parts of a route that affect host rewrite rules
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FingerprintEntry {
    pub name: Option<String>,
    pub path: String,
    pub methods: Vec<HttpMethod>,
    pub position: Position,
}

impl FingerprintEntry {
    /// Methods are sorted so declaration order does not matter
    pub fn new(
        name: Option<&str>,
        path: impl Into<String>,
        methods: &[HttpMethod],
        position: Position,
    ) -> Self {
        let mut methods = methods.to_vec();
        methods.sort();
        methods.dedup();
        Self {
            name: name.map(str::to_string),
            path: path.into(),
            methods,
            position,
        }
    }
}

/// Hex BLAKE3 digest over the ordered entries
pub fn fingerprint<'a, I>(entries: I) -> String
where
    I: IntoIterator<Item = &'a FingerprintEntry>,
{
    let mut hasher = blake3::Hasher::new();
    for entry in entries {
        // Serializing a plain struct of strings and unit enums cannot fail
        let encoded = serde_json::to_vec(entry).unwrap_or_default();
        hasher.update(&(encoded.len() as u64).to_le_bytes());
        hasher.update(&encoded);
    }
    hex::encode(hasher.finalize().as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(path: &str, methods: &[HttpMethod], position: Position) -> FingerprintEntry {
        FingerprintEntry::new(Some("r"), path, methods, position)
    }

    #[test]
    fn test_stable_for_identical_sets() {
        let a = vec![entry("users/{id}", &[HttpMethod::GET], Position::Top)];
        let b = vec![entry("users/{id}", &[HttpMethod::GET], Position::Top)];
        assert_eq!(fingerprint(&a), fingerprint(&b));
        assert_eq!(fingerprint(&a).len(), 64);
    }

    #[test]
    fn test_method_order_ignored() {
        let a = vec![entry("x", &[HttpMethod::GET, HttpMethod::POST], Position::Top)];
        let b = vec![entry("x", &[HttpMethod::POST, HttpMethod::GET], Position::Top)];
        assert_eq!(fingerprint(&a), fingerprint(&b));
    }

    #[test]
    fn test_changes_on_path_methods_or_position() {
        let base = fingerprint(&[entry("x", &[HttpMethod::GET], Position::Top)]);
        assert_ne!(base, fingerprint(&[entry("y", &[HttpMethod::GET], Position::Top)]));
        assert_ne!(base, fingerprint(&[entry("x", &[HttpMethod::PUT], Position::Top)]));
        assert_ne!(base, fingerprint(&[entry("x", &[HttpMethod::GET], Position::Bottom)]));
    }

    #[test]
    fn test_empty_set_has_fingerprint() {
        assert_eq!(fingerprint(&[]), fingerprint(&Vec::new()));
    }
}
