//! Feature type classifier.
//!
//! Maps tag paths to the integer type ids carried by feature builders.
//! Only the types the tiling core needs are registered; the surrounding
//! program is expected to share the same registry.

use std::collections::HashMap;

/// Tag path of the coastline type.
pub const COASTLINE_PATH: [&str; 2] = ["natural", "coastline"];

/// Registry of feature type ids keyed by tag path.
pub struct Classifier {
    types: HashMap<Vec<String>, u32>,
}

impl Classifier {
    /// Create a registry seeded with the built-in types.
    pub fn new() -> Self {
        let mut types = HashMap::new();
        types.insert(
            COASTLINE_PATH.iter().map(|s| s.to_string()).collect(),
            1u32,
        );
        Self { types }
    }

    /// Look up the type id for a tag path.
    pub fn type_by_path(&self, path: &[&str]) -> Option<u32> {
        let key: Vec<String> = path.iter().map(|s| s.to_string()).collect();
        self.types.get(&key).copied()
    }

    /// The coastline type id.
    pub fn coastline_type(&self) -> u32 {
        self.type_by_path(&COASTLINE_PATH)
            .expect("coastline type is always registered")
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coastline_type_registered() {
        let classifier = Classifier::new();
        assert_eq!(
            classifier.type_by_path(&["natural", "coastline"]),
            Some(classifier.coastline_type())
        );
    }

    #[test]
    fn test_unknown_path_is_none() {
        let classifier = Classifier::new();
        assert_eq!(classifier.type_by_path(&["highway", "residential"]), None);
    }
}
