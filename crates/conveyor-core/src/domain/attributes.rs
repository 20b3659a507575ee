//! Attribute bags: parameters and tags.
//!
//! Both are fixed at task construction and read-only afterward. BTree
//! containers give the stable iteration order the storage form relies
//! on.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

/// Key -> JSON value inputs handed to the job at execution time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Parameters(BTreeMap<String, Value>);

impl Parameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<BTreeMap<String, Value>> for Parameters {
    fn from(map: BTreeMap<String, Value>) -> Self {
        Self(map)
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Parameters {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// Set of string labels used for filtering and classification, never
/// for execution logic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tags(BTreeSet<String>);

impl Tags {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has(&self, tag: &str) -> bool {
        self.0.contains(tag)
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<BTreeSet<String>> for Tags {
    fn from(set: BTreeSet<String>) -> Self {
        Self(set)
    }
}

impl<S: Into<String>> FromIterator<S> for Tags {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parameters_lookup() {
        let params: Parameters = [("to", json!("a@b.com")), ("retries", json!(3))]
            .into_iter()
            .collect();

        assert_eq!(params.get("to"), Some(&json!("a@b.com")));
        assert_eq!(params.get("missing"), None);
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn parameters_iterate_in_key_order() {
        let params: Parameters = [("b", json!(2)), ("a", json!(1))].into_iter().collect();
        let keys: Vec<&String> = params.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, ["a", "b"]);
    }

    #[test]
    fn tags_membership() {
        let tags: Tags = ["email", "reporting"].into_iter().collect();

        assert!(tags.has("email"));
        assert!(!tags.has("billing"));
    }

    #[test]
    fn tags_deduplicate() {
        let tags: Tags = ["a", "a", "b"].into_iter().collect();
        assert_eq!(tags.len(), 2);
    }

    #[test]
    fn bags_serialize_transparently() {
        let params: Parameters = [("to", json!("a@b.com"))].into_iter().collect();
        assert_eq!(
            serde_json::to_string(&params).unwrap(),
            r#"{"to":"a@b.com"}"#
        );

        let tags: Tags = ["b", "a"].into_iter().collect();
        assert_eq!(serde_json::to_string(&tags).unwrap(), r#"["a","b"]"#);
    }
}
