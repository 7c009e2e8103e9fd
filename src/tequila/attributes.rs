use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// Name of the attribute carrying the comma-separated group list.
pub const GROUP_ATTRIBUTE: &str = "group";

/// User attributes released by the Tequila server, every value normalized to a list.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AttributeSet(BTreeMap<String, Vec<String>>);

impl AttributeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalizes a decoded `fetchattributes` response.
    pub fn from_wire(fields: HashMap<String, String>) -> Self {
        let attributes = fields
            .into_iter()
            .map(|(name, value)| {
                let values = if name == GROUP_ATTRIBUTE {
                    value.split(',').map(str::to_string).collect()
                } else {
                    vec![value]
                };
                (name, values)
            })
            .collect();

        Self(attributes)
    }

    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.0.get(name).map(Vec::as_slice)
    }

    pub fn insert(&mut self, name: impl Into<String>, values: Vec<String>) {
        self.0.insert(name.into(), values);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Keeps only the named attributes, skipping names the user does not have.
    pub fn select<S: AsRef<str>>(&self, names: &[S]) -> Self {
        let selected = names
            .iter()
            .filter_map(|name| {
                self.0
                    .get_key_value(name.as_ref())
                    .map(|(k, v)| (k.clone(), v.clone()))
            })
            .collect();

        Self(selected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wire(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_single_values_become_lists() {
        let attributes = AttributeSet::from_wire(wire(&[("name", "Jane"), ("email", "j@x")]));

        assert_eq!(attributes.get("name"), Some(&["Jane".to_string()][..]));
        assert_eq!(attributes.get("email"), Some(&["j@x".to_string()][..]));
        assert_eq!(attributes.len(), 2);
    }

    #[test]
    fn test_group_is_split_on_commas() {
        let attributes = AttributeSet::from_wire(wire(&[("group", "a,b,c")]));

        assert_eq!(
            attributes.get("group"),
            Some(&["a".to_string(), "b".to_string(), "c".to_string()][..])
        );
    }

    #[test]
    fn test_other_attributes_keep_commas() {
        let attributes = AttributeSet::from_wire(wire(&[("displayname", "Doe, Jane")]));
        assert_eq!(
            attributes.get("displayname"),
            Some(&["Doe, Jane".to_string()][..])
        );
    }

    #[test]
    fn test_select() {
        let attributes = AttributeSet::from_wire(wire(&[
            ("name", "Jane"),
            ("email", "j@x"),
            ("group", "a"),
        ]));

        let selected = attributes.select(&["email", "uniqueid"]);
        assert_eq!(selected.len(), 1);
        assert!(selected.contains("email"));
        assert!(!selected.contains("name"));
    }

    #[test]
    fn test_serializes_as_plain_map() {
        let attributes = AttributeSet::from_wire(wire(&[("group", "a,b")]));
        let json = serde_json::to_string(&attributes).unwrap();
        assert_eq!(json, r#"{"group":["a","b"]}"#);
    }
}
