use crate::objects::Object;
use std::collections::BTreeMap;

/// A PDF dictionary with name keys.
///
/// Backed by a `BTreeMap` so key iteration is sorted and serialized output is
/// byte-stable across runs.
#[derive(Debug, Clone, PartialEq)]
pub struct Dictionary {
    entries: BTreeMap<String, Object>,
}

impl Dictionary {
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Object>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Object> {
        self.entries.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Object> {
        self.entries.get_mut(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<Object> {
        self.entries.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.entries.keys()
    }

    pub fn entries(&self) -> impl Iterator<Item = (&String, &Object)> {
        self.entries.iter()
    }

    pub fn get_dict(&self, key: &str) -> Option<&Dictionary> {
        self.get(key).and_then(|obj| {
            if let Object::Dictionary(dict) = obj {
                Some(dict)
            } else {
                None
            }
        })
    }
}

impl Default for Dictionary {
    fn default() -> Self {
        Self::new()
    }
}

impl FromIterator<(String, Object)> for Dictionary {
    fn from_iter<T: IntoIterator<Item = (String, Object)>>(iter: T) -> Self {
        let mut dict = Dictionary::new();
        for (key, value) in iter {
            dict.set(key, value);
        }
        dict
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_dictionary() {
        let dict = Dictionary::new();
        assert!(dict.is_empty());
        assert_eq!(dict.len(), 0);
    }

    #[test]
    fn test_set_and_get() {
        let mut dict = Dictionary::new();
        dict.set("Name", "Test");
        dict.set("Age", 42);
        dict.set("Active", true);

        assert_eq!(dict.get("Name"), Some(&Object::String("Test".to_string())));
        assert_eq!(dict.get("Age"), Some(&Object::Integer(42)));
        assert_eq!(dict.get("Active"), Some(&Object::Boolean(true)));
        assert_eq!(dict.get("Missing"), None);
    }

    #[test]
    fn test_remove() {
        let mut dict = Dictionary::new();
        dict.set("Temp", "Value");

        assert!(dict.contains_key("Temp"));
        let removed = dict.remove("Temp");
        assert_eq!(removed, Some(Object::String("Value".to_string())));
        assert!(!dict.contains_key("Temp"));
    }

    #[test]
    fn test_keys_are_sorted() {
        let mut dict = Dictionary::new();
        dict.set("Zebra", 1);
        dict.set("Alpha", 2);
        dict.set("Mango", 3);

        let keys: Vec<_> = dict.keys().collect();
        assert_eq!(keys, vec!["Alpha", "Mango", "Zebra"]);
    }

    #[test]
    fn test_get_dict() {
        let mut parent = Dictionary::new();
        let mut child = Dictionary::new();
        child.set("ChildKey", "ChildValue");

        parent.set("Child", Object::Dictionary(child));
        parent.set("NotDict", "String");

        let child_dict = parent.get_dict("Child");
        assert!(child_dict.is_some());
        assert_eq!(
            child_dict.unwrap().get("ChildKey"),
            Some(&Object::String("ChildValue".to_string()))
        );
        assert!(parent.get_dict("NotDict").is_none());
        assert!(parent.get_dict("Missing").is_none());
    }

    #[test]
    fn test_from_iterator() {
        let items = vec![
            ("Name".to_string(), Object::String("Test".to_string())),
            ("Count".to_string(), Object::Integer(5)),
        ];

        let dict: Dictionary = items.into_iter().collect();

        assert_eq!(dict.len(), 2);
        assert_eq!(dict.get("Count"), Some(&Object::Integer(5)));
    }
}
