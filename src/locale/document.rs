//! In-memory locale document.
//!
//! Documents are held flat (`"nav.home": "Home"`) in file order. Nested
//! files are flattened on load and rebuilt on save. Empty objects and keys
//! whose segments contain dots keep their original shape.

use std::collections::HashMap;

use serde_json::{Map, Value};
use tracing::warn;

use super::LocaleStoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DocumentShape {
    #[default]
    Flat,
    Nested,
}

/// Outcome of setting a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Added,
    Updated,
    Unchanged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenameOutcome {
    Renamed,
    /// The destination already exists; nothing was changed.
    Duplicate,
    NotFound,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocaleDocument {
    /// Flat keys to leaves. Empty objects are kept as `{}` placeholders that
    /// are written back but never exposed as messages.
    entries: Map<String, Value>,
    /// Original path of keys whose segments contain dots.
    paths: HashMap<String, Vec<String>>,
    shape: DocumentShape,
}

fn is_placeholder(value: &Value) -> bool {
    matches!(value, Value::Object(map) if map.is_empty())
}

impl LocaleDocument {
    pub fn new(shape: DocumentShape) -> Self {
        Self {
            entries: Map::new(),
            paths: HashMap::new(),
            shape,
        }
    }

    /// Parse JSON content, detecting its shape.
    pub fn parse(content: &str) -> Result<Self, LocaleStoreError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let value: Value = serde_json::from_str(content).map_err(|e| LocaleStoreError::Parse {
            message: e.to_string(),
        })?;
        let Value::Object(root) = value else {
            return Err(LocaleStoreError::NotAnObject);
        };

        let mut document = Self::default();
        for (key, value) in root {
            document.flatten_into(vec![key], value);
        }
        Ok(document)
    }

    fn flatten_into(&mut self, path: Vec<String>, value: Value) {
        match value {
            Value::Object(children) if !children.is_empty() => {
                self.shape = DocumentShape::Nested;
                for (key, child) in children {
                    let mut child_path = path.clone();
                    child_path.push(key);
                    self.flatten_into(child_path, child);
                }
            }
            leaf => {
                let key = path.join(".");
                if path.iter().any(|segment| segment.contains('.')) {
                    self.paths.insert(key.clone(), path);
                }
                if self.entries.insert(key.clone(), leaf).is_some() {
                    warn!(key = %key, "duplicate locale key after flattening, keeping the last value");
                }
            }
        }
    }

    fn messages(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.entries.iter().filter(|(_, v)| !is_placeholder(v))
    }

    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let mut document = Self::default();
        for (key, value) in pairs {
            document.set(key, value.to_string());
        }
        document
    }

    pub fn shape(&self) -> DocumentShape {
        self.shape
    }

    pub fn set_shape(&mut self, shape: DocumentShape) {
        self.shape = shape;
    }

    pub fn len(&self) -> usize {
        self.messages().count()
    }

    pub fn is_empty(&self) -> bool {
        self.messages().next().is_none()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.get(key).is_some_and(|v| !is_placeholder(v))
    }

    /// `None` when the key is absent; `Some(None)` when its value is not a
    /// string (null, number, array).
    pub fn get(&self, key: &str) -> Option<Option<&str>> {
        self.entries
            .get(key)
            .filter(|v| !is_placeholder(v))
            .map(Value::as_str)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.messages().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.messages().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn set(&mut self, key: &str, value: String) -> KeyAction {
        match self.entries.get_mut(key) {
            Some(existing) if existing.as_str() == Some(value.as_str()) => KeyAction::Unchanged,
            Some(existing) => {
                let action = if is_placeholder(existing) {
                    KeyAction::Added
                } else {
                    KeyAction::Updated
                };
                *existing = Value::String(value);
                action
            }
            None => {
                self.entries.insert(key.to_string(), Value::String(value));
                KeyAction::Added
            }
        }
    }

    pub fn remove(&mut self, key: &str) -> bool {
        if !self.contains_key(key) {
            return false;
        }
        self.paths.remove(key);
        self.entries.shift_remove(key).is_some()
    }

    /// Rename in place, keeping the entry's position. The new key is nested
    /// by its dots.
    pub fn rename(&mut self, from: &str, to: &str) -> RenameOutcome {
        if !self.contains_key(from) {
            return RenameOutcome::NotFound;
        }
        if from == to {
            return RenameOutcome::Renamed;
        }
        if self.contains_key(to) {
            return RenameOutcome::Duplicate;
        }
        self.entries.shift_remove(to);
        self.paths.remove(from);
        let entries = std::mem::take(&mut self.entries);
        self.entries = entries
            .into_iter()
            .map(|(k, v)| if k == from { (to.to_string(), v) } else { (k, v) })
            .collect();
        RenameOutcome::Renamed
    }

    /// Copy with entries sorted by key.
    pub fn sorted(&self) -> Self {
        let mut pairs: Vec<(&String, &Value)> = self.entries.iter().collect();
        pairs.sort_by(|a, b| a.0.cmp(b.0));
        Self {
            entries: pairs
                .into_iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            paths: self.paths.clone(),
            shape: self.shape,
        }
    }

    /// Pretty JSON with 2-space indentation and a trailing newline.
    ///
    /// A nested document whose keys cannot be nested (`a` next to `a.b`) is
    /// written flat.
    pub fn to_json_string(&self) -> String {
        let root = match self.shape {
            DocumentShape::Flat => Value::Object(self.entries.clone()),
            DocumentShape::Nested => match self.nest() {
                Some(nested) => Value::Object(nested),
                None => {
                    warn!("locale keys conflict when nested, writing flat");
                    Value::Object(self.entries.clone())
                }
            },
        };
        // Serializing a `Value` cannot fail.
        let content = serde_json::to_string_pretty(&root).unwrap_or_default();
        format!("{}\n", content)
    }

    fn nest(&self) -> Option<Map<String, Value>> {
        let mut root = Map::new();
        for (key, value) in &self.entries {
            let parts: Vec<&str> = match self.paths.get(key) {
                Some(path) => path.iter().map(String::as_str).collect(),
                None => key.split('.').collect(),
            };
            if !insert_nested(&mut root, &parts, value.clone()) {
                return None;
            }
        }
        Some(root)
    }
}

/// Insert `value` at a nested path. Returns `false` when the path runs
/// through an existing leaf or a message lands on an existing object.
fn insert_nested(root: &mut Map<String, Value>, path: &[&str], value: Value) -> bool {
    let Some((first, rest)) = path.split_first() else {
        return false;
    };
    if rest.is_empty() {
        return match root.get(*first) {
            None => {
                root.insert(first.to_string(), value);
                true
            }
            // An empty object merges into whatever is already there.
            Some(Value::Object(_)) => is_placeholder(&value),
            Some(_) => false,
        };
    }

    let next = root
        .entry(first.to_string())
        .or_insert_with(|| Value::Object(Map::new()));
    match next {
        Value::Object(inner) => insert_nested(inner, rest, value),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_flat() {
        let doc = LocaleDocument::parse(r#"{"nav.home": "Home", "nav.about": null}"#).unwrap();
        assert_eq!(doc.shape(), DocumentShape::Flat);
        assert_eq!(doc.get("nav.home"), Some(Some("Home")));
        assert_eq!(doc.get("nav.about"), Some(None));
        assert_eq!(doc.get("nav.missing"), None);
    }

    #[test]
    fn test_parse_nested_flattens() {
        let doc =
            LocaleDocument::parse(r#"{"nav": {"home": "Home", "menu": {"open": "Open"}}}"#)
                .unwrap();
        assert_eq!(doc.shape(), DocumentShape::Nested);
        let keys: Vec<&str> = doc.keys().collect();
        assert_eq!(keys, vec!["nav.home", "nav.menu.open"]);
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            LocaleDocument::parse("[1, 2]"),
            Err(LocaleStoreError::NotAnObject)
        ));
        assert!(matches!(
            LocaleDocument::parse("{"),
            Err(LocaleStoreError::Parse { .. })
        ));
        assert!(LocaleDocument::parse("").unwrap().is_empty());
    }

    #[test]
    fn test_nested_round_trip_preserves_shape() {
        let input = "{\n  \"nav\": {\n    \"home\": \"Home\"\n  }\n}\n";
        let mut doc = LocaleDocument::parse(input).unwrap();
        assert_eq!(doc.to_json_string(), input);

        doc.set("nav.about", "About".to_string());
        let parsed: Value = serde_json::from_str(&doc.to_json_string()).unwrap();
        assert_eq!(parsed["nav"]["about"], "About");
    }

    #[test]
    fn test_round_trip_keeps_empty_objects() {
        let input = "{\n  \"nav\": {\n    \"home\": \"Home\",\n    \"extra\": {}\n  },\n  \"legal\": {}\n}\n";
        let mut doc = LocaleDocument::parse(input).unwrap();
        assert_eq!(doc.keys().collect::<Vec<_>>(), vec!["nav.home"]);
        assert_eq!(doc.len(), 1);
        assert!(!doc.contains_key("legal"));
        assert_eq!(doc.get("nav.extra"), None);
        assert_eq!(doc.to_json_string(), input);

        assert_eq!(doc.set("nav.extra", "Extra".to_string()), KeyAction::Added);
        assert!(!doc.remove("legal"));
        let parsed: Value = serde_json::from_str(&doc.to_json_string()).unwrap();
        assert_eq!(parsed["nav"]["extra"], "Extra");
        assert_eq!(parsed["legal"], serde_json::json!({}));
    }

    #[test]
    fn test_round_trip_keeps_dotted_segments() {
        let input = "{\n  \"errors\": {\n    \"form.required\": \"Required\"\n  },\n  \"nav\": {\n    \"home\": \"Home\"\n  },\n  \"page.title\": \"Title\"\n}\n";
        let doc = LocaleDocument::parse(input).unwrap();
        assert_eq!(doc.shape(), DocumentShape::Nested);
        assert_eq!(doc.get("errors.form.required"), Some(Some("Required")));
        assert_eq!(doc.get("page.title"), Some(Some("Title")));
        assert_eq!(doc.to_json_string(), input);
        assert_eq!(doc.sorted().to_json_string(), input);
    }

    #[test]
    fn test_nested_conflict_writes_flat() {
        let mut doc = LocaleDocument::new(DocumentShape::Nested);
        doc.set("a", "A".to_string());
        doc.set("a.b", "B".to_string());
        let parsed: Value = serde_json::from_str(&doc.to_json_string()).unwrap();
        assert_eq!(parsed["a.b"], "B");
    }

    #[test]
    fn test_set_actions() {
        let mut doc = LocaleDocument::default();
        assert_eq!(doc.set("a.b", "x".to_string()), KeyAction::Added);
        assert_eq!(doc.set("a.b", "x".to_string()), KeyAction::Unchanged);
        assert_eq!(doc.set("a.b", "y".to_string()), KeyAction::Updated);
    }

    #[test]
    fn test_rename_keeps_position_and_refuses_duplicates() {
        let mut doc = LocaleDocument::from_pairs([("a.one", "1"), ("a.two", "2"), ("a.three", "3")]);
        assert_eq!(doc.rename("a.two", "a.dos"), RenameOutcome::Renamed);
        let keys: Vec<&str> = doc.keys().collect();
        assert_eq!(keys, vec!["a.one", "a.dos", "a.three"]);

        assert_eq!(doc.rename("a.one", "a.three"), RenameOutcome::Duplicate);
        assert_eq!(doc.get("a.one"), Some(Some("1")));
        assert_eq!(doc.rename("a.zero", "a.cero"), RenameOutcome::NotFound);
    }

    #[test]
    fn test_sorted() {
        let doc = LocaleDocument::from_pairs([("b", "2"), ("a", "1")]);
        let keys: Vec<String> = doc.sorted().keys().map(str::to_string).collect();
        assert_eq!(keys, vec!["a", "b"]);
    }
}
