use serde::Serialize;
use similar::TextDiff;

use crate::locale::LocaleDocument;

/// Would-be change to one locale document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocaleDiff {
    pub locale: String,
    /// Unified diff of the key-sorted documents; empty when nothing changes.
    pub unified: String,
    pub added: Vec<String>,
    pub removed: Vec<String>,
}

impl LocaleDiff {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.unified.is_empty()
    }
}

pub fn locale_diff(locale: &str, before: &LocaleDocument, after: &LocaleDocument) -> LocaleDiff {
    let old = before.sorted().to_json_string();
    let new = after.sorted().to_json_string();

    let unified = if old == new {
        String::new()
    } else {
        let file = format!("{}.json", locale);
        TextDiff::from_lines(&old, &new)
            .unified_diff()
            .context_radius(3)
            .header(&format!("a/{}", file), &format!("b/{}", file))
            .to_string()
    };

    let added = after
        .keys()
        .filter(|key| !before.contains_key(key))
        .map(str::to_string)
        .collect::<Vec<_>>();
    let removed = before
        .keys()
        .filter(|key| !after.contains_key(key))
        .map(str::to_string)
        .collect::<Vec<_>>();

    LocaleDiff {
        locale: locale.to_string(),
        unified,
        added: sorted(added),
        removed: sorted(removed),
    }
}

fn sorted(mut keys: Vec<String>) -> Vec<String> {
    keys.sort();
    keys
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_diff_of_changes() {
        let before = LocaleDocument::from_pairs([("b.save", "Save"), ("a.delete", "Delete")]);
        let mut after = before.clone();
        after.remove("a.delete");
        after.set("c.cancel", "Cancel".to_string());

        let diff = locale_diff("en", &before, &after);
        assert_eq!(diff.added, vec!["c.cancel"]);
        assert_eq!(diff.removed, vec!["a.delete"]);
        assert!(diff.unified.starts_with("--- a/en.json\n+++ b/en.json\n"));
        assert!(diff.unified.contains("-  \"a.delete\": \"Delete\",\n"));
        assert!(diff.unified.contains("+  \"c.cancel\": \"Cancel\"\n"));
    }

    #[test]
    fn test_no_change_is_empty() {
        let doc = LocaleDocument::from_pairs([("a.b", "c")]);
        assert!(locale_diff("en", &doc, &doc).is_empty());
    }
}
