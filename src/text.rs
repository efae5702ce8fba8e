//! Naming helpers shared by fields, models and namespaces.

use convert_case::{Case, Casing};
use unicode_width::UnicodeWidthStr;

/// Identifier transformations used when rendering names for a target language.
pub trait TextExt {
    /// `person_id` -> `person`; names without the suffix are returned as-is.
    fn strip_id(&self) -> String;
    /// English plural: `node` -> `nodes`, `box` -> `boxes`, `city` -> `cities`.
    fn plural(&self) -> String;
    /// `hello_world` -> `HelloWorld`
    fn classname(&self) -> String;
    /// `hello_world` -> `helloWorld`
    fn under_to_mixed(&self) -> String;
    /// `HelloWorld` -> `hello_world`
    fn mixed_to_under(&self) -> String;
    /// `PersonVehicle` -> `Person Vehicle`
    fn title_words(&self) -> String;
}

impl TextExt for str {
    fn strip_id(&self) -> String {
        self.strip_suffix("_id").unwrap_or(self).to_string()
    }

    fn plural(&self) -> String {
        if self.is_empty() {
            return String::new();
        }
        let lower = self.to_lowercase();

        if ["s", "sh", "ch", "x", "z"]
            .iter()
            .any(|suffix| lower.ends_with(suffix))
        {
            return format!("{self}es");
        }

        if let Some(stem) = self.strip_suffix('y').or_else(|| self.strip_suffix('Y')) {
            let before = stem.chars().last();
            if before.is_some_and(|c| c.is_alphabetic() && !"aeiouAEIOU".contains(c)) {
                return format!("{stem}ies");
            }
        }

        format!("{self}s")
    }

    fn classname(&self) -> String {
        self.to_case(Case::Pascal)
    }

    fn under_to_mixed(&self) -> String {
        self.to_case(Case::Camel)
    }

    fn mixed_to_under(&self) -> String {
        self.to_case(Case::Snake)
    }

    fn title_words(&self) -> String {
        self.mixed_to_under()
            .split('_')
            .filter(|w| !w.is_empty())
            .map(title)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn title(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Terminal display width of `text` (wide characters count as two columns).
pub fn display_width(text: &str) -> usize {
    UnicodeWidthStr::width(text)
}

/// Left-justify `text` to `width` display columns.
pub fn ljust(text: &str, width: usize) -> String {
    let pad = width.saturating_sub(display_width(text));
    format!("{text}{}", " ".repeat(pad))
}

/// Right-justify `text` to `width` display columns.
pub fn rjust(text: &str, width: usize) -> String {
    let pad = width.saturating_sub(display_width(text));
    format!("{}{text}", " ".repeat(pad))
}

/// Order preserving de-duplication.
pub fn unique<T: PartialEq>(items: impl IntoIterator<Item = T>) -> Vec<T> {
    let mut out = Vec::new();
    for item in items {
        if !out.contains(&item) {
            out.push(item);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_id() {
        assert_eq!("person_id".strip_id(), "person");
        assert_eq!("parent_id".strip_id(), "parent");
        assert_eq!("identity".strip_id(), "identity");
    }

    #[test]
    fn test_plural() {
        assert_eq!("node".plural(), "nodes");
        assert_eq!("Node".plural(), "Nodes");
        assert_eq!("box".plural(), "boxes");
        assert_eq!("brush".plural(), "brushes");
        assert_eq!("city".plural(), "cities");
        assert_eq!("day".plural(), "days");
        assert_eq!("core".plural(), "cores");
    }

    #[test]
    fn test_case_conversions() {
        assert_eq!("person_vehicle".classname(), "PersonVehicle");
        assert_eq!("first_name".under_to_mixed(), "firstName");
        assert_eq!("PersonVehicle".mixed_to_under(), "person_vehicle");
        assert_eq!("PersonVehicle".title_words(), "Person Vehicle");
        assert_eq!("Node".title_words(), "Node");
    }

    #[test]
    fn test_unicode_padding() {
        // 全角文字は幅2
        assert_eq!(display_width("ユーザー"), 8);
        assert_eq!(ljust("ab", 4), "ab  ");
        assert_eq!(rjust("ab", 4), "  ab");
        assert_eq!(ljust("abcdef", 4), "abcdef");
    }

    #[test]
    fn test_unique_preserves_order() {
        assert_eq!(unique(["b", "a", "b", "c"]), vec!["b", "a", "c"]);
    }
}
