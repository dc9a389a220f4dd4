//! Naming helpers that derive URL paths from resource type names.
//!
//! Resource paths are the snake_case plural of the type name
//! (`EventContact` → `event_contacts`). Reference attributes use the
//! singular (`contacts` → `contact_ids`).
//!
//! # Example
//!
//! ```rust
//! use webcrm::rest::{pluralize, singularize, underscore};
//!
//! assert_eq!(underscore("EventContact"), "event_contact");
//! assert_eq!(pluralize("activity"), "activities");
//! assert_eq!(singularize("activities"), "activity");
//! ```

/// Converts a `CamelCase` type name into `snake_case`.
#[must_use]
pub fn underscore(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (i, c) in name.chars().enumerate() {
        if c.is_ascii_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Returns the plural of a lowercase English noun.
#[must_use]
pub fn pluralize(word: &str) -> String {
    if let Some(stem) = word.strip_suffix('y') {
        if !stem.ends_with(&['a', 'e', 'i', 'o', 'u'][..]) {
            return format!("{stem}ies");
        }
    }
    if word.ends_with('s') || word.ends_with('x') || word.ends_with("ch") || word.ends_with("sh")
    {
        return format!("{word}es");
    }
    format!("{word}s")
}

/// Returns the singular of a lowercase English noun.
#[must_use]
pub fn singularize(word: &str) -> String {
    if let Some(stem) = word.strip_suffix("ies") {
        return format!("{stem}y");
    }
    for suffix in ["sses", "xes", "ches", "shes"] {
        if word.ends_with(suffix) {
            return word[..word.len() - 2].to_string();
        }
    }
    if word.ends_with('s') && !word.ends_with("ss") {
        return word[..word.len() - 1].to_string();
    }
    word.to_string()
}

/// Appends a percent-encoded ID segment to a path.
#[must_use]
pub fn member_path(collection_path: &str, id: &str) -> String {
    format!("{collection_path}/{}", urlencoding::encode(id))
}
