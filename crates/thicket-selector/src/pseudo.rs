//! Built-in pseudo-classes and the registry of custom pseudo-selectors.
//!
//! Pseudo-selectors outside the built-in set are handed to the tree through
//! [`crate::Selob::pseudo_selector`]. Trees advertise the names they
//! understand through [`register_custom_pseudo`]; the registry is used for
//! listings and diagnostics only, never for match decisions.

use std::sync::{Mutex, MutexGuard, PoisonError};

use strum_macros::{Display, EnumString, IntoStaticStr};

/// [§ 4 Pseudo-classes](https://www.w3.org/TR/selectors-4/#pseudo-classes)
///
/// Pseudo-classes evaluated by the engine itself. Names are matched
/// ASCII-case-insensitively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum PseudoClass {
    /// `:not(selector)`: the node does not match the argument selector.
    Not,
    /// `:empty`: the node has no children.
    Empty,
    /// `:root`: the node has no parent.
    Root,
    /// `:only-child`: the node has a parent and no siblings.
    OnlyChild,
    /// `:first-child`: first among its siblings.
    FirstChild,
    /// `:last-child`: last among its siblings.
    LastChild,
    /// `:nth-child(An+B)`
    NthChild,
    /// `:nth-last-child(An+B)`, counting from the last sibling.
    NthLastChild,
    /// `:first-of-type`: no preceding sibling has the same type name.
    FirstOfType,
    /// `:last-of-type`: no following sibling has the same type name.
    LastOfType,
    /// `:only-of-type`: no sibling has the same type name.
    OnlyOfType,
    /// `:nth-of-type(An+B)`, counting only siblings of the same type name.
    NthOfType,
    /// `:nth-last-of-type(An+B)`
    NthLastOfType,
}

impl PseudoClass {
    /// Whether the pseudo-class requires a parenthesized argument.
    #[must_use]
    pub const fn takes_argument(self) -> bool {
        matches!(
            self,
            Self::Not | Self::NthChild | Self::NthLastChild | Self::NthOfType | Self::NthLastOfType
        )
    }

    /// Whether the argument is an `An+B` formula.
    #[must_use]
    pub const fn takes_nth_formula(self) -> bool {
        self.takes_argument() && !matches!(self, Self::Not)
    }
}

/// Whether `ident` has the shape of a custom pseudo-selector name:
/// a letter or underscore followed by letters, digits, `-` or `_`.
#[must_use]
pub fn is_custom_pseudo_shape(ident: &str) -> bool {
    let mut bytes = ident.bytes();
    bytes
        .next()
        .is_some_and(|b| b.is_ascii_alphabetic() || b == b'_')
        && bytes.all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

/// A custom pseudo-selector advertised by a tree implementation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomPseudo {
    /// Full selector spelling including colons, e.g. `":visible"` or `"::child"`.
    pub ident: String,
    /// One-line description for listings.
    pub blurb: String,
}

/// Process-wide registry, append-only.
static REGISTRY: Mutex<Vec<CustomPseudo>> = Mutex::new(Vec::new());

fn registry() -> MutexGuard<'static, Vec<CustomPseudo>> {
    REGISTRY.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Advertise a custom pseudo-selector. Registering the same `ident` twice
/// keeps the first entry.
pub fn register_custom_pseudo(ident: &str, blurb: &str) {
    let mut entries = registry();
    if entries.iter().all(|entry| entry.ident != ident) {
        entries.push(CustomPseudo {
            ident: ident.to_string(),
            blurb: blurb.to_string(),
        });
    }
}

/// All registered custom pseudo-selectors, in registration order.
#[must_use]
pub fn custom_pseudos() -> Vec<CustomPseudo> {
    registry().clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_names_are_kebab_case_and_case_insensitive() {
        assert_eq!("nth-last-of-type".parse::<PseudoClass>().ok(), Some(PseudoClass::NthLastOfType));
        assert_eq!("First-Child".parse::<PseudoClass>().ok(), Some(PseudoClass::FirstChild));
        assert_eq!(PseudoClass::OnlyOfType.to_string(), "only-of-type");
        assert!("hover".parse::<PseudoClass>().is_err());
    }

    #[test]
    fn test_custom_shape() {
        assert!(is_custom_pseudo_shape("visible"));
        assert!(is_custom_pseudo_shape("_x-1"));
        assert!(!is_custom_pseudo_shape("-moz-thing"));
        assert!(!is_custom_pseudo_shape("9lives"));
        assert!(!is_custom_pseudo_shape(""));
        assert!(!is_custom_pseudo_shape("a.b"));
    }

    #[test]
    fn test_registry_keeps_first_entry() {
        register_custom_pseudo(":registry-test", "first");
        register_custom_pseudo(":registry-test", "second");
        let entries: Vec<_> = custom_pseudos()
            .into_iter()
            .filter(|entry| entry.ident == ":registry-test")
            .collect();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].blurb, "first");
    }
}
