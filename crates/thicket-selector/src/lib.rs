//! Selector engine for externally owned object trees.
//!
//! # Scope
//!
//! This crate implements a CSS3-like selector language and a matcher that
//! evaluates it against any tree implementing [`Selob`]:
//!
//! - **Scanner primitives** ([§ 4 Tokenization](https://www.w3.org/TR/css-syntax-3/#tokenization))
//!   - Identifiers, names and quoted strings with CSS escapes
//!   - Balanced-delimiter scanning for pseudo-selector arguments
//!
//! - **Grammar parser** ([Selectors Level 4](https://www.w3.org/TR/selectors-4/))
//!   - Type, universal, class, id, attribute and pseudo selectors
//!   - Descendant, child, adjacent and general sibling combinators
//!   - `!` subject markers
//!
//! - **Matcher**
//!   - One stepwise algorithm walking the flat chain ancestor-ward and descendant-ward
//!   - Built-in structural pseudo-classes, including `An+B` formulas and `:not()`
//!   - Custom pseudo-classes and pseudo-elements delegated to the tree
//!
//! - **Query API**: boolean test, first match, unique match, all matches and
//!   matching over a flat list of candidates.
//!
//! # Example
//!
//! ```
//! use thicket_selector::SelectorChain;
//!
//! let chain = SelectorChain::parse("Window > Box .Button[label^='Ok' i]").unwrap();
//! assert_eq!(chain.to_string(), r#"Window > Box .Button[label^="Ok" i]"#);
//! ```

/// Flat selector chains and their canonical text form.
pub mod chain;
/// Errors reported while parsing and finalizing selectors.
pub mod error;
/// Matching a chain against one candidate node.
pub mod matcher;
/// `An+B` formulas per [§ 6.6.2 An+B notation](https://www.w3.org/TR/css-syntax-3/#anb-microsyntax).
pub mod nth;
mod parser;
/// Built-in pseudo-classes and the custom pseudo-selector registry.
pub mod pseudo;
/// Tree searches built on the matcher.
pub mod query;
/// Cursor-based scanning primitives shared by the parser.
pub mod scanner;
/// The node contract trees implement to be queried.
pub mod selob;

pub use chain::{AttributeOp, SelectorChain, SelectorKind, SelectorNode};
pub use error::SelectorError;
pub use matcher::Matcher;
pub use pseudo::{CustomPseudo, PseudoClass, custom_pseudos, register_custom_pseudo};
pub use query::{
    query_selector_all, query_selector_bool, query_selector_first, query_selector_objects,
    query_selector_unique,
};
pub use selob::{PseudoMatch, Selob};
