//! The flat selector representation produced by the parser.
//!
//! A [`SelectorChain`] keeps combinators inline: `A > B.c` is stored as
//! `[Type(A), Child, Type(B), Class(c)]`. Every combinator splits the chain
//! into the part matched ancestor/sibling-ward and the part matched
//! descendant/sibling-ward, which is what the matcher relies on.

use std::fmt::{self, Write};

use crate::error::SelectorError;
use crate::parser;
use crate::scanner::{is_nmchar, is_nmstart};

/// [§ 6.4 Attribute selectors](https://www.w3.org/TR/selectors-4/#attribute-selectors)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeOp {
    /// `[attr]`: the property exists.
    Exists,
    /// `[attr=value]`
    Equals,
    /// `[attr!=value]`
    Unequals,
    /// `[attr^=value]`: value starts with the argument.
    Prefix,
    /// `[attr$=value]`: value ends with the argument.
    Suffix,
    /// `[attr|=value]`: value is the argument or starts with it followed by `-`.
    DashPrefix,
    /// `[attr*=value]`: value contains the argument.
    Substring,
    /// `[attr~=value]`: the argument is one of the whitespace separated words.
    Includes,
}

impl AttributeOp {
    /// The operator as written between attribute name and value.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Exists => "",
            Self::Equals => "=",
            Self::Unequals => "!=",
            Self::Prefix => "^=",
            Self::Suffix => "$=",
            Self::DashPrefix => "|=",
            Self::Substring => "*=",
            Self::Includes => "~=",
        }
    }

    /// Look up an operator by its symbol.
    #[must_use]
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        [
            Self::Equals,
            Self::Unequals,
            Self::Prefix,
            Self::Suffix,
            Self::DashPrefix,
            Self::Substring,
            Self::Includes,
        ]
        .into_iter()
        .find(|op| op.symbol() == symbol)
    }
}

/// What a [`SelectorNode`] stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SelectorKind {
    /// `!`: the enclosing sequence is the one whose node is returned.
    Subject,
    /// Type selector, matched against the node's primary type name.
    Type,
    /// `*`
    Universal,
    /// `.name`, matched against every entry of the node's type list.
    Class,
    /// `#name`
    Id,
    /// `::name` or `::name(arg)`
    PseudoElement,
    /// `:name` or `:name(arg)`
    PseudoClass,
    /// Whitespace between two sequences.
    Descendant,
    /// `>`
    Child,
    /// `+`
    Adjacent,
    /// `~`
    Neighboring,
    /// `[name op value i]`
    Attribute {
        /// The comparison to perform.
        op: AttributeOp,
        /// Whether the ` i` flag requests ASCII case folding.
        case_insensitive: bool,
    },
}

impl SelectorKind {
    /// Whether this kind separates two simple selector sequences.
    #[must_use]
    pub const fn is_combinator(self) -> bool {
        matches!(
            self,
            Self::Descendant | Self::Child | Self::Adjacent | Self::Neighboring
        )
    }
}

/// One element of a [`SelectorChain`].
///
/// Equality is structural over all three fields.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SelectorNode {
    /// What this node tests or how it relates sequences.
    pub kind: SelectorKind,
    /// Type, class, id, pseudo or attribute name; empty where meaningless.
    pub ident: String,
    /// Pseudo-selector argument text or attribute comparison value.
    pub arg: Option<String>,
}

impl SelectorNode {
    /// Node without argument.
    #[must_use]
    pub fn new(kind: SelectorKind, ident: impl Into<String>) -> Self {
        Self {
            kind,
            ident: ident.into(),
            arg: None,
        }
    }

    /// Node carrying an argument.
    #[must_use]
    pub fn with_arg(kind: SelectorKind, ident: impl Into<String>, arg: impl Into<String>) -> Self {
        Self {
            kind,
            ident: ident.into(),
            arg: Some(arg.into()),
        }
    }

    /// The argument, or `""` if there is none.
    #[must_use]
    pub fn arg_str(&self) -> &str {
        self.arg.as_deref().unwrap_or_default()
    }
}

/// A parsed selector as a flat, ordered sequence of [`SelectorNode`]s.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct SelectorChain {
    nodes: Vec<SelectorNode>,
}

impl SelectorChain {
    /// Parse a complete selector, combinators included.
    ///
    /// # Errors
    ///
    /// Returns [`SelectorError::Syntax`] if `selector` does not follow the grammar.
    pub fn parse(selector: &str) -> Result<Self, SelectorError> {
        parser::parse_selector_chain(selector, true)
    }

    /// Parse a single simple selector sequence; combinators are rejected.
    ///
    /// # Errors
    ///
    /// Returns [`SelectorError::Syntax`] if `selector` is not exactly one sequence.
    pub fn parse_compound(selector: &str) -> Result<Self, SelectorError> {
        parser::parse_selector_chain(selector, false)
    }

    pub(crate) const fn from_nodes(nodes: Vec<SelectorNode>) -> Self {
        Self { nodes }
    }

    /// The nodes in selector order.
    #[must_use]
    pub fn nodes(&self) -> &[SelectorNode] {
        &self.nodes
    }

    /// Number of nodes, combinators and markers included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True for a chain without nodes (never produced by the parser).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl<'a> IntoIterator for &'a SelectorChain {
    type Item = &'a SelectorNode;
    type IntoIter = std::slice::Iter<'a, SelectorNode>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.iter()
    }
}

/// Canonical text form. Quote style and spacing are normalized, so the
/// output is not byte-identical to the input, but it parses back into an
/// equal chain.
impl fmt::Display for SelectorChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for node in &self.nodes {
            write!(f, "{node}")?;
        }
        Ok(())
    }
}

impl fmt::Display for SelectorNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            SelectorKind::Subject => f.write_char('!'),
            SelectorKind::Universal => f.write_char('*'),
            SelectorKind::Type => write_ident(f, &self.ident),
            SelectorKind::Class => {
                f.write_char('.')?;
                write_ident(f, &self.ident)
            }
            SelectorKind::Id => {
                f.write_char('#')?;
                write_ident(f, &self.ident)
            }
            SelectorKind::PseudoClass | SelectorKind::PseudoElement => {
                let colons = if self.kind == SelectorKind::PseudoElement { "::" } else { ":" };
                f.write_str(colons)?;
                write_ident(f, &self.ident)?;
                match &self.arg {
                    Some(arg) => write!(f, "({arg})"),
                    None => Ok(()),
                }
            }
            SelectorKind::Descendant => f.write_char(' '),
            SelectorKind::Child => f.write_str(" > "),
            SelectorKind::Adjacent => f.write_str(" + "),
            SelectorKind::Neighboring => f.write_str(" ~ "),
            SelectorKind::Attribute { op, case_insensitive } => {
                f.write_char('[')?;
                write_ident(f, &self.ident)?;
                if op != AttributeOp::Exists {
                    f.write_str(op.symbol())?;
                    write_string(f, self.arg_str())?;
                }
                if case_insensitive {
                    f.write_str(" i")?;
                }
                f.write_char(']')
            }
        }
    }
}

/// Write `ident` so that it scans back as the same identifier.
fn write_ident(f: &mut fmt::Formatter<'_>, ident: &str) -> fmt::Result {
    let bytes = ident.as_bytes();
    // Index of the byte that must be an nmstart: after an optional leading '-'.
    let start = usize::from(bytes.first() == Some(&b'-') && bytes.len() > 1);
    for (i, c) in ident.char_indices() {
        let b = bytes[i];
        let plain = if i == start { is_nmstart(b) } else { is_nmchar(b) };
        if plain {
            f.write_char(c)?;
        } else if c.is_ascii_graphic() && !c.is_ascii_hexdigit() {
            write!(f, "\\{c}")?;
        } else {
            write!(f, "\\{:x} ", u32::from(c))?;
        }
    }
    Ok(())
}

/// Write `value` as a double-quoted string.
fn write_string(f: &mut fmt::Formatter<'_>, value: &str) -> fmt::Result {
    f.write_char('"')?;
    for c in value.chars() {
        match c {
            '"' | '\\' => write!(f, "\\{c}")?,
            c if c.is_control() => write!(f, "\\{:x} ", u32::from(c))?,
            c => f.write_char(c)?,
        }
    }
    f.write_char('"')
}
