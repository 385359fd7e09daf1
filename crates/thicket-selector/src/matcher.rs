//! Matching a [`SelectorChain`] against concrete tree nodes.
//!
//! A [`Matcher`] is built once per selector. Matching a candidate node runs
//! at most two passes over the chain, both driven by the same stepwise
//! function:
//!
//! - an **ancestor-ward** pass from just before the subject sequence back to
//!   the start of the chain, walking to parents and preceding siblings;
//! - a **descendant-ward** pass from the subject sequence to the end of the
//!   chain, walking into children, descendants and following siblings.
//!
//! The candidate matches if both passes succeed. The returned node is the
//! one reached at the end of the descendant-ward pass, unless a `!` marker
//! pins it to the subject sequence or a pseudo-element substitutes another.

use thicket_common::warning::warn_once;

use crate::chain::{AttributeOp, SelectorChain, SelectorKind, SelectorNode};
use crate::error::SelectorError;
use crate::nth::{match_css_nth, parse_css_nth};
use crate::pseudo::PseudoClass;
use crate::selob::{PseudoMatch, Selob, ancestors, children, siblings};

/// Which way the stepwise matcher walks the chain and the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    /// Towards the start of the chain: parents and preceding siblings.
    Ancestor,
    /// Towards the end of the chain: children, descendants and following siblings.
    Descendant,
}

impl Direction {
    /// Chain index visited after `index`, `None` past the start.
    const fn step(self, index: usize) -> Option<usize> {
        match self {
            Self::Ancestor => index.checked_sub(1),
            Self::Descendant => Some(index + 1),
        }
    }

    /// Sibling offset for the sibling combinators.
    const fn sibling_offset(self) -> isize {
        match self {
            Self::Ancestor => -1,
            Self::Descendant => 1,
        }
    }
}

/// Per-node data precomputed at parse time.
#[derive(Debug, Clone)]
enum Prepared {
    /// Nothing beyond the node itself.
    Plain,
    /// Built-in pseudo-class without argument.
    Builtin(PseudoClass),
    /// Built-in pseudo-class with an `An+B` argument.
    Nth(PseudoClass, i64, i64),
    /// `:not(...)` with its compiled argument.
    Not(Box<Matcher>),
    /// Custom pseudo-selector, with the colon-prefixed spelling handed to the tree.
    Custom(String),
}

/// A validated selector chain plus the indices matching needs.
#[derive(Debug, Clone)]
pub struct Matcher {
    chain: SelectorChain,
    prepared: Vec<Prepared>,
    subject_index: usize,
    last_combinator_index: Option<usize>,
    first_pseudo_element_index: Option<usize>,
}

impl Matcher {
    /// Parse and validate `selector`.
    ///
    /// # Errors
    ///
    /// Returns a [`SelectorError`] for syntax errors, structural errors
    /// (several subjects, misplaced pseudo-elements) and malformed built-in
    /// pseudo-class arguments.
    pub fn parse(selector: &str) -> Result<Self, SelectorError> {
        Self::from_chain(SelectorChain::parse(selector)?)
    }

    /// Validate an already parsed chain and compute its indices.
    ///
    /// # Errors
    ///
    /// Same as [`Matcher::parse`], minus syntax errors.
    pub fn from_chain(chain: SelectorChain) -> Result<Self, SelectorError> {
        let mut explicit_subject = None;
        let mut last_combinator_index = None;
        let mut first_pseudo_element_index: Option<usize> = None;

        for (index, node) in chain.nodes().iter().enumerate() {
            match node.kind {
                SelectorKind::Subject => {
                    if explicit_subject.replace(index).is_some() {
                        return Err(SelectorError::MultipleSubjects);
                    }
                }
                SelectorKind::PseudoElement => {
                    let _ = first_pseudo_element_index.get_or_insert(index);
                }
                kind if kind.is_combinator() => {
                    if let Some(pseudo) = first_pseudo_element_index {
                        let ident = chain.nodes()[pseudo].ident.clone();
                        return Err(SelectorError::CombinatorAfterPseudoElement(ident));
                    }
                    last_combinator_index = Some(index);
                }
                _ => {}
            }
        }

        // The subject sequence starts right after the combinator preceding
        // the marker, or after the last combinator without a marker.
        let subject_index = match explicit_subject {
            Some(marker) => chain.nodes()[..marker]
                .iter()
                .rposition(|node| node.kind.is_combinator())
                .map_or(0, |combinator| combinator + 1),
            None => last_combinator_index.map_or(0, |combinator| combinator + 1),
        };

        let prepared = chain
            .nodes()
            .iter()
            .map(prepare)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            chain,
            prepared,
            subject_index,
            last_combinator_index,
            first_pseudo_element_index,
        })
    }

    /// The underlying chain.
    #[must_use]
    pub const fn chain(&self) -> &SelectorChain {
        &self.chain
    }

    /// Index of the first node of the subject sequence.
    #[must_use]
    pub const fn subject_index(&self) -> usize {
        self.subject_index
    }

    /// Index of the last combinator, if any.
    #[must_use]
    pub const fn last_combinator_index(&self) -> Option<usize> {
        self.last_combinator_index
    }

    /// Index of the first pseudo-element, if any.
    #[must_use]
    pub const fn first_pseudo_element_index(&self) -> Option<usize> {
        self.first_pseudo_element_index
    }

    /// Match the chain with `node` as the subject candidate.
    ///
    /// Returns the node the selector designates (the candidate itself, the
    /// node reached through a pseudo-element, or the end of a chain that
    /// continues past an explicit subject), or `None` if it does not match.
    #[must_use]
    pub fn match_selector_chain<S: Selob>(&self, node: &S) -> Option<S> {
        if self.subject_index > 0 {
            let _ = self.match_stepwise(node, Some(self.subject_index - 1), Direction::Ancestor)?;
        }
        self.match_stepwise(node, Some(self.subject_index), Direction::Descendant)
    }

    /// Match the chain from `index` onward in `direction`.
    fn match_stepwise<S: Selob>(
        &self,
        node: &S,
        index: Option<usize>,
        direction: Direction,
    ) -> Option<S> {
        let Some((index, selector)) =
            index.and_then(|index| self.chain.nodes().get(index).map(|selector| (index, selector)))
        else {
            return Some(node.clone());
        };
        let next = direction.step(index);

        match selector.kind {
            SelectorKind::Subject => {
                let reached = self.match_stepwise(node, next, direction)?;
                Some(match direction {
                    Direction::Descendant => node.clone(),
                    Direction::Ancestor => reached,
                })
            }
            SelectorKind::PseudoElement => match self.custom_pseudo(node, index, selector) {
                PseudoMatch::NoMatch => None,
                PseudoMatch::Matched => self.match_stepwise(node, next, direction),
                PseudoMatch::Node(other) => self.match_stepwise(&other, next, direction),
            },
            SelectorKind::Descendant
            | SelectorKind::Child
            | SelectorKind::Adjacent
            | SelectorKind::Neighboring => self.match_combinator(node, selector.kind, next, direction),
            SelectorKind::Universal
            | SelectorKind::Type
            | SelectorKind::Class
            | SelectorKind::Id
            | SelectorKind::PseudoClass
            | SelectorKind::Attribute { .. } => {
                if self.matches_element(node, index, selector) {
                    self.match_stepwise(node, next, direction)
                } else {
                    None
                }
            }
        }
    }

    /// [§ 16 Combinators](https://www.w3.org/TR/selectors-4/#combinators)
    fn match_combinator<S: Selob>(
        &self,
        node: &S,
        combinator: SelectorKind,
        next: Option<usize>,
        direction: Direction,
    ) -> Option<S> {
        let try_node = |candidate: S| self.match_stepwise(&candidate, next, direction);
        match (combinator, direction) {
            (SelectorKind::Child, Direction::Ancestor) => node.parent().and_then(try_node),
            (SelectorKind::Child, Direction::Descendant) => children(node).find_map(try_node),
            (SelectorKind::Descendant, Direction::Ancestor) => ancestors(node).find_map(try_node),
            (SelectorKind::Descendant, Direction::Descendant) => {
                self.match_in_subtree(node, next)
            }
            (SelectorKind::Adjacent, _) => node.sibling(direction.sibling_offset()).and_then(try_node),
            (SelectorKind::Neighboring, _) => {
                siblings(node, direction.sibling_offset()).find_map(try_node)
            }
            _ => None,
        }
    }

    /// Try the rest of the chain on every descendant of `node`, pre-order.
    fn match_in_subtree<S: Selob>(&self, node: &S, next: Option<usize>) -> Option<S> {
        children(node).find_map(|child| {
            self.match_stepwise(&child, next, Direction::Descendant)
                .or_else(|| self.match_in_subtree(&child, next))
        })
    }

    /// Element selectors, pseudo-classes and attribute selectors: tests on the node itself.
    fn matches_element<S: Selob>(&self, node: &S, index: usize, selector: &SelectorNode) -> bool {
        match selector.kind {
            SelectorKind::Universal => true,
            SelectorKind::Id => node.id() == selector.ident,
            SelectorKind::Type => type_matches(node.type_name(), &selector.ident),
            SelectorKind::Class => node
                .type_list()
                .iter()
                .any(|type_name| type_matches(type_name, &selector.ident)),
            SelectorKind::PseudoClass => self.matches_pseudo_class(node, index, selector),
            SelectorKind::Attribute {
                op,
                case_insensitive,
            } => attribute_matches(node, &selector.ident, op, case_insensitive, selector.arg_str()),
            _ => false,
        }
    }

    /// [§ 4 Pseudo-classes](https://www.w3.org/TR/selectors-4/#pseudo-classes)
    fn matches_pseudo_class<S: Selob>(&self, node: &S, index: usize, selector: &SelectorNode) -> bool {
        match &self.prepared[index] {
            Prepared::Builtin(pseudo) => matches_structural(node, *pseudo),
            Prepared::Nth(pseudo, a, b) => matches_nth(node, *pseudo, *a, *b),
            Prepared::Not(inner) => inner.match_selector_chain(node).is_none(),
            Prepared::Custom(_) => !matches!(
                self.custom_pseudo(node, index, selector),
                PseudoMatch::NoMatch
            ),
            Prepared::Plain => false,
        }
    }

    /// Ask the tree about a pseudo-selector the engine does not know.
    /// Hook errors are reported once and count as no match.
    fn custom_pseudo<S: Selob>(&self, node: &S, index: usize, selector: &SelectorNode) -> PseudoMatch<S> {
        let Prepared::Custom(ident) = &self.prepared[index] else {
            return PseudoMatch::NoMatch;
        };
        match node.pseudo_selector(ident, selector.arg_str()) {
            Ok(result) => result,
            Err(message) => {
                warn_once("Selector", &message);
                PseudoMatch::NoMatch
            }
        }
    }
}

/// Precompute what matching `node` needs, validating built-in arguments.
fn prepare(node: &SelectorNode) -> Result<Prepared, SelectorError> {
    match node.kind {
        SelectorKind::PseudoElement => Ok(Prepared::Custom(format!("::{}", node.ident))),
        SelectorKind::PseudoClass => {
            let Ok(pseudo) = node.ident.parse::<PseudoClass>() else {
                return Ok(Prepared::Custom(format!(":{}", node.ident)));
            };
            let invalid = |reason: &str| SelectorError::InvalidPseudoArgument {
                pseudo: node.ident.clone(),
                reason: reason.to_string(),
            };
            match (&node.arg, pseudo.takes_argument()) {
                (None, false) => Ok(Prepared::Builtin(pseudo)),
                (Some(_), false) => Err(invalid("takes no argument")),
                (None, true) => Err(invalid("argument required")),
                (Some(arg), true) if pseudo.takes_nth_formula() => parse_css_nth(arg)
                    .map(|(a, b)| Prepared::Nth(pseudo, a, b))
                    .ok_or_else(|| invalid(&format!("'{arg}' is not an An+B formula"))),
                (Some(arg), true) => {
                    let inner = Matcher::parse(arg).map_err(|err| invalid(&err.to_string()))?;
                    if let Some(pseudo_element) = inner.first_pseudo_element_index {
                        let ident = inner.chain.nodes()[pseudo_element].ident.clone();
                        return Err(SelectorError::MisplacedPseudoElement(ident));
                    }
                    Ok(Prepared::Not(Box::new(inner)))
                }
            }
        }
        _ => Ok(Prepared::Plain),
    }
}

/// Whether `ident` names `type_name`, either exactly or as its last
/// `:`-separated segment (`Button` matches `Toolkit::Button`).
fn type_matches(type_name: &str, ident: &str) -> bool {
    type_name
        .strip_suffix(ident)
        .is_some_and(|head| head.is_empty() || head.ends_with(':'))
}

/// Structural pseudo-classes that need no argument.
fn matches_structural<S: Selob>(node: &S, pseudo: PseudoClass) -> bool {
    let has_parent = || node.parent().is_some();
    let same_type = |sibling: &S| sibling.type_name() == node.type_name();
    match pseudo {
        PseudoClass::Root => node.parent().is_none(),
        PseudoClass::Empty => node.n_children() == 0,
        PseudoClass::FirstChild => node.is_nth_child(1),
        PseudoClass::LastChild => node.is_nth_child(-1),
        PseudoClass::OnlyChild => node.is_nth_child(1) && node.is_nth_child(-1),
        PseudoClass::FirstOfType => has_parent() && !siblings(node, -1).any(|s| same_type(&s)),
        PseudoClass::LastOfType => has_parent() && !siblings(node, 1).any(|s| same_type(&s)),
        PseudoClass::OnlyOfType => {
            has_parent()
                && !siblings(node, -1).any(|s| same_type(&s))
                && !siblings(node, 1).any(|s| same_type(&s))
        }
        PseudoClass::Not
        | PseudoClass::NthChild
        | PseudoClass::NthLastChild
        | PseudoClass::NthOfType
        | PseudoClass::NthLastOfType => false,
    }
}

/// `:nth-*()` pseudo-classes: compute the 1-based position and test the formula.
fn matches_nth<S: Selob>(node: &S, pseudo: PseudoClass, a: i64, b: i64) -> bool {
    if node.parent().is_none() {
        return false;
    }
    let (step, of_type) = match pseudo {
        PseudoClass::NthChild => (-1, false),
        PseudoClass::NthLastChild => (1, false),
        PseudoClass::NthOfType => (-1, true),
        PseudoClass::NthLastOfType => (1, true),
        _ => return false,
    };
    let count = siblings(node, step)
        .filter(|sibling| !of_type || sibling.type_name() == node.type_name())
        .count();
    let position = i64::try_from(count).map_or(i64::MAX, |count| count.saturating_add(1));
    match_css_nth(position, a, b)
}

/// [§ 6.4 Attribute selectors](https://www.w3.org/TR/selectors-4/#attribute-selectors)
///
/// Only `Exists` distinguishes a missing property; every other operator
/// compares against the empty string in that case. Empty arguments never
/// match the prefix, suffix, substring and includes operators.
fn attribute_matches<S: Selob>(
    node: &S,
    name: &str,
    op: AttributeOp,
    case_insensitive: bool,
    arg: &str,
) -> bool {
    if op == AttributeOp::Exists {
        return node.has_property(name);
    }
    let mut value = node.get_property(name);
    let mut arg = arg.to_string();
    if case_insensitive {
        value.make_ascii_lowercase();
        arg.make_ascii_lowercase();
    }
    match op {
        AttributeOp::Exists => true,
        AttributeOp::Equals => value == arg,
        AttributeOp::Unequals => value != arg,
        AttributeOp::Prefix => !arg.is_empty() && value.starts_with(&arg),
        AttributeOp::Suffix => !arg.is_empty() && value.ends_with(&arg),
        AttributeOp::Substring => !arg.is_empty() && value.contains(&arg),
        AttributeOp::DashPrefix => value
            .strip_prefix(arg.as_str())
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('-')),
        AttributeOp::Includes => {
            !arg.is_empty() && value.split([' ', '\t']).any(|token| token == arg)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_matches_namespace_tail() {
        assert!(type_matches("Button", "Button"));
        assert!(type_matches("Toolkit::Button", "Button"));
        assert!(type_matches("Toolkit::Button", "Toolkit::Button"));
        assert!(!type_matches("Toolkit::ToggleButton", "Button"));
        assert!(!type_matches("Button", "Toolkit::Button"));
    }

    #[test]
    fn test_indices() {
        let matcher = Matcher::parse("A > B C::label").unwrap();
        assert_eq!(matcher.last_combinator_index(), Some(3));
        assert_eq!(matcher.subject_index(), 4);
        assert_eq!(matcher.first_pseudo_element_index(), Some(5));

        let matcher = Matcher::parse("A > !B > C").unwrap();
        assert_eq!(matcher.subject_index(), 2);

        let matcher = Matcher::parse("A! B").unwrap();
        assert_eq!(matcher.subject_index(), 0);

        let matcher = Matcher::parse("A B!").unwrap();
        assert_eq!(matcher.subject_index(), 2);

        let matcher = Matcher::parse(".x").unwrap();
        assert_eq!(matcher.subject_index(), 0);
        assert_eq!(matcher.last_combinator_index(), None);
    }

    #[test]
    fn test_structural_errors() {
        assert_eq!(Matcher::parse("!A > !B").unwrap_err(), SelectorError::MultipleSubjects);
        assert_eq!(
            Matcher::parse("A::x > B").unwrap_err(),
            SelectorError::CombinatorAfterPseudoElement("x".to_string())
        );
        assert_eq!(
            Matcher::parse("A:not(B::x)").unwrap_err(),
            SelectorError::MisplacedPseudoElement("x".to_string())
        );
    }

    #[test]
    fn test_builtin_argument_validation() {
        for selector in [":empty(1)", ":nth-child", ":nth-child(x)", ":not", ":not(>)"] {
            assert!(
                matches!(
                    Matcher::parse(selector),
                    Err(SelectorError::InvalidPseudoArgument { .. })
                ),
                "{selector} should be rejected"
            );
        }
        assert!(Matcher::parse(":nth-of-type( 2n + 1 )").is_ok());
    }
}
