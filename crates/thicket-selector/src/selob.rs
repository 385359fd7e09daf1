//! The node contract the matcher queries against.
//!
//! A `Selob` ("selectable object") is a cheap handle onto a node of some
//! externally owned tree. The engine only reads through it: identity,
//! types, properties, navigation and the custom pseudo-selector hook.

use std::iter;

/// Outcome of a custom pseudo-selector hook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PseudoMatch<S> {
    /// The pseudo-selector does not apply to this node.
    NoMatch,
    /// The pseudo-selector holds; matching continues on the same node.
    Matched,
    /// The pseudo-selector resolves to another node; matching continues there.
    Node(S),
}

/// Handle onto a node of a tree that selectors can be matched against.
///
/// Handles are cloned freely, so implementations are typically a reference
/// to the tree plus a node index.
pub trait Selob: Clone {
    /// Stable identifier, matched by `#id` selectors.
    fn id(&self) -> &str;

    /// Primary type name, matched by type selectors.
    fn type_name(&self) -> &str;

    /// Every type name or alias the node satisfies, matched by `.class`
    /// selectors. Usually starts with [`Self::type_name`].
    fn type_list(&self) -> &[String];

    /// Whether the property `name` is set.
    fn has_property(&self, name: &str) -> bool;

    /// Value of the property `name`, or an empty string if it is not set.
    fn get_property(&self, name: &str) -> String;

    /// The parent node, `None` for a root.
    fn parent(&self) -> Option<Self>;

    /// The sibling `offset` positions away: negative offsets go towards the
    /// first child, positive ones towards the last, `0` is the node itself.
    fn sibling(&self, offset: isize) -> Option<Self>;

    /// Number of children.
    fn n_children(&self) -> usize;

    /// Child at `index`, for `index < n_children()`.
    fn child(&self, index: usize) -> Option<Self>;

    /// Whether this is the `nth` child of its parent, 1-based; negative
    /// values count from the last child (`-1` is the last one).
    ///
    /// The default walks siblings; trees that know child positions should
    /// override it.
    fn is_nth_child(&self, nth: isize) -> bool {
        if nth == 0 || self.parent().is_none() {
            return false;
        }
        let Some(past) = nth.checked_neg() else {
            return false;
        };
        let before = nth - nth.signum();
        (before == 0 || self.sibling(-before).is_some()) && self.sibling(past).is_none()
    }

    /// Evaluate a pseudo-selector the engine does not know itself.
    ///
    /// `ident` includes its colons (`":name"` or `"::name"`) and `arg` is
    /// the raw parenthesized argument, empty if there was none.
    ///
    /// # Errors
    ///
    /// Returns a description of the problem if `ident` is not supported or
    /// `arg` is unusable; the engine reports it and treats the step as failed.
    fn pseudo_selector(&self, ident: &str, arg: &str) -> Result<PseudoMatch<Self>, String> {
        let _ = arg;
        Err(format!("unknown pseudo-selector '{ident}'"))
    }
}

/// Children of `node`, first to last.
pub fn children<S: Selob>(node: &S) -> impl Iterator<Item = S> + '_ {
    (0..node.n_children()).filter_map(|index| node.child(index))
}

/// Ancestors of `node`, from its parent up to the root.
pub fn ancestors<S: Selob>(node: &S) -> impl Iterator<Item = S> {
    iter::successors(node.parent(), Selob::parent)
}

/// Siblings of `node` walking in `step` direction (`-1` or `1`), nearest first.
pub fn siblings<S: Selob>(node: &S, step: isize) -> impl Iterator<Item = S> {
    iter::successors(node.sibling(step), move |sibling| sibling.sibling(step))
}
