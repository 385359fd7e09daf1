//! Tree queries built on [`Matcher`].
//!
//! Apart from the boolean test, which looks at the given node only, every
//! search visits the root itself and then its descendants in depth-first
//! pre-order. Each visited node is tried as subject candidate; what a
//! successful match returns is collected, without deduplication.

use crate::error::SelectorError;
use crate::matcher::Matcher;
use crate::selob::{Selob, children};

impl Matcher {
    /// Whether `node` itself matches, its descendants are not searched.
    #[must_use]
    pub fn matches<S: Selob>(&self, node: &S) -> bool {
        self.match_selector_chain(node).is_some()
    }

    /// The first match in pre-order.
    #[must_use]
    pub fn query_first<S: Selob>(&self, root: &S) -> Option<S> {
        let mut found = Vec::with_capacity(1);
        let _ = self.collect_matches(root, Some(1), &mut found);
        found.pop()
    }

    /// The match if there is exactly one; `None` for zero or several.
    ///
    /// Stops searching once a second match is found.
    #[must_use]
    pub fn query_unique<S: Selob>(&self, root: &S) -> Option<S> {
        let mut found = Vec::with_capacity(2);
        let _ = self.collect_matches(root, Some(2), &mut found);
        if found.len() == 1 { found.pop() } else { None }
    }

    /// Every match in pre-order.
    #[must_use]
    pub fn query_all<S: Selob>(&self, root: &S) -> Vec<S> {
        let mut found = Vec::new();
        let _ = self.collect_matches(root, None, &mut found);
        found
    }

    /// Match each node of `candidates` individually, without descending.
    pub fn query_objects<S, I>(&self, candidates: I) -> impl Iterator<Item = S>
    where
        S: Selob,
        I: IntoIterator<Item = S>,
    {
        candidates
            .into_iter()
            .filter_map(|candidate| self.match_selector_chain(&candidate))
    }

    /// Collect matches below and including `node` into `out` until `limit`
    /// is reached. Returns `true` once the limit stops the walk.
    fn collect_matches<S: Selob>(&self, node: &S, limit: Option<usize>, out: &mut Vec<S>) -> bool {
        if let Some(found) = self.match_selector_chain(node) {
            out.push(found);
            if limit.is_some_and(|limit| out.len() >= limit) {
                return true;
            }
        }
        children(node).any(|child| self.collect_matches(&child, limit, out))
    }
}

/// Whether `node` itself matches `selector`.
///
/// # Errors
///
/// Returns the [`SelectorError`] if `selector` does not parse.
pub fn query_selector_bool<S: Selob>(selector: &str, node: &S) -> Result<bool, SelectorError> {
    Ok(Matcher::parse(selector)?.matches(node))
}

/// First match of `selector` in the subtree of `root`, pre-order.
///
/// # Errors
///
/// Returns the [`SelectorError`] if `selector` does not parse.
pub fn query_selector_first<S: Selob>(selector: &str, root: &S) -> Result<Option<S>, SelectorError> {
    Ok(Matcher::parse(selector)?.query_first(root))
}

/// The only match of `selector` in the subtree of `root`, or `None` if
/// there are zero or several.
///
/// # Errors
///
/// Returns the [`SelectorError`] if `selector` does not parse.
pub fn query_selector_unique<S: Selob>(
    selector: &str,
    root: &S,
) -> Result<Option<S>, SelectorError> {
    Ok(Matcher::parse(selector)?.query_unique(root))
}

/// Every match of `selector` in the subtree of `root`, pre-order.
///
/// # Errors
///
/// Returns the [`SelectorError`] if `selector` does not parse.
pub fn query_selector_all<S: Selob>(selector: &str, root: &S) -> Result<Vec<S>, SelectorError> {
    Ok(Matcher::parse(selector)?.query_all(root))
}

/// Match `selector` against each of `candidates` on its own, in order.
///
/// # Errors
///
/// Returns the [`SelectorError`] if `selector` does not parse.
pub fn query_selector_objects<S, I>(selector: &str, candidates: I) -> Result<Vec<S>, SelectorError>
where
    S: Selob,
    I: IntoIterator<Item = S>,
{
    let matcher = Matcher::parse(selector)?;
    Ok(matcher.query_objects(candidates).collect())
}
