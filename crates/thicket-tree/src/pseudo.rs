//! Custom pseudo-selectors evaluated by [`NodeRef`].
//!
//! | selector          | meaning                                                    |
//! |-------------------|------------------------------------------------------------|
//! | `:visible`        | neither the node nor an ancestor has `visible` = `false`   |
//! | `:property(name)` | the node has the property `name`                           |
//! | `::child(n)`      | continue matching at the child with 0-based index `n`      |
//! | `::parent`        | continue matching at the parent                            |

use std::sync::Once;

use thicket_selector::selob::ancestors;
use thicket_selector::{PseudoMatch, Selob, register_custom_pseudo};

use crate::NodeRef;

const PSEUDOS: [(&str, &str); 4] = [
    (":visible", "node and all its ancestors are visible"),
    (":property", "node has the property named by the argument"),
    ("::child", "child at the 0-based index given by the argument"),
    ("::parent", "parent of the node"),
];

/// Advertise the pseudo-selectors in the process-wide registry, once.
pub fn register() {
    static REGISTERED: Once = Once::new();
    REGISTERED.call_once(|| {
        for (ident, blurb) in PSEUDOS {
            register_custom_pseudo(ident, blurb);
        }
    });
}

/// Evaluate `ident` (colons included) with argument `arg` on `node`.
///
/// # Errors
///
/// Returns a description if `ident` is unknown or `arg` does not fit it.
pub fn evaluate<'a>(
    node: &NodeRef<'a>,
    ident: &str,
    arg: &str,
) -> Result<PseudoMatch<NodeRef<'a>>, String> {
    let arg = arg.trim();
    match ident {
        ":visible" => {
            no_argument(ident, arg)?;
            Ok(found(is_visible(node)))
        }
        ":property" => {
            if arg.is_empty() {
                return Err("':property' needs a property name".to_string());
            }
            Ok(found(node.has_property(arg)))
        }
        "::child" => {
            let index = arg
                .parse::<usize>()
                .map_err(|_| format!("'::child({arg})' needs a non-negative index"))?;
            Ok(node.child(index).map_or(PseudoMatch::NoMatch, PseudoMatch::Node))
        }
        "::parent" => {
            no_argument(ident, arg)?;
            Ok(node.parent().map_or(PseudoMatch::NoMatch, PseudoMatch::Node))
        }
        _ => Err(format!("unknown pseudo-selector '{ident}'")),
    }
}

fn no_argument(ident: &str, arg: &str) -> Result<(), String> {
    if arg.is_empty() {
        Ok(())
    } else {
        Err(format!("'{ident}' takes no argument, got '{arg}'"))
    }
}

const fn found<S>(matched: bool) -> PseudoMatch<S> {
    if matched {
        PseudoMatch::Matched
    } else {
        PseudoMatch::NoMatch
    }
}

fn is_visible(node: &NodeRef<'_>) -> bool {
    let hidden = |node: &NodeRef<'_>| node.get_property("visible") == "false";
    !hidden(node) && !ancestors(node).any(|ancestor| hidden(&ancestor))
}
