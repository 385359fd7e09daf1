//! Errors reported while turning selector text into a usable matcher.

use thiserror::Error;

/// Why a selector could not be parsed or finalized.
///
/// Malformed selectors are an expected input class, so every parse entry
/// point reports them through this type instead of panicking.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectorError {
    /// The text does not follow the selector grammar.
    #[error("invalid selector at offset {offset}: {message}")]
    Syntax {
        /// Byte offset into the selector text where parsing gave up.
        offset: usize,
        /// Human-readable description of the problem.
        message: String,
    },

    /// More than one `!` subject marker appears in the chain.
    #[error("selector has more than one subject marker '!'")]
    MultipleSubjects,

    /// A pseudo-element appears where no node substitution is possible,
    /// e.g. inside a `:not(...)` argument.
    #[error("pseudo-element '::{0}' is not allowed here")]
    MisplacedPseudoElement(String),

    /// A combinator follows a pseudo-element, so the pseudo-element is not
    /// on the last simple selector sequence.
    #[error("combinator follows pseudo-element '::{0}'")]
    CombinatorAfterPseudoElement(String),

    /// A built-in pseudo-class got a missing, superfluous or malformed argument.
    #[error("invalid argument for ':{pseudo}': {reason}")]
    InvalidPseudoArgument {
        /// Name of the pseudo-class, without the leading colon.
        pseudo: String,
        /// What is wrong with the argument.
        reason: String,
    },
}

impl SelectorError {
    pub(crate) fn syntax(offset: usize, message: impl Into<String>) -> Self {
        Self::Syntax {
            offset,
            message: message.into(),
        }
    }
}
