//! Recursive-descent parser from selector text to a [`SelectorChain`].
//!
//! ```text
//! selector          S* sequence [ combinator sequence ]* [ S* '!' ]? S*
//! sequence          '!'? [ type | '*' ]? special*        (at least one element)
//! special           '#' name | '.' ident | attribute | pseudo
//! attribute         '[' S* ident S* [ op S* [ ident | string ] S* ]? [ 'i' S* ]? ']'
//! op                '=' | '!=' | '^=' | '$=' | '|=' | '*=' | '~='
//! pseudo            ':' ':'? ident [ '(' balanced-text ')' ]?
//! combinator        '!'? [ S* [ '>' | '+' | '~' ] S* | S+ ]
//! ```
//!
//! Every production advances the scanner only when it succeeds and leaves
//! no nodes behind when it fails.

use crate::chain::{AttributeOp, SelectorChain, SelectorKind, SelectorNode};
use crate::error::SelectorError;
use crate::pseudo::{PseudoClass, is_custom_pseudo_shape};
use crate::scanner::{Nesting, Scanner};

/// Parse `input` into a chain. With `allow_combinators == false` the input
/// must be a single simple selector sequence.
pub(crate) fn parse_selector_chain(
    input: &str,
    allow_combinators: bool,
) -> Result<SelectorChain, SelectorError> {
    let mut parser = Parser::new(input);
    let _ = parser.scanner.skip_spaces();

    if !parser.parse_simple_selector_sequence() {
        return Err(parser.error_here("expected a selector"));
    }

    if allow_combinators {
        loop {
            let saved = parser.save();
            if parser.parse_combinator() && parser.parse_simple_selector_sequence() {
                continue;
            }
            parser.restore(saved);
            break;
        }
    }

    // A trailing '!' marks the last sequence; it is ignored once a subject
    // has already been marked.
    let saved = parser.save();
    let _ = parser.scanner.skip_spaces();
    if parser.scanner.eat(b'!') {
        if !parser.nodes.iter().any(|node| node.kind == SelectorKind::Subject) {
            parser.push(SelectorNode::new(SelectorKind::Subject, ""));
        }
    } else {
        parser.restore(saved);
    }

    let _ = parser.scanner.skip_spaces();
    if !parser.scanner.is_eof() {
        let what = if allow_combinators {
            "unexpected input after selector"
        } else {
            "expected a single simple selector sequence"
        };
        return Err(parser.error_here(what));
    }

    Ok(SelectorChain::from_nodes(parser.nodes))
}

/// Position of the scanner and length of the node list, for backtracking.
#[derive(Debug, Clone, Copy)]
struct Saved {
    position: usize,
    nodes: usize,
}

struct Parser<'a> {
    scanner: Scanner<'a>,
    nodes: Vec<SelectorNode>,
    /// Most specific failure seen so far, kept at the furthest offset.
    failure: Option<(usize, String)>,
}

impl<'a> Parser<'a> {
    const fn new(input: &'a str) -> Self {
        Self {
            scanner: Scanner::new(input),
            nodes: Vec::new(),
            failure: None,
        }
    }

    fn save(&self) -> Saved {
        Saved {
            position: self.scanner.position(),
            nodes: self.nodes.len(),
        }
    }

    fn restore(&mut self, saved: Saved) {
        self.scanner.reset(saved.position);
        self.nodes.truncate(saved.nodes);
    }

    fn push(&mut self, node: SelectorNode) {
        self.nodes.push(node);
    }

    /// Remember why a production failed at `offset`.
    fn fail(&mut self, offset: usize, message: impl Into<String>) {
        if self.failure.as_ref().is_none_or(|(seen, _)| offset >= *seen) {
            self.failure = Some((offset, message.into()));
        }
    }

    /// Build the error for a parse that stopped at the current position,
    /// preferring a recorded failure that got at least as far.
    fn error_here(&mut self, fallback: &str) -> SelectorError {
        let offset = self.scanner.position();
        match self.failure.take() {
            Some((seen, message)) if seen >= offset => SelectorError::syntax(seen, message),
            _ => {
                let message = match self.scanner.rest().chars().next() {
                    Some(c) => format!("{fallback}, found '{c}'"),
                    None => format!("{fallback}, found end of input"),
                };
                SelectorError::syntax(offset, message)
            }
        }
    }

    /// `'!'? [ type | '*' ]? special*`
    fn parse_simple_selector_sequence(&mut self) -> bool {
        let saved = self.save();
        if self.scanner.eat(b'!') {
            self.push(SelectorNode::new(SelectorKind::Subject, ""));
        }
        let mut elements = usize::from(self.parse_type_selector());
        while self.parse_special_selector() {
            elements += 1;
        }
        if elements == 0 {
            self.restore(saved);
            return false;
        }
        true
    }

    /// `ident` as type selector, or `*`.
    fn parse_type_selector(&mut self) -> bool {
        if self.scanner.eat(b'*') {
            self.push(SelectorNode::new(SelectorKind::Universal, ""));
            return true;
        }
        match self.scanner.parse_identifier() {
            Some(ident) => {
                self.push(SelectorNode::new(SelectorKind::Type, ident));
                true
            }
            None => false,
        }
    }

    fn parse_special_selector(&mut self) -> bool {
        match self.scanner.peek() {
            Some(b'#') => self.parse_prefixed(SelectorKind::Id),
            Some(b'.') => self.parse_prefixed(SelectorKind::Class),
            Some(b'[') => self.parse_attribute(),
            Some(b':') => self.parse_pseudo(),
            _ => false,
        }
    }

    /// `'#' name` or `'.' ident`
    fn parse_prefixed(&mut self, kind: SelectorKind) -> bool {
        let start = self.scanner.position();
        self.scanner.reset(start + 1);
        let ident = if kind == SelectorKind::Id {
            self.scanner.parse_name()
        } else {
            self.scanner.parse_identifier()
        };
        match ident {
            Some(ident) => {
                self.push(SelectorNode::new(kind, ident));
                true
            }
            None => {
                let what = if kind == SelectorKind::Id { "id" } else { "class name" };
                self.fail(start + 1, format!("expected {what}"));
                self.scanner.reset(start);
                false
            }
        }
    }

    /// [§ 6.4 Attribute selectors](https://www.w3.org/TR/selectors-4/#attribute-selectors)
    fn parse_attribute(&mut self) -> bool {
        let start = self.scanner.position();
        self.scanner.reset(start + 1);
        let Some(inner) = self
            .scanner
            .scan_nested(Nesting::QUOTES | Nesting::BRACKETS | Nesting::PARENS, b']')
        else {
            self.fail(start, "unterminated attribute selector, missing ']'");
            self.scanner.reset(start);
            return false;
        };
        let _ = self.scanner.eat(b']');

        match parse_attribute_body(inner) {
            Ok(node) => {
                self.push(node);
                true
            }
            Err((offset, message)) => {
                self.fail(start + 1 + offset, message);
                self.scanner.reset(start);
                false
            }
        }
    }

    /// [§ 3.6 Pseudo-classes](https://www.w3.org/TR/selectors-4/#pseudo-classes) and
    /// [§ 3.6.4 Pseudo-elements](https://www.w3.org/TR/selectors-4/#pseudo-elements)
    fn parse_pseudo(&mut self) -> bool {
        let start = self.scanner.position();
        self.scanner.reset(start + 1);
        let is_element = self.scanner.eat(b':');
        let colons = if is_element { "::" } else { ":" };

        let Some(name) = self.scanner.parse_identifier() else {
            self.fail(self.scanner.position(), format!("expected pseudo-selector name after '{colons}'"));
            self.scanner.reset(start);
            return false;
        };

        let arg = if self.scanner.eat(b'(') {
            // '>' is a combinator inside `:not(...)`, not a closing angle;
            // '//' and '/*' are plain text.
            let nesting = Nesting::QUOTES | Nesting::PARENS | Nesting::BRACKETS | Nesting::BRACES;
            let Some(text) = self.scanner.scan_nested(nesting, b')') else {
                self.fail(start, format!("unterminated argument of '{colons}{name}(', missing ')'"));
                self.scanner.reset(start);
                return false;
            };
            let _ = self.scanner.eat(b')');
            Some(text.to_string())
        } else {
            None
        };

        let builtin = if is_element {
            None
        } else {
            name.parse::<PseudoClass>().ok()
        };
        let ident = match builtin {
            Some(pseudo) => <&'static str>::from(pseudo).to_string(),
            None if is_custom_pseudo_shape(&name) => name,
            None => {
                self.fail(start, format!("unknown pseudo-selector '{colons}{name}'"));
                self.scanner.reset(start);
                return false;
            }
        };

        let kind = if is_element {
            SelectorKind::PseudoElement
        } else {
            SelectorKind::PseudoClass
        };
        self.push(SelectorNode {
            kind,
            ident,
            arg,
        });
        true
    }

    /// [§ 16 Combinators](https://www.w3.org/TR/selectors-4/#combinators)
    ///
    /// A `'!'` directly after a sequence marks that sequence as subject.
    fn parse_combinator(&mut self) -> bool {
        let saved = self.save();
        if self.scanner.eat(b'!') {
            self.push(SelectorNode::new(SelectorKind::Subject, ""));
        }
        let spaced = self.scanner.parse_spaces(1);
        let kind = match self.scanner.peek() {
            Some(b'>') => Some(SelectorKind::Child),
            Some(b'+') => Some(SelectorKind::Adjacent),
            Some(b'~') => Some(SelectorKind::Neighboring),
            _ => None,
        };
        match kind {
            Some(kind) => {
                self.scanner.reset(self.scanner.position() + 1);
                let _ = self.scanner.skip_spaces();
                self.push(SelectorNode::new(kind, ""));
                true
            }
            None if spaced => {
                self.push(SelectorNode::new(SelectorKind::Descendant, ""));
                true
            }
            None => {
                self.restore(saved);
                false
            }
        }
    }
}

/// Parse the text between `[` and `]`. Errors carry an offset relative to `body`.
fn parse_attribute_body(body: &str) -> Result<SelectorNode, (usize, String)> {
    let mut scanner = Scanner::new(body);
    let _ = scanner.skip_spaces();
    let Some(name) = scanner.parse_identifier() else {
        return Err((scanner.position(), "expected attribute name".to_string()));
    };
    let spaced = scanner.skip_spaces() > 0;

    let rest = scanner.rest();
    let op = [2, 1]
        .into_iter()
        .filter_map(|len| rest.get(..len))
        .find_map(AttributeOp::from_symbol);

    let Some(op) = op else {
        let case_insensitive = spaced && parse_case_flag(&mut scanner);
        if !scanner.is_eof() {
            return Err((scanner.position(), format!("expected attribute operator after '{name}'")));
        }
        return Ok(SelectorNode::new(
            SelectorKind::Attribute {
                op: AttributeOp::Exists,
                case_insensitive,
            },
            name,
        ));
    };
    scanner.reset(scanner.position() + op.symbol().len());
    let _ = scanner.skip_spaces();

    let value_start = scanner.position();
    let (value, quoted) = match scanner.parse_string() {
        Some(value) => (value, true),
        None => match scanner.parse_identifier() {
            Some(value) => (value, false),
            None => {
                let message = if matches!(scanner.peek(), Some(b'"' | b'\'')) {
                    "unterminated string in attribute selector"
                } else {
                    "expected attribute value"
                };
                return Err((value_start, message.to_string()));
            }
        },
    };

    let spaced = scanner.skip_spaces() > 0;
    let case_insensitive = (spaced || quoted) && parse_case_flag(&mut scanner);
    if !scanner.is_eof() {
        return Err((scanner.position(), "unexpected input in attribute selector".to_string()));
    }

    Ok(SelectorNode::with_arg(
        SelectorKind::Attribute {
            op,
            case_insensitive,
        },
        name,
        value,
    ))
}

/// `[iI] S*` at the end of an attribute selector.
fn parse_case_flag(scanner: &mut Scanner<'_>) -> bool {
    let start = scanner.position();
    if scanner.eat(b'i') || scanner.eat(b'I') {
        let _ = scanner.skip_spaces();
        if scanner.is_eof() {
            return true;
        }
    }
    scanner.reset(start);
    false
}
