//! Scanner primitives shared by every selector production.
//!
//! Each `parse_*`/`scan_*` method either advances the cursor and succeeds,
//! or leaves the cursor where it was and fails. Callers backtrack by saving
//! [`Scanner::position`] and handing it back to [`Scanner::reset`].
//!
//! The identifier and string grammar follows
//! [CSS 2.1 § 4.1.1 Tokenization](https://www.w3.org/TR/CSS21/syndata.html#tokenization):
//!
//! ```text
//! ident    -?{nmstart}{nmchar}*
//! nmstart  [_a-z]|{nonascii}|{escape}
//! nmchar   [_a-z0-9-]|{nonascii}|{escape}
//! unicode  \\[0-9a-f]{1,6}(\r\n|[ \n\r\t\f])?
//! escape   {unicode}|\\[^\n\r\f0-9a-f]
//! ```

use bitflags::bitflags;

bitflags! {
    /// Delimiter classes balanced by [`Scanner::scan_nested`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Nesting: u8 {
        /// `<` ... `>`
        const ANGLES = 1 << 0;
        /// `[` ... `]`
        const BRACKETS = 1 << 1;
        /// `(` ... `)`
        const PARENS = 1 << 2;
        /// `{` ... `}`
        const BRACES = 1 << 3;
        /// `/*` ... `*/`
        const C_COMMENTS = 1 << 4;
        /// `//` ... end of line
        const CXX_COMMENTS = 1 << 5;
        /// `"` ... `"` and `'` ... `'`, honoring backslash escapes
        const QUOTES = 1 << 6;
    }
}

impl Nesting {
    /// Opening delimiter and its closing counterpart, for every pair class in `self`.
    fn pairs(self) -> impl Iterator<Item = (u8, u8)> {
        [
            (Self::ANGLES, b'<', b'>'),
            (Self::BRACKETS, b'[', b']'),
            (Self::PARENS, b'(', b')'),
            (Self::BRACES, b'{', b'}'),
        ]
        .into_iter()
        .filter(move |(flag, _, _)| self.contains(*flag))
        .map(|(_, open, close)| (open, close))
    }
}

/// ASCII whitespace as understood by the selector grammar: `' \t\n\v\f\r'`.
#[must_use]
pub const fn is_space(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | 0x0b | 0x0c | b'\r')
}

/// Bytes that may start an identifier (after an optional `-`).
/// Non-ASCII bytes are accepted as opaque UTF-8.
#[must_use]
pub const fn is_nmstart(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b >= 0x80
}

/// Bytes that may continue an identifier.
#[must_use]
pub const fn is_nmchar(b: u8) -> bool {
    is_nmstart(b) || b.is_ascii_digit() || b == b'-'
}

/// Cursor over selector text.
#[derive(Debug, Clone)]
pub struct Scanner<'a> {
    /// The text being scanned
    input: &'a str,
    /// Current byte offset into `input`
    position: usize,
}

impl<'a> Scanner<'a> {
    /// Create a scanner positioned at the start of `input`.
    #[must_use]
    pub const fn new(input: &'a str) -> Self {
        Self { input, position: 0 }
    }

    /// Current byte offset.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.position
    }

    /// Move the cursor back to a position previously returned by [`Self::position`].
    pub const fn reset(&mut self, position: usize) {
        self.position = position;
    }

    /// True once every byte has been consumed.
    #[must_use]
    pub const fn is_eof(&self) -> bool {
        self.position >= self.input.len()
    }

    /// The next byte without consuming it.
    #[must_use]
    pub fn peek(&self) -> Option<u8> {
        self.peek_at(0)
    }

    /// The byte `offset` positions ahead without consuming anything.
    #[must_use]
    pub fn peek_at(&self, offset: usize) -> Option<u8> {
        self.input.as_bytes().get(self.position + offset).copied()
    }

    /// Everything from the cursor to the end of the input.
    #[must_use]
    pub fn rest(&self) -> &'a str {
        self.input.get(self.position..).unwrap_or_default()
    }

    /// The next character, decoded as UTF-8.
    fn peek_char(&self) -> Option<char> {
        self.rest().chars().next()
    }

    /// Consume `expected` if it is the next byte.
    pub fn eat(&mut self, expected: u8) -> bool {
        if self.peek() == Some(expected) {
            self.position += 1;
            true
        } else {
            false
        }
    }

    /// Skip ASCII whitespace, returning how many bytes were skipped.
    pub fn skip_spaces(&mut self) -> usize {
        let start = self.position;
        while self.peek().is_some_and(is_space) {
            self.position += 1;
        }
        self.position - start
    }

    /// Skip whitespace, succeeding only if at least `min` bytes were skipped.
    pub fn parse_spaces(&mut self, min: usize) -> bool {
        let start = self.position;
        if self.skip_spaces() >= min {
            true
        } else {
            self.position = start;
            false
        }
    }

    /// Parse an identifier: `'-'? nmstart nmchar*`, decoding escapes.
    pub fn parse_identifier(&mut self) -> Option<String> {
        let start = self.position;
        let mut out = Vec::new();
        if self.eat(b'-') {
            out.push(b'-');
        }
        if !self.scan_nmchar(&mut out, is_nmstart) {
            self.position = start;
            return None;
        }
        while self.scan_nmchar(&mut out, is_nmchar) {}
        Some(String::from_utf8_lossy(&out).into_owned())
    }

    /// Parse a name: `nmchar+`, as used after `#` in id selectors.
    pub fn parse_name(&mut self) -> Option<String> {
        let mut out = Vec::new();
        while self.scan_nmchar(&mut out, is_nmchar) {}
        if out.is_empty() {
            None
        } else {
            Some(String::from_utf8_lossy(&out).into_owned())
        }
    }

    /// Consume one identifier character accepted by `accept`, or one escape.
    fn scan_nmchar(&mut self, out: &mut Vec<u8>, accept: fn(u8) -> bool) -> bool {
        match self.peek() {
            Some(b'\\') => self.parse_escape(out),
            Some(b) if accept(b) => {
                out.push(b);
                self.position += 1;
                true
            }
            _ => false,
        }
    }

    /// Parse a backslash escape at the cursor and append its UTF-8 encoding.
    ///
    /// `\` + 1-6 hex digits decodes a code point and swallows one following
    /// whitespace (or `\r\n`); `\` + any other non-newline character yields
    /// that character.
    fn parse_escape(&mut self, out: &mut Vec<u8>) -> bool {
        let start = self.position;
        if !self.eat(b'\\') {
            return false;
        }
        match self.peek() {
            None | Some(b'\n' | b'\r' | 0x0c) => {
                self.position = start;
                false
            }
            Some(b) if b.is_ascii_hexdigit() => {
                let mut code = 0u32;
                let mut digits = 0;
                while digits < 6 {
                    let Some(value) = self.peek().and_then(|b| char::from(b).to_digit(16)) else {
                        break;
                    };
                    code = code * 16 + value;
                    digits += 1;
                    self.position += 1;
                }
                if self.peek() == Some(b'\r') && self.peek_at(1) == Some(b'\n') {
                    self.position += 2;
                } else if self.peek().is_some_and(is_space) {
                    self.position += 1;
                }
                let decoded = match code {
                    0 => char::REPLACEMENT_CHARACTER,
                    _ => char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER),
                };
                let mut buf = [0u8; 4];
                out.extend_from_slice(decoded.encode_utf8(&mut buf).as_bytes());
                true
            }
            Some(_) => {
                let Some(c) = self.peek_char() else {
                    self.position = start;
                    return false;
                };
                let mut buf = [0u8; 4];
                out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
                self.position += c.len_utf8();
                true
            }
        }
    }

    /// Parse a single- or double-quoted string, decoding escapes and
    /// eliding backslash-newline line continuations.
    pub fn parse_string(&mut self) -> Option<String> {
        let start = self.position;
        let quote = match self.peek() {
            Some(q @ (b'"' | b'\'')) => q,
            _ => return None,
        };
        self.position += 1;
        let mut out = Vec::new();
        loop {
            match self.peek() {
                Some(b) if b == quote => {
                    self.position += 1;
                    return Some(String::from_utf8_lossy(&out).into_owned());
                }
                Some(b'\\') => match self.peek_at(1) {
                    Some(b'\r') => {
                        self.position += 2;
                        let _ = self.eat(b'\n');
                    }
                    Some(b'\n' | 0x0c) => self.position += 2,
                    _ => {
                        if !self.parse_escape(&mut out) {
                            break;
                        }
                    }
                },
                // Unterminated string or raw newline inside the quotes.
                None | Some(b'\n' | b'\r' | 0x0c) => break,
                Some(b) => {
                    out.push(b);
                    self.position += 1;
                }
            }
        }
        self.position = start;
        None
    }

    /// Scan forward to the first unbalanced occurrence of `terminator`,
    /// balancing the delimiter classes in `nesting` on the way.
    ///
    /// Returns the text between the cursor and the terminator and leaves the
    /// cursor *on* the terminator. Fails without moving if the input ends
    /// first or a closing delimiter shows up without its opener.
    pub fn scan_nested(&mut self, nesting: Nesting, terminator: u8) -> Option<&'a str> {
        let start = self.position;
        let mut expected: Vec<u8> = Vec::new();
        while let Some(b) = self.peek() {
            if expected.is_empty() && b == terminator {
                return self.input.get(start..self.position);
            }
            if b == b'\\' {
                self.position += 1;
                self.position += self.peek_char().map_or(0, char::len_utf8);
                continue;
            }
            if (b == b'"' || b == b'\'') && nesting.contains(Nesting::QUOTES) {
                let mut scratch = Vec::new();
                if !self.skip_quoted(b, &mut scratch) {
                    break;
                }
                continue;
            }
            if b == b'/' && self.peek_at(1) == Some(b'*') && nesting.contains(Nesting::C_COMMENTS) {
                match self.rest().get(2..).and_then(|tail| tail.find("*/")) {
                    Some(end) => self.position += 2 + end + 2,
                    None => break,
                }
                continue;
            }
            if b == b'/' && self.peek_at(1) == Some(b'/') && nesting.contains(Nesting::CXX_COMMENTS) {
                self.position += self.rest().find('\n').unwrap_or(self.rest().len());
                continue;
            }
            if let Some((_, close)) = nesting.pairs().find(|&(open, _)| open == b) {
                expected.push(close);
            } else if expected.last() == Some(&b) {
                let _ = expected.pop();
            } else if nesting.pairs().any(|(_, close)| close == b) {
                // Closing delimiter without a matching opener.
                break;
            }
            self.position += 1;
        }
        self.position = start;
        None
    }

    /// Skip a quoted section starting at the cursor, tolerating raw newlines.
    fn skip_quoted(&mut self, quote: u8, scratch: &mut Vec<u8>) -> bool {
        let start = self.position;
        self.position += 1;
        while let Some(b) = self.peek() {
            if b == quote {
                self.position += 1;
                return true;
            }
            if b == b'\\' {
                if !self.parse_escape(scratch) {
                    // Line continuation, or a backslash at the very end.
                    self.position += 2;
                }
                continue;
            }
            self.position += 1;
        }
        self.position = start;
        false
    }
}
