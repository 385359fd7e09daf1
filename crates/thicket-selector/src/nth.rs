//! The `An+B` microsyntax used by `:nth-child()` and friends.
//!
//! [CSS Syntax § 6 The An+B microsyntax](https://www.w3.org/TR/css-syntax-3/#anb-microsyntax)
//!
//! ```text
//! nth  S* [ ['-'|'+']? INTEGER? {N} [ S* ['-'|'+'] S* INTEGER ]?
//!         | ['-'|'+']? INTEGER | {O}{D}{D} | {E}{V}{E}{N} ] S*
//! ```

use crate::scanner::Scanner;

/// Parse an nth formula into `(a, b)` such that matching 1-based positions
/// are `a*n + b` for some `n >= 0`.
///
/// `odd` is `(2, 1)`, `even` is `(2, 0)` and a bare integer `b` is `(0, b)`.
/// Returns `None` unless the whole text is a valid formula.
#[must_use]
pub fn parse_css_nth(text: &str) -> Option<(i64, i64)> {
    let mut scanner = Scanner::new(text);
    let _ = scanner.skip_spaces();
    let formula = parse_formula(&mut scanner)?;
    let _ = scanner.skip_spaces();
    scanner.is_eof().then_some(formula)
}

fn parse_formula(scanner: &mut Scanner<'_>) -> Option<(i64, i64)> {
    let start = scanner.position();
    let sign_a = parse_sign(scanner).unwrap_or(1);
    let digits = parse_integer(scanner);

    if matches!(scanner.peek(), Some(b'n' | b'N')) {
        let _ = scanner.eat(scanner.peek()?);
        let a = sign_a.checked_mul(digits.unwrap_or(1))?;
        let before_b = scanner.position();
        let _ = scanner.skip_spaces();
        if let Some(sign_b) = parse_sign(scanner) {
            let _ = scanner.skip_spaces();
            if let Some(b) = parse_integer(scanner) {
                return Some((a, sign_b.checked_mul(b)?));
            }
        }
        scanner.reset(before_b);
        return Some((a, 0));
    }

    if let Some(b) = digits {
        return Some((0, sign_a.checked_mul(b)?));
    }

    scanner.reset(start);
    let word: String = scanner
        .rest()
        .bytes()
        .take_while(u8::is_ascii_alphabetic)
        .map(char::from)
        .collect();
    let formula = if word.eq_ignore_ascii_case("odd") {
        (2, 1)
    } else if word.eq_ignore_ascii_case("even") {
        (2, 0)
    } else {
        return None;
    };
    scanner.reset(start + word.len());
    Some(formula)
}

fn parse_sign(scanner: &mut Scanner<'_>) -> Option<i64> {
    if scanner.eat(b'+') {
        Some(1)
    } else if scanner.eat(b'-') {
        Some(-1)
    } else {
        None
    }
}

fn parse_integer(scanner: &mut Scanner<'_>) -> Option<i64> {
    let digits: &str = {
        let rest = scanner.rest();
        let len = rest.bytes().take_while(u8::is_ascii_digit).count();
        rest.get(..len)?
    };
    if digits.is_empty() {
        return None;
    }
    let value = digits.parse().ok()?;
    scanner.reset(scanner.position() + digits.len());
    Some(value)
}

/// Whether the 1-based position `pos` is selected by the formula `a*n + b`.
///
/// Positions below 1 never match. With `a == 0` only `pos == b` matches,
/// otherwise `(pos - b) / a` has to be a non-negative integer.
#[must_use]
pub fn match_css_nth(pos: i64, a: i64, b: i64) -> bool {
    if pos <= 0 {
        return false;
    }
    if a == 0 {
        return pos == b;
    }
    let Some(delta) = pos.checked_sub(b) else {
        return false;
    };
    delta.checked_rem(a) == Some(0) && delta.checked_div(a).is_some_and(|n| n >= 0)
}
