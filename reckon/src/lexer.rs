//! Tokenizer
//!
//! Best-effort lexing: malformed literals and stray characters produce
//! messages and are skipped or downgraded, never aborting the scan. The
//! active numeric base governs which digits form a number; `0x`, `0b`,
//! and `0o` prefixes are always recognized regardless of the base
//! setting.

use reckon_core::{CalcError, Number};

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Numeric literal, parsed exactly
    Number(Number),
    /// Identifier: symbol, unit, function, or keyword
    Ident(String),
    /// Quoted string (plot titles)
    Str(String),
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
    Semicolon,
    /// `:=`
    Assign,
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
    And,
    Or,
    Not,
}

/// Characters that may start or continue an identifier. Includes the
/// degree sign and a few Greek letters so "°C" and "π" lex as idents.
fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '°' || c == 'π' || c == 'φ'
}

fn is_ident_continue(c: char) -> bool {
    is_ident_start(c) || c.is_ascii_digit()
}

/// Tokenize `input` with numeric literals read in `base`.
/// Always returns a token stream; problems are reported alongside.
pub fn tokenize(input: &str, base: u32) -> (Vec<Token>, Vec<CalcError>) {
    let mut tokens = Vec::new();
    let mut errors = Vec::new();
    let chars: Vec<char> = input.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if c.is_whitespace() {
            i += 1;
            continue;
        }

        match c {
            '+' => {
                tokens.push(Token::Plus);
                i += 1;
            }
            '-' | '−' => {
                tokens.push(Token::Minus);
                i += 1;
            }
            '*' | '·' | '×' => {
                tokens.push(Token::Star);
                i += 1;
            }
            '/' | '÷' => {
                tokens.push(Token::Slash);
                i += 1;
            }
            '^' => {
                tokens.push(Token::Caret);
                i += 1;
            }
            '(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            '[' => {
                tokens.push(Token::LBracket);
                i += 1;
            }
            ']' => {
                tokens.push(Token::RBracket);
                i += 1;
            }
            ',' => {
                tokens.push(Token::Comma);
                i += 1;
            }
            ';' => {
                tokens.push(Token::Semicolon);
                i += 1;
            }
            ':' if chars.get(i + 1) == Some(&'=') => {
                tokens.push(Token::Assign);
                i += 2;
            }
            '=' => {
                // "==" and "=" both mean equality
                tokens.push(Token::Eq);
                i += if chars.get(i + 1) == Some(&'=') { 2 } else { 1 };
            }
            '!' if chars.get(i + 1) == Some(&'=') => {
                tokens.push(Token::Ne);
                i += 2;
            }
            '!' => {
                tokens.push(Token::Not);
                i += 1;
            }
            '≠' => {
                tokens.push(Token::Ne);
                i += 1;
            }
            '<' if chars.get(i + 1) == Some(&'=') => {
                tokens.push(Token::Le);
                i += 2;
            }
            '<' => {
                tokens.push(Token::Lt);
                i += 1;
            }
            '>' if chars.get(i + 1) == Some(&'=') => {
                tokens.push(Token::Ge);
                i += 2;
            }
            '>' => {
                tokens.push(Token::Gt);
                i += 1;
            }
            '&' if chars.get(i + 1) == Some(&'&') => {
                tokens.push(Token::And);
                i += 2;
            }
            '|' if chars.get(i + 1) == Some(&'|') => {
                tokens.push(Token::Or);
                i += 2;
            }
            '"' | '\'' => {
                let quote = c;
                let start = i + 1;
                let mut end = start;
                while end < chars.len() && chars[end] != quote {
                    end += 1;
                }
                if end >= chars.len() {
                    errors.push(CalcError::syntax("unterminated string literal"));
                }
                tokens.push(Token::Str(chars[start..end.min(chars.len())].iter().collect()));
                i = end + 1;
            }
            _ if c.is_ascii_digit() || (c == '.' && next_is_digit(&chars, i + 1, base)) => {
                let (token, consumed) = scan_number(&chars, i, base, &mut errors);
                tokens.push(token);
                i += consumed;
            }
            _ if is_ident_start(c) => {
                let start = i;
                while i < chars.len() && is_ident_continue(chars[i]) {
                    i += 1;
                }
                tokens.push(Token::Ident(chars[start..i].iter().collect()));
            }
            _ => {
                errors.push(CalcError::syntax(format!("unexpected character '{}'", c)));
                i += 1;
            }
        }
    }

    (tokens, errors)
}

fn next_is_digit(chars: &[char], i: usize, base: u32) -> bool {
    chars
        .get(i)
        .map(|c| c.to_digit(base).is_some())
        .unwrap_or(false)
}

/// Scan a numeric literal starting at `start`. Returns the token and the
/// number of characters consumed. A malformed literal becomes an error
/// message plus a zero literal so parsing can continue.
fn scan_number(
    chars: &[char],
    start: usize,
    base: u32,
    errors: &mut Vec<CalcError>,
) -> (Token, usize) {
    let mut i = start;

    // Radix prefixes win over the configured base
    let (radix, digits_start) = if chars[i] == '0' && i + 1 < chars.len() {
        match chars[i + 1] {
            'x' | 'X' => (16, i + 2),
            'b' | 'B' if base <= 11 => (2, i + 2),
            'o' | 'O' => (8, i + 2),
            _ => (base, i),
        }
    } else {
        (base, i)
    };
    i = digits_start;

    let mut seen_dot = false;
    while i < chars.len() {
        let c = chars[i];
        if c.to_digit(radix).is_some() {
            i += 1;
        } else if c == '.' && !seen_dot && radix == 10 {
            seen_dot = true;
            i += 1;
        } else if (c == 'e' || c == 'E')
            && radix == 10
            && i > digits_start
            && next_is_exponent(chars, i + 1)
        {
            i += 2; // consume 'e' and the sign/first digit
            while i < chars.len() && chars[i].is_ascii_digit() {
                i += 1;
            }
            break;
        } else {
            break;
        }
    }

    let text: String = chars[digits_start..i].iter().collect();
    let consumed = i - start;
    if text.is_empty() {
        errors.push(CalcError::syntax("malformed numeric literal"));
        return (Token::Number(Number::zero()), consumed.max(1));
    }
    match Number::parse_radix(&text, radix) {
        Ok(n) => (Token::Number(n), consumed),
        Err(_) => {
            errors.push(CalcError::syntax(format!(
                "malformed numeric literal \"{}\"",
                text
            )));
            (Token::Number(Number::zero()), consumed)
        }
    }
}

/// True when position `i` starts an exponent tail: digits, or a sign
/// followed by digits
fn next_is_exponent(chars: &[char], i: usize) -> bool {
    match chars.get(i) {
        Some(c) if c.is_ascii_digit() => true,
        Some('+') | Some('-') => chars
            .get(i + 1)
            .map(|c| c.is_ascii_digit())
            .unwrap_or(false),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toks(input: &str) -> Vec<Token> {
        let (tokens, errors) = tokenize(input, 10);
        assert!(errors.is_empty(), "unexpected errors: {:?}", errors);
        tokens
    }

    #[test]
    fn test_simple_expression() {
        let tokens = toks("1 + 2*3");
        assert_eq!(tokens.len(), 5);
        assert!(matches!(tokens[1], Token::Plus));
        assert!(matches!(tokens[3], Token::Star));
    }

    #[test]
    fn test_decimal_and_scientific() {
        let tokens = toks("3.14 1.5e10 2e-3");
        assert_eq!(tokens.len(), 3);
        for t in &tokens {
            assert!(matches!(t, Token::Number(_)));
        }
    }

    #[test]
    fn test_exponent_not_swallowed_as_ident() {
        // "2e" is the number 2 followed by the symbol e
        let tokens = toks("2e");
        assert_eq!(tokens.len(), 2);
        assert!(matches!(&tokens[1], Token::Ident(s) if s == "e"));
    }

    #[test]
    fn test_hex_prefix() {
        let tokens = toks("0xff");
        match &tokens[0] {
            Token::Number(n) => assert_eq!(n.to_i64(), Some(255)),
            t => panic!("expected number, got {:?}", t),
        }
    }

    #[test]
    fn test_base_16_literals() {
        let (tokens, errors) = tokenize("ff", 16);
        assert!(errors.is_empty());
        // In base 16 "ff" is still an identifier start; digits only
        // count when they begin with an ascii digit
        assert!(matches!(&tokens[0], Token::Ident(_)));

        let (tokens, _) = tokenize("1f", 16);
        match &tokens[0] {
            Token::Number(n) => assert_eq!(n.to_i64(), Some(31)),
            t => panic!("expected number, got {:?}", t),
        }
    }

    #[test]
    fn test_unicode_operators_and_idents() {
        let tokens = toks("π × 2");
        assert!(matches!(&tokens[0], Token::Ident(s) if s == "π"));
        assert!(matches!(tokens[1], Token::Star));
    }

    #[test]
    fn test_comparison_operators() {
        let tokens = toks("1 <= 2 != 3");
        assert!(matches!(tokens[1], Token::Le));
        assert!(matches!(tokens[3], Token::Ne));
    }

    #[test]
    fn test_assignment() {
        let tokens = toks("x := 5");
        assert!(matches!(tokens[1], Token::Assign));
    }

    #[test]
    fn test_unexpected_character_reported() {
        let (tokens, errors) = tokenize("1 # 2", 10);
        assert_eq!(errors.len(), 1);
        assert_eq!(tokens.len(), 2);
    }

    #[test]
    fn test_unterminated_string() {
        let (_, errors) = tokenize("plot x title \"oops", 10);
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_degree_unit_ident() {
        let tokens = toks("25 °C");
        assert!(matches!(&tokens[1], Token::Ident(s) if s == "°C"));
    }
}
