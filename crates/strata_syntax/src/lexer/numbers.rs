//! Numeric literal scanning.
//!
//! Forms:
//! - decimal digits with `_` separators: `1_000`
//! - radix form `base#digits#` with `base` in `2..=36`: `16#7FFF_FFFF#`
//! - fraction and exponent: `1.5`, `1e10`, `2.5e-3`
//! - any of the above directly followed by an identifier suffix: `10u8`, `16#FF#U`
//!
//! Values are never decoded here; only the shape is validated.

use strata_core::lang::errors::ErrorCodeId;
use strata_core::lang::tokens::TokenKind;

use super::{Scanner, TokenKey, is_ident_continue, is_ident_start};

impl Scanner<'_> {
    /// Scan a number whose first digit has been consumed.
    pub(super) fn scan_number(&mut self) -> TokenKey {
        self.scan_decimal_digits();
        let mut kind = TokenKind::Integer;

        if self.peek() == Some('#') {
            let base: String = self.text[..self.current_pos].chars().filter(|c| *c != '_').collect();
            self.advance();
            self.scan_radix_digits(&base);
        } else {
            if self.peek() == Some('.') && self.peek_next().is_some_and(|c| c.is_ascii_digit()) {
                self.advance();
                self.scan_decimal_digits();
                kind = TokenKind::Float;
            }
            if matches!(self.peek(), Some('e' | 'E')) && self.scan_exponent() {
                kind = TokenKind::Float;
            }
        }

        let key = TokenKey::simple(kind);
        if !self.peek().is_some_and(is_ident_start) {
            return key;
        }
        let suffix_start = self.current_pos;
        self.advance_while(is_ident_continue);
        key.with_suffix(&self.text[suffix_start..self.current_pos])
    }

    fn scan_decimal_digits(&mut self) {
        self.advance_while(|c| c.is_ascii_digit() || c == '_');
    }

    /// Scan `e[+-]digits` if the `e` starts an exponent rather than a suffix.
    fn scan_exponent(&mut self) -> bool {
        match self.peek_next() {
            Some(d) if d.is_ascii_digit() => {
                self.advance();
                self.scan_decimal_digits();
                true
            }
            Some('+' | '-') => {
                self.advance();
                self.advance();
                if self.peek().is_some_and(|c| c.is_ascii_digit()) {
                    self.scan_decimal_digits();
                } else {
                    self.error(ErrorCodeId::MissingExponentDigits, vec![]);
                }
                true
            }
            _ => false,
        }
    }

    /// Scan the digits and closing `#` of a radix number; the opening `#` is consumed.
    fn scan_radix_digits(&mut self, base_text: &str) {
        let base = base_text.parse::<u32>().ok().filter(|b| (2..=36).contains(b));
        if base.is_none() {
            self.error(ErrorCodeId::InvalidRadix, vec![base_text.to_string()]);
        }

        let mut digits = 0usize;
        let mut reported = false;
        while let Some(c) = self.peek() {
            if c == '_' {
                self.advance();
                continue;
            }
            if !c.is_ascii_alphanumeric() {
                break;
            }
            if let Some(base) = base {
                if !reported && c.to_digit(base).is_none() {
                    self.error(ErrorCodeId::DigitOutOfRadix, vec![c.to_string(), base.to_string()]);
                    reported = true;
                }
            }
            self.advance();
            digits += 1;
        }

        if digits == 0 {
            self.error(ErrorCodeId::MissingRadixDigits, vec![]);
        }
        if !self.match_char('#') {
            self.error(ErrorCodeId::UnterminatedRadixNumber, vec![]);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::ParserConfig;
    use crate::lexer::{Token, lex};
    use strata_core::lang::errors::ErrorCodeId;
    use strata_core::lang::tokens::TokenKind;

    fn first(source: &str) -> Token {
        lex("t", source, &ParserConfig::default()).unwrap().remove(0)
    }

    #[test]
    fn test_decimal_forms() {
        assert_eq!(first("1_000").kind, TokenKind::Integer);
        assert_eq!(first("1.5").kind, TokenKind::Float);
        assert_eq!(first("1e1").kind, TokenKind::Float);
        assert_eq!(first("2.5E-3").text(), "2.5E-3");
        // `.` without a digit after it is not a fraction.
        assert_eq!(first("1.x").text(), "1");
    }

    #[test]
    fn test_suffixes() {
        let tok = first("10u8");
        assert_eq!(tok.kind, TokenKind::IntegerWithSuffix);
        assert_eq!(tok.key.suffix.as_deref(), Some("u8"));

        let tok = first("1.5f");
        assert_eq!(tok.kind, TokenKind::FloatWithSuffix);

        // `e` without exponent digits is a suffix.
        let tok = first("3em");
        assert_eq!(tok.kind, TokenKind::IntegerWithSuffix);
        assert_eq!(tok.key.suffix.as_deref(), Some("em"));
    }

    #[test]
    fn test_radix_with_suffix() {
        let tok = first("16#7FFF_FFFF#U");
        assert_eq!(tok.kind, TokenKind::IntegerWithSuffix);
        assert_eq!(tok.text(), "16#7FFF_FFFF#U");
        assert_eq!(tok.key.suffix.as_deref(), Some("U"));
        assert!(tok.error.is_none());
    }

    #[test]
    fn test_radix_errors() {
        let cases = [
            ("37#1#", ErrorCodeId::InvalidRadix),
            ("2#102#", ErrorCodeId::DigitOutOfRadix),
            ("8#17", ErrorCodeId::UnterminatedRadixNumber),
            ("8##", ErrorCodeId::MissingRadixDigits),
            ("1e+", ErrorCodeId::MissingExponentDigits),
        ];
        for (source, code) in cases {
            let tok = first(source);
            let err = tok.error.unwrap_or_else(|| panic!("expected an error for {source:?}"));
            assert!(err.contains(code), "expected {code:?} for {source:?}, got {err:?}");
        }
    }

    #[test]
    fn test_digit_out_of_radix_message() {
        let err = first("2#12#").error.unwrap();
        assert_eq!(err.message(), "digit '2' is out of range for radix 2");
    }
}
