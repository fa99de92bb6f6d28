//! String literal scanning.
//!
//! Forms: `"..."` and `'...'` on one line, `"""..."""` and `'''...'''` across lines, each optionally preceded
//! directly by an identifier prefix (`r"..."`). Escapes are validated but not decoded.

use strata_core::lang::errors::ErrorCodeId;

use super::{Scanner, TokenKey};

impl Scanner<'_> {
    /// Scan a string whose opening quote (and prefix, if any) has been consumed.
    pub(super) fn scan_string(&mut self, quote: char, prefix: Option<&str>) -> TokenKey {
        let triple = self.peek() == Some(quote) && self.peek_next() == Some(quote);
        if triple {
            self.advance();
            self.advance();
        }
        self.scan_string_body(quote, triple);

        let key = TokenKey::string(quote, triple);
        match prefix {
            Some(prefix) => key.with_prefix(prefix),
            None => key,
        }
    }

    fn scan_string_body(&mut self, quote: char, triple: bool) {
        loop {
            match self.peek() {
                None => {
                    self.error(ErrorCodeId::UnterminatedString, vec![]);
                    return;
                }
                Some('\n' | '\r') if !triple => {
                    self.error(ErrorCodeId::UnterminatedString, vec![]);
                    return;
                }
                Some('\\') => {
                    self.advance();
                    self.scan_escape();
                }
                Some(c) if c == quote => {
                    if !triple {
                        self.advance();
                        return;
                    }
                    if self.peek_next() == Some(quote) && self.peek_at(2) == Some(quote) {
                        self.advance();
                        self.advance();
                        self.advance();
                        return;
                    }
                    self.advance();
                }
                Some(_) => {
                    self.advance();
                }
            }
        }
    }

    /// Validate one escape sequence; the backslash has been consumed.
    fn scan_escape(&mut self) {
        match self.peek() {
            Some('n' | 'r' | 't' | '0' | '\\' | '\'' | '"') => {
                self.advance();
            }
            Some('x') => {
                self.advance();
                for _ in 0..2 {
                    if !self.peek().is_some_and(|c| c.is_ascii_hexdigit()) {
                        self.error(ErrorCodeId::InvalidEscape, vec!["x".to_string()]);
                        return;
                    }
                    self.advance();
                }
            }
            Some('u') => {
                self.advance();
                if !self.match_char('{') {
                    self.error(ErrorCodeId::InvalidEscape, vec!["u".to_string()]);
                    return;
                }
                let mut digits = 0;
                while digits < 6 && self.peek().is_some_and(|c| c.is_ascii_hexdigit()) {
                    self.advance();
                    digits += 1;
                }
                if digits == 0 || !self.match_char('}') {
                    self.error(ErrorCodeId::InvalidEscape, vec!["u".to_string()]);
                }
            }
            // Line breaks are left to the body loop.
            Some(c @ ('\n' | '\r')) => {
                self.error(ErrorCodeId::InvalidEscape, vec![c.escape_debug().to_string()]);
            }
            Some(c) => {
                self.advance();
                self.error(ErrorCodeId::InvalidEscape, vec![c.to_string()]);
            }
            None => {}
        }
    }
}
