//! Scanners for the scalar tokens: numbers, string literals and the bare
//! identifiers `true`, `false` and `null`.
//!
//! Every scanner starts by clearing the decoder's scratch buffer and builds the
//! token text in it.

use std::io::Read;

use crate::cursor::is_delimiter;
use crate::decoder::Decoder;
use crate::error::{DecodeError, DecodeResult, ErrorCode};
use crate::options::EscapeMode;
use crate::value::Value;

impl<R: Read> Decoder<R> {
    /// Scans `-? (0 | [1-9][0-9]*) (.[0-9]+)? ([eE][+-]?[0-9]+)?`.
    ///
    /// The first character of the number must still be unread. The character
    /// that ends the number is pushed back for the caller.
    pub(crate) fn scan_number(&mut self) -> DecodeResult<Value> {
        self.scratch.clear();

        let mut c = self.cursor.next()?;
        if c == Some('-') {
            self.scratch.push('-');
            c = self.cursor.next()?;
        }

        match c {
            Some('0') => {
                self.scratch.push('0');
                match self.cursor.next()? {
                    Some('0'..='9') => {
                        return Err(self.cursor.err_at_last(ErrorCode::LeadingZero));
                    }
                    Some('.') => self.scan_fraction()?,
                    Some(e @ ('e' | 'E')) => self.scan_exponent(e)?,
                    Some(c) if is_delimiter(c) => self.cursor.pushback(c),
                    Some(found) => {
                        return Err(self.cursor.err_at_last(ErrorCode::UnexpectedCharacter {
                            found,
                            context: "number",
                        }));
                    }
                    None => {}
                }
            }
            Some(d @ '1'..='9') => {
                self.scratch.push(d);
                loop {
                    match self.cursor.next()? {
                        Some(d @ '0'..='9') => self.scratch.push(d),
                        Some('.') => {
                            self.scan_fraction()?;
                            break;
                        }
                        Some(e @ ('e' | 'E')) => {
                            self.scan_exponent(e)?;
                            break;
                        }
                        Some(c) => {
                            self.cursor.pushback(c);
                            break;
                        }
                        None => break,
                    }
                }
            }
            Some(found) => {
                return Err(self.cursor.err_at_last(ErrorCode::ExpectedDigit {
                    found,
                    context: "number",
                }));
            }
            None => {
                return Err(self
                    .cursor
                    .err(ErrorCode::UnexpectedEof { context: "number" }));
            }
        }

        match self.scratch.parse::<f64>() {
            Ok(n) => Ok(Value::Number(n)),
            Err(_) => Err(self
                .cursor
                .err(ErrorCode::InvalidNumber(self.scratch.clone()))),
        }
    }

    /// The `.` has been consumed.
    fn scan_fraction(&mut self) -> DecodeResult<()> {
        self.scratch.push('.');
        self.scan_digits("fraction")?;
        match self.cursor.next()? {
            Some(e @ ('e' | 'E')) => self.scan_exponent(e),
            Some(c) => {
                self.cursor.pushback(c);
                Ok(())
            }
            None => Ok(()),
        }
    }

    /// The `e` or `E` has been consumed.
    fn scan_exponent(&mut self, e: char) -> DecodeResult<()> {
        self.scratch.push(e);
        match self.cursor.next()? {
            Some(sign @ ('+' | '-')) => self.scratch.push(sign),
            Some(c) => self.cursor.pushback(c),
            None => {}
        }
        self.scan_digits("exponent")
    }

    /// Appends a non-empty run of digits and pushes back whatever follows it.
    fn scan_digits(&mut self, context: &'static str) -> DecodeResult<()> {
        match self.next_in(context)? {
            d @ '0'..='9' => self.scratch.push(d),
            found => {
                return Err(self
                    .cursor
                    .err_at_last(ErrorCode::ExpectedDigit { found, context }));
            }
        }
        while let Some(c) = self.cursor.next()? {
            if !c.is_ascii_digit() {
                self.cursor.pushback(c);
                break;
            }
            self.scratch.push(c);
        }
        Ok(())
    }

    /// Scans a string literal whose opening quote was already consumed, up to
    /// and including the closing quote.
    pub(crate) fn scan_string(&mut self) -> DecodeResult<String> {
        self.scratch.clear();
        loop {
            match self.next_in("string")? {
                '"' => break,
                '\\' => self.scan_escape()?,
                c => self.scratch.push(c),
            }
        }
        Ok(self.scratch.clone())
    }

    /// The backslash has been consumed.
    fn scan_escape(&mut self) -> DecodeResult<()> {
        let c = self.next_in("string")?;
        let resolved = match c {
            '"' => '"',
            '\\' => '\\',
            '/' => '/',
            'b' => '\u{8}',
            'f' => '\u{c}',
            'n' => '\n',
            'r' => '\r',
            't' => '\t',
            'u' => return self.scan_unicode_escape(),
            c => return Err(self.cursor.err_at_last(ErrorCode::UnknownEscape(c))),
        };
        match self.options.escapes {
            EscapeMode::Resolve => self.scratch.push(resolved),
            EscapeMode::Preserve => {
                self.scratch.push('\\');
                self.scratch.push(c);
            }
        }
        Ok(())
    }

    /// The `\u` has been consumed.
    fn scan_unicode_escape(&mut self) -> DecodeResult<()> {
        if self.options.escapes == EscapeMode::Preserve {
            self.scratch.push_str("\\u");
            self.scan_hex4(true)?;
            return Ok(());
        }

        let location = self.cursor.location();
        let u = self.scan_hex4(false)?;
        let c = match u {
            0xD800..=0xDBFF => {
                // The second half of the surrogate pair must follow directly.
                if self.next_in("unicode escape")? != '\\' || self.next_in("unicode escape")? != 'u'
                {
                    return Err(DecodeError::new(
                        ErrorCode::InvalidUnicodeEscape(u32::from(u)),
                        location,
                    ));
                }
                let u2 = self.scan_hex4(false)?;
                if !matches!(u2, 0xDC00..=0xDFFF) {
                    return Err(DecodeError::new(
                        ErrorCode::InvalidUnicodeEscape(u32::from(u)),
                        location,
                    ));
                }
                let c = ((u32::from(u & 0x3ff) << 10) | u32::from(u2 & 0x3ff)) + 0x1_0000;
                char::from_u32(c)
            }
            0xDC00..=0xDFFF => None,
            _ => char::from_u32(u32::from(u)),
        };
        match c {
            Some(c) => {
                self.scratch.push(c);
                Ok(())
            }
            None => Err(DecodeError::new(
                ErrorCode::InvalidUnicodeEscape(u32::from(u)),
                location,
            )),
        }
    }

    /// Reads exactly four hex digits. With `keep`, they are also appended to
    /// the scratch buffer as written.
    fn scan_hex4(&mut self, keep: bool) -> DecodeResult<u16> {
        let mut u = 0u16;
        for _ in 0..4 {
            let c = self.next_in("unicode escape")?;
            let Some(h) = c.to_digit(16) else {
                return Err(self.cursor.err_at_last(ErrorCode::NotHex(c)));
            };
            if keep {
                self.scratch.push(c);
            }
            u = u * 0x10 + h as u16;
        }
        Ok(u)
    }

    /// Scans a bare word up to the next delimiter and matches it against the
    /// keywords. The first character must still be unread.
    pub(crate) fn scan_identifier(&mut self) -> DecodeResult<Value> {
        self.scratch.clear();
        let start = self.cursor.location();
        while let Some(c) = self.cursor.next()? {
            if is_delimiter(c) {
                self.cursor.pushback(c);
                break;
            }
            self.scratch.push(c);
        }
        match self.scratch.as_str() {
            "true" => Ok(Value::Bool(true)),
            "false" => Ok(Value::Bool(false)),
            "null" => Ok(Value::Null),
            ident => Err(DecodeError::new(
                ErrorCode::UnknownIdentifier(ident.to_owned()),
                start,
            )),
        }
    }
}
