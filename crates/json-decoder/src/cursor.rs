use std::io::{self, Read};

use smallvec::SmallVec;

use crate::error::{DecodeError, DecodeResult, ErrorCode, Location};

const READ_BUF_LEN: usize = 4096;

// Not char::is_ascii_whitespace: U+000C FORM FEED is whitespace to Rust but not to JSON.
pub(crate) fn is_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\n' | '\r' | '\t')
}

/// Characters which end a bare number or identifier without being part of it.
/// End of input is a delimiter too.
pub(crate) fn is_delimiter(c: char) -> bool {
    is_whitespace(c) || matches!(c, ',' | ']' | '}')
}

/// A character-at-a-time reader over an [`io::Read`] source, with room for
/// exactly one pushed-back character.
pub(crate) struct Cursor<R> {
    reader: R,
    buf: Vec<u8>,
    valid_slice_start: usize,
    valid_slice_end: usize,
    held_back: Option<char>,
    location: Location,
    location_before_last: Location,
}

impl<R: Read> Cursor<R> {
    pub fn new(reader: R) -> Self {
        Cursor {
            reader,
            buf: vec![0; READ_BUF_LEN],
            valid_slice_start: 0,
            valid_slice_end: 0,
            held_back: None,
            location: Location::default(),
            location_before_last: Location::default(),
        }
    }

    /// The location of the character that the next call to `next()` will return.
    pub fn location(&self) -> Location {
        self.location
    }

    /// Returns the next character, or `None` once the source is exhausted.
    pub fn next(&mut self) -> DecodeResult<Option<char>> {
        let c = match self.held_back.take() {
            Some(c) => c,
            None => match self.decode_char()? {
                Some(c) => c,
                None => return Ok(None),
            },
        };
        self.location_before_last = self.location;
        self.location.advance_by_char(c);
        Ok(Some(c))
    }

    /// Un-reads `c`, which must be the character most recently returned by `next()`.
    pub fn pushback(&mut self, c: char) {
        debug_assert!(
            self.held_back.is_none(),
            "pushed back {c:?} while {:?} was still held back",
            self.held_back
        );
        self.held_back = Some(c);
        self.location = self.location_before_last;
    }

    /// Consumes a run of JSON whitespace. The cursor is left on the first
    /// significant character, or at the end of input.
    pub fn skip_whitespace(&mut self) -> DecodeResult<()> {
        while let Some(c) = self.next()? {
            if !is_whitespace(c) {
                self.pushback(c);
                break;
            }
        }
        Ok(())
    }

    /// Skips whitespace and then consumes the next character.
    pub fn next_significant(&mut self) -> DecodeResult<Option<char>> {
        self.skip_whitespace()?;
        self.next()
    }

    /// Gives back the source. Bytes which were already buffered are lost.
    pub fn into_inner(self) -> R {
        self.reader
    }

    pub fn err(&self, code: ErrorCode) -> DecodeError {
        DecodeError::new(code, self.location)
    }

    /// An error located at the character which was just read.
    pub fn err_at_last(&self, code: ErrorCode) -> DecodeError {
        DecodeError::new(code, self.location_before_last)
    }

    fn next_byte(&mut self) -> DecodeResult<Option<u8>> {
        if self.valid_slice_start == self.valid_slice_end {
            let read_len = loop {
                match self.reader.read(&mut self.buf) {
                    Ok(len) => break len,
                    Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                    Err(e) => return Err(self.err(ErrorCode::Io(e))),
                }
            };
            if read_len == 0 {
                return Ok(None);
            }
            self.valid_slice_start = 0;
            self.valid_slice_end = read_len;
        }
        let b = self.buf[self.valid_slice_start];
        self.valid_slice_start += 1;
        Ok(Some(b))
    }

    fn decode_char(&mut self) -> DecodeResult<Option<char>> {
        let first = match self.next_byte()? {
            Some(b) => b,
            None => return Ok(None),
        };
        if first.is_ascii() {
            return Ok(Some(char::from(first)));
        }

        let width = utf8_sequence_len(first);
        if width == 0 {
            return Err(self.err(ErrorCode::InvalidUtf8));
        }
        let mut bytes = SmallVec::<[u8; 4]>::new();
        bytes.push(first);
        while bytes.len() < width {
            match self.next_byte()? {
                Some(b) => bytes.push(b),
                None => return Err(self.err(ErrorCode::InvalidUtf8)),
            }
        }
        match std::str::from_utf8(&bytes) {
            Ok(s) => Ok(s.chars().next()),
            Err(_) => Err(self.err(ErrorCode::InvalidUtf8)),
        }
    }
}

fn utf8_sequence_len(first: u8) -> usize {
    match first {
        0xC2..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF4 => 4,
        _ => 0,
    }
}

#[cfg(test)]
mod test {
    use super::*;

    /// Hands out one byte per `read` call, to cross buffer refills everywhere.
    struct Trickle<'a>(&'a [u8]);

    impl Read for Trickle<'_> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match self.0.split_first() {
                Some((b, rest)) if !buf.is_empty() => {
                    buf[0] = *b;
                    self.0 = rest;
                    Ok(1)
                }
                _ => Ok(0),
            }
        }
    }

    struct Failing {
        interrupted: bool,
    }

    impl Read for Failing {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            if !self.interrupted {
                self.interrupted = true;
                return Err(io::ErrorKind::Interrupted.into());
            }
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "gone"))
        }
    }

    fn chars<R: Read>(cursor: &mut Cursor<R>) -> String {
        let mut s = String::new();
        while let Some(c) = cursor.next().unwrap() {
            s.push(c);
        }
        s
    }

    #[test]
    fn test_multibyte() {
        let text = "aé€😀z";
        let mut cursor = Cursor::new(Trickle(text.as_bytes()));
        assert_eq!(chars(&mut cursor), text);
        assert_eq!(cursor.location().byte_offset, text.len() as u64);
        assert_eq!(cursor.location().col, 5);
        assert_eq!(cursor.next().unwrap(), None);
    }

    #[test]
    fn test_pushback() {
        let mut cursor = Cursor::new("ab\nc".as_bytes());
        assert_eq!(cursor.next().unwrap(), Some('a'));
        assert_eq!(cursor.next().unwrap(), Some('b'));
        cursor.pushback('b');
        assert_eq!(cursor.location().col, 1);
        assert_eq!(cursor.next().unwrap(), Some('b'));
        assert_eq!(cursor.next().unwrap(), Some('\n'));
        cursor.pushback('\n');
        assert_eq!(cursor.location().line, 0);
        assert_eq!(cursor.next().unwrap(), Some('\n'));
        assert_eq!(cursor.location().line, 1);
        assert_eq!(cursor.location().col, 0);
        assert_eq!(chars(&mut cursor), "c");
    }

    #[test]
    fn test_skip_whitespace() {
        let mut cursor = Cursor::new(" \t\r\n x \u{c}".as_bytes());
        cursor.skip_whitespace().unwrap();
        assert_eq!(
            cursor.location(),
            Location {
                byte_offset: 5,
                line: 1,
                col: 1
            }
        );
        assert_eq!(cursor.next().unwrap(), Some('x'));
        // Form feed is not JSON whitespace.
        assert_eq!(cursor.next_significant().unwrap(), Some('\u{c}'));
        cursor.skip_whitespace().unwrap();
        assert_eq!(cursor.next().unwrap(), None);
    }

    #[test]
    fn test_invalid_utf8() {
        let mut cursor = Cursor::new(&b"a\xffb"[..]);
        assert_eq!(cursor.next().unwrap(), Some('a'));
        let err = cursor.next().unwrap_err();
        assert!(matches!(err.code(), ErrorCode::InvalidUtf8));
        assert_eq!(err.location().byte_offset, 1);

        // Truncated multi-byte sequence.
        let mut cursor = Cursor::new(&b"\xe2\x82"[..]);
        assert!(matches!(
            cursor.next().unwrap_err().code(),
            ErrorCode::InvalidUtf8
        ));
    }

    #[test]
    fn test_io_error() {
        let mut cursor = Cursor::new(Failing { interrupted: false });
        let err = cursor.next().unwrap_err();
        match err.into_code() {
            ErrorCode::Io(e) => assert_eq!(e.kind(), io::ErrorKind::BrokenPipe),
            code => panic!("unexpected error code {code:?}"),
        }
    }

    #[test]
    fn test_delimiters() {
        for c in [' ', '\t', '\n', '\r', ',', ']', '}'] {
            assert!(is_delimiter(c), "{c:?}");
        }
        for c in ['a', ':', '[', '{', '"', '0'] {
            assert!(!is_delimiter(c), "{c:?}");
        }
    }
}
