use std::io::Read;

use tracing::{debug, trace};

use crate::cursor::{is_whitespace, Cursor};
use crate::error::{DecodeError, DecodeResult, ErrorCode, Location};
use crate::options::DecoderOptions;
use crate::value::{Map, Value};

/// A pull-based decoder which reads one complete JSON value per call from an
/// [`io::Read`](std::io::Read) source.
///
/// The source may hold any number of values separated by optional whitespace,
/// e.g. `1 [2] {"a": 3}` or newline-delimited JSON. Each [`decode`](Self::decode)
/// call consumes exactly one of them.
///
/// ```
/// use json_decoder::{Decoder, Value};
///
/// let mut decoder = Decoder::new("true false".as_bytes());
/// assert_eq!(decoder.decode().unwrap(), Some(Value::Bool(true)));
/// assert_eq!(decoder.decode().unwrap(), Some(Value::Bool(false)));
/// assert_eq!(decoder.decode().unwrap(), None);
/// ```
pub struct Decoder<R> {
    pub(crate) cursor: Cursor<R>,
    /// Text of the token currently being scanned.
    pub(crate) scratch: String,
    pub(crate) options: DecoderOptions,
    depth: usize,
}

impl<R: Read> Decoder<R> {
    /// Create a new [`Decoder`] with default options.
    pub fn new(reader: R) -> Self {
        Self::with_options(reader, DecoderOptions::default())
    }

    pub fn with_options(reader: R, options: DecoderOptions) -> Self {
        Decoder {
            cursor: Cursor::new(reader),
            scratch: String::new(),
            options,
            depth: 0,
        }
    }

    pub fn options(&self) -> DecoderOptions {
        self.options
    }

    /// The location at which the next call to `decode()` will start reading.
    pub fn location(&self) -> Location {
        self.cursor.location()
    }

    /// Current container nesting depth. Always 0 between decode calls.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Gives back the source. Input which was already buffered is lost.
    pub fn into_inner(self) -> R {
        self.cursor.into_inner()
    }

    /// Decodes the next top-level value.
    ///
    /// Returns `Ok(None)` when the source holds nothing but whitespace. An
    /// error aborts the value; the decoder is not resynchronized afterwards, so
    /// further calls on the same source may report follow-up errors.
    pub fn decode(&mut self) -> DecodeResult<Option<Value>> {
        let start = self.cursor.location();
        let result = self.decode_top_level();

        self.scratch.clear();
        self.depth = 0;
        let skipped = self.cursor.skip_whitespace();

        match result {
            Ok(value) => {
                skipped?;
                if let Some(value) = &value {
                    trace!(
                        kind = %value.kind(),
                        offset = start.byte_offset,
                        "decoded value"
                    );
                }
                Ok(value)
            }
            Err(err) => {
                debug!(location = %err.location(), "decode failed: {}", err.code());
                Err(err)
            }
        }
    }

    /// Decodes exactly one value and requires the source to end after it,
    /// apart from whitespace.
    pub fn decode_single(&mut self) -> DecodeResult<Value> {
        match self.decode()? {
            Some(value) => {
                self.expect_end()?;
                Ok(value)
            }
            None => Err(self
                .cursor
                .err(ErrorCode::UnexpectedEof { context: "value" })),
        }
    }

    /// Returns an error if there is more than just white space in the remaining input.
    pub fn expect_end(&mut self) -> DecodeResult<()> {
        match self.cursor.next_significant()? {
            None => Ok(()),
            Some(found) => {
                self.cursor.pushback(found);
                Err(self.cursor.err(ErrorCode::TrailingCharacters { found }))
            }
        }
    }

    /// An iterator over the remaining values of the source.
    pub fn values(&mut self) -> Values<'_, R> {
        Values {
            decoder: self,
            failed: false,
        }
    }

    fn decode_top_level(&mut self) -> DecodeResult<Option<Value>> {
        match self.cursor.next_significant()? {
            None => Ok(None),
            Some(c) => {
                self.cursor.pushback(c);
                self.read_value().map(Some)
            }
        }
    }

    /// Reads the next character, treating end of input as an error.
    pub(crate) fn next_in(&mut self, context: &'static str) -> DecodeResult<char> {
        match self.cursor.next()? {
            Some(c) => Ok(c),
            None => Err(self.cursor.err(ErrorCode::UnexpectedEof { context })),
        }
    }

    fn next_significant_in(&mut self, context: &'static str) -> DecodeResult<char> {
        self.cursor.skip_whitespace()?;
        self.next_in(context)
    }

    /// Dispatches on the next character to the matching scanner or container parser.
    pub(crate) fn read_value(&mut self) -> DecodeResult<Value> {
        loop {
            let c = self.next_in("value")?;
            match c {
                '"' => return self.scan_string().map(Value::String),
                '{' => return self.parse_object(),
                '[' => return self.parse_array(),
                '0'..='9' | '-' => {
                    self.cursor.pushback(c);
                    return self.scan_number();
                }
                't' | 'f' | 'n' => {
                    self.cursor.pushback(c);
                    return self.scan_identifier();
                }
                c if is_whitespace(c) => self.cursor.skip_whitespace()?,
                found => {
                    return Err(self.cursor.err_at_last(ErrorCode::UnexpectedCharacter {
                        found,
                        context: "value",
                    }))
                }
            }
        }
    }

    fn enter(&mut self, container: &'static str) {
        self.depth += 1;
        trace!(depth = self.depth, "enter {container}");
    }

    fn leave(&mut self, container: &'static str) {
        trace!(depth = self.depth, "leave {container}");
        self.depth -= 1;
    }

    /// The `{` has been consumed.
    fn parse_object(&mut self) -> DecodeResult<Value> {
        self.enter("object");
        let result = self.parse_object_members();
        self.leave("object");
        result.map(Value::Object)
    }

    fn parse_object_members(&mut self) -> DecodeResult<Map> {
        let mut m = Map::default();
        match self.next_significant_in("object")? {
            '}' => return Ok(m),
            c => self.cursor.pushback(c),
        }

        loop {
            let key = self.parse_key()?;
            let value = self.read_value()?;
            m.insert(key, value);

            match self.next_significant_in("object")? {
                '}' => return Ok(m),
                ',' => match self.next_significant_in("object")? {
                    '}' => {
                        return Err(self
                            .cursor
                            .err_at_last(ErrorCode::TrailingComma { closing: '}' }))
                    }
                    c => self.cursor.pushback(c),
                },
                found => {
                    return Err(self.cursor.err_at_last(ErrorCode::UnexpectedCharacter {
                        found,
                        context: "object",
                    }))
                }
            }
        }
    }

    /// Reads `"key"` and the `:` after it.
    fn parse_key(&mut self) -> DecodeResult<String> {
        match self.next_significant_in("object key")? {
            '"' => {}
            found => return Err(self.cursor.err_at_last(ErrorCode::InvalidKey { found })),
        }
        let key = self.scan_string()?;
        match self.next_significant_in("object")? {
            ':' => Ok(key),
            found => Err(self.cursor.err_at_last(ErrorCode::ExpectedColon { found })),
        }
    }

    /// The `[` has been consumed.
    fn parse_array(&mut self) -> DecodeResult<Value> {
        self.enter("array");
        let result = self.parse_array_items();
        self.leave("array");
        result.map(Value::Array)
    }

    fn parse_array_items(&mut self) -> DecodeResult<Vec<Value>> {
        let mut v = Vec::new();
        match self.next_significant_in("array")? {
            ']' => return Ok(v),
            c => self.cursor.pushback(c),
        }

        loop {
            v.push(self.read_value()?);

            match self.next_significant_in("array")? {
                ']' => return Ok(v),
                ',' => match self.next_significant_in("array")? {
                    ']' => {
                        return Err(self
                            .cursor
                            .err_at_last(ErrorCode::TrailingComma { closing: ']' }))
                    }
                    c => self.cursor.pushback(c),
                },
                found => {
                    return Err(self.cursor.err_at_last(ErrorCode::UnexpectedCharacter {
                        found,
                        context: "array",
                    }))
                }
            }
        }
    }
}

/// Iterator returned by [`Decoder::values`]. Ends at the end of the source or
/// after yielding the first error.
pub struct Values<'a, R> {
    decoder: &'a mut Decoder<R>,
    failed: bool,
}

impl<R: Read> Iterator for Values<'_, R> {
    type Item = DecodeResult<Value>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match self.decoder.decode() {
            Ok(value) => value.map(Ok),
            Err(err) => {
                self.failed = true;
                Some(Err(err))
            }
        }
    }
}

#[cfg(feature = "fallible-iterator")]
impl<R: Read> fallible_iterator::FallibleIterator for Decoder<R> {
    type Item = Value;
    type Error = DecodeError;

    fn next(&mut self) -> Result<Option<Value>, DecodeError> {
        self.decode()
    }
}

/// Decodes exactly one value from `reader`, which must not hold anything but
/// whitespace after it.
pub fn from_reader<R: Read>(reader: R) -> DecodeResult<Value> {
    Decoder::new(reader).decode_single()
}

/// Decodes exactly one value from `s`, which must not hold anything but
/// whitespace after it.
pub fn from_str(s: &str) -> Result<Value, DecodeError> {
    Decoder::new(s.as_bytes()).decode_single()
}

#[cfg(test)]
mod test {
    use super::*;

    fn get(s: &str) -> (Vec<Value>, Option<DecodeError>) {
        let mut decoder = Decoder::new(s.as_bytes());
        let mut v = Vec::new();
        loop {
            match decoder.decode() {
                Ok(Some(value)) => v.push(value),
                Ok(None) => return (v, None),
                Err(e) => return (v, Some(e)),
            }
        }
    }

    fn code(s: &str) -> ErrorCode {
        match from_str(s) {
            Ok(v) => panic!("{s}: invalid json parsed properly as {v:?}"),
            Err(e) => e.into_code(),
        }
    }

    #[test]
    fn test_basic() {
        let s = r#"{"propertyKey": 1234, "arr": [], "obj": {}, "arr2": [null, false, true, -0.54e2] }"#;
        let v = from_str(s).unwrap();
        assert_eq!(v["propertyKey"], Value::Number(1234.0));
        assert_eq!(v["arr"], Value::Array(vec![]));
        assert_eq!(v["obj"], Value::Object(Map::default()));
        assert_eq!(
            v["arr2"],
            Value::Array(vec![
                Value::Null,
                Value::Bool(false),
                Value::Bool(true),
                Value::Number(-54.0)
            ])
        );
    }

    #[test]
    fn test_concatenated_values() {
        let (v, e) = get("true false");
        assert!(e.is_none());
        assert_eq!(v, [Value::Bool(true), Value::Bool(false)]);

        let (v, e) = get("1[2]{\"a\":3}\"x\"null\n\n");
        assert!(e.is_none());
        assert_eq!(v.len(), 5);
        assert!(v[2].is_object());
        assert_eq!(v[3].as_str(), Some("x"));
    }

    #[test]
    fn test_empty_input() {
        assert!(matches!(get(""), (v, None) if v.is_empty()));
        assert!(matches!(get(" \t\r\n "), (v, None) if v.is_empty()));
        assert!(matches!(code(""), ErrorCode::UnexpectedEof { .. }));
    }

    #[test]
    fn test_depth_resets() {
        let mut decoder = Decoder::new("[[[1]]] [[".as_bytes());
        assert!(decoder.decode().unwrap().is_some());
        assert_eq!(decoder.depth(), 0);
        assert!(decoder.decode().unwrap_err().is_eof());
        assert_eq!(decoder.depth(), 0);
    }

    #[test]
    fn test_duplicate_keys() {
        let v = from_str(r#"{"a": 1, "b": 2, "a": 3}"#).unwrap();
        assert_eq!(v.as_object().map(Map::len), Some(2));
        assert_eq!(v["a"], Value::Number(3.0));
    }

    #[test]
    fn test_container_errors() {
        assert!(matches!(
            code(r#"["trailing", "comma", ]"#),
            ErrorCode::TrailingComma { closing: ']' }
        ));
        assert!(matches!(
            code(r#"{"name": "foobar",}"#),
            ErrorCode::TrailingComma { closing: '}' }
        ));
        assert!(matches!(
            code(r#"{"name" "foobar"}"#),
            ErrorCode::ExpectedColon { found: '"' }
        ));
        assert!(matches!(
            code(r#"{"name": }"#),
            ErrorCode::UnexpectedCharacter {
                found: '}',
                context: "value"
            }
        ));
        assert!(matches!(
            code(r#"{true: false}"#),
            ErrorCode::InvalidKey { found: 't' }
        ));
        assert!(matches!(
            code(r#"{"unclosed": "object""#),
            ErrorCode::UnexpectedEof { context: "object" }
        ));
        assert!(matches!(
            code(r#"["unclosed", "array"#),
            ErrorCode::UnexpectedEof { context: "string" }
        ));
        assert!(matches!(
            code("[1 2]"),
            ErrorCode::UnexpectedCharacter {
                found: '2',
                context: "array"
            }
        ));
        assert!(matches!(
            code("[,1]"),
            ErrorCode::UnexpectedCharacter {
                found: ',',
                context: "value"
            }
        ));
        assert!(matches!(
            code("[1,,2]"),
            ErrorCode::UnexpectedCharacter {
                found: ',',
                context: "value"
            }
        ));
        assert!(matches!(code("[1,"), ErrorCode::UnexpectedEof { .. }));
        assert!(matches!(
            code("{\"a\":1 \"b\":2}"),
            ErrorCode::UnexpectedCharacter {
                found: '"',
                context: "object"
            }
        ));
        assert!(matches!(
            code("]"),
            ErrorCode::UnexpectedCharacter { found: ']', .. }
        ));
    }

    #[test]
    fn test_error_location() {
        let err = from_str("[1,\n  2,\n  ]").unwrap_err();
        assert_eq!(
            err.location(),
            Location {
                byte_offset: 11,
                line: 2,
                col: 2
            }
        );
    }

    #[test]
    fn test_trailing_characters() {
        assert!(matches!(
            code("{} x"),
            ErrorCode::TrailingCharacters { found: 'x' }
        ));
        let mut decoder = Decoder::new("1 2".as_bytes());
        assert!(decoder.decode_single().is_err());
    }

    #[test]
    fn test_values_iterator() {
        let mut decoder = Decoder::new(r#"1 [2] {"a":3}"#.as_bytes());
        let kinds: Vec<_> = decoder.values().map(|v| v.unwrap().kind()).collect();
        assert_eq!(kinds.len(), 3);

        let mut decoder = Decoder::new("1 ? 2".as_bytes());
        let results: Vec<_> = decoder.values().collect();
        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        assert!(results[1].is_err());
    }

    #[cfg(feature = "fallible-iterator")]
    #[test]
    fn test_fallible_iterator() {
        use fallible_iterator::FallibleIterator;

        let decoder = Decoder::new("[] {} null".as_bytes());
        let kinds: Vec<_> = decoder.map(|v| Ok(v.kind())).collect().unwrap();
        assert_eq!(kinds.len(), 3);
    }
}
