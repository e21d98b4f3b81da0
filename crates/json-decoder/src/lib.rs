//! Streaming decoder for JSON. Each call to [`Decoder::decode`] reads exactly one
//! JSON value from an [`io::Read`](std::io::Read) source and returns it as a
//! [`Value`] tree, leaving the source positioned at the start of the next value.
//!
//! This makes it possible to read a concatenation of JSON values, such as
//! newline-delimited JSON, from a single stream without knowing where each
//! value ends.
//!
//! ```
//! use json_decoder::{Decoder, Value};
//!
//! # fn main() {
//!     let s = r#"{"key1": 1234, "key2": [true]} "value" null"#;
//!     let mut decoder = Decoder::new(s.as_bytes());
//!     let obj = decoder.decode().unwrap().unwrap(); // Value::Object
//!     assert_eq!(obj["key1"], Value::Number(1234.0));
//!     assert_eq!(obj["key2"][0], Value::Bool(true));
//!     decoder.decode().unwrap().unwrap(); // Value::String(String::from("value"))
//!     decoder.decode().unwrap().unwrap(); // Value::Null
//!     assert!(decoder.decode().unwrap().is_none());
//! # }
//! ```
//!
//! Escape sequences in strings are resolved by default. Use
//! [`DecoderOptions`] with [`EscapeMode::Preserve`] to keep them as written.

mod cursor;
mod decoder;
mod error;
mod options;
mod scanner;
mod value;

pub use decoder::*;
pub use error::*;
pub use options::*;
pub use value::*;
