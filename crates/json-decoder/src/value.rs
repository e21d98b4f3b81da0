use std::fmt;
use std::ops::{Index, IndexMut};
use std::str::FromStr;

use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::decoder::Decoder;
use crate::error::DecodeError;

const NULL: () = ();

/// The members of a JSON object. Key order is not preserved.
pub type Map = FxHashMap<String, Value>;

/// A decoded JSON value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Object(Map),
    Array(Vec<Value>),
    Number(f64),
    String(String),
    Bool(bool),
    Null,
}

/// The variant of a [`Value`], without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Object,
    Array,
    Number,
    String,
    Bool,
    Null,
}

impl ValueKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ValueKind::Object => "object",
            ValueKind::Array => "array",
            ValueKind::Number => "number",
            ValueKind::String => "string",
            ValueKind::Bool => "bool",
            ValueKind::Null => "null",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub trait InnerAsRef {
    fn json_value_as(v: &Value) -> Option<&Self>;
}

macro_rules! impl_inner_ref {
    ($to:ty, $pat:pat => $val:expr) => {
        impl InnerAsRef for $to {
            fn json_value_as(v: &Value) -> Option<&$to> {
                use Value::*;
                match v {
                    $pat => Some($val),
                    _ => None,
                }
            }
        }
    };
}

impl_inner_ref!(f64, Number(n) => n);
impl_inner_ref!(bool, Bool(b) => b);
impl_inner_ref!(String, String(s) => s);
impl_inner_ref!((), Null => &NULL);
impl_inner_ref!(Vec<Value>, Array(a) => a);
impl_inner_ref!(Map, Object(m) => m);

pub trait InnerAsRefMut {
    fn json_value_as_mut(v: &mut Value) -> Option<&mut Self>;
}

macro_rules! impl_inner_ref_mut {
    ($to:ty, $pat:pat => $val:expr) => {
        impl InnerAsRefMut for $to {
            fn json_value_as_mut(v: &mut Value) -> Option<&mut $to> {
                use Value::*;
                match v {
                    $pat => Some($val),
                    _ => None,
                }
            }
        }
    };
}

impl_inner_ref_mut!(f64, Number(n) => n);
impl_inner_ref_mut!(bool, Bool(b) => b);
impl_inner_ref_mut!(String, String(s) => s);
impl_inner_ref_mut!(Vec<Value>, Array(a) => a);
impl_inner_ref_mut!(Map, Object(m) => m);

macro_rules! is_xxx {
    ($name:ident, $variant:pat) => {
        pub fn $name(&self) -> bool {
            matches!(self, $variant)
        }
    };
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Object(_) => ValueKind::Object,
            Value::Array(_) => ValueKind::Array,
            Value::Number(_) => ValueKind::Number,
            Value::String(_) => ValueKind::String,
            Value::Bool(_) => ValueKind::Bool,
            Value::Null => ValueKind::Null,
        }
    }

    /// Borrows the payload as `T`, if this value is of the matching variant.
    ///
    /// ```
    /// use json_decoder::Value;
    ///
    /// let v: Value = r#"{"n": 4}"#.parse().unwrap();
    /// assert_eq!(v["n"].get::<f64>(), Some(&4.0));
    /// assert_eq!(v["n"].get::<String>(), None);
    /// ```
    pub fn get<T: InnerAsRef>(&self) -> Option<&T> {
        T::json_value_as(self)
    }

    pub fn get_mut<T: InnerAsRefMut>(&mut self) -> Option<&mut T> {
        T::json_value_as_mut(self)
    }

    pub fn as_str(&self) -> Option<&str> {
        self.get::<String>().map(String::as_str)
    }

    pub fn as_f64(&self) -> Option<f64> {
        self.get::<f64>().copied()
    }

    pub fn as_bool(&self) -> Option<bool> {
        self.get::<bool>().copied()
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        self.get::<Vec<Value>>().map(Vec::as_slice)
    }

    pub fn as_object(&self) -> Option<&Map> {
        self.get::<Map>()
    }

    is_xxx!(is_object, Value::Object(_));
    is_xxx!(is_array, Value::Array(_));
    is_xxx!(is_number, Value::Number(_));
    is_xxx!(is_string, Value::String(_));
    is_xxx!(is_bool, Value::Bool(_));
    is_xxx!(is_null, Value::Null);
}

impl<'a> Index<&'a str> for Value {
    type Output = Value;

    fn index(&self, key: &'a str) -> &Self::Output {
        let obj = match self {
            Value::Object(o) => o,
            _ => panic!(
                "cannot look up key '{key}' in a non-object value {:?}",
                self
            ),
        };

        match obj.get(key) {
            Some(json) => json,
            None => panic!("Key '{key}' was not found in {:?}", self),
        }
    }
}

impl Index<usize> for Value {
    type Output = Value;

    fn index(&self, index: usize) -> &'_ Self::Output {
        let array = match self {
            Value::Array(a) => a,
            _ => panic!(
                "cannot look up index {index} in a non-array value {:?}",
                self,
            ),
        };
        &array[index]
    }
}

impl<'a> IndexMut<&'a str> for Value {
    fn index_mut(&mut self, key: &'a str) -> &mut Self::Output {
        let obj = match self {
            Value::Object(o) => o,
            _ => panic!(
                "cannot look up key '{key}' in a non-object value {:?}",
                self
            ),
        };

        if let Some(json) = obj.get_mut(key) {
            json
        } else {
            panic!("Key '{key}' was not found in object")
        }
    }
}

impl IndexMut<usize> for Value {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        let array = match self {
            Value::Array(a) => a,
            _ => panic!(
                "cannot look up index {index} in a non-array value {:?}",
                self,
            ),
        };

        &mut array[index]
    }
}

#[derive(Debug, Error)]
#[error("Unexpected JSON value: {value:?}. Expected {expected} value")]
pub struct UnexpectedValue {
    value: Value,
    expected: &'static str,
}

impl UnexpectedValue {
    /// Gives back the value that failed to convert.
    pub fn into_value(self) -> Value {
        self.value
    }
}

macro_rules! impl_try_from {
    ($ty:ty, $pat:pat => $val:expr) => {
        impl TryFrom<Value> for $ty {
            type Error = UnexpectedValue;

            fn try_from(v: Value) -> Result<$ty, UnexpectedValue> {
                match v {
                    $pat => Ok($val),
                    value => Err(UnexpectedValue {
                        value,
                        expected: stringify!($ty),
                    }),
                }
            }
        }
    };
}

impl_try_from!(f64, Value::Number(n) => n);
impl_try_from!(bool, Value::Bool(b) => b);
impl_try_from!(String, Value::String(s) => s);
impl_try_from!((), Value::Null => ());
impl_try_from!(Vec<Value>, Value::Array(a) => a);
impl_try_from!(Map, Value::Object(m) => m);

macro_rules! impl_from {
    ($ty:ty, $v:ident => $val:expr) => {
        impl From<$ty> for Value {
            fn from($v: $ty) -> Value {
                $val
            }
        }
    };
}

impl_from!(f64, n => Value::Number(n));
impl_from!(bool, b => Value::Bool(b));
impl_from!(String, s => Value::String(s));
impl_from!(&str, s => Value::String(s.to_owned()));
impl_from!(Vec<Value>, a => Value::Array(a));
impl_from!(Map, m => Value::Object(m));

impl FromStr for Value {
    type Err = DecodeError;

    /// Decodes exactly one value. Only whitespace may follow it.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut decoder = Decoder::new(s.as_bytes());
        decoder.decode_single()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn sample() -> Value {
        let mut m = Map::default();
        m.insert("name".to_string(), "foo".into());
        m.insert("tags".to_string(), vec![true.into(), Value::Null].into());
        Value::Object(m)
    }

    #[test]
    fn test_accessors() {
        let v = sample();
        assert_eq!(v.kind(), ValueKind::Object);
        assert!(v.is_object());
        assert_eq!(v["name"].as_str(), Some("foo"));
        assert_eq!(v["tags"][0].as_bool(), Some(true));
        assert!(v["tags"][1].is_null());
        assert_eq!(v["tags"][1].get::<()>(), Some(&()));
        assert_eq!(v["tags"].as_array().map(<[Value]>::len), Some(2));
        assert_eq!(v.as_f64(), None);
    }

    #[test]
    fn test_index_mut() {
        let mut v = sample();
        v["name"] = 3.5.into();
        v["tags"][0] = "x".into();
        if let Some(n) = v["name"].get_mut::<f64>() {
            *n += 1.0;
        }
        assert_eq!(v["name"], Value::Number(4.5));
        assert_eq!(v["tags"][0].as_str(), Some("x"));
    }

    #[test]
    #[should_panic(expected = "Key 'missing' was not found")]
    fn test_index_missing_key() {
        let _ = &sample()["missing"];
    }

    #[test]
    fn test_try_from() {
        let s: String = Value::from("abc").try_into().unwrap();
        assert_eq!(s, "abc");
        let err = f64::try_from(Value::Bool(false)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unexpected JSON value: Bool(false). Expected f64 value"
        );
        assert_eq!(err.into_value(), Value::Bool(false));
    }

    #[test]
    fn test_kind_display() {
        let names: Vec<String> = [
            Value::Object(Map::default()),
            Value::Array(vec![]),
            Value::Number(1.0),
            Value::String(String::new()),
            Value::Bool(true),
            Value::Null,
        ]
        .iter()
        .map(|v| v.kind().to_string())
        .collect();
        assert_eq!(
            names,
            ["object", "array", "number", "string", "bool", "null"]
        );
    }
}
