// Copyright 2024 OctoFHIR Team
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Core value types for CJSON expressions

use bigdecimal::BigDecimal;
use indexmap::IndexMap;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use super::dump::dump_single_line;

/// Map type produced by CJSON maps. Entries keep the order in which their
/// keys first appeared in the source.
pub type CjsonMap = IndexMap<String, CjsonValue>;

/// Core value type for CJSON expressions
///
/// Every CJSON expression evaluates to one of these variants. Maps and lists
/// returned by the top-level entry points are never `Null` themselves,
/// though they may be empty.
#[derive(Debug, Clone)]
pub enum CjsonValue {
    /// The `null` literal
    Null,

    /// `true` or `false`
    Boolean(bool),

    /// Integer literal that fits into 32 bits
    Integer(i32),

    /// 64-bit integer; never produced by the parser, but hosts may store it
    Long(i64),

    /// Number literal that isn't a 32-bit integer
    Decimal(Decimal),

    /// Number literal outside the range of [`Decimal`]: more than 28
    /// fraction digits or a mantissa wider than 96 bits
    BigDecimal(BigDecimal),

    /// Quoted, raw or unquoted string
    String(String),

    /// Ordered list of values
    List(Vec<CjsonValue>),

    /// Ordered string-keyed map
    Map(CjsonMap),

    /// Function call the evaluation environment has left unresolved
    FunctionCall(FunctionCall),

    /// Un-evaluated piece of the source text
    Fragment(Fragment),

    /// Host-specific object that has no CJSON counterpart
    Foreign(Arc<dyn ForeignValue>),
}

/// Host objects stored in a value tree.
///
/// The interpreter never creates these; environments may return them from
/// function calls. They are printed as `<TypeName "display">` by the dump
/// functions.
pub trait ForeignValue: fmt::Debug + fmt::Display + Send + Sync {
    /// Name of the host type, used in dumps and type error messages
    fn type_name(&self) -> &str;
}

impl CjsonValue {
    /// Create a string value
    pub fn string(value: impl Into<String>) -> Self {
        CjsonValue::String(value.into())
    }

    /// Check if this is the `null` value
    pub fn is_null(&self) -> bool {
        matches!(self, CjsonValue::Null)
    }

    /// Get the string content, if this is a string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            CjsonValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get the boolean content, if this is a boolean
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            CjsonValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Get any integral number as `i64`
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            CjsonValue::Integer(i) => Some(i64::from(*i)),
            CjsonValue::Long(l) => Some(*l),
            CjsonValue::Decimal(d) if d.fract().is_zero() => d.to_i64(),
            CjsonValue::BigDecimal(d) if d.is_integer() => bigdecimal::ToPrimitive::to_i64(d),
            _ => None,
        }
    }

    /// Get the map, if this is a map
    pub fn as_map(&self) -> Option<&CjsonMap> {
        match self {
            CjsonValue::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Get the list, if this is a list
    pub fn as_list(&self) -> Option<&[CjsonValue]> {
        match self {
            CjsonValue::List(l) => Some(l),
            _ => None,
        }
    }

    /// Get the unresolved function call, if this is one
    pub fn as_function_call(&self) -> Option<&FunctionCall> {
        match self {
            CjsonValue::FunctionCall(f) => Some(f),
            _ => None,
        }
    }

    /// Get the fragment, if this is one
    pub fn as_fragment(&self) -> Option<&Fragment> {
        match self {
            CjsonValue::Fragment(f) => Some(f),
            _ => None,
        }
    }

    /// The text a value contributes when it is concatenated into a string:
    /// strings verbatim, everything else in single-line dump form.
    pub fn to_display_string(&self) -> String {
        match self {
            CjsonValue::String(s) => s.clone(),
            other => dump_single_line(other),
        }
    }
}

impl PartialEq for CjsonValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Boolean(a), Self::Boolean(b)) => a == b,
            (Self::Integer(a), Self::Integer(b)) => a == b,
            (Self::Long(a), Self::Long(b)) => a == b,
            (Self::Decimal(a), Self::Decimal(b)) => a == b,
            (Self::BigDecimal(a), Self::BigDecimal(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::List(a), Self::List(b)) => a == b,
            (Self::Map(a), Self::Map(b)) => a == b,
            (Self::FunctionCall(a), Self::FunctionCall(b)) => a == b,
            (Self::Fragment(a), Self::Fragment(b)) => a == b,
            (Self::Foreign(a), Self::Foreign(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for CjsonValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&dump_single_line(self))
    }
}

impl From<bool> for CjsonValue {
    fn from(value: bool) -> Self {
        CjsonValue::Boolean(value)
    }
}

impl From<i32> for CjsonValue {
    fn from(value: i32) -> Self {
        CjsonValue::Integer(value)
    }
}

impl From<i64> for CjsonValue {
    fn from(value: i64) -> Self {
        CjsonValue::Long(value)
    }
}

impl From<Decimal> for CjsonValue {
    fn from(value: Decimal) -> Self {
        CjsonValue::Decimal(value)
    }
}

impl From<BigDecimal> for CjsonValue {
    fn from(value: BigDecimal) -> Self {
        CjsonValue::BigDecimal(value)
    }
}

impl From<&str> for CjsonValue {
    fn from(value: &str) -> Self {
        CjsonValue::String(value.to_string())
    }
}

impl From<String> for CjsonValue {
    fn from(value: String) -> Self {
        CjsonValue::String(value)
    }
}

impl From<Vec<CjsonValue>> for CjsonValue {
    fn from(values: Vec<CjsonValue>) -> Self {
        CjsonValue::List(values)
    }
}

impl From<CjsonMap> for CjsonValue {
    fn from(map: CjsonMap) -> Self {
        CjsonValue::Map(map)
    }
}

impl From<FunctionCall> for CjsonValue {
    fn from(call: FunctionCall) -> Self {
        CjsonValue::FunctionCall(call)
    }
}

impl From<Fragment> for CjsonValue {
    fn from(fragment: Fragment) -> Self {
        CjsonValue::Fragment(fragment)
    }
}

impl Serialize for CjsonValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            CjsonValue::Null => serializer.serialize_unit(),
            CjsonValue::Boolean(b) => serializer.serialize_bool(*b),
            CjsonValue::Integer(i) => serializer.serialize_i32(*i),
            CjsonValue::Long(l) => serializer.serialize_i64(*l),
            CjsonValue::Decimal(d) => serialize_number(&d.to_string(), serializer),
            CjsonValue::BigDecimal(d) => serialize_number(&big_decimal_text(d), serializer),
            CjsonValue::String(s) => serializer.serialize_str(s),
            CjsonValue::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            CjsonValue::Map(map) => {
                let mut ser = serializer.serialize_map(Some(map.len()))?;
                for (key, value) in map {
                    ser.serialize_entry(key, value)?;
                }
                ser.end()
            }
            CjsonValue::FunctionCall(_) | CjsonValue::Fragment(_) | CjsonValue::Foreign(_) => {
                serializer.serialize_str(&dump_single_line(self))
            }
        }
    }
}

/// `mantissa` or `mantissa e exponent`, which reads back as the same
/// CJSON number
pub(crate) fn big_decimal_text(d: &BigDecimal) -> String {
    let (mantissa, scale) = d.as_bigint_and_exponent();
    match scale {
        0 => mantissa.to_string(),
        scale => format!("{mantissa}e{}", -scale),
    }
}

/// Numbers go out as JSON numbers with every digit of their decimal text
fn serialize_number<S: Serializer>(text: &str, serializer: S) -> Result<S::Ok, S::Error> {
    match serde_json::Number::from_str(text) {
        Ok(number) => number.serialize(serializer),
        Err(_) => serializer.serialize_str(text),
    }
}

/// A CJSON function call: a name and its already evaluated arguments.
///
/// Appears in a value tree only when the evaluation environment declined to
/// resolve it.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCall {
    name: String,
    params: Vec<CjsonValue>,
}

impl FunctionCall {
    /// Create a new function call
    pub fn new(name: impl Into<String>, params: Vec<CjsonValue>) -> Self {
        Self {
            name: name.into(),
            params,
        }
    }

    /// Name of the called function
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Evaluated arguments, in source order
    pub fn params(&self) -> &[CjsonValue] {
        &self.params
    }

    /// Take ownership of the arguments
    pub fn into_params(self) -> Vec<CjsonValue> {
        self.params
    }
}

impl fmt::Display for FunctionCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        f.write_str("(")?;
        for (i, param) in self.params.iter().enumerate() {
            if i != 0 {
                f.write_str(", ")?;
            }
            f.write_str(&dump_single_line(param))?;
        }
        f.write_str(")")
    }
}

/// Un-evaluated piece of CJSON source text.
///
/// A fragment references the full source by byte offsets rather than copying
/// the span, so that it can later be evaluated with correct error positions
/// (see [`crate::eval_fragment`]).
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    text: Arc<str>,
    start: usize,
    end: usize,
    file_name: Option<Arc<str>>,
}

impl Fragment {
    /// Create a new fragment over `text[start..end]`.
    ///
    /// The offsets are clamped to the text and to UTF-8 character boundaries.
    pub fn new(text: Arc<str>, start: usize, end: usize, file_name: Option<Arc<str>>) -> Self {
        let end = floor_char_boundary(&text, end.min(text.len()));
        let start = floor_char_boundary(&text, start.min(end));
        Self {
            text,
            start,
            end,
            file_name,
        }
    }

    /// The full source text that contains the fragment
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Shared handle to the full source text
    pub fn shared_text(&self) -> &Arc<str> {
        &self.text
    }

    /// Start byte offset of the fragment in the text
    pub fn start(&self) -> usize {
        self.start
    }

    /// End byte offset (exclusive) of the fragment in the text
    pub fn end(&self) -> usize {
        self.end
    }

    /// Name of the file the text comes from, if known
    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    /// The fragment text itself
    pub fn as_str(&self) -> &str {
        &self.text[self.start..self.end]
    }
}

impl fmt::Display for Fragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn floor_char_boundary(text: &str, mut index: usize) -> usize {
    while index > 0 && !text.is_char_boundary(index) {
        index -= 1;
    }
    index
}

/// Foreign value used by tests and hosts that only need a label.
#[derive(Debug)]
pub struct OpaqueValue {
    type_name: String,
    display: String,
}

impl OpaqueValue {
    /// Create an opaque host value
    pub fn new(type_name: impl Into<String>, display: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            display: display.into(),
        }
    }
}

impl fmt::Display for OpaqueValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display)
    }
}

impl ForeignValue for OpaqueValue {
    fn type_name(&self) -> &str {
        &self.type_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fragment_slices_text() {
        let text: Arc<str> = Arc::from("a: {x: 1}, b: 2");
        let fragment = Fragment::new(Arc::clone(&text), 3, 9, None);
        assert_eq!(fragment.as_str(), "{x: 1}");
        assert_eq!(fragment.to_string(), "{x: 1}");
        assert_eq!(fragment.text(), "a: {x: 1}, b: 2");
    }

    #[test]
    fn test_fragment_clamps_offsets() {
        let text: Arc<str> = Arc::from("héllo");
        let fragment = Fragment::new(text, 2, 100, None);
        // byte 2 is inside 'é', so the start moves back to its first byte
        assert_eq!(fragment.start(), 1);
        assert_eq!(fragment.as_str(), "éllo");
    }

    #[test]
    fn test_as_i64_accepts_integral_decimals() {
        assert_eq!(CjsonValue::Integer(3).as_i64(), Some(3));
        assert_eq!(CjsonValue::Long(5_000_000_000).as_i64(), Some(5_000_000_000));
        assert_eq!(CjsonValue::Decimal(Decimal::new(40, 1)).as_i64(), Some(4));
        assert_eq!(CjsonValue::Decimal(Decimal::new(45, 1)).as_i64(), None);
        let big = |s: &str| CjsonValue::BigDecimal(BigDecimal::from_str(s).unwrap());
        assert_eq!(big("1e3").as_i64(), Some(1000));
        assert_eq!(big("1e100").as_i64(), None);
        assert_eq!(big("1e-29").as_i64(), None);
    }

    #[test]
    fn test_foreign_equality_is_identity() {
        let a: Arc<dyn ForeignValue> = Arc::new(OpaqueValue::new("Path", "/tmp"));
        let b: Arc<dyn ForeignValue> = Arc::new(OpaqueValue::new("Path", "/tmp"));
        assert_eq!(
            CjsonValue::Foreign(Arc::clone(&a)),
            CjsonValue::Foreign(Arc::clone(&a))
        );
        assert_ne!(CjsonValue::Foreign(a), CjsonValue::Foreign(b));
    }

    #[test]
    fn test_serialize_to_json() {
        let mut map = CjsonMap::new();
        map.insert("b".to_string(), CjsonValue::Integer(1));
        map.insert("a".to_string(), CjsonValue::Null);
        map.insert(
            "c".to_string(),
            CjsonValue::FunctionCall(FunctionCall::new("f", vec![CjsonValue::Integer(1)])),
        );
        let json = serde_json::to_string(&CjsonValue::Map(map)).unwrap();
        assert_eq!(json, r#"{"b":1,"a":null,"c":"f(1)"}"#);
    }

    #[test]
    fn test_serialize_numbers_exactly() {
        let values = vec![
            CjsonValue::Decimal(Decimal::from_str("12345678901234567890.123456789").unwrap()),
            CjsonValue::Decimal(Decimal::new(75, 2)),
            CjsonValue::BigDecimal(
                BigDecimal::from_str("123456789012345678901234567890123").unwrap(),
            ),
        ];
        let json = serde_json::to_string(&CjsonValue::List(values)).unwrap();
        assert_eq!(
            json,
            "[12345678901234567890.123456789,0.75,123456789012345678901234567890123]"
        );
    }

    #[test]
    fn test_big_decimal_text() {
        let text = |s: &str| big_decimal_text(&BigDecimal::from_str(s).unwrap());
        assert_eq!(text("1e100"), "1e100");
        assert_eq!(text("-0.00000000000000000000000000001"), "-1e-29");
        assert_eq!(text("42"), "42");
    }
}
