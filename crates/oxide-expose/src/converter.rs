//! Typed path segment converters.

use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;

/// Format used by the `date` converter.
const DATE_FORMAT: &str = "%Y-%m-%d";

/// A typed value captured from, or formatted into, a path segment.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// Produced by the `int` converter.
    Int(i64),
    /// Produced by the `float` converter.
    Float(f64),
    /// Produced by the `date` converter.
    Date(NaiveDate),
    /// Produced by the `alpha`, `str` and `any` converters.
    Str(String),
}

impl Value {
    /// Returns the integer value, if this is an `Int`.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the float value, if this is a `Float`.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the date value, if this is a `Date`.
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Self::Date(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the string value, if this is a `Str`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => f.write_str(&format_float(*v)),
            Self::Date(v) => write!(f, "{}", v.format(DATE_FORMAT)),
            Self::Str(v) => f.write_str(v),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<NaiveDate> for Value {
    fn from(v: NaiveDate) -> Self {
        Self::Date(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

/// Shortest round-trip form, always carrying a decimal point.
fn format_float(v: f64) -> String {
    let mut s = v.to_string();
    if v.is_finite() && !s.contains('.') {
        s.push_str(".0");
    }
    s
}

/// The fixed set of segment converters.
///
/// Each converter owns a regex fragment used when compiling templates, a
/// parse function run on captured text, and a format function used when
/// building URLs. The regex is only a pre-filter: parsing may still reject
/// the capture, in which case the route does not match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Converter {
    /// One or more digits, parsed as `i64`.
    Int,
    /// Digits, a literal `.`, digits; parsed as `f64`.
    Float,
    /// `YYYY-MM-DD`, parsed as a calendar date.
    Date,
    /// One or more letters.
    Alpha,
    /// One or more non-slash characters.
    Str,
    /// Anything, slashes included. Only valid as the last template node.
    Any,
}

impl Converter {
    /// All converters.
    pub const ALL: [Self; 6] = [
        Self::Int,
        Self::Float,
        Self::Date,
        Self::Alpha,
        Self::Str,
        Self::Any,
    ];

    /// Looks up a converter by its template id.
    pub fn from_id(id: &str) -> Option<Self> {
        match id {
            "int" => Some(Self::Int),
            "float" => Some(Self::Float),
            "date" => Some(Self::Date),
            "alpha" => Some(Self::Alpha),
            "str" => Some(Self::Str),
            "any" => Some(Self::Any),
            _ => None,
        }
    }

    /// Returns the template id.
    pub fn id(self) -> &'static str {
        match self {
            Self::Int => "int",
            Self::Float => "float",
            Self::Date => "date",
            Self::Alpha => "alpha",
            Self::Str => "str",
            Self::Any => "any",
        }
    }

    /// Returns the regex fragment matching one value, without groups.
    pub fn regex_fragment(self) -> &'static str {
        match self {
            Self::Int => r"\d+",
            Self::Float => r"\d+\.\d+",
            Self::Date => r"\d{4}-\d{2}-\d{2}",
            Self::Alpha => r"[^\W\d_]+",
            Self::Str => r"[^/]+",
            Self::Any => r"(?s:.*)",
        }
    }

    /// Parses captured text. `None` means the route does not match.
    pub fn parse(self, raw: &str) -> Option<Value> {
        match self {
            Self::Int => raw.parse().ok().map(Value::Int),
            Self::Float => raw
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .map(Value::Float),
            Self::Date => NaiveDate::parse_from_str(raw, DATE_FORMAT)
                .ok()
                .map(Value::Date),
            Self::Alpha => (!raw.is_empty() && raw.chars().all(char::is_alphabetic))
                .then(|| Value::Str(raw.to_string())),
            Self::Str => (!raw.is_empty() && !raw.contains('/'))
                .then(|| Value::Str(raw.to_string())),
            Self::Any => Some(Value::Str(raw.to_string())),
        }
    }

    /// Formats a value for this converter.
    ///
    /// Values of a different variant fall back to their canonical text.
    pub fn format(self, value: &Value) -> String {
        match (self, value) {
            (Self::Float, Value::Int(v)) => format!("{v}.0"),
            _ => value.to_string(),
        }
    }
}

impl fmt::Display for Converter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}
