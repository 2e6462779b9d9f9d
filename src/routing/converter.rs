//! Path placeholder converters
//!
//! A placeholder such as `<int:course_id>` names a converter (`int`) which
//! decides both which text the placeholder may match and how the matched
//! text is turned into a typed value.

use std::fmt;
use uuid::Uuid;

/// Placeholder type declared in a route pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Converter {
    /// Non-negative integer text, converted to `u64`
    Int,
    /// Any non-empty text without a `/` (the default)
    Str,
    /// ASCII letters, digits, hyphens and underscores
    Slug,
    /// Any non-empty text, `/` included
    Path,
    /// Lowercase hyphenated UUID
    Uuid,
}

impl Converter {
    /// Look up a converter by the name used inside `<name:param>`
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "int" => Some(Self::Int),
            "str" => Some(Self::Str),
            "slug" => Some(Self::Slug),
            "path" => Some(Self::Path),
            "uuid" => Some(Self::Uuid),
            _ => None,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Int => "int",
            Self::Str => "str",
            Self::Slug => "slug",
            Self::Path => "path",
            Self::Uuid => "uuid",
        }
    }

    /// Regex fragment for the text this converter accepts
    pub const fn regex(self) -> &'static str {
        match self {
            Self::Int => "[0-9]+",
            Self::Str => "[^/]+",
            Self::Slug => "[-a-zA-Z0-9_]+",
            Self::Path => ".+",
            Self::Uuid => "[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}",
        }
    }

    /// Convert matched text into a typed value.
    ///
    /// Returns `None` when the text matched the regex but cannot be
    /// represented, e.g. an integer that overflows `u64`. Callers treat
    /// that the same as a pattern that did not match.
    pub fn to_value(self, raw: &str) -> Option<ParamValue> {
        match self {
            Self::Int => raw.parse::<u64>().ok().map(ParamValue::Int),
            Self::Str | Self::Slug | Self::Path => Some(ParamValue::Str(raw.to_string())),
            Self::Uuid => Uuid::parse_str(raw).ok().map(ParamValue::Uuid),
        }
    }
}

/// Typed value captured from a placeholder
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    Int(u64),
    Str(String),
    Uuid(Uuid),
}

impl ParamValue {
    pub const fn as_int(&self) -> Option<u64> {
        match self {
            Self::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    pub const fn as_uuid(&self) -> Option<&Uuid> {
        match self {
            Self::Uuid(u) => Some(u),
            _ => None,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{n}"),
            Self::Str(s) => f.write_str(s),
            Self::Uuid(u) => write!(f, "{}", u.hyphenated()),
        }
    }
}
