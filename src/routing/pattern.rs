//! Route pattern compilation
//!
//! Turns a declaration like `course/<int:course_id>` into an anchored regex
//! plus the list of typed placeholders it captures. Literal text is escaped,
//! each placeholder becomes a named group using its converter's fragment.

use regex::Regex;

use super::converter::{Converter, ParamValue};
use super::error::RouteError;

/// A piece of a parsed pattern
#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param { name: String, converter: Converter },
}

/// Compiled route pattern
#[derive(Debug, Clone)]
pub struct RoutePattern {
    raw: String,
    segments: Vec<Segment>,
    regex: Regex,
}

impl RoutePattern {
    /// Parse and compile a pattern.
    ///
    /// Patterns are written without a leading slash, `""` matches the root.
    pub fn parse(pattern: &str) -> Result<Self, RouteError> {
        let segments = parse_segments(pattern)?;

        let mut source = String::from("^");
        let mut seen: Vec<&str> = Vec::new();
        for segment in &segments {
            match segment {
                Segment::Literal(text) => source.push_str(&regex::escape(text)),
                Segment::Param { name, converter } => {
                    if seen.contains(&name.as_str()) {
                        return Err(RouteError::invalid_pattern(
                            pattern,
                            format!("placeholder '{name}' is used more than once"),
                        ));
                    }
                    seen.push(name);
                    source.push_str(&format!("(?P<{name}>{})", converter.regex()));
                }
            }
        }
        source.push_str(r"\z");

        Ok(Self {
            raw: pattern.to_string(),
            segments,
            regex: Regex::new(&source)?,
        })
    }

    /// Pattern text as declared
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Placeholder names with their converters, in declaration order
    pub fn params(&self) -> impl Iterator<Item = (&str, Converter)> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Param { name, converter } => Some((name.as_str(), *converter)),
            Segment::Literal(_) => None,
        })
    }

    /// Match a path (leading slash already removed) and convert captures.
    ///
    /// A capture that fails conversion makes the whole pattern miss.
    pub fn captures(&self, path: &str) -> Option<Vec<(String, ParamValue)>> {
        let raw = self.raw_captures(path)?;
        self.params()
            .zip(raw)
            .map(|((name, converter), text)| {
                converter
                    .to_value(text)
                    .map(|value| (name.to_string(), value))
            })
            .collect()
    }

    /// Build a path (without leading slash) from keyword arguments
    pub fn reverse(&self, args: &[(&str, &str)]) -> Result<String, String> {
        if let Some((unknown, _)) = args
            .iter()
            .find(|(key, _)| !self.params().any(|(name, _)| name == *key))
        {
            return Err(format!("unexpected argument '{unknown}'"));
        }

        let mut path = String::with_capacity(self.raw.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => path.push_str(text),
                Segment::Param { name, .. } => {
                    let value = args
                        .iter()
                        .find(|(key, _)| key == name)
                        .map(|(_, value)| *value)
                        .ok_or_else(|| format!("missing argument '{name}'"))?;
                    path.push_str(value);
                }
            }
        }

        // Each argument must come back out of the match unchanged and convert
        let Some(raw) = self.raw_captures(&path) else {
            return Err(format!("'{path}' does not match pattern '{}'", self.raw));
        };
        for ((name, converter), text) in self.params().zip(raw) {
            let given = args.iter().find(|(key, _)| *key == name).map(|(_, v)| *v);
            if given != Some(text) || converter.to_value(text).is_none() {
                return Err(format!(
                    "argument '{name}' is not a valid {} value",
                    converter.name()
                ));
            }
        }

        Ok(path)
    }

    fn raw_captures<'p>(&self, path: &'p str) -> Option<Vec<&'p str>> {
        let caps = self.regex.captures(path)?;
        self.params()
            .map(|(name, _)| caps.name(name).map(|m| m.as_str()))
            .collect()
    }
}

fn parse_segments(pattern: &str) -> Result<Vec<Segment>, RouteError> {
    let mut segments = Vec::new();
    let mut rest = pattern;

    while let Some(start) = rest.find('<') {
        let (literal, tail) = rest.split_at(start);
        push_literal(&mut segments, pattern, literal)?;

        let Some(end) = tail.find('>') else {
            return Err(RouteError::invalid_pattern(pattern, "unclosed '<'"));
        };
        segments.push(parse_placeholder(pattern, &tail[1..end])?);
        rest = &tail[end + 1..];
    }
    push_literal(&mut segments, pattern, rest)?;

    Ok(segments)
}

fn push_literal(segments: &mut Vec<Segment>, pattern: &str, text: &str) -> Result<(), RouteError> {
    if text.contains('>') {
        return Err(RouteError::invalid_pattern(pattern, "unmatched '>'"));
    }
    if !text.is_empty() {
        segments.push(Segment::Literal(text.to_string()));
    }
    Ok(())
}

fn parse_placeholder(pattern: &str, inner: &str) -> Result<Segment, RouteError> {
    if inner.chars().any(char::is_whitespace) {
        return Err(RouteError::invalid_pattern(
            pattern,
            "whitespace inside angle brackets",
        ));
    }

    let (converter_name, name) = inner.split_once(':').unwrap_or(("str", inner));
    if !is_identifier(name) {
        return Err(RouteError::invalid_pattern(
            pattern,
            format!("'{name}' is not a valid placeholder name"),
        ));
    }

    let converter =
        Converter::from_name(converter_name).ok_or_else(|| RouteError::UnknownConverter {
            pattern: pattern.to_string(),
            converter: converter_name.to_string(),
        })?;

    Ok(Segment::Param {
        name: name.to_string(),
        converter,
    })
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
