// Copyright © 2024 Sitetaxon. All rights reserved.
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! # Source Patterns
//!
//! Blog sources are described by patterns such as
//! `posts/{category}/{title}`. A [`SourcePattern`] matches a resource path
//! (relative to the content directory, extension removed) and captures
//! the placeholder values, which is how a post filed under
//! `posts/jars/candy.md` gets the category `jars` without saying so in
//! its front matter.

use crate::{Result, SiteError};
use std::collections::HashMap;
use std::fmt;
use std::path::{Component, Path};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Literal(String),
    Placeholder(String),
}

/// A parsed blog source pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcePattern {
    raw: String,
    segments: Vec<Vec<Token>>,
}

impl SourcePattern {
    /// Parses a pattern.
    ///
    /// Segments are separated by `/`. Each segment mixes literal text and
    /// `{name}` placeholders; two placeholders may not touch, since the
    /// boundary between them would be ambiguous.
    pub fn parse(pattern: &str) -> Result<Self> {
        let trimmed = pattern.trim_matches('/');
        if trimmed.is_empty() {
            return Err(invalid(pattern, "pattern is empty"));
        }

        let segments = trimmed
            .split('/')
            .map(|segment| parse_segment(pattern, segment))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            raw: pattern.to_string(),
            segments,
        })
    }

    /// The pattern as written.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Placeholder names in order of appearance.
    pub fn placeholders(&self) -> Vec<&str> {
        self.segments
            .iter()
            .flatten()
            .filter_map(|token| match token {
                Token::Placeholder(name) => Some(name.as_str()),
                Token::Literal(_) => None,
            })
            .collect()
    }

    /// Matches `path` and returns the captured placeholder values.
    ///
    /// The file extension is ignored. Each placeholder captures a
    /// non-empty run of text that does not cross a `/`. Returns `None`
    /// when the path does not match.
    pub fn captures(&self, path: &Path) -> Option<HashMap<String, String>> {
        let stem = path.with_extension("");
        let parts = stem
            .components()
            .map(|component| match component {
                Component::Normal(part) => part.to_str(),
                _ => None,
            })
            .collect::<Option<Vec<_>>>()?;

        if parts.len() != self.segments.len() {
            return None;
        }

        let mut captured = Vec::new();
        for (tokens, part) in self.segments.iter().zip(parts) {
            if !match_tokens(tokens, part, &mut captured) {
                return None;
            }
        }
        Some(captured.into_iter().collect())
    }
}

impl fmt::Display for SourcePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

fn invalid(pattern: &str, reason: &str) -> SiteError {
    SiteError::config_error(
        format!("Invalid source pattern `{}`: {}", pattern, reason),
        None,
    )
}

fn parse_segment(pattern: &str, segment: &str) -> Result<Vec<Token>> {
    if segment.is_empty() {
        return Err(invalid(pattern, "empty path segment"));
    }

    let mut tokens = Vec::new();
    let mut rest = segment;
    while !rest.is_empty() {
        if let Some(after_brace) = rest.strip_prefix('{') {
            let end = after_brace
                .find('}')
                .ok_or_else(|| invalid(pattern, "unclosed `{`"))?;
            let name = &after_brace[..end];
            if name.is_empty() || name.contains('{') {
                return Err(invalid(pattern, "bad placeholder name"));
            }
            if matches!(tokens.last(), Some(Token::Placeholder(_))) {
                return Err(invalid(pattern, "adjacent placeholders"));
            }
            tokens.push(Token::Placeholder(name.to_string()));
            rest = &after_brace[end + 1..];
        } else {
            let end = rest.find('{').unwrap_or(rest.len());
            let literal = &rest[..end];
            if literal.contains('}') {
                return Err(invalid(pattern, "unmatched `}`"));
            }
            tokens.push(Token::Literal(literal.to_string()));
            rest = &rest[end..];
        }
    }
    Ok(tokens)
}

fn match_tokens(
    tokens: &[Token],
    text: &str,
    captured: &mut Vec<(String, String)>,
) -> bool {
    let Some((first, rest)) = tokens.split_first() else {
        return text.is_empty();
    };

    match first {
        Token::Literal(literal) => text
            .strip_prefix(literal.as_str())
            .is_some_and(|remaining| match_tokens(rest, remaining, captured)),
        Token::Placeholder(name) if rest.is_empty() => {
            if text.is_empty() {
                return false;
            }
            captured.push((name.clone(), text.to_string()));
            true
        }
        Token::Placeholder(name) => {
            let mark = captured.len();
            for (index, _) in text.char_indices().skip(1) {
                captured.push((name.clone(), text[..index].to_string()));
                if match_tokens(rest, &text[index..], captured) {
                    return true;
                }
                captured.truncate(mark);
            }
            false
        }
    }
}
