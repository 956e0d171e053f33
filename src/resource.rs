// Copyright © 2024 Sitetaxon. All rights reserved.
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! # Content Resources
//!
//! A [`Resource`] is one content file of the site: its path relative to
//! the content directory, the typed front matter and the body that
//! follows it. Front matter is a YAML block opened by a first line `---`
//! and closed by the next line consisting of `---`.
//!
//! The `category` attribute is kept as a [`CategoryValue`] so that text,
//! numeric and boolean categories written in YAML keep their kind, and
//! so that an absent or blank category is an explicit `None`.

use crate::core::traits::Categorized;
use crate::{Result, SiteError};
use serde_json::Value as JsonValue;
use serde_yml::Value as YamlValue;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// Typed value of a resource's `category` attribute.
#[derive(Debug, Clone, PartialEq)]
pub enum CategoryValue {
    /// A textual label, the usual case.
    Text(String),
    /// An integer label, e.g. `category: 2019`.
    Integer(i64),
    /// A non-integer numeric label.
    Float(f64),
    /// A boolean label.
    Boolean(bool),
}

impl CategoryValue {
    /// Converts a front matter value into a category.
    ///
    /// Null, empty and whitespace-only strings yield `Ok(None)`. Sequences
    /// and mappings are rejected because a category must be a scalar.
    /// Tags are ignored. `.nan` and `.inf` become floats.
    pub fn from_front_matter(
        value: &YamlValue,
        path: &Path,
    ) -> Result<Option<Self>> {
        match value {
            YamlValue::Null => Ok(None),
            YamlValue::String(s) if s.trim().is_empty() => Ok(None),
            YamlValue::String(s) => Ok(Some(CategoryValue::Text(s.clone()))),
            YamlValue::Bool(b) => Ok(Some(CategoryValue::Boolean(*b))),
            YamlValue::Tagged(tagged) => {
                Self::from_front_matter(&tagged.value, path)
            }
            YamlValue::Number(n) => match n.as_i64() {
                Some(i) => Ok(Some(CategoryValue::Integer(i))),
                None => n
                    .as_f64()
                    .map(|f| Some(CategoryValue::Float(f)))
                    .ok_or_else(|| {
                        SiteError::content_error(
                            format!("Unrepresentable numeric category {}", n),
                            Some(path.to_path_buf()),
                            None,
                        )
                    }),
            },
            YamlValue::Sequence(_) | YamlValue::Mapping(_) => {
                Err(SiteError::content_error(
                    "Category must be a single scalar value",
                    Some(path.to_path_buf()),
                    None,
                ))
            }
        }
    }

    /// Name of the value's kind, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            CategoryValue::Text(_) => "text",
            CategoryValue::Integer(_) => "integer",
            CategoryValue::Float(_) => "float",
            CategoryValue::Boolean(_) => "boolean",
        }
    }

    /// Orders two categories, or returns `None` when they are incomparable.
    ///
    /// Text orders lexicographically by bytes, integers and floats order
    /// numerically against each other, and booleans only compare equal to
    /// themselves. Every other pairing, and any NaN, is incomparable.
    ///
    /// Values that compare with one common value are of the same kind
    /// family, and within a family the order is total.
    pub fn compare(&self, other: &Self) -> Option<Ordering> {
        use CategoryValue::{Boolean, Float, Integer, Text};

        match (self, other) {
            (Text(a), Text(b)) => Some(a.as_str().cmp(b.as_str())),
            (Integer(a), Integer(b)) => Some(a.cmp(b)),
            (Integer(a), Float(b)) => compare_integer_float(*a, *b),
            (Float(a), Integer(b)) => {
                compare_integer_float(*b, *a).map(Ordering::reverse)
            }
            (Float(a), Float(b)) => a.partial_cmp(b),
            (Boolean(a), Boolean(b)) if a == b => Some(Ordering::Equal),
            _ => None,
        }
    }

    pub(crate) fn describe(&self) -> String {
        match self {
            CategoryValue::Text(s) => format!("{:?} ({})", s, self.kind()),
            _ => format!("{} ({})", self, self.kind()),
        }
    }
}

/// Exact comparison of an integer with a float; `None` for NaN.
fn compare_integer_float(integer: i64, float: f64) -> Option<Ordering> {
    // i64::MIN is -2^63 exactly; i64::MAX + 1 is 2^63.
    const LOWER: f64 = i64::MIN as f64;
    const UPPER: f64 = -LOWER;

    if float.is_nan() {
        return None;
    }
    if float >= UPPER {
        return Some(Ordering::Less);
    }
    if float < LOWER {
        return Some(Ordering::Greater);
    }

    let whole = float.trunc();
    let ordering = integer.cmp(&(whole as i64)).then_with(|| {
        if float > whole {
            Ordering::Less
        } else if float < whole {
            Ordering::Greater
        } else {
            Ordering::Equal
        }
    });
    Some(ordering)
}

impl fmt::Display for CategoryValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryValue::Text(s) => f.write_str(s),
            CategoryValue::Integer(i) => write!(f, "{}", i),
            CategoryValue::Float(x) => write!(f, "{}", x),
            CategoryValue::Boolean(b) => write!(f, "{}", b),
        }
    }
}

impl From<&str> for CategoryValue {
    fn from(value: &str) -> Self {
        CategoryValue::Text(value.to_string())
    }
}

impl From<String> for CategoryValue {
    fn from(value: String) -> Self {
        CategoryValue::Text(value)
    }
}

impl From<i64> for CategoryValue {
    fn from(value: i64) -> Self {
        CategoryValue::Integer(value)
    }
}

/// Typed front matter of a resource.
#[derive(Debug, Clone, Default)]
pub struct FrontMatter {
    /// Title of the resource.
    pub title: Option<String>,
    /// Publication date, as written.
    pub date: Option<String>,
    /// Tags, from a YAML list or a comma-separated string.
    pub tags: Vec<String>,
    /// The category attribute.
    pub category: Option<CategoryValue>,
    /// Every other key, as JSON.
    pub custom: HashMap<String, JsonValue>,
}

impl FrontMatter {
    fn from_yaml(yaml: &str, path: &Path) -> Result<Self> {
        let mut front_matter = FrontMatter::default();
        if yaml.trim().is_empty() {
            return Ok(front_matter);
        }

        let fields: HashMap<String, YamlValue> = serde_yml::from_str(yaml)
            .map_err(|e| {
                SiteError::content_error(
                    "Malformed front matter",
                    Some(path.to_path_buf()),
                    Some(Box::new(e)),
                )
            })?;

        for (key, value) in fields {
            if key == "category" {
                front_matter.category =
                    CategoryValue::from_front_matter(&value, path)?;
                continue;
            }

            let value = serde_json::to_value(&value).map_err(|e| {
                SiteError::content_error(
                    format!("Unsupported front matter value for `{}`", key),
                    Some(path.to_path_buf()),
                    Some(Box::new(e)),
                )
            })?;
            match key.as_str() {
                "title" => {
                    front_matter.title = value.as_str().map(String::from)
                }
                "date" => {
                    front_matter.date = value.as_str().map(String::from)
                }
                "tags" => front_matter.tags = parse_tags(&value),
                _ => {
                    _ = front_matter.custom.insert(key, value);
                }
            }
        }

        Ok(front_matter)
    }
}

fn parse_tags(value: &JsonValue) -> Vec<String> {
    match value {
        JsonValue::Array(tags) => tags
            .iter()
            .filter_map(|v| v.as_str().map(String::from))
            .collect(),
        JsonValue::String(tags) => tags
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(String::from)
            .collect(),
        _ => Vec::new(),
    }
}

/// A content item of the site.
#[derive(Debug, Clone)]
pub struct Resource {
    path: PathBuf,
    front_matter: FrontMatter,
    body: String,
}

impl Resource {
    /// Creates a resource from already-parsed parts.
    pub fn new<P: Into<PathBuf>>(
        path: P,
        front_matter: FrontMatter,
        body: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            front_matter,
            body: body.into(),
        }
    }

    /// Parses a resource from the raw text of a content file.
    ///
    /// When the front matter has no title, the first `# ` heading of the
    /// body is used.
    pub fn parse<P: Into<PathBuf>>(path: P, raw: &str) -> Result<Self> {
        let path = path.into();
        let (yaml, body) = split_front_matter(raw, &path)?;
        let mut front_matter = match yaml {
            Some(yaml) => FrontMatter::from_yaml(yaml, &path)?,
            None => FrontMatter::default(),
        };

        if front_matter.title.is_none() {
            front_matter.title = body
                .lines()
                .find_map(|line| line.strip_prefix("# "))
                .map(|title| title.trim().to_string());
        }

        Ok(Self {
            path,
            front_matter,
            body: body.to_string(),
        })
    }

    /// Path relative to the content directory.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The typed front matter.
    pub fn front_matter(&self) -> &FrontMatter {
        &self.front_matter
    }

    /// The content after the front matter block.
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Title from the front matter or the first heading.
    pub fn title(&self) -> Option<&str> {
        self.front_matter.title.as_deref()
    }

    /// Sets the category unless the front matter already provides one.
    ///
    /// Returns `true` when the category was filled in.
    pub fn fill_category(&mut self, category: CategoryValue) -> bool {
        if self.front_matter.category.is_some() {
            return false;
        }
        self.front_matter.category = Some(category);
        true
    }

    /// The body text before the first `separator`, trimmed.
    ///
    /// Returns `None` when the body does not contain the separator.
    pub fn summary(&self, separator: &str) -> Option<&str> {
        if separator.is_empty() {
            return None;
        }
        self.body
            .find(separator)
            .map(|index| self.body[..index].trim())
    }
}

impl Categorized for Resource {
    fn category(&self) -> Option<&CategoryValue> {
        self.front_matter.category.as_ref()
    }
}

/// Splits raw content into its YAML front matter and body.
fn split_front_matter<'a>(
    raw: &'a str,
    path: &Path,
) -> Result<(Option<&'a str>, &'a str)> {
    let mut lines = raw.split_inclusive('\n');
    match lines.next() {
        Some(first) if first.trim_end_matches(['\r', '\n']) == "---" => {}
        _ => return Ok((None, raw)),
    }

    let yaml_start = raw.find('\n').map_or(raw.len(), |i| i + 1);
    let mut offset = yaml_start;
    for line in lines {
        if line.trim_end_matches(['\r', '\n']) == "---" {
            let yaml = &raw[yaml_start..offset];
            let body = &raw[offset + line.len()..];
            return Ok((Some(yaml), body));
        }
        offset += line.len();
    }

    Err(SiteError::content_error(
        "Front matter is not terminated by `---`",
        Some(path.to_path_buf()),
        None,
    ))
}
