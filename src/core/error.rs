// Copyright © 2024 Sitetaxon. All rights reserved.
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! # Error Handling for Sitetaxon
//!
//! This module defines the error type shared by configuration loading,
//! content collection and category extraction. The `thiserror` crate is
//! used to keep the variants and their messages in one place.

use std::path::PathBuf;
use thiserror::Error;

/// A unified result type for the Sitetaxon library.
pub type Result<T> = std::result::Result<T, SiteError>;

/// The main error type for Sitetaxon, encompassing all potential error cases.
#[derive(Error, Debug)]
pub enum SiteError {
    /// Error related to configuration loading or validation.
    ///
    /// Raised for unreadable or malformed TOML, unknown override keys,
    /// invalid source patterns and unresolvable deploy credentials.
    #[error("Configuration error: {message}.")]
    ConfigError {
        /// Detailed description of the configuration error.
        message: String,
        /// Optional path of the configuration file that caused the error.
        path: Option<PathBuf>,
    },

    /// Error encountered while reading a content resource.
    ///
    /// Covers malformed front matter and non-scalar category values.
    #[error("Content error: {message}{}.", located(.path))]
    ContentError {
        /// Detailed description of the content error.
        message: String,
        /// Path of the resource, relative to the content directory, if known.
        path: Option<PathBuf>,
        /// Optional source error providing additional context, if available.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Two category values cannot be ordered relative to each other.
    ///
    /// This is the only failure of category extraction; it happens when
    /// the collection mixes incomparable kinds, such as text and numbers.
    #[error("Cannot order category {left} relative to {right}.")]
    ComparisonError {
        /// Description of the first value, including its kind.
        left: String,
        /// Description of the second value, including its kind.
        right: String,
    },

    /// IO error encountered during file operations.
    #[error("File IO error at `{path:?}`: {source}")]
    IOError {
        /// Path associated with the IO error.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// General internal error.
    #[error("Internal error: {0}")]
    InternalError(String),
}

fn located(path: &Option<PathBuf>) -> String {
    path.as_ref()
        .map(|p| format!(" in `{}`", p.display()))
        .unwrap_or_default()
}

impl From<std::io::Error> for SiteError {
    /// Converts a standard IO error into a `SiteError::IOError` with an empty path.
    fn from(source: std::io::Error) -> Self {
        SiteError::IOError {
            path: PathBuf::new(),
            source,
        }
    }
}

impl SiteError {
    /// Creates a `ConfigError` with a specific message.
    ///
    /// # Parameters
    /// - `message`: A description of the configuration error.
    /// - `path`: Optional path of the configuration file causing the error.
    pub fn config_error<S: Into<String>>(
        message: S,
        path: Option<PathBuf>,
    ) -> Self {
        SiteError::ConfigError {
            message: message.into(),
            path,
        }
    }

    /// Creates a `ContentError` for the resource at `path`.
    ///
    /// # Parameters
    /// - `message`: A description of the content error.
    /// - `path`: The resource path, if known.
    /// - `source`: An optional source error providing additional context.
    pub fn content_error<S: Into<String>>(
        message: S,
        path: Option<PathBuf>,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        SiteError::ContentError {
            message: message.into(),
            path,
            source,
        }
    }

    /// Creates a `ComparisonError` from descriptions of the two values.
    pub fn comparison_error<L: Into<String>, R: Into<String>>(
        left: L,
        right: R,
    ) -> Self {
        SiteError::ComparisonError {
            left: left.into(),
            right: right.into(),
        }
    }

    /// Wraps an IO error as an `IOError` variant with the specified path.
    pub fn io_error(path: PathBuf, source: std::io::Error) -> Self {
        SiteError::IOError { path, source }
    }

    /// Creates a general internal error with a custom message.
    pub fn internal_error<S: Into<String>>(message: S) -> Self {
        SiteError::InternalError(message.into())
    }
}
