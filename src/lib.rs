// Copyright © 2024 Sitetaxon. All rights reserved.
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! # Sitetaxon Library
//!
//! Sitetaxon reads the content collection of a static site (Markdown with
//! YAML front matter) and derives the sorted set of distinct categories
//! used to build category index pages. Templating, asset pipelines and
//! deployment stay with the site's build framework; this crate supplies
//! the category set and an explicit, secret-free site configuration.

#![doc = include_str!("../README.md")]

use crate::categories::extract_categories;
use crate::collection::ContentCollection;
use crate::core::config::{Config, SharedConfig};
use crate::resource::Resource;
use parking_lot::RwLock;
use std::sync::Arc;

pub use crate::core::error::{Result, SiteError};

/// Configuration, error handling and the traits shared by the modules.
pub mod core;

/// Category extraction.
pub mod categories;

/// Provides command-line interface utilities.
pub mod cli;

/// Content collection loading.
pub mod collection;

/// Blog source patterns.
pub mod pattern;

/// Content resources and their typed front matter.
pub mod resource;

/// A site: its configuration and the operations run against its content.
#[derive(Debug, Clone)]
pub struct Site {
    config: SharedConfig,
}

impl Site {
    /// Creates a site from a shared configuration handle.
    pub fn new(config: SharedConfig) -> Self {
        Self { config }
    }

    /// Creates a site that owns `config`.
    pub fn from_config(config: Config) -> Self {
        Self::new(Arc::new(RwLock::new(config)))
    }

    /// The configuration handle.
    pub fn config(&self) -> &SharedConfig {
        &self.config
    }

    /// Reads the content directory into a collection.
    pub fn load_collection(&self) -> Result<ContentCollection> {
        let config = self.config.read();
        let sources = config.source_pattern()?;
        ContentCollection::load(
            &config.content_dir,
            &config.content,
            Some(&sources),
        )
    }

    /// Loads the content and returns its sorted, distinct categories.
    pub fn categories(&self) -> Result<Vec<String>> {
        let collection = self.load_collection()?;
        extract_categories(collection.resources())
    }

    /// The summary of `resource`, split at the configured separator.
    pub fn summary<'r>(&self, resource: &'r Resource) -> Option<&'r str> {
        let separator = self.config.read().blog.summary_separator.clone();
        resource.summary(&separator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn site_with(files: &[(&str, &str)]) -> (TempDir, Site) {
        let temp_dir = TempDir::new().unwrap();
        for (relative, content) in files {
            let path = temp_dir.path().join(relative);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, content).unwrap();
        }

        let config = Config {
            content_dir: temp_dir.path().to_path_buf(),
            ..Config::default()
        };
        (temp_dir, Site::from_config(config))
    }

    #[test]
    fn test_site_categories() {
        let (_dir, site) = site_with(&[
            ("posts/jars/candy.markdown", "---\ntitle: Candy\n---\n"),
            ("posts/bags/paper.markdown", "Paper bags"),
            ("posts/jars/glass.markdown", "Glass"),
            ("about.md", "---\ncategory: pages\n---\n"),
            ("feed.xml", "<feed/>"),
        ]);

        assert_eq!(site.categories().unwrap(), vec!["bags", "jars", "pages"]);
    }

    #[test]
    fn test_site_without_content() {
        let (_dir, site) = site_with(&[]);
        assert!(site.categories().unwrap().is_empty());
        assert!(site.load_collection().unwrap().is_empty());
    }

    #[test]
    fn test_site_reflects_content_changes() {
        let (dir, site) = site_with(&[("a.md", "---\ncategory: one\n---\n")]);
        assert_eq!(site.categories().unwrap(), vec!["one"]);

        fs::write(dir.path().join("b.md"), "---\ncategory: two\n---\n")
            .unwrap();
        assert_eq!(site.categories().unwrap(), vec!["one", "two"]);
    }

    #[test]
    fn test_site_reports_comparison_errors() {
        let (_dir, site) = site_with(&[
            ("a.md", "---\ncategory: news\n---\n"),
            ("b.md", "---\ncategory: 2019\n---\n"),
        ]);
        assert!(matches!(
            site.categories(),
            Err(SiteError::ComparisonError { .. })
        ));
    }

    #[test]
    fn test_site_uses_configured_sources() {
        let (_dir, site) = site_with(&[("articles/tins/a.md", "Tins")]);
        assert!(site.categories().unwrap().is_empty());

        site.config().write().blog.sources =
            "articles/{category}/{title}".to_string();
        assert_eq!(site.categories().unwrap(), vec!["tins"]);
    }

    #[test]
    fn test_site_summary_uses_configured_separator() {
        let (_dir, site) = site_with(&[(
            "posts/jars/candy.markdown",
            "Jars of candy.\n\nREAD_MORE\n\nThe long story.",
        )]);
        let collection = site.load_collection().unwrap();
        let post = collection.get("posts/jars/candy.markdown").unwrap();

        assert_eq!(site.summary(post), None);
        site.config().write().blog.summary_separator = "READ_MORE".to_string();
        assert_eq!(site.summary(post), Some("Jars of candy."));
    }

    #[test]
    fn test_collection_from_resources() {
        let collection = ContentCollection::from_resources(
            "memory",
            vec![Resource::parse("x.md", "---\ncategory: q\n---\n").unwrap()],
        );
        assert_eq!(extract_categories(collection.resources()).unwrap(), vec!["q"]);
        assert_eq!(collection.root(), std::path::Path::new("memory"));
    }
}
