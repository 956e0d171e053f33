// Copyright © 2024 Sitetaxon. All rights reserved.
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! # Content Collection
//!
//! Loads every content file under the content directory into a
//! [`Resource`]. Files are visited in sorted path order so that the
//! collection is identical from one build to the next.

use crate::core::config::ContentConfig;
use crate::pattern::SourcePattern;
use crate::resource::{CategoryValue, Resource};
use crate::{Result, SiteError};
use log::{debug, info};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// The resources of a site, as read from its content directory.
#[derive(Debug, Clone, Default)]
pub struct ContentCollection {
    root: PathBuf,
    resources: Vec<Resource>,
}

impl ContentCollection {
    /// Builds a collection from resources that are already in memory.
    pub fn from_resources<P: Into<PathBuf>>(
        root: P,
        resources: Vec<Resource>,
    ) -> Self {
        Self {
            root: root.into(),
            resources,
        }
    }

    /// Reads all content files below `content_dir`.
    ///
    /// Only files whose extension is listed in `config.extensions` are
    /// loaded. When `sources` is given and a resource's front matter has
    /// no category, the `{category}` captured from its path is used.
    pub fn load<P: AsRef<Path>>(
        content_dir: P,
        config: &ContentConfig,
        sources: Option<&SourcePattern>,
    ) -> Result<Self> {
        let root = content_dir.as_ref();
        if !root.is_dir() {
            return Err(SiteError::config_error(
                format!(
                    "content directory does not exist: {}",
                    root.display()
                ),
                Some(root.to_path_buf()),
            ));
        }

        let mut resources = Vec::new();
        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = entry.map_err(|e| {
                let path =
                    e.path().map(Path::to_path_buf).unwrap_or_default();
                match e.into_io_error() {
                    Some(source) => SiteError::io_error(path, source),
                    None => SiteError::internal_error(format!(
                        "Failed to walk {}",
                        path.display()
                    )),
                }
            })?;

            if !entry.file_type().is_file()
                || !has_content_extension(entry.path(), &config.extensions)
            {
                continue;
            }

            let relative = entry
                .path()
                .strip_prefix(root)
                .map_err(|e| {
                    SiteError::internal_error(format!(
                        "Failed to determine relative path: {}",
                        e
                    ))
                })?
                .to_path_buf();

            let raw = fs::read_to_string(entry.path()).map_err(|e| {
                SiteError::io_error(entry.path().to_path_buf(), e)
            })?;
            let mut resource = Resource::parse(relative, &raw)?;

            if let Some(category) = sources
                .and_then(|pattern| pattern.captures(resource.path()))
                .and_then(|mut captures| captures.remove("category"))
            {
                if resource.fill_category(CategoryValue::Text(category)) {
                    debug!(
                        "Category of {} taken from its source path",
                        resource.path().display()
                    );
                }
            }

            debug!(
                "Loaded {} (category: {})",
                resource.path().display(),
                resource
                    .front_matter()
                    .category
                    .as_ref()
                    .map_or_else(|| "none".to_string(), ToString::to_string)
            );
            resources.push(resource);
        }

        info!(
            "Loaded {} resources from {}",
            resources.len(),
            root.display()
        );

        Ok(Self {
            root: root.to_path_buf(),
            resources,
        })
    }

    /// The content directory the collection was read from.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// All resources, in path order.
    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    /// Looks up a resource by its path relative to the content directory.
    pub fn get<P: AsRef<Path>>(&self, path: P) -> Option<&Resource> {
        self.resources
            .iter()
            .find(|resource| resource.path() == path.as_ref())
    }

    /// Number of resources.
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    /// Whether the collection holds no resources.
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

fn has_content_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            extensions
                .iter()
                .any(|allowed| allowed.trim_start_matches('.') == ext)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::traits::Categorized;
    use tempfile::TempDir;

    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn content_config() -> ContentConfig {
        ContentConfig {
            extensions: vec!["md".to_string(), "markdown".to_string()],
        }
    }

    #[test]
    fn test_load_filters_extensions_and_sorts() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write(root, "b.md", "---\ncategory: b\n---\n");
        write(root, "a.markdown", "---\ncategory: a\n---\n");
        write(root, "style.css", "body {}");
        write(root, "nested/c.md", "# C");

        let collection =
            ContentCollection::load(root, &content_config(), None).unwrap();
        let paths: Vec<_> = collection
            .resources()
            .iter()
            .map(|r| r.path().to_path_buf())
            .collect();

        assert_eq!(
            paths,
            vec![
                PathBuf::from("a.markdown"),
                PathBuf::from("b.md"),
                PathBuf::from("nested/c.md"),
            ]
        );
        assert_eq!(collection.len(), 3);
        assert_eq!(collection.root(), root);
    }

    #[test]
    fn test_category_from_source_path() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write(root, "posts/jars/candy.markdown", "Body");
        write(
            root,
            "posts/jars/override.markdown",
            "---\ncategory: tins\n---\n",
        );
        write(root, "index.md", "Home");

        let pattern = SourcePattern::parse("posts/{category}/{title}").unwrap();
        let collection =
            ContentCollection::load(root, &content_config(), Some(&pattern))
                .unwrap();

        assert_eq!(
            collection.get("posts/jars/candy.markdown").unwrap().category(),
            Some(&CategoryValue::from("jars"))
        );
        assert_eq!(
            collection
                .get("posts/jars/override.markdown")
                .unwrap()
                .category(),
            Some(&CategoryValue::from("tins"))
        );
        assert!(collection.get("index.md").unwrap().category().is_none());
    }

    #[test]
    fn test_missing_directory() {
        let temp_dir = TempDir::new().unwrap();
        let err = ContentCollection::load(
            temp_dir.path().join("missing"),
            &content_config(),
            None,
        )
        .unwrap_err();
        assert!(matches!(err, SiteError::ConfigError { .. }));
    }

    #[test]
    fn test_bad_resource_fails_the_load() {
        let temp_dir = TempDir::new().unwrap();
        write(temp_dir.path(), "bad.md", "---\ncategory: [a, b]\n---\n");

        let err =
            ContentCollection::load(temp_dir.path(), &content_config(), None)
                .unwrap_err();
        assert!(err.to_string().contains("bad.md"));
    }

    #[test]
    fn test_extension_with_leading_dot() {
        assert!(has_content_extension(
            Path::new("a.markdown"),
            &[".markdown".to_string()]
        ));
        assert!(!has_content_extension(Path::new("README"), &["md".to_string()]));
    }
}
