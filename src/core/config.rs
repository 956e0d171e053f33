//! # Configuration Module
//!
//! Explicit site configuration, built once at startup and handed to the
//! build. Values come from, in order: defaults, a TOML file, the selected
//! profile, environment variables and programmatic overrides.
//!
//! Deployment targets (object storage bucket, CDN distribution, git
//! branch) are plain data here. Credentials never live in the file: the
//! configuration only names the environment variables that hold them,
//! and [`Credentials`] reads those variables when asked. A config file
//! that embeds a credential is rejected.
//!
//! ## Example
//!
//! ```rust,no_run
//! use sitetaxon::core::config::{ConfigBuilder, Profile};
//!
//! let config = ConfigBuilder::new()
//!     .with_file("sitetaxon.toml")
//!     .with_env_prefix("SITETAXON_")
//!     .with_profile(Profile::Build)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(config.read().profile, Profile::Build);
//! ```

use std::collections::HashMap;
use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::warn;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use toml::Value as TomlValue;

use crate::pattern::SourcePattern;
use crate::{Result, SiteError};

/// Configuration shared between the components of a build.
pub type SharedConfig = Arc<RwLock<Config>>;

/// Keys that hold credentials and must never appear in a config file.
const CREDENTIAL_KEYS: &[&str] = &[
    "access_key",
    "access_key_id",
    "aws_access_key",
    "aws_access_key_id",
    "secret",
    "secret_access_key",
    "aws_secret",
    "aws_secret_access_key",
    "password",
    "token",
];

/// Build environments.
///
/// `development` is used while writing content; `build` prepares a
/// deployable site and therefore insists that configured deploy targets
/// have credentials available.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    /// Local authoring.
    #[default]
    Development,
    /// Production build.
    Build,
}

impl std::str::FromStr for Profile {
    type Err = SiteError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "development" => Ok(Profile::Development),
            "build" => Ok(Profile::Build),
            other => Err(SiteError::config_error(
                format!("Unknown profile: {}", other),
                None,
            )),
        }
    }
}

/// The main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default = "default_content_dir")]
    /// Directory holding the site's content files.
    pub content_dir: PathBuf,

    #[serde(default = "default_output_dir")]
    /// Directory the external build framework writes to.
    pub output_dir: PathBuf,

    #[serde(default)]
    /// The current build environment.
    pub profile: Profile,

    #[serde(default)]
    /// Content discovery settings.
    pub content: ContentConfig,

    #[serde(default)]
    /// Blog settings.
    pub blog: BlogConfig,

    #[serde(default)]
    /// Deployment targets.
    pub deploy: DeployConfig,

    #[serde(default)]
    /// Free-form values for the renderer.
    pub custom: HashMap<String, TomlValue>,
}

/// Which files count as content.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ContentConfig {
    #[serde(default = "default_extensions")]
    /// File extensions loaded as resources, with or without a leading dot.
    pub extensions: Vec<String>,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
        }
    }
}

/// Blog settings.
///
/// `sources` and `summary_separator` are used here; the remaining fields
/// are carried for the renderer that produces the pages.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BlogConfig {
    /// Pattern locating posts, e.g. `posts/{category}/{title}`.
    pub sources: String,
    /// Pattern of published post URLs.
    pub permalink: String,
    /// Extension of newly created posts.
    pub default_extension: String,
    /// Layout applied to posts.
    pub layout: String,
    /// Marker separating a post's summary from the rest.
    pub summary_separator: String,
    /// Template of tag index pages.
    pub tag_template: String,
    /// Template of calendar pages.
    pub calendar_template: String,
}

impl Default for BlogConfig {
    fn default() -> Self {
        Self {
            sources: "posts/{category}/{title}".to_string(),
            permalink: "categories/{category}/posts/{title}".to_string(),
            default_extension: ".markdown".to_string(),
            layout: "layout".to_string(),
            summary_separator: "SPLIT_SUMMARY_BEFORE_THIS".to_string(),
            tag_template: "tag.html".to_string(),
            calendar_template: "calendar.html".to_string(),
        }
    }
}

/// Deployment targets and where their credentials come from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeployConfig {
    #[serde(default = "default_access_key_env")]
    /// Environment variable holding the access key id.
    pub access_key_env: String,

    #[serde(default = "default_secret_key_env")]
    /// Environment variable holding the secret access key.
    pub secret_key_env: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Object storage target.
    pub storage: Option<StorageTarget>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// CDN in front of the storage bucket.
    pub cdn: Option<CdnTarget>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Git branch the built site is pushed to.
    pub git: Option<GitTarget>,
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            access_key_env: default_access_key_env(),
            secret_key_env: default_secret_key_env(),
            storage: None,
            cdn: None,
            git: None,
        }
    }
}

impl DeployConfig {
    /// Whether any configured target needs credentials.
    pub fn needs_credentials(&self) -> bool {
        self.storage.is_some() || self.cdn.is_some()
    }
}

/// Object storage bucket the site is synced to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StorageTarget {
    /// Bucket name.
    pub bucket: String,
    /// Bucket region.
    pub region: String,
    #[serde(default)]
    /// Delete remote files that are absent locally.
    pub delete: bool,
}

/// CDN distribution to invalidate after a sync.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CdnTarget {
    /// Distribution identifier.
    pub distribution_id: String,
}

/// Git deployment branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GitTarget {
    #[serde(default = "default_branch")]
    /// Branch name.
    pub branch: String,
}

impl Default for GitTarget {
    fn default() -> Self {
        Self {
            branch: default_branch(),
        }
    }
}

/// A secret value whose `Debug` output is redacted.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    /// The secret itself.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

/// Deploy credentials resolved from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    access_key_id: String,
    secret_access_key: Secret,
}

impl Credentials {
    /// Reads the credentials named by `deploy` from the process environment.
    pub fn from_env(deploy: &DeployConfig) -> Result<Self> {
        Self::from_lookup(deploy, |name| env::var(name).ok())
    }

    /// Resolves the credentials named by `deploy` through `lookup`.
    ///
    /// Missing or empty values are configuration errors naming the variable.
    pub fn from_lookup<F>(deploy: &DeployConfig, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| {
            lookup(name).filter(|v| !v.is_empty()).ok_or_else(|| {
                SiteError::config_error(
                    format!("environment variable {} is not set", name),
                    None,
                )
            })
        };

        Ok(Self {
            access_key_id: read(&deploy.access_key_env)?,
            secret_access_key: Secret(read(&deploy.secret_key_env)?),
        })
    }

    /// The access key id.
    pub fn access_key_id(&self) -> &str {
        &self.access_key_id
    }

    /// The secret access key.
    pub fn secret_access_key(&self) -> &Secret {
        &self.secret_access_key
    }
}

/// Builds a `Config` from a file, the environment and overrides.
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    config_file: Option<PathBuf>,
    env_prefix: Option<String>,
    profile: Option<Profile>,
    overrides: Vec<(String, TomlValue)>,
}

impl ConfigBuilder {
    /// Initialises a new `ConfigBuilder` instance with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads the TOML configuration file at `path`.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Applies environment variables starting with `prefix`.
    ///
    /// The prefix is stripped and the rest lower-cased; `__` separates
    /// sections, so `SITETAXON_BLOG__SOURCES` sets `blog.sources`.
    pub fn with_env_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.env_prefix = Some(prefix.into());
        self
    }

    /// Selects the build profile.
    pub fn with_profile(mut self, profile: Profile) -> Self {
        self.profile = Some(profile);
        self
    }

    /// Overrides a single key, e.g. `("deploy.git.branch", "main")`.
    pub fn with_override<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<TomlValue>,
    {
        self.overrides.push((key.into(), value.into()));
        self
    }

    /// Loads, layers and validates the configuration.
    pub fn build(self) -> Result<SharedConfig> {
        let mut config = match &self.config_file {
            Some(path) => load_from_file(path)?,
            None => Config::default(),
        };

        if let Some(profile) = self.profile {
            config.profile = profile;
        }

        if let Some(prefix) = &self.env_prefix {
            apply_env_overrides(&mut config, prefix)?;
        }

        apply_overrides(&mut config, &self.overrides)?;
        validate_config(&config)?;

        Ok(Arc::new(RwLock::new(config)))
    }
}

impl Config {
    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        validate_config(self)
    }

    /// The parsed blog source pattern.
    pub fn source_pattern(&self) -> Result<SourcePattern> {
        SourcePattern::parse(&self.blog.sources)
    }

    /// Resolves deploy credentials from the environment.
    pub fn credentials(&self) -> Result<Credentials> {
        Credentials::from_env(&self.deploy)
    }

    /// Serialises the configuration as TOML. Credentials are never part of it.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| {
            SiteError::internal_error(format!(
                "Failed to serialise configuration: {}",
                e
            ))
        })
    }

    /// Retrieves a custom configuration value by key, if it exists.
    ///
    /// # Returns
    /// - `Ok(Some(T))` if the key exists and converts to `T`.
    /// - `Ok(None)` if the key does not exist.
    /// - `Err` if the key exists but cannot be converted.
    pub fn get_custom<T: serde::de::DeserializeOwned>(
        &self,
        key: &str,
    ) -> Result<Option<T>> {
        self.custom
            .get(key)
            .map(|v| {
                v.clone().try_into().map_err(|e| {
                    SiteError::config_error(
                        format!("Invalid custom config value: {}", e),
                        None,
                    )
                })
            })
            .transpose()
    }

    /// Sets a custom configuration value for the given key.
    pub fn set_custom<T: Serialize>(
        &mut self,
        key: &str,
        value: T,
    ) -> Result<()> {
        let value = TomlValue::try_from(value).map_err(|e| {
            SiteError::config_error(
                format!("Invalid custom config value: {}", e),
                None,
            )
        })?;
        _ = self.custom.insert(key.to_string(), value);
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            content_dir: default_content_dir(),
            output_dir: default_output_dir(),
            profile: Profile::default(),
            content: ContentConfig::default(),
            blog: BlogConfig::default(),
            deploy: DeployConfig::default(),
            custom: HashMap::new(),
        }
    }
}

// Internal helper functions

fn load_from_file(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path).map_err(|e| {
        SiteError::config_error(
            format!("Failed to read config file: {}", e),
            Some(path.to_path_buf()),
        )
    })?;

    let table: toml::Table = toml::from_str(&content).map_err(|e| {
        SiteError::config_error(
            format!("Failed to parse config file: {}", e),
            Some(path.to_path_buf()),
        )
    })?;

    if let Some(key) = find_credential_key(&table, "") {
        return Err(SiteError::config_error(
            format!(
                "`{}` looks like a credential; name the environment variable \
                 holding it in deploy.access_key_env or deploy.secret_key_env instead",
                key
            ),
            Some(path.to_path_buf()),
        ));
    }

    TomlValue::Table(table).try_into().map_err(|e| {
        SiteError::config_error(
            format!("Failed to parse config file: {}", e),
            Some(path.to_path_buf()),
        )
    })
}

fn find_credential_key(table: &toml::Table, parent: &str) -> Option<String> {
    for (key, value) in table {
        let full = if parent.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", parent, key)
        };
        if CREDENTIAL_KEYS.contains(&key.to_lowercase().as_str()) {
            return Some(full);
        }
        if let TomlValue::Table(inner) = value {
            if let Some(found) = find_credential_key(inner, &full) {
                return Some(found);
            }
        }
    }
    None
}

/// Unknown keys under the prefix are skipped with a warning, since the
/// prefix is shared with variables meant for other consumers.
fn apply_env_overrides(config: &mut Config, prefix: &str) -> Result<()> {
    for (key, value) in env::vars() {
        if let Some(stripped) = key.strip_prefix(prefix) {
            let config_key = stripped
                .trim_start_matches('_')
                .to_lowercase()
                .replace("__", ".");
            if !apply_config_value(config, &config_key, &value)? {
                warn!("Ignoring {}: unknown configuration key {}", key, config_key);
            }
        }
    }
    Ok(())
}

fn apply_overrides(
    config: &mut Config,
    overrides: &[(String, TomlValue)],
) -> Result<()> {
    for (key, value) in overrides {
        let value = match value {
            TomlValue::String(s) => s.clone(),
            TomlValue::Array(items) => items
                .iter()
                .map(|item| match item {
                    TomlValue::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect::<Vec<_>>()
                .join(","),
            other => other.to_string(),
        };
        if !apply_config_value(config, key, &value)? {
            return Err(unknown_key(key));
        }
    }
    Ok(())
}

fn validate_config(config: &Config) -> Result<()> {
    if config.content.extensions.iter().all(|e| e.trim().is_empty()) {
        return Err(SiteError::config_error(
            "No content extensions specified",
            None,
        ));
    }

    let _ = config.source_pattern()?;

    if let Some(storage) = &config.deploy.storage {
        require("deploy.storage.bucket", &storage.bucket)?;
        require("deploy.storage.region", &storage.region)?;
    }
    if let Some(cdn) = &config.deploy.cdn {
        require("deploy.cdn.distribution_id", &cdn.distribution_id)?;
    }
    if let Some(git) = &config.deploy.git {
        require("deploy.git.branch", &git.branch)?;
    }

    if config.deploy.needs_credentials() {
        match (config.profile, config.credentials()) {
            (_, Ok(_)) => {}
            (Profile::Build, Err(e)) => return Err(e),
            (Profile::Development, Err(e)) => {
                warn!("Deploy credentials unavailable: {}", e);
            }
        }
    }

    Ok(())
}

fn require(key: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(SiteError::config_error(
            format!("{} must not be empty", key),
            None,
        ));
    }
    Ok(())
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    value.parse().map_err(|e| {
        SiteError::config_error(
            format!("Invalid {} value '{}': {}", key, value, e),
            None,
        )
    })
}

/// Sets `key` to `value`. Returns `false` when `key` names no setting.
fn apply_config_value(
    config: &mut Config,
    key: &str,
    value: &str,
) -> Result<bool> {
    let value = value.trim_matches('"');
    match key {
        "content_dir" => config.content_dir = PathBuf::from(value),
        "output_dir" => config.output_dir = PathBuf::from(value),
        "profile" => config.profile = value.parse()?,
        _ => match key.split_once('.') {
            Some(("content", key)) => {
                return apply_content_value(&mut config.content, key, value)
            }
            Some(("blog", key)) => {
                return Ok(apply_blog_value(&mut config.blog, key, value))
            }
            Some(("deploy", key)) => {
                return apply_deploy_value(&mut config.deploy, key, value)
            }
            Some(("custom", key)) => {
                _ = config
                    .custom
                    .insert(key.to_string(), TomlValue::String(value.to_string()));
            }
            _ => return Ok(false),
        },
    }
    Ok(true)
}

fn unknown_key(key: &str) -> SiteError {
    SiteError::config_error(format!("Unknown configuration key: {}", key), None)
}

fn apply_content_value(
    config: &mut ContentConfig,
    key: &str,
    value: &str,
) -> Result<bool> {
    match key {
        "extensions" => {
            config.extensions = value
                .split(',')
                .map(str::trim)
                .filter(|e| !e.is_empty())
                .map(String::from)
                .collect();
        }
        _ => return Ok(false),
    }
    Ok(true)
}

fn apply_blog_value(config: &mut BlogConfig, key: &str, value: &str) -> bool {
    let field = match key {
        "sources" => &mut config.sources,
        "permalink" => &mut config.permalink,
        "default_extension" => &mut config.default_extension,
        "layout" => &mut config.layout,
        "summary_separator" => &mut config.summary_separator,
        "tag_template" => &mut config.tag_template,
        "calendar_template" => &mut config.calendar_template,
        _ => return false,
    };
    *field = value.to_string();
    true
}

fn apply_deploy_value(
    config: &mut DeployConfig,
    key: &str,
    value: &str,
) -> Result<bool> {
    match key {
        "access_key_env" => config.access_key_env = value.to_string(),
        "secret_key_env" => config.secret_key_env = value.to_string(),
        "storage.bucket" => {
            config.storage.get_or_insert_with(Default::default).bucket =
                value.to_string()
        }
        "storage.region" => {
            config.storage.get_or_insert_with(Default::default).region =
                value.to_string()
        }
        "storage.delete" => {
            config.storage.get_or_insert_with(Default::default).delete =
                parse_bool("deploy.storage.delete", value)?
        }
        "cdn.distribution_id" => {
            config
                .cdn
                .get_or_insert_with(Default::default)
                .distribution_id = value.to_string()
        }
        "git.branch" => {
            config.git.get_or_insert_with(Default::default).branch =
                value.to_string()
        }
        _ => return Ok(false),
    }
    Ok(true)
}

// Default value functions
fn default_content_dir() -> PathBuf {
    PathBuf::from("source")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("build")
}

fn default_extensions() -> Vec<String> {
    vec!["md".to_string(), "markdown".to_string()]
}

fn default_access_key_env() -> String {
    "AWS_ACCESS_KEY".to_string()
}

fn default_secret_key_env() -> String {
    "AWS_SECRET".to_string()
}

fn default_branch() -> String {
    "master".to_string()
}
