// Copyright © 2024 Sitetaxon. All rights reserved.
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Command-line interface for Sitetaxon
//!
//! Argument parsing and command execution. Output is written to a caller
//! supplied writer so the commands can be exercised without a terminal.
//!
//! ```
//! use sitetaxon::cli;
//!
//! let matches = cli::build().get_matches_from(vec![
//!     "sitetaxon",
//!     "categories",
//!     "--format",
//!     "json",
//! ]);
//!
//! let categories = matches.subcommand_matches("categories").unwrap();
//! assert_eq!(categories.get_one::<String>("format").unwrap(), "json");
//! ```

use crate::core::config::{ConfigBuilder, Profile, SharedConfig};
use crate::{Result, Site, SiteError};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use log::{debug, info};
use std::io::Write;
use std::path::{Path, PathBuf};

/// The current version of Sitetaxon, as defined in `Cargo.toml`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Configuration file picked up from the working directory when present.
pub const DEFAULT_CONFIG_FILE: &str = "sitetaxon.toml";

/// Prefix of environment variables that override configuration values.
pub const ENV_PREFIX: &str = "SITETAXON_";

fn config_arg() -> Arg {
    Arg::new("config")
        .short('c')
        .long("config")
        .help("Configuration file (defaults to ./sitetaxon.toml when present)")
        .value_parser(value_parser!(PathBuf))
}

fn profile_arg() -> Arg {
    Arg::new("profile")
        .short('p')
        .long("profile")
        .help("Build profile")
        .value_parser(["development", "build"])
}

/// Builds and configures the Sitetaxon command-line interface.
pub fn build() -> Command {
    debug!("Building CLI command structure");

    Command::new("sitetaxon")
        .author("Sitetaxon Contributors")
        .about("Derives the category set of a static site's content.")
        .version(VERSION)
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Increase log output (-v, -vv)")
                .action(ArgAction::Count),
        )
        .subcommand(
            Command::new("categories")
                .about("List the distinct categories of the content, sorted")
                .arg(config_arg())
                .arg(profile_arg())
                .arg(
                    Arg::new("content")
                        .short('d')
                        .long("content")
                        .help("Content directory (overrides the configuration)")
                        .value_parser(value_parser!(PathBuf)),
                )
                .arg(
                    Arg::new("format")
                        .short('f')
                        .long("format")
                        .help("Output format")
                        .value_parser(["text", "json"])
                        .default_value("text"),
                ),
        )
        .subcommand(
            Command::new("config")
                .about("Print the resolved configuration")
                .arg(config_arg())
                .arg(profile_arg()),
        )
}

/// Executes the command described by `matches`, writing results to `out`.
pub fn execute<W: Write>(matches: &ArgMatches, out: &mut W) -> Result<()> {
    match matches.subcommand() {
        Some(("categories", sub_matches)) => {
            let config = load_config(sub_matches)?;
            let format = sub_matches
                .get_one::<String>("format")
                .map_or("text", String::as_str);
            list_categories(config, format, out)
        }
        Some(("config", sub_matches)) => {
            let config = load_config(sub_matches)?;
            print_config(&config, out)
        }
        _ => Err(SiteError::internal_error("Unknown command")),
    }
}

fn load_config(matches: &ArgMatches) -> Result<SharedConfig> {
    let mut builder = ConfigBuilder::new().with_env_prefix(ENV_PREFIX);

    match matches.get_one::<PathBuf>("config") {
        Some(path) => builder = builder.with_file(path),
        None if Path::new(DEFAULT_CONFIG_FILE).is_file() => {
            builder = builder.with_file(DEFAULT_CONFIG_FILE)
        }
        None => {}
    }

    if let Some(profile) = matches.get_one::<String>("profile") {
        builder = builder.with_profile(profile.parse::<Profile>()?);
    }

    if let Ok(Some(content)) = matches.try_get_one::<PathBuf>("content") {
        builder = builder
            .with_override("content_dir", content.display().to_string());
    }

    builder.build()
}

fn list_categories<W: Write>(
    config: SharedConfig,
    format: &str,
    out: &mut W,
) -> Result<()> {
    let content_dir = config.read().content_dir.clone();
    info!("Extracting categories from {}", content_dir.display());

    let categories = Site::new(config).categories()?;
    match format {
        "json" => {
            let json = serde_json::to_string_pretty(&categories)
                .map_err(|e| SiteError::internal_error(e.to_string()))?;
            writeln!(out, "{}", json)?;
        }
        _ => {
            for category in &categories {
                writeln!(out, "{}", category)?;
            }
        }
    }
    Ok(())
}

fn print_config<W: Write>(config: &SharedConfig, out: &mut W) -> Result<()> {
    let config = config.read();
    write!(out, "{}", config.to_toml_string()?)?;

    let status = if !config.deploy.needs_credentials() {
        "not required".to_string()
    } else {
        match config.credentials() {
            Ok(_) => "available".to_string(),
            Err(e) => format!("unavailable ({})", e),
        }
    };
    writeln!(out, "# deploy credentials: {}", status)?;
    Ok(())
}
