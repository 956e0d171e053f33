// Copyright © 2024 Sitetaxon. All rights reserved.
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! # Sitetaxon CLI
//!
//! Entry point of the `sitetaxon` binary. Initialises the logger from the
//! verbosity flags and `RUST_LOG`, then runs the selected command.

use anyhow::Context;
use log::info;
use sitetaxon::cli;
use std::io::{self, Write};

fn init_logger(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(level),
    )
    .init();
}

fn run(matches: &clap::ArgMatches) -> anyhow::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    let command = matches.subcommand_name().unwrap_or_default().to_string();
    cli::execute(matches, &mut out)
        .with_context(|| format!("`{}` failed", command))?;
    out.flush().context("Failed to flush output")?;

    info!("Sitetaxon completed successfully");
    Ok(())
}

fn main() {
    let matches = cli::build().get_matches();
    init_logger(matches.get_count("verbose"));

    if let Err(err) = run(&matches) {
        eprintln!("Error: {:#}", err);
        std::process::exit(1);
    }
}
