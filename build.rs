// Copyright © 2024 Sitetaxon. All rights reserved.
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Build script that refuses to compile with a toolchain older than the
//! minimum supported Rust version.

use std::process;

/// Minimum supported Rust version, kept in step with `rust-version` in `Cargo.toml`.
const MIN_RUST_VERSION: &str = "1.74.0";

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    if version_check::is_min_version(MIN_RUST_VERSION) != Some(true) {
        eprintln!(
            "sitetaxon requires Rust {} or newer; please update your toolchain",
            MIN_RUST_VERSION
        );
        process::exit(1);
    }
}
