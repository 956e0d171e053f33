// Copyright © 2024 Sitetaxon. All rights reserved.
// SPDX-License-Identifier: Apache-2.0 OR MIT

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn sitetaxon(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("sitetaxon").unwrap();
    let _ = cmd.current_dir(dir.path());
    let _ = cmd.env_remove("AWS_ACCESS_KEY").env_remove("AWS_SECRET");
    cmd
}

#[test]
fn test_categories_from_front_matter_and_paths() {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("source");
    write(&source, "posts/jars/candy.markdown", "Candy in jars.");
    write(&source, "posts/bags/paper.markdown", "---\ntitle: Paper\n---\n");
    write(&source, "posts/jars/glass.markdown", "Glass jars.");
    write(&source, "shop.md", "---\ncategory: Shop\n---\nOpening hours.");
    write(&source, "feed.xml", "<feed/>");

    let _ = sitetaxon(&dir)
        .arg("categories")
        .assert()
        .success()
        .stdout("Shop\nbags\njars\n");
}

#[test]
fn test_categories_json_with_explicit_content_dir() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "site/a.md", "---\ncategory: b\n---\n");
    write(dir.path(), "site/b.md", "---\ncategory: a\n---\n");
    write(dir.path(), "site/c.md", "---\ncategory: b\n---\n");

    let _ = sitetaxon(&dir)
        .args(["categories", "--content", "site", "--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"a\",").and(predicate::str::contains("\"b\"")));
}

#[test]
fn test_empty_content_prints_nothing() {
    let dir = TempDir::new().unwrap();
    fs::create_dir(dir.path().join("source")).unwrap();

    let _ = sitetaxon(&dir)
        .arg("categories")
        .assert()
        .success()
        .stdout("");
}

#[test]
fn test_incomparable_categories_fail() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "source/a.md", "---\ncategory: news\n---\n");
    write(dir.path(), "source/b.md", "---\ncategory: 2019\n---\n");

    let _ = sitetaxon(&dir)
        .arg("categories")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Cannot order category"));
}

#[test]
fn test_missing_content_dir_fails() {
    let dir = TempDir::new().unwrap();

    let _ = sitetaxon(&dir)
        .arg("categories")
        .assert()
        .failure()
        .stderr(predicate::str::contains("content directory does not exist"));
}

#[test]
fn test_config_file_in_working_directory() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "sitetaxon.toml",
        "content_dir = \"content\"\n\n[blog]\nsources = \"articles/{category}/{title}\"\n",
    );
    write(dir.path(), "content/articles/tins/round.md", "Round tins.");

    let _ = sitetaxon(&dir)
        .arg("categories")
        .assert()
        .success()
        .stdout("tins\n");
}

#[test]
fn test_embedded_secret_is_rejected() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "sitetaxon.toml",
        "[deploy]\nsecret_access_key = \"do-not-store-me\"\n",
    );

    let _ = sitetaxon(&dir)
        .arg("config")
        .assert()
        .failure()
        .stderr(predicate::str::contains("deploy.secret_access_key"))
        .stderr(predicate::str::contains("do-not-store-me").not());
}

#[test]
fn test_build_profile_requires_credentials() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "sitetaxon.toml",
        "[deploy.storage]\nbucket = \"candy-shop\"\nregion = \"eu-central-1\"\n",
    );

    let _ = sitetaxon(&dir)
        .args(["config", "--profile", "build"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("AWS_ACCESS_KEY"));

    let _ = sitetaxon(&dir)
        .args(["config", "--profile", "build"])
        .env("AWS_ACCESS_KEY", "AKIDEXAMPLE")
        .env("AWS_SECRET", "wJalrXUtnFEMI")
        .assert()
        .success()
        .stdout(predicate::str::contains("bucket = \"candy-shop\""))
        .stdout(predicate::str::contains("# deploy credentials: available"))
        .stdout(predicate::str::contains("wJalrXUtnFEMI").not());
}

#[test]
fn test_env_override() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "elsewhere/x.md", "---\ncategory: moved\n---\n");

    let _ = sitetaxon(&dir)
        .arg("categories")
        .env("SITETAXON_CONTENT_DIR", "elsewhere")
        .assert()
        .success()
        .stdout("moved\n");
}

#[test]
fn test_unrelated_prefixed_env_variable_is_ignored() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "source/x.md", "---\ncategory: kept\n---\n");

    let _ = sitetaxon(&dir)
        .arg("categories")
        .env("SITETAXON_LOG", "debug")
        .assert()
        .success()
        .stdout("kept\n");
}

#[test]
fn test_large_mixed_collection_reports_error() {
    let dir = TempDir::new().unwrap();
    for i in 0..150 {
        let category = if i % 3 == 0 {
            format!("{}", i)
        } else {
            format!("t{}", i)
        };
        write(
            dir.path(),
            &format!("source/{:03}.md", i),
            &format!("---\ncategory: {}\n---\n", category),
        );
    }

    let _ = sitetaxon(&dir)
        .arg("categories")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Cannot order category"));
}
