//! End-to-end tests driving the gantry binary.

use assert_cmd::Command;
use assert_fs::prelude::*;
use assert_fs::TempDir;
use predicates::prelude::*;
use std::path::PathBuf;

mod check;
mod mail_test;
mod migrate;
mod reindex;
mod stats;
mod workflow;

/// Test context that provides an isolated gallery for each test
pub struct TestContext {
    pub temp: TempDir,
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

impl TestContext {
    pub fn new() -> Self {
        Self {
            temp: TempDir::new().unwrap(),
        }
    }

    /// Write gallery.yaml rooted in the temp dir. `extra` is appended
    /// after the storage section, so lines indented two spaces extend
    /// it and column-zero lines start new top-level sections.
    pub fn write_config(&self, extra: &str) -> PathBuf {
        let yaml = format!(
            "storage:\n  directory: {}\n{}",
            self.root().display(),
            extra
        );
        let config = self.temp.child("gallery.yaml");
        config.write_str(&yaml).unwrap();
        config.to_path_buf()
    }

    /// The storage root the config points at
    pub fn root(&self) -> PathBuf {
        self.temp.child("gallery").to_path_buf()
    }

    /// Create a Command for running gantry against this context
    pub fn gantry(&self) -> Command {
        #[allow(deprecated)]
        let mut cmd = Command::cargo_bin("gantry").unwrap();
        cmd.current_dir(&self.temp);

        // Keep platform config/data lookups inside the temp dir
        if cfg!(target_os = "windows") {
            cmd.env("APPDATA", self.temp.child("config").to_path_buf());
            cmd.env("LOCALAPPDATA", self.temp.child("data").to_path_buf());
            cmd.env("USERPROFILE", self.temp.path());
        } else if cfg!(target_os = "linux") {
            cmd.env("XDG_CONFIG_HOME", self.temp.child("config").to_path_buf());
            cmd.env("XDG_DATA_HOME", self.temp.child("data").to_path_buf());
            cmd.env("HOME", self.temp.path());
        } else {
            cmd.env("HOME", self.temp.path());
        }

        cmd
    }

    /// Run `gantry migrate` against a written config
    pub fn migrate(&self, config: &std::path::Path) {
        self.gantry()
            .arg("migrate")
            .arg("-c")
            .arg(config)
            .assert()
            .success();
    }
}
