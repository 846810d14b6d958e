//! Executor configuration: defaults, optional rc file, env overlay.
//!
//! Everything the transport needs to know about its surroundings lives in
//! one object validated at executor construction. Nothing here mutates the
//! process environment; the runtime root is handed to the subprocess builder
//! explicitly.

use std::{
    collections::HashMap,
    env, fs,
    io::{BufRead, BufReader},
    path::{Path, PathBuf},
};

use anyhow::{bail, Result};
use directories::BaseDirs;

const CONFIG_KEYS: &[&str] = &[
    "MATRUN_RUNTIME_ROOT",
    "MATRUN_WORK_DIR",
    "MATRUN_AUTO_CONVERT",
    "MATRUN_RETURN_INPUTS",
];

/// Typed view over the key/value configuration.
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// MATLAB runtime installation root, if known. Only used to decide
    /// whether a project that names a required runtime version can run.
    pub runtime_root: Option<PathBuf>,
    /// Working directory for the request/response exchange. The fixed-name
    /// response file lives here, so at most one invocation may use a given
    /// working directory at a time.
    pub work_dir: PathBuf,
    /// Promote numeric arguments to float before transmission.
    pub auto_convert: bool,
    /// Keep the sent argument list on the result, for test-case generation.
    pub return_inputs: bool,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            runtime_root: None,
            work_dir: env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            auto_convert: true,
            return_inputs: false,
        }
    }
}

impl ExecutorConfig {
    /// Read the rc file (if present) and overlay matching environment
    /// variables, which take precedence.
    pub fn load() -> Result<Self> {
        let mut map = HashMap::new();

        let rc = default_config_path();
        if rc.exists() {
            let file = fs::File::open(&rc)?;
            for line in BufReader::new(file).lines().map_while(|l| l.ok()) {
                let line = line.trim();
                if line.is_empty() || line.starts_with('#') {
                    continue;
                }
                if let Some((k, v)) = line.split_once('=') {
                    map.insert(k.trim().to_string(), v.trim().to_string());
                }
            }
        }

        for (k, v) in env::vars() {
            if CONFIG_KEYS.contains(&k.as_str()) {
                map.insert(k, v);
            }
        }

        Ok(Self::from_map(&map))
    }

    fn from_map(map: &HashMap<String, String>) -> Self {
        let defaults = Self::default();
        Self {
            runtime_root: map.get("MATRUN_RUNTIME_ROOT").map(PathBuf::from),
            work_dir: map
                .get("MATRUN_WORK_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.work_dir),
            auto_convert: map
                .get("MATRUN_AUTO_CONVERT")
                .map(|v| v.eq_ignore_ascii_case("true"))
                .unwrap_or(defaults.auto_convert),
            return_inputs: map
                .get("MATRUN_RETURN_INPUTS")
                .map(|v| v.eq_ignore_ascii_case("true"))
                .unwrap_or(defaults.return_inputs),
        }
    }

    /// One-shot validation, called when an executor is built.
    pub fn validate(&self) -> Result<()> {
        if !self.work_dir.is_dir() {
            bail!("working directory '{}' does not exist", self.work_dir.display());
        }
        if let Some(root) = &self.runtime_root {
            if !root.is_dir() {
                bail!("runtime root '{}' does not exist", root.display());
            }
        }
        Ok(())
    }

    pub fn with_work_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.work_dir = dir.as_ref().to_path_buf();
        self
    }

    pub fn with_return_inputs(mut self, keep: bool) -> Self {
        self.return_inputs = keep;
        self
    }
}

fn default_config_path() -> PathBuf {
    let base = BaseDirs::new()
        .map(|b| b.config_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("~/.config"));
    base.join("matrun").join(".matrunrc")
}
