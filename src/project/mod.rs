//! Compiled-project metadata: the binary handle, the function registry
//! loaded from `functions.json`, and the bits of on-disk convention the
//! executor needs (required runtime version, recorded test cases).
//!
//! The registry is built once when the project is opened and is immutable
//! afterwards; there is no runtime discovery beyond this map.

use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{anyhow, bail, Context, Result};
use serde::Deserialize;

use crate::config::ExecutorConfig;

pub mod function;

pub use function::{CompiledFunction, Param};

/// One entry of the `functions.json` metadata document.
#[derive(Debug, Clone, Deserialize)]
pub struct FunctionInfo {
    #[serde(default)]
    pub input: Vec<String>,
    #[serde(default)]
    pub output: Vec<String>,
}

/// A project produced by the MATLAB compiler: a binary next to its
/// `<binary>_wrapper.m` dispatch script and a `functions.json` document.
#[derive(Debug, Clone)]
pub struct CompiledProject {
    name: String,
    compiled_dir: PathBuf,
    binary: PathBuf,
    functions: HashMap<String, CompiledFunction>,
    required_runtime_version: Option<String>,
}

impl CompiledProject {
    /// Open a project from its wrapper file path. The binary is the wrapper
    /// path with the `_wrapper.m` suffix removed and must exist.
    pub fn open(wrapper_file: impl AsRef<Path>) -> Result<Self> {
        let wrapper = wrapper_file.as_ref();
        let wrapper_name = wrapper
            .to_str()
            .ok_or_else(|| anyhow!("wrapper path is not valid UTF-8"))?;
        let binary = match wrapper_name.strip_suffix("_wrapper.m") {
            Some(stem) => PathBuf::from(stem),
            None => bail!("'{}' is not a project wrapper file", wrapper.display()),
        };
        if !binary.exists() {
            bail!("no such binary: '{}'", binary.display());
        }
        let compiled_dir = binary
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        let name = compiled_dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let functions = load_functions(&compiled_dir.join("functions.json"))?;
        let required_runtime_version = read_runtime_version(&compiled_dir.join("readme.txt"));

        Ok(Self {
            name,
            compiled_dir,
            binary,
            functions,
            required_runtime_version,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn binary_path(&self) -> &Path {
        &self.binary
    }

    pub fn compiled_dir(&self) -> &Path {
        &self.compiled_dir
    }

    /// Runtime version the binary was compiled against, e.g. "2023a",
    /// parsed from the compiler-generated readme.
    pub fn required_runtime_version(&self) -> Option<&str> {
        self.required_runtime_version.as_deref()
    }

    /// Whether this project is eligible to execute under the given
    /// configuration: the required runtime version must be known and a
    /// runtime root must be configured.
    pub fn can_execute(&self, config: &ExecutorConfig) -> bool {
        self.required_runtime_version.is_some() && config.runtime_root.is_some()
    }

    pub fn functions(&self) -> &HashMap<String, CompiledFunction> {
        &self.functions
    }

    pub fn function(&self, name: &str) -> Result<&CompiledFunction> {
        self.functions
            .get(name)
            .ok_or_else(|| anyhow!("no function '{}' in project '{}'", name, self.name))
    }

    /// Function names containing the search string.
    pub fn find_functions(&self, search: &str) -> Vec<&str> {
        let mut found: Vec<&str> = self
            .functions
            .keys()
            .filter(|name| name.contains(search))
            .map(String::as_str)
            .collect();
        found.sort_unstable();
        found
    }

    /// Recorded test-case documents for this project: `*.json` under
    /// `<base>/tests/<project name>/`, where base is three levels above the
    /// wrapper file.
    pub fn test_case_files(&self) -> Vec<PathBuf> {
        let base = self
            .compiled_dir
            .ancestors()
            .nth(2)
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.compiled_dir.clone());
        let dir = base.join("tests").join(&self.name);
        let mut files: Vec<PathBuf> = match fs::read_dir(&dir) {
            Ok(rd) => rd
                .filter_map(|e| e.ok().map(|e| e.path()))
                .filter(|p| p.extension().and_then(|s| s.to_str()) == Some("json"))
                .collect(),
            Err(_) => Vec::new(),
        };
        files.sort();
        files
    }
}

fn load_functions(path: &Path) -> Result<HashMap<String, CompiledFunction>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading function metadata: {}", path.display()))?;
    let data: HashMap<String, FunctionInfo> = serde_json::from_str(&text)
        .with_context(|| format!("parsing function metadata: {}", path.display()))?;
    Ok(data
        .into_iter()
        .map(|(name, info)| {
            let f = CompiledFunction::from_info(&name, &info);
            (name, f)
        })
        .collect())
}

// The compiler-generated readme names the runtime as "MATLAB Runtime(R2023a)".
fn read_runtime_version(path: &Path) -> Option<String> {
    let content = fs::read_to_string(path).ok()?;
    let rest = content.split("MATLAB Runtime(R").nth(1)?;
    let version: String = rest.chars().take_while(|c| *c != ')').collect();
    let valid = version.len() == 5
        && version[..4].chars().all(|c| c.is_ascii_digit())
        && matches!(&version[4..], "a" | "b");
    valid.then_some(version)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runtime_version_parses_from_readme() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let readme = dir.path().join("readme.txt");
        fs::write(&readme, "Requires the MATLAB Runtime(R2023a) to be installed.\n")?;
        assert_eq!(read_runtime_version(&readme), Some("2023a".to_string()));

        fs::write(&readme, "No runtime mentioned here.")?;
        assert_eq!(read_runtime_version(&readme), None);

        fs::write(&readme, "MATLAB Runtime(Rwhatever)")?;
        assert_eq!(read_runtime_version(&readme), None);
        Ok(())
    }

    #[test]
    fn wrapper_suffix_is_required() {
        assert!(CompiledProject::open("somewhere/project.m").is_err());
    }
}
