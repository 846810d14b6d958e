//! The value object handed back to callers, and its persistence.
//!
//! A serialized result doubles as a regression test case: `outputs` is the
//! golden data and `inputs` (kept when the executor is configured for it)
//! replays the call. Round-tripping must preserve array dtype and shape,
//! which plain JSON cannot express, hence the tagged codec in
//! [`crate::value::json`].

use std::{collections::BTreeMap, fs, path::Path};

use anyhow::{anyhow, bail, Context, Result};
use serde_json::json;

use crate::value::{compare, json as value_json, Value};

/// Outcome of one invocation. Immutable once constructed; `outputs` is
/// populated only when `return_code` is zero.
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    pub return_code: i32,
    /// Raw text captured from the callee's standard output.
    pub execution_log: String,
    pub function_name: String,
    pub outputs: BTreeMap<String, Value>,
    /// Which project produced this result, for cross-project comparison.
    pub project_name: String,
    /// The argument values actually sent, when explicitly requested.
    pub inputs: Vec<Value>,
}

impl ExecutionResult {
    pub fn succeeded(
        execution_log: String,
        function_name: &str,
        project_name: &str,
        outputs: BTreeMap<String, Value>,
        inputs: Vec<Value>,
    ) -> Self {
        Self {
            return_code: 0,
            execution_log,
            function_name: function_name.to_string(),
            outputs,
            project_name: project_name.to_string(),
            inputs,
        }
    }

    pub fn failed(
        return_code: i32,
        execution_log: String,
        function_name: &str,
        project_name: &str,
        inputs: Vec<Value>,
    ) -> Self {
        debug_assert!(return_code != 0);
        Self {
            return_code,
            execution_log,
            function_name: function_name.to_string(),
            outputs: BTreeMap::new(),
            project_name: project_name.to_string(),
            inputs,
        }
    }

    pub fn success(&self) -> bool {
        self.return_code == 0
    }

    /// Output-level equality under the lossy-serialization-tolerant rules,
    /// ignoring logs and identity fields.
    pub fn compare_results(&self, other: &ExecutionResult) -> bool {
        compare::maps_equal(&self.outputs, &other.outputs)
    }

    pub fn to_json(&self) -> Result<String> {
        let doc = json!({
            "return_code": self.return_code,
            "execution_log": self.execution_log,
            "function_name": self.function_name,
            "project_name": self.project_name,
            "outputs": self
                .outputs
                .iter()
                .map(|(k, v)| (k.clone(), value_json::encode(v)))
                .collect::<serde_json::Map<_, _>>(),
            "inputs": self.inputs.iter().map(value_json::encode).collect::<Vec<_>>(),
        });
        serde_json::to_string_pretty(&doc).context("serializing execution result")
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let doc: serde_json::Value =
            serde_json::from_str(text).context("parsing execution result document")?;
        let field = |name: &str| {
            doc.get(name)
                .ok_or_else(|| anyhow!("result document is missing '{}'", name))
        };

        let return_code = field("return_code")?
            .as_i64()
            .ok_or_else(|| anyhow!("'return_code' must be an integer"))? as i32;
        let execution_log = field("execution_log")?
            .as_str()
            .ok_or_else(|| anyhow!("'execution_log' must be a string"))?
            .to_string();
        let function_name = field("function_name")?
            .as_str()
            .ok_or_else(|| anyhow!("'function_name' must be a string"))?
            .to_string();
        let project_name = field("project_name")?
            .as_str()
            .ok_or_else(|| anyhow!("'project_name' must be a string"))?
            .to_string();

        let mut outputs = BTreeMap::new();
        let raw_outputs = field("outputs")?
            .as_object()
            .ok_or_else(|| anyhow!("'outputs' must be a mapping"))?;
        for (k, v) in raw_outputs {
            outputs.insert(k.clone(), value_json::decode(v)?);
        }

        let inputs = field("inputs")?
            .as_array()
            .ok_or_else(|| anyhow!("'inputs' must be a sequence"))?
            .iter()
            .map(value_json::decode)
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            return_code,
            execution_log,
            function_name,
            outputs,
            project_name,
            inputs,
        })
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        fs::write(path, self.to_json()?)
            .with_context(|| format!("writing result to {}", path.display()))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading result from {}", path.display()))?;
        Self::from_json(&text)
    }

    /// Self-test: write to a temp file, reload, and require equality with
    /// the original. Run after real invocations as a correctness gate.
    pub fn verify_serialization(&self) -> Result<()> {
        let file = tempfile::Builder::new()
            .suffix(".json")
            .tempfile()
            .context("creating serialization check file")?;
        self.save(file.path())?;
        let reloaded = Self::load(file.path())?;
        if reloaded != *self {
            bail!(
                "result for '{}' did not survive a serialization round trip",
                self.function_name
            );
        }
        Ok(())
    }
}

// Identity and outputs; the inputs list is replay data, not identity.
impl PartialEq for ExecutionResult {
    fn eq(&self, other: &Self) -> bool {
        self.return_code == other.return_code
            && self.execution_log == other.execution_log
            && self.function_name == other.function_name
            && self.project_name == other.project_name
            && compare::maps_equal(&self.outputs, &other.outputs)
    }
}
