//! File-based subprocess transport.
//!
//! One invocation is one strictly ordered sequence: write and sync the
//! request file, spawn the compiled binary with the request path as its only
//! argument, block until it exits, read and delete the fixed-name response
//! file. The response name is not unique, so a working directory supports
//! exactly one invocation at a time; a leftover response file from an
//! earlier run is a broken invariant and fails the call up front.

use std::{
    fs,
    io::Write,
    path::PathBuf,
    process::{Command, Stdio},
};

use anyhow::{Context, Result};
use serde_json::json;
use tracing::{debug, warn};

use crate::{
    config::ExecutorConfig,
    errors::ExecuteError,
    project::CompiledProject,
    value::{self, json as value_json, Value},
};

pub mod reconstruct;
pub mod result;

pub use result::ExecutionResult;

/// Fixed name of the response file the callee writes into the working
/// directory.
pub const RESULT_FILE_NAME: &str = "results.json";

/// Executes functions of one compiled project.
#[derive(Debug, Clone)]
pub struct Executor {
    binary: PathBuf,
    project_name: String,
    config: ExecutorConfig,
}

impl Executor {
    /// Configuration is validated here, once, not per call.
    pub fn new(project: &CompiledProject, config: ExecutorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            binary: project.binary_path().to_path_buf(),
            project_name: project.name().to_string(),
            config,
        })
    }

    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    /// Run one function call with an already-bound ordered argument list.
    ///
    /// Call-shape problems never reach this point; here the only `Err`
    /// outcomes are broken working-directory invariants and local I/O
    /// failures. A callee that launches and fails is a successful transport
    /// round and comes back as a failed [`ExecutionResult`].
    pub fn execute(
        &self,
        function_name: &str,
        output_count: usize,
        args: Vec<Value>,
    ) -> Result<ExecutionResult> {
        let response_path = self.config.work_dir.join(RESULT_FILE_NAME);
        if response_path.exists() {
            return Err(ExecuteError::StaleResultFile(response_path).into());
        }

        let varargin: Vec<Value> = if self.config.auto_convert {
            args.into_iter()
                .enumerate()
                .map(|(i, a)| value::coerce_argument(i, a))
                .collect()
        } else {
            args
        };

        debug!(
            function = function_name,
            output_count,
            inputs = varargin.len(),
            "executing"
        );

        // The temp file guard deletes the request on every exit path.
        let mut request = tempfile::Builder::new()
            .prefix("request-")
            .suffix(".json")
            .tempfile_in(&self.config.work_dir)
            .map_err(ExecuteError::RequestWrite)?;
        let document = json!({
            "function_name": function_name,
            "output_count": output_count,
            "varargin": varargin.iter().map(value_json::encode).collect::<Vec<_>>(),
        });
        request
            .as_file_mut()
            .write_all(document.to_string().as_bytes())
            .map_err(ExecuteError::RequestWrite)?;
        // The subprocess reads this path; make sure it is on disk first.
        request
            .as_file()
            .sync_all()
            .map_err(ExecuteError::RequestWrite)?;

        let inputs = if self.config.return_inputs {
            varargin.clone()
        } else {
            Vec::new()
        };

        // Environment is inherited; stdout is captured, stderr is not.
        let spawned = Command::new(&self.binary)
            .arg(request.path())
            .current_dir(&self.config.work_dir)
            .stdout(Stdio::piped())
            .spawn();
        let child = match spawned {
            Ok(child) => child,
            Err(e) => {
                warn!(binary = %self.binary.display(), error = %e, "failed to launch callee");
                return Ok(ExecutionResult::failed(
                    -1,
                    format!("failed to launch '{}': {}", self.binary.display(), e),
                    function_name,
                    &self.project_name,
                    inputs,
                ));
            }
        };
        let output = child
            .wait_with_output()
            .context("waiting for callee to exit")?;
        let return_code = output.status.code().unwrap_or(-1);
        let execution_log = String::from_utf8_lossy(&output.stdout).into_owned();
        debug!(return_code, "callee exited");

        if return_code != 0 {
            warn!(function = function_name, return_code, "nonzero exit, no results returned");
            return Ok(ExecutionResult::failed(
                return_code,
                execution_log,
                function_name,
                &self.project_name,
                inputs,
            ));
        }

        let text = fs::read_to_string(&response_path).map_err(|e| {
            ExecuteError::MalformedResponse(format!(
                "callee exited 0 but '{}' could not be read: {}",
                response_path.display(),
                e
            ))
        })?;
        // Delete before parsing so a parse failure cannot leak a stale
        // response into the next call.
        let _ = fs::remove_file(&response_path);

        let (names, values) = parse_response(&text)?;
        let outputs = reconstruct::reconstruct_outputs(&names, values, output_count);

        Ok(ExecutionResult::succeeded(
            execution_log,
            function_name,
            &self.project_name,
            outputs,
            inputs,
        ))
    }
}

/// Split the response document into output names and the raw values field.
///
/// The document holds a single two-element `results` record: a
/// delimiter-joined names string (commas and whitespace both occur) and a
/// values field of ambiguous arity.
fn parse_response(text: &str) -> Result<(Vec<String>, Value)> {
    let doc: serde_json::Value = serde_json::from_str(text)
        .map_err(|e| ExecuteError::MalformedResponse(e.to_string()))?;
    let pair = doc
        .get("results")
        .and_then(|r| r.as_array())
        .filter(|p| p.len() == 2)
        .ok_or_else(|| {
            ExecuteError::MalformedResponse("expected a two-element 'results' record".to_string())
        })?;
    let joined = pair[0].as_str().ok_or_else(|| {
        ExecuteError::MalformedResponse("output names must be a string".to_string())
    })?;
    let names: Vec<String> = joined
        .replace(',', " ")
        .split_whitespace()
        .map(str::to_string)
        .collect();
    let values = value_json::decode(&pair[1])
        .map_err(|e| ExecuteError::MalformedResponse(e.to_string()))?;
    Ok((names, values))
}
