//! A callable function of a compiled project: declared inputs and outputs,
//! the positional/named binding algorithm, and the per-call builder.

use anyhow::Result;
use tracing::warn;

use crate::{
    errors::BindError,
    execute::{Executor, ExecutionResult},
    value::{Value, ValueKind},
};

use super::FunctionInfo;

/// One declared input. The kind is advisory metadata and is usually absent;
/// it is checked softly when present, never enforced.
#[derive(Debug, Clone)]
pub struct Param {
    pub name: String,
    pub kind: Option<ValueKind>,
}

/// Static descriptor of a function inside a compiled project. Built once at
/// project load from `functions.json`, immutable afterwards.
#[derive(Debug, Clone)]
pub struct CompiledFunction {
    name: String,
    inputs: Vec<Param>,
    output_names: Vec<String>,
}

impl CompiledFunction {
    /// Input entries may carry an optional kind after a colon
    /// ("signal:array"); bare names are unconstrained.
    pub fn from_info(name: &str, info: &FunctionInfo) -> Self {
        let inputs = info
            .input
            .iter()
            .map(|entry| match entry.split_once(':') {
                Some((n, k)) => Param {
                    name: n.trim().to_string(),
                    kind: ValueKind::parse(k.trim()),
                },
                None => Param {
                    name: entry.trim().to_string(),
                    kind: None,
                },
            })
            .collect();
        Self {
            name: name.to_string(),
            inputs,
            output_names: info.output.clone(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn inputs(&self) -> &[Param] {
        &self.inputs
    }

    pub fn output_names(&self) -> &[String] {
        &self.output_names
    }

    /// Default number of outputs to request; a call may override it.
    pub fn output_count(&self) -> usize {
        self.output_names.len()
    }

    /// Start building a call to this function.
    pub fn call(&self) -> FunctionCall<'_> {
        FunctionCall {
            function: self,
            positional: Vec::new(),
            named: Vec::new(),
            output_count: None,
        }
    }

    /// Resolve positional and named arguments against the declared inputs,
    /// producing a gap-free ordered argument list.
    ///
    /// Named arguments are applied first; remaining unset slots are then
    /// filled from positional arguments in declared order. Trailing unset
    /// parameters are a legal shortened call, but a set parameter may never
    /// follow an unset one.
    pub fn bind(
        &self,
        positional: Vec<Value>,
        named: Vec<(String, Value)>,
    ) -> Result<Vec<Value>, BindError> {
        let mut slots: Vec<Option<Value>> = self.inputs.iter().map(|_| None).collect();

        for (name, value) in named {
            let idx = self.inputs.iter().position(|p| p.name == name).ok_or_else(|| {
                BindError::UnknownParameter {
                    name: name.clone(),
                    function: self.name.clone(),
                    expected: self
                        .inputs
                        .iter()
                        .map(|p| p.name.as_str())
                        .collect::<Vec<_>>()
                        .join(","),
                }
            })?;
            slots[idx] = Some(value);
        }

        let given = positional.len();
        for arg in positional {
            match slots.iter_mut().find(|s| s.is_none()) {
                Some(slot) => *slot = Some(arg),
                None => {
                    return Err(BindError::TooManyArguments {
                        function: self.name.clone(),
                        given,
                        declared: self.inputs.len(),
                    })
                }
            }
        }

        // Gap rule: the set flags must form a contiguous prefix.
        let last_set = slots.iter().rposition(|s| s.is_some());
        if let Some(last) = last_set {
            let missing: Vec<String> = slots[..last]
                .iter()
                .enumerate()
                .filter(|(_, s)| s.is_none())
                .map(|(i, _)| self.inputs[i].name.clone())
                .collect();
            if !missing.is_empty() {
                return Err(BindError::MissingInputInChain {
                    function: self.name.clone(),
                    missing,
                });
            }
        }

        let bound: Vec<Value> = slots.into_iter().flatten().collect();

        // Advisory type check against declared kinds; metadata is often
        // incomplete, so mismatches only warn.
        for (param, value) in self.inputs.iter().zip(bound.iter()) {
            if let Some(expected) = param.kind {
                if value.kind() != expected {
                    warn!(
                        function = %self.name,
                        input = %param.name,
                        expected = expected.as_str(),
                        got = value.kind().as_str(),
                        "input kind does not match declared kind"
                    );
                }
            }
        }

        Ok(bound)
    }
}

/// Builder for one invocation: positional and named arguments plus an
/// optional output-count override. The callee's behavior may depend on how
/// many outputs are requested, so the override matters beyond trimming.
#[derive(Debug)]
pub struct FunctionCall<'a> {
    function: &'a CompiledFunction,
    positional: Vec<Value>,
    named: Vec<(String, Value)>,
    output_count: Option<usize>,
}

impl FunctionCall<'_> {
    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.positional.push(value.into());
        self
    }

    pub fn args(mut self, values: impl IntoIterator<Item = Value>) -> Self {
        self.positional.extend(values);
        self
    }

    pub fn named(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.named.push((name.to_string(), value.into()));
        self
    }

    pub fn output_count(mut self, count: usize) -> Self {
        self.output_count = Some(count);
        self
    }

    /// Bind, coerce, and execute. Call-shape violations fail here; an
    /// unsuccessful callee comes back as a failed [`ExecutionResult`].
    pub fn run(self, executor: &Executor) -> Result<ExecutionResult> {
        let bound = self.function.bind(self.positional, self.named)?;
        let output_count = self.output_count.unwrap_or(self.function.output_count());
        executor.execute(self.function.name(), output_count, bound)
    }
}
