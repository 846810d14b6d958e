//! Error taxonomy for binding and transport.
//!
//! Call-shape problems ([`BindError`]) and broken working-directory
//! invariants ([`ExecuteError`]) are the only conditions surfaced as `Err`;
//! an ordinary failed invocation (nonzero exit code) comes back as a failed
//! [`crate::ExecutionResult`] so that sweeps over many calls can keep going.

use std::path::PathBuf;

/// A call does not fit the function's declared parameter list.
///
/// These are raised before any subprocess is spawned and are never retried.
#[derive(Debug, thiserror::Error)]
pub enum BindError {
    /// A named argument does not match any declared input.
    #[error("unknown input '{name}' for function '{function}', expected one of: {expected}")]
    UnknownParameter {
        name: String,
        function: String,
        expected: String,
    },

    /// More positional arguments than unset parameter slots.
    #[error("too many inputs for function '{function}': {given} given, {declared} declared")]
    TooManyArguments {
        function: String,
        given: usize,
        declared: usize,
    },

    /// A parameter is set while an earlier one is not. Positional calling
    /// requires a contiguous prefix of bound arguments.
    #[error("missing in input chain for function '{function}': {missing:?}")]
    MissingInputInChain {
        function: String,
        missing: Vec<String>,
    },
}

/// Transport-level failures that indicate a broken invariant rather than a
/// failed callee.
#[derive(Debug, thiserror::Error)]
pub enum ExecuteError {
    /// The fixed-name response file already exists in the working directory.
    /// Reading it would silently return data from a previous invocation, so
    /// this is fatal; the file must be removed by the operator.
    #[error("stale response file '{0}' found before execution; remove it and retry")]
    StaleResultFile(PathBuf),

    /// Writing the request document failed.
    #[error("failed to write request file: {0}")]
    RequestWrite(#[source] std::io::Error),

    /// The response file was missing or unparseable after a successful exit.
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}
