//! Call functions from MATLAB-compiler projects without linking against the
//! MATLAB runtime: arguments go out through a request file, the compiled
//! binary runs as a subprocess, and results come back through a fixed-name
//! response file in the working directory.
//!
//! The typical flow is: open a [`project::CompiledProject`], look up one of
//! its functions, build a call with positional and/or named arguments, and
//! run it against an [`execute::Executor`]:
//!
//! ```no_run
//! use matrun::{config::ExecutorConfig, execute::Executor, project::CompiledProject, value::Value};
//!
//! # fn main() -> anyhow::Result<()> {
//! let project = CompiledProject::open("projects/covarep/covarep_wrapper.m")?;
//! let executor = Executor::new(&project, ExecutorConfig::load()?)?;
//! let result = project
//!     .function("getnextthousand")?
//!     .call()
//!     .arg(Value::from(1000))
//!     .run(&executor)?;
//! assert!(result.success());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod errors;
pub mod execute;
pub mod project;
pub mod value;

pub use errors::{BindError, ExecuteError};
pub use execute::result::ExecutionResult;
pub use value::Value;
