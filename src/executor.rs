mod local;
mod python;
mod remote;

pub use local::{Interpreter, InterpreterLoader, LocalClient};
pub use python::{PythonInterpreter, PythonLoader};
pub use remote::{
    ExecutionResult, ExecutionStatus, RemoteClient, Submission, SubmissionHandle, extract_outcome,
};

use serde::Serialize;

use crate::config::LocalConfig;

/// Shown instead of an empty output on a successful run
pub const NO_OUTPUT: &str = "(No output)";

/// Terminal result of one run, destined for exactly one of the widget's
/// output and error channels
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "kind", content = "text", rename_all = "snake_case")]
pub enum ExecutionOutcome {
    Output(String),
    Error(String),
}

impl ExecutionOutcome {
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    pub fn text(&self) -> &str {
        match self {
            Self::Output(text) | Self::Error(text) => text,
        }
    }
}

/// Creates the local client backed by a Python interpreter process
pub fn create_local_client(config: &LocalConfig) -> LocalClient {
    log::info!(
        "Local execution for {} via {}",
        config.language,
        config
            .executable
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "python3 on PATH".to_string())
    );
    let loader = PythonLoader::new(config.executable.clone(), config.timeout());
    LocalClient::new(Box::new(loader))
}
