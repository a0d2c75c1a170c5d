use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::codec::{decode_from_transport, encode_for_transport};
use crate::config::RemoteConfig;
use crate::error::RunError;
use crate::languages::LanguageSpec;

use super::{ExecutionOutcome, NO_OUTPUT};

/// Judge0 status ids at or below this value are still queued or processing
const LAST_PENDING_STATUS: u32 = 2;
/// Judge0 "Accepted"
const ACCEPTED_STATUS: u32 = 3;

/// One run request, immutable once built
#[derive(Debug, Clone)]
pub struct Submission {
    pub source_text: String,
    pub stdin_text: String,
    pub language: LanguageSpec,
}

/// Token identifying a pending submission on the sandbox
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionHandle(String);

impl SubmissionHandle {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Serialize)]
struct CreateSubmissionRequest {
    source_code: String,
    language_id: u32,
    stdin: String,
}

#[derive(Deserialize)]
struct CreateSubmissionResponse {
    token: Option<String>,
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ExecutionStatus {
    pub id: u32,
    #[serde(default)]
    pub description: String,
}

/// Submission state as reported by the sandbox; text fields are still encoded
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ExecutionResult {
    pub status: Option<ExecutionStatus>,
    pub stdout: Option<String>,
    pub stderr: Option<String>,
    pub compile_output: Option<String>,
    pub message: Option<String>,
    pub time: Option<String>,
    pub memory: Option<u64>,
}

impl ExecutionResult {
    pub fn is_terminal(&self) -> bool {
        self.status
            .as_ref()
            .is_some_and(|s| s.id > LAST_PENDING_STATUS)
    }
}

/// Client for a Judge0-compatible sandbox
pub struct RemoteClient {
    http: reqwest::Client,
    base_url: String,
    auth_token: Option<String>,
    max_attempts: u32,
    poll_interval: Duration,
}

impl RemoteClient {
    pub fn new(config: &RemoteConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .user_agent(concat!("coderunner/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            auth_token: config.auth_token.clone(),
            max_attempts: config.max_attempts,
            poll_interval: config.poll_interval(),
        })
    }

    /// Runs a submission and turns every failure into an error outcome
    pub async fn run_remote(&self, submission: &Submission) -> ExecutionOutcome {
        match self.execute(submission).await {
            Ok(result) => extract_outcome(&result),
            Err(e) => {
                log::warn!("Remote execution of {} failed: {e}", submission.language.id);
                ExecutionOutcome::Error(format!("Execution failed: {e}"))
            }
        }
    }

    /// Submits and polls until the sandbox reports a terminal status
    pub async fn execute(&self, submission: &Submission) -> Result<ExecutionResult, RunError> {
        let handle = self.submit(submission).await?;
        log::debug!(
            "Submitted {} program as {}",
            submission.language.id,
            handle.as_str()
        );
        self.poll(&handle).await
    }

    async fn submit(&self, submission: &Submission) -> Result<SubmissionHandle, RunError> {
        let body = CreateSubmissionRequest {
            source_code: encode_for_transport(&submission.source_text),
            language_id: submission.language.execution_engine_id,
            stdin: encode_for_transport(&submission.stdin_text),
        };

        let response = self
            .authorize(self.http.post(format!("{}/submissions", self.base_url)))
            .query(&[("base64_encoded", "true"), ("wait", "false")])
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(RunError::ServiceError(status.as_u16()));
        }

        let created: CreateSubmissionResponse = response
            .json()
            .await
            .map_err(|e| RunError::ProtocolError(format!("Invalid submission response: {e}")))?;

        match created.token {
            Some(token) if !token.is_empty() => Ok(SubmissionHandle(token)),
            _ => Err(RunError::ProtocolError(
                "Missing submission token in response".to_string(),
            )),
        }
    }

    async fn poll(&self, handle: &SubmissionHandle) -> Result<ExecutionResult, RunError> {
        for attempt in 1..=self.max_attempts {
            tokio::time::sleep(self.poll_interval).await;

            let result = self.fetch_status(handle).await?;
            if result.is_terminal() {
                log::debug!(
                    "Submission {} finished after {attempt} polls (time: {:?}, memory: {:?})",
                    handle.as_str(),
                    result.time,
                    result.memory
                );
                if let Some(message) = result.message.as_deref().filter(|m| !m.is_empty()) {
                    log::info!(
                        "Submission {} reported: {}",
                        handle.as_str(),
                        decode_from_transport(message)
                    );
                }
                return Ok(result);
            }
            log::trace!("Submission {} still pending (poll {attempt})", handle.as_str());
        }

        Err(RunError::Timeout {
            attempts: self.max_attempts,
        })
    }

    async fn fetch_status(&self, handle: &SubmissionHandle) -> Result<ExecutionResult, RunError> {
        let response = self
            .authorize(
                self.http
                    .get(format!("{}/submissions/{}", self.base_url, handle.as_str())),
            )
            .query(&[("base64_encoded", "true")])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(RunError::ServiceError(status.as_u16()));
        }

        response
            .json()
            .await
            .map_err(|e| RunError::ProtocolError(format!("Invalid status response: {e}")))
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.auth_token {
            Some(token) => request.header("X-Auth-Token", token),
            None => request,
        }
    }
}

type Extractor = fn(&ExecutionResult) -> Option<ExecutionOutcome>;

/// Extraction policy, in priority order. The first extractor that matches wins.
const EXTRACTORS: [Extractor; 4] = [
    stdout_output,
    stderr_error,
    compile_output_error,
    status_fallback,
];

/// Picks what a terminal result shows to the reader
pub fn extract_outcome(result: &ExecutionResult) -> ExecutionOutcome {
    EXTRACTORS
        .iter()
        .find_map(|extract| extract(result))
        .unwrap_or_else(|| {
            ExecutionOutcome::Error("Execution finished without a result".to_string())
        })
}

fn decoded(field: &Option<String>) -> Option<String> {
    field
        .as_deref()
        .map(decode_from_transport)
        .filter(|text| !text.is_empty())
}

fn stdout_output(result: &ExecutionResult) -> Option<ExecutionOutcome> {
    decoded(&result.stdout).map(ExecutionOutcome::Output)
}

fn stderr_error(result: &ExecutionResult) -> Option<ExecutionOutcome> {
    decoded(&result.stderr).map(ExecutionOutcome::Error)
}

fn compile_output_error(result: &ExecutionResult) -> Option<ExecutionOutcome> {
    decoded(&result.compile_output).map(ExecutionOutcome::Error)
}

fn status_fallback(result: &ExecutionResult) -> Option<ExecutionOutcome> {
    let status = result.status.as_ref()?;
    if status.id == ACCEPTED_STATUS {
        Some(ExecutionOutcome::Output(NO_OUTPUT.to_string()))
    } else if status.description.is_empty() {
        Some(ExecutionOutcome::Error(format!(
            "Finished with status {}",
            status.id
        )))
    } else {
        Some(ExecutionOutcome::Error(status.description.clone()))
    }
}
