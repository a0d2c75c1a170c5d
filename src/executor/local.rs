use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::OnceCell;

use crate::error::RunError;

use super::{ExecutionOutcome, NO_OUTPUT};

/// A loaded interpreter runtime
#[async_trait]
pub trait Interpreter: Send + Sync {
    /// Runs `source` against a fresh stdout sink and returns what was written to it
    ///
    /// Errors carry the interpreter's own message, e.g. a traceback.
    async fn execute(&self, source: &str) -> anyhow::Result<String>;
}

/// Brings an interpreter runtime up; called at most once per successful load
#[async_trait]
pub trait InterpreterLoader: Send + Sync {
    async fn load(&self) -> anyhow::Result<Arc<dyn Interpreter>>;
}

/// Runs source on a lazily loaded, process-wide interpreter
pub struct LocalClient {
    loader: Box<dyn InterpreterLoader>,
    interpreter: OnceCell<Arc<dyn Interpreter>>,
}

impl LocalClient {
    pub fn new(loader: Box<dyn InterpreterLoader>) -> Self {
        Self {
            loader,
            interpreter: OnceCell::new(),
        }
    }

    /// Whether the interpreter has finished loading
    pub fn is_loaded(&self) -> bool {
        self.interpreter.initialized()
    }

    /// Returns the cached interpreter, loading it first if needed
    ///
    /// Concurrent callers share one load. A failed load is not cached, so
    /// the next call tries again.
    pub async fn get_or_init_interpreter(&self) -> Result<Arc<dyn Interpreter>, RunError> {
        self.interpreter
            .get_or_try_init(|| async {
                log::info!("Loading local interpreter runtime");
                let interpreter = self.loader.load().await.map_err(|e| {
                    log::error!("Failed to load interpreter: {e:#}");
                    RunError::LoadError(format!("{e:#}"))
                })?;
                log::info!("Local interpreter runtime ready");
                Ok::<_, RunError>(interpreter)
            })
            .await
            .cloned()
    }

    /// Runs `source` and turns every failure into an error outcome
    pub async fn run_local(&self, source: &str) -> ExecutionOutcome {
        match self.try_run(source).await {
            Ok(output) if output.is_empty() => ExecutionOutcome::Output(NO_OUTPUT.to_string()),
            Ok(output) => ExecutionOutcome::Output(output),
            Err(e) => ExecutionOutcome::Error(e.to_string()),
        }
    }

    async fn try_run(&self, source: &str) -> Result<String, RunError> {
        let interpreter = self.get_or_init_interpreter().await?;
        interpreter
            .execute(source)
            .await
            .map_err(|e| RunError::ExecutionError(format!("{e:#}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    use anyhow::bail;
    use pretty_assertions::assert_eq;

    struct Echo;

    #[async_trait]
    impl Interpreter for Echo {
        async fn execute(&self, source: &str) -> anyhow::Result<String> {
            if source.contains("raise") {
                bail!("Traceback (most recent call last):\nValueError: bad");
            }
            Ok(source.strip_prefix("print:").unwrap_or_default().to_string())
        }
    }

    struct FlakyLoader {
        calls: Arc<AtomicU32>,
    }

    #[async_trait]
    impl InterpreterLoader for FlakyLoader {
        async fn load(&self) -> anyhow::Result<Arc<dyn Interpreter>> {
            if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                bail!("network unreachable");
            }
            Ok(Arc::new(Echo))
        }
    }

    #[tokio::test]
    async fn test_failed_load_is_retried() {
        let calls = Arc::new(AtomicU32::new(0));
        let client = LocalClient::new(Box::new(FlakyLoader {
            calls: calls.clone(),
        }));

        let first = client.run_local("print:hi").await;
        assert_eq!(
            first,
            ExecutionOutcome::Error("Failed to load interpreter: network unreachable".to_string())
        );
        assert!(!client.is_loaded());

        let second = client.run_local("print:hi").await;
        assert_eq!(second, ExecutionOutcome::Output("hi".to_string()));
        assert!(client.is_loaded());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_empty_output_and_errors() {
        let calls = Arc::new(AtomicU32::new(1));
        let client = LocalClient::new(Box::new(FlakyLoader { calls }));

        assert_eq!(
            client.run_local("x = 1").await,
            ExecutionOutcome::Output(NO_OUTPUT.to_string())
        );
        let outcome = client.run_local("raise ValueError('bad')").await;
        assert!(outcome.is_error());
        assert!(outcome.text().ends_with("ValueError: bad"));
    }
}
