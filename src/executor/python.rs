use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};
use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::time::timeout;

use super::{Interpreter, InterpreterLoader};

/// Loads a CPython interpreter found on the host
///
/// Loading resolves the executable and probes its version once. Every run
/// then happens in a child process, so user code cannot disturb the server
/// and can be killed when it exceeds the wall-clock limit.
pub struct PythonLoader {
    executable: Option<PathBuf>,
    time_limit: Option<Duration>,
}

impl PythonLoader {
    pub fn new(executable: Option<PathBuf>, time_limit: Option<Duration>) -> Self {
        Self {
            executable,
            time_limit,
        }
    }

    fn resolve_executable(&self) -> Result<PathBuf> {
        if let Some(path) = &self.executable {
            return Ok(path.clone());
        }
        which::which("python3")
            .or_else(|_| which::which("python"))
            .map_err(|e| anyhow!("No Python interpreter found on PATH: {e}"))
    }
}

#[async_trait]
impl InterpreterLoader for PythonLoader {
    async fn load(&self) -> Result<Arc<dyn Interpreter>> {
        let executable = self.resolve_executable()?;

        let output = Command::new(&executable)
            .arg("--version")
            .stdin(Stdio::null())
            .output()
            .await
            .with_context(|| format!("Failed to spawn {}", executable.display()))?;

        if !output.status.success() {
            bail!("{} --version exited with {}", executable.display(), output.status);
        }

        // Python 2 prints its version to stderr
        let version = if output.stdout.is_empty() {
            String::from_utf8_lossy(&output.stderr).trim().to_string()
        } else {
            String::from_utf8_lossy(&output.stdout).trim().to_string()
        };
        log::info!("Using {version} at {}", executable.display());

        Ok(Arc::new(PythonInterpreter {
            executable,
            time_limit: self.time_limit,
        }))
    }
}

pub struct PythonInterpreter {
    executable: PathBuf,
    time_limit: Option<Duration>,
}

#[async_trait]
impl Interpreter for PythonInterpreter {
    async fn execute(&self, source: &str) -> Result<String> {
        // The program is read from stdin, which is closed right after it, so
        // `input()` sees end of file. Argument length limits do not apply.
        let mut child = Command::new(&self.executable)
            .arg("-")
            .env("PYTHONIOENCODING", "utf-8")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("Failed to spawn {}", self.executable.display()))?;

        let mut stdin = child
            .stdin
            .take()
            .context("Child process has no stdin pipe")?;
        let source = source.as_bytes().to_vec();

        let run = async move {
            match stdin.write_all(&source).await {
                // the exit status below tells why the child stopped reading
                Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => {}
                res => res.context("Failed to write source to interpreter")?,
            }
            drop(stdin);
            Ok::<_, anyhow::Error>(child.wait_with_output().await?)
        };

        let output = match self.time_limit {
            Some(limit) => timeout(limit, run)
                .await
                .map_err(|_| anyhow!("Execution timed out after {} ms", limit.as_millis()))??,
            None => run.await?,
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim_end().to_string();
            if stderr.is_empty() {
                bail!("Process exited with code: {:?}", output.status.code());
            }
            bail!(stderr);
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
