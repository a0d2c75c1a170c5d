use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Deserialize;

use crate::languages::LanguageSpec;

#[derive(Parser)]
#[command(name = "coderunner", version = "1.0", about, long_about = None)]
pub struct CliArgs {
    /// Path to the configuration file
    #[arg(long = "config", short = 'c', global = true)]
    pub config_path: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Serve code runner widgets over HTTP (default)
    Serve,
    /// Run one source file and print its output
    Run {
        /// Language id, e.g. `python` or `cpp`
        #[arg(long, short = 'l')]
        language: String,

        /// File whose content is fed to the program as stdin
        #[arg(long)]
        stdin: Option<PathBuf>,

        /// Title shown in the log
        #[arg(long)]
        title: Option<String>,

        /// Source file to run
        file: PathBuf,
    },
}

impl CliArgs {
    /// Load the configuration from the specified file
    ///
    /// Without `--config`, `config.json` in the user config directory is used
    /// when it exists, otherwise built-in defaults.
    pub fn to_config(&self) -> anyhow::Result<Config> {
        let path = match &self.config_path {
            Some(path) => path.clone(),
            None => match default_config_path() {
                Some(path) if path.exists() => path,
                _ => {
                    log::info!("No configuration file found, using defaults");
                    return Ok(Config::default());
                }
            },
        };

        let file = std::fs::File::open(&path)
            .with_context(|| format!("Failed to open config file {}", path.display()))?;
        let reader = std::io::BufReader::new(file);
        let config = serde_json::from_reader(reader)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        log::info!("Loaded configuration from {}", path.display());
        Ok(config)
    }
}

fn default_config_path() -> Option<PathBuf> {
    use directories::ProjectDirs;

    ProjectDirs::from("", "", "coderunner").map(|dirs| dirs.config_dir().join("config.json"))
}

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub remote: RemoteConfig,
    pub local: LocalConfig,
    /// Languages appended to the built-in table
    pub languages: Vec<LanguageSpec>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_address: Option<String>,
    pub bind_port: Option<u16>,
    /// Upper bound on live widgets
    pub max_widgets: Option<usize>,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct RemoteConfig {
    pub base_url: String,
    pub max_attempts: u32,
    pub poll_interval_ms: u64,
    pub request_timeout_ms: u64,
    /// Sent as `X-Auth-Token` when the sandbox requires authentication
    pub auth_token: Option<String>,
}

impl RemoteConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: "https://ce.judge0.com".to_string(),
            max_attempts: 30,
            poll_interval_ms: 1000,
            request_timeout_ms: 10_000,
            auth_token: None,
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct LocalConfig {
    pub enabled: bool,
    /// The one language that runs on the local interpreter
    pub language: String,
    /// Interpreter executable; looked up on `PATH` when unset
    pub executable: Option<PathBuf>,
    /// Wall-clock limit for one local run; unlimited when unset
    pub timeout_ms: Option<u64>,
}

impl LocalConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}

impl Default for LocalConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            language: "python".to_string(),
            executable: None,
            timeout_ms: None,
        }
    }
}
