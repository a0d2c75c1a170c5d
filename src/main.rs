use std::path::Path;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;

use coderunner::config::{CliArgs, Command, Config};
use coderunner::dispatcher::Dispatcher;
use coderunner::executor::{ExecutionOutcome, RemoteClient, create_local_client};
use coderunner::languages::LanguageRegistry;
use coderunner::web_server::build_server;
use coderunner::widget::{Widget, WidgetConfig};

#[actix_web::main]
async fn main() -> anyhow::Result<ExitCode> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let cli = CliArgs::parse();

    let Config {
        server: server_config,
        remote: remote_config,
        local: local_config,
        languages: extra_languages,
    } = cli.to_config().context("Failed to load configuration")?;

    let languages =
        LanguageRegistry::with_extra(extra_languages).context("Invalid language table")?;
    languages
        .resolve(&local_config.language)
        .context("Local language is not in the language table")?;

    let remote = RemoteClient::new(&remote_config).context("Failed to build HTTP client")?;
    let local = local_config
        .enabled
        .then(|| create_local_client(&local_config));
    let dispatcher = Dispatcher::new(remote, local, local_config.language.clone());

    match cli.command {
        Some(Command::Run {
            language,
            stdin,
            title,
            file,
        }) => run_once(&dispatcher, &languages, &language, stdin.as_deref(), title, &file).await,
        Some(Command::Serve) | None => {
            let server = build_server(server_config, languages, dispatcher)
                .context("Failed to build server")?;
            let server_handle = server.handle();
            let server_task = actix_web::rt::spawn(server);

            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    log::info!("Ctrl-c received, shutting down...");
                }
                res_server = server_task => {
                    log::error!("Server terminated unexpectedly: {:?}", res_server);
                }
            }

            server_handle.stop(true).await;
            log::info!("Shutdown complete");
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Runs one file through the dispatcher, like a widget with a single run
async fn run_once(
    dispatcher: &Dispatcher,
    languages: &LanguageRegistry,
    language: &str,
    stdin: Option<&Path>,
    title: Option<String>,
    file: &Path,
) -> anyhow::Result<ExitCode> {
    let spec = languages.resolve(language)?.clone();
    let code = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let stdin = stdin
        .map(std::fs::read_to_string)
        .transpose()
        .context("Failed to read stdin file")?;

    if let Some(title) = &title {
        log::info!("Running {title}");
    }

    let widget = Widget::new(
        0,
        WidgetConfig {
            code,
            language: language.to_string(),
            title,
            stdin,
        },
        spec,
    );

    match dispatcher.run(&widget).await? {
        ExecutionOutcome::Output(text) => {
            print!("{text}");
            Ok(ExitCode::SUCCESS)
        }
        ExecutionOutcome::Error(text) => {
            eprintln!("{text}");
            Ok(ExitCode::FAILURE)
        }
    }
}
