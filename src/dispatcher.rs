use crate::error::RunError;
use crate::executor::{ExecutionOutcome, LocalClient, RemoteClient, Submission};
use crate::languages::LanguageSpec;
use crate::widget::Widget;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Local,
    Remote,
}

/// A triggered run: the source snapshot and where it goes
#[derive(Debug)]
pub struct RunTicket {
    pub source: String,
    pub route: Route,
}

/// Sends widget runs to the local interpreter or to the remote sandbox
pub struct Dispatcher {
    remote: RemoteClient,
    local: Option<LocalClient>,
    local_language: String,
}

impl Dispatcher {
    /// `local` serves `local_language` only; without it every language runs remotely
    pub fn new(remote: RemoteClient, local: Option<LocalClient>, local_language: String) -> Self {
        Self {
            remote,
            local,
            local_language,
        }
    }

    pub fn route(&self, language: &LanguageSpec) -> Route {
        if self.local.is_some() && language.id == self.local_language {
            Route::Local
        } else {
            Route::Remote
        }
    }

    /// Moves the widget into `Running` and captures what to run
    ///
    /// Before the first local run the output channel shows a loading note
    /// until the interpreter is up.
    pub fn trigger(&self, widget: &Widget) -> Result<RunTicket, RunError> {
        let source = widget.begin_run()?;
        let route = self.route(&widget.language);
        if route == Route::Local && self.local.as_ref().is_some_and(|l| !l.is_loaded()) {
            widget.show_progress(&format!(
                "Loading {} runtime...",
                widget.language.display_name
            ));
        }
        log::info!(
            "Widget {} runs {} {:?}",
            widget.id,
            widget.language.id,
            route
        );
        Ok(RunTicket { source, route })
    }

    /// Executes a triggered run and records its outcome on the widget
    pub async fn execute(&self, widget: &Widget, ticket: RunTicket) -> ExecutionOutcome {
        let outcome = match (ticket.route, &self.local) {
            (Route::Local, Some(local)) => local.run_local(&ticket.source).await,
            _ => {
                let submission = Submission {
                    source_text: ticket.source,
                    stdin_text: widget.stdin.clone(),
                    language: widget.language.clone(),
                };
                self.remote.run_remote(&submission).await
            }
        };

        if outcome.is_error() {
            log::info!("Widget {} run failed", widget.id);
        } else {
            log::info!("Widget {} run succeeded", widget.id);
        }
        widget.finish_run(outcome.clone());
        outcome
    }

    /// Triggers and executes a run; only fails when one is already in flight
    pub async fn run(&self, widget: &Widget) -> Result<ExecutionOutcome, RunError> {
        let ticket = self.trigger(widget)?;
        Ok(self.execute(widget, ticket).await)
    }
}
