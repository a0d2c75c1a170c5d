use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::create_timestamp;
use crate::error::RunError;
use crate::executor::ExecutionOutcome;
use crate::languages::LanguageSpec;

/// What a documentation page embeds: initial code, language and optional extras
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct WidgetConfig {
    pub code: String,
    pub language: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub stdin: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Idle,
    Running,
    Succeeded,
    Failed,
}

/// Mutable, reader-facing state of one widget
#[derive(Debug, Clone)]
pub struct RunState {
    pub editable_source: String,
    pub output_text: String,
    pub error_text: String,
    pub phase: RunPhase,
    pub updated_time: String,
}

impl RunState {
    fn new(source: String) -> Self {
        Self {
            editable_source: source,
            output_text: String::new(),
            error_text: String::new(),
            phase: RunPhase::Idle,
            updated_time: create_timestamp(),
        }
    }

    pub fn is_running(&self) -> bool {
        self.phase == RunPhase::Running
    }
}

/// One embedded code runner
///
/// Source edits are accepted in every phase. A run works on the source
/// captured when it was triggered, so edits made while it is in flight only
/// affect the next run.
#[derive(Debug)]
pub struct Widget {
    pub id: u32,
    pub title: Option<String>,
    pub language: LanguageSpec,
    pub stdin: String,
    state: Mutex<RunState>,
}

/// Serialized snapshot of a widget
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct WidgetView {
    pub id: u32,
    pub title: Option<String>,
    pub language: LanguageSpec,
    pub stdin: String,
    pub source: String,
    pub output: String,
    pub error: String,
    pub is_running: bool,
    pub state: RunPhase,
    pub updated_time: String,
}

impl Widget {
    pub fn new(id: u32, config: WidgetConfig, language: LanguageSpec) -> Self {
        Self {
            id,
            title: config.title,
            language,
            stdin: config.stdin.unwrap_or_default(),
            state: Mutex::new(RunState::new(config.code)),
        }
    }

    pub fn state(&self) -> RunState {
        self.state.lock().clone()
    }

    pub fn view(&self) -> WidgetView {
        let state = self.state.lock();
        WidgetView {
            id: self.id,
            title: self.title.clone(),
            language: self.language.clone(),
            stdin: self.stdin.clone(),
            source: state.editable_source.clone(),
            output: state.output_text.clone(),
            error: state.error_text.clone(),
            is_running: state.is_running(),
            state: state.phase,
            updated_time: state.updated_time.clone(),
        }
    }

    pub fn edit_source(&self, source: String) {
        let mut state = self.state.lock();
        state.editable_source = source;
        state.updated_time = create_timestamp();
    }

    /// Enters `Running`, clearing the previous output and error
    ///
    /// Returns the source snapshot for this run, or [`RunError::Busy`] when a
    /// run is already in flight.
    pub fn begin_run(&self) -> Result<String, RunError> {
        let mut state = self.state.lock();
        if state.is_running() {
            return Err(RunError::Busy);
        }
        state.phase = RunPhase::Running;
        state.output_text.clear();
        state.error_text.clear();
        state.updated_time = create_timestamp();
        Ok(state.editable_source.clone())
    }

    /// Shows a progress note in the output channel of a running widget
    pub fn show_progress(&self, message: &str) {
        let mut state = self.state.lock();
        if state.is_running() {
            state.output_text = message.to_string();
        }
    }

    /// Leaves `Running` with exactly one of output and error populated
    pub fn finish_run(&self, outcome: ExecutionOutcome) {
        let mut state = self.state.lock();
        match outcome {
            ExecutionOutcome::Output(text) => {
                state.output_text = text;
                state.error_text.clear();
                state.phase = RunPhase::Succeeded;
            }
            ExecutionOutcome::Error(text) => {
                state.output_text.clear();
                state.error_text = text;
                state.phase = RunPhase::Failed;
            }
        }
        state.updated_time = create_timestamp();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn widget() -> Widget {
        Widget::new(
            7,
            WidgetConfig {
                code: "fn main() {}".to_string(),
                language: "rust".to_string(),
                title: Some("Hello".to_string()),
                stdin: None,
            },
            LanguageSpec::new("rust", 73, "Rust", "rs"),
        )
    }

    #[test]
    fn test_new_widget_is_idle() {
        let view = widget().view();
        assert_eq!(view.state, RunPhase::Idle);
        assert!(!view.is_running);
        assert_eq!(view.source, "fn main() {}");
        assert_eq!(view.stdin, "");
        assert_eq!(view.output, "");
        assert_eq!(view.error, "");
    }

    #[test]
    fn test_run_lifecycle() {
        let w = widget();
        assert_eq!(w.begin_run().unwrap(), "fn main() {}");
        assert!(w.state().is_running());

        w.show_progress("Loading...");
        assert_eq!(w.state().output_text, "Loading...");

        w.finish_run(ExecutionOutcome::Error("boom".to_string()));
        let state = w.state();
        assert_eq!(state.phase, RunPhase::Failed);
        assert_eq!(state.error_text, "boom");
        assert_eq!(state.output_text, "");

        // a new run clears the previous error
        w.begin_run().unwrap();
        assert_eq!(w.state().error_text, "");
        w.finish_run(ExecutionOutcome::Output("ok\n".to_string()));
        let state = w.state();
        assert_eq!(state.phase, RunPhase::Succeeded);
        assert_eq!(state.output_text, "ok\n");
        assert_eq!(state.error_text, "");
    }

    #[test]
    fn test_second_trigger_while_running_is_rejected() {
        let w = widget();
        w.begin_run().unwrap();
        assert_eq!(w.begin_run(), Err(RunError::Busy));
        w.finish_run(ExecutionOutcome::Output("done".to_string()));
        assert!(w.begin_run().is_ok());
    }

    #[test]
    fn test_edit_while_running_keeps_snapshot() {
        let w = widget();
        let snapshot = w.begin_run().unwrap();
        w.edit_source("fn main() { println!(\"hi\"); }".to_string());
        assert_eq!(snapshot, "fn main() {}");
        assert!(w.state().is_running());

        w.finish_run(ExecutionOutcome::Output("(No output)".to_string()));
        assert_eq!(w.begin_run().unwrap(), "fn main() { println!(\"hi\"); }");
    }

    #[test]
    fn test_progress_ignored_when_idle() {
        let w = widget();
        w.show_progress("Loading...");
        assert_eq!(w.state().output_text, "");
    }
}
