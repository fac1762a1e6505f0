use statig::prelude::*;

use crate::artifacts::JobStatus;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunEvent {
    /// Operation processed and persisted
    Complete,
    /// Rejected before any processing (invalid envelope)
    Abort { reason: String },
    /// Handler or persistence failure during processing
    Fail { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Done,
    Aborted { reason: String },
    Failed { reason: String },
}

impl RunOutcome {
    pub fn job_status(&self) -> JobStatus {
        match self {
            RunOutcome::Done => JobStatus::Success,
            RunOutcome::Aborted { .. } | RunOutcome::Failed { .. } => JobStatus::Failure,
        }
    }
}

#[derive(Default)]
pub struct RunLifecycle {
    pub operation_id: String,
    pub outcome: Option<RunOutcome>,
}

impl RunLifecycle {
    pub fn new(operation_id: impl Into<String>) -> Self {
        Self {
            operation_id: operation_id.into(),
            ..Default::default()
        }
    }

    fn finish(&mut self, outcome: RunOutcome) {
        tracing::info!(
            operation_id = %self.operation_id,
            outcome = ?outcome,
            "Run finished"
        );
        self.outcome = Some(outcome);
    }

    fn ignore_after_finish(&self, event: &RunEvent) {
        tracing::warn!(
            operation_id = %self.operation_id,
            event = ?event,
            outcome = ?self.outcome,
            "Ignoring event for finished run"
        );
    }
}

#[state_machine(initial = "State::ready()")]
impl RunLifecycle {
    #[state]
    fn ready(&mut self, event: &RunEvent) -> Outcome<State> {
        match event {
            RunEvent::Complete => {
                self.finish(RunOutcome::Done);
                Transition(State::done())
            }
            RunEvent::Abort { reason } => {
                self.finish(RunOutcome::Aborted {
                    reason: reason.clone(),
                });
                Transition(State::aborted())
            }
            RunEvent::Fail { reason } => {
                self.finish(RunOutcome::Failed {
                    reason: reason.clone(),
                });
                Transition(State::failed())
            }
        }
    }

    #[state]
    fn done(&mut self, event: &RunEvent) -> Outcome<State> {
        self.ignore_after_finish(event);
        Handled
    }

    #[state]
    fn aborted(&mut self, event: &RunEvent) -> Outcome<State> {
        self.ignore_after_finish(event);
        Handled
    }

    #[state]
    fn failed(&mut self, event: &RunEvent) -> Outcome<State> {
        self.ignore_after_finish(event);
        Handled
    }
}

impl RunLifecycle {
    pub fn outcome(&self) -> Option<&RunOutcome> {
        self.outcome.as_ref()
    }

    /// Status for the report. A run that never reached a terminal state was
    /// cut short by the orchestrator.
    pub fn job_status(&self) -> JobStatus {
        self.outcome
            .as_ref()
            .map(RunOutcome::job_status)
            .unwrap_or(JobStatus::Cancelled)
    }
}
