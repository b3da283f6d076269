use tracing::debug;
use uuid::Uuid;

use crate::models::{AnalysisResult, SelectedFile};

#[derive(Debug, Clone, PartialEq, Default)]
pub enum AnalysisRequestState {
    #[default]
    Idle,
    Pending,
    Succeeded(AnalysisResult),
    Failed(String),
}

impl AnalysisRequestState {
    pub fn label(&self) -> &'static str {
        match self {
            AnalysisRequestState::Idle => "idle",
            AnalysisRequestState::Pending => "pending",
            AnalysisRequestState::Succeeded(_) => "succeeded",
            AnalysisRequestState::Failed(_) => "failed",
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, AnalysisRequestState::Pending)
    }

    pub fn result(&self) -> Option<&AnalysisResult> {
        match self {
            AnalysisRequestState::Succeeded(result) => Some(result),
            _ => None,
        }
    }
}

/// Identifies one outbound request and the generation it belongs to.
#[derive(Debug, Clone)]
pub struct SubmissionTicket {
    pub seq: u64,
    pub request_id: Uuid,
    pub file: SelectedFile,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Admission {
    NoSelection,
    AlreadyPending,
}

/// The selected file and request state, mutated only through the methods below.
#[derive(Debug, Default)]
pub struct SessionState {
    selection: Option<SelectedFile>,
    request: AnalysisRequestState,
    generation: u64,
}

impl SessionState {
    pub fn select_file(&mut self, file: Option<SelectedFile>) {
        debug!(
            file = file.as_ref().map(|f| f.name.as_str()).unwrap_or("<none>"),
            previous = self.request.label(),
            "selection changed"
        );
        self.selection = file;
        self.request = AnalysisRequestState::Idle;
        self.generation += 1;
    }

    pub fn current_selection(&self) -> Option<&SelectedFile> {
        self.selection.as_ref()
    }

    pub fn current_state(&self) -> &AnalysisRequestState {
        &self.request
    }

    /// Moves to `Pending` and hands out a ticket, or explains why not.
    pub fn begin_submission(&mut self) -> Result<SubmissionTicket, Admission> {
        let file = self.selection.clone().ok_or(Admission::NoSelection)?;
        if self.request.is_pending() {
            return Err(Admission::AlreadyPending);
        }
        self.generation += 1;
        self.request = AnalysisRequestState::Pending;
        Ok(SubmissionTicket {
            seq: self.generation,
            request_id: Uuid::new_v4(),
            file,
        })
    }

    /// Applies an outcome; returns false when the ticket has been superseded.
    pub fn resolve(&mut self, ticket: &SubmissionTicket, outcome: Result<AnalysisResult, String>) -> bool {
        if ticket.seq != self.generation || !self.request.is_pending() {
            return false;
        }
        self.request = match outcome {
            Ok(result) => AnalysisRequestState::Succeeded(result),
            Err(message) => AnalysisRequestState::Failed(message),
        };
        debug!(seq = ticket.seq, state = self.request.label(), "submission resolved");
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::tests::sample_result;

    fn csv_file(name: &str) -> SelectedFile {
        SelectedFile::new(name, b"Name,Location\n".to_vec())
    }

    #[test]
    fn selection_resets_every_state_to_idle() {
        let mut state = SessionState::default();
        state.select_file(Some(csv_file("a.csv")));
        assert_eq!(state.current_state(), &AnalysisRequestState::Idle);

        let ticket = state.begin_submission().unwrap();
        state.select_file(Some(csv_file("b.csv")));
        assert_eq!(state.current_state(), &AnalysisRequestState::Idle);

        let ticket_b = state.begin_submission().unwrap();
        assert!(state.resolve(&ticket_b, Ok(sample_result())));
        assert_eq!(state.current_state().label(), "succeeded");
        state.select_file(Some(csv_file("c.csv")));
        assert_eq!(state.current_state(), &AnalysisRequestState::Idle);

        let ticket_c = state.begin_submission().unwrap();
        assert!(state.resolve(&ticket_c, Err("boom".into())));
        state.select_file(None);
        assert_eq!(state.current_state(), &AnalysisRequestState::Idle);
        assert!(state.current_selection().is_none());

        assert!(!state.resolve(&ticket, Ok(sample_result())));
        assert_eq!(state.current_state(), &AnalysisRequestState::Idle);
    }

    #[test]
    fn submission_requires_a_selection() {
        let mut state = SessionState::default();
        assert_eq!(state.begin_submission().unwrap_err(), Admission::NoSelection);
        assert_eq!(state.current_state(), &AnalysisRequestState::Idle);
    }

    #[test]
    fn second_submission_while_pending_is_refused() {
        let mut state = SessionState::default();
        state.select_file(Some(csv_file("a.csv")));
        let first = state.begin_submission().unwrap();
        assert_eq!(state.begin_submission().unwrap_err(), Admission::AlreadyPending);

        assert!(state.resolve(&first, Ok(sample_result())));
        assert_eq!(state.current_state().label(), "succeeded");
    }

    #[test]
    fn resubmitting_after_resolution_reenters_pending() {
        let mut state = SessionState::default();
        state.select_file(Some(csv_file("a.csv")));
        let first = state.begin_submission().unwrap();
        assert!(state.resolve(&first, Err("analysis failed".into())));

        let second = state.begin_submission().unwrap();
        assert!(second.seq > first.seq);
        assert!(state.current_state().is_pending());

        assert!(!state.resolve(&first, Ok(sample_result())));
        assert!(state.current_state().is_pending());
        assert!(state.resolve(&second, Ok(sample_result())));
        assert_eq!(state.current_state().result().unwrap().summary.total_users, 100);
    }
}
