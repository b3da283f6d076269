use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::{debug, info, info_span, warn, Instrument};

use crate::error::ClipboardError;
use crate::models::SelectedFile;
use crate::notify::{ClipboardSink, Notice, Notifier};
use crate::response;
use crate::state::{Admission, AnalysisRequestState, SessionState};
use crate::transport::AnalysisTransport;

pub const SELECT_FILE_FIRST: &str = "Please select a file first";

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Guard hit: nothing selected, user was prompted.
    NoSelection,
    /// A request is already in flight.
    Ignored,
    Resolved(AnalysisRequestState),
    /// The selection or a newer submission replaced this one before it returned.
    Superseded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyOutcome {
    Copied,
    Failed,
    NothingToCopy,
}

/// Owns the selection/request state pair and the collaborators that act on it.
pub struct AnalysisSession<T> {
    state: Mutex<SessionState>,
    transport: T,
    clipboard: Mutex<Box<dyn ClipboardSink>>,
    notifier: Box<dyn Notifier>,
}

impl<T: AnalysisTransport> AnalysisSession<T> {
    pub fn new(transport: T, clipboard: Box<dyn ClipboardSink>, notifier: Box<dyn Notifier>) -> Self {
        Self {
            state: Mutex::new(SessionState::default()),
            transport,
            clipboard: Mutex::new(clipboard),
            notifier,
        }
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn select_file(&self, file: Option<SelectedFile>) {
        if let Some(file) = &file {
            if !file.has_accepted_extension() {
                warn!(file = %file.name, "selected file is not csv, xlsx, json or txt");
            }
        }
        self.lock().select_file(file);
    }

    pub fn current_selection(&self) -> Option<SelectedFile> {
        self.lock().current_selection().cloned()
    }

    pub fn current_state(&self) -> AnalysisRequestState {
        self.lock().current_state().clone()
    }

    pub async fn submit(&self) -> SubmitOutcome {
        let admission = self.lock().begin_submission();
        let ticket = match admission {
            Ok(ticket) => ticket,
            Err(Admission::NoSelection) => {
                self.notifier.notify(Notice::Prompt(SELECT_FILE_FIRST.to_string()));
                return SubmitOutcome::NoSelection;
            }
            Err(Admission::AlreadyPending) => {
                debug!("submission ignored while a request is pending");
                return SubmitOutcome::Ignored;
            }
        };

        let span = info_span!(
            "submission",
            seq = ticket.seq,
            request_id = %ticket.request_id,
            file = %ticket.file.name
        );
        async {
            info!(bytes = ticket.file.bytes.len(), "submitting file for analysis");
            let outcome = self
                .transport
                .send(&ticket)
                .await
                .and_then(|raw| response::interpret(&raw))
                .map_err(|err| {
                    warn!(status = err.status(), error = %err, "analysis failed");
                    err.user_message()
                });
            if let Ok(result) = &outcome {
                info!(
                    total_users = result.summary.total_users,
                    locations = result.location_stats.len(),
                    "analysis succeeded"
                );
            }

            let applied = self.lock().resolve(&ticket, outcome);
            if applied {
                SubmitOutcome::Resolved(self.current_state())
            } else {
                warn!("discarding response for a superseded submission");
                SubmitOutcome::Superseded
            }
        }
        .instrument(span)
        .await
    }

    /// Copies the current result as pretty JSON; a no-op unless the last
    /// submission succeeded.
    pub fn copy_result_to_clipboard(&self) -> CopyOutcome {
        let Some(result) = self.lock().current_state().result().cloned() else {
            return CopyOutcome::NothingToCopy;
        };

        let written = result
            .to_pretty_json()
            .map_err(ClipboardError::from)
            .and_then(|text| {
                self.clipboard
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .set_text(text)
            });

        match written {
            Ok(()) => {
                self.notifier
                    .notify(Notice::Success("Analysis result copied to clipboard".to_string()));
                CopyOutcome::Copied
            }
            Err(err) => {
                warn!(error = %err, "clipboard write failed");
                self.notifier
                    .notify(Notice::Failure(format!("Copy failed: {err}")));
                CopyOutcome::Failed
            }
        }
    }
}
