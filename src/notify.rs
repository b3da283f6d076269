use crate::error::ClipboardError;

#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    /// Blocking prompt shown when an action needs user input first.
    Prompt(String),
    Success(String),
    Failure(String),
}

pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Writes notices to stderr so stdout carries only rendered results.
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notice: Notice) {
        match notice {
            Notice::Prompt(message) => eprintln!("! {message}"),
            Notice::Success(message) => eprintln!("✓ {message}"),
            Notice::Failure(message) => eprintln!("✗ {message}"),
        }
    }
}

pub trait ClipboardSink: Send {
    fn set_text(&mut self, text: String) -> Result<(), ClipboardError>;
}

/// Platform clipboard; a fresh handle per write.
pub struct SystemClipboard;

impl ClipboardSink for SystemClipboard {
    fn set_text(&mut self, text: String) -> Result<(), ClipboardError> {
        let mut clipboard =
            arboard::Clipboard::new().map_err(|e| ClipboardError::Unavailable(e.to_string()))?;
        clipboard
            .set_text(text)
            .map_err(|e| ClipboardError::Rejected(e.to_string()))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    #[derive(Clone, Default)]
    pub(crate) struct RecordingNotifier {
        pub notices: Arc<Mutex<Vec<Notice>>>,
    }

    impl RecordingNotifier {
        pub fn taken(&self) -> Vec<Notice> {
            std::mem::take(&mut *self.notices.lock().unwrap())
        }
    }

    impl Notifier for RecordingNotifier {
        fn notify(&self, notice: Notice) {
            self.notices.lock().unwrap().push(notice);
        }
    }

    #[derive(Clone, Default)]
    pub(crate) struct MemoryClipboard {
        pub contents: Arc<Mutex<Option<String>>>,
        pub deny: bool,
    }

    impl ClipboardSink for MemoryClipboard {
        fn set_text(&mut self, text: String) -> Result<(), ClipboardError> {
            if self.deny {
                return Err(ClipboardError::Rejected("permission denied".into()));
            }
            *self.contents.lock().unwrap() = Some(text);
            Ok(())
        }
    }

    #[test]
    fn recording_notifier_drains() {
        let notifier = RecordingNotifier::default();
        notifier.notify(Notice::Success("copied".into()));
        assert_eq!(notifier.taken(), vec![Notice::Success("copied".into())]);
        assert!(notifier.taken().is_empty());
    }
}
