//! One-shot, dismissible user notices.

use tokio::sync::mpsc;

/// Generic message for any failed mutation.
pub const FAILURE_MESSAGE: &str = "Something went wrong. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Failure,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Failure,
            message: message.into(),
        }
    }
}

/// Sending half of the notice channel. Sends never block and are dropped
/// silently when nobody is listening.
#[derive(Debug, Clone)]
pub struct Notifier {
    sender: mpsc::UnboundedSender<Notice>,
}

impl Notifier {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Notice>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }

    pub fn success(&self, message: impl Into<String>) {
        self.send(Notice::success(message));
    }

    pub fn failure(&self, message: impl Into<String>) {
        self.send(Notice::failure(message));
    }

    fn send(&self, notice: Notice) {
        let _ = self.sender.send(notice);
    }
}
