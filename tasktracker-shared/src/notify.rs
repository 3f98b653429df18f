/// Outbound messaging capability
///
/// The intake flow and the deadline scheduler reach users only through
/// [`Notifier`]. The Telegram client is the production implementation;
/// [`RecordingNotifier`] captures messages for tests.

use crate::error::DeliveryError;
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// Main menu button that starts the add-task dialogue
pub const ADD_TASK_BUTTON: &str = "➕ Add task";

/// Main menu button that lists tasks
pub const LIST_TASKS_BUTTON: &str = "📋 All tasks";

/// Label of the per-task delete button
pub const DELETE_BUTTON: &str = "❌ Delete";

/// Callback data prefix of the per-task delete button (`delete_<task_id>`)
pub const DELETE_CALLBACK_PREFIX: &str = "delete_";

/// Keyboard attached to an outbound message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyboard {
    /// Persistent menu with the add and list buttons
    MainMenu,

    /// Inline delete button for one task
    DeleteTask { task_id: i64 },
}

impl Keyboard {
    /// Callback data carried by an inline button, if any
    pub fn callback_data(&self) -> Option<String> {
        match self {
            Keyboard::MainMenu => None,
            Keyboard::DeleteTask { task_id } => {
                Some(format!("{}{}", DELETE_CALLBACK_PREFIX, task_id))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub text: String,
    pub keyboard: Option<Keyboard>,
}

impl OutboundMessage {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            keyboard: None,
        }
    }

    pub fn with_keyboard(mut self, keyboard: Keyboard) -> Self {
        self.keyboard = Some(keyboard);
        self
    }
}

#[async_trait]
pub trait Notifier: Send + Sync {
    /// Delivers a message to a chat user
    async fn send(&self, recipient_id: i64, message: OutboundMessage) -> Result<(), DeliveryError>;

    /// Delivers plain text
    async fn notify(&self, recipient_id: i64, text: &str) -> Result<(), DeliveryError> {
        self.send(recipient_id, OutboundMessage::text(text)).await
    }
}

/// Notifier that records every message instead of sending it
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<(i64, OutboundMessage)>>,
    failing: AtomicBool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// While set, every send fails and nothing is recorded
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Everything delivered so far
    pub fn sent(&self) -> Vec<(i64, OutboundMessage)> {
        self.sent.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Texts delivered to one recipient
    pub fn texts_for(&self, recipient_id: i64) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter(|(to, _)| *to == recipient_id)
            .map(|(_, m)| m.text)
            .collect()
    }

    /// Most recent message to one recipient
    pub fn last_for(&self, recipient_id: i64) -> Option<OutboundMessage> {
        self.sent()
            .into_iter()
            .rev()
            .find(|(to, _)| *to == recipient_id)
            .map(|(_, m)| m)
    }

    pub fn clear(&self) {
        self.sent.lock().unwrap_or_else(|e| e.into_inner()).clear();
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, recipient_id: i64, message: OutboundMessage) -> Result<(), DeliveryError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(DeliveryError::Transport("simulated outage".to_string()));
        }
        self.sent
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((recipient_id, message));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delete_callback_data() {
        assert_eq!(
            Keyboard::DeleteTask { task_id: 42 }.callback_data().as_deref(),
            Some("delete_42")
        );
        assert_eq!(Keyboard::MainMenu.callback_data(), None);
    }

    #[tokio::test]
    async fn test_recording_notifier() {
        let notifier = RecordingNotifier::new();
        notifier.notify(7, "hello").await.unwrap();
        notifier
            .send(8, OutboundMessage::text("menu").with_keyboard(Keyboard::MainMenu))
            .await
            .unwrap();

        assert_eq!(notifier.texts_for(7), vec!["hello".to_string()]);
        assert_eq!(notifier.last_for(8).unwrap().keyboard, Some(Keyboard::MainMenu));

        notifier.set_failing(true);
        assert!(notifier.notify(7, "lost").await.is_err());
        assert_eq!(notifier.sent().len(), 2);
    }
}
