/// Conversational intake state machine
///
/// Turns a user's inbound events into task operations, tracking where they
/// are in the add-task dialogue:
///
/// ```text
///            add trigger             non-empty title
///   Idle ─────────────────> AwaitingTitle ───────────> AwaitingDeadline
///    ^                        │   ^ empty title           │    ^ invalid or past
///    │                        └───┘                       │    │ deadline, storage
///    │                                                    │    │ failure
///    └──────────────────── task saved ────────────────────┘────┘
/// ```
///
/// Commands other than add and cancel leave the dialogue where it is, so a
/// user can list tasks halfway through adding one. The session is written
/// before the reply goes out; if the reply then fails or times out, the new
/// state stands.

use crate::events::{EventKind, InboundEvent};
use crate::session::{SessionState, SessionStore};
use std::sync::Arc;
use tasktracker_shared::auth::CredentialService;
use tasktracker_shared::deadline::{format_deadline, DEADLINE_EXAMPLE};
use tasktracker_shared::error::{DeliveryError, StorageError, TaskError};
use tasktracker_shared::models::Task;
use tasktracker_shared::notify::{
    Keyboard, Notifier, OutboundMessage, ADD_TASK_BUTTON, LIST_TASKS_BUTTON,
};
use tasktracker_shared::service::TaskService;
use thiserror::Error;

/// Failure the intake loop should log; the user has already been told
#[derive(Debug, Error)]
pub enum IntakeError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Delivery(#[from] DeliveryError),
}

pub struct IntakeMachine {
    tasks: TaskService,
    credentials: CredentialService,
    sessions: Arc<dyn SessionStore>,
    notifier: Arc<dyn Notifier>,
}

impl IntakeMachine {
    pub fn new(
        tasks: TaskService,
        credentials: CredentialService,
        sessions: Arc<dyn SessionStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            tasks,
            credentials,
            sessions,
            notifier,
        }
    }

    /// Processes one event to completion, including the reply
    pub async fn handle(&self, event: InboundEvent) -> Result<(), IntakeError> {
        let user_id = event.user_id;
        tracing::debug!(user_id, kind = ?event.kind, "Handling event");

        match event.kind {
            EventKind::Start => self.reply(user_id, greeting()).await,
            EventKind::Add => self.begin_add(user_id).await,
            EventKind::LegacyAdd(args) => self.legacy_add(user_id, &args).await,
            EventKind::List => self.list(user_id).await,
            EventKind::RequestCode => self.request_code(user_id).await,
            EventKind::Cancel => self.cancel(user_id).await,
            EventKind::Delete { task_id } => self.delete(user_id, task_id).await,
            EventKind::UnknownCommand(command) => {
                tracing::debug!(user_id, command = %command, "Unknown command");
                self.reply(user_id, OutboundMessage::text(UNKNOWN_COMMAND)).await
            }
            EventKind::Text(text) => self.text(user_id, &text).await,
        }
    }

    async fn begin_add(&self, user_id: i64) -> Result<(), IntakeError> {
        if let Err(e) = self.sessions.save(user_id, &SessionState::AwaitingTitle).await {
            return self.storage_failure(user_id, e).await;
        }
        self.reply(user_id, OutboundMessage::text(ASK_TITLE)).await
    }

    async fn text(&self, user_id: i64, text: &str) -> Result<(), IntakeError> {
        let state = match self.sessions.load(user_id).await {
            Ok(state) => state,
            Err(e) => return self.storage_failure(user_id, e).await,
        };

        match state {
            SessionState::Idle => {
                self.reply(
                    user_id,
                    OutboundMessage::text(HELP_HINT).with_keyboard(Keyboard::MainMenu),
                )
                .await
            }
            SessionState::AwaitingTitle => self.accept_title(user_id, text).await,
            SessionState::AwaitingDeadline { title } => {
                self.accept_deadline(user_id, &title, text).await
            }
        }
    }

    async fn accept_title(&self, user_id: i64, text: &str) -> Result<(), IntakeError> {
        let title = text.trim();
        if title.is_empty() {
            return self.reply(user_id, OutboundMessage::text(EMPTY_TITLE)).await;
        }

        let next = SessionState::AwaitingDeadline {
            title: title.to_string(),
        };
        if let Err(e) = self.sessions.save(user_id, &next).await {
            return self.storage_failure(user_id, e).await;
        }

        self.reply(user_id, OutboundMessage::text(ask_deadline())).await
    }

    async fn accept_deadline(
        &self,
        user_id: i64,
        title: &str,
        text: &str,
    ) -> Result<(), IntakeError> {
        match self.tasks.create_task(user_id, title, text.trim()).await {
            Ok(()) => {
                if let Err(e) = self.sessions.save(user_id, &SessionState::Idle).await {
                    // The task exists; a stale session only costs a repeated prompt
                    tracing::warn!(user_id, error = %e, "Failed to reset session after save");
                }
                self.reply(
                    user_id,
                    OutboundMessage::text(TASK_SAVED).with_keyboard(Keyboard::MainMenu),
                )
                .await
            }
            Err(TaskError::Validation(e)) => {
                self.reply(user_id, OutboundMessage::text(e.message())).await
            }
            Err(TaskError::Storage(e)) => {
                tracing::error!(user_id, error = %e, "Task creation failed");
                self.reply(user_id, OutboundMessage::text(SAVE_FAILED)).await?;
                Err(e.into())
            }
        }
    }

    /// `/add <title>, <deadline>` without touching the session
    async fn legacy_add(&self, user_id: i64, args: &str) -> Result<(), IntakeError> {
        let parts: Vec<&str> = args.split(',').collect();
        let [title, deadline] = parts.as_slice() else {
            return self.reply(user_id, OutboundMessage::text(legacy_usage())).await;
        };

        match self.tasks.create_task(user_id, title, deadline.trim()).await {
            Ok(()) => self.reply(user_id, OutboundMessage::text(TASK_SAVED)).await,
            Err(TaskError::Validation(e)) => {
                self.reply(user_id, OutboundMessage::text(e.message())).await
            }
            Err(TaskError::Storage(e)) => {
                tracing::error!(user_id, error = %e, "Task creation failed");
                self.reply(user_id, OutboundMessage::text(SAVE_FAILED)).await?;
                Err(e.into())
            }
        }
    }

    async fn list(&self, user_id: i64) -> Result<(), IntakeError> {
        let tasks = match self.tasks.list_tasks(user_id).await {
            Ok(tasks) => tasks,
            Err(e) => return self.storage_failure(user_id, e).await,
        };

        if tasks.is_empty() {
            return self.reply(user_id, OutboundMessage::text(NO_TASKS)).await;
        }

        self.reply(user_id, OutboundMessage::text(LIST_HEADER)).await?;
        for (index, task) in tasks.iter().enumerate() {
            self.reply(user_id, list_item(index + 1, task)).await?;
        }
        Ok(())
    }

    async fn delete(&self, user_id: i64, task_id: i64) -> Result<(), IntakeError> {
        match self.tasks.delete_task(task_id).await {
            Ok(()) => self.reply(user_id, OutboundMessage::text(TASK_DELETED)).await,
            Err(e) => {
                tracing::error!(user_id, task_id, error = %e, "Task deletion failed");
                self.reply(user_id, OutboundMessage::text(DELETE_FAILED)).await?;
                Err(e.into())
            }
        }
    }

    async fn request_code(&self, user_id: i64) -> Result<(), IntakeError> {
        match self.credentials.request_code(user_id).await {
            Ok(code) => self.reply(user_id, OutboundMessage::text(code_issued(&code))).await,
            Err(e) => {
                tracing::error!(user_id, error = %e, "Failed to issue login code");
                self.reply(user_id, OutboundMessage::text(CODE_FAILED)).await
            }
        }
    }

    async fn cancel(&self, user_id: i64) -> Result<(), IntakeError> {
        if let Err(e) = self.sessions.save(user_id, &SessionState::Idle).await {
            return self.storage_failure(user_id, e).await;
        }
        self.reply(
            user_id,
            OutboundMessage::text(CANCELLED).with_keyboard(Keyboard::MainMenu),
        )
        .await
    }

    async fn storage_failure(&self, user_id: i64, err: StorageError) -> Result<(), IntakeError> {
        tracing::error!(user_id, error = %err, "Storage failure while handling event");
        self.reply(user_id, OutboundMessage::text(TRY_AGAIN)).await?;
        Err(err.into())
    }

    async fn reply(&self, user_id: i64, message: OutboundMessage) -> Result<(), IntakeError> {
        self.notifier.send(user_id, message).await?;
        Ok(())
    }
}

const ASK_TITLE: &str = "What is the task? Send its title.";
const EMPTY_TITLE: &str = "The title can't be empty. Send the task title.";
const TASK_SAVED: &str = "✅ Task saved! I'll remind you before the deadline.";
const SAVE_FAILED: &str = "Could not save the task. Send the deadline again to retry.";
const NO_TASKS: &str = "You have no active tasks 🎉";
const LIST_HEADER: &str = "📋 Your active tasks:";
const TASK_DELETED: &str = "🗑 Task deleted.";
const DELETE_FAILED: &str = "Could not delete the task, please try again.";
const CODE_FAILED: &str = "Could not issue a login code, please try again.";
const CANCELLED: &str = "Cancelled.";
const TRY_AGAIN: &str = "Something went wrong, please try again.";
const UNKNOWN_COMMAND: &str = "Unknown command. Try /add or /list.";

const HELP_HINT: &str = "Use the menu below to add a task or see your tasks.";

fn greeting() -> OutboundMessage {
    OutboundMessage::text(format!(
        "Hi! Send me tasks to keep an eye on.\n\
         Tap {} or {}, or add one in a single message:\n/add Task, {}",
        ADD_TASK_BUTTON, LIST_TASKS_BUTTON, DEADLINE_EXAMPLE
    ))
    .with_keyboard(Keyboard::MainMenu)
}

fn ask_deadline() -> String {
    format!("When is it due? Send the deadline, e.g. {}", DEADLINE_EXAMPLE)
}

fn legacy_usage() -> String {
    format!("Usage: /add Task, {}", DEADLINE_EXAMPLE)
}

fn code_issued(code: &str) -> String {
    format!("Your login code: {}\nIt is valid for 5 minutes.", code)
}

fn list_item(position: usize, task: &Task) -> OutboundMessage {
    OutboundMessage::text(format!(
        "{}. {}\n⏰ {}",
        position,
        task.title,
        format_deadline(task.deadline)
    ))
    .with_keyboard(Keyboard::DeleteTask { task_id: task.id })
}
