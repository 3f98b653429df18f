/// Inbound events
///
/// Every Telegram update the bot cares about is reduced to an
/// [`InboundEvent`]: the user it came from and what they asked for. Menu
/// buttons arrive as plain text and are mapped onto the same triggers as
/// their commands.
///
/// # Example
///
/// ```
/// use tasktracker_bot::events::{classify_text, EventKind};
///
/// assert_eq!(classify_text("/list"), EventKind::List);
/// assert_eq!(classify_text("➕ Add task"), EventKind::Add);
/// assert_eq!(
///     classify_text("/add Buy milk, 2.1.2026 15:04"),
///     EventKind::LegacyAdd("Buy milk, 2.1.2026 15:04".to_string())
/// );
/// ```

use tasktracker_shared::notify::{ADD_TASK_BUTTON, DELETE_CALLBACK_PREFIX, LIST_TASKS_BUTTON};
use tasktracker_shared::telegram::types::Update;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    /// `/start`
    Start,

    /// `/add` with no arguments, or the add menu button
    Add,

    /// `/add <title>, <deadline>` in a single message
    LegacyAdd(String),

    /// `/list`, or the list menu button
    List,

    /// `/code`: issue a one-time login code
    RequestCode,

    /// `/cancel`
    Cancel,

    /// Any other slash command
    UnknownCommand(String),

    /// Free text
    Text(String),

    /// Inline delete button
    Delete { task_id: i64 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundEvent {
    pub user_id: i64,
    pub kind: EventKind,
}

impl InboundEvent {
    pub fn new(user_id: i64, kind: EventKind) -> Self {
        Self { user_id, kind }
    }

    /// Extracts the event carried by an update, if any
    ///
    /// Messages without text, and callbacks whose data is not a delete
    /// button, produce nothing.
    pub fn from_update(update: &Update) -> Option<Self> {
        if let Some(message) = &update.message {
            let text = message.text.as_deref()?;
            return Some(Self::new(message.chat.id, classify_text(text)));
        }

        if let Some(callback) = &update.callback_query {
            let kind = classify_callback(callback.data.as_deref()?)?;
            let user_id = callback
                .message
                .as_ref()
                .map(|m| m.chat.id)
                .unwrap_or(callback.from.id);
            return Some(Self::new(user_id, kind));
        }

        None
    }
}

pub fn classify_text(text: &str) -> EventKind {
    let trimmed = text.trim();

    if trimmed == ADD_TASK_BUTTON {
        return EventKind::Add;
    }
    if trimmed == LIST_TASKS_BUTTON {
        return EventKind::List;
    }

    let Some(command_line) = trimmed.strip_prefix('/') else {
        return EventKind::Text(text.to_string());
    };

    let (command, args) = match command_line.split_once(char::is_whitespace) {
        Some((command, args)) => (command, args.trim()),
        None => (command_line, ""),
    };
    // Group chats address commands as `/add@SomeBot`
    let command = command.split('@').next().unwrap_or(command);

    match command {
        "start" => EventKind::Start,
        "add" if args.is_empty() => EventKind::Add,
        "add" => EventKind::LegacyAdd(args.to_string()),
        "list" => EventKind::List,
        "code" => EventKind::RequestCode,
        "cancel" => EventKind::Cancel,
        other => EventKind::UnknownCommand(other.to_string()),
    }
}

/// Maps `delete_<task_id>` callback data to a delete event
pub fn classify_callback(data: &str) -> Option<EventKind> {
    let task_id = data.strip_prefix(DELETE_CALLBACK_PREFIX)?.parse().ok()?;
    Some(EventKind::Delete { task_id })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tasktracker_shared::telegram::types::{CallbackQuery, Chat, Message, User};

    fn user(id: i64) -> User {
        User {
            id,
            is_bot: false,
            first_name: "Ann".to_string(),
            username: None,
        }
    }

    fn message(chat_id: i64, text: Option<&str>) -> Message {
        Message {
            message_id: 1,
            from: Some(user(chat_id)),
            chat: Chat {
                id: chat_id,
                chat_type: "private".to_string(),
            },
            text: text.map(str::to_string),
        }
    }

    #[test]
    fn test_commands() {
        assert_eq!(classify_text("/start"), EventKind::Start);
        assert_eq!(classify_text("/add"), EventKind::Add);
        assert_eq!(classify_text("/add   "), EventKind::Add);
        assert_eq!(classify_text("/list"), EventKind::List);
        assert_eq!(classify_text("/code"), EventKind::RequestCode);
        assert_eq!(classify_text("/cancel"), EventKind::Cancel);
        assert_eq!(
            classify_text("/frobnicate now"),
            EventKind::UnknownCommand("frobnicate".to_string())
        );
    }

    #[test]
    fn test_bot_suffix_is_ignored() {
        assert_eq!(classify_text("/list@TaskTrackerBot"), EventKind::List);
        assert_eq!(
            classify_text("/add@TaskTrackerBot Walk, 2.1.2026 9:00"),
            EventKind::LegacyAdd("Walk, 2.1.2026 9:00".to_string())
        );
    }

    #[test]
    fn test_menu_buttons() {
        assert_eq!(classify_text(ADD_TASK_BUTTON), EventKind::Add);
        assert_eq!(classify_text(LIST_TASKS_BUTTON), EventKind::List);
    }

    #[test]
    fn test_free_text_is_kept_verbatim() {
        assert_eq!(
            classify_text("  Buy milk "),
            EventKind::Text("  Buy milk ".to_string())
        );
    }

    #[test]
    fn test_callbacks() {
        assert_eq!(
            classify_callback("delete_42"),
            Some(EventKind::Delete { task_id: 42 })
        );
        assert_eq!(classify_callback("delete_abc"), None);
        assert_eq!(classify_callback("archive_42"), None);
    }

    #[test]
    fn test_from_update_message() {
        let update = Update {
            update_id: 1,
            message: Some(message(7, Some("/list"))),
            callback_query: None,
        };
        assert_eq!(
            InboundEvent::from_update(&update),
            Some(InboundEvent::new(7, EventKind::List))
        );

        let update = Update {
            update_id: 2,
            message: Some(message(7, None)),
            callback_query: None,
        };
        assert_eq!(InboundEvent::from_update(&update), None);
    }

    #[test]
    fn test_from_update_callback() {
        let update = Update {
            update_id: 3,
            message: None,
            callback_query: Some(CallbackQuery {
                id: "cb-1".to_string(),
                from: user(7),
                message: Some(message(7, Some("1. Buy milk"))),
                data: Some("delete_5".to_string()),
            }),
        };
        assert_eq!(
            InboundEvent::from_update(&update),
            Some(InboundEvent::new(7, EventKind::Delete { task_id: 5 }))
        );
    }
}
