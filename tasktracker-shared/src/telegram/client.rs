/// Telegram Bot API client
///
/// Thin `reqwest` wrapper over the three methods the service uses:
/// `getUpdates` (long polling), `sendMessage` and `answerCallbackQuery`.
/// It implements [`Notifier`], so the scheduler and the intake flow send
/// through it without knowing about Telegram.
///
/// # Example
///
/// ```no_run
/// use tasktracker_shared::notify::Notifier;
/// use tasktracker_shared::telegram::{TelegramClient, TelegramConfig};
///
/// # async fn example() -> anyhow::Result<()> {
/// let client = TelegramClient::new(TelegramConfig::from_env()?)?;
/// client.notify(123456789, "⏰ Reminder: Buy milk").await?;
/// # Ok(())
/// # }
/// ```

use super::types::{
    AnswerCallbackQueryRequest, ApiResponse, GetUpdatesRequest, InlineKeyboardButton,
    InlineKeyboardMarkup, KeyboardButton, ReplyKeyboardMarkup, ReplyMarkup, SendMessageRequest,
    Update, User,
};
use crate::config::{self, ConfigError};
use crate::error::DeliveryError;
use crate::notify::{
    Keyboard, Notifier, OutboundMessage, ADD_TASK_BUTTON, DELETE_BUTTON, LIST_TASKS_BUTTON,
};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_API_URL: &str = "https://api.telegram.org";

#[derive(Debug, Error)]
pub enum TelegramError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Telegram API error: {0}")]
    Api(String),
}

impl From<TelegramError> for DeliveryError {
    fn from(err: TelegramError) -> Self {
        match err {
            TelegramError::Http(e) => DeliveryError::Transport(e.to_string()),
            TelegramError::Api(msg) => DeliveryError::Rejected(msg),
        }
    }
}

#[derive(Clone)]
pub struct TelegramConfig {
    /// Bot token issued by @BotFather
    pub token: String,

    /// Bot API base URL
    pub api_url: String,

    /// Long-poll timeout for getUpdates (seconds)
    pub poll_timeout_secs: u64,

    /// Timeout for every other request, including sendMessage (seconds)
    pub request_timeout_secs: u64,
}

impl std::fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("token", &"***")
            .field("api_url", &self.api_url)
            .field("poll_timeout_secs", &self.poll_timeout_secs)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

impl TelegramConfig {
    /// Reads `TELEGRAM_TOKEN`, `TELEGRAM_API_URL`, `TELEGRAM_POLL_TIMEOUT_SECS`
    /// and `TELEGRAM_REQUEST_TIMEOUT_SECS`
    pub fn from_env() -> Result<Self, ConfigError> {
        config::load_dotenv();

        Ok(Self {
            token: config::required("TELEGRAM_TOKEN")?,
            api_url: config::optional("TELEGRAM_API_URL", DEFAULT_API_URL.to_string())?,
            poll_timeout_secs: config::optional("TELEGRAM_POLL_TIMEOUT_SECS", 30)?,
            request_timeout_secs: config::optional("TELEGRAM_REQUEST_TIMEOUT_SECS", 10)?,
        })
    }
}

#[derive(Clone)]
pub struct TelegramClient {
    http: reqwest::Client,
    config: Arc<TelegramConfig>,
}

impl TelegramClient {
    pub fn new(config: TelegramConfig) -> Result<Self, TelegramError> {
        // Timeouts are per request: long polls may hang far longer than sends
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            http,
            config: Arc::new(config),
        })
    }

    pub fn config(&self) -> &TelegramConfig {
        &self.config
    }

    /// Identity of the bot; used as a startup credential check
    pub async fn get_me(&self) -> Result<User, TelegramError> {
        self.call("getMe", &serde_json::json!({}), self.request_timeout())
            .await
    }

    /// Long-polls for updates with `update_id >= offset`
    pub async fn get_updates(&self, offset: i64) -> Result<Vec<Update>, TelegramError> {
        self.call(
            "getUpdates",
            &GetUpdatesRequest {
                offset,
                timeout: self.config.poll_timeout_secs,
                allowed_updates: vec!["message", "callback_query"],
            },
            // Leave room above the long-poll timeout for the response itself
            Duration::from_secs(self.config.poll_timeout_secs + 10),
        )
        .await
    }

    pub async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        keyboard: Option<Keyboard>,
    ) -> Result<(), TelegramError> {
        let _: serde_json::Value = self
            .call(
                "sendMessage",
                &SendMessageRequest {
                    chat_id,
                    text,
                    reply_markup: keyboard.map(reply_markup),
                },
                self.request_timeout(),
            )
            .await?;
        Ok(())
    }

    /// Stops the button spinner on the user's side
    pub async fn answer_callback_query(
        &self,
        callback_query_id: &str,
        text: Option<&str>,
    ) -> Result<(), TelegramError> {
        let _: bool = self
            .call(
                "answerCallbackQuery",
                &AnswerCallbackQueryRequest {
                    callback_query_id,
                    text,
                },
                self.request_timeout(),
            )
            .await?;
        Ok(())
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.config.request_timeout_secs)
    }

    async fn call<B, T>(&self, method: &str, body: &B, timeout: Duration) -> Result<T, TelegramError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}/bot{}/{}", self.config.api_url, self.config.token, method);

        let response: ApiResponse<T> = self
            .http
            .post(url)
            .timeout(timeout)
            .json(body)
            .send()
            .await
            .map_err(|e| TelegramError::Http(e.without_url()))?
            .json()
            .await
            .map_err(|e| TelegramError::Http(e.without_url()))?;

        if !response.ok {
            return Err(TelegramError::Api(
                response
                    .description
                    .unwrap_or_else(|| format!("{} failed", method)),
            ));
        }

        response
            .result
            .ok_or_else(|| TelegramError::Api(format!("{} returned no result", method)))
    }
}

#[async_trait]
impl Notifier for TelegramClient {
    async fn send(&self, recipient_id: i64, message: OutboundMessage) -> Result<(), DeliveryError> {
        self.send_message(recipient_id, &message.text, message.keyboard)
            .await
            .map_err(DeliveryError::from)
    }
}

/// Maps a transport-neutral keyboard onto Bot API markup
pub fn reply_markup(keyboard: Keyboard) -> ReplyMarkup {
    match keyboard {
        Keyboard::MainMenu => ReplyMarkup::Keyboard(ReplyKeyboardMarkup {
            keyboard: vec![vec![
                KeyboardButton {
                    text: ADD_TASK_BUTTON.to_string(),
                },
                KeyboardButton {
                    text: LIST_TASKS_BUTTON.to_string(),
                },
            ]],
            resize_keyboard: true,
        }),
        Keyboard::DeleteTask { .. } => ReplyMarkup::Inline(InlineKeyboardMarkup {
            inline_keyboard: vec![vec![InlineKeyboardButton {
                text: DELETE_BUTTON.to_string(),
                callback_data: keyboard.callback_data().unwrap_or_default(),
            }]],
        }),
    }
}
