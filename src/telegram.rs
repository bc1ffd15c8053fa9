//! Messaging gateway.
//!
//! The relay only needs three Bot API calls: send a message to the channel,
//! pin a message and unpin a message. [`Messenger`] abstracts them so the
//! dispatcher can be exercised without the network.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::TelegramConfig;
use crate::{RelayError, Result};

/// Request timeout for Bot API calls.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Text markup mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ParseMode {
    #[serde(rename = "HTML")]
    Html,
}

/// How the client renders the link preview of a message.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LinkPreview {
    /// Let the client pick the first link.
    #[default]
    Default,
    /// No preview.
    Disabled,
    /// Preview a specific URL, e.g. an Instant View page.
    Url {
        url: String,
        prefer_small_media: bool,
    },
}

/// Options for [`Messenger::send_message`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SendOptions {
    pub parse_mode: Option<ParseMode>,
    pub link_preview: LinkPreview,
}

impl SendOptions {
    /// HTML message with the default preview.
    pub fn html() -> Self {
        Self {
            parse_mode: Some(ParseMode::Html),
            link_preview: LinkPreview::Default,
        }
    }

    /// Set the link preview.
    pub fn with_link_preview(mut self, link_preview: LinkPreview) -> Self {
        self.link_preview = link_preview;
        self
    }
}

/// A message accepted by the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct SentMessage {
    pub message_id: i64,
}

/// Channel messaging operations.
#[async_trait]
pub trait Messenger: Send + Sync {
    /// Post a message to the channel.
    async fn send_message(&self, text: &str, options: &SendOptions) -> Result<SentMessage>;

    /// Pin a channel message. `silent` suppresses the pin notification.
    async fn pin_message(&self, message_id: i64, silent: bool) -> Result<()>;

    /// Unpin a channel message.
    async fn unpin_message(&self, message_id: i64) -> Result<()>;
}

#[derive(Debug, Serialize)]
struct LinkPreviewOptions<'a> {
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    is_disabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<&'a str>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    prefer_small_media: bool,
}

impl<'a> LinkPreviewOptions<'a> {
    fn from_preview(preview: &'a LinkPreview) -> Option<Self> {
        match preview {
            LinkPreview::Default => None,
            LinkPreview::Disabled => Some(Self {
                is_disabled: true,
                url: None,
                prefer_small_media: false,
            }),
            LinkPreview::Url {
                url,
                prefer_small_media,
            } => Some(Self {
                is_disabled: false,
                url: Some(url),
                prefer_small_media: *prefer_small_media,
            }),
        }
    }
}

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: i64,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    parse_mode: Option<ParseMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    link_preview_options: Option<LinkPreviewOptions<'a>>,
}

#[derive(Debug, Serialize)]
struct PinMessageRequest {
    chat_id: i64,
    message_id: i64,
    disable_notification: bool,
}

#[derive(Debug, Serialize)]
struct UnpinMessageRequest {
    chat_id: i64,
    message_id: i64,
}

/// Bot API reply envelope.
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

impl<T> ApiResponse<T> {
    fn into_result(self, method: &str) -> Result<T> {
        match (self.ok, self.result) {
            (true, Some(result)) => Ok(result),
            (true, None) => Err(RelayError::Telegram(format!("{}: empty result", method))),
            (false, _) => Err(RelayError::Telegram(format!(
                "{}: {}",
                method,
                self.description.as_deref().unwrap_or("request failed")
            ))),
        }
    }
}

/// Telegram Bot API client bound to one channel.
pub struct TelegramClient {
    client: Client,
    api_base: String,
    token: String,
    channel: i64,
}

impl TelegramClient {
    /// Create a client from the Telegram configuration.
    pub fn new(config: &TelegramConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| RelayError::Telegram(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            token: config.bot_token.clone(),
            channel: config.channel,
        })
    }

    /// Target chat.
    pub fn channel(&self) -> i64 {
        self.channel
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_base, self.token, method)
    }

    async fn call<P, T>(&self, method: &str, params: &P) -> Result<T>
    where
        P: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        debug!("Calling Bot API method {}", method);

        // Error replies carry a JSON body with `ok: false`, so the status
        // code is only consulted when the body is unreadable.
        let response = self
            .client
            .post(self.method_url(method))
            .json(params)
            .send()
            .await
            .map_err(|e| RelayError::Telegram(format!("{}: {}", method, e.without_url())))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| RelayError::Telegram(format!("{}: {}", method, e.without_url())))?;

        let reply: ApiResponse<T> = serde_json::from_slice(&body).map_err(|_| {
            RelayError::Telegram(format!("{}: unexpected response (HTTP {})", method, status))
        })?;
        reply.into_result(method)
    }
}

#[async_trait]
impl Messenger for TelegramClient {
    async fn send_message(&self, text: &str, options: &SendOptions) -> Result<SentMessage> {
        let request = SendMessageRequest {
            chat_id: self.channel,
            text,
            parse_mode: options.parse_mode,
            link_preview_options: LinkPreviewOptions::from_preview(&options.link_preview),
        };
        self.call("sendMessage", &request).await
    }

    async fn pin_message(&self, message_id: i64, silent: bool) -> Result<()> {
        let request = PinMessageRequest {
            chat_id: self.channel,
            message_id,
            disable_notification: silent,
        };
        let _: bool = self.call("pinChatMessage", &request).await?;
        Ok(())
    }

    async fn unpin_message(&self, message_id: i64) -> Result<()> {
        let request = UnpinMessageRequest {
            chat_id: self.channel,
            message_id,
        };
        let _: bool = self.call("unpinChatMessage", &request).await?;
        Ok(())
    }
}
