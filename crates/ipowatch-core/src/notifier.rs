//! Outbound transition messages.
//!
//! A [`Notifier`] delivers at most one message per call and never retries;
//! the caller decides what a failure means for the run.

use std::fmt::Write as _;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::config::TelegramConfig;
use crate::http_client::{HttpClient, HttpRequest};
use crate::IpoInfo;

const SEND_TIMEOUT_MS: u64 = 30_000;
const REDACTED: &str = "<redacted>";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotifyError {
    #[error("message delivery failed: {message}")]
    Transport { message: String, timed_out: bool },

    #[error("messaging endpoint rejected the bot credentials (HTTP {status})")]
    Unauthorized { status: u16 },

    #[error("messaging endpoint rejected the message (HTTP {status}): {description}")]
    Rejected { status: u16, description: String },

    #[error("failed to encode message: {0}")]
    Encode(String),
}

impl NotifyError {
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Transport { .. } => "notify.transport",
            Self::Unauthorized { .. } => "notify.unauthorized",
            Self::Rejected { .. } => "notify.rejected",
            Self::Encode(_) => "notify.encode",
        }
    }
}

pub type NotifyFuture<'a> = Pin<Box<dyn Future<Output = Result<(), NotifyError>> + Send + 'a>>;

/// Destination for "status changed" messages.
pub trait Notifier: Send + Sync {
    fn notify<'a>(&'a self, previous: &'a IpoInfo, current: &'a IpoInfo) -> NotifyFuture<'a>;
}

/// Telegram Bot API `sendMessage` delivery.
pub struct TelegramNotifier {
    config: TelegramConfig,
    http_client: Arc<dyn HttpClient>,
}

impl TelegramNotifier {
    pub fn new(config: TelegramConfig, http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            config,
            http_client,
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/bot{}/sendMessage",
            self.config.api_base, self.config.bot_token
        )
    }

    fn redact(&self, text: &str) -> String {
        if self.config.bot_token.is_empty() {
            return text.to_owned();
        }
        text.replace(&self.config.bot_token, REDACTED)
    }

    async fn send(&self, text: String) -> Result<(), NotifyError> {
        let payload = SendMessage {
            chat_id: &self.config.chat_id,
            text: &text,
            parse_mode: "HTML",
            disable_web_page_preview: true,
        };
        let request = HttpRequest::post(self.endpoint())
            .with_json(&payload)
            .map_err(|e| NotifyError::Encode(e.to_string()))?
            .with_timeout_ms(SEND_TIMEOUT_MS);

        debug!(chat_id = %self.config.chat_id, bytes = text.len(), "sending message");
        let response = self
            .http_client
            .execute(request)
            .await
            .map_err(|e| NotifyError::Transport {
                message: self.redact(e.message()),
                timed_out: e.timed_out(),
            })?;

        let reply = serde_json::from_str::<SendMessageReply>(&response.body).ok();
        match response.status {
            401 | 403 => Err(NotifyError::Unauthorized {
                status: response.status,
            }),
            status if response.is_success() && reply.as_ref().is_some_and(|r| r.ok) => {
                info!(status, chat_id = %self.config.chat_id, "message delivered");
                Ok(())
            }
            status => {
                let description = reply
                    .and_then(|r| r.description)
                    .unwrap_or_else(|| String::from("unexpected response"));
                Err(NotifyError::Rejected {
                    status,
                    description: self.redact(&description),
                })
            }
        }
    }
}

impl Notifier for TelegramNotifier {
    fn notify<'a>(&'a self, previous: &'a IpoInfo, current: &'a IpoInfo) -> NotifyFuture<'a> {
        Box::pin(async move { self.send(format_transition(previous, current)).await })
    }
}

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'static str,
    disable_web_page_preview: bool,
}

#[derive(Debug, Deserialize)]
struct SendMessageReply {
    #[serde(default)]
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

/// Renders the HTML message announcing `previous -> current`.
pub fn format_transition(previous: &IpoInfo, current: &IpoInfo) -> String {
    let mut message = String::new();
    let status = current.status;

    let _ = writeln!(
        message,
        "{} <b>IPO Alert: {}</b>",
        status.emoji(),
        escape_html(current.symbol.as_str())
    );
    message.push('\n');
    let _ = writeln!(
        message,
        "<b>Status:</b> {} → {}",
        previous.status.code(),
        status.code()
    );
    let _ = writeln!(message, "<b>Stage:</b> {}", status.label());

    let optional = [
        ("Company", current.company_name.as_deref()),
        ("Exchange", current.exchange.as_deref()),
        ("Listing Date", current.listing_date.as_deref()),
    ];
    for (name, value) in optional {
        if let Some(value) = value {
            let _ = writeln!(message, "<b>{name}:</b> {}", escape_html(value));
        }
    }
    if let Some(price) = current.price {
        let _ = writeln!(message, "<b>Price:</b> ${price:.2}");
    }
    if let Some(details) = current.details.as_deref() {
        let _ = writeln!(message, "\n<i>{}</i>", escape_html(details));
    }
    if current.is_tradeable() {
        message.push_str("\n<b>Shares are now available for trading!</b>");
    }

    message.trim_end().to_owned()
}

fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            other => escaped.push(other),
        }
    }
    escaped
}
