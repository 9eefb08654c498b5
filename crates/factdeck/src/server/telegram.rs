//! Minimal Telegram Bot API surface: the update shape we read and the four
//! methods we call.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

const API_BASE: &str = "https://api.telegram.org";

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<Message>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub chat: Chat,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InlineKeyboardMarkup {
    pub inline_keyboard: Vec<Vec<InlineKeyboardButton>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InlineKeyboardButton {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub web_app: Option<WebAppInfo>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WebAppInfo {
    pub url: String,
}

impl InlineKeyboardMarkup {
    /// A single button that opens `url` as a web app inside the chat client.
    pub fn web_app_button(text: &str, url: &str) -> Self {
        Self {
            inline_keyboard: vec![vec![InlineKeyboardButton {
                text: text.to_string(),
                web_app: Some(WebAppInfo {
                    url: url.to_string(),
                }),
            }]],
        }
    }
}

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: i64,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_markup: Option<&'a InlineKeyboardMarkup>,
}

#[derive(Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

impl<T> ApiResponse<T> {
    fn into_result(self, method: &str) -> Result<Option<T>> {
        if !self.ok {
            anyhow::bail!(
                "{method} rejected: {}",
                self.description.as_deref().unwrap_or("no description")
            );
        }
        Ok(self.result)
    }
}

/// Outbound Bot API calls. Blocking; call from `spawn_blocking` in async code.
pub trait BotApi: Send + Sync {
    fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        markup: Option<&InlineKeyboardMarkup>,
    ) -> Result<()>;

    /// Returns the raw API reply so it can be echoed back to the operator.
    fn set_webhook(&self, url: &str) -> Result<serde_json::Value>;

    fn delete_webhook(&self) -> Result<()>;

    fn get_updates(&self, offset: Option<i64>, timeout_secs: u64) -> Result<Vec<Update>>;
}

/// Bot API over HTTPS with ureq. Not `Debug`: the base URL embeds the token.
///
/// The agent hands back 4xx/5xx replies as responses, since the API explains
/// its rejections in the JSON body.
pub struct TelegramApi {
    agent: ureq::Agent,
    base: String,
}

impl TelegramApi {
    pub fn new(token: &str) -> Self {
        Self::with_base(API_BASE, token)
    }

    pub fn with_base(api_base: &str, token: &str) -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .into();
        Self {
            agent,
            base: format!("{}/bot{token}", api_base.trim_end_matches('/')),
        }
    }

    fn url(&self, method: &str) -> String {
        format!("{}/{method}", self.base)
    }

    fn read<T: DeserializeOwned>(
        method: &str,
        response: std::result::Result<ureq::http::Response<ureq::Body>, ureq::Error>,
    ) -> Result<Option<T>> {
        let mut response = response.with_context(|| format!("Failed to call {method}"))?;
        let status = response.status();
        let reply: ApiResponse<T> = response
            .body_mut()
            .read_json()
            .with_context(|| format!("Failed to parse {method} response ({status})"))?;
        reply.into_result(method)
    }
}

impl BotApi for TelegramApi {
    fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        markup: Option<&InlineKeyboardMarkup>,
    ) -> Result<()> {
        let body = SendMessage {
            chat_id,
            text,
            reply_markup: markup,
        };
        let response = self.agent.post(&self.url("sendMessage")).send_json(&body);
        Self::read::<serde_json::Value>("sendMessage", response)?;
        Ok(())
    }

    fn set_webhook(&self, url: &str) -> Result<serde_json::Value> {
        let mut response = self
            .agent
            .get(&self.url("setWebhook"))
            .query("url", url)
            .call()
            .context("Failed to call setWebhook")?;
        let status = response.status();
        response
            .body_mut()
            .read_json()
            .with_context(|| format!("Failed to parse setWebhook response ({status})"))
    }

    fn delete_webhook(&self) -> Result<()> {
        let response = self.agent.get(&self.url("deleteWebhook")).call();
        Self::read::<serde_json::Value>("deleteWebhook", response)?;
        Ok(())
    }

    fn get_updates(&self, offset: Option<i64>, timeout_secs: u64) -> Result<Vec<Update>> {
        let mut request = self
            .agent
            .get(&self.url("getUpdates"))
            .query("timeout", timeout_secs.to_string());
        if let Some(offset) = offset {
            request = request.query("offset", offset.to_string());
        }
        let updates = Self::read::<Vec<Update>>("getUpdates", request.call())?;
        Ok(updates.unwrap_or_default())
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_deserializes_with_unknown_fields() {
        let raw = r#"{
            "update_id": 42,
            "message": {
                "message_id": 7,
                "from": {"id": 1, "is_bot": false, "first_name": "Ada"},
                "chat": {"id": -100, "type": "private"},
                "date": 1700000000,
                "text": "/start"
            }
        }"#;
        let update: Update = serde_json::from_str(raw).unwrap();
        assert_eq!(update.update_id, 42);
        let message = update.message.unwrap();
        assert_eq!(message.chat.id, -100);
        assert_eq!(message.text.as_deref(), Some("/start"));
    }

    #[test]
    fn test_update_without_message() {
        let update: Update =
            serde_json::from_str(r#"{"update_id": 1, "callback_query": {}}"#).unwrap();
        assert!(update.message.is_none());
    }

    #[test]
    fn test_web_app_button_shape() {
        let markup = InlineKeyboardMarkup::web_app_button("Play", "https://x.example/");
        let json = serde_json::to_value(&markup).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "inline_keyboard": [[{"text": "Play", "web_app": {"url": "https://x.example/"}}]]
            })
        );
    }

    #[test]
    fn test_send_message_body_omits_missing_markup() {
        let body = SendMessage {
            chat_id: 5,
            text: "hi",
            reply_markup: None,
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({"chat_id": 5, "text": "hi"})
        );
    }

    #[test]
    fn test_api_response_error_carries_description() {
        let reply: ApiResponse<serde_json::Value> =
            serde_json::from_str(r#"{"ok": false, "description": "Unauthorized"}"#).unwrap();
        let err = reply.into_result("getUpdates").unwrap_err();
        assert_eq!(err.to_string(), "getUpdates rejected: Unauthorized");
    }

    /// Serve canned Bot API replies on a local port, standing in for the real host.
    async fn local_api(status: axum::http::StatusCode, reply: serde_json::Value) -> String {
        use axum::routing::any;
        let app = axum::Router::new().route(
            "/*path",
            any(move || async move { (status, axum::Json(reply)) }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn test_set_webhook_returns_rejection_body() {
        let base = local_api(
            axum::http::StatusCode::BAD_REQUEST,
            serde_json::json!({
                "ok": false,
                "error_code": 400,
                "description": "Bad Request: bad webhook: HTTPS url must be provided for webhook"
            }),
        )
        .await;
        let api = TelegramApi::with_base(&base, "123:abc");
        let reply = tokio::task::spawn_blocking(move || api.set_webhook("http://localhost/api/bot"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(reply["ok"], false);
        assert_eq!(reply["error_code"], 400);
    }

    #[tokio::test]
    async fn test_error_status_surfaces_api_description() {
        let base = local_api(
            axum::http::StatusCode::UNAUTHORIZED,
            serde_json::json!({"ok": false, "error_code": 401, "description": "Unauthorized"}),
        )
        .await;
        let api = TelegramApi::with_base(&base, "123:abc");
        let err = tokio::task::spawn_blocking(move || api.delete_webhook())
            .await
            .unwrap()
            .unwrap_err();
        assert_eq!(err.to_string(), "deleteWebhook rejected: Unauthorized");
    }

    #[test]
    fn test_method_url() {
        let api = TelegramApi::with_base("https://api.example.org/", "123:abc");
        assert_eq!(api.url("getMe"), "https://api.example.org/bot123:abc/getMe");
    }
}
