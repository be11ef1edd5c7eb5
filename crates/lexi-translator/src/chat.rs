use std::time::Duration;

use async_trait::async_trait;
use lexi_config::translator::TranslatorConfig;
use serde::{Deserialize, Serialize};

use crate::prompt::build_prompt;
use crate::{TranslateError, Translation, Translator};

/// Chat-completion backed word translator
#[derive(Clone)]
pub struct ChatCompletionTranslator {
    client: reqwest::Client,
    api_url: String,
    default_model: String,
    max_tokens: u32,
    temperature: f32,
}

impl ChatCompletionTranslator {
    pub fn new(config: &TranslatorConfig) -> Result<Self, TranslateError> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Ok(Self::with_client(config, builder.build()?))
    }

    pub fn with_client(config: &TranslatorConfig, client: reqwest::Client) -> Self {
        Self {
            client,
            api_url: config.api_url.clone(),
            default_model: config.default_model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        }
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[async_trait]
impl Translator for ChatCompletionTranslator {
    async fn translate(
        &self,
        credential: &str,
        word: &str,
        context: &str,
        model: Option<&str>,
    ) -> Result<Translation, TranslateError> {
        let credential = credential.trim();
        if credential.is_empty() {
            return Err(TranslateError::MissingCredential);
        }

        let model = model.unwrap_or(self.default_model.as_str());
        let request = ChatRequest {
            model,
            messages: [ChatMessage {
                role: "user",
                content: build_prompt(word, context),
            }],
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        tracing::debug!("Requesting translation of '{}' from {}", word, model);

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(credential)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            // Body is best-effort, the status alone is enough to report
            let body = response.text().await.unwrap_or_default();
            tracing::warn!("Translation API returned HTTP {}", status);
            return Err(TranslateError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| TranslateError::InvalidResponse(e.to_string()))?;

        let text = body
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or(TranslateError::EmptyResponse)?;

        Ok(Translation {
            text,
            model: model.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use lexi_types::ErrorKind;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};
    use tokio::task::JoinHandle;

    use super::*;

    /// Answers exactly one HTTP request and hands back the raw request text
    async fn serve_once(status: u16, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let request = read_request(&mut socket).await;
            let reply = format!(
                "HTTP/1.1 {status} Stub\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(reply.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
            request
        });

        (format!("http://{addr}/v1/chat/completions"), handle)
    }

    async fn read_request(socket: &mut TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);

            if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                let head = String::from_utf8_lossy(&buf[..end]).to_lowercase();
                let length = head
                    .lines()
                    .find_map(|line| line.strip_prefix("content-length:"))
                    .and_then(|v| v.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if buf.len() >= end + 4 + length {
                    break;
                }
            }
        }
        String::from_utf8_lossy(&buf).into_owned()
    }

    fn translator(api_url: String) -> ChatCompletionTranslator {
        let config = TranslatorConfig {
            api_url,
            ..Default::default()
        };
        let client = reqwest::Client::builder().no_proxy().build().unwrap();
        ChatCompletionTranslator::with_client(&config, client)
    }

    #[tokio::test]
    async fn test_successful_translation_is_trimmed() {
        let (url, server) = serve_once(
            200,
            r#"{"choices":[{"message":{"role":"assistant","content":"  短暂的 \n"}}]}"#,
        )
        .await;

        let translation = translator(url)
            .translate("sk-test", "ephemeral", "Fame is ephemeral.", None)
            .await
            .unwrap();
        assert_eq!(translation.text, "短暂的");
        assert_eq!(translation.model, "gpt-4o-mini");

        let request = server.await.unwrap();
        assert!(request.to_lowercase().contains("authorization: bearer sk-test"));

        let body = request.split("\r\n\r\n").nth(1).unwrap();
        let json: serde_json::Value = serde_json::from_str(body).unwrap();
        assert_eq!(json["model"], "gpt-4o-mini");
        assert_eq!(json["max_tokens"], 100);
        assert_eq!(json["messages"].as_array().unwrap().len(), 1);
        assert_eq!(json["messages"][0]["role"], "user");
        let content = json["messages"][0]["content"].as_str().unwrap();
        assert!(content.contains("ephemeral"));
        assert!(content.contains("Fame is ephemeral."));
    }

    #[tokio::test]
    async fn test_model_override_is_sent() {
        let (url, server) =
            serve_once(200, r#"{"choices":[{"message":{"content":"猫"}}]}"#).await;

        let translation = translator(url)
            .translate("sk-test", "cat", "", Some("gpt-4o"))
            .await
            .unwrap();
        assert_eq!(translation.model, "gpt-4o");

        let request = server.await.unwrap();
        assert!(request.contains(r#""model":"gpt-4o""#));
    }

    #[tokio::test]
    async fn test_http_failure_carries_status_and_body() {
        let (url, _server) =
            serve_once(500, r#"{"error":{"message":"overloaded"}}"#).await;

        let err = translator(url)
            .translate("sk-test", "cat", "the cat sat", None)
            .await
            .unwrap_err();

        match &err {
            TranslateError::Upstream { status, body } => {
                assert_eq!(*status, 500);
                assert!(body.contains("overloaded"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(err.kind(), ErrorKind::Upstream);
    }

    #[tokio::test]
    async fn test_rejected_key_is_auth_class() {
        let (url, _server) = serve_once(401, r#"{"error":"invalid api key"}"#).await;

        let err = translator(url)
            .translate("sk-wrong", "cat", "", None)
            .await
            .unwrap_err();
        assert!(matches!(err, TranslateError::Upstream { status: 401, .. }));
        assert_eq!(err.kind(), ErrorKind::Auth);
    }

    #[tokio::test]
    async fn test_no_choices_is_empty_response() {
        let (url, _server) = serve_once(200, r#"{"choices":[]}"#).await;

        let err = translator(url)
            .translate("sk-test", "cat", "", None)
            .await
            .unwrap_err();
        assert!(matches!(err, TranslateError::EmptyResponse));
    }

    #[tokio::test]
    async fn test_blank_content_is_empty_response() {
        let (url, _server) =
            serve_once(200, r#"{"choices":[{"message":{"content":"  \n "}}]}"#).await;

        let err = translator(url)
            .translate("sk-test", "cat", "", None)
            .await
            .unwrap_err();
        assert!(matches!(err, TranslateError::EmptyResponse));
        assert_eq!(err.kind(), ErrorKind::EmptyResponse);
    }

    #[tokio::test]
    async fn test_missing_credential_sends_nothing() {
        // Nothing listens here, a request attempt would surface as a network error
        let err = translator("http://127.0.0.1:9/v1/chat/completions".to_string())
            .translate("   ", "cat", "", None)
            .await
            .unwrap_err();
        assert!(matches!(err, TranslateError::MissingCredential));
        assert_eq!(err.kind(), ErrorKind::Auth);
    }
}
