use std::time::Duration;

use reqwest::blocking::Client as HttpClient;
use serde::{Deserialize, Serialize};
use tabletalk_core::config::LlmSettings;

use crate::error::LlmError;

const SERVICE: &str = "completion service";

/// A blocking text-completion call: one prompt in, one reply out.
pub trait Completion {
    fn complete(&self, prompt: &str) -> Result<String, LlmError>;
}

impl<C: Completion + ?Sized> Completion for &C {
    fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        (**self).complete(prompt)
    }
}

impl<C: Completion + ?Sized> Completion for Box<C> {
    fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        (**self).complete(prompt)
    }
}

/// Client for an OpenAI-compatible `/chat/completions` endpoint (OpenAI,
/// LM Studio, and friends).
#[derive(Debug, Clone)]
pub struct ChatCompletionClient {
    http: HttpClient,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    temperature: f32,
    stream: bool,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl ChatCompletionClient {
    pub fn new(base_url: &str, model: &str, api_key: Option<String>) -> Result<Self, LlmError> {
        Self::with_timeout(base_url, model, api_key, None)
    }

    pub fn from_settings(settings: &LlmSettings) -> Result<Self, LlmError> {
        Self::with_timeout(
            &settings.base_url,
            &settings.model,
            settings.api_key.clone(),
            settings.timeout_secs.map(Duration::from_secs),
        )
    }

    fn with_timeout(
        base_url: &str,
        model: &str,
        api_key: Option<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, LlmError> {
        Ok(Self {
            http: build_http_client(timeout)?,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

impl Completion for ChatCompletionClient {
    fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        let url = format!("{}/chat/completions", self.base_url);
        let payload = ChatRequest {
            model: &self.model,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: 0.0,
            stream: false,
        };

        tracing::debug!(model = %self.model, %url, "Requesting completion");
        let body = post_json(&self.http, &url, self.api_key.as_deref(), &payload, SERVICE)?;

        let parsed: ChatResponse = serde_json::from_str(&body).map_err(|e| LlmError::Decode {
            service: SERVICE,
            message: e.to_string(),
        })?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or(LlmError::EmptyResponse(SERVICE))
    }
}

/// `reqwest`'s blocking client times out after 30s by default; `None`
/// here means no timeout at all.
pub(crate) fn build_http_client(timeout: Option<Duration>) -> Result<HttpClient, LlmError> {
    HttpClient::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| LlmError::Config(format!("Failed to build HTTP client: {e}")))
}

/// POST a JSON body and return the response text of a 2xx reply.
pub(crate) fn post_json<T: Serialize + ?Sized>(
    http: &HttpClient,
    url: &str,
    api_key: Option<&str>,
    payload: &T,
    service: &'static str,
) -> Result<String, LlmError> {
    let mut request = http.post(url).json(payload);
    if let Some(key) = api_key {
        request = request.bearer_auth(key);
    }

    let response = request
        .send()
        .map_err(|source| LlmError::Network { service, source })?;

    let status = response.status();
    let body = response
        .text()
        .map_err(|source| LlmError::Network { service, source })?;

    if !status.is_success() {
        return Err(LlmError::Status {
            service,
            status: status.as_u16(),
            body,
        });
    }
    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use serde_json::json;

    const OK_BODY: &str = r#"{"choices":[{"message":{"role":"assistant","content":"Revenue By Region"}}]}"#;

    #[test]
    fn test_complete_sends_openai_payload() {
        let mut server = Server::new();
        let mock = server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer sk-test")
            .match_body(Matcher::PartialJson(json!({
                "model": "gpt-3.5-turbo",
                "messages": [{"role": "user", "content": "Title please"}],
                "temperature": 0.0,
                "stream": false
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(OK_BODY)
            .create();

        let client =
            ChatCompletionClient::new(&server.url(), "gpt-3.5-turbo", Some("sk-test".into()))
                .unwrap();
        let reply = client.complete("Title please").unwrap();

        mock.assert();
        assert_eq!(reply, "Revenue By Region");
    }

    #[test]
    fn test_no_key_sends_no_auth_header() {
        let mut server = Server::new();
        let mock = server
            .mock("POST", "/v1/chat/completions")
            .match_header("authorization", Matcher::Missing)
            .with_status(200)
            .with_body(OK_BODY)
            .create();

        let base = format!("{}/v1/", server.url());
        let client = ChatCompletionClient::new(&base, "local-model", Some("  ".into())).unwrap();
        assert_eq!(client.complete("hi").unwrap(), "Revenue By Region");
        mock.assert();
    }

    #[test]
    fn test_http_error_propagates() {
        let mut server = Server::new();
        server
            .mock("POST", "/chat/completions")
            .with_status(429)
            .with_body(r#"{"error":{"message":"You exceeded your current quota"}}"#)
            .create();

        let client = ChatCompletionClient::new(&server.url(), "gpt-3.5-turbo", None).unwrap();
        match client.complete("hi").unwrap_err() {
            LlmError::Status { status, body, .. } => {
                assert_eq!(status, 429);
                assert!(body.contains("quota"));
            }
            other => panic!("expected status error, got {other:?}"),
        }
    }

    #[test]
    fn test_malformed_body_is_decode_error() {
        let mut server = Server::new();
        server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body("<html>gateway</html>")
            .create();

        let client = ChatCompletionClient::new(&server.url(), "m", None).unwrap();
        assert!(matches!(
            client.complete("hi").unwrap_err(),
            LlmError::Decode { .. }
        ));
    }

    #[test]
    fn test_empty_choices_is_error() {
        let mut server = Server::new();
        server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body(r#"{"choices":[]}"#)
            .create();

        let client = ChatCompletionClient::new(&server.url(), "m", None).unwrap();
        assert!(matches!(
            client.complete("hi").unwrap_err(),
            LlmError::EmptyResponse(_)
        ));
    }

    #[test]
    fn test_unreachable_server_is_network_error() {
        let client = ChatCompletionClient::new("http://127.0.0.1:9", "m", None).unwrap();
        assert!(matches!(
            client.complete("hi").unwrap_err(),
            LlmError::Network { .. }
        ));
    }
}
