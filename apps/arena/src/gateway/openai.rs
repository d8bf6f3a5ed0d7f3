//! OpenAI-compatible chat completions client and provider routing.

use std::env;
use std::time::Duration;

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use super::random::RandomAgent;
use super::GenerationError;

/// Backend family selected by a model identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    OpenAi,
    OpenRouter,
    Glm,
    /// Offline [`RandomAgent`].
    Random,
}

impl Provider {
    /// Resolve a model identifier into a provider and the provider-side model name.
    ///
    /// - `openrouter/<slug>` → OpenRouter with `<slug>`
    /// - `glm/<model>` → GLM with `<model>`
    /// - `random` → offline agent
    /// - anything containing `gpt` → OpenAI
    pub fn route(model: &str) -> Result<(Provider, &str), GenerationError> {
        if let Some(slug) = model.strip_prefix("openrouter/") {
            return Ok((Provider::OpenRouter, slug));
        }
        if let Some(name) = model.strip_prefix("glm/") {
            return Ok((Provider::Glm, name));
        }
        if model == RandomAgent::NAME {
            return Ok((Provider::Random, model));
        }
        if model.contains("gpt") {
            return Ok((Provider::OpenAi, model));
        }
        let family = if model.starts_with("claude") {
            "Anthropic models"
        } else if model.starts_with("gemini") {
            "Vertex models"
        } else {
            "other vendors"
        };
        Err(GenerationError::Provider(format!(
            "no provider configured for model '{model}': {family} are reachable as \
             'openrouter/<vendor>/<model>'; direct routes exist for 'glm/<model>', \
             '*gpt*' and 'random'"
        )))
    }
}

/// Where and how to reach one remote provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub base_url: String,
    pub api_key: String,
    pub headers: Vec<(String, String)>,
}

impl Endpoint {
    /// Read endpoint settings for `provider` from the environment.
    pub fn from_env(provider: Provider) -> Result<Self, GenerationError> {
        match provider {
            Provider::OpenAi => Ok(Self {
                base_url: var_or("OPENAI_BASE_URL", "https://api.openai.com/v1"),
                api_key: must_key(&["OPENAI_API_KEY"])?,
                headers: Vec::new(),
            }),
            Provider::OpenRouter => {
                let mut headers = Vec::new();
                if let Ok(referer) = env::var("OPENROUTER_REFERRER") {
                    headers.push(("HTTP-Referer".to_string(), referer));
                }
                headers.push((
                    "X-Title".to_string(),
                    var_or("OPENROUTER_APP_TITLE", "Werewolf Arena"),
                ));
                Ok(Self {
                    base_url: var_or("OPENROUTER_BASE_URL", "https://openrouter.ai/api/v1"),
                    api_key: must_key(&["OPENROUTER_API_KEY"])?,
                    headers,
                })
            }
            Provider::Glm => Ok(Self {
                base_url: var_or("GLM_BASE_URL", "https://open.bigmodel.cn/api/paas/v4"),
                api_key: must_key(&["GLM_API_KEY", "ZHIPU_API_KEY"])?,
                headers: Vec::new(),
            }),
            Provider::Random => Err(GenerationError::Provider(
                "the random agent has no remote endpoint".into(),
            )),
        }
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

fn var_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn must_key(names: &[&str]) -> Result<String, GenerationError> {
    names
        .iter()
        .find_map(|n| env::var(n).ok().filter(|v| !v.is_empty()))
        .ok_or_else(|| {
            GenerationError::MissingCredentials(format!(
                "set {} in the environment",
                names.join(" or ")
            ))
        })
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    response_format: ResponseFormat,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    content: Option<String>,
}

/// Thin client for `/chat/completions` on any OpenAI-compatible API.
#[derive(Clone)]
pub struct ChatClient {
    http: reqwest::Client,
}

impl ChatClient {
    pub fn new(timeout: Duration) -> Result<Self, GenerationError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GenerationError::Internal(format!("http client: {e}")))?;
        Ok(Self { http })
    }

    /// Send a single-message chat and return the first choice's text.
    pub async fn complete(
        &self,
        endpoint: &Endpoint,
        model: &str,
        prompt: &str,
        json_mode: bool,
    ) -> Result<String, GenerationError> {
        let body = ChatRequest {
            model,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
            response_format: ResponseFormat {
                kind: if json_mode { "json_object" } else { "text" },
            },
        };

        let mut request = self
            .http
            .post(endpoint.completions_url())
            .bearer_auth(&endpoint.api_key)
            .json(&body);
        for (name, value) in &endpoint.headers {
            request = request.header(name.as_str(), value.as_str());
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                GenerationError::Timeout
            } else {
                GenerationError::Transport(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            let message = format!("{model} returned {status}: {detail}");
            return Err(if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
                GenerationError::Transport(message)
            } else {
                GenerationError::Provider(message)
            });
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::InvalidResponse(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| GenerationError::InvalidResponse("reply had no content".into()))
    }
}
