use crate::prompts::build_request;
use crate::types::{ChatRequest, ChatResponse};
use crate::{Completion, LlmProvider};
use async_trait::async_trait;
use insight_core::{CoreError, ErrorRecovery, LlmConfig, LlmError, RecoveryStrategy};
use reqwest::header::RETRY_AFTER;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, error, info};
use url::Url;

const DEFAULT_RETRY_AFTER_SECS: u64 = 60;
const ERROR_BODY_PREVIEW: usize = 200;

/// Client for any OpenAI-compatible chat-completion endpoint (OpenRouter by
/// default).
pub struct ChatCompletionClient {
    http_client: Client,
    config: LlmConfig,
    provider: String,
    endpoint: String,
}

impl ChatCompletionClient {
    /// A missing API key is not an error here; every call fails instead.
    pub fn new(config: LlmConfig) -> Result<Self, CoreError> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        let provider = provider_name(&config.base_url);
        let endpoint = format!("{}/chat/completions", config.base_url.trim_end_matches('/'));

        Ok(Self {
            http_client,
            config,
            provider,
            endpoint,
        })
    }

    pub fn provider(&self) -> &str {
        &self.provider
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn send_once(
        &self,
        request: &ChatRequest,
        api_key: &str,
    ) -> Result<ChatResponse, CoreError> {
        debug!("POST {} (model {})", self.endpoint, request.model);

        let response = self
            .http_client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.trim().parse::<u64>().ok());
            let body = response.text().await.unwrap_or_default();

            error!(
                "Chat completion failed with status {} from {}",
                status, self.provider
            );
            return Err(classify_status(
                &self.provider,
                &request.model,
                status.as_u16(),
                retry_after,
                &body,
            ));
        }

        response.json::<ChatResponse>().await.map_err(|e| {
            if e.is_timeout() {
                self.transport_error(e)
            } else {
                CoreError::Llm(LlmError::InvalidResponseFormat {
                    provider: self.provider.clone(),
                    details: e.to_string(),
                })
            }
        })
    }

    fn transport_error(&self, e: reqwest::Error) -> CoreError {
        if e.is_timeout() {
            CoreError::Llm(LlmError::RequestTimeout {
                provider: self.provider.clone(),
            })
        } else {
            CoreError::Network(e)
        }
    }
}

#[async_trait]
impl LlmProvider for ChatCompletionClient {
    async fn complete(&self, caption: &str, model: &str) -> Result<Completion, CoreError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or_else(|| LlmError::InvalidApiKey {
                provider: self.provider.clone(),
            })?;

        let request = build_request(caption, model);
        let request = &request;
        let strategy = RecoveryStrategy::from(&self.config.retry);

        let response = ErrorRecovery::apply_strategy(strategy, move || {
            self.send_once(request, api_key)
        })
        .await
        .into_result()?;

        let content = response
            .first_content()
            .ok_or_else(|| LlmError::InvalidResponseFormat {
                provider: self.provider.clone(),
                details: match &response.error {
                    Some(provider_error) => format!("provider error: {provider_error}"),
                    None => "response has no choices[0].message.content".to_string(),
                },
            })?
            .to_string();

        info!(
            "Received {} chars from {} (model {})",
            content.len(),
            self.provider,
            model
        );

        Ok(Completion { response, content })
    }
}

/// Map a non-2xx status onto the error taxonomy.
pub fn classify_status(
    provider: &str,
    model: &str,
    status: u16,
    retry_after: Option<u64>,
    body: &str,
) -> CoreError {
    let provider = provider.to_string();
    match status {
        401 | 403 => LlmError::AuthenticationFailed { provider }.into(),
        402 => LlmError::InsufficientCredits { provider }.into(),
        404 => LlmError::ModelNotAvailable {
            model: model.to_string(),
        }
        .into(),
        429 => LlmError::RateLimitExceeded {
            provider,
            retry_after: retry_after.unwrap_or(DEFAULT_RETRY_AFTER_SECS),
        }
        .into(),
        500..=599 => LlmError::ServiceUnavailable {
            provider,
            status_code: status,
        }
        .into(),
        _ => CoreError::RequestFailed {
            message: format!(
                "{provider} returned status {status}: {}",
                body.chars().take(ERROR_BODY_PREVIEW).collect::<String>()
            ),
            status_code: Some(status),
        },
    }
}

/// `https://openrouter.ai/api/v1` -> `openrouter`, `https://api.openai.com/v1` -> `openai`.
pub fn provider_name(base_url: &str) -> String {
    let host = Url::parse(base_url)
        .ok()
        .and_then(|url| url.host_str().map(str::to_string));

    match host {
        Some(host) if host.parse::<std::net::IpAddr>().is_ok() => host,
        Some(host) => host
            .rsplit('.')
            .nth(1)
            .map(str::to_string)
            .unwrap_or(host),
        None => "llm".to_string(),
    }
}
