//! Completion provider factory.

use crate::client::LlmClient;
use crate::providers::OpenAiClient;
use std::sync::Arc;
use std::time::Duration;

/// Create a completion client based on the provider name.
///
/// # Arguments
/// * `provider` - Provider identifier ("openai")
/// * `endpoint` - Optional custom base URL
/// * `api_key` - API key for providers that require it
/// * `timeout` - Optional per-request timeout
///
/// # Errors
/// Returns an error if the provider is unknown, the key is missing, or the
/// HTTP client cannot be built.
pub fn create_client(
    provider: &str,
    endpoint: Option<&str>,
    api_key: Option<&str>,
    timeout: Option<Duration>,
) -> Result<Arc<dyn LlmClient>, String> {
    match provider.to_lowercase().as_str() {
        "openai" => {
            let api_key = api_key.ok_or_else(|| "OpenAI provider requires API key".to_string())?;
            let base_url = endpoint.unwrap_or(crate::providers::openai::DEFAULT_BASE_URL);
            let mut client = OpenAiClient::with_base_url(base_url, api_key);
            if let Some(timeout) = timeout {
                client = client.with_timeout(timeout).map_err(|e| e.to_string())?;
            }
            Ok(Arc::new(client))
        }
        _ => Err(format!("Unknown provider: {}", provider)),
    }
}
