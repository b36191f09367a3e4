//! Short romantic phrases from a text generation service.
//!
//! A [`PhraseProvider`] may fail in any way it likes; [`request_phrase`]
//! turns every failure into [`FALLBACK_PHRASE`] so callers always get
//! something to show.

use std::pin::Pin;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::flow::{MaybeSend, MaybeSync};

/// Shown when the request fails.
pub const FALLBACK_PHRASE: &str = "Para Ti";
/// Shown when the service answers with nothing.
pub const EMPTY_PHRASE: &str = "Eres mi Luz";

const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const DEFAULT_MODEL: &str = "gemini-2.5-flash";
#[cfg(not(target_arch = "wasm32"))]
const REQUEST_TIMEOUT_SECS: u64 = 10;

const PROMPT: &str = "Genera una frase romántica o afectuosa MUY CORTA (máximo 3 o 4 palabras) \
para mostrar como un título gigante en 3D.\n\
Ejemplos: \"Te Amo Mucho\", \"Eres mi Luz\", \"Para mi Amor\", \"Siempre Juntos\".\n\
El tono debe ser dulce y sincero.\n\
Solo devuelve el texto limpio, sin comillas ni explicaciones.";

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("API key not configured. Set GEMINI_API_KEY or API_KEY")]
    MissingKey,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected status: {0}")]
    Status(reqwest::StatusCode),

    #[error("Malformed response: {0}")]
    Malformed(#[from] serde_json::Error),
}

#[cfg(not(target_arch = "wasm32"))]
pub type ProviderFuture<'a> = Pin<Box<dyn Future<Output = Result<String, ProviderError>> + Send + 'a>>;
#[cfg(target_arch = "wasm32")]
pub type ProviderFuture<'a> = Pin<Box<dyn Future<Output = Result<String, ProviderError>> + 'a>>;

/// Source of display phrases.
pub trait PhraseProvider: MaybeSend + MaybeSync {
    fn name(&self) -> &str;

    /// The raw answer of the service.
    fn fetch(&self) -> ProviderFuture<'_>;
}

/// Asks `provider` for a phrase. Never fails.
pub async fn request_phrase(provider: &dyn PhraseProvider) -> String {
    match provider.fetch().await {
        Ok(raw) => clean_phrase(&raw).unwrap_or_else(|| EMPTY_PHRASE.to_string()),
        Err(e) => {
            log::error!("Error generating text with {}: {}", provider.name(), e);
            FALLBACK_PHRASE.to_string()
        }
    }
}

/// Trims whitespace and surrounding quotes; `None` if nothing is left.
pub fn clean_phrase(raw: &str) -> Option<String> {
    const QUOTES: &[char] = &['"', '\'', '“', '”', '«', '»', '`'];
    let phrase = raw.trim().trim_matches(QUOTES).trim();
    (!phrase.is_empty()).then(|| phrase.to_string())
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
}

#[derive(Serialize)]
struct Content<'a> {
    parts: [Part<'a>; 1],
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

impl<'a> GenerateRequest<'a> {
    fn new(prompt: &'a str) -> Self {
        Self {
            contents: [Content {
                parts: [Part { text: prompt }],
            }],
        }
    }
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ReplyPart>,
}

#[derive(Debug, Deserialize)]
struct ReplyPart {
    #[serde(default)]
    text: Option<String>,
}

impl GenerateResponse {
    /// Text parts of the first candidate joined together, empty if there are none.
    fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<String>()
            })
            .unwrap_or_default()
    }
}

/// Gemini `generateContent` over HTTPS.
pub struct GeminiProvider {
    client: reqwest::Client,
    api_key: Option<String>,
    endpoint: String,
    model: String,
}

impl GeminiProvider {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    /// Reads the key from `GEMINI_API_KEY`, then `API_KEY`.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_env() -> Self {
        let key = std::env::var("GEMINI_API_KEY")
            .or_else(|_| std::env::var("API_KEY"))
            .ok();
        Self::new(key)
    }

    /// The browser has no environment, the key is baked in at build time.
    #[cfg(target_arch = "wasm32")]
    pub fn from_env() -> Self {
        let key = option_env!("GEMINI_API_KEY").or(option_env!("API_KEY"));
        Self::new(key.map(str::to_string))
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    fn url(&self) -> String {
        format!(
            "{}/{}:generateContent",
            self.endpoint.trim_end_matches('/'),
            self.model
        )
    }

    async fn generate(&self) -> Result<String, ProviderError> {
        let key = self.api_key.as_deref().ok_or(ProviderError::MissingKey)?;
        let request = self
            .client
            .post(self.url())
            .header("x-goog-api-key", key)
            .json(&GenerateRequest::new(PROMPT));
        #[cfg(not(target_arch = "wasm32"))]
        let request = request.timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS));

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Status(status));
        }
        let body = response.text().await?;
        let parsed: GenerateResponse = serde_json::from_str(&body)?;
        Ok(parsed.text())
    }
}

impl PhraseProvider for GeminiProvider {
    fn name(&self) -> &str {
        &self.model
    }

    fn fetch(&self) -> ProviderFuture<'_> {
        Box::pin(self.generate())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(Result<&'static str, ()>);

    impl PhraseProvider for Fixed {
        fn name(&self) -> &str {
            "fixed"
        }

        fn fetch(&self) -> ProviderFuture<'_> {
            let result = match self.0 {
                Ok(text) => Ok(text.to_string()),
                Err(()) => Err(ProviderError::Status(reqwest::StatusCode::SERVICE_UNAVAILABLE)),
            };
            Box::pin(async move { result })
        }
    }

    #[test]
    fn failures_resolve_to_fallback() {
        let phrase = futures::executor::block_on(request_phrase(&Fixed(Err(()))));
        assert_eq!(phrase, FALLBACK_PHRASE);
    }

    #[test]
    fn blank_answers_resolve_to_empty_phrase() {
        for raw in ["", "   ", "\"\"", "\n“”\n"] {
            let phrase = futures::executor::block_on(request_phrase(&Fixed(Ok(raw))));
            assert_eq!(phrase, EMPTY_PHRASE, "raw answer {:?}", raw);
        }
    }

    #[test]
    fn answers_are_trimmed_and_unquoted() {
        let phrase = futures::executor::block_on(request_phrase(&Fixed(Ok("  \"Siempre Juntos\"\n"))));
        assert_eq!(phrase, "Siempre Juntos");
        assert_eq!(clean_phrase("“Te Amo Mucho”").as_deref(), Some("Te Amo Mucho"));
    }

    #[test]
    fn missing_key_fails_without_a_request() {
        let provider = GeminiProvider::new(Some("  ".to_string()));
        let result = futures::executor::block_on(provider.fetch());
        assert!(matches!(result, Err(ProviderError::MissingKey)));
        let phrase = futures::executor::block_on(request_phrase(&provider));
        assert_eq!(phrase, FALLBACK_PHRASE);
    }

    #[test]
    fn request_body_matches_the_wire_format() {
        let body = serde_json::to_value(GenerateRequest::new("hola")).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"contents": [{"parts": [{"text": "hola"}]}]})
        );
    }

    #[test]
    fn reply_text_comes_from_the_first_candidate() {
        let reply: GenerateResponse = serde_json::from_str(
            r#"{"candidates":[
                {"content":{"parts":[{"text":"Eres "},{"text":"mi Sol"}],"role":"model"}},
                {"content":{"parts":[{"text":"ignored"}]}}
            ]}"#,
        )
        .unwrap();
        assert_eq!(reply.text(), "Eres mi Sol");

        let empty: GenerateResponse = serde_json::from_str(r#"{"promptFeedback":{}}"#).unwrap();
        assert_eq!(empty.text(), "");
    }

    #[test]
    fn url_targets_generate_content() {
        let provider = GeminiProvider::new(None).with_endpoint("http://localhost:9/v1beta/models/");
        assert_eq!(
            provider.url(),
            "http://localhost:9/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }
}
