//! Client for the text generation service that writes a definition and an
//! example sentence for each word of the day.
//!
//! The service is any OpenAI-compatible chat completion API. Its reply is
//! treated as untrusted text: it is only ever parsed as JSON and validated.

use crate::{configuration::GeneratorSettings, domain::EnrichedWord};
use reqwest::{Client, Url};
use secrecy::{ExposeSecret, Secret};
use std::time::Duration;

const SYSTEM_PROMPT: &str = r#"You will be given two words.
For each word write a short definition and one example sentence using it.
Reply with nothing but a JSON array of exactly two objects, in the same order as the words were given:
[
    {"word": "word1", "definition": "definition1", "example": "example1"},
    {"word": "word2", "definition": "definition2", "example": "example2"}
]"#;

#[derive(Debug)]
pub struct ContentGenerator {
    base_url: Url,
    http_client: Client,
    api_key: Secret<String>,
    model: String,
    timeout: Duration,
}

impl ContentGenerator {
    /// Create a new generation client.
    pub fn new(base_url: Url, api_key: Secret<String>, model: String, timeout: Duration) -> Self {
        Self {
            base_url,
            http_client: Client::new(),
            api_key,
            model,
            timeout,
        }
    }

    /// Ask the generation service for a definition and an example for each of
    /// the two words. The result keeps the order of `words`.
    #[tracing::instrument(name = "Enrich words with the generation service", skip(self), err)]
    pub async fn enrich(&self, words: &[String; 2]) -> Result<[EnrichedWord; 2], GenerationError> {
        let url = self
            .base_url
            .join("chat/completions")
            .map_err(GenerationError::InvalidUrl)?;

        let user_prompt = serde_json::to_string(
            &words
                .iter()
                .map(|word| EnrichedWord {
                    word: word.clone(),
                    definition: String::new(),
                    example: String::new(),
                })
                .collect::<Vec<_>>(),
        )
        .map_err(GenerationError::MalformedRequest)?;

        let request_body = ChatCompletionRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: &user_prompt,
                },
            ],
        };

        let body = self
            .http_client
            .post(url)
            .bearer_auth(self.api_key.expose_secret())
            .timeout(self.timeout)
            .json(&request_body)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;
        let response: ChatCompletionResponse =
            serde_json::from_slice(&body).map_err(GenerationError::MalformedResponse)?;

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(GenerationError::EmptyReply)?;

        parse_enriched_words(&content, words)
    }
}

impl TryFrom<&GeneratorSettings> for ContentGenerator {
    type Error = String;

    fn try_from(config: &GeneratorSettings) -> Result<Self, Self::Error> {
        let base_url = config.base_url().map_err(|e| {
            tracing::error!("Unable to parse the generation service's base url: {e}");
            "Generation service base url is invalid".to_string()
        })?;

        Ok(Self::new(
            base_url,
            config.api_key().clone(),
            config.model().clone(),
            config.timeout(),
        ))
    }
}

#[derive(Debug, serde::Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
}

#[derive(Debug, serde::Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, serde::Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, serde::Deserialize)]
struct Choice {
    message: ReplyMessage,
}

#[derive(Debug, serde::Deserialize)]
struct ReplyMessage {
    content: Option<String>,
}

/// Strip a markdown code fence, with or without a language tag, around the
/// reply.
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = inner.trim_start_matches(|c: char| c.is_ascii_alphanumeric());
    inner.strip_suffix("```").unwrap_or(inner).trim()
}

/// Parse the raw reply of the generation service into exactly two complete
/// enriched words, ordered like `requested`.
pub fn parse_enriched_words(
    raw: &str,
    requested: &[String; 2],
) -> Result<[EnrichedWord; 2], GenerationError> {
    let parsed: Vec<EnrichedWord> =
        serde_json::from_str(strip_code_fence(raw)).map_err(GenerationError::MalformedReply)?;

    let [first, second]: [EnrichedWord; 2] = parsed
        .try_into()
        .map_err(|v: Vec<EnrichedWord>| GenerationError::UnexpectedShape(v.len()))?;

    if let Some(incomplete) = [&first, &second].into_iter().find(|w| !w.is_complete()) {
        return Err(GenerationError::IncompleteWord(incomplete.word.clone()));
    }

    let same = |a: &str, b: &str| a.trim().eq_ignore_ascii_case(b.trim());
    if same(&first.word, &requested[1]) && same(&second.word, &requested[0]) {
        return Ok([second, first]);
    }
    if !same(&first.word, &requested[0]) || !same(&second.word, &requested[1]) {
        return Err(GenerationError::UnexpectedWords {
            expected: requested.clone(),
            received: [first.word, second.word],
        });
    }

    Ok([first, second])
}

#[derive(thiserror::Error)]
pub enum GenerationError {
    #[error("Generation service url is invalid")]
    InvalidUrl(#[source] url::ParseError),
    #[error("Failed to build the generation request")]
    MalformedRequest(#[source] serde_json::Error),
    #[error("Failed to reach the generation service")]
    Request(#[from] reqwest::Error),
    #[error("Malformed generation response: not a chat completion")]
    MalformedResponse(#[source] serde_json::Error),
    #[error("The generation service returned an empty reply")]
    EmptyReply,
    #[error("Malformed generation response: not a JSON array of words")]
    MalformedReply(#[source] serde_json::Error),
    #[error("Malformed generation response: expected 2 words, got {0}")]
    UnexpectedShape(usize),
    #[error("Malformed generation response: '{0}' is missing a word, definition or example")]
    IncompleteWord(String),
    #[error("Malformed generation response: asked for {expected:?}, got {received:?}")]
    UnexpectedWords {
        expected: [String; 2],
        received: [String; 2],
    },
}
