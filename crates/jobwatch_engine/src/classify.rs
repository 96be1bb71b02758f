use std::time::Duration;

use jobwatch_core::{build_screening_prompt, JobRecord, KeywordVerdictParser, Verdict, VerdictParser};
use jobwatch_logging::{watch_info, watch_warn};
use reqwest::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

pub const GEMINI_ENDPOINT: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent";

#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error("invalid classifier endpoint: {0}")]
    Endpoint(String),
    #[error("classifier request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("classifier returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("classifier response is not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Debug, Clone)]
pub struct ClassifierSettings {
    pub endpoint: String,
    pub request_timeout: Duration,
}

impl Default for ClassifierSettings {
    fn default() -> Self {
        Self {
            endpoint: GEMINI_ENDPOINT.to_string(),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// Decides whether a job record satisfies the screening conditions.
///
/// Implementations fail closed: any service problem is a [`Verdict::Rejected`].
#[async_trait::async_trait]
pub trait Classifier: Send + Sync {
    async fn classify(&self, record: &JobRecord) -> Verdict;
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: [TextPart<'a>; 1],
}

#[derive(Debug, Serialize)]
struct TextPart<'a> {
    text: &'a str,
}

#[derive(Debug, Default, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Default, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: CandidateContent,
}

#[derive(Debug, Default, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ReplyPart>,
}

#[derive(Debug, Default, Deserialize)]
struct ReplyPart {
    #[serde(default)]
    text: String,
}

impl GenerateResponse {
    /// `candidates[0].content.parts[0].text`, empty when any step is missing.
    fn first_text(self) -> String {
        self.candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content.parts.into_iter().next())
            .map(|part| part.text)
            .unwrap_or_default()
    }
}

pub struct GeminiClassifier {
    endpoint: Url,
    client: reqwest::Client,
    parser: Box<dyn VerdictParser>,
}

impl GeminiClassifier {
    /// The credential travels as the `key` query parameter of every request.
    pub fn new(settings: ClassifierSettings, api_key: &str) -> Result<Self, ClassifyError> {
        let mut endpoint = Url::parse(&settings.endpoint)
            .map_err(|err| ClassifyError::Endpoint(err.to_string()))?;
        endpoint.query_pairs_mut().append_pair("key", api_key);

        let client = reqwest::Client::builder()
            .timeout(settings.request_timeout)
            .build()?;

        Ok(Self {
            endpoint,
            client,
            parser: Box::new(KeywordVerdictParser),
        })
    }

    pub fn with_parser(mut self, parser: Box<dyn VerdictParser>) -> Self {
        self.parser = parser;
        self
    }

    /// Raw reply text for `prompt`.
    pub async fn generate(&self, prompt: &str) -> Result<String, ClassifyError> {
        let request = GenerateRequest {
            contents: [Content {
                role: "user",
                parts: [TextPart { text: prompt }],
            }],
        };
        let body = serde_json::to_vec(&request)?;

        let response = self
            .client
            .post(self.endpoint.clone())
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .bytes()
                .await
                .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
                .unwrap_or_default();
            return Err(ClassifyError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        let parsed: GenerateResponse = serde_json::from_slice(&bytes)?;
        Ok(parsed.first_text())
    }
}

#[async_trait::async_trait]
impl Classifier for GeminiClassifier {
    async fn classify(&self, record: &JobRecord) -> Verdict {
        let prompt = build_screening_prompt(record);
        match self.generate(&prompt).await {
            Ok(reply) => {
                watch_info!("AI analysis for '{}': {}", record.title, reply.trim());
                self.parser.parse(&reply)
            }
            Err(err) => {
                // reqwest errors carry the request URL, which holds the key.
                let err = match err {
                    ClassifyError::Transport(inner) => ClassifyError::Transport(inner.without_url()),
                    other => other,
                };
                watch_warn!("Classifier call failed for {}: {}", record.link, err);
                Verdict::Rejected
            }
        }
    }
}
