//! Facility recommendation via `OpenAI` chat completions

use crate::db::ConversationRecord;
use crate::runtime::{CollaboratorError, Facility, SummaryGenerator};
use crate::state_machine::messages::{NOT_AVAILABLE, SUMMARY_FAILED};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::time::Duration;

const CHAT_URL: &str = "https://api.openai.com/v1/chat/completions";

const SYSTEM_PROMPT: &str = "あなたは、適切な医療機関を提案することに長けた専門家です。提供された医療機関の候補一覧と会話履歴を基に、最適な医療機関を提案してください。提案には必ず「医療機関名」「現在の営業状況」「電話番号」「ホームページURL（ある場合）」「住所」を含めてください。";

const MAX_TOKENS: u32 = 500;
const TEMPERATURE: f32 = 0.5;

pub struct OpenAiSummaryService {
    client: Client,
    api_key: String,
    model: String,
}

impl OpenAiSummaryService {
    pub fn new(api_key: String, model: String, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_key,
            model,
        })
    }

    async fn complete(&self, context: String) -> Result<String, CollaboratorError> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: format!("{context}\n\n応答:"),
                },
            ],
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
        };

        let response = self
            .client
            .post(CHAT_URL)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CollaboratorError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| CollaboratorError::Parse(e.to_string()))?;

        body.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
            .ok_or_else(|| CollaboratorError::Parse("No choices in response".to_string()))
    }
}

#[async_trait]
impl SummaryGenerator for OpenAiSummaryService {
    async fn summarize(&self, candidates: &[Facility], history: &[ConversationRecord]) -> String {
        let start = std::time::Instant::now();
        let result = self.complete(build_context(candidates, history)).await;
        let duration = start.elapsed();

        match result {
            Ok(text) => {
                tracing::info!(
                    model = %self.model,
                    duration_ms = %duration.as_millis(),
                    candidates = candidates.len(),
                    "Summary generated"
                );
                text
            }
            Err(e) => {
                tracing::error!(
                    model = %self.model,
                    duration_ms = %duration.as_millis(),
                    error = %e,
                    "Summary generation failed"
                );
                SUMMARY_FAILED.to_string()
            }
        }
    }
}

/// Prompt context: the candidate list followed by prior turns
fn build_context(candidates: &[Facility], history: &[ConversationRecord]) -> String {
    let mut context = String::from("提案する医療機関の候補一覧:\n");
    for facility in candidates {
        let _ = writeln!(
            context,
            "- {} / 住所: {} / 電話番号: {} / ウェブサイト: {} / 営業時間: {}",
            facility.name,
            facility.address,
            facility.phone.as_deref().unwrap_or(NOT_AVAILABLE),
            facility.website.as_deref().unwrap_or(NOT_AVAILABLE),
            facility
                .opening_hours
                .as_ref()
                .map_or_else(|| NOT_AVAILABLE.to_string(), |h| h.join(", ")),
        );
    }

    context.push_str("\nこのユーザーとの過去の会話履歴:\n");
    if history.is_empty() {
        context.push_str("(なし)\n");
    }
    for record in history {
        let _ = writeln!(
            context,
            "ユーザー: {}\nボット: {}",
            record.user_message, record.bot_response
        );
    }
    context
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}
