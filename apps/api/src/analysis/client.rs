//! Analysis Client — sends the encoded resume with the fixed instruction and
//! schema, then turns the model's JSON into a `ResumeAnalysisResult`.
//!
//! Pluggable via `ResumeAnalyzer` so the view controller can be driven by
//! the Gemini-backed implementation or a stub. No retry, no cache: every
//! call is independent and any failure aborts the whole analysis.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

use crate::analysis::prompts::build_instruction;
use crate::analysis::schema::{
    response_schema, JOBS_MAX, JOBS_MIN, REQUIRED_FIELDS, SKILLS_MAX, SKILLS_MIN,
};
use crate::llm_client::prompts::EXTRACTION_TEMPERATURE;
use crate::llm_client::{response_text, GenerationConfig, LlmClient, LlmError};
use crate::models::analysis::{ResumeAnalysisResult, MAX_MATCH_SCORE};
use crate::models::document::EncodedDocument;

/// Every way an analysis can fail. Callers treat all variants alike;
/// the variant only matters for logs.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Model service error: {0}")]
    Service(#[from] LlmError),

    #[error("Response is not valid JSON: {0}")]
    Malformed(serde_json::Error),

    #[error("Response is missing required field `{0}`")]
    MissingField(&'static str),

    #[error("Response does not match the expected shape: {0}")]
    Shape(serde_json::Error),
}

#[async_trait]
pub trait ResumeAnalyzer: Send + Sync {
    async fn analyze(&self, document: &EncodedDocument)
        -> Result<ResumeAnalysisResult, AnalysisError>;
}

// ────────────────────────────────────────────────────────────────────────────
// GeminiResumeAnalyzer — production implementation
// ────────────────────────────────────────────────────────────────────────────

pub struct GeminiResumeAnalyzer {
    llm: LlmClient,
    instruction: String,
    config: GenerationConfig,
}

impl GeminiResumeAnalyzer {
    pub fn new(llm: LlmClient) -> Self {
        Self {
            llm,
            instruction: build_instruction(),
            config: GenerationConfig {
                response_mime_type: "application/json".to_string(),
                response_schema: response_schema(),
                temperature: EXTRACTION_TEMPERATURE,
            },
        }
    }
}

#[async_trait]
impl ResumeAnalyzer for GeminiResumeAnalyzer {
    async fn analyze(
        &self,
        document: &EncodedDocument,
    ) -> Result<ResumeAnalysisResult, AnalysisError> {
        info!(
            "Analyzing {} document ({} bytes)",
            document.media_type, document.byte_len
        );
        let response = self
            .llm
            .call(document, &self.instruction, &self.config)
            .await?;
        let text = response_text(&response)?;
        parse_analysis(&text)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Response ingestion
// ────────────────────────────────────────────────────────────────────────────

/// Parses model output into a result. The required keys are checked on the
/// raw JSON first so a missing key is never papered over by a partial value.
pub fn parse_analysis(text: &str) -> Result<ResumeAnalysisResult, AnalysisError> {
    let value: Value = match crate::llm_client::parse_json_text(text) {
        Ok(value) => value,
        Err(LlmError::Parse(e)) => return Err(AnalysisError::Malformed(e)),
        Err(e) => return Err(AnalysisError::Service(e)),
    };

    for field in REQUIRED_FIELDS {
        if value.get(field).map_or(true, Value::is_null) {
            return Err(AnalysisError::MissingField(field));
        }
    }

    let mut result: ResumeAnalysisResult =
        serde_json::from_value(value).map_err(AnalysisError::Shape)?;
    normalize(&mut result);
    Ok(result)
}

/// Clamps scores into 0–100 and flags list sizes outside the requested
/// ranges. Counts are logged only; the model's output is kept as-is.
fn normalize(result: &mut ResumeAnalysisResult) {
    for job in &mut result.recommended_jobs {
        if job.match_score > MAX_MATCH_SCORE {
            warn!(
                "Job '{}' has match score {} — clamping to {MAX_MATCH_SCORE}",
                job.id, job.match_score
            );
            job.match_score = MAX_MATCH_SCORE;
        }
    }

    let skills = result.extracted_skills.len();
    if !(SKILLS_MIN..=SKILLS_MAX).contains(&skills) {
        warn!("Model returned {skills} skills (expected {SKILLS_MIN}-{SKILLS_MAX})");
    }
    let jobs = result.recommended_jobs.len();
    if !(JOBS_MIN..=JOBS_MAX).contains(&jobs) {
        warn!("Model returned {jobs} jobs (expected {JOBS_MIN}-{JOBS_MAX})");
    }
}
