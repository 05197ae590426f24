//! Endpoint-shaped entry points mirroring the wizard's two API routes.
//!
//! These are plain library functions; the error type carries an
//! HTTP-equivalent status so an HTTP layer can be bolted on without touching
//! the pipeline. Both check credentials before any gateway call is attempted.

use crate::case::{CaseFacts, ContentContext, ContentType, PlatformRef, ReportingDetails};
use crate::config::Config;
use crate::letter::{FollowUpQuestion, LetterDraft, QualityReport};
use crate::llm::{Gateway, GatewayError};
use crate::pipeline::{CancelToken, GenerationPipeline, PipelineError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Missing Anthropic API key")]
    MissingApiKey,
    #[error("Missing required parameters")]
    MissingParameters,
    #[error("Authentication failed")]
    AuthenticationFailed,
    #[error("Rate limit exceeded")]
    RateLimited,
    #[error("{0}")]
    Generation(String),
}

impl ApiError {
    /// HTTP-equivalent status for this error.
    pub fn status(&self) -> u16 {
        match self {
            ApiError::MissingApiKey => 500,
            ApiError::MissingParameters => 400,
            ApiError::AuthenticationFailed => 401,
            ApiError::RateLimited => 429,
            ApiError::Generation(_) => 500,
        }
    }
}

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::Gateway(GatewayError::MissingApiKey) => ApiError::MissingApiKey,
            PipelineError::Gateway(GatewayError::AuthenticationFailed) => {
                ApiError::AuthenticationFailed
            }
            PipelineError::Gateway(GatewayError::RateLimited) => ApiError::RateLimited,
            other => ApiError::Generation(other.to_string()),
        }
    }
}

/// The initial-question block as the wizard submits it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitialQuestions {
    pub image_identification: String,
    pub content_type: ContentType,
    pub content_context: ContentContext,
    #[serde(default)]
    pub image_upload_date: String,
    #[serde(default)]
    pub image_taken_date: String,
    #[serde(default)]
    pub ownership_evidence: String,
    #[serde(default)]
    pub impact_statement: String,
}

/// The form data both endpoints accept: initial answers, platform info,
/// optional reporting history, and any follow-up answers collected so far.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseSubmission {
    pub initial_questions: InitialQuestions,
    pub platform_info: PlatformRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reporting_details: Option<ReportingDetails>,
    #[serde(default)]
    pub follow_up: BTreeMap<String, String>,
}

impl CaseSubmission {
    pub fn into_case_facts(self) -> CaseFacts {
        CaseFacts {
            platform: self.platform_info,
            content_type: self.initial_questions.content_type,
            content_context: self.initial_questions.content_context,
            image_identification: self.initial_questions.image_identification,
            image_upload_date: self.initial_questions.image_upload_date,
            image_taken_date: self.initial_questions.image_taken_date,
            ownership_evidence: self.initial_questions.ownership_evidence,
            impact_statement: self.initial_questions.impact_statement,
            reporting_details: self.reporting_details,
            follow_up_answers: self.follow_up,
        }
    }
}

/// Request body for the quality-check endpoint. Both fields are required;
/// either missing is a 400.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityCheckRequest {
    #[serde(default)]
    pub letter: Option<LetterDraft>,
    #[serde(default)]
    pub form_data: Option<CaseSubmission>,
}

/// Generate follow-up questions for a case. Single attempt; the caller
/// decides whether a failure is worth retrying (bounded by
/// `Limits::max_follow_up_retries`).
pub async fn follow_up_questions<G: Gateway>(
    config: &Config,
    gateway: &G,
    submission: CaseSubmission,
) -> Result<Vec<FollowUpQuestion>, ApiError> {
    if !config.has_api_key() {
        return Err(ApiError::MissingApiKey);
    }
    let facts = submission.into_case_facts();
    let mut pipeline = GenerationPipeline::new(gateway, config.limits);
    let questions = pipeline
        .follow_up_questions(&facts, &CancelToken::new())
        .await?;
    Ok(questions)
}

/// Quality-check a drafted letter against the case's form data.
pub async fn quality_check_letter<G: Gateway>(
    config: &Config,
    gateway: &G,
    request: QualityCheckRequest,
) -> Result<QualityReport, ApiError> {
    if !config.has_api_key() {
        return Err(ApiError::MissingApiKey);
    }
    let (letter, form_data) = match (request.letter, request.form_data) {
        (Some(letter), Some(form_data)) => (letter, form_data),
        _ => return Err(ApiError::MissingParameters),
    };
    let facts = form_data.into_case_facts();
    let mut pipeline = GenerationPipeline::new(gateway, config.limits);
    let report = pipeline
        .quality_check(&letter, &facts, &CancelToken::new())
        .await?;
    Ok(report)
}
