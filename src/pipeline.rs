//! The generation pipeline: gap analysis, prompt assembly, gateway call,
//! lenient parse, and (for letters) the bounded quality-check loop.
//!
//! Call discipline is the whole point here. The follow-up stage makes exactly
//! one gateway call per user-initiated attempt. The letter stage makes exactly
//! two: one draft, one quality check. A failing quality check with a proposed
//! rewrite replaces the draft and terminates the loop - the improved letter is
//! never re-checked. Looping until `passesQualityCheck` would trade bounded
//! cost and latency for marginal thoroughness; the one-revision cap is a
//! design constant, not an accident.

use crate::case::CaseFacts;
use crate::config::Limits;
use crate::gaps;
use crate::letter::{FollowUpQuestion, LetterDraft, QualityReport};
use crate::llm::{parse, prompts, Gateway, GatewayError, ParseError, PromptKind};
use crate::policy::{get_platform_policy, RelevantPolicies};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// The caller cancelled the stage; no result escaped into state.
    #[error("generation cancelled")]
    Cancelled,
}

impl PipelineError {
    /// Transient failures the caller may reasonably retry.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            PipelineError::Gateway(GatewayError::RateLimited)
                | PipelineError::Gateway(GatewayError::Transport(_))
        )
    }
}

/// Cooperative cancellation flag, checked on both sides of the gateway call
/// so a slow reply can never leak into state after the caller moved on.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<(), PipelineError> {
        if self.is_cancelled() {
            Err(PipelineError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Observable pipeline state, updated as a run progresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    Generating(PromptKind),
    Parsed,
    QualityChecking,
    Revising,
    Accepted,
    Failed,
}

/// A finished letter run: the accepted draft, the reviewer's report, and
/// whether the accepted draft is the reviewer's rewrite.
#[derive(Debug, Clone)]
pub struct LetterOutcome {
    pub letter: LetterDraft,
    pub report: QualityReport,
    pub revised: bool,
}

pub struct GenerationPipeline<G: Gateway> {
    gateway: G,
    limits: Limits,
    state: PipelineState,
}

impl<G: Gateway> GenerationPipeline<G> {
    pub fn new(gateway: G, limits: Limits) -> Self {
        GenerationPipeline {
            gateway,
            limits,
            state: PipelineState::Idle,
        }
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    fn relevant_policies(facts: &CaseFacts) -> Option<RelevantPolicies> {
        if facts.platform.is_custom {
            return None;
        }
        get_platform_policy(&facts.platform.id)
            .map(|p| p.relevant_policies(facts.content_type, facts.content_context))
    }

    /// Run the follow-up stage: one gateway call, one parse, no retries.
    /// Caller-driven retries are bounded by `Limits::max_follow_up_retries`.
    pub async fn follow_up_questions(
        &mut self,
        facts: &CaseFacts,
        cancel: &CancelToken,
    ) -> Result<Vec<FollowUpQuestion>, PipelineError> {
        let result = self.follow_up_inner(facts, cancel).await;
        self.state = match &result {
            Ok(_) => PipelineState::Accepted,
            Err(_) => PipelineState::Failed,
        };
        result
    }

    async fn follow_up_inner(
        &mut self,
        facts: &CaseFacts,
        cancel: &CancelToken,
    ) -> Result<Vec<FollowUpQuestion>, PipelineError> {
        cancel.check()?;
        let status = gaps::analyze(facts, self.limits.detail_threshold);
        if facts.has_minimal_info(self.limits.min_answer_len) {
            tracing::debug!("initial answers are minimal; follow-up questions will carry more weight");
        }
        let policies = Self::relevant_policies(facts);
        let prompt = prompts::follow_up_prompt(facts, status, policies.as_ref());

        self.state = PipelineState::Generating(PromptKind::FollowUp);
        let raw = self.gateway.invoke(PromptKind::FollowUp, &prompt).await?;
        cancel.check()?;

        let value = parse::extract_json(&raw)?;
        self.state = PipelineState::Parsed;
        let questions = parse::follow_up_questions(value)?;
        tracing::debug!(count = questions.len(), "follow-up questions generated");
        Ok(questions)
    }

    /// Run the letter stage: draft, then exactly one quality check, then at
    /// most one revision (taken from the reviewer, never re-checked).
    pub async fn generate_letter(
        &mut self,
        facts: &CaseFacts,
        cancel: &CancelToken,
    ) -> Result<LetterOutcome, PipelineError> {
        let result = self.letter_inner(facts, cancel).await;
        self.state = match &result {
            Ok(_) => PipelineState::Accepted,
            Err(_) => PipelineState::Failed,
        };
        result
    }

    /// Run only the quality-check task against an existing draft. Used by the
    /// letter stage and exposed for the quality-check endpoint.
    pub async fn quality_check(
        &mut self,
        draft: &LetterDraft,
        facts: &CaseFacts,
        cancel: &CancelToken,
    ) -> Result<QualityReport, PipelineError> {
        self.state = PipelineState::QualityChecking;
        let letter_json = serde_json::to_string(draft)
            .map_err(|e| ParseError::MalformedResponse(format!("draft reserialization: {}", e)))?;
        let prompt = prompts::quality_check_prompt(&letter_json, facts);
        let raw = self
            .gateway
            .invoke(PromptKind::QualityCheck, &prompt)
            .await?;
        cancel.check()?;
        Ok(parse::quality_report(parse::extract_json(&raw)?)?)
    }

    async fn letter_inner(
        &mut self,
        facts: &CaseFacts,
        cancel: &CancelToken,
    ) -> Result<LetterOutcome, PipelineError> {
        cancel.check()?;
        let policies = Self::relevant_policies(facts);
        let prompt = prompts::letter_prompt(facts, policies.as_ref());

        self.state = PipelineState::Generating(PromptKind::LetterDraft);
        let raw = self.gateway.invoke(PromptKind::LetterDraft, &prompt).await?;
        cancel.check()?;

        let draft = parse::letter_draft(parse::extract_json(&raw)?)?;
        self.state = PipelineState::Parsed;

        // The draft is never surfaced before the quality check has run.
        let mut report = self.quality_check(&draft, facts, cancel).await?;

        if report.passes_quality_check {
            tracing::debug!("draft passed quality check");
            return Ok(LetterOutcome {
                letter: draft,
                report,
                revised: false,
            });
        }

        match report.improved_letter.take() {
            Some(improved) => {
                // Single corrective pass: accept the rewrite as-is.
                self.state = PipelineState::Revising;
                tracing::debug!(issues = report.issues.len(), "accepting reviewer rewrite");
                Ok(LetterOutcome {
                    letter: improved.into_draft(&draft),
                    report,
                    revised: true,
                })
            }
            None => {
                // Failed check with no proposed fix: the draft is still the
                // best artifact we have; the issues travel with it.
                tracing::debug!(issues = report.issues.len(), "quality check failed without rewrite");
                Ok(LetterOutcome {
                    letter: draft,
                    report,
                    revised: false,
                })
            }
        }
    }
}
