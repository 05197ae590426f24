//! Wire types produced by the generation stages: follow-up questions, letter
//! drafts, and quality reports.
//!
//! Field names stay camelCase on the wire because that is the JSON schema the
//! prompts instruct the model to emit.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Why a follow-up question is being asked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionReason {
    /// Missing key information the letter cannot do without.
    Essential,
    /// Helps prove the requester owns the content.
    Verification,
    /// Strengthens the case but is not required.
    Supporting,
}

/// One AI-generated follow-up question. Immutable after creation; the answer
/// is stored separately, keyed by `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowUpQuestion {
    /// Unique within its batch; the sole join key to the answer map.
    #[serde(default = "fallback_question_id")]
    pub id: String,
    pub question: String,
    /// Rationale shown next to the question.
    #[serde(default)]
    pub context: String,
    #[serde(default = "default_reason")]
    pub reason: QuestionReason,
}

/// Models occasionally omit the id; a fresh UUID keeps the batch joinable.
fn fallback_question_id() -> String {
    Uuid::new_v4().to_string()
}

fn default_reason() -> QuestionReason {
    QuestionReason::Supporting
}

/// A drafted takedown letter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LetterDraft {
    pub subject: String,
    pub body: String,
    #[serde(default)]
    pub next_steps: Vec<String>,
}

/// One failed criterion from the quality reviewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityIssue {
    pub criterion: String,
    pub issue: String,
    pub recommendation: String,
}

/// The reviewer's `improvedLetter` arrives either as a full draft object or
/// as a bare replacement body string; both shapes are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ImprovedLetter {
    Draft(LetterDraft),
    Body(String),
}

impl ImprovedLetter {
    /// Normalize to a full draft. A bare body string inherits the subject and
    /// next steps of the draft being revised.
    pub fn into_draft(self, original: &LetterDraft) -> LetterDraft {
        match self {
            ImprovedLetter::Draft(draft) => draft,
            ImprovedLetter::Body(body) => LetterDraft {
                subject: original.subject.clone(),
                body,
                next_steps: original.next_steps.clone(),
            },
        }
    }
}

/// The reviewer's structured critique of a drafted letter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityReport {
    pub passes_quality_check: bool,
    #[serde(default)]
    pub issues: Vec<QualityIssue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub improved_letter: Option<ImprovedLetter>,
}
