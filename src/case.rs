//! Case state: the facts collected across wizard steps and the versioned
//! session store that accumulates them.
//!
//! Facts grow monotonically. Every merge produces a new immutable snapshot so
//! a pipeline run always sees exactly the facts it was started with, no matter
//! what the wizard does while the network call is in flight.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use uuid::Uuid;

/// The platform the content was found on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformRef {
    pub id: String,
    pub name: String,
    pub is_custom: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_name: Option<String>,
}

impl PlatformRef {
    pub fn known(id: &str, name: &str) -> Self {
        PlatformRef {
            id: id.to_string(),
            name: name.to_string(),
            is_custom: false,
            custom_name: None,
        }
    }

    pub fn custom(name: &str) -> Self {
        PlatformRef {
            id: "custom".to_string(),
            name: name.to_string(),
            is_custom: true,
            custom_name: Some(name.to_string()),
        }
    }

    /// Display name, preferring the user-supplied custom name.
    pub fn display_name(&self) -> &str {
        self.custom_name.as_deref().unwrap_or(&self.name)
    }
}

/// What kind of content is being reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Intimate,
    Personal,
    Private,
    Other,
}

impl ContentType {
    pub fn label(&self) -> &'static str {
        match self {
            ContentType::Intimate => "intimate",
            ContentType::Personal => "personal",
            ContentType::Private => "private",
            ContentType::Other => "other",
        }
    }
}

/// How the content came to be shared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentContext {
    Hacked,
    Impersonation,
    Relationship,
    Unknown,
    Other,
}

impl ContentContext {
    pub fn label(&self) -> &'static str {
        match self {
            ContentContext::Hacked => "hacked",
            ContentContext::Impersonation => "impersonation",
            ContentContext::Relationship => "relationship",
            ContentContext::Unknown => "unknown",
            ContentContext::Other => "other",
        }
    }
}

/// History of reports already filed with the platform, if any.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportingDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub standard_process_details: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub escalated_process_details: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_received: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_steps_taken: Option<String>,
}

impl ReportingDetails {
    /// Whether any prior-report narrative exists at all.
    pub fn has_history(&self) -> bool {
        self.standard_process_details.is_some() || self.escalated_process_details.is_some()
    }
}

/// Everything collected about a case so far. Immutable snapshot; merges go
/// through [`CaseSession`] and produce a new snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseFacts {
    pub platform: PlatformRef,
    pub content_type: ContentType,
    pub content_context: ContentContext,
    /// Where the content lives: URLs, account handles, or a description.
    pub image_identification: String,
    pub image_upload_date: String,
    pub image_taken_date: String,
    pub ownership_evidence: String,
    pub impact_statement: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reporting_details: Option<ReportingDetails>,
    /// Answers to AI-generated follow-up questions, keyed by question id.
    #[serde(default)]
    pub follow_up_answers: BTreeMap<String, String>,
}

impl CaseFacts {
    /// The initial-question fields as (label, value) pairs, in the order the
    /// wizard collects them. Used verbatim in prompt assembly.
    pub fn initial_entries(&self) -> Vec<(&'static str, String)> {
        vec![
            ("imageIdentification", self.image_identification.clone()),
            ("contentType", self.content_type.label().to_string()),
            ("contentContext", self.content_context.label().to_string()),
            ("imageUploadDate", self.image_upload_date.clone()),
            ("imageTakenDate", self.image_taken_date.clone()),
            ("ownershipEvidence", self.ownership_evidence.clone()),
            ("impactStatement", self.impact_statement.clone()),
        ]
    }

    /// True when any initial answer is missing or shorter than the
    /// minimal-answer limit.
    pub fn has_minimal_info(&self, min_answer_len: usize) -> bool {
        self.initial_entries()
            .iter()
            .any(|(_, value)| value.is_empty() || value.len() < min_answer_len)
    }

    /// New snapshot with a batch of follow-up answers appended. Existing
    /// answers are kept; an answer for an already-answered id is replaced.
    pub fn with_follow_up_answers(&self, answers: BTreeMap<String, String>) -> CaseFacts {
        let mut next = self.clone();
        next.follow_up_answers.extend(answers);
        next
    }
}

/// Pipeline stages a session can have in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    FollowUpQuestions,
    LetterGeneration,
}

/// One versioned snapshot in a session's history.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub version: u64,
    pub created_at: DateTime<Utc>,
    pub facts: Arc<CaseFacts>,
}

/// Per-session store of case facts.
///
/// Mutations append new snapshots; nothing is edited in place. The store also
/// guards against starting a pipeline stage while another is in flight for the
/// same session.
#[derive(Debug)]
pub struct CaseSession {
    pub id: Uuid,
    history: Vec<Snapshot>,
    in_flight: Option<Stage>,
}

impl CaseSession {
    pub fn new(facts: CaseFacts) -> Self {
        CaseSession {
            id: Uuid::new_v4(),
            history: vec![Snapshot {
                version: 1,
                created_at: Utc::now(),
                facts: Arc::new(facts),
            }],
            in_flight: None,
        }
    }

    /// The latest snapshot's facts.
    pub fn current(&self) -> Arc<CaseFacts> {
        // history is never empty: new() seeds version 1 and merges only append
        Arc::clone(&self.history.last().expect("session history is never empty").facts)
    }

    pub fn current_version(&self) -> u64 {
        self.history.last().map(|s| s.version).unwrap_or(0)
    }

    pub fn history(&self) -> &[Snapshot] {
        &self.history
    }

    /// Mark a stage as in flight. Returns false (and changes nothing) if any
    /// stage is already running for this session.
    pub fn try_begin(&mut self, stage: Stage) -> bool {
        if self.in_flight.is_some() {
            return false;
        }
        self.in_flight = Some(stage);
        true
    }

    /// Clear the in-flight marker after a stage completes or is cancelled.
    pub fn finish(&mut self) {
        self.in_flight = None;
    }

    pub fn stage_in_flight(&self) -> Option<Stage> {
        self.in_flight
    }

    /// Atomically merge a completed follow-up batch into a new snapshot.
    pub fn merge_follow_up_answers(&mut self, answers: BTreeMap<String, String>) -> Arc<CaseFacts> {
        let next = self.current().with_follow_up_answers(answers);
        let snapshot = Snapshot {
            version: self.current_version() + 1,
            created_at: Utc::now(),
            facts: Arc::new(next),
        };
        self.history.push(snapshot);
        self.current()
    }
}

#[cfg(test)]
pub(crate) fn sample_facts() -> CaseFacts {
    CaseFacts {
        platform: PlatformRef::known("facebook", "Facebook"),
        content_type: ContentType::Intimate,
        content_context: ContentContext::Relationship,
        image_identification: "https://example.com/img.jpg".to_string(),
        image_upload_date: "2025-01-15".to_string(),
        image_taken_date: "2024-11-02".to_string(),
        ownership_evidence: "I took this photo myself on my own phone last year".to_string(),
        impact_statement: "It hurt me".to_string(),
        reporting_details: None,
        follow_up_answers: BTreeMap::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_appends_new_snapshot() {
        let mut session = CaseSession::new(sample_facts());
        assert_eq!(session.current_version(), 1);

        let mut answers = BTreeMap::new();
        answers.insert("q1".to_string(), "The account posting it is @stranger22".to_string());
        let merged = session.merge_follow_up_answers(answers);

        assert_eq!(session.current_version(), 2);
        assert_eq!(merged.follow_up_answers.len(), 1);
        // Prior snapshot is untouched
        assert!(session.history()[0].facts.follow_up_answers.is_empty());
    }

    #[test]
    fn test_merge_is_monotonic() {
        let mut session = CaseSession::new(sample_facts());
        let mut first = BTreeMap::new();
        first.insert("q1".to_string(), "answer one".to_string());
        session.merge_follow_up_answers(first);

        let mut second = BTreeMap::new();
        second.insert("q2".to_string(), "answer two".to_string());
        let merged = session.merge_follow_up_answers(second);

        assert_eq!(merged.follow_up_answers.len(), 2);
        assert_eq!(session.history().len(), 3);
    }

    #[test]
    fn test_single_stage_in_flight() {
        let mut session = CaseSession::new(sample_facts());
        assert!(session.try_begin(Stage::FollowUpQuestions));
        assert!(!session.try_begin(Stage::LetterGeneration));
        assert_eq!(session.stage_in_flight(), Some(Stage::FollowUpQuestions));
        session.finish();
        assert!(session.try_begin(Stage::LetterGeneration));
    }

    #[test]
    fn test_has_minimal_info() {
        let facts = sample_facts();
        // "It hurt me" is shorter than 20 chars
        assert!(facts.has_minimal_info(20));

        let mut detailed = facts;
        detailed.impact_statement =
            "This has caused me serious distress at work and at home".to_string();
        assert!(!detailed.has_minimal_info(20));
    }

    #[test]
    fn test_case_facts_wire_format_is_camel_case() {
        let json = serde_json::to_value(sample_facts()).unwrap();
        assert!(json.get("imageIdentification").is_some());
        assert!(json.get("ownershipEvidence").is_some());
        assert!(json.get("image_identification").is_none());
    }

    #[test]
    fn test_custom_platform_display_name() {
        let p = PlatformRef::custom("NeighborhoodForum");
        assert!(p.is_custom);
        assert_eq!(p.display_name(), "NeighborhoodForum");
    }
}
