//! Fixed model configuration per generation task.

/// The three generation tasks the pipeline runs. A closed set: every kind has
/// an assembler, a schema validator, and the configuration below, and the
/// compiler keeps the three in sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    /// Generate 2-3 follow-up questions that close information gaps.
    FollowUp,
    /// Draft the takedown letter.
    LetterDraft,
    /// Critique (and possibly rewrite) a drafted letter.
    QualityCheck,
}

/// All tasks run on the same model with the same token budget; only the
/// temperature is tuned per task.
const MODEL_ID: &str = "claude-3-sonnet-20240229";
const MAX_TOKENS: u32 = 4000;

impl PromptKind {
    pub fn model(&self) -> &'static str {
        MODEL_ID
    }

    pub fn max_tokens(&self) -> u32 {
        MAX_TOKENS
    }

    /// Higher temperature for question generation, lower for critique.
    pub fn temperature(&self) -> f32 {
        match self {
            PromptKind::FollowUp => 0.7,
            PromptKind::LetterDraft => 0.7,
            PromptKind::QualityCheck => 0.5,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PromptKind::FollowUp => "follow-up questions",
            PromptKind::LetterDraft => "letter draft",
            PromptKind::QualityCheck => "quality check",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temperatures_are_tuned_per_task() {
        assert!(PromptKind::QualityCheck.temperature() < PromptKind::FollowUp.temperature());
        assert_eq!(PromptKind::LetterDraft.temperature(), 0.7);
    }

    #[test]
    fn test_shared_model_and_budget() {
        for kind in [
            PromptKind::FollowUp,
            PromptKind::LetterDraft,
            PromptKind::QualityCheck,
        ] {
            assert_eq!(kind.model(), MODEL_ID);
            assert_eq!(kind.max_tokens(), 4000);
            assert!((0.0..=1.0).contains(&kind.temperature()));
        }
    }
}
