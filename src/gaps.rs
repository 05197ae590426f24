//! Gap analysis: which informational categories the collected facts already
//! cover, and which the follow-up questions should target.
//!
//! Pure derivation from [`CaseFacts`]; computed fresh on every prompt
//! assembly and never stored.

use crate::case::CaseFacts;

/// Coverage of the four informational categories a strong takedown letter
/// needs. A false ownership/impact flag means "needs more detail", not
/// "absent" - the prompt builders surface the two differently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GapStatus {
    pub has_content_location: bool,
    pub has_timeline: bool,
    pub has_ownership_evidence: bool,
    pub has_impact_statement: bool,
}

/// Whether a location answer actually points at content: a URL-like token or
/// an explicit mention of a URL.
fn looks_like_location(text: &str) -> bool {
    text.contains("http") || text.contains("www.") || text.contains("URL")
}

/// Derive gap coverage from the facts. `detail_threshold` is the free-text
/// length above which ownership/impact answers count as detailed enough
/// (see [`crate::config::Limits`]).
pub fn analyze(facts: &CaseFacts, detail_threshold: usize) -> GapStatus {
    GapStatus {
        has_content_location: looks_like_location(&facts.image_identification),
        has_timeline: !facts.image_upload_date.is_empty() && !facts.image_taken_date.is_empty(),
        has_ownership_evidence: facts.ownership_evidence.len() > detail_threshold,
        has_impact_statement: facts.impact_statement.len() > detail_threshold,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::case::sample_facts;

    const THRESHOLD: usize = 30;

    #[test]
    fn test_url_like_tokens_count_as_location() {
        let mut facts = sample_facts();
        for location in [
            "https://example.com/img.jpg",
            "http://short.link/x",
            "see www.example.com/profile",
            "the URL is in my notes",
        ] {
            facts.image_identification = location.to_string();
            assert!(
                analyze(&facts, THRESHOLD).has_content_location,
                "expected location for {:?}",
                location
            );
        }
    }

    #[test]
    fn test_non_url_text_is_not_a_location() {
        let mut facts = sample_facts();
        for location in ["on their profile page", "a group called Sunset Pics", ""] {
            facts.image_identification = location.to_string();
            assert!(
                !analyze(&facts, THRESHOLD).has_content_location,
                "expected no location for {:?}",
                location
            );
        }
    }

    #[test]
    fn test_timeline_needs_both_dates() {
        let mut facts = sample_facts();
        assert!(analyze(&facts, THRESHOLD).has_timeline);

        facts.image_taken_date = String::new();
        assert!(!analyze(&facts, THRESHOLD).has_timeline);

        facts.image_taken_date = "2024-11-02".to_string();
        facts.image_upload_date = String::new();
        assert!(!analyze(&facts, THRESHOLD).has_timeline);
    }

    #[test]
    fn test_detail_threshold_is_strict() {
        let mut facts = sample_facts();
        facts.ownership_evidence = "x".repeat(THRESHOLD);
        assert!(!analyze(&facts, THRESHOLD).has_ownership_evidence);

        facts.ownership_evidence = "x".repeat(THRESHOLD + 1);
        assert!(analyze(&facts, THRESHOLD).has_ownership_evidence);
    }

    #[test]
    fn test_scenario_complete_except_impact() {
        // URL location, both dates, 40-char ownership evidence, short impact
        let mut facts = sample_facts();
        facts.image_identification = "https://example.com/img.jpg".to_string();
        facts.ownership_evidence = "o".repeat(40);
        facts.impact_statement = "1234567890".to_string();

        let status = analyze(&facts, THRESHOLD);
        assert!(status.has_content_location);
        assert!(status.has_timeline);
        assert!(status.has_ownership_evidence);
        assert!(!status.has_impact_statement);
    }
}
