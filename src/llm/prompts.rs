//! The three deterministic prompt builders.
//!
//! Every prompt is a pure function of the case facts, the gap analysis, and
//! the (already redacted) policy projection, so the pipeline can be tested by
//! asserting on prompt content without ever touching the network. The
//! identity-verification filter runs upstream in [`crate::policy`]; nothing
//! here re-introduces policy text.

use crate::case::CaseFacts;
use crate::gaps::GapStatus;
use crate::policy::RelevantPolicies;

fn bullet_lines(lines: &[String]) -> String {
    lines
        .iter()
        .map(|l| format!("- {}", l))
        .collect::<Vec<_>>()
        .join("\n")
}

fn coverage_status(provided: bool) -> &'static str {
    if provided {
        "PROVIDED"
    } else {
        "MISSING"
    }
}

fn detail_status(provided: bool) -> &'static str {
    if provided {
        "PROVIDED"
    } else {
        "NEEDS MORE DETAIL"
    }
}

/// Build the follow-up-question prompt: states per-category coverage, embeds
/// the collected facts and filtered policy requirements, and constrains the
/// model to 2-3 questions in a fixed JSON schema.
pub fn follow_up_prompt(
    facts: &CaseFacts,
    gaps: GapStatus,
    policies: Option<&RelevantPolicies>,
) -> String {
    let platform_context = if facts.platform.is_custom {
        "on an online platform".to_string()
    } else {
        format!("on {}", facts.platform.name)
    };

    let initial_info = facts
        .initial_entries()
        .iter()
        .map(|(key, value)| format!("{}: {}", key, value))
        .collect::<Vec<_>>()
        .join("\n");

    let policy_section = policies
        .map(|p| {
            format!(
                "\nPlatform-Specific Requirements:\nThe platform requires the following evidence for this type of content:\n{}\n\nKey removal criteria:\n{}\n",
                bullet_lines(&p.evidence_requirements),
                bullet_lines(&p.removal_criteria),
            )
        })
        .unwrap_or_default();

    format!(
        r#"You are an AI assistant helping to generate follow-up questions for a takedown request letter generator. The user has provided information about {content_type} content being shared {platform_context} in a context of {content_context}.

CRITICAL: Review the information already provided before generating questions:

Content Location: {location_status}
Timeline Details: {timeline_status}
Ownership Evidence: {ownership_status}
Impact Statement: {impact_status}

Initial Information Provided:
{initial_info}
{policy_section}
CRITICAL RULES:
1. DO NOT ask for information that has already been provided
2. DO NOT repeat questions about URLs if content location is already given
3. DO NOT ask for timeline details if dates are already provided
4. Focus ONLY on gaps in the provided information
5. Questions should build upon existing information, not duplicate it
6. DO NOT ask for personal information like name, email, or contact details
7. DO NOT ask for ID verification, government IDs, proof of residence, or any official documentation
8. This is the ONLY opportunity to request information needed for the letter - if information is not collected here, it will not be included in the letter
9. Focus on questions that help identify SPECIFIC policy violations and community standards breaches
10. Prioritize questions that establish clear links between the content and platform policy violations

Generate 2-3 focused follow-up questions that ONLY address missing or insufficient information.

For each question, provide:
- A clear, concise question (no more than 2 sentences)
- A brief explanation of why this information helps (1 sentence)
- A category: 'essential' (missing key info), 'verification' (proves ownership), or 'supporting' (strengthens case)

Ensure the JSON is perfectly valid and can be parsed without any errors.
Output schema:
[{{
  "id": "unique_id",
  "question": "the follow-up question",
  "context": "why this information helps",
  "reason": "category"
}}]"#,
        content_type = facts.content_type.label(),
        platform_context = platform_context,
        content_context = facts.content_context.label(),
        location_status = coverage_status(gaps.has_content_location),
        timeline_status = coverage_status(gaps.has_timeline),
        ownership_status = detail_status(gaps.has_ownership_evidence),
        impact_status = detail_status(gaps.has_impact_statement),
        initial_info = initial_info,
        policy_section = policy_section,
    )
}

/// Build the letter-draft prompt: embeds every known fact and the filtered
/// policy context, with a strict no-hallucination contract and a fixed
/// `{subject, body, nextSteps}` schema.
pub fn letter_prompt(facts: &CaseFacts, policies: Option<&RelevantPolicies>) -> String {
    let reporting = facts.reporting_details.as_ref();
    let reporting_line = reporting
        .filter(|r| r.has_history())
        .map(|r| {
            format!(
                "Previous Reports: {} {}\n",
                r.standard_process_details.as_deref().unwrap_or(""),
                r.escalated_process_details.as_deref().unwrap_or(""),
            )
        })
        .unwrap_or_default();

    let follow_up_info = facts
        .follow_up_answers
        .iter()
        .map(|(key, value)| format!("{}: {}", key, value))
        .collect::<Vec<_>>()
        .join("\n");

    let policy_section = policies
        .map(|p| {
            let legal_basis = p
                .legal_basis
                .iter()
                .map(|b| format!("- {} {} (Ref: {})", b.title, b.section, b.reference))
                .collect::<Vec<_>>()
                .join("\n");
            let content_policies = p
                .content_policies
                .iter()
                .map(|cp| format!("- {} (Ref: {})", cp.policy, cp.reference))
                .collect::<Vec<_>>()
                .join("\n");
            format!(
                "\nPlatform-Specific Context for {name}:\n\nLegal Basis:\n{legal_basis}\n\nApplicable Policies:\n{content_policies}\n\nRemoval Requirements:\n{removal}\n\nEvidence Requirements:\n{evidence}\n\nTimeframes:\n- Initial Response: {response}\n- Content Removal: {removal_time}\n",
                name = p.platform_name,
                legal_basis = legal_basis,
                content_policies = content_policies,
                removal = bullet_lines(&p.removal_criteria),
                evidence = bullet_lines(&p.evidence_requirements),
                response = p.timeframes.response,
                removal_time = p.timeframes.removal,
            )
        })
        .unwrap_or_default();

    format!(
        r#"You are an AI assistant helping to generate a professional takedown request letter. Your role is to create a clear, factual, and compelling letter that requests the removal of {content_type} content in a context of {content_context}.

AVAILABLE INFORMATION:
Content Location: {content_location}
Upload Date: {upload_date}
Creation Date: {taken_date}
Ownership Evidence: {ownership_evidence}
Impact Statement: {impact_statement}
{reporting_line}{follow_up_info}
{policy_section}
CRITICAL INSTRUCTIONS:
1. Use ONLY the information provided by the user - DO NOT invent or hallucinate additional details
2. DO NOT include ANY placeholders in the letter - not even for name or email
3. Instead, use generic phrases like "my name" and "my contact information" where appropriate
4. DO NOT include any internal notes, formatting instructions, or placeholder descriptions
5. DO NOT include any placeholders like [Insert X], [List Y], [Full name], or [Email address]
6. DO NOT include any placeholders for information that was not collected in the previous questions
7. DO NOT reference or suggest the need for ID verification, government IDs, proof of residence, or any official documentation
8. DO NOT mention platform policies related to ID verification or official documentation requirements
9. FOCUS on clearly identifying which specific community standards and policies have been violated
10. EMPHASIZE the exact policy breaches that apply to this specific situation
11. INCLUDE relevant links and supporting evidence provided by the user
12. AVOID including sensitive personal information not required for the letter
13. Keep the letter professional but not overly legal in tone
14. Be respectful and trauma-informed
15. State clear action requests
16. Include specific timeframes when possible
17. Keep emotional language factual
18. At the end of the letter, include a generic closing like "Sincerely," followed by a new line for the user to add their name

AVOID THESE HALLUCINATION PATTERNS:
- "As I mentioned earlier"
- "As stated in my previous correspondence"
- "As per our conversation"
- "You have requested"
- "You have asked me to"
- "As you know"
- "As we discussed"
- "In your email"
- "In your message"
- "As indicated in your report"

Letter Structure:
1. Introduction
   - Clear purpose
   - Policy violations
   - Basic content identification

2. Content Details
   - Use provided locations/URLs
   - Include timeline information
   - Reference previous reports if any

3. Evidence
   - Include provided verification details
   - Reference documentation
   - Include ownership evidence

4. Policy Violation
   - Cite specific policies
   - Detail violations
   - Include impact statement

5. Request
   - Clear actions needed
   - Expected timeline
   - Next steps

6. Contact Information
   - Generic reference to contact information
   - Response expectations

Ensure the JSON is perfectly valid and can be parsed without any errors.
Output schema:
{{
  "subject": "Clear, specific subject line",
  "body": "The full letter content",
  "nextSteps": ["Array of recommended next steps"]
}}"#,
        content_type = facts.content_type.label(),
        content_context = facts.content_context.label(),
        content_location = facts.image_identification,
        upload_date = facts.image_upload_date,
        taken_date = facts.image_taken_date,
        ownership_evidence = facts.ownership_evidence,
        impact_statement = facts.impact_statement,
        reporting_line = reporting_line,
        follow_up_info = follow_up_info,
        policy_section = policy_section,
    )
}

/// Build the quality-check prompt: embeds the drafted letter (serialized) and
/// the case metadata, and requests a structured critique against eight fixed
/// criteria.
pub fn quality_check_prompt(letter: &str, facts: &CaseFacts) -> String {
    format!(
        r#"You are an expert in content takedown requests and platform policy enforcement. Your task is to review a generated takedown letter and ensure it meets quality standards and follows guidelines.

ORIGINAL LETTER:
{letter}

CONTEXT:
- Content type: {content_type}
- Content context: {content_context}
- Platform: {platform}

QUALITY CHECK CRITERIA:
1. NO HALLUCINATION: The letter must not contain any invented information not provided by the user
2. NO SENSITIVE INFORMATION: The letter should not request or include unnecessary sensitive personal information
3. NO PLACEHOLDERS: The letter must not contain any placeholders like [Insert X] or [Your Name]
4. POLICY FOCUS: The letter should clearly identify specific policy violations and community standards breaches
5. EVIDENCE INCLUSION: The letter should reference all relevant evidence provided by the user
6. CLARITY: The letter should have a clear purpose, specific requests, and expected outcomes
7. PROFESSIONALISM: The letter should be professional, respectful, and trauma-informed
8. ACTIONABILITY: The letter should include specific actions for the platform to take

REVIEW INSTRUCTIONS:
- Identify any issues in the letter based on the criteria above
- For each issue, provide a specific recommendation for improvement
- If the letter meets all criteria, indicate that it passes the quality check

Output your analysis in JSON format:
{{
  "passesQualityCheck": true/false,
  "issues": [
    {{
      "criterion": "The criterion that failed",
      "issue": "Description of the issue",
      "recommendation": "Specific recommendation for improvement"
    }}
  ],
  "improvedLetter": "Only include this field if changes are needed. If so, provide the complete improved letter."
}}"#,
        letter = letter,
        content_type = facts.content_type.label(),
        content_context = facts.content_context.label(),
        platform = facts.platform.display_name(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::case::sample_facts;
    use crate::gaps;
    use crate::policy::{get_platform_policy, mentions_identity_verification};

    const THRESHOLD: usize = 30;

    fn facts_with_everything_but_impact() -> CaseFacts {
        let mut facts = sample_facts();
        facts.image_identification = "https://example.com/img.jpg".to_string();
        facts.ownership_evidence = "o".repeat(40);
        facts.impact_statement = "1234567890".to_string();
        facts
    }

    #[test]
    fn test_follow_up_prompt_marks_impact_as_only_gap() {
        let facts = facts_with_everything_but_impact();
        let status = gaps::analyze(&facts, THRESHOLD);
        let prompt = follow_up_prompt(&facts, status, None);

        assert!(prompt.contains("Content Location: PROVIDED"));
        assert!(prompt.contains("Timeline Details: PROVIDED"));
        assert!(prompt.contains("Ownership Evidence: PROVIDED"));
        assert!(prompt.contains("Impact Statement: NEEDS MORE DETAIL"));
    }

    #[test]
    fn test_follow_up_prompt_marks_missing_location() {
        let mut facts = sample_facts();
        facts.image_identification = "somewhere on their profile".to_string();
        let status = gaps::analyze(&facts, THRESHOLD);
        let prompt = follow_up_prompt(&facts, status, None);
        assert!(prompt.contains("Content Location: MISSING"));
    }

    #[test]
    fn test_follow_up_prompt_embeds_collected_facts() {
        let facts = sample_facts();
        let status = gaps::analyze(&facts, THRESHOLD);
        let prompt = follow_up_prompt(&facts, status, None);
        assert!(prompt.contains("imageIdentification: https://example.com/img.jpg"));
        assert!(prompt.contains("on Facebook"));
        assert!(prompt.contains("intimate content"));
    }

    #[test]
    fn test_custom_platform_uses_generic_context() {
        let mut facts = sample_facts();
        facts.platform = crate::case::PlatformRef::custom("SmallForum");
        let status = gaps::analyze(&facts, THRESHOLD);
        let prompt = follow_up_prompt(&facts, status, None);
        assert!(prompt.contains("on an online platform"));
    }

    #[test]
    fn test_no_identity_policy_line_reaches_any_prompt() {
        let facts = sample_facts();
        let policy = get_platform_policy("facebook").unwrap();
        let relevant = policy.relevant_policies(facts.content_type, facts.content_context);
        let status = gaps::analyze(&facts, THRESHOLD);

        let prompts = [
            follow_up_prompt(&facts, status, Some(&relevant)),
            letter_prompt(&facts, Some(&relevant)),
        ];
        for line in policy
            .removal_criteria
            .iter()
            .chain(policy.evidence_requirements.iter())
            .filter(|l| mentions_identity_verification(l))
        {
            for prompt in &prompts {
                assert!(!prompt.contains(line.as_str()), "leaked line: {}", line);
            }
        }
    }

    #[test]
    fn test_letter_prompt_includes_policy_context_and_timeframes() {
        let facts = sample_facts();
        let policy = get_platform_policy("facebook").unwrap();
        let relevant = policy.relevant_policies(facts.content_type, facts.content_context);
        let prompt = letter_prompt(&facts, Some(&relevant));

        assert!(prompt.contains("Platform-Specific Context for Facebook"));
        assert!(prompt.contains("Legal Basis:"));
        assert!(prompt.contains("- Initial Response: within 48 hours"));
        assert!(prompt.contains("Prohibits sharing intimate images without consent"));
    }

    #[test]
    fn test_letter_prompt_embeds_follow_up_answers() {
        let mut facts = sample_facts();
        facts
            .follow_up_answers
            .insert("q1".to_string(), "The account is @stranger22".to_string());
        let prompt = letter_prompt(&facts, None);
        assert!(prompt.contains("q1: The account is @stranger22"));
    }

    #[test]
    fn test_letter_prompt_reporting_history_only_when_present() {
        let facts = sample_facts();
        let prompt = letter_prompt(&facts, None);
        assert!(!prompt.contains("Previous Reports:"));

        let mut reported = sample_facts();
        reported.reporting_details = Some(crate::case::ReportingDetails {
            standard_process_details: Some("Reported through the in-app flow on Jan 20".to_string()),
            ..Default::default()
        });
        let prompt = letter_prompt(&reported, None);
        assert!(prompt.contains("Previous Reports: Reported through the in-app flow on Jan 20"));
    }

    #[test]
    fn test_prompts_are_deterministic() {
        let facts = sample_facts();
        let status = gaps::analyze(&facts, THRESHOLD);
        assert_eq!(
            follow_up_prompt(&facts, status, None),
            follow_up_prompt(&facts, status, None)
        );
        assert_eq!(letter_prompt(&facts, None), letter_prompt(&facts, None));
    }

    #[test]
    fn test_quality_prompt_embeds_letter_and_metadata() {
        let facts = sample_facts();
        let prompt = quality_check_prompt("{\"subject\":\"Request\"}", &facts);
        assert!(prompt.contains("ORIGINAL LETTER:\n{\"subject\":\"Request\"}"));
        assert!(prompt.contains("- Platform: Facebook"));
        assert!(prompt.contains("8. ACTIONABILITY"));
        assert!(prompt.contains("passesQualityCheck"));
    }
}
